//! Gaussian splat injection.

use glam::Vec2;

use crate::field::{Field, Texel};

/// Add a Gaussian-falloff impulse of `color` centered at `point` to `base`,
/// writing the sum into `dst`.
///
/// The x offset is scaled by the field's aspect ratio so the injected
/// region stays circular in screen space on non-square grids. The center
/// cell receives exactly `base + color`.
pub fn splat<T: Texel>(base: &Field<T>, dst: &mut Field<T>, point: Vec2, color: T, radius: f32) {
    debug_assert_eq!(base.width(), dst.width());
    debug_assert_eq!(base.height(), dst.height());

    let aspect = base.aspect_ratio();
    dst.compute(|i, j, uv| {
        let mut p = uv - point;
        p.x *= aspect;
        let gauss = (-p.dot(p) / radius).exp();
        base.get(i, j) + color * gauss
    });
}
