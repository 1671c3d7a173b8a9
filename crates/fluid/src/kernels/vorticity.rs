//! Curl computation and vorticity confinement.
//!
//! Semi-Lagrangian advection and the coarse pressure solve damp small
//! vortices quickly; confinement measures the local rotation (curl) and
//! pushes velocity along it, keeping the swirls that make the fluid read as
//! turbulent. Optional: strength 0 skips both kernels.

use glam::Vec2;

use crate::field::Field;

/// Scalar curl per cell: `0.5 * ((R.y - L.y) - (T.x - B.x))`,
/// clamp-to-edge neighbors.
pub fn curl(velocity: &Field<Vec2>, dst: &mut Field<f32>) {
    debug_assert_eq!(velocity.width(), dst.width());
    debug_assert_eq!(velocity.height(), dst.height());

    dst.compute(|i, j, _uv| {
        let i = i as i32;
        let j = j as i32;
        let left = velocity.get_clamped(i - 1, j).y;
        let right = velocity.get_clamped(i + 1, j).y;
        let bottom = velocity.get_clamped(i, j - 1).x;
        let top = velocity.get_clamped(i, j + 1).x;
        0.5 * ((right - left) - (top - bottom))
    });
}

/// Add the confinement force: a push perpendicular to the gradient of curl
/// magnitude, proportional to the local curl and the configured strength.
pub fn confine(
    velocity: &Field<Vec2>,
    curl: &Field<f32>,
    dst: &mut Field<Vec2>,
    strength: f32,
    dt: f32,
) {
    debug_assert_eq!(velocity.width(), dst.width());
    debug_assert_eq!(curl.width(), dst.width());

    dst.compute(|i, j, _uv| {
        let i = i as i32;
        let j = j as i32;
        let left = curl.get_clamped(i - 1, j).abs();
        let right = curl.get_clamped(i + 1, j).abs();
        let bottom = curl.get_clamped(i, j - 1).abs();
        let top = curl.get_clamped(i, j + 1).abs();
        let c = curl.get(i as usize, j as usize);

        // Normal of the |curl| gradient; the epsilon keeps flat regions
        // from dividing by zero.
        let mut force = 0.5 * Vec2::new(top - bottom, right - left);
        force /= force.length() + 1e-4;
        force *= strength * c;
        force.y = -force.y;

        velocity.get(i as usize, j as usize) + force * dt
    });
}
