//! Pressure projection: divergence, Jacobi relaxation, gradient subtraction.
//!
//! Three barrier-separated stages per step. The divergence kernel applies a
//! reflective boundary (out-of-grid neighbor samples are replaced by the
//! sign-flipped center component), which produces a free-slip,
//! no-penetration wall at all four edges. The pressure and gradient kernels
//! sample clamp-to-edge only; the wall condition is already baked into the
//! divergence they consume.
//!
//! Deterministic by construction: Jacobi iterations ping-pong between two
//! pressure instances and never read a value written in the same pass.

use glam::Vec2;

use crate::field::Field;

/// `div = 0.5 * ((R.x - L.x) + (T.y - B.y))` with reflective boundary
/// substitution at the edges.
pub fn divergence(velocity: &Field<Vec2>, dst: &mut Field<f32>) {
    debug_assert_eq!(velocity.width(), dst.width());
    debug_assert_eq!(velocity.height(), dst.height());

    let w = velocity.width() as i32;
    let h = velocity.height() as i32;

    dst.compute(|i, j, _uv| {
        let i = i as i32;
        let j = j as i32;
        let center = velocity.get(i as usize, j as usize);

        // Out-of-grid neighbors reflect the center component.
        let left = if i == 0 {
            -center.x
        } else {
            velocity.get(i as usize - 1, j as usize).x
        };
        let right = if i == w - 1 {
            -center.x
        } else {
            velocity.get(i as usize + 1, j as usize).x
        };
        let bottom = if j == 0 {
            -center.y
        } else {
            velocity.get(i as usize, j as usize - 1).y
        };
        let top = if j == h - 1 {
            -center.y
        } else {
            velocity.get(i as usize, j as usize + 1).y
        };

        0.5 * ((right - left) + (top - bottom))
    });
}

/// One Jacobi iteration: `p' = (L + R + B + T - div) * 0.25`, reading the
/// previous iteration's pressure only. Run for a fixed iteration count,
/// swapping the pressure double buffer between calls.
pub fn pressure(prev: &Field<f32>, divergence: &Field<f32>, dst: &mut Field<f32>) {
    debug_assert_eq!(prev.width(), dst.width());
    debug_assert_eq!(prev.height(), dst.height());
    debug_assert_eq!(divergence.width(), dst.width());

    dst.compute(|i, j, _uv| {
        let i = i as i32;
        let j = j as i32;
        let left = prev.get_clamped(i - 1, j);
        let right = prev.get_clamped(i + 1, j);
        let bottom = prev.get_clamped(i, j - 1);
        let top = prev.get_clamped(i, j + 1);
        let div = divergence.get(i as usize, j as usize);
        (left + right + bottom + top - div) * 0.25
    });
}

/// `velocity -= 0.5 * (R - L, T - B)` of the final pressure field,
/// projecting velocity onto its divergence-free component.
///
/// The 0.5 is the same central-difference weight the divergence kernel
/// uses; with mismatched weights the projection over-corrects and the
/// residual divergence grows once the pressure solve is accurate.
pub fn subtract_gradient(pressure: &Field<f32>, velocity: &Field<Vec2>, dst: &mut Field<Vec2>) {
    debug_assert_eq!(velocity.width(), dst.width());
    debug_assert_eq!(velocity.height(), dst.height());
    debug_assert_eq!(pressure.width(), dst.width());

    dst.compute(|i, j, _uv| {
        let i = i as i32;
        let j = j as i32;
        let left = pressure.get_clamped(i - 1, j);
        let right = pressure.get_clamped(i + 1, j);
        let bottom = pressure.get_clamped(i, j - 1);
        let top = pressure.get_clamped(i, j + 1);
        let v = velocity.get(i as usize, j as usize);
        v - 0.5 * Vec2::new(right - left, top - bottom)
    });
}
