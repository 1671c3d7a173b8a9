//! Copy, clear and fill: pure per-cell maps with no boundary handling.

use crate::field::{Field, Texel};

/// Per-cell copy of `src` into `dst`. Fields must match in size.
pub fn copy<T: Texel>(src: &Field<T>, dst: &mut Field<T>) {
    debug_assert_eq!(src.width(), dst.width());
    debug_assert_eq!(src.height(), dst.height());
    dst.data_mut().copy_from_slice(src.data());
}

/// Scale-and-copy: `dst = src * value`. With `value < 1` this is the decay
/// pass applied to pressure between steps.
pub fn clear<T: Texel>(src: &Field<T>, dst: &mut Field<T>, value: f32) {
    debug_assert_eq!(src.width(), dst.width());
    debug_assert_eq!(src.height(), dst.height());
    dst.compute(|i, j, _uv| src.get(i, j) * value);
}

/// Flat fill of `dst` with a constant value.
pub fn fill<T: Texel>(dst: &mut Field<T>, color: T) {
    dst.fill_value(color);
}
