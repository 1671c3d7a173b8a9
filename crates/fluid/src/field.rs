//! 2D field buffers addressed by normalized coordinates.
//!
//! A [`Field`] is a dense row-major grid of 1-4 channel float texels with
//! clamp-to-edge sampling, the CPU analogue of a float texture. Kernels
//! never mutate a field they sample; the [`DoubleBuffer`] read/write pair
//! plus an explicit `swap()` after each pass is the only synchronization
//! mechanism in the pipeline.

use glam::{Vec2, Vec3, Vec4};
use rayon::prelude::*;
use std::ops::{Add, Mul, Sub};

/// Per-cell value stored in a [`Field`]: a scalar or a small float vector.
pub trait Texel:
    Copy
    + Send
    + Sync
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<f32, Output = Self>
    + 'static
{
    const ZERO: Self;
}

impl Texel for f32 {
    const ZERO: Self = 0.0;
}

impl Texel for Vec2 {
    const ZERO: Self = Vec2::ZERO;
}

impl Texel for Vec3 {
    const ZERO: Self = Vec3::ZERO;
}

impl Texel for Vec4 {
    const ZERO: Self = Vec4::ZERO;
}

/// GLSL-style linear blend: `a` at `t = 0`, `b` at `t = 1`.
#[inline]
pub fn mix<T: Texel>(a: T, b: T, t: f32) -> T {
    a * (1.0 - t) + b * t
}

/// A `width x height` grid of texels sampled by normalized `uv` in `[0,1]²`.
///
/// Texel centers sit at `((i + 0.5) / width, (j + 0.5) / height)`. Sampling
/// outside `[0,1]²` clamps to the edge texel, never wraps.
#[derive(Clone)]
pub struct Field<T> {
    width: usize,
    height: usize,
    data: Vec<T>,
}

impl<T: Texel> Field<T> {
    pub fn new(width: usize, height: usize) -> Self {
        assert!(width > 0 && height > 0, "field dimensions must be positive");
        Self {
            width,
            height,
            data: vec![T::ZERO; width * height],
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// `(1 / width, 1 / height)`: the uv footprint of one texel.
    #[inline]
    pub fn texel_size(&self) -> Vec2 {
        Vec2::new(1.0 / self.width as f32, 1.0 / self.height as f32)
    }

    #[inline]
    pub fn aspect_ratio(&self) -> f32 {
        self.width as f32 / self.height as f32
    }

    /// Row-major offset of cell `(i, j)` in [`data`](Field::data).
    #[inline]
    pub fn index(&self, i: usize, j: usize) -> usize {
        j * self.width + i
    }

    #[inline]
    pub fn get(&self, i: usize, j: usize) -> T {
        self.data[self.index(i, j)]
    }

    #[inline]
    pub fn set(&mut self, i: usize, j: usize, value: T) {
        let idx = self.index(i, j);
        self.data[idx] = value;
    }

    /// Integer fetch with clamp-to-edge on both axes.
    #[inline]
    pub fn get_clamped(&self, i: i32, j: i32) -> T {
        let i = i.clamp(0, self.width as i32 - 1) as usize;
        let j = j.clamp(0, self.height as i32 - 1) as usize;
        self.data[self.index(i, j)]
    }

    #[inline]
    pub fn data(&self) -> &[T] {
        &self.data
    }

    #[inline]
    pub fn data_mut(&mut self) -> &mut [T] {
        &mut self.data
    }

    pub fn fill_value(&mut self, value: T) {
        self.data.fill(value);
    }

    /// Nearest-texel fetch at `uv`, clamp-to-edge.
    #[inline]
    pub fn fetch(&self, uv: Vec2) -> T {
        let i = (uv.x * self.width as f32).floor() as i32;
        let j = (uv.y * self.height as f32).floor() as i32;
        self.get_clamped(i, j)
    }

    /// Nearest-texel fetch at `uv` with repeat wrapping on both axes.
    /// Used for tileable patterns (dither noise).
    #[inline]
    pub fn fetch_wrap(&self, uv: Vec2) -> T {
        let w = self.width as i32;
        let h = self.height as i32;
        let i = ((uv.x * self.width as f32).floor() as i32).rem_euclid(w);
        let j = ((uv.y * self.height as f32).floor() as i32).rem_euclid(h);
        self.data[self.index(i as usize, j as usize)]
    }

    /// Bilinear sample at `uv` over the 4 surrounding texel centers,
    /// clamp-to-edge. This is the "native linear filtering" path.
    #[inline]
    pub fn sample_linear(&self, uv: Vec2) -> T {
        let sx = uv.x * self.width as f32 - 0.5;
        let sy = uv.y * self.height as f32 - 0.5;
        let fx = sx.floor();
        let fy = sy.floor();
        let tx = sx - fx;
        let ty = sy - fy;

        let i0 = (fx as i32).clamp(0, self.width as i32 - 1);
        let i1 = (fx as i32 + 1).clamp(0, self.width as i32 - 1);
        let j0 = (fy as i32).clamp(0, self.height as i32 - 1);
        let j1 = (fy as i32 + 1).clamp(0, self.height as i32 - 1);

        let a = self.data[self.index(i0 as usize, j0 as usize)];
        let b = self.data[self.index(i1 as usize, j0 as usize)];
        let c = self.data[self.index(i0 as usize, j1 as usize)];
        let d = self.data[self.index(i1 as usize, j1 as usize)];

        mix(mix(a, b, tx), mix(c, d, tx), ty)
    }

    /// Manual 4-tap bilinear: explicit nearest fetches at the surrounding
    /// texel centers plus a bilinear mix. The fallback for targets whose
    /// float formats cannot filter natively; agrees with [`sample_linear`]
    /// up to floating-point rounding.
    ///
    /// [`sample_linear`]: Field::sample_linear
    #[inline]
    pub fn bilerp(&self, uv: Vec2) -> T {
        let tsize = self.texel_size();
        let st = uv / tsize - Vec2::splat(0.5);
        let iuv = st.floor();
        let fuv = st - iuv;

        let a = self.fetch((iuv + Vec2::new(0.5, 0.5)) * tsize);
        let b = self.fetch((iuv + Vec2::new(1.5, 0.5)) * tsize);
        let c = self.fetch((iuv + Vec2::new(0.5, 1.5)) * tsize);
        let d = self.fetch((iuv + Vec2::new(1.5, 1.5)) * tsize);

        mix(mix(a, b, fuv.x), mix(c, d, fuv.x), fuv.y)
    }

    /// Run a per-cell kernel over every cell, in parallel over rows.
    ///
    /// The kernel receives the cell indices and the cell-center uv and
    /// returns the new value. It must only read *other* field instances;
    /// the borrow checker enforces that this field is write-only here.
    pub fn compute<F>(&mut self, kernel: F)
    where
        F: Fn(usize, usize, Vec2) -> T + Send + Sync,
    {
        let width = self.width;
        let inv_w = 1.0 / width as f32;
        let inv_h = 1.0 / self.height as f32;
        self.data
            .par_chunks_mut(width)
            .enumerate()
            .for_each(|(j, row)| {
                let y = (j as f32 + 0.5) * inv_h;
                for (i, cell) in row.iter_mut().enumerate() {
                    let uv = Vec2::new((i as f32 + 0.5) * inv_w, y);
                    *cell = kernel(i, j, uv);
                }
            });
    }
}

/// Read/write pair of equally-sized fields: kernels sample `read()` and
/// fill `write()`, then the pass ends with `swap()`. Index-based, so
/// swapping allocates nothing.
pub struct DoubleBuffer<T> {
    buffers: [Field<T>; 2],
    read: usize,
}

impl<T: Texel> DoubleBuffer<T> {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            buffers: [Field::new(width, height), Field::new(width, height)],
            read: 0,
        }
    }

    #[inline]
    pub fn read(&self) -> &Field<T> {
        &self.buffers[self.read]
    }

    #[inline]
    pub fn write(&mut self) -> &mut Field<T> {
        &mut self.buffers[1 - self.read]
    }

    /// Borrow the read and write instances simultaneously.
    pub fn split(&mut self) -> (&Field<T>, &mut Field<T>) {
        let (first, second) = self.buffers.split_at_mut(1);
        if self.read == 0 {
            (&first[0], &mut second[0])
        } else {
            (&second[0], &mut first[0])
        }
    }

    #[inline]
    pub fn swap(&mut self) {
        self.read = 1 - self.read;
    }
}
