//! Display compositing: the final pass that turns the dye field into a
//! shaded, tone-mapped image.
//!
//! One pass per displayed frame, no iteration. Each feature is toggled by
//! [`DisplayOptions`], fixed when the host configures the pipeline; the
//! bloom and sunrays inputs are produced by the host's own passes and
//! consumed here as read-only fields.

use glam::{Vec2, Vec3, Vec4};

use crate::field::Field;

/// Feature selection for the compositor, chosen at setup.
#[derive(Clone, Copy, Debug, Default)]
pub struct DisplayOptions {
    /// Light the dye from overhead using the gradient of color magnitude.
    pub shading: bool,
    /// Add the gamma-corrected bloom field (requires a dither pattern).
    pub bloom: bool,
    /// Attenuate by the scalar sunrays field.
    pub sunrays: bool,
}

/// sRGB-style transfer curve applied to bloom before it is added:
/// `max(1.055 * x^(1/2.4) - 0.055, 0)` per channel.
#[inline]
pub fn linear_to_gamma(color: Vec3) -> Vec3 {
    let color = color.max(Vec3::ZERO);
    let curved = 1.055 * color.powf(1.0 / 2.4) - Vec3::splat(0.055);
    curved.max(Vec3::ZERO)
}

/// Composite `dye` (plus optional bloom/sunrays) into `dst`.
///
/// `dither` is a tileable noise pattern sampled at `uv * dither_scale`,
/// where the scale is the output resolution over the pattern resolution so
/// the pattern tiles seamlessly; its sample is remapped to `[-1,1]` and
/// added at 1/255 amplitude to break up banding in the bloom. Alpha is the
/// maximum of the three color channels so the result composites correctly
/// over non-black backgrounds.
pub fn composite(
    dye: &Field<Vec3>,
    bloom: Option<&Field<Vec3>>,
    sunrays: Option<&Field<f32>>,
    dither: Option<&Field<f32>>,
    options: DisplayOptions,
    dst: &mut Field<Vec4>,
) {
    let texel = dst.texel_size();
    let texel_len = texel.length();
    let use_bloom = options.bloom && bloom.is_some();
    let use_sunrays = options.sunrays && sunrays.is_some();
    let dither_scale = dither.map(|noise| {
        Vec2::new(
            dst.width() as f32 / noise.width() as f32,
            dst.height() as f32 / noise.height() as f32,
        )
    });

    dst.compute(|_i, _j, uv| {
        let mut c = dye.sample_linear(uv);

        if options.shading {
            let lc = dye.sample_linear(uv - Vec2::new(texel.x, 0.0));
            let rc = dye.sample_linear(uv + Vec2::new(texel.x, 0.0));
            let tc = dye.sample_linear(uv + Vec2::new(0.0, texel.y));
            let bc = dye.sample_linear(uv - Vec2::new(0.0, texel.y));

            let dx = rc.length() - lc.length();
            let dy = tc.length() - bc.length();

            // Overhead light (0,0,1): the diffuse term is just the z of the
            // normalized gradient normal.
            let n = Vec3::new(dx, dy, texel_len).normalize();
            let diffuse = (n.z + 0.7).clamp(0.7, 1.0);
            c *= diffuse;
        }

        let mut bloom_c = if use_bloom {
            bloom.map(|b| b.sample_linear(uv)).unwrap_or(Vec3::ZERO)
        } else {
            Vec3::ZERO
        };

        if use_sunrays {
            let s = sunrays.map(|s| s.sample_linear(uv)).unwrap_or(1.0);
            c *= s;
            if use_bloom {
                bloom_c *= s;
            }
        }

        if use_bloom {
            if let Some(scale) = dither_scale {
                let noise = dither
                    .map(|n| n.fetch_wrap(uv * scale))
                    .unwrap_or(0.5);
                bloom_c += Vec3::splat((noise * 2.0 - 1.0) / 255.0);
            }
            c += linear_to_gamma(bloom_c);
        }

        let a = c.x.max(c.y.max(c.z));
        Vec4::new(c.x, c.y, c.z, a)
    });
}
