//! Simulation parameters, splat requests and boundary validation.
//!
//! Kernels themselves are infallible; everything that can go wrong
//! (non-positive dimensions, NaN scalars, bad splats) is rejected here
//! before a kernel ever runs. A rejected step leaves the previous buffer
//! state untouched.

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

/// Sampling strategy for the advection kernel, chosen once per simulation
/// from a host capability query and fixed for the buffers' lifetime.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Filtering {
    /// Native bilinear filtering is available for the field format.
    Linear,
    /// High-precision float formats without filterable samples: the kernel
    /// does an explicit 4-tap fetch + bilinear mix instead.
    Manual,
}

/// Tuning parameters for the whole pipeline.
///
/// Externally supplied and re-read every step; kernels cache nothing.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FluidConfig {
    /// Velocity/pressure grid height in cells; width follows aspect ratio.
    pub sim_resolution: u32,
    /// Dye grid height in cells; width follows aspect ratio.
    pub dye_resolution: u32,
    /// Exponential decay rate of the dye field during advection.
    pub density_dissipation: f32,
    /// Exponential decay rate of the velocity field during advection.
    pub velocity_dissipation: f32,
    /// Scale factor applied to the pressure field before relaxation
    /// (the "clear" pass; 0 discards last frame's pressure entirely).
    pub pressure: f32,
    /// Jacobi iteration count for the pressure solve.
    pub pressure_iterations: u32,
    /// Vorticity confinement strength; 0 disables the curl kernels.
    pub curl: f32,
    /// Gaussian splat falloff radius in normalized units.
    pub splat_radius: f32,
    /// Scale from pointer velocity to splatted force.
    pub splat_force: f32,
    /// Derive surface-normal lighting from the dye gradient when displaying.
    pub shading: bool,
    /// Bloom compositing toggle and the tuning of the (host-side) bloom
    /// generation passes.
    pub bloom: bool,
    pub bloom_iterations: u32,
    pub bloom_resolution: u32,
    pub bloom_intensity: f32,
    pub bloom_threshold: f32,
    pub bloom_soft_knee: f32,
    /// Sunrays compositing toggle and the tuning of the (host-side)
    /// sunrays mask pass.
    pub sunrays: bool,
    pub sunrays_resolution: u32,
    pub sunrays_weight: f32,
}

impl Default for FluidConfig {
    fn default() -> Self {
        Self {
            sim_resolution: 128,
            dye_resolution: 1024,
            density_dissipation: 1.0,
            velocity_dissipation: 0.2,
            pressure: 0.8,
            pressure_iterations: 20,
            curl: 30.0,
            splat_radius: 0.25,
            splat_force: 6000.0,
            shading: true,
            bloom: true,
            bloom_iterations: 8,
            bloom_resolution: 256,
            bloom_intensity: 0.8,
            bloom_threshold: 0.6,
            bloom_soft_knee: 0.7,
            sunrays: true,
            sunrays_resolution: 196,
            sunrays_weight: 1.0,
        }
    }
}

impl FluidConfig {
    /// Reject configurations no kernel may see.
    pub fn validate(&self) -> Result<(), FluidError> {
        if self.sim_resolution == 0 {
            return Err(FluidError::NonPositiveParameter("sim_resolution"));
        }
        if self.dye_resolution == 0 {
            return Err(FluidError::NonPositiveParameter("dye_resolution"));
        }
        if self.pressure_iterations == 0 {
            return Err(FluidError::InvalidIterations(self.pressure_iterations));
        }
        let scalars = [
            ("density_dissipation", self.density_dissipation),
            ("velocity_dissipation", self.velocity_dissipation),
            ("pressure", self.pressure),
            ("curl", self.curl),
            ("splat_radius", self.splat_radius),
            ("splat_force", self.splat_force),
            ("bloom_intensity", self.bloom_intensity),
            ("bloom_threshold", self.bloom_threshold),
            ("bloom_soft_knee", self.bloom_soft_knee),
            ("sunrays_weight", self.sunrays_weight),
        ];
        for (name, value) in scalars {
            if !value.is_finite() {
                return Err(FluidError::NonFiniteParameter(name));
            }
        }
        if self.splat_radius <= 0.0 {
            return Err(FluidError::NonPositiveParameter("splat_radius"));
        }
        Ok(())
    }
}

/// A localized impulse, consumed in the step it is issued.
///
/// `force` is injected into the velocity field and `color` into the dye
/// field, each as a separate Gaussian splat with the same radius.
#[derive(Clone, Copy, Debug)]
pub struct SplatRequest {
    /// Center in normalized coordinates, expected inside `[0,1]²`.
    pub point: Vec2,
    /// Velocity impulse (already scaled by `splat_force` on the host side).
    pub force: Vec2,
    /// Dye tint to deposit.
    pub color: Vec3,
    /// Gaussian falloff radius in normalized units.
    pub radius: f32,
}

impl SplatRequest {
    pub fn validate(&self) -> Result<(), FluidError> {
        if !self.point.is_finite() {
            return Err(FluidError::InvalidSplat("point is not finite"));
        }
        if !self.force.is_finite() {
            return Err(FluidError::InvalidSplat("force is not finite"));
        }
        if !self.color.is_finite() {
            return Err(FluidError::InvalidSplat("color is not finite"));
        }
        if !self.radius.is_finite() || self.radius <= 0.0 {
            return Err(FluidError::InvalidSplat("radius must be positive"));
        }
        Ok(())
    }
}

/// Configuration errors caught at the boundary (there are no runtime
/// failure modes inside the kernels).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FluidError {
    InvalidDimensions { width: u32, height: u32 },
    InvalidIterations(u32),
    NonFiniteParameter(&'static str),
    NonPositiveParameter(&'static str),
    InvalidSplat(&'static str),
    InvalidTimestep(f32),
}

impl std::fmt::Display for FluidError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FluidError::InvalidDimensions { width, height } => {
                write!(f, "grid dimensions must be positive, got {}x{}", width, height)
            }
            FluidError::InvalidIterations(n) => {
                write!(f, "pressure iteration count must be positive, got {}", n)
            }
            FluidError::NonFiniteParameter(name) => {
                write!(f, "parameter `{}` is not finite", name)
            }
            FluidError::NonPositiveParameter(name) => {
                write!(f, "parameter `{}` must be positive", name)
            }
            FluidError::InvalidSplat(reason) => write!(f, "invalid splat request: {}", reason),
            FluidError::InvalidTimestep(dt) => {
                write!(f, "timestep must be finite and positive, got {}", dt)
            }
        }
    }
}

impl std::error::Error for FluidError {}
