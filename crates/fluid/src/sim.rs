//! Step orchestrator: owns the field slabs and runs the kernel pipeline in
//! stage order.
//!
//! Stage order per step (each stage's output is the next one's input, so
//! every stage completes before the next is dispatched):
//! 1. Splat injection into velocity and dye
//! 2. Curl + vorticity confinement (skipped at strength 0)
//! 3. Divergence of velocity
//! 4. Pressure decay ("clear") + N Jacobi iterations
//! 5. Gradient subtraction
//! 6. Velocity self-advection, then dye advection
//!
//! A step either runs fully or is rejected before touching any buffer;
//! there is no partial application.

use glam::{Vec2, Vec3};

use crate::config::{Filtering, FluidConfig, FluidError, SplatRequest};
use crate::field::{DoubleBuffer, Field};
use crate::kernels::{advect, project, splat, util, vorticity};

/// The simulation state: velocity/dye/pressure slabs plus the single-buffer
/// divergence and curl scratch fields.
pub struct FluidSim {
    config: FluidConfig,
    filtering: Filtering,
    velocity: DoubleBuffer<Vec2>,
    dye: DoubleBuffer<Vec3>,
    pressure: DoubleBuffer<f32>,
    divergence: Field<f32>,
    curl: Field<f32>,
}

impl FluidSim {
    /// Allocate buffers for an output surface of `width x height` pixels.
    ///
    /// The simulation grid is `sim_resolution` cells tall and follows the
    /// output aspect ratio in width; the dye grid does the same at
    /// `dye_resolution`. `filtering` comes from the host capability query
    /// and is fixed for the lifetime of the buffers.
    pub fn new(
        config: FluidConfig,
        width: u32,
        height: u32,
        filtering: Filtering,
    ) -> Result<Self, FluidError> {
        config.validate()?;
        if width == 0 || height == 0 {
            return Err(FluidError::InvalidDimensions { width, height });
        }

        let aspect = width as f32 / height as f32;
        let (sim_w, sim_h) = scaled_resolution(config.sim_resolution, aspect);
        let (dye_w, dye_h) = scaled_resolution(config.dye_resolution, aspect);

        log::info!(
            "fluid sim {}x{} cells, dye {}x{} cells, {:?} filtering",
            sim_w,
            sim_h,
            dye_w,
            dye_h,
            filtering
        );

        Ok(Self {
            config,
            filtering,
            velocity: DoubleBuffer::new(sim_w, sim_h),
            dye: DoubleBuffer::new(dye_w, dye_h),
            pressure: DoubleBuffer::new(sim_w, sim_h),
            divergence: Field::new(sim_w, sim_h),
            curl: Field::new(sim_w, sim_h),
        })
    }

    pub fn config(&self) -> &FluidConfig {
        &self.config
    }

    /// Replace the parameters; takes effect on the next step.
    pub fn set_config(&mut self, config: FluidConfig) -> Result<(), FluidError> {
        config.validate()?;
        self.config = config;
        Ok(())
    }

    pub fn velocity(&self) -> &Field<Vec2> {
        self.velocity.read()
    }

    pub fn dye(&self) -> &Field<Vec3> {
        self.dye.read()
    }

    pub fn pressure(&self) -> &Field<f32> {
        self.pressure.read()
    }

    pub fn divergence(&self) -> &Field<f32> {
        &self.divergence
    }

    /// L2 norm of the most recently computed divergence field, for
    /// diagnostics and convergence tests.
    pub fn divergence_l2(&self) -> f32 {
        let sum: f32 = self.divergence.data().iter().map(|d| d * d).sum();
        (sum / self.divergence.data().len() as f32).sqrt()
    }

    /// Advance the simulation by `dt` seconds, consuming this step's splat
    /// requests. Invalid parameters or requests reject the whole step and
    /// leave every buffer as it was.
    pub fn step(&mut self, dt: f32, splats: &[SplatRequest]) -> Result<(), FluidError> {
        self.config.validate()?;
        if !dt.is_finite() || dt <= 0.0 {
            return Err(FluidError::InvalidTimestep(dt));
        }
        for request in splats {
            request.validate()?;
        }

        // 1. Inject impulses: force into velocity, tint into dye.
        for request in splats {
            let (read, write) = self.velocity.split();
            splat::splat(read, write, request.point, request.force, request.radius);
            self.velocity.swap();

            let (read, write) = self.dye.split();
            splat::splat(read, write, request.point, request.color, request.radius);
            self.dye.swap();
        }

        // 2. Vorticity confinement.
        if self.config.curl > 0.0 {
            vorticity::curl(self.velocity.read(), &mut self.curl);
            let (read, write) = self.velocity.split();
            vorticity::confine(read, &self.curl, write, self.config.curl, dt);
            self.velocity.swap();
        }

        // 3. Divergence of the intermediate velocity.
        project::divergence(self.velocity.read(), &mut self.divergence);

        // 4. Decay last frame's pressure as the solve's initial guess,
        //    then relax with barrier-separated Jacobi iterations.
        {
            let (read, write) = self.pressure.split();
            util::clear(read, write, self.config.pressure);
            self.pressure.swap();
        }
        for _ in 0..self.config.pressure_iterations {
            let (read, write) = self.pressure.split();
            project::pressure(read, &self.divergence, write);
            self.pressure.swap();
        }

        // 5. Project velocity onto its divergence-free component.
        {
            let (read, write) = self.velocity.split();
            project::subtract_gradient(self.pressure.read(), read, write);
            self.velocity.swap();
        }

        // 6. Advect velocity through itself, then dye through velocity.
        {
            let (read, write) = self.velocity.split();
            advect::advect(
                read,
                read,
                write,
                dt,
                self.config.velocity_dissipation,
                self.filtering,
            );
            self.velocity.swap();
        }
        {
            let (read, write) = self.dye.split();
            advect::advect(
                self.velocity.read(),
                read,
                write,
                dt,
                self.config.density_dissipation,
                self.filtering,
            );
            self.dye.swap();
        }

        Ok(())
    }
}

/// Aspect-corrected grid size: `resolution` cells tall, wider or narrower
/// to match the output surface.
fn scaled_resolution(resolution: u32, aspect: f32) -> (usize, usize) {
    let width = ((resolution as f32 * aspect).round() as usize).max(1);
    (width, resolution as usize)
}
