//! Stable-fluids kernel pipeline
//!
//! Real-time incompressible fluid simulation built from pure per-cell
//! kernels over double-buffered 2D fields:
//! 1. Splat injection (user/idle impulses into velocity and dye)
//! 2. Vorticity confinement (optional, keeps small swirls alive)
//! 3. Pressure projection (divergence -> Jacobi relaxation -> gradient
//!    subtraction) to enforce incompressibility
//! 4. Semi-Lagrangian advection of velocity and dye
//! 5. Display compositing (shading, sunrays, bloom, dither, tone map)
//!
//! Every kernel maps input field samples to exactly one output cell with no
//! cross-cell synchronization, so each pass parallelizes over rows with
//! rayon. Double buffering is the only synchronization mechanism: a kernel
//! never reads the field instance it writes.
//!
//! This crate is host-agnostic - it owns the numerics only. Window, input
//! and asset plumbing belong to the embedding application.

pub mod config;
pub mod display;
pub mod field;
pub mod kernels;
pub mod sim;

pub use config::{Filtering, FluidConfig, FluidError, SplatRequest};
pub use display::{composite, DisplayOptions};
pub use field::{DoubleBuffer, Field, Texel};
pub use sim::FluidSim;
