//! Per-cell numerical kernels.
//!
//! Each function fills one output field from one or more input fields and a
//! handful of scalar parameters. None of them mutate an input, hold state
//! across invocations, or synchronize between cells; the driver sequences
//! passes and swaps double buffers between them.

pub mod advect;
pub mod project;
pub mod splat;
pub mod util;
pub mod vorticity;
