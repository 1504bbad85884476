//! # Vela - Interactive Spiral Galaxy Simulation
//!
//! Vela is a real-time N-body particle simulation of a spiral galaxy built
//! with Rust and wgpu. Thousands to hundreds of thousands of point masses
//! orbit a galactic nucleus under softened gravity and an orbital-alignment
//! stabilizer, advanced by one of two interchangeable engines:
//!
//! - **CPU integrator**: a per-frame nested loop over the star/particle
//!   split, suitable for small to medium populations.
//! - **GPU engine**: the entire particle state lives in double-buffered
//!   `Rgba32Float` textures and is advanced by a fullscreen fragment pass
//!   with grid-binned neighbor search, suitable for very large populations.
//!
//! Both engines share the same particle store, force model, and snapshot
//! format, so a session can be generated, exported, and re-seeded across
//! either path.
//!
//! ## Example
//!
//! ```ignore
//! use vela::prelude::*;
//!
//! let mut store = GalaxyConfig::default().generate()?;
//! let mut sim = CpuIntegrator::new(SimParams::default(), 0);
//! let mut clock = FrameClock::start_new();
//!
//! // once per rendered frame
//! sim.step(&mut store, clock.delta());
//! ```

#![warn(missing_docs)]

pub mod core;
pub mod galaxy;
pub mod gpu;
pub mod math;
pub mod render;
pub mod sim;

// Re-export commonly used types
pub mod prelude {
    //! Convenient re-exports of commonly used types.

    pub use crate::core::*;
    pub use crate::galaxy::*;
    pub use crate::gpu::*;
    pub use crate::math::*;
    pub use crate::render::*;
    pub use crate::sim::*;
}

/// Crate version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name.
pub const NAME: &str = "Vela";
