//! # Render Module
//!
//! Point-splat rendering for the galaxy plus the 2D overlay alignment
//! contract. Two vertex paths draw the same splats: [`CpuPointRenderer`]
//! streams instances from a host-side store every frame, and
//! [`GpuPointRenderer`] reads the simulation engine's position texture
//! directly in the vertex stage.

pub mod overlay;

mod points;

pub use points::{CpuPointRenderer, GpuPointRenderer, PointCamera, PointSettings};
