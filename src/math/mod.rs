//! # Math Module
//!
//! Minimal 3D math for the simulation: vectors, a view-projection matrix,
//! and colors with hex-string support for snapshot ingestion.

mod color;
mod matrix4;
mod vector3;

pub use color::Color;
pub use matrix4::Matrix4;
pub use vector3::Vector3;
