//! # Simulation Module
//!
//! The CPU per-frame force integrator. The GPU counterpart lives in
//! [`crate::gpu`]; both advance the same particle model.

mod cpu;

pub use cpu::{CpuIntegrator, SimParams};
