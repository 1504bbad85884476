//! # GPU Module
//!
//! The texture-backed simulation engine. Particle state lives in square
//! `Rgba32Float` textures and a fullscreen fragment pass advances every
//! particle once per frame, ping-ponging between two texture pairs. See
//! [`encode`] for the texel layouts and [`GpuGalaxy`] for the engine.

mod encode;
mod engine;

pub use encode::{
    build_star_grid, decode_positions, decode_velocities, encode_colors, encode_positions,
    encode_velocities, grid_cell, pack_discriminant, reference_coord, texture_dim,
    unpack_star_mass, GRID_DIM, INFLUENCE_RADIUS, PADDING_SENTINEL,
};
pub use engine::{GpuGalaxy, GpuSimConfig, GpuError};
