//! # Galaxy Module
//!
//! The particle store, the procedural spiral-galaxy generator, and the
//! snapshot codec for exporting and re-seeding sessions.

mod generator;
mod particle;
mod snapshot;

pub use generator::{
    arm_position, orbital_velocity, BoundaryPolicy, ColorPolicy, GalaxyConfig, GalaxyError,
};
pub use particle::{Particle, ParticleKind, ParticleStore, CENTER_MASS, MIN_DISTANCE};
pub use snapshot::{
    derived_ambient_mass, ColorValue, SnapshotDocument, SnapshotError, SnapshotParticle,
};
