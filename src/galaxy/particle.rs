//! Particle state and the per-session particle store.

use crate::math::{Color, Vector3};
use serde::{Deserialize, Serialize};

/// Minimum distance-from-center used before any division by distance.
/// Both integrators floor every divisor with this to keep the math finite.
pub const MIN_DISTANCE: f32 = 0.1;

/// Mass of the galactic nucleus.
pub const CENTER_MASS: f32 = 4000.0;

/// Particle classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParticleKind {
    /// A massive attractor; the only gravitational source ambient
    /// particles respond to.
    Star,
    /// A low-mass body driven entirely by nearby stars' gravity plus the
    /// orbital-alignment stabilizer.
    #[serde(rename = "particle")]
    Ambient,
    /// The distinguished galactic nucleus: one per session, very high
    /// mass, fixed at the origin.
    Center,
}

impl ParticleKind {
    /// Whether this kind exerts gravity on ambient particles.
    #[inline]
    pub fn is_attractor(&self) -> bool {
        matches!(self, ParticleKind::Star | ParticleKind::Center)
    }
}

/// A single point mass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    /// Position in simulation space.
    pub position: Vector3,
    /// Velocity in simulation-space units per second.
    pub velocity: Vector3,
    /// Display color.
    pub color: Color,
    /// Mass. Stars carry 20-300; ambient particles carry a near-zero
    /// visual-scaling mass.
    pub mass: f32,
    /// Classification.
    pub kind: ParticleKind,
}

impl Particle {
    /// Distance from the galactic center, floored at [`MIN_DISTANCE`].
    #[inline]
    pub fn distance_from_center(&self) -> f32 {
        self.position.length().max(MIN_DISTANCE)
    }
}

/// The per-session set of particles.
///
/// Constructed once by the generator or the snapshot codec; the particle
/// count is fixed for the lifetime of the session (no runtime insertion or
/// removal). Integrators mutate positions and velocities in place.
#[derive(Debug, Clone)]
pub struct ParticleStore {
    particles: Vec<Particle>,
}

impl ParticleStore {
    /// Wrap a fully built particle list.
    pub(crate) fn new(particles: Vec<Particle>) -> Self {
        Self { particles }
    }

    /// Number of particles in the session.
    #[inline]
    pub fn len(&self) -> usize {
        self.particles.len()
    }

    /// Whether the store is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// All particles.
    #[inline]
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// All particles, mutable. The slice length never changes; only the
    /// active integrator should write through this.
    #[inline]
    pub fn particles_mut(&mut self) -> &mut [Particle] {
        &mut self.particles
    }

    /// Iterate over attractors (stars and the center).
    pub fn attractors(&self) -> impl Iterator<Item = &Particle> {
        self.particles.iter().filter(|p| p.kind.is_attractor())
    }

    /// Number of attractors.
    pub fn attractor_count(&self) -> usize {
        self.attractors().count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_floor() {
        let p = Particle {
            position: Vector3::ZERO,
            velocity: Vector3::ZERO,
            color: Color::WHITE,
            mass: 0.01,
            kind: ParticleKind::Ambient,
        };
        assert_eq!(p.distance_from_center(), MIN_DISTANCE);
    }

    #[test]
    fn test_kind_serde_tags() {
        assert_eq!(serde_json::to_string(&ParticleKind::Star).unwrap(), "\"star\"");
        assert_eq!(
            serde_json::to_string(&ParticleKind::Ambient).unwrap(),
            "\"particle\""
        );
        assert_eq!(
            serde_json::to_string(&ParticleKind::Center).unwrap(),
            "\"center\""
        );
    }
}
