//! Procedural spiral-galaxy generation.
//!
//! One configurable generator replaces the family of constant-tweaked
//! variants this design grew out of: arm count, spiral tightness, force
//! constants, boundary policy, and color policy are all options on
//! [`GalaxyConfig`].

use super::particle::{Particle, ParticleKind, ParticleStore, CENTER_MASS, MIN_DISTANCE};
use crate::math::{Color, Vector3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f32::consts::TAU;
use thiserror::Error;

/// Errors reported by galaxy generation.
#[derive(Error, Debug)]
pub enum GalaxyError {
    /// Generation was called with an out-of-range parameter.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}

/// What happens to an ambient particle that escapes the maximum radius.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BoundaryPolicy {
    /// Clamp the position onto the boundary sphere and halve the velocity.
    /// Keeps long-run density near the rim.
    #[default]
    Clamp,
    /// Re-seed the particle at a fresh arm-relative position in the
    /// 4-8 radius band with a fresh orbital velocity. Keeps long-run
    /// density in the arms.
    Respawn,
}

/// Star color assignment policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorPolicy {
    /// Radius-dependent gradient: warm core, cool rim.
    #[default]
    Gradient,
    /// Fixed palette keyed by arm index.
    ArmPalette,
    /// Stellar-classification probability table (blue supergiants rare,
    /// red dwarfs common).
    Classification,
}

/// Generation parameters for a galaxy session.
#[derive(Debug, Clone)]
pub struct GalaxyConfig {
    /// Number of stars.
    pub num_stars: usize,
    /// Number of ambient particles.
    pub num_particles: usize,
    /// Number of spiral arms.
    pub num_arms: u32,
    /// Spiral winding constant: radians of extra angle per unit radius.
    pub spiral_tightness: f32,
    /// Gravitational constant used for force and orbital seeding.
    pub gravity_constant: f32,
    /// Per-frame velocity damping factor, in (0, 1].
    pub damping: f32,
    /// Maximum radius before the boundary policy applies.
    pub max_radius: f32,
    /// Boundary containment policy.
    pub boundary_policy: BoundaryPolicy,
    /// Star color policy.
    pub color_policy: ColorPolicy,
    /// RNG seed; the same seed reproduces the same galaxy exactly.
    pub seed: u64,
}

impl Default for GalaxyConfig {
    fn default() -> Self {
        Self {
            num_stars: 64,
            num_particles: 10_000,
            num_arms: 3,
            spiral_tightness: 0.35,
            gravity_constant: 6.674e-3,
            damping: 0.995,
            max_radius: 12.0,
            boundary_policy: BoundaryPolicy::default(),
            color_policy: ColorPolicy::default(),
            seed: 0,
        }
    }
}

/// Radius band stars are generated in.
const STAR_RADIUS_MIN: f32 = 1.0;
/// Outer edge of the star generation band.
const STAR_RADIUS_MAX: f32 = 8.0;

impl GalaxyConfig {
    /// Check the parameters without generating anything.
    pub fn validate(&self) -> Result<(), GalaxyError> {
        if self.num_stars == 0 {
            return Err(GalaxyError::InvalidParameter(
                "num_stars must be positive".into(),
            ));
        }
        if self.num_particles == 0 {
            return Err(GalaxyError::InvalidParameter(
                "num_particles must be positive".into(),
            ));
        }
        if self.num_arms == 0 {
            return Err(GalaxyError::InvalidParameter(
                "num_arms must be positive".into(),
            ));
        }
        if !(self.spiral_tightness > 0.0 && self.spiral_tightness <= 2.0) {
            return Err(GalaxyError::InvalidParameter(format!(
                "spiral_tightness {} outside (0, 2]",
                self.spiral_tightness
            )));
        }
        if !(self.damping > 0.0 && self.damping <= 1.0) {
            return Err(GalaxyError::InvalidParameter(format!(
                "damping {} outside (0, 1]",
                self.damping
            )));
        }
        if self.gravity_constant <= 0.0 {
            return Err(GalaxyError::InvalidParameter(
                "gravity_constant must be positive".into(),
            ));
        }
        if self.max_radius <= STAR_RADIUS_MAX {
            return Err(GalaxyError::InvalidParameter(format!(
                "max_radius {} must exceed the star band ({})",
                self.max_radius, STAR_RADIUS_MAX
            )));
        }
        Ok(())
    }

    /// Generate the particle store for a new session.
    pub fn generate(&self) -> Result<ParticleStore, GalaxyError> {
        self.validate()?;

        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut particles = Vec::with_capacity(1 + self.num_stars + self.num_particles);

        // The nucleus: fixed at the origin.
        particles.push(Particle {
            position: Vector3::ZERO,
            velocity: Vector3::ZERO,
            color: Color::from_hex(0xfff0dd),
            mass: CENTER_MASS,
            kind: ParticleKind::Center,
        });

        for i in 0..self.num_stars {
            let arm = (i as u32) % self.num_arms;
            let position = arm_position(
                &mut rng,
                self.num_arms,
                self.spiral_tightness,
                arm,
                STAR_RADIUS_MIN,
                STAR_RADIUS_MAX,
            );
            let mass = rng.gen_range(20.0..300.0);
            let radius = position.radial_length();

            particles.push(Particle {
                position,
                velocity: orbital_velocity(position, self.gravity_constant, CENTER_MASS),
                color: self.star_color(&mut rng, arm, radius),
                mass,
                kind: ParticleKind::Star,
            });
        }

        // Ambient particles cluster around the arms: each one anchors to a
        // randomly chosen star with a small offset, instead of scattering
        // uniformly over the disc.
        let star_range = 1..(1 + self.num_stars);
        for _ in 0..self.num_particles {
            let anchor = particles[rng.gen_range(star_range.clone())];
            let offset = Vector3::new(
                rng.gen_range(-0.6..0.6),
                rng.gen_range(-0.2..0.2),
                rng.gen_range(-0.6..0.6),
            );
            let position = anchor.position + offset;
            let radius = position.radial_length();

            particles.push(Particle {
                position,
                velocity: orbital_velocity(position, self.gravity_constant, CENTER_MASS),
                color: self.star_color(&mut rng, 0, radius).multiply_scalar(0.6),
                mass: rng.gen_range(0.0001..0.1),
                kind: ParticleKind::Ambient,
            });
        }

        log::info!(
            "generated galaxy: {} stars, {} particles, {} arms, seed {}",
            self.num_stars,
            self.num_particles,
            self.num_arms,
            self.seed
        );

        Ok(ParticleStore::new(particles))
    }

    fn star_color(&self, rng: &mut StdRng, arm: u32, radius: f32) -> Color {
        match self.color_policy {
            ColorPolicy::Gradient => gradient_color(radius),
            ColorPolicy::ArmPalette => ARM_PALETTE[arm as usize % ARM_PALETTE.len()],
            ColorPolicy::Classification => classification_color(rng.gen::<f32>()),
        }
    }
}

/// A position on a spiral arm: radius uniform in `[r_min, r_max]`, angle
/// `arm_base + tightness * r + jitter`, with a little vertical scatter.
pub fn arm_position(
    rng: &mut StdRng,
    num_arms: u32,
    tightness: f32,
    arm: u32,
    r_min: f32,
    r_max: f32,
) -> Vector3 {
    let r = rng.gen_range(r_min..r_max);
    let base = arm as f32 * TAU / num_arms as f32;
    let theta = base + tightness * r + rng.gen_range(-0.25..0.25);
    let y = rng.gen_range(-0.15..0.15);

    Vector3::new(theta.cos() * r, y, theta.sin() * r)
}

/// Keplerian-like circular-orbit seed velocity at `position` around a
/// central mass at the origin: `v = sqrt(G * M / r)`, directed tangentially
/// in the galactic plane.
pub fn orbital_velocity(position: Vector3, g: f32, central_mass: f32) -> Vector3 {
    let r = position.radial_length().max(MIN_DISTANCE);
    let speed = (g * central_mass / r).sqrt();

    // (-sin, 0, cos) of the azimuthal angle, i.e. (-z, 0, x) / r.
    Vector3::new(-position.z / r, 0.0, position.x / r) * speed
}

/// Inner-warm to outer-cool radial gradient.
fn gradient_color(radius: f32) -> Color {
    let t = ((radius - STAR_RADIUS_MIN) / (STAR_RADIUS_MAX - STAR_RADIUS_MIN)).clamp(0.0, 1.0);
    Color::new(1.0, 0.85, 0.55).lerp(&Color::new(0.55, 0.65, 1.0), t)
}

/// Fixed palette keyed by arm index.
const ARM_PALETTE: [Color; 4] = [
    Color::new(0.62, 0.71, 1.0),
    Color::new(1.0, 0.94, 0.82),
    Color::new(1.0, 0.8, 0.6),
    Color::new(0.8, 0.85, 1.0),
];

/// Stellar classes by cumulative probability. Blue supergiants are rare;
/// red dwarfs dominate.
const STELLAR_CLASSES: [(f32, u32); 5] = [
    (0.02, 0x9db4ff), // blue supergiant
    (0.12, 0xf8f7ff), // white
    (0.40, 0xfff4e8), // yellow
    (0.70, 0xffd9a6), // orange
    (1.00, 0xffb380), // red
];

fn classification_color(roll: f32) -> Color {
    for (bucket, hex) in STELLAR_CLASSES {
        if roll <= bucket {
            return Color::from_hex(hex);
        }
    }
    Color::from_hex(STELLAR_CLASSES[STELLAR_CLASSES.len() - 1].1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_zero_counts() {
        let mut cfg = GalaxyConfig::default();
        cfg.num_stars = 0;
        assert!(matches!(
            cfg.generate(),
            Err(GalaxyError::InvalidParameter(_))
        ));

        let mut cfg = GalaxyConfig::default();
        cfg.num_particles = 0;
        assert!(cfg.generate().is_err());

        let mut cfg = GalaxyConfig::default();
        cfg.num_arms = 0;
        assert!(cfg.generate().is_err());
    }

    #[test]
    fn test_counts_and_kinds() {
        let cfg = GalaxyConfig {
            num_stars: 10,
            num_particles: 100,
            num_arms: 3,
            ..Default::default()
        };
        let store = cfg.generate().unwrap();

        assert_eq!(store.len(), 1 + 10 + 100);
        assert_eq!(store.attractor_count(), 11);
        assert_eq!(store.particles()[0].kind, ParticleKind::Center);
    }

    #[test]
    fn test_same_seed_reproduces() {
        let cfg = GalaxyConfig {
            num_stars: 8,
            num_particles: 50,
            seed: 42,
            ..Default::default()
        };
        let a = cfg.generate().unwrap();
        let b = cfg.generate().unwrap();
        assert_eq!(a.particles(), b.particles());
    }

    #[test]
    fn test_star_invariants() {
        let store = GalaxyConfig::default().generate().unwrap();
        for star in store.particles().iter().filter(|p| p.kind == ParticleKind::Star) {
            let r = star.position.radial_length();
            assert!(r >= STAR_RADIUS_MIN - 0.001 && r <= STAR_RADIUS_MAX + 0.001);
            assert!(star.mass >= 20.0 && star.mass <= 300.0);
            // Seed velocity is tangential: orthogonal to the radial
            // direction in the plane.
            let radial = Vector3::new(star.position.x, 0.0, star.position.z);
            assert!(star.velocity.dot(&radial).abs() < 1e-3);
        }
    }

    #[test]
    fn test_orbital_velocity_floors_radius() {
        // A body exactly at the center must still get a finite seed.
        let v = orbital_velocity(Vector3::ZERO, 6.674e-3, CENTER_MASS);
        assert!(v.is_finite());
    }
}
