//! CPU force integrator: one nested-loop pass per animation frame.
//!
//! Each tick captures the previous frame's attractor states, advances the
//! stars along their circular orbits, then accumulates softened gravity and
//! an orbital-alignment term for every ambient particle. All divisions are
//! floored by [`MIN_DISTANCE`], so a valid store never produces a
//! non-finite component; there is no per-frame error channel.

use crate::galaxy::{
    arm_position, orbital_velocity, BoundaryPolicy, GalaxyConfig, ParticleKind, ParticleStore,
    CENTER_MASS, MIN_DISTANCE,
};
use crate::math::Vector3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// When the session has at most this many attractors, every ambient
/// particle scans all of them.
const K_ALL: usize = 64;

/// Above [`K_ALL`] attractors, each ambient particle scans only the first
/// `K_NEAREST` in store order - a cheap, deterministic proxy for a true
/// nearest-K search.
const K_NEAREST: usize = 16;

/// Radius band used by the respawn boundary policy.
const RESPAWN_BAND: (f32, f32) = (4.0, 8.0);

/// Tunable integrator parameters.
#[derive(Debug, Clone)]
pub struct SimParams {
    /// Gravitational constant.
    pub gravity_constant: f32,
    /// Per-frame velocity damping factor, in (0, 1]. Removes the numerical
    /// energy the explicit integration gains.
    pub damping: f32,
    /// Blend rate toward the ideal tangential orbit, per second.
    pub orbital_strength: f32,
    /// Hard cap on ambient particle speed.
    pub max_velocity: f32,
    /// Maximum radius before the boundary policy applies.
    pub max_radius: f32,
    /// Boundary containment policy.
    pub boundary_policy: BoundaryPolicy,
    /// Arm count, used by the respawn policy.
    pub num_arms: u32,
    /// Spiral tightness, used by the respawn policy.
    pub spiral_tightness: f32,
    /// Per-frame factor pulling stars toward the galactic plane.
    pub settling: f32,
    /// Extra pull factor for the nucleus relative to peripheral stars.
    pub center_bias: f32,
}

impl Default for SimParams {
    fn default() -> Self {
        Self::from_config(&GalaxyConfig::default())
    }
}

impl SimParams {
    /// Derive integrator parameters from a generation config.
    pub fn from_config(config: &GalaxyConfig) -> Self {
        Self {
            gravity_constant: config.gravity_constant,
            damping: config.damping,
            orbital_strength: 0.35,
            max_velocity: 5.0,
            max_radius: config.max_radius,
            boundary_policy: config.boundary_policy,
            num_arms: config.num_arms,
            spiral_tightness: config.spiral_tightness,
            settling: 0.999,
            center_bias: 4.0,
        }
    }
}

/// Previous-frame attractor state, captured before any particle moves so
/// ambient accumulation never observes a half-updated frame.
#[derive(Debug, Clone, Copy)]
struct Attractor {
    position: Vector3,
    mass: f32,
    is_center: bool,
}

/// The per-frame CPU integrator.
pub struct CpuIntegrator {
    params: SimParams,
    rng: StdRng,
    /// Scratch buffer of captured attractors, reused across frames.
    attractors: Vec<Attractor>,
}

impl CpuIntegrator {
    /// Create an integrator. The seed only affects the respawn boundary
    /// policy; with the clamp policy stepping is fully deterministic.
    pub fn new(params: SimParams, seed: u64) -> Self {
        Self {
            params,
            rng: StdRng::seed_from_u64(seed),
            attractors: Vec::new(),
        }
    }

    /// Current parameters.
    pub fn params(&self) -> &SimParams {
        &self.params
    }

    /// Replace the parameters; takes effect on the next step.
    pub fn set_params(&mut self, params: SimParams) {
        self.params = params;
    }

    /// Advance the store by one frame of `dt` seconds (already capped by
    /// [`crate::core::FrameClock`]).
    pub fn step(&mut self, store: &mut ParticleStore, dt: f32) {
        if dt <= 0.0 {
            return;
        }

        self.capture_attractors(store);
        self.advance_stars(store, dt);
        self.advance_ambient(store, dt);
    }

    fn capture_attractors(&mut self, store: &ParticleStore) {
        self.attractors.clear();
        self.attractors.extend(store.attractors().map(|p| Attractor {
            position: p.position,
            mass: p.mass,
            is_center: p.kind == ParticleKind::Center,
        }));
    }

    /// Stars ride simple circular orbits around the origin and settle
    /// toward the galactic plane; they take no gravitational input from
    /// ambient particles. The center stays fixed.
    fn advance_stars(&mut self, store: &mut ParticleStore, dt: f32) {
        let g = self.params.gravity_constant;

        for p in store.particles_mut() {
            if p.kind != ParticleKind::Star {
                continue;
            }

            let r = p.position.radial_length().max(MIN_DISTANCE);
            let omega = (g * CENTER_MASS / r).sqrt() / r;
            let theta = p.position.z.atan2(p.position.x) + omega * dt;

            p.position = Vector3::new(
                theta.cos() * r,
                p.position.y * self.params.settling,
                theta.sin() * r,
            );
            p.velocity = orbital_velocity(p.position, g, CENTER_MASS);
        }
    }

    fn advance_ambient(&mut self, store: &mut ParticleStore, dt: f32) {
        let params = self.params.clone();
        let scan = if self.attractors.len() <= K_ALL {
            self.attractors.len()
        } else {
            K_NEAREST
        };

        for p in store.particles_mut() {
            if p.kind != ParticleKind::Ambient {
                continue;
            }

            // Softened inverse-square gravity over the selected stars.
            // `d / dist^3` is the normalized direction over dist^2; ambient
            // mass is visual-only and does not divide the pull.
            let mut accel = Vector3::ZERO;
            for attractor in &self.attractors[..scan] {
                let d = attractor.position - p.position;
                let dist = d.length();
                if dist <= MIN_DISTANCE {
                    continue;
                }
                let bias = if attractor.is_center { params.center_bias } else { 1.0 };
                accel += d * (params.gravity_constant * attractor.mass * bias
                    / (dist * dist * dist));
            }

            // Orbital alignment keeps raw gravity from spiraling particles
            // into the core or flinging them out.
            let ideal = orbital_velocity(p.position, params.gravity_constant, CENTER_MASS);
            let blend = (params.orbital_strength * dt).min(1.0);
            p.velocity = p.velocity.lerp(&ideal, blend);

            p.velocity = (p.velocity * params.damping + accel * dt)
                .clamp_length(params.max_velocity);
            p.position += p.velocity * dt;

            self.contain(p, dt);
        }
    }

    fn contain(&mut self, p: &mut crate::galaxy::Particle, _dt: f32) {
        let r = p.position.length();
        if r <= self.params.max_radius {
            return;
        }

        match self.params.boundary_policy {
            BoundaryPolicy::Clamp => {
                p.position *= self.params.max_radius / r;
                p.velocity *= 0.5;
            }
            BoundaryPolicy::Respawn => {
                let arm = self.rng.gen_range(0..self.params.num_arms);
                p.position = arm_position(
                    &mut self.rng,
                    self.params.num_arms,
                    self.params.spiral_tightness,
                    arm,
                    RESPAWN_BAND.0,
                    RESPAWN_BAND.1,
                );
                p.velocity =
                    orbital_velocity(p.position, self.params.gravity_constant, CENTER_MASS);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario_store() -> ParticleStore {
        GalaxyConfig {
            num_stars: 10,
            num_particles: 100,
            num_arms: 3,
            seed: 3,
            ..Default::default()
        }
        .generate()
        .unwrap()
    }

    /// Place one ambient particle at `position`; returns its index.
    fn ambient_at(position: Vector3) -> (ParticleStore, usize) {
        let mut store = scenario_store();
        let index = store
            .particles()
            .iter()
            .position(|p| p.kind == ParticleKind::Ambient)
            .unwrap();
        let p = &mut store.particles_mut()[index];
        p.position = position;
        p.velocity = Vector3::ZERO;
        (store, index)
    }

    #[test]
    fn test_one_step_is_finite_and_bounded() {
        let mut store = scenario_store();
        let before: Vec<Vector3> = store.particles().iter().map(|p| p.position).collect();

        let mut sim = CpuIntegrator::new(SimParams::default(), 0);
        let dt = 0.016;
        sim.step(&mut store, dt);

        let max_delta = sim.params().max_velocity * dt + 1e-4;
        for (p, old) in store.particles().iter().zip(&before) {
            assert!(p.position.is_finite());
            assert!(p.velocity.is_finite());
            if p.kind == ParticleKind::Ambient {
                assert!(p.position.distance_to(old) <= max_delta);
            }
        }
    }

    #[test]
    fn test_many_frames_stay_finite() {
        let mut store = scenario_store();
        let mut sim = CpuIntegrator::new(SimParams::default(), 0);

        for _ in 0..500 {
            sim.step(&mut store, 0.016);
        }
        for p in store.particles() {
            assert!(p.position.is_finite());
            assert!(p.velocity.is_finite());
        }
    }

    #[test]
    fn test_particle_at_center_survives() {
        // Exactly on top of the nucleus: the distance floor must keep the
        // math finite.
        let (mut store, _) = ambient_at(Vector3::ZERO);
        let mut sim = CpuIntegrator::new(SimParams::default(), 0);
        sim.step(&mut store, 0.016);
        for p in store.particles() {
            assert!(p.position.is_finite());
        }
    }

    #[test]
    fn test_clamp_policy_contains() {
        let (mut store, _) = ambient_at(Vector3::new(30.0, 0.0, 0.0));
        let params = SimParams {
            boundary_policy: BoundaryPolicy::Clamp,
            ..SimParams::default()
        };
        let max_radius = params.max_radius;

        let mut sim = CpuIntegrator::new(params, 0);
        sim.step(&mut store, 0.016);

        for p in store.particles().iter().filter(|p| p.kind == ParticleKind::Ambient) {
            assert!(p.position.length() <= max_radius + 1e-3);
        }
    }

    #[test]
    fn test_respawn_policy_relocates_to_band() {
        let (mut store, index) = ambient_at(Vector3::new(30.0, 0.0, 0.0));
        let params = SimParams {
            boundary_policy: BoundaryPolicy::Respawn,
            ..SimParams::default()
        };

        let mut sim = CpuIntegrator::new(params, 1);
        sim.step(&mut store, 0.016);

        // The escaped particle must land back in the respawn band.
        let r = store.particles()[index].position.length();
        assert!(r >= 3.9 && r <= 8.1, "respawned radius {r} outside band");
    }

    #[test]
    fn test_clamp_stepping_is_deterministic() {
        let run = || {
            let mut store = scenario_store();
            let mut sim = CpuIntegrator::new(SimParams::default(), 0);
            for _ in 0..10 {
                sim.step(&mut store, 0.016);
            }
            store
        };
        let a = run();
        let b = run();
        assert_eq!(a.particles(), b.particles());
    }

    #[test]
    fn test_stars_hold_radius() {
        let mut store = scenario_store();
        let radii: Vec<f32> = store
            .particles()
            .iter()
            .filter(|p| p.kind == ParticleKind::Star)
            .map(|p| p.position.radial_length())
            .collect();

        let mut sim = CpuIntegrator::new(SimParams::default(), 0);
        for _ in 0..100 {
            sim.step(&mut store, 0.016);
        }

        let after: Vec<f32> = store
            .particles()
            .iter()
            .filter(|p| p.kind == ParticleKind::Star)
            .map(|p| p.position.radial_length())
            .collect();
        for (r0, r1) in radii.iter().zip(&after) {
            assert!((r0 - r1).abs() < 1e-3);
        }
    }

    #[test]
    fn test_zero_dt_is_a_no_op() {
        let mut store = scenario_store();
        let before = store.clone();
        let mut sim = CpuIntegrator::new(SimParams::default(), 0);
        sim.step(&mut store, 0.0);
        assert_eq!(before.particles(), store.particles());
    }
}
