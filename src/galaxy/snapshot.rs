//! Snapshot codec: serialize a session to JSON and re-seed one from JSON.
//!
//! Two document shapes are accepted on import:
//!
//! - unified: `{ "particles": [ { position, velocity?, color, mass, type? } ] }`
//! - legacy: `{ "stars": [...], "particles": [...] }` with the kind implied
//!   by the array an entry sits in.
//!
//! `color` may be an `[r, g, b]` triple or a `"#rrggbb"` string; both are
//! resolved to [`Color`] once at ingestion. A document with any malformed
//! entry is rejected whole; there is no partial load.

use super::particle::{Particle, ParticleKind, ParticleStore, MIN_DISTANCE};
use crate::math::{Color, Vector3};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors reported by snapshot import/export.
#[derive(Error, Debug)]
pub enum SnapshotError {
    /// The document is not valid JSON.
    #[error("failed to parse snapshot document: {0}")]
    Parse(serde_json::Error),

    /// The document is JSON but fails shape validation.
    #[error("malformed snapshot: {0}")]
    Malformed(String),
}

impl From<serde_json::Error> for SnapshotError {
    fn from(err: serde_json::Error) -> Self {
        match err.classify() {
            // Wrong arity, wrong type, unknown tag: a shape problem.
            serde_json::error::Category::Data => SnapshotError::Malformed(err.to_string()),
            _ => SnapshotError::Parse(err),
        }
    }
}

/// Color at the ingestion boundary: an RGB triple or a hex string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColorValue {
    /// `[r, g, b]` in 0.0-1.0.
    Rgb([f32; 3]),
    /// `"#rrggbb"` (the `#` is optional).
    Hex(String),
}

impl ColorValue {
    fn resolve(&self) -> Result<Color, SnapshotError> {
        match self {
            ColorValue::Rgb(rgb) => Ok(Color::from_array(*rgb)),
            ColorValue::Hex(s) => Color::from_hex_str(s).ok_or_else(|| {
                SnapshotError::Malformed(format!("unrecognized color string {s:?}"))
            }),
        }
    }
}

/// One particle entry in a snapshot document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotParticle {
    /// Position, exactly three components.
    pub position: [f32; 3],
    /// Velocity; absent means at rest.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub velocity: Option<[f32; 3]>,
    /// Color triple or hex string.
    pub color: ColorValue,
    /// Mass, positive.
    pub mass: f32,
    /// Kind tag; absent means "derive from mass and distance".
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<ParticleKind>,
}

/// A snapshot document in the unified shape.
#[derive(Debug, Clone, Serialize)]
pub struct SnapshotDocument {
    /// All particles, kind-tagged.
    pub particles: Vec<SnapshotParticle>,
}

/// The permissive import shape covering both unified and legacy documents.
#[derive(Debug, Deserialize)]
struct RawDocument {
    #[serde(default)]
    particles: Vec<SnapshotParticle>,
    #[serde(default)]
    stars: Option<Vec<SnapshotParticle>>,
}

/// Density-proxy mass for an ambient particle whose mass was not tracked:
/// `1 / (distance + epsilon)`. A derived, approximate field - not a
/// conserved physical quantity.
pub fn derived_ambient_mass(position: Vector3) -> f32 {
    1.0 / (position.length() + MIN_DISTANCE)
}

/// Kind for an entry that carried no tag, from mass and distance: the
/// nucleus is the very heavy body sitting at the center, star-range masses
/// are stars, everything else is ambient.
fn derive_kind(position: Vector3, mass: f32) -> ParticleKind {
    if mass >= 1000.0 && position.length() < 0.5 {
        ParticleKind::Center
    } else if mass >= 20.0 {
        ParticleKind::Star
    } else {
        ParticleKind::Ambient
    }
}

impl SnapshotParticle {
    fn resolve(&self, implied_kind: Option<ParticleKind>) -> Result<Particle, SnapshotError> {
        let position = Vector3::from_array(self.position);
        if !position.is_finite() {
            return Err(SnapshotError::Malformed("non-finite position".into()));
        }

        let velocity = Vector3::from_array(self.velocity.unwrap_or([0.0; 3]));
        if !velocity.is_finite() {
            return Err(SnapshotError::Malformed("non-finite velocity".into()));
        }

        if !(self.mass.is_finite() && self.mass > 0.0) {
            return Err(SnapshotError::Malformed(format!(
                "mass {} is not a positive number",
                self.mass
            )));
        }

        let kind = self
            .kind
            .or(implied_kind)
            .unwrap_or_else(|| derive_kind(position, self.mass));

        Ok(Particle {
            position,
            velocity,
            color: self.color.resolve()?,
            mass: self.mass,
            kind,
        })
    }
}

impl SnapshotDocument {
    /// Build a snapshot from the store's tracked state.
    pub fn from_store(store: &ParticleStore) -> Self {
        let particles = store
            .particles()
            .iter()
            .map(|p| SnapshotParticle {
                position: p.position.to_array(),
                velocity: Some(p.velocity.to_array()),
                color: ColorValue::Rgb(p.color.to_array()),
                mass: p.mass,
                kind: Some(p.kind),
            })
            .collect();

        Self { particles }
    }

    /// Build a snapshot from raw field arrays, as read back from the GPU
    /// engine. `star_masses[i]` of `None` marks an ambient particle, whose
    /// exported mass becomes the [`derived_ambient_mass`] density proxy.
    pub fn from_fields(
        positions: &[Vector3],
        velocities: &[Vector3],
        colors: &[Color],
        star_masses: &[Option<f32>],
    ) -> Self {
        let particles = positions
            .iter()
            .zip(velocities)
            .zip(colors)
            .zip(star_masses)
            .map(|(((&position, &velocity), &color), &star_mass)| {
                let mass = star_mass.unwrap_or_else(|| derived_ambient_mass(position));
                SnapshotParticle {
                    position: position.to_array(),
                    velocity: Some(velocity.to_array()),
                    color: ColorValue::Rgb(color.to_array()),
                    mass,
                    kind: Some(derive_kind(position, mass)),
                }
            })
            .collect();

        Self { particles }
    }

    /// Serialize to a JSON string.
    pub fn to_json(&self) -> Result<String, SnapshotError> {
        serde_json::to_string(self).map_err(SnapshotError::from)
    }

    /// Parse and validate a document in either accepted shape, producing a
    /// fully valid store or nothing.
    pub fn import_json(json: &str) -> Result<ParticleStore, SnapshotError> {
        let raw: RawDocument = serde_json::from_str(json)?;

        if raw.stars.is_none() && raw.particles.is_empty() {
            return Err(SnapshotError::Malformed(
                "document contains no particles".into(),
            ));
        }

        let mut particles = Vec::with_capacity(
            raw.particles.len() + raw.stars.as_ref().map_or(0, Vec::len),
        );

        match raw.stars {
            // Legacy shape: two top-level arrays, kind implied per array.
            Some(stars) => {
                for entry in &stars {
                    particles.push(entry.resolve(Some(ParticleKind::Star))?);
                }
                for entry in &raw.particles {
                    particles.push(entry.resolve(Some(ParticleKind::Ambient))?);
                }
            }
            // Unified shape: one array, tagged or derivable per entry.
            None => {
                for entry in &raw.particles {
                    particles.push(entry.resolve(None)?);
                }
            }
        }

        log::debug!("imported snapshot with {} particles", particles.len());
        Ok(ParticleStore::new(particles))
    }
}

impl ParticleStore {
    /// Export the session as a snapshot document.
    pub fn export_snapshot(&self) -> SnapshotDocument {
        SnapshotDocument::from_store(self)
    }

    /// Re-seed a session from a snapshot document string.
    pub fn from_snapshot_json(json: &str) -> Result<Self, SnapshotError> {
        SnapshotDocument::import_json(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::galaxy::GalaxyConfig;

    fn sample_store(particle_count: usize) -> ParticleStore {
        GalaxyConfig {
            num_stars: 12,
            num_particles: particle_count,
            seed: 7,
            ..Default::default()
        }
        .generate()
        .unwrap()
    }

    #[test]
    fn test_unified_roundtrip() {
        let store = sample_store(200);
        let json = store.export_snapshot().to_json().unwrap();
        let back = ParticleStore::from_snapshot_json(&json).unwrap();

        assert_eq!(store.len(), back.len());
        for (a, b) in store.particles().iter().zip(back.particles()) {
            assert!(a.position.approx_eq(&b.position, 1e-6));
            assert!(a.velocity.approx_eq(&b.velocity, 1e-6));
            assert!(a.color.approx_eq(&b.color, 1e-6));
            assert!((a.mass - b.mass).abs() < 1e-6);
            assert_eq!(a.kind, b.kind);
        }
    }

    #[test]
    fn test_legacy_shape() {
        let json = r##"{
            "stars": [
                { "position": [1.0, 0.0, 2.0], "color": "#ffcc00", "mass": 120.0 }
            ],
            "particles": [
                { "position": [0.5, 0.0, 0.5], "color": [0.2, 0.4, 0.9], "mass": 0.01 }
            ]
        }"##;
        let store = ParticleStore::from_snapshot_json(json).unwrap();

        assert_eq!(store.len(), 2);
        assert_eq!(store.particles()[0].kind, ParticleKind::Star);
        assert_eq!(store.particles()[1].kind, ParticleKind::Ambient);
        // Absent velocity defaults to rest.
        assert_eq!(store.particles()[0].velocity, Vector3::ZERO);
        // Hex color resolved at ingestion.
        assert_eq!(store.particles()[0].color.to_hex(), 0xffcc00);
    }

    #[test]
    fn test_large_store_roundtrip() {
        let store = sample_store(10_000);
        let json = store.export_snapshot().to_json().unwrap();
        let back = ParticleStore::from_snapshot_json(&json).unwrap();

        assert_eq!(store.len(), back.len());
        for (a, b) in store.particles().iter().zip(back.particles()) {
            assert!(a.position.approx_eq(&b.position, 1e-6));
            assert!(a.velocity.approx_eq(&b.velocity, 1e-6));
            assert_eq!(a.kind, b.kind);
        }
    }

    #[test]
    fn test_legacy_document_roundtrip() {
        // Re-shape a generated store into the legacy two-array document
        // and import it back; kinds come from the arrays.
        let store = sample_store(50);
        let entry = |p: &Particle| {
            serde_json::json!({
                "position": p.position.to_array(),
                "velocity": p.velocity.to_array(),
                "color": p.color.to_array(),
                "mass": p.mass,
            })
        };
        let stars: Vec<_> = store
            .particles()
            .iter()
            .filter(|p| p.kind == ParticleKind::Star)
            .map(entry)
            .collect();
        let ambient: Vec<_> = store
            .particles()
            .iter()
            .filter(|p| p.kind == ParticleKind::Ambient)
            .map(entry)
            .collect();
        let star_count = stars.len();
        let json = serde_json::json!({ "stars": stars, "particles": ambient }).to_string();

        let back = ParticleStore::from_snapshot_json(&json).unwrap();
        // The nucleus has no legacy array; everything else survives.
        assert_eq!(back.len(), store.len() - 1);
        assert_eq!(back.attractor_count(), star_count);
        for p in back.particles().iter().take(star_count) {
            assert_eq!(p.kind, ParticleKind::Star);
        }
    }

    #[test]
    fn test_kind_derived_when_untagged() {
        let json = r#"{ "particles": [
            { "position": [0.0, 0.0, 0.0], "color": [1, 1, 1], "mass": 4000.0 },
            { "position": [3.0, 0.0, 0.0], "color": [1, 1, 1], "mass": 150.0 },
            { "position": [3.0, 0.0, 0.0], "color": [1, 1, 1], "mass": 0.01 }
        ] }"#;
        let store = ParticleStore::from_snapshot_json(json).unwrap();
        let kinds: Vec<_> = store.particles().iter().map(|p| p.kind).collect();
        assert_eq!(
            kinds,
            [ParticleKind::Center, ParticleKind::Star, ParticleKind::Ambient]
        );
    }

    #[test]
    fn test_rejects_wrong_arity_position() {
        let json = r#"{ "particles": [
            { "position": [1.0, 2.0], "color": [1, 1, 1], "mass": 1.0 }
        ] }"#;
        assert!(matches!(
            ParticleStore::from_snapshot_json(json),
            Err(SnapshotError::Malformed(_))
        ));
    }

    #[test]
    fn test_rejects_bad_color_string() {
        let json = r##"{ "particles": [
            { "position": [1.0, 2.0, 3.0], "color": "#zzz", "mass": 1.0 }
        ] }"##;
        assert!(matches!(
            ParticleStore::from_snapshot_json(json),
            Err(SnapshotError::Malformed(_))
        ));
    }

    #[test]
    fn test_rejects_non_positive_mass() {
        let json = r#"{ "particles": [
            { "position": [1.0, 2.0, 3.0], "color": [1, 1, 1], "mass": 0.0 }
        ] }"#;
        assert!(ParticleStore::from_snapshot_json(json).is_err());
    }

    #[test]
    fn test_whole_document_rejection() {
        // One bad entry among good ones rejects everything.
        let json = r#"{ "particles": [
            { "position": [1.0, 2.0, 3.0], "color": [1, 1, 1], "mass": 1.0 },
            { "position": [1.0, 2.0, 3.0], "color": [1, 1, 1], "mass": -5.0 }
        ] }"#;
        assert!(ParticleStore::from_snapshot_json(json).is_err());
    }

    #[test]
    fn test_syntax_error_is_parse() {
        assert!(matches!(
            ParticleStore::from_snapshot_json("{ not json"),
            Err(SnapshotError::Parse(_))
        ));
    }

    #[test]
    fn test_derived_mass_is_density_proxy() {
        let near = derived_ambient_mass(Vector3::new(0.2, 0.0, 0.0));
        let far = derived_ambient_mass(Vector3::new(8.0, 0.0, 0.0));
        assert!(near > far);
        assert!(derived_ambient_mass(Vector3::ZERO).is_finite());
    }
}
