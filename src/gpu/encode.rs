//! Texel layouts for the texture-backed simulation.
//!
//! Particle state lives in square `Rgba32Float` textures: index `i` maps to
//! texel `(i % dim, i / dim)`. The position texture's alpha channel carries
//! a kind discriminant so the shader never needs a second lookup:
//!
//! - `0.0` marks an ambient particle,
//! - `>= 1.0` marks an attractor, with mass recovered as
//!   `(alpha - 1.0) * 1000`,
//! - [`PADDING_SENTINEL`] marks the unused texels past the particle count.

use crate::galaxy::{ParticleKind, ParticleStore};
use crate::math::Vector3;

/// Alpha value of texels past the particle count. The shader passes these
/// through untouched and the renderer never draws them.
pub const PADDING_SENTINEL: f32 = -1.0;

/// Mass scale folded into the attractor discriminant.
const MASS_SCALE: f32 = 1000.0;

/// Star-influence radius in simulation units. The spatial grid's cell size
/// equals this, so a 3x3 cell scan covers every star in range.
pub const INFLUENCE_RADIUS: f32 = 2.5;

/// Cells per side of the star grid. Covers a square of
/// `GRID_DIM * INFLUENCE_RADIUS` units centered on the origin, which
/// contains the whole simulation disc.
pub const GRID_DIM: u32 = 16;

/// Side length of the square state texture holding `count` particles.
pub fn texture_dim(count: usize) -> u32 {
    (count as f64).sqrt().ceil() as u32
}

/// Pack a particle kind and mass into the position-texture alpha channel.
pub fn pack_discriminant(kind: ParticleKind, mass: f32) -> f32 {
    if kind.is_attractor() {
        1.0 + mass / MASS_SCALE
    } else {
        0.0
    }
}

/// Recover an attractor's mass from the discriminant. `None` for ambient
/// and padding texels.
pub fn unpack_star_mass(alpha: f32) -> Option<f32> {
    (alpha >= 1.0).then(|| (alpha - 1.0) * MASS_SCALE)
}

/// Texture coordinate of particle `i`'s texel center, for a `dim`-sided
/// state texture.
pub fn reference_coord(index: usize, dim: u32) -> [f32; 2] {
    let x = (index as u32 % dim) as f32;
    let y = (index as u32 / dim) as f32;
    [(x + 0.5) / dim as f32, (y + 0.5) / dim as f32]
}

/// Star-grid cell containing the plane position `(x, z)`, or `None` when
/// the position lies outside the grid's coverage.
pub fn grid_cell(x: f32, z: f32) -> Option<(u32, u32)> {
    let half = GRID_DIM as f32 * INFLUENCE_RADIUS * 0.5;
    let cx = ((x + half) / INFLUENCE_RADIUS).floor();
    let cz = ((z + half) / INFLUENCE_RADIUS).floor();
    if cx < 0.0 || cz < 0.0 || cx >= GRID_DIM as f32 || cz >= GRID_DIM as f32 {
        return None;
    }
    Some((cx as u32, cz as u32))
}

/// Encode positions plus the kind discriminant into `dim * dim` rgba
/// texels.
pub fn encode_positions(store: &ParticleStore, dim: u32) -> Vec<f32> {
    let mut texels = vec![0.0f32; (dim * dim * 4) as usize];
    for chunk in texels.chunks_exact_mut(4) {
        chunk[3] = PADDING_SENTINEL;
    }
    for (i, p) in store.particles().iter().enumerate() {
        let o = i * 4;
        texels[o] = p.position.x;
        texels[o + 1] = p.position.y;
        texels[o + 2] = p.position.z;
        texels[o + 3] = pack_discriminant(p.kind, p.mass);
    }
    texels
}

/// Encode velocities into `dim * dim` rgba texels; alpha is unused.
pub fn encode_velocities(store: &ParticleStore, dim: u32) -> Vec<f32> {
    let mut texels = vec![0.0f32; (dim * dim * 4) as usize];
    for (i, p) in store.particles().iter().enumerate() {
        let o = i * 4;
        texels[o] = p.velocity.x;
        texels[o + 1] = p.velocity.y;
        texels[o + 2] = p.velocity.z;
        texels[o + 3] = 1.0;
    }
    texels
}

/// Encode display colors into `dim * dim` rgba texels.
pub fn encode_colors(store: &ParticleStore, dim: u32) -> Vec<f32> {
    let mut texels = vec![0.0f32; (dim * dim * 4) as usize];
    for (i, p) in store.particles().iter().enumerate() {
        let o = i * 4;
        texels[o] = p.color.r;
        texels[o + 1] = p.color.g;
        texels[o + 2] = p.color.b;
        texels[o + 3] = 1.0;
    }
    texels
}

/// Build the static star-grid texture: `GRID_DIM * GRID_DIM` rgba texels,
/// each holding one star's `(x, y, z, mass)`. A cell keeps the first star
/// that lands in it; empty cells carry mass `0.0`. The center is excluded,
/// its pull is applied analytically in the shader.
pub fn build_star_grid(store: &ParticleStore) -> Vec<f32> {
    let mut texels = vec![0.0f32; (GRID_DIM * GRID_DIM * 4) as usize];
    for star in store
        .particles()
        .iter()
        .filter(|p| p.kind == ParticleKind::Star)
    {
        let Some((cx, cz)) = grid_cell(star.position.x, star.position.z) else {
            continue;
        };
        let o = ((cz * GRID_DIM + cx) * 4) as usize;
        if texels[o + 3] > 0.0 {
            continue;
        }
        texels[o] = star.position.x;
        texels[o + 1] = star.position.y;
        texels[o + 2] = star.position.z;
        texels[o + 3] = star.mass;
    }
    texels
}

/// Decode a raw rgba texel slice back into vectors plus per-particle star
/// masses, dropping the padding tail. Used on readback for export.
pub fn decode_positions(texels: &[f32], count: usize) -> (Vec<Vector3>, Vec<Option<f32>>) {
    let mut positions = Vec::with_capacity(count);
    let mut masses = Vec::with_capacity(count);
    for chunk in texels.chunks_exact(4).take(count) {
        positions.push(Vector3::new(chunk[0], chunk[1], chunk[2]));
        masses.push(unpack_star_mass(chunk[3]));
    }
    (positions, masses)
}

/// Decode a velocity texel slice, dropping the padding tail.
pub fn decode_velocities(texels: &[f32], count: usize) -> Vec<Vector3> {
    texels
        .chunks_exact(4)
        .take(count)
        .map(|c| Vector3::new(c[0], c[1], c[2]))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::galaxy::GalaxyConfig;

    fn small_store() -> ParticleStore {
        GalaxyConfig {
            num_stars: 6,
            num_particles: 20,
            seed: 11,
            ..Default::default()
        }
        .generate()
        .unwrap()
    }

    #[test]
    fn test_texture_dim_is_minimal_square() {
        assert_eq!(texture_dim(1), 1);
        assert_eq!(texture_dim(4), 2);
        assert_eq!(texture_dim(5), 3);
        assert_eq!(texture_dim(10_001), 101);
        for n in [1usize, 2, 16, 17, 99, 4096, 10_001] {
            let s = texture_dim(n);
            assert!((s * s) as usize >= n);
            assert!(s == 1 || (((s - 1) * (s - 1)) as usize) < n);
        }
    }

    #[test]
    fn test_discriminant_roundtrip() {
        for mass in [0.0f32, 1.0, 20.0, 150.0, 4000.0, 1.0e6] {
            let alpha = pack_discriminant(ParticleKind::Star, mass);
            let back = unpack_star_mass(alpha).unwrap();
            assert!((back - mass).abs() <= mass.max(1.0) * 1e-4);
        }
        assert_eq!(pack_discriminant(ParticleKind::Ambient, 0.05), 0.0);
        assert_eq!(unpack_star_mass(0.0), None);
        assert_eq!(unpack_star_mass(PADDING_SENTINEL), None);
    }

    #[test]
    fn test_reference_coord_hits_texel_centers() {
        assert_eq!(reference_coord(0, 4), [0.125, 0.125]);
        assert_eq!(reference_coord(5, 4), [0.375, 0.375]);
        // Last texel of a 4x4 layout.
        assert_eq!(reference_coord(15, 4), [0.875, 0.875]);
    }

    #[test]
    fn test_grid_cell_coverage() {
        assert_eq!(grid_cell(0.0, 0.0), Some((8, 8)));
        assert_eq!(grid_cell(-0.1, -0.1), Some((7, 7)));
        // Just inside and just outside the coverage edge.
        let half = GRID_DIM as f32 * INFLUENCE_RADIUS * 0.5;
        assert!(grid_cell(half - 0.01, 0.0).is_some());
        assert_eq!(grid_cell(half + 0.01, 0.0), None);
        assert_eq!(grid_cell(0.0, -half - 0.01), None);
    }

    #[test]
    fn test_encode_pads_with_sentinel() {
        let store = small_store();
        let dim = texture_dim(store.len());
        let texels = encode_positions(&store, dim);

        assert_eq!(texels.len(), (dim * dim * 4) as usize);
        for (i, chunk) in texels.chunks_exact(4).enumerate() {
            if i < store.len() {
                assert!(chunk[3] >= 0.0);
            } else {
                assert_eq!(chunk[3], PADDING_SENTINEL);
            }
        }
    }

    #[test]
    fn test_encode_decode_positions() {
        let store = small_store();
        let dim = texture_dim(store.len());
        let texels = encode_positions(&store, dim);
        let (positions, masses) = decode_positions(&texels, store.len());

        for ((p, pos), mass) in store.particles().iter().zip(&positions).zip(&masses) {
            assert!(p.position.approx_eq(pos, 1e-6));
            match p.kind {
                ParticleKind::Ambient => assert_eq!(*mass, None),
                _ => {
                    let m = mass.unwrap();
                    assert!((m - p.mass).abs() <= p.mass * 1e-4);
                }
            }
        }
    }

    #[test]
    fn test_star_grid_one_star_per_cell() {
        let store = small_store();
        let grid = build_star_grid(&store);

        assert_eq!(grid.len(), (GRID_DIM * GRID_DIM * 4) as usize);
        let occupied = grid.chunks_exact(4).filter(|c| c[3] > 0.0).count();
        assert!(occupied >= 1 && occupied <= 6);
        // Every occupied cell actually contains its star.
        for (i, c) in grid.chunks_exact(4).enumerate() {
            if c[3] <= 0.0 {
                continue;
            }
            let cell = grid_cell(c[0], c[2]).unwrap();
            assert_eq!((cell.1 * GRID_DIM + cell.0) as usize, i);
        }
    }
}
