//! # Simplex Noise Implementation
//!
//! Deterministic 2D coherent noise, the base field behind every
//! [`NoiseManager`](crate::noise_manager::NoiseManager) channel.
//!
//! ## Determinism Guarantee
//!
//! Given the same `WorldSeed`, this implementation will produce
//! **exactly** the same values on any platform, any time. The whole
//! generation pipeline depends on this: two chunks generated hours apart
//! must agree on every shared cell.

use crate::random::CellRandom;

/// Stream purpose for the lattice shuffle.
const LATTICE_STREAM: u64 = 0x4c41_5454;

/// World seed for deterministic generation.
///
/// All procedural generation derives from this seed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct WorldSeed(u64);

impl WorldSeed {
    /// Creates a new world seed.
    #[inline]
    #[must_use]
    pub const fn new(seed: u64) -> Self {
        Self(seed)
    }

    /// Returns the raw seed value.
    #[inline]
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }

    /// Offsets the seed by a channel index (`seed + index`, wrapping).
    #[inline]
    #[must_use]
    pub const fn offset(self, index: u64) -> Self {
        Self(self.0.wrapping_add(index))
    }

    /// Derives a sub-seed for a specific purpose (e.g., region stitching).
    ///
    /// Uses a hash function to create independent streams from one seed.
    #[inline]
    #[must_use]
    pub const fn derive(self, purpose: u64) -> Self {
        // FNV-1a style mixing
        let mut hash = self.0;
        hash ^= purpose;
        hash = hash.wrapping_mul(0x517c_c1b7_2722_0a95);
        hash ^= hash >> 32;
        Self(hash)
    }
}

impl Default for WorldSeed {
    fn default() -> Self {
        Self(0xDEAD_BEEF_CAFE_BABE)
    }
}

/// Gradient directions for 2D simplex corners.
const GRADIENTS: [(f64, f64); 8] = [
    (1.0, 0.0),
    (1.0, 1.0),
    (0.0, 1.0),
    (-1.0, 1.0),
    (-1.0, 0.0),
    (-1.0, -1.0),
    (0.0, -1.0),
    (1.0, -1.0),
];

/// Seeded lattice hash: a shuffled 0..=255, doubled so two lookups
/// can be chained without masking.
struct Lattice {
    perm: [u8; 512],
}

impl Lattice {
    fn new(seed: WorldSeed) -> Self {
        let mut base: [u8; 256] = std::array::from_fn(|i| i as u8);
        CellRandom::new(seed.derive(LATTICE_STREAM).value()).shuffle(&mut base);

        let mut perm = [0u8; 512];
        perm[..256].copy_from_slice(&base);
        perm[256..].copy_from_slice(&base);
        Self { perm }
    }

    /// Gradient for lattice point (i, j).
    #[inline]
    fn gradient(&self, i: usize, j: usize) -> (f64, f64) {
        let hash = self.perm[i + self.perm[j] as usize];
        GRADIENTS[usize::from(hash) & 7]
    }
}

/// 2D Simplex noise generator.
///
/// Produces smooth, continuous noise values in the range [-1, 1].
/// Every lattice point (including the origin) samples to exactly `0.0`.
///
/// # Example
///
/// ```rust
/// use oldstudio_procedural::noise::{SimplexNoise, WorldSeed};
///
/// let noise = SimplexNoise::new(WorldSeed::new(42));
/// let value = noise.sample(100.5, 200.3);
/// assert!((-1.0..=1.0).contains(&value));
/// ```
pub struct SimplexNoise {
    lattice: Lattice,
}

impl SimplexNoise {
    /// Skewing factor for 2D simplex grid.
    const F2: f64 = 0.366_025_403_784_439; // (sqrt(3) - 1) / 2
    /// Unskewing factor for 2D simplex grid.
    const G2: f64 = 0.211_324_865_405_187; // (3 - sqrt(3)) / 6

    /// Creates a new simplex noise generator from a seed.
    #[must_use]
    pub fn new(seed: WorldSeed) -> Self {
        Self {
            lattice: Lattice::new(seed),
        }
    }

    /// Samples 2D simplex noise at the given coordinates.
    ///
    /// # Returns
    ///
    /// A value in the range [-1, 1].
    #[must_use]
    pub fn sample(&self, x: f64, y: f64) -> f64 {
        let skew = (x + y) * Self::F2;
        let i = (x + skew).floor();
        let j = (y + skew).floor();

        let unskew = (i + j) * Self::G2;
        let x0 = x - (i - unskew);
        let y0 = y - (j - unskew);

        // Middle corner of the triangle containing the point
        let (step_x, step_y): (usize, usize) = if x0 > y0 { (1, 0) } else { (0, 1) };

        let corners = [
            (x0, y0, 0, 0),
            (x0 - step_x as f64 + Self::G2, y0 - step_y as f64 + Self::G2, step_x, step_y),
            (x0 - 1.0 + 2.0 * Self::G2, y0 - 1.0 + 2.0 * Self::G2, 1, 1),
        ];

        let ii = (i as i64 & 255) as usize;
        let jj = (j as i64 & 255) as usize;
        let sum: f64 = corners
            .iter()
            .map(|&(dx, dy, ci, cj)| {
                let falloff = 0.5 - dx * dx - dy * dy;
                if falloff <= 0.0 {
                    return 0.0;
                }
                let (gx, gy) = self.lattice.gradient(ii + ci, jj + cj);
                falloff.powi(4) * (dx * gx + dy * gy)
            })
            .sum();

        (70.0 * sum).clamp(-1.0, 1.0)
    }

    /// Generates octaved (fractal) noise.
    ///
    /// # Arguments
    ///
    /// * `x`, `y` - Coordinates
    /// * `octaves` - Number of noise layers
    /// * `persistence` - Amplitude decay per octave (typically 0.5)
    /// * `lacunarity` - Frequency increase per octave (typically 2.0)
    ///
    /// # Returns
    ///
    /// A value in the range [-1, 1]; `0.0` for zero octaves.
    #[must_use]
    pub fn octaved(
        &self,
        x: f64,
        y: f64,
        octaves: u32,
        persistence: f64,
        lacunarity: f64,
    ) -> f64 {
        let mut total = 0.0;
        let mut amplitude = 1.0;
        let mut frequency = 1.0;
        let mut max_amplitude = 0.0;

        for _ in 0..octaves {
            total += self.sample(x * frequency, y * frequency) * amplitude;
            max_amplitude += amplitude;
            amplitude *= persistence;
            frequency *= lacunarity;
        }

        if max_amplitude > 0.0 {
            total / max_amplitude
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_determinism() {
        let seed = WorldSeed::new(12345);
        let noise1 = SimplexNoise::new(seed);
        let noise2 = SimplexNoise::new(seed);

        for i in 0..100 {
            let x = f64::from(i) * 0.1;
            let y = f64::from(i) * 0.17;
            assert_eq!(
                noise1.sample(x, y),
                noise2.sample(x, y),
                "Noise should be deterministic"
            );
        }
    }

    #[test]
    fn test_different_seeds_different_fields() {
        let noise1 = SimplexNoise::new(WorldSeed::new(1));
        let noise2 = SimplexNoise::new(WorldSeed::new(2));

        let differing = (0..64)
            .filter(|&i| {
                let x = f64::from(i) * 1.37 + 0.5;
                let y = f64::from(i) * 0.71 + 0.25;
                noise1.sample(x, y) != noise2.sample(x, y)
            })
            .count();

        assert!(differing > 32, "Different seeds should produce different fields");
    }

    #[test]
    fn test_zero_seed_is_not_degenerate() {
        let noise = SimplexNoise::new(WorldSeed::new(0));
        let nonzero = (0..100)
            .filter(|&i| noise.sample(f64::from(i) * 0.37 + 0.1, f64::from(i) * 0.53 + 0.2) != 0.0)
            .count();
        assert!(nonzero > 50);
    }

    #[test]
    fn test_range() {
        let noise = SimplexNoise::new(WorldSeed::new(42));

        for i in 0..10000 {
            let x = (f64::from(i) * 0.1) - 500.0;
            let y = (f64::from(i) * 0.13) - 650.0;
            let value = noise.sample(x, y);

            assert!(
                (-1.0..=1.0).contains(&value),
                "Value {value} out of range at ({x}, {y})"
            );
        }
    }

    #[test]
    fn test_origin_is_zero() {
        for seed in [0, 1, 42, u64::MAX] {
            let noise = SimplexNoise::new(WorldSeed::new(seed));
            assert_eq!(noise.sample(0.0, 0.0), 0.0);
        }
    }

    #[test]
    fn test_continuity() {
        let noise = SimplexNoise::new(WorldSeed::new(42));

        let x = 100.0;
        let y = 100.0;
        let delta = 0.001;

        let v1 = noise.sample(x, y);
        let v2 = noise.sample(x + delta, y);
        let v3 = noise.sample(x, y + delta);

        assert!((v1 - v2).abs() < 0.01, "Noise should be continuous");
        assert!((v1 - v3).abs() < 0.01, "Noise should be continuous");
    }

    #[test]
    fn test_octaved_noise() {
        let noise = SimplexNoise::new(WorldSeed::new(42));
        let value = noise.octaved(100.0, 100.0, 6, 0.5, 2.0);
        assert!((-1.0..=1.0).contains(&value));
        assert_eq!(noise.octaved(3.0, 4.0, 0, 0.5, 2.0), 0.0);
    }

    #[test]
    fn test_seed_derivation() {
        let base = WorldSeed::new(42);
        let derived1 = base.derive(1);
        let derived2 = base.derive(2);
        let derived1_again = base.derive(1);

        assert_ne!(derived1, derived2, "Different purposes should give different seeds");
        assert_eq!(derived1, derived1_again, "Same purpose should give same seed");
        assert_ne!(derived1, base, "Derived seed should differ from base");
        assert_eq!(base.offset(3).value(), 45);
        assert_eq!(WorldSeed::new(u64::MAX).offset(1).value(), 0);
    }
}
