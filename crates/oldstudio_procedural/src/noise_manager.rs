//! # Noise Manager
//!
//! Ten independent coherent-noise channels, each seeded with
//! `seed + channel_index` and sampled at its own fixed scale, plus the
//! composite fields built on top of them.
//!
//! ## Channels
//!
//! | Channel      | Scale | Range   | Drives                              |
//! |--------------|-------|---------|-------------------------------------|
//! | Algorithm    | 0.001 | [0, 1]  | maze strategy regions               |
//! | Organic      | 0.005 | [-1, 1] | organic rooms, composites           |
//! | Connection   | 0.01  | [0, 1]  | extra portals between regions       |
//! | Modification | 0.02  | [0, 1]  | special tags, dead ends, themes     |
//! | Ceiling      | 0.05  | [-1, 1] | ceiling soffits                     |
//! | Wall         | 0.1   | [0, 1]  | wall irregularity                   |
//! | Lighting     | 0.03  | [0, 1]  | extra lights                        |
//! | Density      | 0.008 | [0, 1]  | room density regions                |
//! | Theme        | 0.002 | [0, 1]  | theme regions                       |
//! | Prop         | 0.2   | [0, 1]  | prop scattering                     |
//!
//! Every scale is multiplied by the configured noise-scale multiplier.
//! All lookups are pure: the same seed, channel and position always give
//! the same value.

use crate::noise::{SimplexNoise, WorldSeed};

/// Independent noise channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NoiseChannel {
    /// Strategy selection.
    Algorithm,
    /// Organic variation (signed).
    Organic,
    /// Connection probability.
    Connection,
    /// Cell modification.
    Modification,
    /// Ceiling height variation (signed).
    Ceiling,
    /// Wall irregularity.
    Wall,
    /// Lighting variation.
    Lighting,
    /// Room density.
    Density,
    /// Theme selection.
    Theme,
    /// Prop placement.
    Prop,
}

impl NoiseChannel {
    /// Every channel, in seed-offset order.
    pub const ALL: [Self; 10] = [
        Self::Algorithm,
        Self::Organic,
        Self::Connection,
        Self::Modification,
        Self::Ceiling,
        Self::Wall,
        Self::Lighting,
        Self::Density,
        Self::Theme,
        Self::Prop,
    ];

    /// Offset added to the world seed for this channel.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Base sampling scale before the multiplier.
    #[must_use]
    pub const fn base_scale(self) -> f64 {
        match self {
            Self::Algorithm => 0.001,
            Self::Organic => 0.005,
            Self::Connection => 0.01,
            Self::Modification => 0.02,
            Self::Ceiling => 0.05,
            Self::Wall => 0.1,
            Self::Lighting => 0.03,
            Self::Density => 0.008,
            Self::Theme => 0.002,
            Self::Prop => 0.2,
        }
    }

    /// True for channels reported in `[-1, 1]` instead of `[0, 1]`.
    #[inline]
    #[must_use]
    pub const fn is_signed(self) -> bool {
        matches!(self, Self::Organic | Self::Ceiling)
    }
}

/// Room feature with its own derived noise field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FeatureType {
    /// Prop and furniture placement.
    FurniturePlacement,
    /// Wall damage (double frequency wall noise).
    WallDamage,
    /// Light flicker (5x frequency lighting noise).
    LightingFlicker,
    /// Floor wear.
    FloorWear,
    /// Ceiling stains.
    CeilingStains,
    /// Mold patches (cellular).
    MoldGrowth,
    /// Cable runs (turbulence).
    CablePlacement,
    /// Door condition.
    DoorCondition,
}

/// One term of a layered blend.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NoiseLayer {
    /// Channel to sample.
    pub channel: NoiseChannel,
    /// Blend weight.
    pub weight: f32,
}

impl NoiseLayer {
    /// Creates a layer.
    #[inline]
    #[must_use]
    pub const fn new(channel: NoiseChannel, weight: f32) -> Self {
        Self { channel, weight }
    }
}

/// Converts a signed sample to `[0, 1]`.
#[inline]
fn normalize(value: f64) -> f32 {
    ((value + 1.0) * 0.5) as f32
}

/// Seeded multi-channel noise source.
pub struct NoiseManager {
    seed: WorldSeed,
    channels: [SimplexNoise; 10],
    scale_multiplier: f64,
}

impl NoiseManager {
    /// Sample offset of the second domain-warp lookup.
    const WARP_OFFSET: f64 = 100.0;

    /// Creates a manager with the neutral scale multiplier.
    #[must_use]
    pub fn new(seed: WorldSeed) -> Self {
        Self::with_scale(seed, 1.0)
    }

    /// Creates a manager whose channel scales are multiplied by `multiplier`.
    #[must_use]
    pub fn with_scale(seed: WorldSeed, multiplier: f32) -> Self {
        let channels = NoiseChannel::ALL.map(|c| SimplexNoise::new(seed.offset(c.index() as u64)));
        Self {
            seed,
            channels,
            scale_multiplier: f64::from(multiplier),
        }
    }

    /// The world seed.
    #[inline]
    #[must_use]
    pub const fn seed(&self) -> WorldSeed {
        self.seed
    }

    #[inline]
    fn raw(&self, channel: NoiseChannel, x: f64, z: f64) -> f64 {
        self.channels[channel.index()].sample(x, z)
    }

    /// Samples a channel at its scale.
    ///
    /// # Returns
    ///
    /// `[-1, 1]` for signed channels, `[0, 1]` otherwise.
    #[must_use]
    pub fn noise(&self, channel: NoiseChannel, x: f64, z: f64) -> f32 {
        let scale = channel.base_scale() * self.scale_multiplier;
        let value = self.raw(channel, x * scale, z * scale);
        if channel.is_signed() {
            value as f32
        } else {
            normalize(value)
        }
    }

    /// Algorithm selection noise in `[0, 1]`.
    #[inline]
    #[must_use]
    pub fn algorithm(&self, x: f64, z: f64) -> f32 {
        self.noise(NoiseChannel::Algorithm, x, z)
    }

    /// Organic variation noise in `[-1, 1]`.
    #[inline]
    #[must_use]
    pub fn organic(&self, x: f64, z: f64) -> f32 {
        self.noise(NoiseChannel::Organic, x, z)
    }

    /// Connection probability noise in `[0, 1]`.
    #[inline]
    #[must_use]
    pub fn connection(&self, x: f64, z: f64) -> f32 {
        self.noise(NoiseChannel::Connection, x, z)
    }

    /// Cell modification noise in `[0, 1]`.
    #[inline]
    #[must_use]
    pub fn modification(&self, x: f64, z: f64) -> f32 {
        self.noise(NoiseChannel::Modification, x, z)
    }

    /// Ceiling variation noise in `[-1, 1]`.
    #[inline]
    #[must_use]
    pub fn ceiling(&self, x: f64, z: f64) -> f32 {
        self.noise(NoiseChannel::Ceiling, x, z)
    }

    /// Wall irregularity noise in `[0, 1]`.
    #[inline]
    #[must_use]
    pub fn wall(&self, x: f64, z: f64) -> f32 {
        self.noise(NoiseChannel::Wall, x, z)
    }

    /// Lighting variation noise in `[0, 1]`.
    #[inline]
    #[must_use]
    pub fn lighting(&self, x: f64, z: f64) -> f32 {
        self.noise(NoiseChannel::Lighting, x, z)
    }

    /// Prop placement noise in `[0, 1]`.
    #[inline]
    #[must_use]
    pub fn prop(&self, x: f64, z: f64) -> f32 {
        self.noise(NoiseChannel::Prop, x, z)
    }

    /// Weighted blend of channels.
    ///
    /// # Returns
    ///
    /// `sum(noise * weight) / sum(weight)`, or `0.0` when the total
    /// weight is zero.
    #[must_use]
    pub fn layered(&self, x: f64, z: f64, layers: &[NoiseLayer]) -> f32 {
        let mut total = 0.0;
        let mut weight = 0.0;
        for layer in layers {
            total += self.noise(layer.channel, x, z) * layer.weight;
            weight += layer.weight;
        }
        if weight > 0.0 {
            total / weight
        } else {
            0.0
        }
    }

    /// Fractal organic noise starting at frequency 0.01.
    ///
    /// Each octave doubles the frequency and halves the amplitude; the sum
    /// is divided by the total amplitude. Zero octaves give `0.0`.
    #[must_use]
    pub fn turbulence(&self, x: f64, z: f64, octaves: u32) -> f32 {
        let noise = &self.channels[NoiseChannel::Organic.index()];
        (noise.octaved(x * 0.01, z * 0.01, octaves, 0.5, 2.0)) as f32
    }

    /// `1 - |organic|`: sharp ridges where organic noise crosses zero.
    #[must_use]
    pub fn ridged(&self, x: f64, z: f64) -> f32 {
        1.0 - self.organic(x, z).abs()
    }

    /// `2 * |organic| - 1`: rounded billows.
    #[must_use]
    pub fn billowed(&self, x: f64, z: f64) -> f32 {
        self.organic(x, z).abs() * 2.0 - 1.0
    }

    /// Three organic octaves at fixed frequencies 0.1, 0.05 and 0.02,
    /// weighted 1, 0.5 and 0.25 and divided by 1.75.
    #[must_use]
    pub fn cellular(&self, x: f64, z: f64) -> f32 {
        let n1 = self.raw(NoiseChannel::Organic, x * 0.1, z * 0.1);
        let n2 = self.raw(NoiseChannel::Organic, x * 0.05, z * 0.05);
        let n3 = self.raw(NoiseChannel::Organic, x * 0.02, z * 0.02);
        ((n1 + n2 * 0.5 + n3 * 0.25) / 1.75) as f32
    }

    /// Organic noise sampled at a point displaced by organic noise itself.
    #[must_use]
    pub fn domain_warped(&self, x: f64, z: f64, strength: f32) -> f32 {
        let strength = f64::from(strength);
        let warp_x = self.raw(NoiseChannel::Organic, x * 0.02, z * 0.02) * strength;
        let warp_z = self.raw(
            NoiseChannel::Organic,
            x * 0.02 + Self::WARP_OFFSET,
            z * 0.02 + Self::WARP_OFFSET,
        ) * strength;
        self.organic(x + warp_x, z + warp_z)
    }

    /// Derived noise for a room feature.
    #[must_use]
    pub fn feature(&self, x: f64, z: f64, feature: FeatureType) -> f32 {
        match feature {
            FeatureType::FurniturePlacement => self.prop(x, z),
            FeatureType::WallDamage => self.wall(x * 2.0, z * 2.0),
            FeatureType::LightingFlicker => self.lighting(x * 5.0, z * 5.0),
            FeatureType::FloorWear => normalize(self.raw(NoiseChannel::Organic, x * 0.15, z * 0.15)),
            FeatureType::CeilingStains => {
                normalize(self.raw(NoiseChannel::Modification, x * 0.08, z * 0.08))
            }
            FeatureType::MoldGrowth => self.cellular(x, z),
            FeatureType::CablePlacement => self.turbulence(x, z, 3),
            FeatureType::DoorCondition => normalize(self.raw(NoiseChannel::Wall, x * 0.01, z * 0.01)),
        }
    }

    /// True if the channel value at the point is strictly above `threshold`.
    #[inline]
    #[must_use]
    pub fn passes_threshold(&self, channel: NoiseChannel, x: f64, z: f64, threshold: f32) -> bool {
        self.noise(channel, x, z) > threshold
    }

    /// Linear interpolation between the channel values at two points.
    #[must_use]
    pub fn interpolated(
        &self,
        channel: NoiseChannel,
        from: (f64, f64),
        to: (f64, f64),
        t: f32,
    ) -> f32 {
        let a = self.noise(channel, from.0, from.1);
        let b = self.noise(channel, to.0, to.1);
        a + (b - a) * t
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager() -> NoiseManager {
        NoiseManager::new(WorldSeed::new(42))
    }

    #[test]
    fn test_channel_ranges() {
        let noise = manager();
        for channel in NoiseChannel::ALL {
            for i in 0..500 {
                let x = f64::from(i) * 37.3 - 5000.0;
                let z = f64::from(i) * -11.9 + 800.0;
                let v = noise.noise(channel, x, z);
                if channel.is_signed() {
                    assert!((-1.0..=1.0).contains(&v), "{channel:?} = {v}");
                } else {
                    assert!((0.0..=1.0).contains(&v), "{channel:?} = {v}");
                }
            }
        }
    }

    #[test]
    fn test_origin_is_neutral() {
        let noise = manager();
        assert_eq!(noise.algorithm(0.0, 0.0), 0.5);
        assert_eq!(noise.modification(0.0, 0.0), 0.5);
        assert_eq!(noise.organic(0.0, 0.0), 0.0);
    }

    #[test]
    fn test_determinism_across_instances() {
        let a = manager();
        let b = manager();
        for i in 0..100 {
            let x = f64::from(i) * 13.7;
            let z = f64::from(i) * 7.1;
            for channel in NoiseChannel::ALL {
                assert_eq!(a.noise(channel, x, z), b.noise(channel, x, z));
            }
            assert_eq!(a.cellular(x, z), b.cellular(x, z));
            assert_eq!(a.domain_warped(x, z, 4.0), b.domain_warped(x, z, 4.0));
        }
    }

    #[test]
    fn test_channels_are_independent() {
        let noise = manager();
        let differing = (0..50)
            .filter(|&i| {
                let p = f64::from(i) * 53.0 + 7.0;
                noise.wall(p, p * 0.5) != noise.lighting(p, p * 0.5)
            })
            .count();
        assert!(differing > 40);
    }

    #[test]
    fn test_layered_zero_weight() {
        let noise = manager();
        assert_eq!(noise.layered(10.0, 10.0, &[]), 0.0);
        assert_eq!(
            noise.layered(10.0, 10.0, &[NoiseLayer::new(NoiseChannel::Wall, 0.0)]),
            0.0
        );
        let single = noise.layered(10.0, 20.0, &[NoiseLayer::new(NoiseChannel::Wall, 2.0)]);
        assert!((single - noise.wall(10.0, 20.0)).abs() < 1e-6);
    }

    #[test]
    fn test_composites_in_range() {
        let noise = manager();
        for i in 0..300 {
            let x = f64::from(i) * 9.1 - 700.0;
            let z = f64::from(i) * 3.3 + 50.0;
            assert!((0.0..=1.0).contains(&noise.ridged(x, z)));
            assert!((-1.0..=1.0).contains(&noise.billowed(x, z)));
            assert!((-1.0..=1.0).contains(&noise.cellular(x, z)));
            assert!((-1.0..=1.0).contains(&noise.turbulence(x, z, 4)));
            assert!((-1.0..=1.0).contains(&noise.domain_warped(x, z, 8.0)));
        }
        assert_eq!(noise.turbulence(5.0, 5.0, 0), 0.0);
    }

    #[test]
    fn test_feature_mapping() {
        let noise = manager();
        let (x, z) = (123.0, -45.0);
        assert_eq!(noise.feature(x, z, FeatureType::FurniturePlacement), noise.prop(x, z));
        assert_eq!(noise.feature(x, z, FeatureType::WallDamage), noise.wall(x * 2.0, z * 2.0));
        assert_eq!(noise.feature(x, z, FeatureType::MoldGrowth), noise.cellular(x, z));
        assert_eq!(noise.feature(x, z, FeatureType::CablePlacement), noise.turbulence(x, z, 3));
    }

    #[test]
    fn test_threshold_and_interpolation() {
        let noise = manager();
        let v = noise.wall(31.0, 17.0);
        assert!(noise.passes_threshold(NoiseChannel::Wall, 31.0, 17.0, v - 0.01));
        assert!(!noise.passes_threshold(NoiseChannel::Wall, 31.0, 17.0, v));

        let a = noise.wall(0.5, 0.5);
        let b = noise.wall(90.5, 40.5);
        let mid = noise.interpolated(NoiseChannel::Wall, (0.5, 0.5), (90.5, 40.5), 0.5);
        assert!((mid - (a + b) / 2.0).abs() < 1e-6);
        assert_eq!(noise.interpolated(NoiseChannel::Wall, (0.5, 0.5), (90.5, 40.5), 0.0), a);
    }

    #[test]
    fn test_scale_multiplier_changes_field() {
        let base = NoiseManager::new(WorldSeed::new(7));
        let scaled = NoiseManager::with_scale(WorldSeed::new(7), 2.0);
        // Doubling the multiplier samples the same field at double distance
        assert_eq!(scaled.wall(100.0, 50.0), base.wall(200.0, 100.0));
    }
}
