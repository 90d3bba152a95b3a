//! # Studio Configuration
//!
//! Every tunable of the generator, loaded once from TOML and passed
//! explicitly to [`StudioGenerator`](crate::generator::StudioGenerator).
//!
//! ## Example
//!
//! ```toml
//! room_density = 0.8
//! grid_size = 48
//! enable_lod = false
//! ```
//!
//! Missing keys take their defaults. Out-of-range values are clamped by
//! [`StudioConfig::validate`], which logs every adjustment.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{StudioError, StudioResult};

/// Generation tunables.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StudioConfig {
    /// Scales the room probability of the random strategies (0.7 is neutral).
    pub room_density: f32,
    /// Per-cell chance of anchoring a 2x2 mega room.
    pub mega_room_chance: f32,
    /// Base probability of extra portals between regions.
    pub connection_probability: f32,
    /// Chance that a low-modification cell becomes a dead end.
    pub dead_end_chance: f32,
    /// Chance per cell of a secondary loop connection.
    pub secondary_loop_chance: f32,

    /// Side length of one maze cell in blocks.
    pub grid_size: u32,
    /// Smallest room size a cell may request.
    pub min_room_size: u32,
    /// Largest room size a cell may request.
    pub max_room_size: u32,
    /// Floor-to-ceiling height of rooms and corridors.
    pub room_height: u32,
    /// Corridor lane width in blocks.
    pub corridor_width: u32,

    /// Multiplier applied to every noise channel scale.
    pub noise_scale_multiplier: f32,
    /// Strength of ceiling soffits driven by ceiling noise.
    pub organic_variation_strength: f32,
    /// Chance of swapping exposed wall faces where wall noise is high.
    pub wall_irregularity_chance: f32,
    /// Chance of an extra light where lighting noise is high.
    pub lighting_variation_chance: f32,

    /// Fraction of prop-noise space that receives props.
    pub prop_density: f32,
    /// Chance that a template furniture slot is filled.
    pub furniture_chance: f32,
    /// Per-block wear chance in decaying rooms, scaled by the theme's dirt.
    pub decay_chance: f32,

    /// Maximum number of chunk records kept by the performance cache.
    pub chunk_cache_size: usize,
    /// Restrict generation to chunks near registered observers.
    pub enable_lod: bool,
    /// LOD radius in chunks.
    pub lod_distance: u32,
    /// Seconds before an in-flight marker is considered stuck.
    pub in_flight_timeout_secs: u64,
    /// Maximum number of resolved maze cells kept in memory.
    pub maze_cache_capacity: usize,

    /// Emit sound and visual navigation cues.
    pub enable_navigation_aids: bool,
    /// Chance of a sound cue at a qualifying spot.
    pub sound_cue_chance: f32,
    /// Chance of a visual cue at a qualifying spot.
    pub visual_cue_chance: f32,
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            room_density: 0.7,
            mega_room_chance: 0.02,
            connection_probability: 0.6,
            dead_end_chance: 0.15,
            secondary_loop_chance: 0.3,
            grid_size: 32,
            min_room_size: 8,
            max_room_size: 32,
            room_height: 12,
            corridor_width: 4,
            noise_scale_multiplier: 1.0,
            organic_variation_strength: 0.3,
            wall_irregularity_chance: 0.3,
            lighting_variation_chance: 0.1,
            prop_density: 0.15,
            furniture_chance: 0.7,
            decay_chance: 0.4,
            chunk_cache_size: 256,
            enable_lod: true,
            lod_distance: 3,
            in_flight_timeout_secs: 60,
            maze_cache_capacity: 4096,
            enable_navigation_aids: true,
            sound_cue_chance: 0.05,
            visual_cue_chance: 0.08,
        }
    }
}

/// Clamps a float field, falling back to its default when not finite.
fn clamp_f32(
    adjusted: &mut Vec<&'static str>,
    name: &'static str,
    value: &mut f32,
    default: f32,
    min: f32,
    max: f32,
) {
    let clamped = if value.is_finite() { value.clamp(min, max) } else { default };
    if clamped.to_bits() != value.to_bits() {
        tracing::warn!("config {name} = {value} out of range, using {clamped}");
        *value = clamped;
        adjusted.push(name);
    }
}

/// Clamps an ordered integer field.
fn clamp_ord<T>(adjusted: &mut Vec<&'static str>, name: &'static str, value: &mut T, min: T, max: T)
where
    T: Ord + Copy + std::fmt::Display,
{
    let clamped = (*value).clamp(min, max);
    if clamped != *value {
        tracing::warn!("config {name} = {value} out of range, using {clamped}");
        *value = clamped;
        adjusted.push(name);
    }
}

impl StudioConfig {
    /// Parses a config from TOML text and validates it.
    ///
    /// # Errors
    ///
    /// Returns [`StudioError::Parse`] for malformed TOML and
    /// [`StudioError::InvalidValue`] for non-finite floats.
    pub fn from_toml_str(text: &str) -> StudioResult<Self> {
        let mut config: Self = toml::from_str(text)?;
        config.reject_non_finite()?;
        config.validate();
        Ok(config)
    }

    /// Loads and validates a config file.
    ///
    /// # Errors
    ///
    /// Returns [`StudioError::Io`] if the file cannot be read, otherwise as
    /// [`StudioConfig::from_toml_str`].
    pub fn load(path: &Path) -> StudioResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| StudioError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Serializes the config back to TOML.
    ///
    /// # Errors
    ///
    /// Returns [`StudioError::InvalidValue`] if serialization fails.
    pub fn to_toml_string(&self) -> StudioResult<String> {
        toml::to_string_pretty(self).map_err(|e| StudioError::InvalidValue {
            field: "config",
            reason: e.to_string(),
        })
    }

    fn reject_non_finite(&self) -> StudioResult<()> {
        let fields = [
            ("room_density", self.room_density),
            ("mega_room_chance", self.mega_room_chance),
            ("connection_probability", self.connection_probability),
            ("dead_end_chance", self.dead_end_chance),
            ("secondary_loop_chance", self.secondary_loop_chance),
            ("noise_scale_multiplier", self.noise_scale_multiplier),
            ("organic_variation_strength", self.organic_variation_strength),
            ("wall_irregularity_chance", self.wall_irregularity_chance),
            ("lighting_variation_chance", self.lighting_variation_chance),
            ("prop_density", self.prop_density),
            ("furniture_chance", self.furniture_chance),
            ("decay_chance", self.decay_chance),
            ("sound_cue_chance", self.sound_cue_chance),
            ("visual_cue_chance", self.visual_cue_chance),
        ];
        match fields.iter().find(|(_, v)| !v.is_finite()) {
            Some(&(field, value)) => Err(StudioError::InvalidValue {
                field,
                reason: format!("{value} is not a finite number"),
            }),
            None => Ok(()),
        }
    }

    /// Clamps every value into its valid range.
    ///
    /// # Returns
    ///
    /// The names of the fields that were adjusted.
    pub fn validate(&mut self) -> Vec<&'static str> {
        let d = Self::default();
        let mut adjusted = Vec::new();
        let a = &mut adjusted;

        clamp_f32(a, "room_density", &mut self.room_density, d.room_density, 0.1, 1.0);
        clamp_f32(a, "mega_room_chance", &mut self.mega_room_chance, d.mega_room_chance, 0.0, 0.1);
        clamp_f32(
            a,
            "connection_probability",
            &mut self.connection_probability,
            d.connection_probability,
            0.1,
            0.9,
        );
        clamp_f32(a, "dead_end_chance", &mut self.dead_end_chance, d.dead_end_chance, 0.0, 0.5);
        clamp_f32(
            a,
            "secondary_loop_chance",
            &mut self.secondary_loop_chance,
            d.secondary_loop_chance,
            0.0,
            1.0,
        );

        clamp_ord(a, "grid_size", &mut self.grid_size, 16, 64);
        clamp_ord(a, "min_room_size", &mut self.min_room_size, 8, 16);
        clamp_ord(a, "max_room_size", &mut self.max_room_size, self.min_room_size, 64);
        clamp_ord(a, "room_height", &mut self.room_height, 8, 20);
        clamp_ord(a, "corridor_width", &mut self.corridor_width, 3, 8);

        clamp_f32(
            a,
            "noise_scale_multiplier",
            &mut self.noise_scale_multiplier,
            d.noise_scale_multiplier,
            0.1,
            10.0,
        );
        clamp_f32(
            a,
            "organic_variation_strength",
            &mut self.organic_variation_strength,
            d.organic_variation_strength,
            0.0,
            1.0,
        );
        clamp_f32(
            a,
            "wall_irregularity_chance",
            &mut self.wall_irregularity_chance,
            d.wall_irregularity_chance,
            0.0,
            1.0,
        );
        clamp_f32(
            a,
            "lighting_variation_chance",
            &mut self.lighting_variation_chance,
            d.lighting_variation_chance,
            0.0,
            1.0,
        );

        clamp_f32(a, "prop_density", &mut self.prop_density, d.prop_density, 0.0, 1.0);
        clamp_f32(a, "furniture_chance", &mut self.furniture_chance, d.furniture_chance, 0.0, 1.0);
        clamp_f32(a, "decay_chance", &mut self.decay_chance, d.decay_chance, 0.0, 1.0);

        clamp_ord(a, "chunk_cache_size", &mut self.chunk_cache_size, 64, 1024);
        clamp_ord(a, "lod_distance", &mut self.lod_distance, 1, 8);
        clamp_ord(a, "in_flight_timeout_secs", &mut self.in_flight_timeout_secs, 1, 600);
        clamp_ord(a, "maze_cache_capacity", &mut self.maze_cache_capacity, 256, 65_536);

        clamp_f32(a, "sound_cue_chance", &mut self.sound_cue_chance, d.sound_cue_chance, 0.0, 0.1);
        clamp_f32(a, "visual_cue_chance", &mut self.visual_cue_chance, d.visual_cue_chance, 0.0, 0.1);

        adjusted
    }

    /// Consumes the config and returns a validated copy.
    #[must_use]
    pub fn validated(mut self) -> Self {
        self.validate();
        self
    }

    /// In-flight timeout as a [`Duration`].
    #[inline]
    #[must_use]
    pub const fn in_flight_timeout(&self) -> Duration {
        Duration::from_secs(self.in_flight_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let mut config = StudioConfig::default();
        assert!(config.validate().is_empty());
        assert_eq!(config.grid_size, 32);
        assert_eq!(config.chunk_cache_size, 256);
    }

    #[test]
    fn test_clamping() {
        let mut config = StudioConfig {
            room_density: 5.0,
            grid_size: 4,
            min_room_size: 12,
            max_room_size: 10,
            chunk_cache_size: 10_000,
            visual_cue_chance: -1.0,
            ..StudioConfig::default()
        };
        let adjusted = config.validate();

        assert_eq!(config.room_density, 1.0);
        assert_eq!(config.grid_size, 16);
        assert_eq!(config.max_room_size, 12, "max is clamped up to min");
        assert_eq!(config.chunk_cache_size, 1024);
        assert_eq!(config.visual_cue_chance, 0.0);
        assert!(adjusted.contains(&"room_density"));
        assert!(adjusted.contains(&"max_room_size"));
        assert_eq!(adjusted.len(), 5);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = StudioConfig::from_toml_str("room_density = 0.9\nenable_lod = false\n")
            .expect("valid toml");
        assert_eq!(config.room_density, 0.9);
        assert!(!config.enable_lod);
        assert_eq!(config.grid_size, 32);
    }

    #[test]
    fn test_toml_values_are_clamped() {
        let config = StudioConfig::from_toml_str("lod_distance = 99").expect("valid toml");
        assert_eq!(config.lod_distance, 8);
    }

    #[test]
    fn test_malformed_toml_is_parse_error() {
        let err = StudioConfig::from_toml_str("room_density = \"lots\"").unwrap_err();
        assert!(matches!(err, StudioError::Parse(_)));
    }

    #[test]
    fn test_non_finite_is_rejected() {
        let err = StudioConfig::from_toml_str("prop_density = nan").unwrap_err();
        assert!(matches!(err, StudioError::InvalidValue { field: "prop_density", .. }));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = StudioConfig::load(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, StudioError::Io { .. }));
    }

    #[test]
    fn test_toml_roundtrip() {
        let config = StudioConfig { grid_size: 48, ..StudioConfig::default() };
        let text = config.to_toml_string().expect("serializable");
        assert_eq!(StudioConfig::from_toml_str(&text).expect("parse"), config);
    }
}
