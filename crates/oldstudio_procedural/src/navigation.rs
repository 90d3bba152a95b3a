//! # Navigation Aids
//!
//! Sparse environmental cues that hint at structure without breaking the
//! look of the studio: a hum of redstone in a wall, a vent in the ceiling,
//! a tinted wall block, a pattern worn into the floor.
//!
//! ## Placement
//!
//! Every column of the chunk is tested at the first air layer above the
//! floor. A spot qualifies when it is open and has 8..=16 solid blocks in
//! its 5x5 neighbourhood (corridor sides and doorways, not open halls or
//! closets). Qualifying spots must also lie where cable-placement noise
//! exceeds 0.7. Sound and visual cues are then rolled independently.
//!
//! | Sound cue   | Effect                                  |
//! |-------------|-----------------------------------------|
//! | Hum         | redstone wire in nearby walls           |
//! | Ventilation | iron bars in the ceiling, maybe cobweb  |
//! | Dripping    | water under the ceiling                 |
//! | Machinery   | dispenser or observer in a wall         |
//!
//! | Visual cue       | Effect                             |
//! |------------------|------------------------------------|
//! | Directional      | a light under the ceiling          |
//! | Color            | tinted block in a nearby wall      |
//! | FloorPattern     | tinted floor tiles around the spot |
//! | WallMarking      | item frame or sign on a wall       |
//! | CeilingIndicator | trapdoor, button or lever overhead |
//!
//! ## Chunk Borders
//!
//! The neighbourhood test and the wall search read up to three blocks
//! into adjacent chunks. The generator runs them against its scratch
//! world, which already holds every space within a three-block apron
//! around the chunk, so border cues come out the same in any load order.

use rand::{Rng, RngCore};

use crate::block::Block;
use crate::config::StudioConfig;
use crate::maze::Direction;
use crate::noise_manager::{FeatureType, NoiseManager};
use crate::rooms::templates::roll;
use crate::world::{BlockPos, ChunkCoord, Decoration, TerrainSink, BASE_HEIGHT, CHUNK_SIZE};

/// Cable noise a spot must exceed.
const CABLE_THRESHOLD: f32 = 0.7;

/// Solid block count window for a navigation spot.
const WALL_DENSITY: std::ops::RangeInclusive<usize> = 8..=16;

/// Audible cue kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SoundCue {
    /// Electrical hum from wiring.
    Hum,
    /// Air vent.
    Ventilation,
    /// Dripping water.
    Dripping,
    /// Machinery noise.
    Machinery,
}

impl SoundCue {
    /// All sound cues.
    pub const ALL: [Self; 4] = [Self::Hum, Self::Ventilation, Self::Dripping, Self::Machinery];
}

/// Visible cue kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum VisualCue {
    /// Directional lighting.
    Directional,
    /// Color variation in a wall.
    Color,
    /// Floor pattern.
    FloorPattern,
    /// Wall marking.
    WallMarking,
    /// Ceiling indicator.
    CeilingIndicator,
}

impl VisualCue {
    /// All visual cues.
    pub const ALL: [Self; 5] = [
        Self::Directional,
        Self::Color,
        Self::FloorPattern,
        Self::WallMarking,
        Self::CeilingIndicator,
    ];
}

/// Cue kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CueKind {
    /// Audible cue.
    Sound(SoundCue),
    /// Visible cue.
    Visual(VisualCue),
}

/// A cue chosen for a spot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlacedCue {
    /// Spot the cue was placed around.
    pub pos: BlockPos,
    /// What was placed.
    pub kind: CueKind,
}

/// Navigation cue placement.
#[derive(Clone, Copy, Debug)]
pub struct NavigationAids {
    enabled: bool,
    sound_cue_chance: f32,
    visual_cue_chance: f32,
    room_height: i32,
}

impl NavigationAids {
    /// Creates a placer from a validated config.
    #[must_use]
    pub fn new(config: &StudioConfig) -> Self {
        Self {
            enabled: config.enable_navigation_aids,
            sound_cue_chance: config.sound_cue_chance,
            visual_cue_chance: config.visual_cue_chance,
            room_height: config.room_height as i32,
        }
    }

    /// Returns true if cues are placed at all.
    #[inline]
    #[must_use]
    pub const fn enabled(&self) -> bool {
        self.enabled
    }

    /// Scans a chunk and places cues.
    ///
    /// Sound cues are placed before visual cues; each list keeps scan
    /// order (x outer, z inner).
    ///
    /// # Returns
    ///
    /// The cues chosen, in placement order. Empty when disabled.
    pub fn place_navigation_aids(
        &self,
        sink: &mut dyn TerrainSink,
        chunk: ChunkCoord,
        rng: &mut dyn RngCore,
        noise: &NoiseManager,
    ) -> Vec<PlacedCue> {
        if !self.enabled {
            return Vec::new();
        }

        let mut sound_spots = Vec::new();
        let mut visual_spots = Vec::new();
        for x in chunk.world_x()..chunk.world_x() + CHUNK_SIZE {
            for z in chunk.world_z()..chunk.world_z() + CHUNK_SIZE {
                let pos = BlockPos::new(x, BASE_HEIGHT + 1, z);
                if !is_navigation_spot(sink, pos) {
                    continue;
                }
                if noise.feature(f64::from(x), f64::from(z), FeatureType::CablePlacement) <= CABLE_THRESHOLD {
                    continue;
                }
                if roll(rng, self.sound_cue_chance) {
                    sound_spots.push(pos);
                }
                if roll(rng, self.visual_cue_chance) {
                    visual_spots.push(pos);
                }
            }
        }

        let mut placed = Vec::with_capacity(sound_spots.len() + visual_spots.len());
        for pos in sound_spots {
            let cue = SoundCue::ALL[rng.gen_range(0..SoundCue::ALL.len())];
            self.place_sound_cue(sink, pos, cue, rng);
            placed.push(PlacedCue {
                pos,
                kind: CueKind::Sound(cue),
            });
        }
        for pos in visual_spots {
            let cue = VisualCue::ALL[rng.gen_range(0..VisualCue::ALL.len())];
            self.place_visual_cue(sink, pos, cue, rng, noise);
            placed.push(PlacedCue {
                pos,
                kind: CueKind::Visual(cue),
            });
        }

        if !placed.is_empty() {
            tracing::trace!("placed {} navigation cues in chunk ({}, {})", placed.len(), chunk.x, chunk.z);
        }
        placed
    }

    /// Ceiling position above a spot.
    #[inline]
    const fn ceiling(&self, pos: BlockPos) -> BlockPos {
        BlockPos::new(pos.x, BASE_HEIGHT + self.room_height, pos.z)
    }

    /// Places one sound cue around `pos`.
    pub fn place_sound_cue(&self, sink: &mut dyn TerrainSink, pos: BlockPos, cue: SoundCue, rng: &mut dyn RngCore) {
        match cue {
            SoundCue::Hum => {
                for dy in 0..3 {
                    let wall = find_nearby_wall(sink, pos.offset(0, dy, 0));
                    if let Some(wall) = wall {
                        if roll(rng, 0.3) {
                            sink.set_block(wall, Block::REDSTONE_WIRE);
                        }
                    }
                }
            }
            SoundCue::Ventilation => {
                let ceiling = self.ceiling(pos);
                if sink.get_block(ceiling).is_solid() {
                    sink.set_block(ceiling, Block::IRON_BARS);
                    if roll(rng, 0.5) {
                        sink.set_block(ceiling.offset(0, -1, 0), Block::COBWEB);
                    }
                }
            }
            SoundCue::Dripping => {
                let ceiling = self.ceiling(pos);
                if sink.get_block(ceiling).is_solid() && roll(rng, 0.2) {
                    sink.set_block(ceiling.offset(0, -1, 0), Block::WATER);
                }
            }
            SoundCue::Machinery => {
                if let Some(wall) = find_nearby_wall(sink, pos) {
                    let block = if rng.gen_bool(0.5) {
                        Block::DISPENSER
                    } else {
                        Block::OBSERVER
                    };
                    sink.set_block(wall, block);
                }
            }
        }
    }

    /// Places one visual cue around `pos`.
    pub fn place_visual_cue(
        &self,
        sink: &mut dyn TerrainSink,
        pos: BlockPos,
        cue: VisualCue,
        rng: &mut dyn RngCore,
        noise: &NoiseManager,
    ) {
        match cue {
            VisualCue::Directional => {
                let light = match rng.gen_range(0..4) {
                    0 => Block::TORCH,
                    1 => Block::REDSTONE_TORCH,
                    2 => Block::SOUL_TORCH,
                    _ => Block::LANTERN,
                };
                sink.set_block(self.ceiling(pos).offset(0, -1, 0), light);
            }
            VisualCue::Color => {
                let damage = noise.feature(f64::from(pos.x), f64::from(pos.z), FeatureType::WallDamage);
                let tint = match (damage * 6.0) as i32 % 6 {
                    0 => Block::LIGHT_GRAY_CONCRETE,
                    1 => Block::WHITE_CONCRETE,
                    2 => Block::YELLOW_CONCRETE,
                    3 => Block::LIME_CONCRETE,
                    4 => Block::CYAN_CONCRETE,
                    _ => Block::GRAY_CONCRETE,
                };
                if let Some(wall) = find_nearby_wall(sink, pos) {
                    if roll(rng, 0.4) {
                        sink.set_block(wall, tint);
                    }
                }
            }
            VisualCue::FloorPattern => {
                for dx in -1..=1 {
                    for dz in -1..=1 {
                        let floor = pos.offset(dx, -1, dz);
                        if sink.get_block(floor).is_solid() && roll(rng, 0.3) {
                            let tile = match rng.gen_range(0..3) {
                                0 => Block::LIGHT_GRAY_CONCRETE,
                                1 => Block::WHITE_CONCRETE,
                                _ => Block::YELLOW_CONCRETE,
                            };
                            sink.set_block(floor, tile);
                        }
                    }
                }
            }
            VisualCue::WallMarking => {
                let at = pos.offset(0, rng.gen_range(0..3), 0);
                if let Some(wall) = find_nearby_wall(sink, at) {
                    if rng.gen_bool(0.5) {
                        let facing = Direction::between(wall.x, wall.z, at.x, at.z);
                        sink.spawn_decoration(wall.step(facing, 1), Decoration::ItemFrame, facing);
                    } else {
                        sink.set_block(wall, Block::OAK_SIGN);
                    }
                }
            }
            VisualCue::CeilingIndicator => {
                let ceiling = self.ceiling(pos);
                if sink.get_block(ceiling).is_solid() && roll(rng, 0.3) {
                    let indicator = match rng.gen_range(0..3) {
                        0 => Block::IRON_TRAPDOOR,
                        1 => Block::STONE_BUTTON,
                        _ => Block::LEVER,
                    };
                    sink.set_block(ceiling, indicator);
                }
            }
        }
    }
}

/// Returns true if `pos` is open with a moderate wall density around it.
#[must_use]
pub fn is_navigation_spot(sink: &dyn TerrainSink, pos: BlockPos) -> bool {
    if !sink.get_block(pos).is_air() {
        return false;
    }
    let mut solid = 0;
    for dx in -2..=2 {
        for dz in -2..=2 {
            if sink.get_block(pos.offset(dx, 0, dz)).is_solid() {
                solid += 1;
            }
        }
    }
    WALL_DENSITY.contains(&solid)
}

/// Nearest solid block on the square rings of radius 1 to 3 around `center`.
///
/// Rings are scanned x outer, z inner; the first hit wins.
#[must_use]
pub fn find_nearby_wall(sink: &dyn TerrainSink, center: BlockPos) -> Option<BlockPos> {
    for radius in 1..=3_i32 {
        for dx in -radius..=radius {
            for dz in -radius..=radius {
                if dx.abs() != radius && dz.abs() != radius {
                    continue;
                }
                let pos = center.offset(dx, 0, dz);
                if sink.get_block(pos).is_solid() {
                    return Some(pos);
                }
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::noise::WorldSeed;
    use crate::world::MemoryWorld;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    const H: i32 = 12;

    /// A chunk filled solid at head height except an east-west corridor
    /// over z = 5..=8, with floor and ceiling everywhere.
    fn corridor_chunk() -> MemoryWorld {
        let mut world = MemoryWorld::new();
        for x in 0..16 {
            for z in 0..16 {
                world.set_block(BlockPos::new(x, BASE_HEIGHT, z), Block::YELLOW_CONCRETE);
                world.set_block(BlockPos::new(x, BASE_HEIGHT + H, z), Block::GRAY_CONCRETE);
                if !(5..=8).contains(&z) {
                    for y in 1..H {
                        world.set_block(BlockPos::new(x, BASE_HEIGHT + y, z), Block::GRAY_CONCRETE);
                    }
                }
            }
        }
        world
    }

    fn aids(chance: f32) -> NavigationAids {
        let mut config = StudioConfig::default();
        config.sound_cue_chance = chance;
        config.visual_cue_chance = chance;
        NavigationAids::new(&config)
    }

    #[test]
    fn test_spot_detection() {
        let world = corridor_chunk();
        assert!(is_navigation_spot(&world, BlockPos::new(8, BASE_HEIGHT + 1, 5)));
        assert!(is_navigation_spot(&world, BlockPos::new(8, BASE_HEIGHT + 1, 8)));
        assert!(!is_navigation_spot(&world, BlockPos::new(8, BASE_HEIGHT + 1, 6)));
        // Solid block itself.
        assert!(!is_navigation_spot(&world, BlockPos::new(8, BASE_HEIGHT + 1, 2)));
    }

    #[test]
    fn test_find_nearby_wall() {
        let world = corridor_chunk();
        let wall = find_nearby_wall(&world, BlockPos::new(8, BASE_HEIGHT + 1, 6));
        assert_eq!(wall, Some(BlockPos::new(6, BASE_HEIGHT + 1, 4)));

        let open = MemoryWorld::new();
        assert_eq!(find_nearby_wall(&open, BlockPos::new(0, BASE_HEIGHT + 1, 0)), None);
    }

    #[test]
    fn test_disabled_places_nothing() {
        let mut config = StudioConfig::default();
        config.enable_navigation_aids = false;
        let aids = NavigationAids::new(&config);
        let noise = NoiseManager::new(WorldSeed::new(1));
        let mut world = corridor_chunk();
        let before = world.fingerprint(ChunkCoord::new(0, 0));
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert!(aids
            .place_navigation_aids(&mut world, ChunkCoord::new(0, 0), &mut rng, &noise)
            .is_empty());
        assert_eq!(world.fingerprint(ChunkCoord::new(0, 0)), before);
    }

    #[test]
    fn test_cues_only_at_spots_and_deterministic() {
        let aids = aids(0.1);
        let chunk = ChunkCoord::new(0, 0);
        for seed in 0..20 {
            let noise = NoiseManager::new(WorldSeed::new(seed));
            let reference = corridor_chunk();
            let mut a = corridor_chunk();
            let mut b = corridor_chunk();
            let cues_a = aids.place_navigation_aids(&mut a, chunk, &mut ChaCha8Rng::seed_from_u64(seed), &noise);
            let cues_b = aids.place_navigation_aids(&mut b, chunk, &mut ChaCha8Rng::seed_from_u64(seed), &noise);
            assert_eq!(cues_a, cues_b);
            assert_eq!(a.fingerprint(chunk), b.fingerprint(chunk));
            for cue in &cues_a {
                assert!(is_navigation_spot(&reference, cue.pos));
                assert!(chunk.contains(cue.pos.x, cue.pos.z));
            }
        }
    }

    #[test]
    fn test_ventilation_opens_ceiling() {
        let aids = aids(0.05);
        let mut world = corridor_chunk();
        let pos = BlockPos::new(8, BASE_HEIGHT + 1, 6);
        aids.place_sound_cue(&mut world, pos, SoundCue::Ventilation, &mut ChaCha8Rng::seed_from_u64(3));
        assert_eq!(world.get_block(BlockPos::new(8, BASE_HEIGHT + H, 6)), Block::IRON_BARS);
    }

    #[test]
    fn test_machinery_replaces_wall() {
        let aids = aids(0.05);
        let mut world = corridor_chunk();
        let pos = BlockPos::new(8, BASE_HEIGHT + 1, 5);
        aids.place_sound_cue(&mut world, pos, SoundCue::Machinery, &mut ChaCha8Rng::seed_from_u64(9));
        let wall = world.get_block(BlockPos::new(7, BASE_HEIGHT + 1, 4));
        assert!(wall == Block::DISPENSER || wall == Block::OBSERVER);
    }

    #[test]
    fn test_directional_light_hangs_under_ceiling() {
        let aids = aids(0.05);
        let noise = NoiseManager::new(WorldSeed::new(5));
        let mut world = corridor_chunk();
        let pos = BlockPos::new(3, BASE_HEIGHT + 1, 7);
        aids.place_visual_cue(&mut world, pos, VisualCue::Directional, &mut ChaCha8Rng::seed_from_u64(2), &noise);
        assert!(world.get_block(BlockPos::new(3, BASE_HEIGHT + H - 1, 7)).is_light());
    }

    #[test]
    fn test_floor_pattern_keeps_floor_solid() {
        let aids = aids(0.05);
        let noise = NoiseManager::new(WorldSeed::new(5));
        let mut world = corridor_chunk();
        let pos = BlockPos::new(8, BASE_HEIGHT + 1, 6);
        aids.place_visual_cue(&mut world, pos, VisualCue::FloorPattern, &mut ChaCha8Rng::seed_from_u64(4), &noise);
        for dx in -1..=1 {
            for dz in -1..=1 {
                assert!(world.get_block(pos.offset(dx, -1, dz)).is_structural());
            }
        }
    }
}
