//! # Room Manager
//!
//! Owns the template registry and the template-independent building
//! utilities: corridor runs, doorways, prop scattering and the variation
//! blocks used by noise passes.
//!
//! ## Template Pools
//!
//! | Pool     | Templates                                  |
//! |----------|--------------------------------------------|
//! | general  | standard, office, storage, broken          |
//! | mega     | mega office, mega storage, conference      |
//! | theme    | office, industrial, storage, broken, generator |
//! | special  | generator, archive, conference             |
//!
//! Selection merges the special, theme and general pools, keeps the
//! templates whose size window holds the cell's room size and spins a
//! cumulative-weight roulette. An empty candidate set falls back to the
//! standard template.

pub mod palette;
pub mod templates;

use std::collections::HashMap;

use rand::{Rng, RngCore};

use crate::block::Block;
use crate::maze::{Direction, MazeCell, RoomTheme, SpecialType};
use crate::noise_manager::{FeatureType, NoiseManager};
use crate::random::CellRandom;
use crate::world::{BlockPos, ChunkCoord, Decoration, TerrainSink, BASE_HEIGHT, CHUNK_SIZE};

pub use palette::BlockPalette;
pub use templates::{
    apply_decay, build_shell, ArchiveRoom, BrokenRoom, ConferenceRoom, GeneratorHall, IndustrialRoom,
    MegaOffice, MegaStorage, OfficeRoom, RoomBounds, RoomContext, RoomSite, RoomTemplate, StandardRoom,
    StorageRoom, TemplateSpec,
};

/// Index of the fallback template.
const STANDARD: usize = 0;

/// Template registry and shared building utilities.
pub struct RoomManager {
    seed: u64,
    prop_density: f32,
    room_height: i32,
    templates: Vec<Box<dyn RoomTemplate>>,
    general: Vec<usize>,
    mega: Vec<usize>,
    by_theme: HashMap<RoomTheme, Vec<usize>>,
    by_special: HashMap<SpecialType, Vec<usize>>,
}

impl RoomManager {
    /// Creates a manager with every template registered.
    ///
    /// # Arguments
    ///
    /// * `seed` - World seed for position-hashed variation
    /// * `prop_density` - Fraction of floor columns eligible for props
    /// * `room_height` - Floor to ceiling distance
    #[must_use]
    pub fn new(seed: u64, prop_density: f32, room_height: i32) -> Self {
        let templates: Vec<Box<dyn RoomTemplate>> = vec![
            Box::new(StandardRoom),
            Box::new(OfficeRoom),
            Box::new(StorageRoom),
            Box::new(BrokenRoom),
            Box::new(IndustrialRoom),
            Box::new(ConferenceRoom),
            Box::new(MegaOffice),
            Box::new(MegaStorage),
            Box::new(GeneratorHall),
            Box::new(ArchiveRoom),
        ];
        let (office, storage, broken, industrial, conference, generator, archive) = (1, 2, 3, 4, 5, 8, 9);

        let by_theme = HashMap::from([
            (RoomTheme::Office, vec![office]),
            (RoomTheme::Industrial, vec![industrial]),
            (RoomTheme::Storage, vec![storage]),
            (RoomTheme::Abandoned, vec![broken]),
            (RoomTheme::GeneratorRoom, vec![generator]),
            (RoomTheme::Technical, vec![generator]),
        ]);
        let by_special = HashMap::from([
            (SpecialType::GeneratorRoom, vec![generator]),
            (SpecialType::ArchiveRoom, vec![archive]),
            (SpecialType::ConferenceRoom, vec![conference]),
        ]);

        Self {
            seed,
            prop_density,
            room_height,
            templates,
            general: vec![STANDARD, office, storage, broken],
            mega: vec![6, 7, conference],
            by_theme,
            by_special,
        }
    }

    /// Number of registered templates.
    #[must_use]
    pub fn template_count(&self) -> usize {
        self.templates.len()
    }

    /// The fallback template.
    #[must_use]
    pub fn fallback_template(&self) -> &dyn RoomTemplate {
        self.templates[STANDARD].as_ref()
    }

    /// Chooses a template for a room cell.
    ///
    /// # Returns
    ///
    /// A template whose size window contains the cell's room size, or the
    /// standard template if none does.
    pub fn select_template(&self, cell: &MazeCell, rng: &mut dyn RngCore) -> &dyn RoomTemplate {
        let mut candidates: Vec<usize> = Vec::new();
        for pool in [self.by_special.get(&cell.special), self.by_theme.get(&cell.theme)]
            .into_iter()
            .flatten()
        {
            candidates.extend(pool);
        }
        candidates.extend(&self.general);
        candidates.retain(|&i| self.templates[i].fits_size(cell.room_size()));

        if candidates.is_empty() {
            return self.fallback_template();
        }
        self.roulette(&candidates, rng)
    }

    /// Cumulative-weight pick over `candidates`.
    fn roulette(&self, candidates: &[usize], rng: &mut dyn RngCore) -> &dyn RoomTemplate {
        let total: f32 = candidates.iter().map(|&i| self.templates[i].weight()).sum();
        let value = rng.gen::<f32>() * total;
        let mut cumulative = 0.0;
        for &i in candidates {
            cumulative += self.templates[i].weight();
            if value <= cumulative {
                return self.templates[i].as_ref();
            }
        }
        candidates
            .last()
            .map_or_else(|| self.fallback_template(), |&i| self.templates[i].as_ref())
    }

    /// Uniformly random template for a multi-cell room.
    pub fn mega_room_template(&self, rng: &mut dyn RngCore) -> &dyn RoomTemplate {
        if self.mega.is_empty() {
            return self.fallback_template();
        }
        let pick = self.mega[rng.gen_range(0..self.mega.len())];
        self.templates[pick].as_ref()
    }

    /// Palette for a theme.
    #[inline]
    #[must_use]
    pub const fn palette(&self, theme: RoomTheme) -> BlockPalette {
        BlockPalette::for_theme(theme)
    }

    /// Floor to ceiling distance.
    #[inline]
    #[must_use]
    pub const fn room_height(&self) -> i32 {
        self.room_height
    }

    /// Lays a straight corridor run.
    ///
    /// The run starts at `start` (floor level, on its minimum side edge)
    /// and extends `length` blocks in `direction`, `width` blocks wide
    /// toward the positive perpendicular axis. Side walls are placed only
    /// where the block is not already open, so crossing runs keep their
    /// openings.
    pub fn generate_base_corridor(
        &self,
        sink: &mut dyn TerrainSink,
        start: BlockPos,
        direction: Direction,
        length: i32,
        width: i32,
        palette: &BlockPalette,
    ) {
        let (dx, dz) = direction.delta();
        let (px, pz) = if direction.is_x_axis() { (0, 1) } else { (1, 0) };
        let h = self.room_height;

        for step in 0..length {
            let along = start.offset(dx * step, 0, dz * step);
            for w in 0..width {
                let floor = along.offset(px * w, 0, pz * w);
                sink.set_block(floor, palette.floor);
                for y in 1..h {
                    sink.set_block(floor.offset(0, y, 0), Block::AIR);
                }
                sink.set_block(floor.offset(0, h, 0), palette.ceiling);
            }
            for side in [-1, width] {
                let base = along.offset(px * side, 0, pz * side);
                for y in 1..h {
                    let pos = base.offset(0, y, 0);
                    if !sink.get_block(pos).is_air() {
                        sink.set_block(pos, palette.wall);
                    }
                }
            }
        }
    }

    /// Cuts a doorway through the wall at `pos`.
    ///
    /// The opening is 2-3 blocks wide (starting one block before `pos`
    /// along the wall) and 3 blocks tall.
    pub fn create_connection(
        &self,
        sink: &mut dyn TerrainSink,
        pos: BlockPos,
        direction: Direction,
        rng: &mut dyn RngCore,
    ) {
        let width = 2 + rng.gen_range(0..2);
        let (px, pz) = if direction.is_x_axis() { (0, 1) } else { (1, 0) };
        for w in 0..width {
            for h in 1..=3 {
                sink.set_block(pos.offset(px * (w - 1), h, pz * (w - 1)), Block::AIR);
            }
        }
    }

    /// Places small props on open floor where prop noise is high.
    ///
    /// # Returns
    ///
    /// Number of props placed.
    pub fn scatter_props(
        &self,
        sink: &mut dyn TerrainSink,
        chunk: ChunkCoord,
        rng: &mut dyn RngCore,
        noise: &NoiseManager,
    ) -> usize {
        let threshold = 1.0 - self.prop_density;
        let mut placed = 0;
        for x in chunk.world_x()..chunk.world_x() + CHUNK_SIZE {
            for z in chunk.world_z()..chunk.world_z() + CHUNK_SIZE {
                let (wx, wz) = (f64::from(x), f64::from(z));
                if noise.prop(wx, wz) <= threshold {
                    continue;
                }
                let pos = BlockPos::new(x, BASE_HEIGHT + 1, z);
                if !sink.get_block(pos.offset(0, -1, 0)).is_solid() || !sink.get_block(pos).is_air() {
                    continue;
                }
                let kind = (noise.feature(wx, wz, FeatureType::FurniturePlacement) * 10.0) as i32 % 8;
                match kind {
                    0 => sink.set_block(pos, Block::BARREL),
                    1 => sink.set_block(pos, Block::CHEST),
                    2 => sink.set_block(pos, Block::COBWEB),
                    3 => sink.set_block(pos, Block::FLOWER_POT),
                    4 => {
                        let facing = Direction::from_index(rng.gen_range(0..4));
                        sink.spawn_decoration(pos, Decoration::ItemFrame, facing);
                    }
                    5 => {
                        let facing = Direction::from_index(rng.gen_range(0..4));
                        sink.spawn_decoration(pos, Decoration::Painting, facing);
                    }
                    6 => sink.set_block(pos, Block::SKELETON_SKULL),
                    _ => sink.set_block(pos, Block::BROWN_MUSHROOM),
                }
                placed += 1;
            }
        }
        placed
    }

    /// Position-hashed ceiling tile: mostly gray, some yellow and white.
    #[must_use]
    pub fn ceiling_block(&self, x: i32, z: i32) -> Block {
        match CellRandom::for_cell(self.seed, x, z).next_below(10) {
            0 | 1 => Block::YELLOW_CONCRETE,
            2 => Block::WHITE_CONCRETE,
            _ => Block::GRAY_CONCRETE,
        }
    }

    /// Random weathered wall block.
    pub fn wall_variation_block(&self, rng: &mut dyn RngCore) -> Block {
        match rng.gen_range(0..5) {
            0 => Block::CRACKED_STONE_BRICKS,
            1 => Block::MOSSY_STONE_BRICKS,
            2 => Block::COBWEB,
            _ => Block::GRAY_CONCRETE,
        }
    }

    /// Random atmospheric light.
    pub fn light_block(&self, rng: &mut dyn RngCore) -> Block {
        match rng.gen_range(0..4) {
            0 => Block::REDSTONE_TORCH,
            1 => Block::LANTERN,
            2 => Block::GLOWSTONE,
            _ => Block::TORCH,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::maze::CellType;
    use crate::noise::WorldSeed;
    use crate::world::MemoryWorld;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn manager() -> RoomManager {
        RoomManager::new(42, 0.15, 12)
    }

    fn room_cell(size: u32, theme: RoomTheme) -> MazeCell {
        let mut cell = MazeCell::new(0, 0);
        cell.cell_type = CellType::Room;
        cell.set_room_size(size);
        cell.theme = theme;
        cell
    }

    #[test]
    fn test_selected_template_fits() {
        let rooms = manager();
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        for size in 8..=32 {
            for theme in RoomTheme::ALL {
                let cell = room_cell(size, theme);
                let template = rooms.select_template(&cell, &mut rng);
                assert!(template.fits_size(size) || template.name() == "standard");
            }
        }
    }

    #[test]
    fn test_size_filter_narrows_candidates() {
        let rooms = manager();
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        // Abandoned offers broken (8-20); of the general pool only storage
        // (10-32) accepts 30.
        let cell = room_cell(30, RoomTheme::Abandoned);
        for _ in 0..20 {
            assert_eq!(rooms.select_template(&cell, &mut rng).name(), "storage");
        }
    }

    #[test]
    fn test_special_pool_is_offered() {
        let rooms = manager();
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let mut cell = room_cell(20, RoomTheme::Office);
        cell.special = SpecialType::ArchiveRoom;
        let names: Vec<_> = (0..200).map(|_| rooms.select_template(&cell, &mut rng).name()).collect();
        assert!(names.contains(&"archive"));
        assert!(names.contains(&"office"));
    }

    #[test]
    fn test_mega_template_pool() {
        let rooms = manager();
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        for _ in 0..30 {
            let name = rooms.mega_room_template(&mut rng).name();
            assert!(["mega_office", "mega_storage", "conference"].contains(&name));
        }
        assert_eq!(rooms.template_count(), 10);
    }

    #[test]
    fn test_corridor_keeps_existing_openings() {
        let rooms = manager();
        let mut world = MemoryWorld::new();
        let palette = BlockPalette::STANDARD;
        let start = BlockPos::new(0, BASE_HEIGHT, 0);
        rooms.generate_base_corridor(&mut world, start, Direction::East, 10, 4, &palette);

        assert_eq!(world.get_block(BlockPos::new(5, BASE_HEIGHT, 2)), palette.floor);
        assert!(world.get_block(BlockPos::new(5, BASE_HEIGHT + 5, 2)).is_air());
        assert_eq!(world.get_block(BlockPos::new(5, BASE_HEIGHT + 12, 2)), palette.ceiling);
        // Side walls are only replaced where something solid already stood
        assert!(world.get_block(BlockPos::new(5, BASE_HEIGHT + 1, -1)).is_air());

        for z in [-1, 4] {
            for y in 1..12 {
                world.set_block(BlockPos::new(3, BASE_HEIGHT + y, z), Block::STONE_BRICKS);
            }
        }
        rooms.generate_base_corridor(&mut world, start, Direction::East, 10, 4, &palette);
        assert_eq!(world.get_block(BlockPos::new(3, BASE_HEIGHT + 4, 4)), palette.wall);
    }

    #[test]
    fn test_create_connection_clears_doorway() {
        let rooms = manager();
        let mut world = MemoryWorld::new();
        for x in -3..=3 {
            for y in 1..12 {
                world.set_block(BlockPos::new(x, BASE_HEIGHT + y, 0), Block::GRAY_CONCRETE);
            }
        }
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        rooms.create_connection(&mut world, BlockPos::new(0, BASE_HEIGHT, 0), Direction::North, &mut rng);
        for x in -1..=0 {
            for y in 1..=3 {
                assert!(world.get_block(BlockPos::new(x, BASE_HEIGHT + y, 0)).is_air());
            }
            assert!(!world.get_block(BlockPos::new(x, BASE_HEIGHT + 4, 0)).is_air());
        }
        assert!(!world.get_block(BlockPos::new(-2, BASE_HEIGHT + 1, 0)).is_air());
    }

    #[test]
    fn test_scatter_props_on_floor_only() {
        let rooms = RoomManager::new(42, 1.0, 12);
        let noise = NoiseManager::new(WorldSeed::new(42));
        let mut world = MemoryWorld::new();
        for x in 0..16 {
            for z in 0..8 {
                world.set_block(BlockPos::new(x, BASE_HEIGHT, z), Block::YELLOW_CONCRETE);
            }
        }
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let placed = rooms.scatter_props(&mut world, ChunkCoord::new(0, 0), &mut rng, &noise);
        assert!(placed > 0);
        for x in 0..16 {
            for z in 8..16 {
                assert!(world.get_block(BlockPos::new(x, BASE_HEIGHT + 1, z)).is_air());
            }
        }
    }

    #[test]
    fn test_variation_blocks() {
        let rooms = manager();
        assert_eq!(rooms.ceiling_block(10, 20), rooms.ceiling_block(10, 20));
        let allowed = [Block::YELLOW_CONCRETE, Block::WHITE_CONCRETE, Block::GRAY_CONCRETE];
        for i in 0..100 {
            assert!(allowed.contains(&rooms.ceiling_block(i, -i)));
        }
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        for _ in 0..50 {
            assert!(!rooms.wall_variation_block(&mut rng).is_air());
            assert!(rooms.light_block(&mut rng).is_light());
        }
    }
}
