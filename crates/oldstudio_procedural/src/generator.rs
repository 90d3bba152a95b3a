//! # Studio Generator
//!
//! Turns the maze graph into blocks, one chunk at a time.
//!
//! ## Chunk Pipeline
//!
//! ```text
//! admission -> spaces -> noise passes -> orphans -> props -> cues -> commit
//! ```
//!
//! 1. The performance manager admits the chunk (not cached, not in
//!    flight, inside the LOD radius).
//! 2. Every space (a cell, or a 2x2 mega room) overlapping the chunk plus
//!    a three block apron is built in full into a scratch world. Space
//!    content is drawn from a stream seeded by the space's anchor cell, so
//!    neighbouring chunks draw identical rooms and corridors.
//! 3. Per-column passes run on the chunk footprint only: ceiling repair
//!    and soffits, wall irregularity, lighting variation, orphan removal,
//!    prop scattering and navigation cues. They read the scratch world,
//!    apron included.
//! 4. The chunk's band of the scratch world is copied into the host sink.
//!
//! Chunk content therefore depends on the seed, the chunk and the host
//! random source only, never on which chunks were generated before.
//!
//! ## Space Layout
//!
//! Corridors are a hub at the cell center with a lane to each opening.
//! Lanes run along the cell's center lines, so lanes from neighbouring
//! cells meet at the shared edge. Rooms are built by a template centered
//! in the space; each opening gets a door and a lane out to the edge,
//! with a jog along the edge when the room does not reach the cell's
//! center line.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::RwLock;
use rand::RngCore;

use crate::block::Block;
use crate::config::StudioConfig;
use crate::maze::{Direction, MazeCell, MazeGenerator, MazeSettings};
use crate::navigation::{NavigationAids, PlacedCue};
use crate::noise::WorldSeed;
use crate::noise_manager::NoiseManager;
use crate::performance::{chunk_complexity, CacheStats, PerformanceManager};
use crate::random::CellRandom;
use crate::rooms::templates::roll;
use crate::rooms::{apply_decay, BlockPalette, RoomBounds, RoomContext, RoomManager, RoomSite};
use crate::world::{BlockPos, ChunkCoord, ClippedSink, MemoryWorld, TerrainSink, BASE_HEIGHT, CHUNK_SIZE};

/// Blocks around the chunk that are built for neighbourhood reads.
pub const APRON: i32 = 3;

/// Stream purpose for space content.
const CONTENT_STREAM: u64 = 0x434f_4e54_454e_54;

/// Deepest ceiling soffit.
const MAX_SOFFIT: i32 = 2;

/// What a space was built as.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpaceKind {
    /// Corridor hub and lanes.
    Corridor,
    /// Single-cell room built by the named template.
    Room(&'static str),
    /// 2x2 mega room built by the named template.
    MegaRoom(&'static str),
}

/// A space overlapping a generated chunk.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BuiltSpace {
    /// Anchor cell.
    pub anchor: (i32, i32),
    /// What was built.
    pub kind: SpaceKind,
}

/// Outcome of one [`StudioGenerator::generate_chunk`] call.
#[derive(Clone, Debug, PartialEq)]
pub struct ChunkReport {
    /// The chunk.
    pub chunk: ChunkCoord,
    /// False when admission refused the chunk and nothing was written.
    pub generated: bool,
    /// Spaces overlapping the chunk footprint.
    pub spaces: Vec<BuiltSpace>,
    /// Props scattered.
    pub props: usize,
    /// Navigation cues placed.
    pub cues: Vec<PlacedCue>,
    /// Block writes and spawns delivered to the host.
    pub writes: usize,
    /// Wall time spent.
    pub duration: Duration,
    /// Complexity score in `1..=10`.
    pub complexity: u8,
}

impl ChunkReport {
    fn skipped(chunk: ChunkCoord) -> Self {
        Self {
            chunk,
            generated: false,
            spaces: Vec::new(),
            props: 0,
            cues: Vec::new(),
            writes: 0,
            duration: Duration::ZERO,
            complexity: chunk_complexity(chunk),
        }
    }
}

/// Cache counters across the chunk and maze caches.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct StudioStats {
    /// Chunk cache.
    pub chunks: CacheStats,
    /// Stitched maze cells cached.
    pub maze_cells: usize,
    /// Maze cells evicted.
    pub maze_evicted: u64,
}

/// Block span of a space.
#[derive(Clone, Copy, Debug)]
struct Footprint {
    min_x: i32,
    min_z: i32,
    max_x: i32,
    max_z: i32,
}

impl Footprint {
    /// Along-axis coordinate of the edge facing `direction`.
    const fn edge(&self, direction: Direction) -> i32 {
        match direction {
            Direction::North => self.min_z,
            Direction::South => self.max_z,
            Direction::East => self.max_x,
            Direction::West => self.min_x,
        }
    }

    const fn overlaps(&self, min_x: i32, min_z: i32, max_x: i32, max_z: i32) -> bool {
        self.min_x <= max_x && self.max_x >= min_x && self.min_z <= max_z && self.max_z >= min_z
    }
}

/// Floor-level position from coordinates along and across a lane.
const fn lane_pos(direction: Direction, along: i32, across: i32) -> BlockPos {
    if direction.is_x_axis() {
        BlockPos::new(along, BASE_HEIGHT, across)
    } else {
        BlockPos::new(across, BASE_HEIGHT, along)
    }
}

/// Per-seed generator: noise, maze, rooms, cache and cues.
pub struct StudioGenerator {
    seed: WorldSeed,
    config: StudioConfig,
    noise: Arc<NoiseManager>,
    maze: MazeGenerator,
    rooms: RoomManager,
    performance: PerformanceManager,
    navigation: NavigationAids,
    content_seed: u64,
}

impl StudioGenerator {
    /// Creates a generator. The config is validated first.
    #[must_use]
    pub fn new(seed: WorldSeed, config: StudioConfig) -> Self {
        let config = config.validated();
        let noise = Arc::new(NoiseManager::with_scale(seed, config.noise_scale_multiplier));
        let maze = MazeGenerator::new(Arc::clone(&noise), MazeSettings::from_config(&config));
        let rooms = RoomManager::new(seed.value(), config.prop_density, config.room_height as i32);
        let performance = PerformanceManager::new(&config);
        let navigation = NavigationAids::new(&config);

        tracing::info!(
            "studio generator ready: seed {}, grid {}, room height {}",
            seed.value(),
            config.grid_size,
            config.room_height
        );

        Self {
            seed,
            noise,
            maze,
            rooms,
            performance,
            navigation,
            content_seed: seed.derive(CONTENT_STREAM).value(),
            config,
        }
    }

    /// World seed.
    #[inline]
    #[must_use]
    pub const fn seed(&self) -> WorldSeed {
        self.seed
    }

    /// Validated configuration.
    #[inline]
    #[must_use]
    pub const fn config(&self) -> &StudioConfig {
        &self.config
    }

    /// Shared noise channels.
    #[must_use]
    pub fn noise(&self) -> &NoiseManager {
        &self.noise
    }

    /// Maze graph.
    #[inline]
    #[must_use]
    pub const fn maze(&self) -> &MazeGenerator {
        &self.maze
    }

    /// Template registry.
    #[inline]
    #[must_use]
    pub const fn rooms(&self) -> &RoomManager {
        &self.rooms
    }

    /// Chunk cache and admission.
    #[inline]
    #[must_use]
    pub const fn performance(&self) -> &PerformanceManager {
        &self.performance
    }

    #[inline]
    const fn room_height(&self) -> i32 {
        self.config.room_height as i32
    }

    #[inline]
    const fn corridor_width(&self) -> i32 {
        self.config.corridor_width as i32
    }

    /// Replaces the observer chunks used for LOD admission.
    pub fn set_observers(&self, observers: Vec<ChunkCoord>) {
        self.performance.set_observers(observers);
    }

    /// Generates one chunk into `world`.
    ///
    /// # Arguments
    ///
    /// * `world` - Host sink; only the chunk's footprint is written
    /// * `chunk` - Chunk to generate
    /// * `rng` - Host random source for per-column rolls
    ///
    /// # Returns
    ///
    /// A report. `generated` is false if the chunk was cached, in flight
    /// or outside the LOD radius.
    pub fn generate_chunk(&self, world: &mut dyn TerrainSink, chunk: ChunkCoord, rng: &mut dyn RngCore) -> ChunkReport {
        if !self.performance.try_begin(chunk) {
            tracing::trace!("chunk ({}, {}) not admitted", chunk.x, chunk.z);
            return ChunkReport::skipped(chunk);
        }
        let start = Instant::now();

        // Pass 1: spaces, apron included
        let mut scratch = MemoryWorld::new();
        let spaces = self.build_spaces(&mut scratch, chunk);

        // Pass 2: per-column variation, chunk footprint only
        let (props, cues) = {
            let mut local = ClippedSink::new(&mut scratch, chunk);
            self.apply_noise_variations(&mut local, chunk, rng);
            remove_orphans(&mut local, chunk, self.room_height());
            let props = self.rooms.scatter_props(&mut local, chunk, rng, &self.noise);
            let cues = self.navigation.place_navigation_aids(&mut local, chunk, rng, &self.noise);
            (props, cues)
        };

        // Pass 3: commit
        let writes = self.commit(&scratch, world, chunk);

        let duration = start.elapsed();
        self.performance.mark_chunk_generation_complete(chunk, duration);
        tracing::debug!(
            "generated chunk ({}, {}): {} spaces, {} props, {} cues in {:?}",
            chunk.x,
            chunk.z,
            spaces.len(),
            props,
            cues.len(),
            duration
        );

        ChunkReport {
            chunk,
            generated: true,
            spaces,
            props,
            cues,
            writes,
            duration,
            complexity: chunk_complexity(chunk),
        }
    }

    /// Builds every space overlapping the chunk and its apron.
    ///
    /// # Returns
    ///
    /// The spaces overlapping the chunk itself, in anchor order.
    fn build_spaces(&self, scratch: &mut MemoryWorld, chunk: ChunkCoord) -> Vec<BuiltSpace> {
        let (min_x, min_z) = (chunk.world_x(), chunk.world_z());
        let (max_x, max_z) = (min_x + CHUNK_SIZE - 1, min_z + CHUNK_SIZE - 1);
        let (cx0, cz0) = self.maze.cell_of_block(min_x - APRON, min_z - APRON);
        let (cx1, cz1) = self.maze.cell_of_block(max_x + APRON, max_z + APRON);

        let mut anchors = BTreeSet::new();
        for cx in cx0..=cx1 {
            for cz in cz0..=cz1 {
                let cell = self.maze.cell(cx, cz);
                anchors.insert(cell.extras.mega_anchor.unwrap_or((cx, cz)));
            }
        }

        let mut spaces = Vec::new();
        for (ax, az) in anchors {
            let (space, footprint) = self.build_space(scratch, ax, az);
            if footprint.overlaps(min_x, min_z, max_x, max_z) {
                spaces.push(space);
            }
        }
        spaces
    }

    /// Builds one space in full.
    fn build_space(&self, sink: &mut dyn TerrainSink, ax: i32, az: i32) -> (BuiltSpace, Footprint) {
        let g = self.maze.grid_size();
        let anchor = self.maze.cell(ax, az);
        let mega = anchor.extras.mega_anchor == Some((ax, az));
        let cells = if mega { 2 } else { 1 };
        let span = g * cells;
        let origin = BlockPos::new(ax * g, BASE_HEIGHT, az * g);
        let footprint = Footprint {
            min_x: origin.x,
            min_z: origin.z,
            max_x: origin.x + span - 1,
            max_z: origin.z + span - 1,
        };
        let palette = self.rooms.palette(anchor.theme);
        let mut rng = CellRandom::for_cell(self.content_seed, ax, az);

        self.fill_solid(sink, &footprint, &palette);

        let kind = if anchor.is_room() {
            let template = if mega {
                self.rooms.mega_room_template(&mut rng)
            } else {
                self.rooms.select_template(&anchor, &mut rng)
            };
            let ctx = RoomContext {
                noise: &self.noise,
                room_height: self.room_height(),
                furniture_chance: self.config.furniture_chance,
                decay_chance: self.config.decay_chance,
            };
            let room = template.generate(sink, &RoomSite { origin, span }, &mut rng, &ctx);
            if anchor.theme.has_decay() {
                apply_decay(sink, &room, &mut rng, &ctx, anchor.theme.cleanliness_level());
            }

            let covered: Vec<MazeCell> = if mega {
                vec![
                    anchor.clone(),
                    self.maze.cell(ax + 1, az),
                    self.maze.cell(ax, az + 1),
                    self.maze.cell(ax + 1, az + 1),
                ]
            } else {
                vec![anchor.clone()]
            };
            for cell in &covered {
                for direction in cell.connections().iter() {
                    let (nx, nz) = cell.neighbor(direction);
                    let inside = (ax..ax + cells).contains(&nx) && (az..az + cells).contains(&nz);
                    if !inside {
                        self.connect_room(sink, &room, &footprint, cell, direction, &palette, &mut rng);
                    }
                }
            }

            if mega {
                SpaceKind::MegaRoom(template.name())
            } else {
                SpaceKind::Room(template.name())
            }
        } else {
            self.build_corridor(sink, &anchor, &footprint, &palette, &mut rng);
            SpaceKind::Corridor
        };

        (BuiltSpace { anchor: (ax, az), kind }, footprint)
    }

    /// Floor, solid walls and ceiling over a whole footprint.
    fn fill_solid(&self, sink: &mut dyn TerrainSink, footprint: &Footprint, palette: &BlockPalette) {
        let h = self.room_height();
        for x in footprint.min_x..=footprint.max_x {
            for z in footprint.min_z..=footprint.max_z {
                sink.set_block(BlockPos::new(x, BASE_HEIGHT, z), palette.floor);
                for y in 1..h {
                    sink.set_block(BlockPos::new(x, BASE_HEIGHT + y, z), palette.wall);
                }
                sink.set_block(BlockPos::new(x, BASE_HEIGHT + h, z), palette.ceiling);
            }
        }
    }

    /// Center column of a cell.
    fn cell_center(&self, cell: &MazeCell) -> (i32, i32) {
        let g = self.maze.grid_size();
        (cell.x() * g + g / 2, cell.z() * g + g / 2)
    }

    /// Hub at the cell center plus a lane to every opening.
    fn build_corridor(
        &self,
        sink: &mut dyn TerrainSink,
        cell: &MazeCell,
        footprint: &Footprint,
        palette: &BlockPalette,
        rng: &mut CellRandom,
    ) {
        let w = self.corridor_width();
        let (cx, cz) = self.cell_center(cell);
        let hub = BlockPos::new(cx - w / 2, BASE_HEIGHT, cz - w / 2);
        self.rooms.generate_base_corridor(sink, hub, Direction::East, w, w, palette);

        for direction in cell.connections().iter() {
            let (along, across) = if direction.is_x_axis() { (cx, cz) } else { (cz, cx) };
            let edge = footprint.edge(direction);
            let start = lane_pos(direction, along, across - w / 2);
            self.rooms
                .generate_base_corridor(sink, start, direction, (edge - along).abs() + 1, w, palette);
            self.rooms.create_connection(sink, lane_pos(direction, edge, across), direction, rng);
        }
    }

    /// Door in the room wall facing `direction` and a lane out to the
    /// footprint edge, meeting the cell's center line there.
    #[allow(clippy::too_many_arguments)]
    fn connect_room(
        &self,
        sink: &mut dyn TerrainSink,
        room: &RoomBounds,
        footprint: &Footprint,
        cell: &MazeCell,
        direction: Direction,
        palette: &BlockPalette,
        rng: &mut CellRandom,
    ) {
        let w = self.corridor_width();
        let (dx, dz) = direction.delta();
        let sign = dx + dz;
        let (cx, cz) = self.cell_center(cell);

        let (lane_edge, lo, hi, wall) = match direction {
            Direction::East => (cz, room.z, room.z + room.size, room.x + room.size - 1),
            Direction::West => (cz, room.z, room.z + room.size, room.x),
            Direction::South => (cx, room.x, room.x + room.size, room.z + room.size - 1),
            Direction::North => (cx, room.x, room.x + room.size, room.z),
        };
        let lane_room = lane_edge.clamp(lo + 2, (hi - 3).max(lo + 2));
        self.rooms.create_connection(sink, lane_pos(direction, wall, lane_room), direction, rng);

        let edge = footprint.edge(direction);
        let margin = (edge - wall).abs();
        if margin <= 0 {
            return;
        }
        let start = lane_pos(direction, wall + sign, lane_room - w / 2);
        self.rooms.generate_base_corridor(sink, start, direction, margin, w, palette);

        if lane_room != lane_edge {
            let band = w.min(margin);
            let along = edge.min(edge - sign * (band - 1));
            let across = lane_room.min(lane_edge) - w / 2;
            let jog = if direction.is_x_axis() {
                Direction::South
            } else {
                Direction::East
            };
            let length = (lane_room - lane_edge).abs() + w;
            self.rooms
                .generate_base_corridor(sink, lane_pos(direction, along, across), jog, length, band, palette);
        }
    }

    /// Ceiling repair and soffits, wall irregularity and lighting variation.
    fn apply_noise_variations(&self, sink: &mut dyn TerrainSink, chunk: ChunkCoord, rng: &mut dyn RngCore) {
        let h = self.room_height();
        let strength = self.config.organic_variation_strength;

        for x in chunk.world_x()..chunk.world_x() + CHUNK_SIZE {
            for z in chunk.world_z()..chunk.world_z() + CHUNK_SIZE {
                let (wx, wz) = (f64::from(x), f64::from(z));
                let ceiling = BlockPos::new(x, BASE_HEIGHT + h, z);

                if sink.get_block(ceiling).is_air() {
                    sink.set_block(ceiling, self.rooms.ceiling_block(x, z));
                }
                let soffit = ((self.noise.ceiling(wx, wz).max(0.0) * strength * 4.0) as i32).min(MAX_SOFFIT);
                for dy in 1..=soffit {
                    let pos = ceiling.offset(0, -dy, 0);
                    if !sink.get_block(pos).is_air() {
                        break;
                    }
                    sink.set_block(pos, self.rooms.ceiling_block(x, z));
                }

                if self.noise.wall(wx, wz) > 0.7 && roll(rng, self.config.wall_irregularity_chance) {
                    for y in 1..h {
                        let pos = BlockPos::new(x, BASE_HEIGHT + y, z);
                        if sink.get_block(pos).is_structural() && is_exposed(sink, pos) {
                            sink.set_block(pos, self.rooms.wall_variation_block(rng));
                        }
                    }
                }

                if self.noise.lighting(wx, wz) > 0.8 && roll(rng, self.config.lighting_variation_chance) {
                    let pos = ceiling.offset(0, -1, 0);
                    if sink.get_block(pos).is_air() && sink.get_block(ceiling).is_solid() {
                        sink.set_block(pos, self.rooms.light_block(rng));
                    }
                }
            }
        }
    }

    /// Copies the chunk's band from the scratch world into the host.
    fn commit(&self, scratch: &MemoryWorld, world: &mut dyn TerrainSink, chunk: ChunkCoord) -> usize {
        let mut sink = ClippedSink::new(world, chunk);
        for x in chunk.world_x()..chunk.world_x() + CHUNK_SIZE {
            for z in chunk.world_z()..chunk.world_z() + CHUNK_SIZE {
                for y in BASE_HEIGHT..=BASE_HEIGHT + self.room_height() {
                    let pos = BlockPos::new(x, y, z);
                    sink.set_block(pos, scratch.get_block(pos));
                }
            }
        }
        for &(pos, decoration, facing) in scratch.decorations() {
            sink.spawn_decoration(pos, decoration, facing);
        }
        sink.writes()
    }

    /// Current cache counters.
    #[must_use]
    pub fn cache_stats(&self) -> StudioStats {
        StudioStats {
            chunks: self.performance.cache_stats(),
            maze_cells: self.maze.cache_len(),
            maze_evicted: self.maze.evicted(),
        }
    }

    /// Drops the chunk and maze caches.
    pub fn clear_cache(&self) {
        self.performance.clear_cache();
        self.maze.clear_cache();
        tracing::info!("studio caches cleared for seed {}", self.seed.value());
    }
}

/// True if any horizontal neighbour of `pos` is air.
fn is_exposed(sink: &dyn TerrainSink, pos: BlockPos) -> bool {
    Direction::ALL
        .iter()
        .any(|&d| sink.get_block(pos.step(d, 1)).is_air())
}

/// Clears structural blocks with no non-air horizontal neighbour.
///
/// # Returns
///
/// Number of blocks removed.
pub fn remove_orphans(sink: &mut dyn TerrainSink, chunk: ChunkCoord, room_height: i32) -> usize {
    let mut removed = 0;
    for x in chunk.world_x()..chunk.world_x() + CHUNK_SIZE {
        for z in chunk.world_z()..chunk.world_z() + CHUNK_SIZE {
            for y in BASE_HEIGHT + 1..BASE_HEIGHT + room_height {
                let pos = BlockPos::new(x, y, z);
                if !sink.get_block(pos).is_structural() {
                    continue;
                }
                let isolated = (-1..=1).all(|dx| {
                    (-1..=1).all(|dz| (dx == 0 && dz == 0) || sink.get_block(pos.offset(dx, 0, dz)).is_air())
                });
                if isolated {
                    sink.set_block(pos, Block::AIR);
                    removed += 1;
                }
            }
        }
    }
    removed
}

/// Holds the generator for the current world seed.
///
/// Asking for a different seed replaces the generator; callers still
/// holding the old one keep a working instance.
pub struct GeneratorRegistry {
    config: StudioConfig,
    current: RwLock<Option<Arc<StudioGenerator>>>,
}

impl GeneratorRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new(config: StudioConfig) -> Self {
        Self {
            config,
            current: RwLock::new(None),
        }
    }

    /// The generator for `seed`, created or replaced as needed.
    pub fn get_or_create(&self, seed: WorldSeed) -> Arc<StudioGenerator> {
        if let Some(generator) = self.current.read().as_ref() {
            if generator.seed() == seed {
                return Arc::clone(generator);
            }
        }

        let mut current = self.current.write();
        if let Some(existing) = current.as_ref() {
            if existing.seed() == seed {
                return Arc::clone(existing);
            }
            tracing::info!(
                "world seed changed from {} to {}, replacing generator",
                existing.seed().value(),
                seed.value()
            );
        }
        let generator = Arc::new(StudioGenerator::new(seed, self.config.clone()));
        *current = Some(Arc::clone(&generator));
        generator
    }

    /// The current generator, if any.
    #[must_use]
    pub fn current(&self) -> Option<Arc<StudioGenerator>> {
        self.current.read().clone()
    }

    /// Drops the current generator.
    pub fn reset(&self) {
        *self.current.write() = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn chunk_rng(chunk: ChunkCoord) -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(crate::random::pack_key(chunk.x, chunk.z))
    }

    fn generator(seed: u64) -> StudioGenerator {
        let mut config = StudioConfig::default();
        config.enable_lod = false;
        StudioGenerator::new(WorldSeed::new(seed), config)
    }

    #[test]
    fn test_floor_is_solid_everywhere() {
        let generator = generator(42);
        let mut world = MemoryWorld::new();
        let chunk = ChunkCoord::new(0, 0);
        let report = generator.generate_chunk(&mut world, chunk, &mut chunk_rng(chunk));
        assert!(report.generated);
        assert!(!report.spaces.is_empty());
        assert!(report.writes > 0);
        for x in 0..CHUNK_SIZE {
            for z in 0..CHUNK_SIZE {
                assert!(world.get_block(BlockPos::new(x, BASE_HEIGHT, z)).is_solid());
            }
        }
    }

    #[test]
    fn test_writes_stay_in_chunk() {
        let generator = generator(7);
        let mut world = MemoryWorld::new();
        let chunk = ChunkCoord::new(-3, 5);
        generator.generate_chunk(&mut world, chunk, &mut chunk_rng(chunk));
        assert_eq!(world.chunk_count(), 1);
        assert!(world.chunk(chunk).is_some());
        assert!(world.decorations().iter().all(|(pos, _, _)| pos.chunk() == chunk));
    }

    #[test]
    fn test_second_request_is_skipped() {
        let generator = generator(1);
        let mut world = MemoryWorld::new();
        let chunk = ChunkCoord::new(2, 2);
        assert!(generator.generate_chunk(&mut world, chunk, &mut chunk_rng(chunk)).generated);
        let again = generator.generate_chunk(&mut world, chunk, &mut chunk_rng(chunk));
        assert!(!again.generated);
        assert_eq!(again.writes, 0);
        assert_eq!(generator.cache_stats().chunks.cached, 1);
    }

    #[test]
    fn test_clear_cache_allows_regeneration() {
        let generator = generator(1);
        let mut world = MemoryWorld::new();
        let chunk = ChunkCoord::new(0, 1);
        generator.generate_chunk(&mut world, chunk, &mut chunk_rng(chunk));
        let first = world.fingerprint(chunk);
        generator.clear_cache();
        assert_eq!(generator.cache_stats().maze_cells, 0);
        let mut fresh = MemoryWorld::new();
        assert!(generator.generate_chunk(&mut fresh, chunk, &mut chunk_rng(chunk)).generated);
        assert_eq!(fresh.fingerprint(chunk), first);
    }

    #[test]
    fn test_generation_order_does_not_matter() {
        let chunks: Vec<ChunkCoord> = (-2..2)
            .flat_map(|x| (-2..2).map(move |z| ChunkCoord::new(x, z)))
            .collect();

        let forward = generator(99);
        let mut a = MemoryWorld::new();
        for &chunk in &chunks {
            forward.generate_chunk(&mut a, chunk, &mut chunk_rng(chunk));
        }

        let backward = generator(99);
        let mut b = MemoryWorld::new();
        for &chunk in chunks.iter().rev() {
            backward.generate_chunk(&mut b, chunk, &mut chunk_rng(chunk));
        }

        for &chunk in &chunks {
            assert_eq!(a.fingerprint(chunk), b.fingerprint(chunk), "chunk {chunk:?}");
        }
    }

    #[test]
    fn test_lod_refuses_distant_chunks() {
        let generator = StudioGenerator::new(WorldSeed::new(3), StudioConfig::default());
        generator.set_observers(vec![ChunkCoord::new(0, 0)]);
        let mut world = MemoryWorld::new();
        let far = ChunkCoord::new(20, 0);
        assert!(!generator.generate_chunk(&mut world, far, &mut chunk_rng(far)).generated);
        assert_eq!(world.chunk_count(), 0);
        let near = ChunkCoord::new(1, 1);
        assert!(generator.generate_chunk(&mut world, near, &mut chunk_rng(near)).generated);
    }

    #[test]
    fn test_remove_orphans() {
        let mut world = MemoryWorld::new();
        let lone = BlockPos::new(5, BASE_HEIGHT + 2, 5);
        world.set_block(lone, Block::STONE_BRICKS);
        let pair = BlockPos::new(10, BASE_HEIGHT + 2, 10);
        world.set_block(pair, Block::STONE_BRICKS);
        world.set_block(pair.offset(1, 0, 1), Block::STONE_BRICKS);
        let removed = remove_orphans(&mut world, ChunkCoord::new(0, 0), 12);
        assert_eq!(removed, 1);
        assert!(world.get_block(lone).is_air());
        assert_eq!(world.get_block(pair), Block::STONE_BRICKS);
    }

    #[test]
    fn test_registry_replaces_on_seed_change() {
        let registry = GeneratorRegistry::new(StudioConfig::default());
        assert!(registry.current().is_none());
        let a = registry.get_or_create(WorldSeed::new(1));
        let b = registry.get_or_create(WorldSeed::new(1));
        assert!(Arc::ptr_eq(&a, &b));
        let c = registry.get_or_create(WorldSeed::new(2));
        assert!(!Arc::ptr_eq(&a, &c));
        assert_eq!(registry.current().map(|g| g.seed()), Some(WorldSeed::new(2)));
        registry.reset();
        assert!(registry.current().is_none());
    }
}
