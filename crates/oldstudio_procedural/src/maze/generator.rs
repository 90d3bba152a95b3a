//! # Maze Generator
//!
//! Produces the maze graph one cell at a time, on demand, for an
//! unbounded grid.
//!
//! ## Two Layers
//!
//! - [`MazeGenerator::generate_cell`] is the raw per-cell draw: strategy
//!   from algorithm noise, room or corridor, openings, special tag, dead
//!   end and theme. It depends only on the seed and the position.
//! - [`MazeGenerator::cell`] is the stitched cell. Cells are grouped into
//!   aligned 4x4 regions; each region runs the connectivity pipeline on
//!   its raw cells, places mega rooms and opens portals to the four
//!   neighboring regions. Every input is position-derived, so any thread
//!   asking for any cell of a region gets the same answer.
//!
//! ## Cache
//!
//! Stitched cells are cached under their packed position. When the cache
//! grows past capacity the cells farthest (Manhattan distance) from the
//! most recent request are dropped. Rebuilding an evicted region yields
//! identical cells.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::config::StudioConfig;
use crate::maze::cell::{CellType, Direction, GenerationStrategy, MazeCell, RoomTheme, SpecialType};
use crate::maze::connectivity::{
    add_secondary_loops, build_spanning_tree, ensure_connectivity, GridBounds, MazeGrid,
};
use crate::noise::WorldSeed;
use crate::noise_manager::NoiseManager;
use crate::random::{pack_key, unpack_key, CellRandom};

/// Region edge length in cells.
pub const REGION_SIZE: i32 = 4;

/// Noise sampling stride per cell for layout decisions.
const CELL_NOISE_STRIDE: f64 = 32.0;

/// Stream purposes folded into the seed.
const REGION_STREAM: u64 = 0x5245_4749_4f4e;
const PORTAL_EAST_STREAM: u64 = 0x504f_5254_0045;
const PORTAL_SOUTH_STREAM: u64 = 0x504f_5254_0053;

/// Maze tunables taken from [`StudioConfig`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MazeSettings {
    /// Room probability scale (0.7 is neutral).
    pub room_density: f32,
    /// Chance for a low-modification cell to become a dead end.
    pub dead_end_chance: f32,
    /// Per-anchor chance of a 2x2 mega room.
    pub mega_room_chance: f32,
    /// Base chance of extra portals between regions.
    pub connection_probability: f32,
    /// Chance of an extra loop link per eligible cell.
    pub secondary_loop_chance: f32,
    /// Smallest room size.
    pub min_room_size: u32,
    /// Largest room size.
    pub max_room_size: u32,
    /// Cell edge length in blocks.
    pub grid_size: u32,
    /// Stitched-cell cache capacity.
    pub cache_capacity: usize,
}

impl MazeSettings {
    /// Extracts the maze tunables from a config.
    #[must_use]
    pub fn from_config(config: &StudioConfig) -> Self {
        Self {
            room_density: config.room_density,
            dead_end_chance: config.dead_end_chance,
            mega_room_chance: config.mega_room_chance,
            connection_probability: config.connection_probability,
            secondary_loop_chance: config.secondary_loop_chance,
            min_room_size: config.min_room_size,
            max_room_size: config.max_room_size,
            grid_size: config.grid_size,
            cache_capacity: config.maze_cache_capacity,
        }
    }
}

impl Default for MazeSettings {
    fn default() -> Self {
        Self::from_config(&StudioConfig::default())
    }
}

/// Region containing a cell.
#[inline]
#[must_use]
pub const fn region_of(x: i32, z: i32) -> (i32, i32) {
    (x.div_euclid(REGION_SIZE), z.div_euclid(REGION_SIZE))
}

/// Grid bounds of a region.
#[must_use]
pub fn region_bounds(rx: i32, rz: i32) -> GridBounds {
    let x = rx * REGION_SIZE;
    let z = rz * REGION_SIZE;
    GridBounds::new(x, z, x + REGION_SIZE - 1, z + REGION_SIZE - 1)
}

/// On-demand maze graph for an infinite grid.
pub struct MazeGenerator {
    seed: WorldSeed,
    noise: Arc<NoiseManager>,
    settings: MazeSettings,
    cache: RwLock<HashMap<u64, MazeCell>>,
    latest_request: AtomicU64,
    evicted: AtomicU64,
}

impl MazeGenerator {
    /// Creates a generator sharing the given noise source.
    #[must_use]
    pub fn new(noise: Arc<NoiseManager>, settings: MazeSettings) -> Self {
        Self {
            seed: noise.seed(),
            noise,
            cache: RwLock::new(HashMap::with_capacity(settings.cache_capacity.min(4096))),
            settings,
            latest_request: AtomicU64::new(pack_key(0, 0)),
            evicted: AtomicU64::new(0),
        }
    }

    /// The settings in use.
    #[inline]
    #[must_use]
    pub const fn settings(&self) -> &MazeSettings {
        &self.settings
    }

    /// Cell edge length in blocks.
    #[inline]
    #[must_use]
    pub const fn grid_size(&self) -> i32 {
        self.settings.grid_size as i32
    }

    /// Grid position of the cell containing a block column.
    #[inline]
    #[must_use]
    pub const fn cell_of_block(&self, block_x: i32, block_z: i32) -> (i32, i32) {
        (
            block_x.div_euclid(self.grid_size()),
            block_z.div_euclid(self.grid_size()),
        )
    }

    /// Raw cell draw, before region stitching.
    ///
    /// Deterministic in the seed and position only.
    #[must_use]
    pub fn generate_cell(&self, x: i32, z: i32) -> MazeCell {
        let mut rng = CellRandom::for_cell(self.seed.value(), x, z);
        let mut cell = MazeCell::new(x, z);
        let wx = f64::from(x) * CELL_NOISE_STRIDE;
        let wz = f64::from(z) * CELL_NOISE_STRIDE;

        let strategy = match self.noise.algorithm(wx, wz) {
            a if a < 0.4 => GenerationStrategy::DepthFirst,
            a if a < 0.7 => GenerationStrategy::Prims,
            a if a < 0.9 => GenerationStrategy::Cellular,
            _ => GenerationStrategy::Organic,
        };
        cell.extras.strategy = Some(strategy);

        let density = self.settings.room_density / 0.7;
        let count = match strategy {
            GenerationStrategy::DepthFirst => {
                if rng.chance(0.6 * density) {
                    self.make_room(&mut cell, 8 + rng.next_below(16));
                }
                if rng.chance(0.7) {
                    1 + rng.next_below(2)
                } else {
                    2 + rng.next_below(2)
                }
            }
            GenerationStrategy::Prims => {
                if rng.chance(0.5 * density) {
                    self.make_room(&mut cell, 12 + rng.next_below(12));
                }
                1 + rng.next_below(3)
            }
            GenerationStrategy::Cellular => {
                if rng.chance(0.7 * density) {
                    self.make_room(&mut cell, 16 + rng.next_below(16));
                }
                2 + rng.next_below(3)
            }
            GenerationStrategy::Organic => {
                let n = self.noise.organic(wx, wz);
                if n > 0.3 {
                    let size = (8.0 + (20.0 * n).round()).clamp(8.0, 28.0) as u32;
                    self.make_room(&mut cell, size);
                }
                ((4.0 * n).round() as i32).max(1) as u32
            }
        };

        let mut directions = Direction::ALL;
        rng.shuffle(&mut directions);
        for direction in directions.into_iter().take(count as usize) {
            cell.add_connection(direction);
        }

        let m = self.noise.modification(wx, wz);
        if m > 0.8 && rng.chance(0.1) {
            cell.special = SpecialType::ALL[rng.next_below(SpecialType::ALL.len() as u32) as usize];
        }
        if m < 0.2 && rng.chance(self.settings.dead_end_chance) {
            cell.make_dead_end(Direction::from_index(rng.next_below(4)));
        }
        if cell.is_room() {
            cell.theme = match m {
                m if m > 0.7 => RoomTheme::Industrial,
                m if m > 0.4 => RoomTheme::Office,
                m if m > 0.1 => RoomTheme::Storage,
                _ => RoomTheme::Abandoned,
            };
        }
        cell
    }

    fn make_room(&self, cell: &mut MazeCell, size: u32) {
        cell.cell_type = CellType::Room;
        cell.set_room_size(size.clamp(self.settings.min_room_size, self.settings.max_room_size));
    }

    /// Stitched cell at a grid position.
    ///
    /// Builds and caches the cell's whole region on a miss.
    #[must_use]
    pub fn cell(&self, x: i32, z: i32) -> MazeCell {
        let key = pack_key(x, z);
        self.latest_request.store(key, Ordering::Relaxed);
        if let Some(cell) = self.cache.read().get(&key) {
            return cell.clone();
        }

        let (rx, rz) = region_of(x, z);
        let region = self.build_region(rx, rz);
        let requested = region.get(x, z).cloned();

        let mut cache = self.cache.write();
        for cell in region.into_cells() {
            cache.entry(pack_key(cell.x(), cell.z())).or_insert(cell);
        }
        if cache.len() > self.settings.cache_capacity {
            let dropped = evict_farthest(&mut cache, x, z, self.settings.cache_capacity);
            self.evicted.fetch_add(dropped as u64, Ordering::Relaxed);
            tracing::trace!("maze cache evicted {dropped} cells around ({x}, {z})");
        }
        drop(cache);

        requested.unwrap_or_else(|| self.generate_cell(x, z))
    }

    /// Builds one region from scratch.
    ///
    /// # Returns
    ///
    /// The stitched 4x4 grid.
    #[must_use]
    pub fn build_region(&self, rx: i32, rz: i32) -> MazeGrid {
        let bounds = region_bounds(rx, rz);
        let mut grid = MazeGrid::from_fn(bounds, |x, z| self.generate_cell(x, z));
        grid.mirror_connections();

        let mut rng = CellRandom::new(self.seed.derive(REGION_STREAM).value() ^ pack_key(rx, rz));
        let tree = build_spanning_tree(&mut grid, &mut rng);
        let loops = add_secondary_loops(&mut grid, &mut rng, self.settings.secondary_loop_chance);
        let forced = ensure_connectivity(&mut grid);
        let megas = self.place_mega_rooms(&mut grid, &mut rng);
        self.open_portals(&mut grid, rx, rz);

        for cell in grid.cells_mut() {
            cell.settle_dead_end();
            if !cell.is_room() {
                cell.cell_type = if cell.has_special() {
                    CellType::SpecialArea
                } else if cell.is_junction() {
                    CellType::Junction
                } else {
                    CellType::Corridor
                };
            }
        }

        tracing::trace!(
            "built region ({rx}, {rz}): {tree} tree links, {loops} loops, {forced} forced, {megas} mega rooms"
        );
        grid
    }

    /// Turns free 2x2 blocks into mega rooms anchored at their minimum corner.
    fn place_mega_rooms(&self, grid: &mut MazeGrid, rng: &mut CellRandom) -> usize {
        let bounds = grid.bounds();
        let mut placed = 0;
        for (ax, az) in bounds.positions() {
            if ax + 1 > bounds.max_x || az + 1 > bounds.max_z {
                continue;
            }
            let footprint = [(ax, az), (ax + 1, az), (ax, az + 1), (ax + 1, az + 1)];
            let free = footprint
                .iter()
                .all(|&(x, z)| grid.get(x, z).is_some_and(|c| !c.occupied));
            if !free || !rng.chance(self.settings.mega_room_chance) {
                continue;
            }

            for (x, z) in footprint {
                if let Some(cell) = grid.get_mut(x, z) {
                    cell.occupied = true;
                    cell.cell_type = CellType::Room;
                    cell.extras.mega_anchor = Some((ax, az));
                }
            }
            if let Some(anchor) = grid.get_mut(ax, az) {
                anchor.special = SpecialType::MegaRoom;
                anchor.set_room_size(MazeCell::MAX_ROOM_SIZE);
            }
            grid.link(ax, az, Direction::East);
            grid.link(ax, az, Direction::South);
            grid.link(ax + 1, az, Direction::South);
            grid.link(ax, az + 1, Direction::East);
            placed += 1;
        }
        placed
    }

    /// Opens the region's side of every portal on its four edges.
    fn open_portals(&self, grid: &mut MazeGrid, rx: i32, rz: i32) {
        let bounds = grid.bounds();
        // (edge owner region, stream, side facing out of this region)
        let edges = [
            ((rx, rz), PORTAL_EAST_STREAM, Direction::East),
            ((rx - 1, rz), PORTAL_EAST_STREAM, Direction::West),
            ((rx, rz), PORTAL_SOUTH_STREAM, Direction::South),
            ((rx, rz - 1), PORTAL_SOUTH_STREAM, Direction::North),
        ];
        for ((ox, oz), stream, side) in edges {
            let open = self.edge_portals(ox, oz, stream);
            for (i, is_open) in open.into_iter().enumerate() {
                if !is_open {
                    continue;
                }
                let offset = i as i32;
                let (x, z) = match side {
                    Direction::East => (bounds.max_x, bounds.min_z + offset),
                    Direction::West => (bounds.min_x, bounds.min_z + offset),
                    Direction::South => (bounds.min_x + offset, bounds.max_z),
                    Direction::North => (bounds.min_x + offset, bounds.min_z),
                };
                if let Some(cell) = grid.get_mut(x, z) {
                    cell.add_connection(side);
                }
            }
        }
    }

    /// Which of the four cell pairs across a region edge are open.
    ///
    /// The edge is named by the region on its west (or north) side, so
    /// both regions compute the same answer. One pair is always open.
    fn edge_portals(&self, rx: i32, rz: i32, stream: u64) -> [bool; REGION_SIZE as usize] {
        let mut rng = CellRandom::new(self.seed.derive(stream).value() ^ pack_key(rx, rz));
        let guaranteed = rng.next_below(REGION_SIZE as u32) as usize;
        let bounds = region_bounds(rx, rz);
        let grid = f64::from(self.grid_size());
        let mut open = [false; REGION_SIZE as usize];
        for (i, slot) in open.iter_mut().enumerate() {
            let offset = i as i32;
            let (x, z) = if stream == PORTAL_EAST_STREAM {
                (bounds.max_x, bounds.min_z + offset)
            } else {
                (bounds.min_x + offset, bounds.max_z)
            };
            let p = self.settings.connection_probability
                + 0.3 * self.noise.connection(f64::from(x) * grid, f64::from(z) * grid);
            let extra = rng.chance(p);
            *slot = i == guaranteed || extra;
        }
        open
    }

    /// Number of cached cells.
    #[must_use]
    pub fn cache_len(&self) -> usize {
        self.cache.read().len()
    }

    /// Total cells evicted since creation or the last clear.
    #[must_use]
    pub fn evicted(&self) -> u64 {
        self.evicted.load(Ordering::Relaxed)
    }

    /// Drops every cached cell.
    pub fn clear_cache(&self) {
        self.cache.write().clear();
        self.evicted.store(0, Ordering::Relaxed);
    }

    /// Grid position of the most recent [`cell`](Self::cell) request.
    #[must_use]
    pub fn latest_request(&self) -> (i32, i32) {
        unpack_key(self.latest_request.load(Ordering::Relaxed))
    }
}

/// Removes the cells farthest from `(x, z)` until `capacity` remain.
///
/// # Returns
///
/// Number of cells removed.
fn evict_farthest(cache: &mut HashMap<u64, MazeCell>, x: i32, z: i32, capacity: usize) -> usize {
    let excess = cache.len().saturating_sub(capacity);
    if excess == 0 {
        return 0;
    }
    let mut keys: Vec<(u64, u64)> = cache
        .keys()
        .map(|&key| {
            let (cx, cz) = unpack_key(key);
            let distance = u64::from(cx.abs_diff(x)) + u64::from(cz.abs_diff(z));
            (distance, key)
        })
        .collect();
    // Farthest first, ties broken by key for a stable choice
    if excess < keys.len() {
        keys.select_nth_unstable_by(excess - 1, |a, b| b.cmp(a));
    }
    for &(_, key) in &keys[..excess] {
        cache.remove(&key);
    }
    excess
}
