//! # World Interface
//!
//! The generator never owns the world. It writes through a
//! [`TerrainSink`], which the host implements over its own storage.
//!
//! ## Chunk Format
//!
//! Chunks are 16x16x256 blocks (width x depth x height). All studio
//! geometry lives in a thin band starting at [`BASE_HEIGHT`].
//!
//! ## Clipping
//!
//! A chunk generation pass wraps the host sink in a [`ClippedSink`]:
//! writes outside the chunk footprint are dropped, reads pass through.
//! Rooms and corridors that straddle a boundary are therefore drawn in
//! full by every chunk that overlaps them, and each chunk keeps only its
//! own columns.
//!
//! [`MemoryWorld`] is a sparse in-memory sink used by the preview tool,
//! the tests and the benchmarks.

use std::collections::HashMap;

use crate::block::Block;
use crate::maze::Direction;

/// Chunk width/depth in blocks.
pub const CHUNK_SIZE: i32 = 16;

/// Chunk height in blocks.
pub const CHUNK_HEIGHT: i32 = 256;

/// Total blocks per chunk.
pub const BLOCKS_PER_CHUNK: usize = (CHUNK_SIZE * CHUNK_SIZE * CHUNK_HEIGHT) as usize;

/// Y level of every studio floor.
pub const BASE_HEIGHT: i32 = 66;

/// Absolute block position.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockPos {
    /// X coordinate.
    pub x: i32,
    /// Y coordinate.
    pub y: i32,
    /// Z coordinate.
    pub z: i32,
}

impl BlockPos {
    /// Creates a new position.
    #[inline]
    #[must_use]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Returns the position displaced by the given deltas.
    #[inline]
    #[must_use]
    pub const fn offset(self, dx: i32, dy: i32, dz: i32) -> Self {
        Self::new(self.x + dx, self.y + dy, self.z + dz)
    }

    /// Returns the position `distance` blocks away horizontally.
    #[inline]
    #[must_use]
    pub const fn step(self, direction: Direction, distance: i32) -> Self {
        let (dx, dz) = direction.delta();
        self.offset(dx * distance, 0, dz * distance)
    }

    /// Chunk containing this position.
    #[inline]
    #[must_use]
    pub const fn chunk(self) -> ChunkCoord {
        ChunkCoord::from_block_pos(self.x, self.z)
    }
}

/// Chunk coordinate (identifies a chunk in the world grid).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkCoord {
    /// X coordinate (in chunks, not blocks).
    pub x: i32,
    /// Z coordinate (in chunks, not blocks).
    pub z: i32,
}

impl ChunkCoord {
    /// Creates a new chunk coordinate.
    #[inline]
    #[must_use]
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Converts world block coordinates to chunk coordinate.
    #[inline]
    #[must_use]
    pub const fn from_block_pos(block_x: i32, block_z: i32) -> Self {
        Self {
            x: block_x.div_euclid(CHUNK_SIZE),
            z: block_z.div_euclid(CHUNK_SIZE),
        }
    }

    /// Returns the world X coordinate of the chunk's origin (corner).
    #[inline]
    #[must_use]
    pub const fn world_x(self) -> i32 {
        self.x * CHUNK_SIZE
    }

    /// Returns the world Z coordinate of the chunk's origin.
    #[inline]
    #[must_use]
    pub const fn world_z(self) -> i32 {
        self.z * CHUNK_SIZE
    }

    /// True if the block column lies inside this chunk.
    #[inline]
    #[must_use]
    pub const fn contains(self, block_x: i32, block_z: i32) -> bool {
        let dx = block_x - self.world_x();
        let dz = block_z - self.world_z();
        dx >= 0 && dx < CHUNK_SIZE && dz >= 0 && dz < CHUNK_SIZE
    }

    /// Chebyshev distance in chunks.
    #[inline]
    #[must_use]
    pub const fn chebyshev_distance(self, other: Self) -> u32 {
        let dx = self.x.abs_diff(other.x);
        let dz = self.z.abs_diff(other.z);
        if dx > dz {
            dx
        } else {
            dz
        }
    }
}

/// Hanging entity spawned instead of a block.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Decoration {
    /// Item frame.
    ItemFrame,
    /// Painting.
    Painting,
}

/// Host world storage the generator writes into.
///
/// Implementations must treat out-of-range heights as air on read and
/// ignore them on write.
pub trait TerrainSink {
    /// Sets the block at an absolute position.
    fn set_block(&mut self, pos: BlockPos, block: Block);

    /// Reads the block at an absolute position.
    fn get_block(&self, pos: BlockPos) -> Block;

    /// Spawns a hanging decoration facing `facing`.
    fn spawn_decoration(&mut self, pos: BlockPos, decoration: Decoration, facing: Direction);
}

/// Sink adapter that confines writes to one chunk footprint.
pub struct ClippedSink<'a> {
    inner: &'a mut dyn TerrainSink,
    chunk: ChunkCoord,
    writes: usize,
}

impl<'a> ClippedSink<'a> {
    /// Wraps `inner`, accepting writes only inside `chunk`.
    #[must_use]
    pub fn new(inner: &'a mut dyn TerrainSink, chunk: ChunkCoord) -> Self {
        Self {
            inner,
            chunk,
            writes: 0,
        }
    }

    /// The chunk this sink accepts writes for.
    #[inline]
    #[must_use]
    pub const fn chunk(&self) -> ChunkCoord {
        self.chunk
    }

    /// Number of accepted block writes and spawns.
    #[inline]
    #[must_use]
    pub const fn writes(&self) -> usize {
        self.writes
    }

    #[inline]
    fn accepts(&self, pos: BlockPos) -> bool {
        self.chunk.contains(pos.x, pos.z) && (0..CHUNK_HEIGHT).contains(&pos.y)
    }
}

impl TerrainSink for ClippedSink<'_> {
    fn set_block(&mut self, pos: BlockPos, block: Block) {
        if self.accepts(pos) {
            self.inner.set_block(pos, block);
            self.writes += 1;
        }
    }

    fn get_block(&self, pos: BlockPos) -> Block {
        self.inner.get_block(pos)
    }

    fn spawn_decoration(&mut self, pos: BlockPos, decoration: Decoration, facing: Direction) {
        if self.accepts(pos) {
            self.inner.spawn_decoration(pos, decoration, facing);
            self.writes += 1;
        }
    }
}

/// A 16x16x256 block grid.
#[derive(Clone)]
pub struct Chunk {
    /// Chunk position in the world.
    pub coord: ChunkCoord,
    /// Block data (indexed as `(y * 16 + z) * 16 + x`).
    blocks: Vec<Block>,
}

impl Chunk {
    /// Creates a new empty chunk at the given coordinates.
    #[must_use]
    pub fn new(coord: ChunkCoord) -> Self {
        Self {
            coord,
            blocks: vec![Block::AIR; BLOCKS_PER_CHUNK],
        }
    }

    #[inline]
    fn index(x: i32, y: i32, z: i32) -> Option<usize> {
        if (0..CHUNK_SIZE).contains(&x) && (0..CHUNK_HEIGHT).contains(&y) && (0..CHUNK_SIZE).contains(&z) {
            Some(((y * CHUNK_SIZE + z) * CHUNK_SIZE + x) as usize)
        } else {
            None
        }
    }

    /// Gets a block at local coordinates. Out of range reads are air.
    ///
    /// # Arguments
    ///
    /// * `x` - Local X (0-15)
    /// * `y` - Y level (0-255)
    /// * `z` - Local Z (0-15)
    #[inline]
    #[must_use]
    pub fn get_block(&self, x: i32, y: i32, z: i32) -> Block {
        Self::index(x, y, z).map_or(Block::AIR, |i| self.blocks[i])
    }

    /// Sets a block at local coordinates. Out of range writes are ignored.
    #[inline]
    pub fn set_block(&mut self, x: i32, y: i32, z: i32, block: Block) {
        if let Some(i) = Self::index(x, y, z) {
            self.blocks[i] = block;
        }
    }

    /// Raw block data as bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.blocks)
    }

    /// Number of non-air blocks.
    #[must_use]
    pub fn non_air_count(&self) -> usize {
        self.blocks.iter().filter(|b| !b.is_air()).count()
    }

    /// Returns the raw block data size in bytes.
    #[must_use]
    pub const fn data_size() -> usize {
        BLOCKS_PER_CHUNK * std::mem::size_of::<Block>()
    }
}

/// Sparse in-memory world.
#[derive(Default)]
pub struct MemoryWorld {
    chunks: HashMap<ChunkCoord, Chunk>,
    decorations: Vec<(BlockPos, Decoration, Direction)>,
}

impl MemoryWorld {
    /// Creates an empty world.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The stored chunk, if any block was ever written to it.
    #[must_use]
    pub fn chunk(&self, coord: ChunkCoord) -> Option<&Chunk> {
        self.chunks.get(&coord)
    }

    /// Number of chunks holding data.
    #[must_use]
    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// All spawned decorations in spawn order.
    #[must_use]
    pub fn decorations(&self) -> &[(BlockPos, Decoration, Direction)] {
        &self.decorations
    }

    /// FNV-1a hash of a chunk's blocks and decorations.
    ///
    /// Two worlds that generated the same chunk identically report the
    /// same fingerprint. Unwritten chunks hash as empty.
    #[must_use]
    pub fn fingerprint(&self, coord: ChunkCoord) -> u64 {
        const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
        const FNV_PRIME: u64 = 0x0100_0000_01b3;

        let mut hash = FNV_OFFSET;
        let mut feed = |bytes: &[u8]| {
            for &b in bytes {
                hash ^= u64::from(b);
                hash = hash.wrapping_mul(FNV_PRIME);
            }
        };

        if let Some(chunk) = self.chunks.get(&coord) {
            feed(chunk.as_bytes());
        }

        let mut spawned: Vec<_> = self
            .decorations
            .iter()
            .filter(|(pos, _, _)| pos.chunk() == coord)
            .map(|&(pos, decoration, facing)| (pos, decoration as u8, facing as u8))
            .collect();
        spawned.sort_unstable();
        for (pos, decoration, facing) in spawned {
            feed(&pos.x.to_le_bytes());
            feed(&pos.y.to_le_bytes());
            feed(&pos.z.to_le_bytes());
            feed(&[decoration, facing]);
        }
        hash
    }
}

impl TerrainSink for MemoryWorld {
    fn set_block(&mut self, pos: BlockPos, block: Block) {
        if !(0..CHUNK_HEIGHT).contains(&pos.y) {
            return;
        }
        let coord = pos.chunk();
        let chunk = self.chunks.entry(coord).or_insert_with(|| Chunk::new(coord));
        chunk.set_block(pos.x - coord.world_x(), pos.y, pos.z - coord.world_z(), block);
    }

    fn get_block(&self, pos: BlockPos) -> Block {
        let coord = pos.chunk();
        self.chunks.get(&coord).map_or(Block::AIR, |chunk| {
            chunk.get_block(pos.x - coord.world_x(), pos.y, pos.z - coord.world_z())
        })
    }

    fn spawn_decoration(&mut self, pos: BlockPos, decoration: Decoration, facing: Direction) {
        self.decorations.push((pos, decoration, facing));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_coord_from_negative_blocks() {
        assert_eq!(ChunkCoord::from_block_pos(-1, -16), ChunkCoord::new(-1, -1));
        assert_eq!(ChunkCoord::from_block_pos(15, 16), ChunkCoord::new(0, 1));
        let c = ChunkCoord::new(-2, 3);
        assert!(c.contains(-32, 48));
        assert!(c.contains(-17, 63));
        assert!(!c.contains(-16, 48));
        assert_eq!(c.chebyshev_distance(ChunkCoord::new(1, 1)), 3);
    }

    #[test]
    fn test_memory_world_read_write() {
        let mut world = MemoryWorld::new();
        let pos = BlockPos::new(-5, BASE_HEIGHT, 20);
        assert!(world.get_block(pos).is_air());
        world.set_block(pos, Block::GRAY_CONCRETE);
        assert_eq!(world.get_block(pos), Block::GRAY_CONCRETE);
        assert_eq!(world.chunk_count(), 1);

        world.set_block(BlockPos::new(0, 300, 0), Block::GRAY_CONCRETE);
        assert_eq!(world.chunk_count(), 1);
    }

    #[test]
    fn test_clipped_sink_drops_foreign_writes() {
        let mut world = MemoryWorld::new();
        let outside = BlockPos::new(16, BASE_HEIGHT, 0);
        world.set_block(outside, Block::IRON_BLOCK);
        {
            let mut sink = ClippedSink::new(&mut world, ChunkCoord::new(0, 0));
            sink.set_block(BlockPos::new(3, BASE_HEIGHT, 3), Block::WHITE_CONCRETE);
            sink.set_block(outside, Block::AIR);
            sink.spawn_decoration(BlockPos::new(-1, BASE_HEIGHT, 0), Decoration::Painting, Direction::North);
            assert_eq!(sink.get_block(outside), Block::IRON_BLOCK);
            assert_eq!(sink.writes(), 1);
        }
        assert_eq!(world.get_block(BlockPos::new(3, BASE_HEIGHT, 3)), Block::WHITE_CONCRETE);
        assert_eq!(world.get_block(outside), Block::IRON_BLOCK);
        assert!(world.decorations().is_empty());
    }

    #[test]
    fn test_fingerprint_tracks_content() {
        let mut a = MemoryWorld::new();
        let mut b = MemoryWorld::new();
        let coord = ChunkCoord::new(0, 0);
        assert_eq!(a.fingerprint(coord), b.fingerprint(coord));

        a.set_block(BlockPos::new(1, 70, 1), Block::TORCH);
        assert_ne!(a.fingerprint(coord), b.fingerprint(coord));
        b.set_block(BlockPos::new(1, 70, 1), Block::TORCH);
        assert_eq!(a.fingerprint(coord), b.fingerprint(coord));

        a.spawn_decoration(BlockPos::new(2, 70, 2), Decoration::ItemFrame, Direction::East);
        assert_ne!(a.fingerprint(coord), b.fingerprint(coord));
    }

    #[test]
    fn test_block_pos_step() {
        let p = BlockPos::new(0, 66, 0);
        assert_eq!(p.step(Direction::North, 3), BlockPos::new(0, 66, -3));
        assert_eq!(p.step(Direction::East, 2), BlockPos::new(2, 66, 0));
        assert_eq!(Chunk::data_size(), BLOCKS_PER_CHUNK * 4);
    }
}
