//! # Room Templates
//!
//! One type per template. Each template owns a weight, a size window it
//! accepts cells for, the size range it actually builds at, a palette and
//! a furnishing routine.
//!
//! ## Coordinates
//!
//! A template is handed a [`RoomSite`]: the square footprint it may use.
//! It picks its own size inside its generated range, clamps it to the
//! footprint, centers the room and reports the result as [`RoomBounds`].
//! All furnishing writes go through [`RoomBounds::set`], which ignores
//! anything outside the room.
//!
//! Heights are relative to the floor: `1` is the first air layer and
//! `room_height` is the ceiling.

use rand::{Rng, RngCore};

use crate::block::Block;
use crate::maze::Direction;
use crate::noise_manager::{FeatureType, NoiseManager};
use crate::rooms::palette::BlockPalette;
use crate::world::{BlockPos, TerrainSink};

/// Shared inputs for template generation.
#[derive(Clone, Copy)]
pub struct RoomContext<'a> {
    /// World noise.
    pub noise: &'a NoiseManager,
    /// Floor to ceiling distance.
    pub room_height: i32,
    /// Chance that a furniture slot is filled.
    pub furniture_chance: f32,
    /// Base chance of decay marks.
    pub decay_chance: f32,
}

impl RoomContext<'_> {
    /// Height of ceiling-hung lights.
    #[inline]
    #[must_use]
    pub const fn light_y(&self) -> i32 {
        self.room_height - 1
    }

    /// Rolls for one furniture slot.
    #[inline]
    pub fn furnish_slot(&self, rng: &mut dyn RngCore) -> bool {
        roll(rng, self.furniture_chance)
    }
}

/// True with probability `p`.
#[inline]
pub(crate) fn roll(rng: &mut dyn RngCore, p: f32) -> bool {
    rng.gen::<f32>() < p
}

/// Square footprint available to a room.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RoomSite {
    /// Minimum corner at floor level.
    pub origin: BlockPos,
    /// Edge length in blocks.
    pub span: i32,
}

impl RoomSite {
    /// Smallest room a site will hold.
    const MIN_ROOM: i32 = 5;

    /// Picks a size in `range`, clamps it to leave a one-block margin and
    /// centers the room.
    pub fn place(&self, range: (u32, u32), rng: &mut dyn RngCore) -> RoomBounds {
        let (lo, hi) = range;
        let wanted = rng.gen_range(lo..=hi.max(lo)) as i32;
        let size = wanted.min(self.span - 2).max(Self::MIN_ROOM);
        let offset = (self.span - size) / 2;
        RoomBounds {
            x: self.origin.x + offset,
            y: self.origin.y,
            z: self.origin.z + offset,
            size,
        }
    }
}

/// Placed square room.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RoomBounds {
    /// Minimum x (west wall).
    pub x: i32,
    /// Floor y.
    pub y: i32,
    /// Minimum z (north wall).
    pub z: i32,
    /// Edge length including walls.
    pub size: i32,
}

impl RoomBounds {
    /// Absolute position of a room-relative offset.
    #[inline]
    #[must_use]
    pub const fn at(&self, dx: i32, dy: i32, dz: i32) -> BlockPos {
        BlockPos::new(self.x + dx, self.y + dy, self.z + dz)
    }

    /// True if the block column lies inside the room, walls included.
    #[inline]
    #[must_use]
    pub const fn contains(&self, x: i32, z: i32) -> bool {
        x >= self.x && x < self.x + self.size && z >= self.z && z < self.z + self.size
    }

    /// Center column.
    #[inline]
    #[must_use]
    pub const fn center(&self) -> (i32, i32) {
        (self.x + self.size / 2, self.z + self.size / 2)
    }

    /// Floor-level position of the wall block facing `direction`, on the
    /// room's center line.
    #[must_use]
    pub const fn wall_midpoint(&self, direction: Direction) -> BlockPos {
        let (cx, cz) = self.center();
        match direction {
            Direction::North => BlockPos::new(cx, self.y, self.z),
            Direction::South => BlockPos::new(cx, self.y, self.z + self.size - 1),
            Direction::East => BlockPos::new(self.x + self.size - 1, self.y, cz),
            Direction::West => BlockPos::new(self.x, self.y, cz),
        }
    }

    /// Writes a block at a room-relative offset; offsets outside the room
    /// are ignored.
    #[inline]
    pub fn set(&self, sink: &mut dyn TerrainSink, dx: i32, dy: i32, dz: i32, block: Block) {
        if (0..self.size).contains(&dx) && (0..self.size).contains(&dz) {
            sink.set_block(self.at(dx, dy, dz), block);
        }
    }
}

/// Floor, cleared interior, ceiling and perimeter walls.
pub fn build_shell(sink: &mut dyn TerrainSink, room: &RoomBounds, palette: &BlockPalette, height: i32) {
    for dx in 0..room.size {
        for dz in 0..room.size {
            let edge = dx == 0 || dz == 0 || dx == room.size - 1 || dz == room.size - 1;
            room.set(sink, dx, 0, dz, palette.floor);
            for dy in 1..height {
                room.set(sink, dx, dy, dz, if edge { palette.wall } else { Block::AIR });
            }
            room.set(sink, dx, height, dz, palette.ceiling);
        }
    }
}

/// Worn floors and stained ceilings, scaled by how dirty the theme is.
pub fn apply_decay(
    sink: &mut dyn TerrainSink,
    room: &RoomBounds,
    rng: &mut dyn RngCore,
    ctx: &RoomContext<'_>,
    cleanliness: f32,
) {
    let wear_chance = ctx.decay_chance * (1.0 - cleanliness);
    for dx in 1..room.size - 1 {
        for dz in 1..room.size - 1 {
            let pos = room.at(dx, 0, dz);
            let (wx, wz) = (f64::from(pos.x), f64::from(pos.z));
            if ctx.noise.feature(wx, wz, FeatureType::FloorWear) > 0.6
                && roll(rng, wear_chance)
                && sink.get_block(pos).is_structural()
            {
                sink.set_block(pos, Block::GRAVEL);
            }
            if ctx.noise.feature(wx, wz, FeatureType::CeilingStains) > 0.7 && roll(rng, ctx.decay_chance * 0.5) {
                let under = room.at(dx, ctx.light_y(), dz);
                if sink.get_block(under).is_air() {
                    sink.set_block(under, Block::COBWEB);
                }
            }
        }
    }
}

/// Static description of a template.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TemplateSpec {
    /// Display name.
    pub name: &'static str,
    /// Selection weight.
    pub weight: f32,
    /// Smallest cell room size accepted.
    pub min_size: u32,
    /// Largest cell room size accepted.
    pub max_size: u32,
    /// Size range the room is built at.
    pub generated: (u32, u32),
    /// Materials.
    pub palette: BlockPalette,
}

/// A room layout generator.
pub trait RoomTemplate: Send + Sync {
    /// Weight, size limits and palette.
    fn spec(&self) -> &TemplateSpec;

    /// Places furniture, machinery and lights inside a built shell.
    fn furnish(
        &self,
        sink: &mut dyn TerrainSink,
        room: &RoomBounds,
        rng: &mut dyn RngCore,
        ctx: &RoomContext<'_>,
    );

    /// Template name.
    fn name(&self) -> &'static str {
        self.spec().name
    }

    /// Selection weight.
    fn weight(&self) -> f32 {
        self.spec().weight
    }

    /// True if a cell of this room size may use the template.
    fn fits_size(&self, size: u32) -> bool {
        let spec = self.spec();
        size >= spec.min_size && size <= spec.max_size
    }

    /// Builds the room inside `site`.
    ///
    /// # Returns
    ///
    /// Where the room ended up.
    fn generate(
        &self,
        sink: &mut dyn TerrainSink,
        site: &RoomSite,
        rng: &mut dyn RngCore,
        ctx: &RoomContext<'_>,
    ) -> RoomBounds {
        let spec = self.spec();
        let room = site.place(spec.generated, rng);
        build_shell(sink, &room, &spec.palette, ctx.room_height);
        self.furnish(sink, &room, rng, ctx);
        room
    }
}

/// Ascending offsets from `start` while below `end`.
fn grid(start: i32, end: i32, step: usize) -> impl Iterator<Item = i32> {
    (start..end).step_by(step)
}

/// Plain studio room with glowstone panels.
pub struct StandardRoom;

impl RoomTemplate for StandardRoom {
    fn spec(&self) -> &TemplateSpec {
        const SPEC: TemplateSpec = TemplateSpec {
            name: "standard",
            weight: 1.0,
            min_size: 8,
            max_size: 24,
            generated: (16, 24),
            palette: BlockPalette::STANDARD,
        };
        &SPEC
    }

    fn furnish(&self, sink: &mut dyn TerrainSink, room: &RoomBounds, _rng: &mut dyn RngCore, ctx: &RoomContext<'_>) {
        let s = room.size;
        for x in grid(4, s - 4, 8) {
            for z in grid(4, s - 4, 8) {
                room.set(sink, x, ctx.light_y(), z, Block::GLOWSTONE);
            }
        }
    }
}

/// Desks, chairs and monitors.
pub struct OfficeRoom;

impl RoomTemplate for OfficeRoom {
    fn spec(&self) -> &TemplateSpec {
        const SPEC: TemplateSpec = TemplateSpec {
            name: "office",
            weight: 0.8,
            min_size: 12,
            max_size: 28,
            generated: (16, 28),
            palette: BlockPalette::new(
                Block::WHITE_CONCRETE,
                Block::LIGHT_GRAY_CONCRETE,
                Block::WHITE_CONCRETE,
                Block::SEA_LANTERN,
            ),
        };
        &SPEC
    }

    fn furnish(&self, sink: &mut dyn TerrainSink, room: &RoomBounds, rng: &mut dyn RngCore, ctx: &RoomContext<'_>) {
        let s = room.size;
        for x in grid(3, s - 3, 6) {
            for z in grid(3, s - 3, 6) {
                if !ctx.furnish_slot(rng) {
                    continue;
                }
                room.set(sink, x, 1, z, Block::SPRUCE_PLANKS);
                room.set(sink, x + 1, 1, z, Block::SPRUCE_PLANKS);
                room.set(sink, x, 1, z + 2, Block::DARK_OAK_STAIRS);
                if roll(rng, 0.7) {
                    room.set(sink, x, 2, z, Block::BLACK_STAINED_GLASS);
                }
            }
        }
        for x in grid(6, s - 6, 12) {
            for z in grid(6, s - 6, 12) {
                room.set(sink, x, ctx.light_y(), z, Block::SEA_LANTERN);
            }
        }
    }
}

/// Shelving with barrels and chests.
pub struct StorageRoom;

impl RoomTemplate for StorageRoom {
    fn spec(&self) -> &TemplateSpec {
        const SPEC: TemplateSpec = TemplateSpec {
            name: "storage",
            weight: 0.6,
            min_size: 10,
            max_size: 32,
            generated: (20, 32),
            palette: BlockPalette::new(
                Block::BROWN_CONCRETE,
                Block::DARK_OAK_PLANKS,
                Block::BROWN_CONCRETE,
                Block::TORCH,
            ),
        };
        &SPEC
    }

    fn furnish(&self, sink: &mut dyn TerrainSink, room: &RoomBounds, rng: &mut dyn RngCore, ctx: &RoomContext<'_>) {
        let s = room.size;
        for x in grid(2, s - 2, 4) {
            for z in grid(2, s - 2, 8) {
                if !ctx.furnish_slot(rng) {
                    continue;
                }
                for y in [1, 3, 5] {
                    for (dx, dz) in [(0, 0), (1, 0), (0, 1), (1, 1)] {
                        room.set(sink, x + dx, y, z + dz, Block::OAK_PLANKS);
                    }
                }
                for y in 1..7 {
                    room.set(sink, x, y, z + 2, Block::DARK_OAK_LOG);
                    room.set(sink, x + 1, y, z + 2, Block::DARK_OAK_LOG);
                }
                if roll(rng, 0.6) {
                    room.set(sink, x, 2, z, Block::BARREL);
                }
                if roll(rng, 0.4) {
                    room.set(sink, x + 1, 4, z, Block::CHEST);
                }
            }
        }
        for x in grid(8, s - 8, 16) {
            for z in grid(8, s - 8, 16) {
                room.set(sink, x, ctx.room_height - 2, z, Block::TORCH);
            }
        }
    }
}

/// Damaged room: gravel, holes, cobwebs, mycelium, dim soul torches.
pub struct BrokenRoom;

impl RoomTemplate for BrokenRoom {
    fn spec(&self) -> &TemplateSpec {
        const SPEC: TemplateSpec = TemplateSpec {
            name: "broken",
            weight: 0.4,
            min_size: 8,
            max_size: 20,
            generated: (12, 20),
            palette: BlockPalette::new(
                Block::BLACK_CONCRETE,
                Block::COBBLESTONE,
                Block::BLACK_CONCRETE,
                Block::SOUL_TORCH,
            ),
        };
        &SPEC
    }

    fn furnish(&self, sink: &mut dyn TerrainSink, room: &RoomBounds, rng: &mut dyn RngCore, ctx: &RoomContext<'_>) {
        let s = room.size;
        for x in 1..s - 1 {
            for z in 1..s - 1 {
                let pos = room.at(x, 0, z);
                let (wx, wz) = (f64::from(pos.x), f64::from(pos.z));

                if ctx.noise.feature(wx, wz, FeatureType::WallDamage) > 0.7 {
                    if roll(rng, 0.3) {
                        room.set(sink, x, 0, z, Block::GRAVEL);
                    }
                    let inner_ring = x == 1 || z == 1 || x == s - 2 || z == s - 2;
                    if roll(rng, 0.2) && inner_ring {
                        // Punch through the adjacent wall
                        let hx = if x == 1 { 0 } else if x == s - 2 { s - 1 } else { x };
                        let hz = if z == 1 { 0 } else if z == s - 2 { s - 1 } else { z };
                        for y in 1..4 {
                            room.set(sink, hx, y, hz, Block::AIR);
                        }
                    }
                }

                if ctx.noise.feature(wx, wz, FeatureType::MoldGrowth) > 0.8 {
                    if roll(rng, 0.4) {
                        let y = 1 + rng.gen_range(0..3);
                        room.set(sink, x, y, z, Block::COBWEB);
                    }
                    if roll(rng, 0.3) {
                        room.set(sink, x, 0, z, Block::MYCELIUM);
                    }
                }
            }
        }
        for x in grid(6, s - 6, 12) {
            for z in grid(6, s - 6, 12) {
                if roll(rng, 0.6) {
                    room.set(sink, x, ctx.light_y(), z, Block::SOUL_TORCH);
                }
            }
        }
    }
}

/// Machinery blocks and pipe runs.
pub struct IndustrialRoom;

impl RoomTemplate for IndustrialRoom {
    fn spec(&self) -> &TemplateSpec {
        const SPEC: TemplateSpec = TemplateSpec {
            name: "industrial",
            weight: 0.5,
            min_size: 16,
            max_size: 32,
            generated: (20, 32),
            palette: BlockPalette::new(
                Block::GRAY_CONCRETE,
                Block::IRON_BLOCK,
                Block::GRAY_CONCRETE,
                Block::REDSTONE_LAMP,
            ),
        };
        &SPEC
    }

    fn furnish(&self, sink: &mut dyn TerrainSink, room: &RoomBounds, rng: &mut dyn RngCore, ctx: &RoomContext<'_>) {
        let s = room.size;
        for x in grid(4, s - 4, 8) {
            for z in grid(4, s - 4, 8) {
                if !ctx.furnish_slot(rng) {
                    continue;
                }
                room.set(sink, x, 1, z, Block::BLAST_FURNACE);
                room.set(sink, x + 1, 1, z, Block::SMOKER);
                room.set(sink, x, 1, z + 1, Block::DISPENSER);
                room.set(sink, x + 1, 1, z + 1, Block::OBSERVER);
                for y in 2..8.min(ctx.room_height - 1) {
                    if roll(rng, 0.7) {
                        room.set(sink, x + 2, y, z, Block::IRON_BARS);
                    }
                }
            }
        }
        for x in grid(6, s - 6, 8) {
            for z in grid(6, s - 6, 8) {
                room.set(sink, x, ctx.room_height - 2, z, Block::REDSTONE_LAMP);
            }
        }
    }
}

/// Meeting room with a central table and a screen.
pub struct ConferenceRoom;

impl RoomTemplate for ConferenceRoom {
    fn spec(&self) -> &TemplateSpec {
        const SPEC: TemplateSpec = TemplateSpec {
            name: "conference",
            weight: 0.3,
            min_size: 24,
            max_size: 48,
            generated: (32, 48),
            palette: BlockPalette::new(
                Block::QUARTZ_BLOCK,
                Block::WHITE_CONCRETE,
                Block::QUARTZ_BLOCK,
                Block::SEA_LANTERN,
            ),
        };
        &SPEC
    }

    fn furnish(&self, sink: &mut dyn TerrainSink, room: &RoomBounds, rng: &mut dyn RngCore, ctx: &RoomContext<'_>) {
        let s = room.size;
        let c = s / 2;
        let half = 12.min(s / 3) / 2;

        for x in c - half..c + half {
            for z in c - half..c + half {
                room.set(sink, x, 1, z, Block::DARK_OAK_PLANKS);
            }
        }
        for x in (c - half..c + half).step_by(2) {
            for z in [c - half - 1, c + half] {
                if ctx.furnish_slot(rng) {
                    room.set(sink, x, 1, z, Block::DARK_OAK_STAIRS);
                }
            }
        }
        for z in (c - half..c + half).step_by(2) {
            for x in [c - half - 1, c + half] {
                if ctx.furnish_slot(rng) {
                    room.set(sink, x, 1, z, Block::DARK_OAK_STAIRS);
                }
            }
        }

        for x in c - 4..c + 4 {
            for y in 2..8.min(ctx.room_height - 1) {
                room.set(sink, x, y, 1, Block::BLACK_STAINED_GLASS);
            }
        }
        for x in grid(8, s - 8, 8) {
            for z in grid(8, s - 8, 8) {
                room.set(sink, x, ctx.light_y(), z, Block::SEA_LANTERN);
            }
        }
    }
}

/// Open-plan office floor of cubicles.
pub struct MegaOffice;

impl RoomTemplate for MegaOffice {
    fn spec(&self) -> &TemplateSpec {
        const SPEC: TemplateSpec = TemplateSpec {
            name: "mega_office",
            weight: 0.7,
            min_size: 32,
            max_size: 64,
            generated: (48, 64),
            palette: BlockPalette::new(
                Block::WHITE_CONCRETE,
                Block::LIGHT_GRAY_CONCRETE,
                Block::WHITE_CONCRETE,
                Block::SEA_LANTERN,
            ),
        };
        &SPEC
    }

    fn furnish(&self, sink: &mut dyn TerrainSink, room: &RoomBounds, rng: &mut dyn RngCore, ctx: &RoomContext<'_>) {
        let s = room.size;
        for x in grid(0, s, 16) {
            for z in 1..s - 1 {
                room.set(sink, x, 0, z, Block::LIGHT_BLUE_CONCRETE);
            }
        }
        for z in grid(0, s, 16) {
            for x in 1..s - 1 {
                room.set(sink, x, 0, z, Block::LIGHT_BLUE_CONCRETE);
            }
        }

        for x in grid(4, s - 4, 8) {
            for z in grid(4, s - 4, 8) {
                if !ctx.furnish_slot(rng) {
                    continue;
                }
                for h in 1..4 {
                    for w in 0..6 {
                        if w == 0 || w == 5 {
                            room.set(sink, x + w, h, z, Block::GRAY_WOOL);
                            room.set(sink, x + w, h, z + 5, Block::GRAY_WOOL);
                        } else {
                            room.set(sink, x, h, z + w, Block::GRAY_WOOL);
                            room.set(sink, x + 5, h, z + w, Block::GRAY_WOOL);
                        }
                    }
                }
                room.set(sink, x + 1, 1, z + 1, Block::SPRUCE_PLANKS);
                room.set(sink, x + 2, 1, z + 1, Block::SPRUCE_PLANKS);
                room.set(sink, x + 1, 1, z + 3, Block::DARK_OAK_STAIRS);
                if roll(rng, 0.8) {
                    room.set(sink, x + 1, 2, z + 1, Block::BLACK_STAINED_GLASS);
                }
            }
        }

        for x in grid(8, s - 8, 8) {
            for z in grid(8, s - 8, 8) {
                room.set(sink, x, ctx.light_y(), z, Block::SEA_LANTERN);
            }
        }
    }
}

/// Warehouse with tall racks and forklift lanes.
pub struct MegaStorage;

impl RoomTemplate for MegaStorage {
    fn spec(&self) -> &TemplateSpec {
        const SPEC: TemplateSpec = TemplateSpec {
            name: "mega_storage",
            weight: 0.5,
            min_size: 32,
            max_size: 64,
            generated: (40, 64),
            palette: BlockPalette::new(
                Block::BROWN_CONCRETE,
                Block::DARK_OAK_PLANKS,
                Block::BROWN_CONCRETE,
                Block::GLOWSTONE,
            ),
        };
        &SPEC
    }

    fn furnish(&self, sink: &mut dyn TerrainSink, room: &RoomBounds, rng: &mut dyn RngCore, ctx: &RoomContext<'_>) {
        let s = room.size;
        let top = ctx.room_height - 1;
        for x in grid(3, s - 3, 6) {
            for z in grid(3, s - 3, 12) {
                if !ctx.furnish_slot(rng) {
                    continue;
                }
                for y in (1..top).step_by(3) {
                    for w in 0..4 {
                        for d in 0..8 {
                            room.set(sink, x + w, y, z + d, Block::OAK_PLANKS);
                        }
                    }
                    if y + 1 < top {
                        for (w, d) in [(0, 0), (3, 0), (0, 7), (3, 7)] {
                            room.set(sink, x + w, y + 1, z + d, Block::DARK_OAK_LOG);
                        }
                    }
                }
                for y in (2..top).step_by(3) {
                    for w in 0..4 {
                        for d in (0..8).step_by(2) {
                            if roll(rng, 0.7) {
                                let crate_block = if rng.gen_bool(0.5) { Block::BARREL } else { Block::CHEST };
                                room.set(sink, x + w, y, z + d, crate_block);
                            }
                        }
                    }
                }
            }
        }
        for x in grid(6, s - 6, 12) {
            for z in 1..s - 1 {
                room.set(sink, x, 0, z, Block::YELLOW_CONCRETE);
            }
        }
        for x in grid(12, s - 12, 12) {
            for z in grid(12, s - 12, 12) {
                room.set(sink, x, ctx.room_height - 2, z, Block::GLOWSTONE);
            }
        }
    }
}

/// Power plant: generator blocks with pipes to the ceiling.
pub struct GeneratorHall;

impl RoomTemplate for GeneratorHall {
    fn spec(&self) -> &TemplateSpec {
        const SPEC: TemplateSpec = TemplateSpec {
            name: "generator",
            weight: 0.5,
            min_size: 16,
            max_size: 32,
            generated: (20, 32),
            palette: BlockPalette::new(
                Block::GRAY_CONCRETE,
                Block::STONE_BRICKS,
                Block::GRAY_CONCRETE,
                Block::REDSTONE_LAMP,
            ),
        };
        &SPEC
    }

    fn furnish(&self, sink: &mut dyn TerrainSink, room: &RoomBounds, rng: &mut dyn RngCore, ctx: &RoomContext<'_>) {
        let s = room.size;
        for x in grid(5, s - 5, 10) {
            for z in grid(5, s - 5, 10) {
                if !ctx.furnish_slot(rng) {
                    continue;
                }
                for dx in -1..=1 {
                    for dz in -1..=1 {
                        room.set(sink, x + dx, 1, z + dz, Block::IRON_BLOCK);
                    }
                }
                room.set(sink, x, 2, z, Block::OBSERVER);
                for (dx, dz) in [(-1, -1), (1, -1), (-1, 1), (1, 1)] {
                    room.set(sink, x + dx, 2, z + dz, Block::BLAST_FURNACE);
                }
                for y in 3..ctx.room_height {
                    room.set(sink, x, y, z, Block::IRON_BARS);
                }
                for d in -2..=2 {
                    for (dx, dz) in [(d, -2), (d, 2), (-2, d), (2, d)] {
                        if roll(rng, 0.5) {
                            room.set(sink, x + dx, 1, z + dz, Block::REDSTONE_WIRE);
                        }
                    }
                }
            }
        }
        for x in grid(4, s - 4, 8) {
            for z in grid(4, s - 4, 8) {
                if sink.get_block(room.at(x, ctx.light_y(), z)).is_air() {
                    room.set(sink, x, ctx.light_y(), z, Block::REDSTONE_LAMP);
                }
            }
        }
    }
}

/// Rows of bookshelves split by a center aisle.
pub struct ArchiveRoom;

impl RoomTemplate for ArchiveRoom {
    fn spec(&self) -> &TemplateSpec {
        const SPEC: TemplateSpec = TemplateSpec {
            name: "archive",
            weight: 0.4,
            min_size: 12,
            max_size: 32,
            generated: (16, 28),
            palette: BlockPalette::new(
                Block::OAK_PLANKS,
                Block::DARK_OAK_PLANKS,
                Block::OAK_PLANKS,
                Block::LANTERN,
            ),
        };
        &SPEC
    }

    fn furnish(&self, sink: &mut dyn TerrainSink, room: &RoomBounds, rng: &mut dyn RngCore, ctx: &RoomContext<'_>) {
        let s = room.size;
        let c = s / 2;
        let shelf_top = 4.min(ctx.room_height - 2);
        for x in grid(3, s - 3, 3) {
            if !ctx.furnish_slot(rng) {
                continue;
            }
            for z in 2..s - 2 {
                if (c - 1..=c + 1).contains(&z) {
                    continue;
                }
                for y in 1..=shelf_top {
                    room.set(sink, x, y, z, Block::BOOKSHELF);
                }
            }
        }
        for x in grid(4, s - 4, 8) {
            room.set(sink, x, ctx.light_y(), c, Block::LANTERN);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::noise::WorldSeed;
    use crate::world::{ChunkCoord, MemoryWorld, BASE_HEIGHT};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn all_templates() -> Vec<Box<dyn RoomTemplate>> {
        vec![
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
        ]
    }

    #[test]
    fn test_specs_are_consistent() {
        for template in all_templates() {
            let spec = template.spec();
            assert!(spec.weight > 0.0, "{}", spec.name);
            assert!(spec.min_size <= spec.max_size, "{}", spec.name);
            assert!(spec.generated.0 <= spec.generated.1, "{}", spec.name);
            assert!(template.fits_size(spec.min_size));
            assert!(!template.fits_size(spec.max_size + 1));
        }
    }

    #[test]
    fn test_site_places_centered_room() {
        let site = RoomSite {
            origin: BlockPos::new(0, BASE_HEIGHT, 0),
            span: 32,
        };
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        for _ in 0..50 {
            let room = site.place((16, 48), &mut rng);
            assert!((16..=30).contains(&room.size));
            assert!(room.x >= 1 && room.x + room.size <= 31);
            assert_eq!(room.x, room.z);
        }
    }

    #[test]
    fn test_generated_rooms_stay_in_bounds() {
        let noise = NoiseManager::new(WorldSeed::new(8));
        let ctx = RoomContext {
            noise: &noise,
            room_height: 12,
            furniture_chance: 1.0,
            decay_chance: 1.0,
        };
        for template in all_templates() {
            let mut world = MemoryWorld::new();
            let mut rng = ChaCha8Rng::seed_from_u64(3);
            let site = RoomSite {
                origin: BlockPos::new(0, BASE_HEIGHT, 0),
                span: 64,
            };
            let room = template.generate(&mut world, &site, &mut rng, &ctx);
            let palette = template.spec().palette;
            assert!(room.size >= template.spec().generated.0.min(62) as i32);

            // Floor and ceiling fully laid under the center
            let (cx, cz) = room.center();
            let floor = world.get_block(BlockPos::new(cx, BASE_HEIGHT, cz));
            assert!(floor.is_solid(), "{}", template.name());
            assert_eq!(world.get_block(BlockPos::new(cx, BASE_HEIGHT + 12, cz)), palette.ceiling);

            // Nothing outside the room footprint
            for x in -1..=64 {
                for z in [-1, 64] {
                    for y in BASE_HEIGHT..=BASE_HEIGHT + 12 {
                        assert!(world.get_block(BlockPos::new(x, y, z)).is_air());
                    }
                }
            }
        }
    }

    #[test]
    fn test_decay_only_touches_interior() {
        let noise = NoiseManager::new(WorldSeed::new(21));
        let ctx = RoomContext {
            noise: &noise,
            room_height: 12,
            furniture_chance: 0.0,
            decay_chance: 1.0,
        };
        let mut world = MemoryWorld::new();
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let room = RoomBounds {
            x: 0,
            y: BASE_HEIGHT,
            z: 0,
            size: 20,
        };
        build_shell(&mut world, &room, &BlockPalette::STANDARD, 12);
        apply_decay(&mut world, &room, &mut rng, &ctx, 0.0);
        for i in 0..20 {
            assert_eq!(world.get_block(room.at(i, 0, 0)), BlockPalette::STANDARD.floor);
            assert_eq!(world.get_block(room.at(0, 5, i)), BlockPalette::STANDARD.wall);
        }
    }

    #[test]
    fn test_zero_decay_chance_leaves_room_untouched() {
        let noise = NoiseManager::new(WorldSeed::new(21));
        let ctx = RoomContext {
            noise: &noise,
            room_height: 12,
            furniture_chance: 0.0,
            decay_chance: 0.0,
        };
        let room = RoomBounds {
            x: 0,
            y: BASE_HEIGHT,
            z: 0,
            size: 20,
        };
        let mut clean = MemoryWorld::new();
        build_shell(&mut clean, &room, &BlockPalette::STANDARD, 12);
        let mut decayed = MemoryWorld::new();
        build_shell(&mut decayed, &room, &BlockPalette::STANDARD, 12);

        let mut rng = ChaCha8Rng::seed_from_u64(9);
        apply_decay(&mut decayed, &room, &mut rng, &ctx, 0.0);
        for coord in [ChunkCoord::new(0, 0), ChunkCoord::new(1, 0), ChunkCoord::new(0, 1), ChunkCoord::new(1, 1)] {
            assert_eq!(decayed.fingerprint(coord), clean.fingerprint(coord));
        }
    }
}
