//! # Maze Cells
//!
//! One node of the infinite maze graph. A cell covers `grid_size` x
//! `grid_size` blocks and records its layout role (room or corridor),
//! which of its four sides open into neighbors, and the thematic tags
//! that drive content generation.

use std::fmt;

/// Cardinal direction on the horizontal grid.
///
/// North is `-z`, east is `+x`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Direction {
    /// Toward negative z.
    North,
    /// Toward positive z.
    South,
    /// Toward positive x.
    East,
    /// Toward negative x.
    West,
}

impl Direction {
    /// All directions, in declaration order.
    pub const ALL: [Self; 4] = [Self::North, Self::South, Self::East, Self::West];

    /// Grid delta `(dx, dz)` of one step in this direction.
    #[inline]
    #[must_use]
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Self::North => (0, -1),
            Self::South => (0, 1),
            Self::East => (1, 0),
            Self::West => (-1, 0),
        }
    }

    /// The opposite direction.
    #[inline]
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::North => Self::South,
            Self::South => Self::North,
            Self::East => Self::West,
            Self::West => Self::East,
        }
    }

    /// Rotates 90 degrees clockwise (seen from above).
    #[inline]
    #[must_use]
    pub const fn rotate_clockwise(self) -> Self {
        match self {
            Self::North => Self::East,
            Self::East => Self::South,
            Self::South => Self::West,
            Self::West => Self::North,
        }
    }

    /// Rotates 90 degrees counter-clockwise.
    #[inline]
    #[must_use]
    pub const fn rotate_counter_clockwise(self) -> Self {
        match self {
            Self::North => Self::West,
            Self::West => Self::South,
            Self::South => Self::East,
            Self::East => Self::North,
        }
    }

    /// True for east and west.
    #[inline]
    #[must_use]
    pub const fn is_x_axis(self) -> bool {
        matches!(self, Self::East | Self::West)
    }

    /// Direction from `(x1, z1)` toward an orthogonal neighbor `(x2, z2)`.
    #[must_use]
    pub const fn between(x1: i32, z1: i32, x2: i32, z2: i32) -> Self {
        if x2 > x1 {
            Self::East
        } else if x2 < x1 {
            Self::West
        } else if z2 > z1 {
            Self::South
        } else {
            Self::North
        }
    }

    /// Maps `0..4` onto directions (wrapping).
    #[inline]
    #[must_use]
    pub const fn from_index(index: u32) -> Self {
        Self::ALL[(index % 4) as usize]
    }

    #[inline]
    const fn bit(self) -> u8 {
        1 << self as u8
    }
}

/// Set of open sides, stored as a 4-bit mask.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Connections(u8);

impl Connections {
    /// No connections.
    pub const NONE: Self = Self(0);

    /// Adds a direction.
    #[inline]
    pub fn insert(&mut self, direction: Direction) {
        self.0 |= direction.bit();
    }

    /// Removes a direction.
    #[inline]
    pub fn remove(&mut self, direction: Direction) {
        self.0 &= !direction.bit();
    }

    /// True if the direction is open.
    #[inline]
    #[must_use]
    pub const fn contains(self, direction: Direction) -> bool {
        self.0 & direction.bit() != 0
    }

    /// Number of open sides.
    #[inline]
    #[must_use]
    pub const fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// True if no side is open.
    #[inline]
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Iterates the open directions in declaration order.
    pub fn iter(self) -> impl Iterator<Item = Direction> {
        Direction::ALL.into_iter().filter(move |d| self.contains(*d))
    }
}

impl fmt::Debug for Connections {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

/// Layout role of a cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum CellType {
    /// Narrow passage.
    #[default]
    Corridor,
    /// Enclosed room generated from a template.
    Room,
    /// Corridor crossing with three or more exits.
    Junction,
    /// Area reserved for a special feature.
    SpecialArea,
}

/// Special-purpose tag.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SpecialType {
    /// No special purpose.
    #[default]
    None,
    /// Anchor of a multi-cell room.
    MegaRoom,
    /// Room with windows or viewing areas.
    Observation,
    /// Contains machinery or generators.
    GeneratorRoom,
    /// Secure storage area.
    StorageVault,
    /// Radio and TV equipment.
    BroadcastStation,
    /// Heavily damaged area.
    AbandonedSection,
    /// Partially flooded.
    FloodedArea,
    /// No lighting.
    DarkZone,
    /// Narrow technical corridors.
    MaintenanceShaft,
    /// Vertical connection point.
    ElevatorShaft,
    /// Multi-level connection.
    Stairs,
    /// Document and tape storage.
    ArchiveRoom,
    /// Monitoring equipment.
    SecurityStation,
    /// Staff amenities.
    BreakRoom,
    /// Meeting space.
    ConferenceRoom,
}

impl SpecialType {
    /// Every variant, `None` included, in declaration order.
    pub const ALL: [Self; 16] = [
        Self::None,
        Self::MegaRoom,
        Self::Observation,
        Self::GeneratorRoom,
        Self::StorageVault,
        Self::BroadcastStation,
        Self::AbandonedSection,
        Self::FloodedArea,
        Self::DarkZone,
        Self::MaintenanceShaft,
        Self::ElevatorShaft,
        Self::Stairs,
        Self::ArchiveRoom,
        Self::SecurityStation,
        Self::BreakRoom,
        Self::ConferenceRoom,
    ];
}

/// Aesthetic and material profile of a room.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum RoomTheme {
    /// Default studio look.
    #[default]
    Standard,
    /// Corporate office.
    Office,
    /// Factory floor.
    Industrial,
    /// Warehouse.
    Storage,
    /// Heavily decayed.
    Abandoned,
    /// Medical or laboratory.
    Clinical,
    /// Home-like.
    Residential,
    /// Server rooms.
    Technical,
    /// Power plant.
    GeneratorRoom,
}

impl RoomTheme {
    /// Every theme, in declaration order.
    pub const ALL: [Self; 9] = [
        Self::Standard,
        Self::Office,
        Self::Industrial,
        Self::Storage,
        Self::Abandoned,
        Self::Clinical,
        Self::Residential,
        Self::Technical,
        Self::GeneratorRoom,
    ];

    /// Ambient light level in `[0, 1]`.
    #[must_use]
    pub const fn light_level(self) -> f32 {
        match self {
            Self::Standard | Self::Technical => 0.5,
            Self::Office => 0.7,
            Self::Industrial => 0.3,
            Self::Storage | Self::GeneratorRoom => 0.4,
            Self::Abandoned => 0.1,
            Self::Clinical => 0.8,
            Self::Residential => 0.6,
        }
    }

    /// Cleanliness level in `[0, 1]`.
    #[must_use]
    pub const fn cleanliness_level(self) -> f32 {
        match self {
            Self::Standard | Self::GeneratorRoom => 0.3,
            Self::Office => 0.6,
            Self::Industrial => 0.2,
            Self::Storage => 0.1,
            Self::Abandoned => 0.05,
            Self::Clinical => 0.8,
            Self::Residential => 0.5,
            Self::Technical => 0.4,
        }
    }

    /// Themes furnished with desks and chairs.
    #[must_use]
    pub const fn has_furniture(self) -> bool {
        matches!(self, Self::Office | Self::Residential | Self::Abandoned)
    }

    /// Themes furnished with machinery.
    #[must_use]
    pub const fn has_machinery(self) -> bool {
        matches!(self, Self::Industrial | Self::Technical | Self::GeneratorRoom)
    }

    /// Themes that receive a decay pass.
    #[must_use]
    pub fn has_decay(self) -> bool {
        matches!(self, Self::Abandoned) || self.cleanliness_level() < 0.3
    }
}

/// Strategy that produced a cell's base layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GenerationStrategy {
    /// Few, long connections and frequent rooms.
    DepthFirst,
    /// Balanced rooms and corridors.
    Prims,
    /// Large open rooms.
    Cellular,
    /// Noise-shaped rooms.
    Organic,
}

/// Typed optional attributes of a cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct CellExtras {
    /// Strategy chosen by algorithm noise.
    pub strategy: Option<GenerationStrategy>,
    /// Grid position of the mega room anchor covering this cell.
    pub mega_anchor: Option<(i32, i32)>,
}

/// A single maze graph node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MazeCell {
    x: i32,
    z: i32,
    /// Layout role.
    pub cell_type: CellType,
    connections: Connections,
    room_size: u32,
    /// True when the cell is covered by a mega room.
    pub occupied: bool,
    dead_end: bool,
    /// Special-purpose tag.
    pub special: SpecialType,
    /// Theme (meaningful for rooms).
    pub theme: RoomTheme,
    /// Typed extras.
    pub extras: CellExtras,
}

impl MazeCell {
    /// Smallest room size a cell can carry.
    pub const MIN_ROOM_SIZE: u32 = 8;
    /// Largest room size a cell can carry.
    pub const MAX_ROOM_SIZE: u32 = 32;

    /// Creates a plain corridor cell with no connections.
    #[must_use]
    pub fn new(x: i32, z: i32) -> Self {
        Self {
            x,
            z,
            cell_type: CellType::Corridor,
            connections: Connections::NONE,
            room_size: 16,
            occupied: false,
            dead_end: false,
            special: SpecialType::None,
            theme: RoomTheme::Standard,
            extras: CellExtras::default(),
        }
    }

    /// Grid x coordinate.
    #[inline]
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Grid z coordinate.
    #[inline]
    #[must_use]
    pub const fn z(&self) -> i32 {
        self.z
    }

    /// True for room cells.
    #[inline]
    #[must_use]
    pub fn is_room(&self) -> bool {
        self.cell_type == CellType::Room
    }

    /// True for corridor cells.
    #[inline]
    #[must_use]
    pub fn is_corridor(&self) -> bool {
        self.cell_type == CellType::Corridor
    }

    /// The open sides.
    #[inline]
    #[must_use]
    pub const fn connections(&self) -> Connections {
        self.connections
    }

    /// Opens a side.
    #[inline]
    pub fn add_connection(&mut self, direction: Direction) {
        self.connections.insert(direction);
    }

    /// Closes a side.
    #[inline]
    pub fn remove_connection(&mut self, direction: Direction) {
        self.connections.remove(direction);
    }

    /// Closes every side.
    #[inline]
    pub fn clear_connections(&mut self) {
        self.connections = Connections::NONE;
    }

    /// True if the side is open.
    #[inline]
    #[must_use]
    pub const fn has_connection(&self, direction: Direction) -> bool {
        self.connections.contains(direction)
    }

    /// Number of open sides.
    #[inline]
    #[must_use]
    pub const fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Sides that are still closed.
    #[must_use]
    pub fn available_directions(&self) -> Vec<Direction> {
        Direction::ALL
            .into_iter()
            .filter(|d| !self.connections.contains(*d))
            .collect()
    }

    /// Room size, always within `[MIN_ROOM_SIZE, MAX_ROOM_SIZE]`.
    #[inline]
    #[must_use]
    pub const fn room_size(&self) -> u32 {
        self.room_size
    }

    /// Sets the room size, clamped to `[MIN_ROOM_SIZE, MAX_ROOM_SIZE]`.
    #[inline]
    pub fn set_room_size(&mut self, size: u32) {
        self.room_size = size.clamp(Self::MIN_ROOM_SIZE, Self::MAX_ROOM_SIZE);
    }

    /// Dead-end flag. Only ever true with exactly one connection.
    #[inline]
    #[must_use]
    pub const fn is_dead_end(&self) -> bool {
        self.dead_end
    }

    /// Turns the cell into a dead end with exactly one opening.
    pub fn make_dead_end(&mut self, direction: Direction) {
        self.connections = Connections::NONE;
        self.connections.insert(direction);
        self.dead_end = true;
    }

    /// Keeps the dead-end flag only while exactly one side is open.
    pub fn settle_dead_end(&mut self) {
        self.dead_end = self.dead_end && self.connection_count() == 1;
    }

    /// True if the cell has a special tag.
    #[inline]
    #[must_use]
    pub fn has_special(&self) -> bool {
        self.special != SpecialType::None
    }

    /// True if no side is open.
    #[inline]
    #[must_use]
    pub const fn is_isolated(&self) -> bool {
        self.connections.is_empty()
    }

    /// True with three or more open sides.
    #[inline]
    #[must_use]
    pub const fn is_junction(&self) -> bool {
        self.connections.len() >= 3
    }

    /// True with exactly two open sides.
    #[inline]
    #[must_use]
    pub const fn is_linear(&self) -> bool {
        self.connections.len() == 2
    }

    /// Open sides as a fraction of four.
    #[inline]
    #[must_use]
    pub fn connectivity_density(&self) -> f32 {
        self.connections.len() as f32 / 4.0
    }

    /// Whether the opening on `direction` deserves a door frame.
    #[must_use]
    pub fn should_have_door(&self, direction: Direction) -> bool {
        if !self.has_connection(direction) {
            return false;
        }
        if self.is_room() && self.has_special() {
            return true;
        }
        if self.dead_end {
            return false;
        }
        matches!(self.theme, RoomTheme::Office | RoomTheme::Industrial)
    }

    /// Whether a closed side of a room should get a window.
    #[must_use]
    pub fn should_have_window(&self, direction: Direction) -> bool {
        self.is_room()
            && !self.has_connection(direction)
            && (self.theme == RoomTheme::Office || self.special == SpecialType::Observation)
    }

    /// Grid position of the neighbor in `direction`.
    #[inline]
    #[must_use]
    pub const fn neighbor(&self, direction: Direction) -> (i32, i32) {
        let (dx, dz) = direction.delta();
        (self.x + dx, self.z + dz)
    }
}
