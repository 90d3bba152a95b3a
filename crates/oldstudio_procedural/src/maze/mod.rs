//! # Maze Graph
//!
//! The studio floor plan is an infinite grid of cells. Each cell is a room
//! or a corridor with up to four openings.
//!
//! - [`cell`]: the cell model and its small vocabulary types
//! - [`connectivity`]: spanning tree, loops and forced connectivity over a
//!   rectangle of cells
//! - [`generator`]: raw cell draws, region stitching and the cell cache

pub mod cell;
pub mod connectivity;
pub mod generator;

pub use cell::{
    CellExtras, CellType, Connections, Direction, GenerationStrategy, MazeCell, RoomTheme,
    SpecialType,
};
pub use connectivity::{
    add_secondary_loops, build_spanning_tree, ensure_connectivity, find_components,
    is_fully_connected, GridBounds, MazeGrid,
};
pub use generator::{region_bounds, region_of, MazeGenerator, MazeSettings, REGION_SIZE};
