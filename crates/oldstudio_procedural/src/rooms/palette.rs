//! Per-theme block palettes.

use crate::block::Block;
use crate::maze::RoomTheme;

/// The four materials a themed space is built from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlockPalette {
    /// Floor material.
    pub floor: Block,
    /// Wall material.
    pub wall: Block,
    /// Ceiling material.
    pub ceiling: Block,
    /// Light source.
    pub light: Block,
}

impl BlockPalette {
    /// Creates a palette.
    #[inline]
    #[must_use]
    pub const fn new(floor: Block, wall: Block, ceiling: Block, light: Block) -> Self {
        Self {
            floor,
            wall,
            ceiling,
            light,
        }
    }

    /// The classic yellow studio look.
    pub const STANDARD: Self = Self::new(
        Block::YELLOW_CONCRETE,
        Block::GRAY_CONCRETE,
        Block::YELLOW_CONCRETE,
        Block::GLOWSTONE,
    );

    /// Palette for a theme.
    #[must_use]
    pub const fn for_theme(theme: RoomTheme) -> Self {
        match theme {
            RoomTheme::Standard => Self::STANDARD,
            RoomTheme::Office => Self::new(
                Block::WHITE_CONCRETE,
                Block::LIGHT_GRAY_CONCRETE,
                Block::WHITE_CONCRETE,
                Block::SEA_LANTERN,
            ),
            RoomTheme::Industrial => Self::new(
                Block::GRAY_CONCRETE,
                Block::IRON_BLOCK,
                Block::GRAY_CONCRETE,
                Block::REDSTONE_LAMP,
            ),
            RoomTheme::Storage => Self::new(
                Block::BROWN_CONCRETE,
                Block::DARK_OAK_PLANKS,
                Block::BROWN_CONCRETE,
                Block::TORCH,
            ),
            RoomTheme::Abandoned => Self::new(
                Block::BLACK_CONCRETE,
                Block::COBBLESTONE,
                Block::BLACK_CONCRETE,
                Block::SOUL_TORCH,
            ),
            RoomTheme::Clinical => Self::new(
                Block::WHITE_CONCRETE,
                Block::QUARTZ_BLOCK,
                Block::WHITE_CONCRETE,
                Block::END_ROD,
            ),
            RoomTheme::Residential => Self::new(
                Block::OAK_PLANKS,
                Block::BRICK_WALL,
                Block::OAK_PLANKS,
                Block::LANTERN,
            ),
            RoomTheme::Technical => Self::new(
                Block::LIGHT_BLUE_CONCRETE,
                Block::IRON_BLOCK,
                Block::LIGHT_BLUE_CONCRETE,
                Block::REDSTONE_LAMP,
            ),
            RoomTheme::GeneratorRoom => Self::new(
                Block::GRAY_CONCRETE,
                Block::STONE_BRICKS,
                Block::GRAY_CONCRETE,
                Block::REDSTONE_LAMP,
            ),
        }
    }
}
