//! # Block Vocabulary
//!
//! The closed set of materials the generator writes. Ids are grouped so
//! that classification is a range check:
//!
//! | Range     | Group                                   |
//! |-----------|-----------------------------------------|
//! | 0         | air                                     |
//! | 1..=63    | structural (floors, walls, ceilings)    |
//! | 64..=95   | light sources                           |
//! | 96..      | furnishings, props and cue blocks       |
//!
//! The host maps these ids onto its own block registry.

use bytemuck::{Pod, Zeroable};

/// A single block in the world.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Pod, Zeroable)]
#[repr(C)]
pub struct Block {
    /// Block type ID.
    pub id: u16,
    /// Block metadata (facing, variant).
    pub meta: u16,
}

macro_rules! blocks {
    ($($(#[$doc:meta])* $name:ident = $id:literal;)*) => {
        impl Block {
            $(
                $(#[$doc])*
                pub const $name: Self = Self { id: $id, meta: 0 };
            )*

            /// Stable name of the block type.
            #[must_use]
            pub const fn name(self) -> &'static str {
                match self.id {
                    $($id => stringify!($name),)*
                    _ => "unknown",
                }
            }
        }
    };
}

blocks! {
    /// Air (empty).
    AIR = 0;

    /// Yellow concrete, the classic studio floor.
    YELLOW_CONCRETE = 1;
    /// Gray concrete.
    GRAY_CONCRETE = 2;
    /// White concrete.
    WHITE_CONCRETE = 3;
    /// Light gray concrete.
    LIGHT_GRAY_CONCRETE = 4;
    /// Brown concrete.
    BROWN_CONCRETE = 5;
    /// Black concrete.
    BLACK_CONCRETE = 6;
    /// Light blue concrete.
    LIGHT_BLUE_CONCRETE = 7;
    /// Lime concrete.
    LIME_CONCRETE = 8;
    /// Cyan concrete.
    CYAN_CONCRETE = 9;
    /// Iron block.
    IRON_BLOCK = 10;
    /// Dark oak planks.
    DARK_OAK_PLANKS = 11;
    /// Oak planks.
    OAK_PLANKS = 12;
    /// Spruce planks.
    SPRUCE_PLANKS = 13;
    /// Cobblestone.
    COBBLESTONE = 14;
    /// Quartz block.
    QUARTZ_BLOCK = 15;
    /// Brick wall.
    BRICK_WALL = 16;
    /// Stone bricks.
    STONE_BRICKS = 17;
    /// Cracked stone bricks.
    CRACKED_STONE_BRICKS = 18;
    /// Mossy stone bricks.
    MOSSY_STONE_BRICKS = 19;
    /// Gray wool (cubicle partitions).
    GRAY_WOOL = 20;
    /// Dark oak log.
    DARK_OAK_LOG = 21;
    /// Gravel.
    GRAVEL = 22;
    /// Mycelium.
    MYCELIUM = 23;

    /// Glowstone.
    GLOWSTONE = 64;
    /// Sea lantern.
    SEA_LANTERN = 65;
    /// Redstone lamp.
    REDSTONE_LAMP = 66;
    /// Torch.
    TORCH = 67;
    /// Soul torch.
    SOUL_TORCH = 68;
    /// Redstone torch.
    REDSTONE_TORCH = 69;
    /// Lantern.
    LANTERN = 70;
    /// End rod.
    END_ROD = 71;

    /// Dark oak stairs (chairs).
    DARK_OAK_STAIRS = 96;
    /// Black stained glass (monitors, screens).
    BLACK_STAINED_GLASS = 97;
    /// Barrel.
    BARREL = 98;
    /// Chest.
    CHEST = 99;
    /// Blast furnace.
    BLAST_FURNACE = 100;
    /// Smoker.
    SMOKER = 101;
    /// Dispenser.
    DISPENSER = 102;
    /// Observer.
    OBSERVER = 103;
    /// Iron bars (pipes, vents).
    IRON_BARS = 104;
    /// Cobweb.
    COBWEB = 105;
    /// Flower pot.
    FLOWER_POT = 106;
    /// Skeleton skull.
    SKELETON_SKULL = 107;
    /// Brown mushroom.
    BROWN_MUSHROOM = 108;
    /// Redstone wire.
    REDSTONE_WIRE = 109;
    /// Water source.
    WATER = 110;
    /// Oak sign.
    OAK_SIGN = 111;
    /// Iron trapdoor.
    IRON_TRAPDOOR = 112;
    /// Stone button.
    STONE_BUTTON = 113;
    /// Lever.
    LEVER = 114;
    /// Bookshelf.
    BOOKSHELF = 115;
}

impl Block {
    /// Creates a new block with given ID.
    #[inline]
    #[must_use]
    pub const fn new(id: u16) -> Self {
        Self { id, meta: 0 }
    }

    /// Creates a block with ID and metadata.
    #[inline]
    #[must_use]
    pub const fn with_meta(id: u16, meta: u16) -> Self {
        Self { id, meta }
    }

    /// Returns true if this is an air block.
    #[inline]
    #[must_use]
    pub const fn is_air(self) -> bool {
        self.id == 0
    }

    /// Returns true for floor, wall and ceiling materials.
    #[inline]
    #[must_use]
    pub const fn is_structural(self) -> bool {
        self.id >= 1 && self.id < 64
    }

    /// Returns true for light-emitting blocks.
    #[inline]
    #[must_use]
    pub const fn is_light(self) -> bool {
        self.id >= 64 && self.id < 96
    }

    /// Returns true if the block occupies its whole cell.
    ///
    /// Thin or passable blocks (torches, cobwebs, wires, fluids, small
    /// decorations) are not solid.
    #[must_use]
    pub const fn is_solid(self) -> bool {
        if self.is_air() {
            return false;
        }
        let mut i = 0;
        while i < NON_SOLID.len() {
            if NON_SOLID[i] == self.id {
                return false;
            }
            i += 1;
        }
        true
    }
}

/// Ids of blocks that do not fill their cell.
const NON_SOLID: [u16; 16] = [
    Block::TORCH.id,
    Block::SOUL_TORCH.id,
    Block::REDSTONE_TORCH.id,
    Block::LANTERN.id,
    Block::END_ROD.id,
    Block::IRON_BARS.id,
    Block::COBWEB.id,
    Block::FLOWER_POT.id,
    Block::SKELETON_SKULL.id,
    Block::BROWN_MUSHROOM.id,
    Block::REDSTONE_WIRE.id,
    Block::WATER.id,
    Block::OAK_SIGN.id,
    Block::IRON_TRAPDOOR.id,
    Block::STONE_BUTTON.id,
    Block::LEVER.id,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        assert!(Block::AIR.is_air());
        assert!(!Block::AIR.is_solid());
        assert!(Block::YELLOW_CONCRETE.is_structural());
        assert!(Block::YELLOW_CONCRETE.is_solid());
        assert!(Block::GLOWSTONE.is_light());
        assert!(Block::GLOWSTONE.is_solid());
        assert!(!Block::GLOWSTONE.is_structural());
        assert!(!Block::TORCH.is_solid());
        assert!(!Block::COBWEB.is_solid());
        assert!(Block::BARREL.is_solid());
        assert!(!Block::BARREL.is_structural());
    }

    #[test]
    fn test_names() {
        assert_eq!(Block::AIR.name(), "AIR");
        assert_eq!(Block::SEA_LANTERN.name(), "SEA_LANTERN");
        assert_eq!(Block::new(9999).name(), "unknown");
    }

    #[test]
    fn test_pod_layout() {
        assert_eq!(std::mem::size_of::<Block>(), 4);
        let block = Block::with_meta(2, 1);
        let bytes = bytemuck::bytes_of(&block);
        assert_eq!(bytes.len(), 4);
    }
}
