//! # The Old Studio Procedural Generation
//!
//! Deterministic generation of an endless maze of corridors and themed
//! rooms, one chunk at a time.
//!
//! ## Design Principles
//!
//! 1. **Deterministic**: Same seed always produces the same studio
//! 2. **Chunked**: Every chunk is generated independently, in any order
//! 3. **Bounded**: Every cache has a capacity
//! 4. **Host-agnostic**: Output goes through a [`TerrainSink`]
//!
//! ## Core Components
//!
//! - `NoiseManager`: ten seeded noise channels plus composites
//! - `MazeGenerator`: per-cell maze graph stitched into connected regions
//! - `RoomManager`: weighted, themed room templates and building utilities
//! - `PerformanceManager`: chunk cache, in-flight tracking and LOD gate
//! - `NavigationAids`: sparse sound and visual cues
//! - `StudioGenerator`: the per-seed orchestrator
//!
//! ## Example
//!
//! ```rust,ignore
//! use oldstudio_procedural::{ChunkCoord, MemoryWorld, StudioConfig, StudioGenerator, WorldSeed};
//! use rand::SeedableRng;
//!
//! let generator = StudioGenerator::new(WorldSeed::new(42), StudioConfig::default());
//! let mut world = MemoryWorld::new();
//! let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(7);
//!
//! let report = generator.generate_chunk(&mut world, ChunkCoord::new(0, 0), &mut rng);
//! assert!(report.generated);
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod block;
pub mod config;
pub mod error;
pub mod generator;
pub mod maze;
pub mod navigation;
pub mod noise;
pub mod noise_manager;
pub mod performance;
pub mod random;
pub mod rooms;
pub mod world;

pub use block::Block;
pub use config::StudioConfig;
pub use error::{StudioError, StudioResult};
pub use generator::{BuiltSpace, ChunkReport, GeneratorRegistry, SpaceKind, StudioGenerator, StudioStats};
pub use maze::{CellType, Direction, MazeCell, MazeGenerator, MazeSettings, RoomTheme, SpecialType};
pub use navigation::{CueKind, NavigationAids, PlacedCue, SoundCue, VisualCue};
pub use noise::{SimplexNoise, WorldSeed};
pub use noise_manager::{FeatureType, NoiseChannel, NoiseLayer, NoiseManager};
pub use performance::{CacheStats, ChunkMetadata, PerformanceManager};
pub use random::CellRandom;
pub use rooms::{BlockPalette, RoomManager, RoomTemplate};
pub use world::{BlockPos, Chunk, ChunkCoord, ClippedSink, MemoryWorld, TerrainSink, BASE_HEIGHT, CHUNK_SIZE};
