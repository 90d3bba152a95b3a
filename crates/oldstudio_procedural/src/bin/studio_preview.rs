//! # Studio Preview
//!
//! Generates a square of chunks into memory and prints cache statistics,
//! a maze cell map and an ASCII floor plan at head height.

use std::path::Path;
use std::time::Instant;

use oldstudio_procedural::{
    BlockPos, CellType, ChunkCoord, MemoryWorld, StudioConfig, StudioGenerator, TerrainSink, WorldSeed, BASE_HEIGHT,
    CHUNK_SIZE,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    println!("╔══════════════════════════════════════════════════════════════════╗");
    println!("║         THE OLD STUDIO - PREVIEW                                 ║");
    println!("╚══════════════════════════════════════════════════════════════════╝");
    println!();

    let args: Vec<String> = std::env::args().collect();
    if args.contains(&"--help".to_string()) {
        println!("Usage: studio_preview [options]");
        println!();
        println!("Options:");
        println!("  --seed <n>       World seed (default 42)");
        println!("  --radius <n>     Chunks around the origin (default 2)");
        println!("  --config <path>  TOML config file");
        println!("  --no-plan        Skip the floor plan");
        return;
    }

    let arg = |name: &str| args.iter().position(|a| a == name).and_then(|i| args.get(i + 1));
    let seed: u64 = arg("--seed").and_then(|s| s.parse().ok()).unwrap_or(42);
    let radius: i32 = arg("--radius").and_then(|s| s.parse().ok()).unwrap_or(2).clamp(0, 8);
    let show_plan = !args.contains(&"--no-plan".to_string());

    let config = match arg("--config") {
        Some(path) => match StudioConfig::load(Path::new(path)) {
            Ok(config) => config,
            Err(e) => {
                println!("Error: {e}");
                return;
            }
        },
        None => StudioConfig::default(),
    };

    let generator = StudioGenerator::new(WorldSeed::new(seed), config);
    let mut world = MemoryWorld::new();

    println!("Generating {0}x{0} chunks for seed {seed}...", 2 * radius + 1);
    let start = Instant::now();
    let mut rooms = 0;
    let mut props = 0;
    let mut cues = 0;
    for cx in -radius..=radius {
        for cz in -radius..=radius {
            let chunk = ChunkCoord::new(cx, cz);
            let mut rng = ChaCha8Rng::seed_from_u64(seed ^ oldstudio_procedural::random::pack_key(cx, cz));
            let report = generator.generate_chunk(&mut world, chunk, &mut rng);
            rooms += report
                .spaces
                .iter()
                .filter(|s| !matches!(s.kind, oldstudio_procedural::SpaceKind::Corridor))
                .count();
            props += report.props;
            cues += report.cues.len();
        }
    }
    let elapsed = start.elapsed();

    let stats = generator.cache_stats();
    println!();
    println!("┌─ GENERATION ───────────────────────────────────────────────────┐");
    println!("│ Time:               {elapsed:?}");
    println!("│ Chunks cached:      {} / {}", stats.chunks.cached, stats.chunks.capacity);
    println!("│ Avg chunk time:     {:?}", stats.chunks.average_generation_time);
    println!("│ Maze cells cached:  {}", stats.maze_cells);
    println!("│ Room overlaps:      {rooms}");
    println!("│ Props:              {props}");
    println!("│ Navigation cues:    {cues}");
    println!("└────────────────────────────────────────────────────────────────┘");

    let min = -radius * CHUNK_SIZE;
    let max = (radius + 1) * CHUNK_SIZE - 1;

    println!();
    println!("Maze cells (R room, J junction, S special, . corridor, M mega):");
    let (cx0, cz0) = generator.maze().cell_of_block(min, min);
    let (cx1, cz1) = generator.maze().cell_of_block(max, max);
    for cz in cz0..=cz1 {
        let row: String = (cx0..=cx1)
            .map(|cx| {
                let cell = generator.maze().cell(cx, cz);
                if cell.occupied {
                    'M'
                } else {
                    match cell.cell_type {
                        CellType::Room => 'R',
                        CellType::Junction => 'J',
                        CellType::SpecialArea => 'S',
                        CellType::Corridor => '.',
                    }
                }
            })
            .collect();
        println!("  {row}");
    }

    if show_plan {
        println!();
        println!("Floor plan at y = {} (# wall, * light, o object, space open):", BASE_HEIGHT + 2);
        for z in min..=max {
            let row: String = (min..=max)
                .map(|x| {
                    let block = world.get_block(BlockPos::new(x, BASE_HEIGHT + 2, z));
                    if block.is_air() {
                        ' '
                    } else if block.is_structural() {
                        '#'
                    } else if block.is_light() {
                        '*'
                    } else {
                        'o'
                    }
                })
                .collect();
            println!("{row}");
        }
    }
}
