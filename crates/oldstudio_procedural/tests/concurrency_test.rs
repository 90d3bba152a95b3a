//! # Concurrency Integration Test
//!
//! Many threads share one generator. Results must match a single-threaded
//! run exactly.

use std::thread;

use oldstudio_procedural::random::pack_key;
use oldstudio_procedural::{ChunkCoord, MazeCell, MemoryWorld, StudioConfig, StudioGenerator, WorldSeed};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

const THREADS: i32 = 4;

fn generator() -> StudioGenerator {
    let mut config = StudioConfig::default();
    config.enable_lod = false;
    StudioGenerator::new(WorldSeed::new(8128), config)
}

fn chunk_rng(chunk: ChunkCoord) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(pack_key(chunk.x, chunk.z))
}

/// Test: concurrent cell requests see the same cells as a sequential run.
#[test]
fn test_concurrent_cells_match_sequential() {
    let sequential = generator();
    let expected: Vec<MazeCell> = (-10..10)
        .flat_map(|x| (-10..10).map(move |z| (x, z)))
        .map(|(x, z)| sequential.maze().cell(x, z))
        .collect();

    let shared = generator();
    thread::scope(|scope| {
        for t in 0..THREADS {
            let shared = &shared;
            let expected = &expected;
            scope.spawn(move || {
                // Each thread walks the window in a different order.
                let mut positions: Vec<(i32, i32)> = (-10..10).flat_map(|x| (-10..10).map(move |z| (x, z))).collect();
                positions.rotate_left((t * 97) as usize);
                for (x, z) in positions {
                    let index = ((x + 10) * 20 + (z + 10)) as usize;
                    assert_eq!(shared.maze().cell(x, z), expected[index]);
                }
            });
        }
    });
}

/// Test: chunks generated from several threads match a sequential run.
#[test]
fn test_concurrent_chunks_match_sequential() {
    let chunks: Vec<ChunkCoord> = (0..THREADS * 3).map(|i| ChunkCoord::new(i % 6 - 3, i / 6)).collect();

    let sequential = generator();
    let mut reference = MemoryWorld::new();
    for &chunk in &chunks {
        sequential.generate_chunk(&mut reference, chunk, &mut chunk_rng(chunk));
    }

    let shared = generator();
    let worlds: Vec<(Vec<ChunkCoord>, MemoryWorld)> = thread::scope(|scope| {
        let handles: Vec<_> = chunks
            .chunks(3)
            .map(|batch| {
                let shared = &shared;
                scope.spawn(move || {
                    let mut world = MemoryWorld::new();
                    for &chunk in batch {
                        assert!(shared.generate_chunk(&mut world, chunk, &mut chunk_rng(chunk)).generated);
                    }
                    (batch.to_vec(), world)
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().expect("worker panicked")).collect()
    });

    for (batch, world) in &worlds {
        for &chunk in batch {
            assert_eq!(world.fingerprint(chunk), reference.fingerprint(chunk), "chunk {chunk:?}");
        }
    }
    assert_eq!(shared.cache_stats().chunks.cached, chunks.len());
}

/// Test: two threads racing for one chunk generate it once.
#[test]
fn test_one_winner_per_chunk() {
    let shared = generator();
    let chunk = ChunkCoord::new(1, 1);
    let generated: usize = thread::scope(|scope| {
        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                let shared = &shared;
                scope.spawn(move || {
                    let mut world = MemoryWorld::new();
                    usize::from(shared.generate_chunk(&mut world, chunk, &mut chunk_rng(chunk)).generated)
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().expect("worker panicked")).sum()
    });
    assert_eq!(generated, 1);
}
