//! # Performance Manager
//!
//! Tracks which chunks have been generated, which are being generated and
//! which are close enough to an observer to be worth generating.
//!
//! ## Chunk Lifecycle
//!
//! ```text
//! unseen --start--> generating --complete--> cached --evict/sweep--> unseen
//! ```
//!
//! - The cache is bounded: completing past capacity evicts the oldest
//!   completions first (FIFO).
//! - At most once per sweep interval, entries older than the maximum age
//!   and expired in-flight markers are dropped.
//! - In-flight markers expire individually after a timeout, so a stalled
//!   request never blocks a chunk forever.
//!
//! Every transition is a single critical section under one lock. Each
//! operation has an `_at` variant taking the current instant, for tests.

use std::collections::{HashMap, VecDeque};
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use crate::config::StudioConfig;
use crate::random::{pack_key, CellRandom};
use crate::world::ChunkCoord;

/// Minimum time between sweeps.
pub const SWEEP_INTERVAL: Duration = Duration::from_secs(30);

/// Age after which a cached entry is dropped by a sweep.
pub const MAX_ENTRY_AGE: Duration = Duration::from_secs(300);

/// Record kept for a generated chunk.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChunkMetadata {
    /// When generation completed.
    pub completed_at: Instant,
    /// Time spent generating.
    pub duration: Duration,
    /// Complexity score in `1..=10`.
    pub complexity: u8,
}

/// Snapshot of cache counters.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CacheStats {
    /// Chunks currently cached.
    pub cached: usize,
    /// Cache capacity.
    pub capacity: usize,
    /// Chunks currently generating.
    pub in_flight: usize,
    /// Completions since creation or the last clear.
    pub generated: u64,
    /// Entries removed by capacity eviction or sweeps.
    pub evicted: u64,
    /// Mean generation time.
    pub average_generation_time: Duration,
}

/// Mutable state, guarded as a whole.
struct CacheState {
    entries: HashMap<ChunkCoord, ChunkMetadata>,
    order: VecDeque<ChunkCoord>,
    in_flight: HashMap<ChunkCoord, Instant>,
    observers: Vec<ChunkCoord>,
    last_sweep: Instant,
    generated: u64,
    evicted: u64,
    total_time: Duration,
}

impl CacheState {
    fn new(now: Instant) -> Self {
        Self {
            entries: HashMap::new(),
            order: VecDeque::new(),
            in_flight: HashMap::new(),
            observers: Vec::new(),
            last_sweep: now,
            generated: 0,
            evicted: 0,
            total_time: Duration::ZERO,
        }
    }
}

/// Chunk cache, in-flight tracking and LOD gate.
pub struct PerformanceManager {
    capacity: usize,
    enable_lod: bool,
    lod_distance: u32,
    in_flight_timeout: Duration,
    state: Mutex<CacheState>,
}

impl PerformanceManager {
    /// Creates a manager from a validated config.
    #[must_use]
    pub fn new(config: &StudioConfig) -> Self {
        Self {
            capacity: config.chunk_cache_size,
            enable_lod: config.enable_lod,
            lod_distance: config.lod_distance,
            in_flight_timeout: config.in_flight_timeout(),
            state: Mutex::new(CacheState::new(Instant::now())),
        }
    }

    /// Creates a manager with an exact capacity and LOD disabled.
    ///
    /// Bypasses config clamping; used for small caches in tests and tools.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let mut config = StudioConfig::default();
        config.enable_lod = false;
        let mut manager = Self::new(&config);
        manager.capacity = capacity;
        manager
    }

    /// Cache capacity.
    #[inline]
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Replaces the observer positions used by the LOD gate.
    pub fn set_observers(&self, observers: Vec<ChunkCoord>) {
        self.state.lock().observers = observers;
    }

    /// True if the chunk is within the LOD distance of some observer.
    ///
    /// Always true with LOD disabled or no observers registered.
    #[must_use]
    pub fn within_lod(&self, coord: ChunkCoord) -> bool {
        let state = self.state.lock();
        self.lod_allows(&state, coord)
    }

    fn lod_allows(&self, state: &CacheState, coord: ChunkCoord) -> bool {
        !self.enable_lod
            || state.observers.is_empty()
            || state
                .observers
                .iter()
                .any(|o| o.chebyshev_distance(coord) <= self.lod_distance)
    }

    fn generating(&self, state: &CacheState, coord: ChunkCoord, now: Instant) -> bool {
        state
            .in_flight
            .get(&coord)
            .is_some_and(|&started| now.saturating_duration_since(started) < self.in_flight_timeout)
    }

    /// True if the chunk is neither cached nor generating and passes the
    /// LOD gate.
    #[must_use]
    pub fn should_generate_chunk(&self, coord: ChunkCoord) -> bool {
        self.should_generate_chunk_at(coord, Instant::now())
    }

    /// [`should_generate_chunk`](Self::should_generate_chunk) at a given instant.
    #[must_use]
    pub fn should_generate_chunk_at(&self, coord: ChunkCoord, now: Instant) -> bool {
        let state = self.state.lock();
        !state.entries.contains_key(&coord) && !self.generating(&state, coord, now) && self.lod_allows(&state, coord)
    }

    /// Atomically checks admission and marks the chunk in flight.
    ///
    /// # Returns
    ///
    /// `true` if the caller now owns generation of the chunk.
    pub fn try_begin(&self, coord: ChunkCoord) -> bool {
        self.try_begin_at(coord, Instant::now())
    }

    /// [`try_begin`](Self::try_begin) at a given instant.
    pub fn try_begin_at(&self, coord: ChunkCoord, now: Instant) -> bool {
        let mut state = self.state.lock();
        if state.entries.contains_key(&coord)
            || self.generating(&state, coord, now)
            || !self.lod_allows(&state, coord)
        {
            return false;
        }
        if state.in_flight.insert(coord, now).is_some() {
            tracing::debug!("in-flight marker for chunk ({}, {}) expired, restarting", coord.x, coord.z);
        }
        true
    }

    /// Marks a chunk as generating.
    pub fn mark_chunk_generation_start(&self, coord: ChunkCoord) {
        self.mark_chunk_generation_start_at(coord, Instant::now());
    }

    /// [`mark_chunk_generation_start`](Self::mark_chunk_generation_start) at a given instant.
    pub fn mark_chunk_generation_start_at(&self, coord: ChunkCoord, now: Instant) {
        self.state.lock().in_flight.insert(coord, now);
    }

    /// Records a finished chunk, evicting and sweeping as needed.
    pub fn mark_chunk_generation_complete(&self, coord: ChunkCoord, duration: Duration) {
        self.mark_chunk_generation_complete_at(coord, duration, Instant::now());
    }

    /// [`mark_chunk_generation_complete`](Self::mark_chunk_generation_complete) at a given instant.
    pub fn mark_chunk_generation_complete_at(&self, coord: ChunkCoord, duration: Duration, now: Instant) {
        let mut state = self.state.lock();
        state.in_flight.remove(&coord);

        let metadata = ChunkMetadata {
            completed_at: now,
            duration,
            complexity: chunk_complexity(coord),
        };
        if state.entries.insert(coord, metadata).is_some() {
            state.order.retain(|c| *c != coord);
        }
        state.order.push_back(coord);
        state.generated += 1;
        state.total_time += duration;

        while state.entries.len() > self.capacity {
            let Some(oldest) = state.order.pop_front() else { break };
            state.entries.remove(&oldest);
            state.evicted += 1;
            tracing::trace!("evicted chunk ({}, {})", oldest.x, oldest.z);
        }

        if now.saturating_duration_since(state.last_sweep) > SWEEP_INTERVAL {
            self.sweep(&mut state, now);
        }
    }

    /// Drops old entries and expired in-flight markers.
    fn sweep(&self, state: &mut CacheState, now: Instant) {
        state.last_sweep = now;
        let before = state.entries.len();
        state
            .entries
            .retain(|_, meta| now.saturating_duration_since(meta.completed_at) <= MAX_ENTRY_AGE);
        let entries = &state.entries;
        state.order.retain(|c| entries.contains_key(c));
        let dropped = before - state.entries.len();
        state.evicted += dropped as u64;

        let timeout = self.in_flight_timeout;
        state
            .in_flight
            .retain(|_, started| now.saturating_duration_since(*started) < timeout);

        if dropped > 0 {
            tracing::debug!("sweep dropped {dropped} stale chunk entries");
        }
    }

    /// True if the chunk has a cache entry.
    #[must_use]
    pub fn is_cached(&self, coord: ChunkCoord) -> bool {
        self.state.lock().entries.contains_key(&coord)
    }

    /// Cache entry for a chunk.
    #[must_use]
    pub fn metadata(&self, coord: ChunkCoord) -> Option<ChunkMetadata> {
        self.state.lock().entries.get(&coord).copied()
    }

    /// Current counters.
    #[must_use]
    pub fn cache_stats(&self) -> CacheStats {
        let state = self.state.lock();
        let average_generation_time = if state.generated == 0 {
            Duration::ZERO
        } else {
            state.total_time / u32::try_from(state.generated).unwrap_or(u32::MAX)
        };
        CacheStats {
            cached: state.entries.len(),
            capacity: self.capacity,
            in_flight: state.in_flight.len(),
            generated: state.generated,
            evicted: state.evicted,
            average_generation_time,
        }
    }

    /// Resets every entry, marker and counter in one step.
    pub fn clear_cache(&self) {
        let mut state = self.state.lock();
        let observers = std::mem::take(&mut state.observers);
        *state = CacheState::new(Instant::now());
        state.observers = observers;
    }
}

/// Generation complexity score of a chunk in `1..=10`.
///
/// Grows with distance from the origin, plus a small position-hashed jitter.
#[must_use]
pub fn chunk_complexity(coord: ChunkCoord) -> u8 {
    let distance = coord.x.unsigned_abs().saturating_add(coord.z.unsigned_abs());
    let base = (distance / 10).min(10);
    let jitter = CellRandom::new(pack_key(coord.x, coord.z)).next_below(3);
    (base + jitter).clamp(1, 10) as u8
}
