//! # Grid Connectivity
//!
//! Turns a rectangle of independently generated cells into one connected
//! maze:
//!
//! 1. **Spanning tree**: Prim's algorithm over randomly weighted edges,
//!    grown from the minimum corner.
//! 2. **Secondary loops**: cells with fewer than three openings may gain
//!    one more link to an in-bounds neighbor.
//! 3. **Forced connectivity**: any component still separated from the
//!    largest one is joined to it through an adjacent cell pair.
//!
//! Links are always written on both cells. Neighbors outside the bounds
//! do not exist.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, VecDeque};

use crate::maze::cell::{Direction, MazeCell};
use crate::random::CellRandom;

/// Inclusive rectangle of grid positions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GridBounds {
    /// Smallest x.
    pub min_x: i32,
    /// Smallest z.
    pub min_z: i32,
    /// Largest x (inclusive).
    pub max_x: i32,
    /// Largest z (inclusive).
    pub max_z: i32,
}

impl GridBounds {
    /// Creates bounds from two inclusive corners, in any order.
    #[must_use]
    pub fn new(x1: i32, z1: i32, x2: i32, z2: i32) -> Self {
        Self {
            min_x: x1.min(x2),
            min_z: z1.min(z2),
            max_x: x1.max(x2),
            max_z: z1.max(z2),
        }
    }

    /// Number of columns.
    #[inline]
    #[must_use]
    pub const fn width(self) -> usize {
        (self.max_x - self.min_x + 1) as usize
    }

    /// Number of rows.
    #[inline]
    #[must_use]
    pub const fn depth(self) -> usize {
        (self.max_z - self.min_z + 1) as usize
    }

    /// Total cell count.
    #[inline]
    #[must_use]
    pub const fn len(self) -> usize {
        self.width() * self.depth()
    }

    /// Always false: bounds hold at least one cell.
    #[inline]
    #[must_use]
    pub const fn is_empty(self) -> bool {
        false
    }

    /// True if the position lies inside.
    #[inline]
    #[must_use]
    pub const fn contains(self, x: i32, z: i32) -> bool {
        x >= self.min_x && x <= self.max_x && z >= self.min_z && z <= self.max_z
    }

    /// All positions, row by row.
    pub fn positions(self) -> impl Iterator<Item = (i32, i32)> {
        (self.min_z..=self.max_z).flat_map(move |z| (self.min_x..=self.max_x).map(move |x| (x, z)))
    }
}

/// A rectangle of cells addressed by grid position.
#[derive(Clone, Debug)]
pub struct MazeGrid {
    bounds: GridBounds,
    cells: Vec<MazeCell>,
}

impl MazeGrid {
    /// Builds a grid by calling `make` for every position, row by row.
    pub fn from_fn(bounds: GridBounds, mut make: impl FnMut(i32, i32) -> MazeCell) -> Self {
        let cells = bounds.positions().map(|(x, z)| make(x, z)).collect();
        Self { bounds, cells }
    }

    /// A grid of unconnected corridor cells.
    #[must_use]
    pub fn empty(bounds: GridBounds) -> Self {
        Self::from_fn(bounds, MazeCell::new)
    }

    /// The covered rectangle.
    #[inline]
    #[must_use]
    pub const fn bounds(&self) -> GridBounds {
        self.bounds
    }

    #[inline]
    fn index(&self, x: i32, z: i32) -> Option<usize> {
        self.bounds.contains(x, z).then(|| {
            (z - self.bounds.min_z) as usize * self.bounds.width() + (x - self.bounds.min_x) as usize
        })
    }

    /// The cell at a position, if inside.
    #[must_use]
    pub fn get(&self, x: i32, z: i32) -> Option<&MazeCell> {
        self.index(x, z).map(|i| &self.cells[i])
    }

    /// Mutable cell at a position, if inside.
    pub fn get_mut(&mut self, x: i32, z: i32) -> Option<&mut MazeCell> {
        self.index(x, z).map(|i| &mut self.cells[i])
    }

    /// All cells, row by row.
    #[must_use]
    pub fn cells(&self) -> &[MazeCell] {
        &self.cells
    }

    /// Mutable access to all cells.
    pub fn cells_mut(&mut self) -> &mut [MazeCell] {
        &mut self.cells
    }

    /// Consumes the grid, returning its cells.
    #[must_use]
    pub fn into_cells(self) -> Vec<MazeCell> {
        self.cells
    }

    /// Opens the side between a cell and its neighbor on both cells.
    ///
    /// # Returns
    ///
    /// `false` if either cell is outside the bounds.
    pub fn link(&mut self, x: i32, z: i32, direction: Direction) -> bool {
        let (dx, dz) = direction.delta();
        let (nx, nz) = (x + dx, z + dz);
        if !self.bounds.contains(x, z) || !self.bounds.contains(nx, nz) {
            return false;
        }
        if let Some(cell) = self.get_mut(x, z) {
            cell.add_connection(direction);
        }
        if let Some(cell) = self.get_mut(nx, nz) {
            cell.add_connection(direction.opposite());
        }
        true
    }

    /// True if the two adjacent cells are joined from either side.
    #[must_use]
    pub fn linked(&self, x: i32, z: i32, direction: Direction) -> bool {
        let (dx, dz) = direction.delta();
        let here = self.get(x, z).is_some_and(|c| c.has_connection(direction));
        let there = self
            .get(x + dx, z + dz)
            .is_some_and(|c| c.has_connection(direction.opposite()));
        (here || there) && self.bounds.contains(x + dx, z + dz) && self.bounds.contains(x, z)
    }

    /// Adds the reverse side of every in-bounds opening and removes
    /// openings that lead outside the bounds.
    pub fn mirror_connections(&mut self) {
        let bounds = self.bounds;
        let positions: Vec<_> = bounds.positions().collect();
        for (x, z) in positions {
            let Some(cell) = self.get(x, z) else { continue };
            let open: Vec<_> = cell.connections().iter().collect();
            for direction in open {
                let (dx, dz) = direction.delta();
                if bounds.contains(x + dx, z + dz) {
                    self.link(x, z, direction);
                } else if let Some(cell) = self.get_mut(x, z) {
                    cell.remove_connection(direction);
                }
            }
        }
    }
}

/// Candidate spanning-tree edge, ordered so the heap pops the lightest.
#[derive(Clone, Copy, Debug)]
struct WeightedEdge {
    weight: f32,
    from: (i32, i32),
    direction: Direction,
}

impl PartialEq for WeightedEdge {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for WeightedEdge {}

impl PartialOrd for WeightedEdge {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for WeightedEdge {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed: BinaryHeap is a max-heap
        other
            .weight
            .total_cmp(&self.weight)
            .then_with(|| other.from.cmp(&self.from))
            .then_with(|| other.direction.cmp(&self.direction))
    }
}

/// Grows a random spanning tree over the whole grid.
///
/// # Returns
///
/// Number of links added.
pub fn build_spanning_tree(grid: &mut MazeGrid, rng: &mut CellRandom) -> usize {
    let bounds = grid.bounds();
    let mut visited = vec![false; bounds.len()];
    let slot = |x: i32, z: i32| (z - bounds.min_z) as usize * bounds.width() + (x - bounds.min_x) as usize;

    let mut heap = BinaryHeap::new();
    let push_edges = |heap: &mut BinaryHeap<WeightedEdge>, rng: &mut CellRandom, x: i32, z: i32| {
        for direction in Direction::ALL {
            let (dx, dz) = direction.delta();
            if bounds.contains(x + dx, z + dz) {
                heap.push(WeightedEdge {
                    weight: rng.next_f32(),
                    from: (x, z),
                    direction,
                });
            }
        }
    };

    let start = (bounds.min_x, bounds.min_z);
    visited[slot(start.0, start.1)] = true;
    push_edges(&mut heap, rng, start.0, start.1);

    let mut links = 0;
    while let Some(edge) = heap.pop() {
        let (dx, dz) = edge.direction.delta();
        let (nx, nz) = (edge.from.0 + dx, edge.from.1 + dz);
        if visited[slot(nx, nz)] {
            continue;
        }
        visited[slot(nx, nz)] = true;
        grid.link(edge.from.0, edge.from.1, edge.direction);
        links += 1;
        push_edges(&mut heap, rng, nx, nz);
    }
    links
}

/// Openings a cell may reach through secondary loops.
const MAX_LOOP_OPENINGS: usize = 3;

/// Adds extra links to break up tree-shaped layouts.
///
/// Each cell with fewer than three openings that is not a dead end gets,
/// with probability `chance`, one link to a random unlinked in-bounds
/// neighbor that also has fewer than three openings. Neither end of a
/// new link exceeds three openings.
///
/// # Returns
///
/// Number of links added.
pub fn add_secondary_loops(grid: &mut MazeGrid, rng: &mut CellRandom, chance: f32) -> usize {
    let bounds = grid.bounds();
    let mut links = 0;
    for (x, z) in bounds.positions() {
        let Some(cell) = grid.get(x, z) else { continue };
        if cell.connection_count() >= MAX_LOOP_OPENINGS || cell.is_dead_end() || !rng.chance(chance) {
            continue;
        }
        let options: Vec<_> = cell
            .available_directions()
            .into_iter()
            .filter(|d| {
                let (dx, dz) = d.delta();
                grid.get(x + dx, z + dz)
                    .is_some_and(|n| n.connection_count() < MAX_LOOP_OPENINGS)
            })
            .collect();
        if options.is_empty() {
            continue;
        }
        let direction = options[rng.next_below(options.len() as u32) as usize];
        grid.link(x, z, direction);
        links += 1;
    }
    links
}

/// Labels connected components by flood fill.
///
/// # Returns
///
/// Components in order of their first cell (row by row); each lists
/// its positions in visit order.
#[must_use]
pub fn find_components(grid: &MazeGrid) -> Vec<Vec<(i32, i32)>> {
    let bounds = grid.bounds();
    let slot = |x: i32, z: i32| (z - bounds.min_z) as usize * bounds.width() + (x - bounds.min_x) as usize;
    let mut seen = vec![false; bounds.len()];
    let mut components = Vec::new();

    for (sx, sz) in bounds.positions() {
        if seen[slot(sx, sz)] {
            continue;
        }
        seen[slot(sx, sz)] = true;
        let mut component = Vec::new();
        let mut queue = VecDeque::from([(sx, sz)]);
        while let Some((x, z)) = queue.pop_front() {
            component.push((x, z));
            for direction in Direction::ALL {
                let (dx, dz) = direction.delta();
                let (nx, nz) = (x + dx, z + dz);
                if grid.linked(x, z, direction) && !seen[slot(nx, nz)] {
                    seen[slot(nx, nz)] = true;
                    queue.push_back((nx, nz));
                }
            }
        }
        components.push(component);
    }
    components
}

/// True if every cell is reachable from every other.
#[must_use]
pub fn is_fully_connected(grid: &MazeGrid) -> bool {
    find_components(grid).len() == 1
}

/// Joins every component to the largest one until a single component
/// remains.
///
/// # Returns
///
/// Number of links added.
pub fn ensure_connectivity(grid: &mut MazeGrid) -> usize {
    let bounds = grid.bounds();
    let mut links = 0;
    loop {
        let components = find_components(grid);
        if components.len() <= 1 {
            return links;
        }
        let main_index = components
            .iter()
            .enumerate()
            .max_by(|(ia, a), (ib, b)| a.len().cmp(&b.len()).then_with(|| ib.cmp(ia)))
            .map_or(0, |(i, _)| i);

        let mut in_main = vec![false; bounds.len()];
        for &(x, z) in &components[main_index] {
            in_main[(z - bounds.min_z) as usize * bounds.width() + (x - bounds.min_x) as usize] = true;
        }
        let is_main = |x: i32, z: i32| {
            in_main[(z - bounds.min_z) as usize * bounds.width() + (x - bounds.min_x) as usize]
        };

        // First adjacent pair across the boundary of the main component
        let bridge = bounds.positions().filter(|&(x, z)| is_main(x, z)).find_map(|(x, z)| {
            Direction::ALL.into_iter().find_map(|direction| {
                let (dx, dz) = direction.delta();
                let (nx, nz) = (x + dx, z + dz);
                (bounds.contains(nx, nz) && !is_main(nx, nz)).then_some((x, z, direction))
            })
        });

        match bridge {
            Some((x, z, direction)) => {
                grid.link(x, z, direction);
                links += 1;
            }
            None => return links,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds_5x5() -> GridBounds {
        GridBounds::new(0, 0, 4, 4)
    }

    #[test]
    fn test_bounds_inclusive() {
        let b = GridBounds::new(2, 3, -1, 0);
        assert_eq!((b.min_x, b.min_z, b.max_x, b.max_z), (-1, 0, 2, 3));
        assert_eq!(b.len(), 16);
        assert!(b.contains(2, 3));
        assert!(!b.contains(3, 3));
        assert_eq!(b.positions().count(), 16);
        assert_eq!(b.positions().next(), Some((-1, 0)));
    }

    #[test]
    fn test_link_is_symmetric_and_bounded() {
        let mut grid = MazeGrid::empty(bounds_5x5());
        assert!(grid.link(1, 1, Direction::East));
        assert!(grid.get(1, 1).is_some_and(|c| c.has_connection(Direction::East)));
        assert!(grid.get(2, 1).is_some_and(|c| c.has_connection(Direction::West)));
        assert!(!grid.link(4, 4, Direction::East));
        assert!(grid.get(4, 4).is_some_and(MazeCell::is_isolated));
        assert!(grid.get(5, 4).is_none());
    }

    #[test]
    fn test_spanning_tree_connects_everything() {
        let mut grid = MazeGrid::empty(bounds_5x5());
        let mut rng = CellRandom::new(42);
        let links = build_spanning_tree(&mut grid, &mut rng);
        assert_eq!(links, 24);
        assert!(is_fully_connected(&grid));
    }

    #[test]
    fn test_region_without_loops_is_connected() {
        let mut grid = MazeGrid::empty(bounds_5x5());
        let mut rng = CellRandom::new(7);
        build_spanning_tree(&mut grid, &mut rng);
        assert_eq!(add_secondary_loops(&mut grid, &mut rng, 0.0), 0);
        assert_eq!(ensure_connectivity(&mut grid), 0);
        assert!(is_fully_connected(&grid));
    }

    #[test]
    fn test_loops_respect_limits() {
        let mut grid = MazeGrid::empty(bounds_5x5());
        let mut rng = CellRandom::new(3);
        build_spanning_tree(&mut grid, &mut rng);
        let before: Vec<_> = grid.cells().iter().map(MazeCell::connection_count).collect();
        add_secondary_loops(&mut grid, &mut rng, 1.0);
        for (cell, old) in grid.cells().iter().zip(before) {
            assert!(cell.connection_count() >= old);
            for direction in cell.connections().iter() {
                let (nx, nz) = cell.neighbor(direction);
                assert!(grid.bounds().contains(nx, nz));
            }
        }
    }

    #[test]
    fn test_loops_never_push_cells_past_three_openings() {
        for seed in 0..200 {
            let mut grid = MazeGrid::empty(GridBounds::new(0, 0, 9, 9));
            let mut rng = CellRandom::new(seed);
            build_spanning_tree(&mut grid, &mut rng);
            let before: Vec<_> = grid.cells().iter().map(MazeCell::connection_count).collect();
            add_secondary_loops(&mut grid, &mut rng, 1.0);
            for (cell, old) in grid.cells().iter().zip(before) {
                if cell.connection_count() > old {
                    assert!(cell.connection_count() <= 3, "seed {seed}: cell ({}, {})", cell.x(), cell.z());
                }
            }
        }
    }

    #[test]
    fn test_forced_connectivity_on_edgeless_grid() {
        let mut grid = MazeGrid::empty(bounds_5x5());
        assert_eq!(find_components(&grid).len(), 25);
        let links = ensure_connectivity(&mut grid);
        assert_eq!(links, 24);
        assert!(is_fully_connected(&grid));
    }

    #[test]
    fn test_forced_connectivity_joins_islands() {
        let mut grid = MazeGrid::empty(GridBounds::new(0, 0, 3, 0));
        grid.link(0, 0, Direction::East);
        grid.link(2, 0, Direction::East);
        assert_eq!(find_components(&grid).len(), 2);
        assert_eq!(ensure_connectivity(&mut grid), 1);
        assert!(grid.get(1, 0).is_some_and(|c| c.has_connection(Direction::East)));
    }

    #[test]
    fn test_mirror_drops_outside_openings() {
        let mut grid = MazeGrid::from_fn(GridBounds::new(0, 0, 1, 1), |x, z| {
            let mut cell = MazeCell::new(x, z);
            if (x, z) == (0, 0) {
                cell.add_connection(Direction::North);
                cell.add_connection(Direction::East);
            }
            cell
        });
        grid.mirror_connections();
        let origin = grid.get(0, 0).cloned().unwrap_or_else(|| MazeCell::new(0, 0));
        assert!(!origin.has_connection(Direction::North));
        assert!(origin.has_connection(Direction::East));
        assert!(grid.get(1, 0).is_some_and(|c| c.has_connection(Direction::West)));
    }

    #[test]
    fn test_spanning_tree_is_deterministic() {
        let build = || {
            let mut grid = MazeGrid::empty(bounds_5x5());
            build_spanning_tree(&mut grid, &mut CellRandom::new(99));
            grid.into_cells()
        };
        assert_eq!(build(), build());
    }
}
