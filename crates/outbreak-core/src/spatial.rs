use std::collections::HashMap;

/// Uniform-grid index over the susceptible subset of the population.
///
/// The plane is partitioned into square cells whose side equals the
/// interaction distance, so any two agents within interaction range are at
/// most one cell apart on each axis and a 3x3 block query around an agent's
/// own cell is guaranteed to cover all true neighbors. Candidates farther
/// than the interaction distance can still appear in the block; callers
/// filter by exact Euclidean distance.
///
/// Only susceptible agents are members. Empty cells are removed from the map
/// rather than stored as empty buckets.
pub struct GridIndex {
    cell_size: f64,
    cells: HashMap<(i64, i64), Vec<usize>>,
}

impl GridIndex {
    pub fn new(cell_size: f64) -> Self {
        debug_assert!(cell_size > 0.0, "cell size must be positive");
        Self {
            cell_size,
            cells: HashMap::new(),
        }
    }

    /// Cell coordinate of a position: `floor(position / cell_size)` per axis.
    pub fn cell_of(&self, position: [f64; 2]) -> (i64, i64) {
        (
            (position[0] / self.cell_size).floor() as i64,
            (position[1] / self.cell_size).floor() as i64,
        )
    }

    pub fn insert(&mut self, idx: usize, position: [f64; 2]) {
        let cell = self.cell_of(position);
        self.cells.entry(cell).or_default().push(idx);
    }

    /// Remove an agent from the cell computed from `position`.
    ///
    /// Panics if the agent is not indexed there: that means the index and the
    /// population disagree, which is a logic defect, not a runtime condition.
    pub fn remove(&mut self, idx: usize, position: [f64; 2]) {
        let cell = self.cell_of(position);
        let Some(bucket) = self.cells.get_mut(&cell) else {
            panic!("agent {idx} is not indexed at cell {cell:?}");
        };
        let slot = bucket
            .iter()
            .position(|&member| member == idx)
            .unwrap_or_else(|| panic!("agent {idx} is not indexed at cell {cell:?}"));
        bucket.swap_remove(slot);
        if bucket.is_empty() {
            self.cells.remove(&cell);
        }
    }

    /// Move an agent between cells after a position change. No-op when both
    /// positions fall in the same cell. This is the only membership change
    /// caused by movement.
    pub fn relocate(&mut self, idx: usize, old_position: [f64; 2], new_position: [f64; 2]) {
        if self.cell_of(old_position) == self.cell_of(new_position) {
            return;
        }
        self.remove(idx, old_position);
        self.insert(idx, new_position);
    }

    /// Lazy sequence of all indexed agents in the 3x3 block of cells centered
    /// on `cell`. Missing cells contribute nothing; order is unspecified.
    pub fn neighbors_of_cell(&self, cell: (i64, i64)) -> impl Iterator<Item = usize> + '_ {
        (-1..=1).flat_map(move |dx| {
            (-1..=1).flat_map(move |dy| {
                self.cells
                    .get(&(cell.0 + dx, cell.1 + dy))
                    .into_iter()
                    .flatten()
                    .copied()
            })
        })
    }

    /// Total number of indexed agents.
    pub fn len(&self) -> usize {
        self.cells.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Number of non-empty cells.
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Whether `idx` is indexed exactly at the cell computed from `position`.
    pub fn contains(&self, idx: usize, position: [f64; 2]) -> bool {
        self.cells
            .get(&self.cell_of(position))
            .is_some_and(|bucket| bucket.contains(&idx))
    }
}
