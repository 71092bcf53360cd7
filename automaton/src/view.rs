// view.rs - Read-only rendering view and step statistics recorder

use std::collections::VecDeque;
use std::sync::Arc;

use crate::engine::StepStats;
use crate::grid::{CellState, Snapshot};

/// Cell levels of one generation, detached from the automaton that made it.
///
/// This is the only thing a viewer draws; it cannot reach back into the
/// automaton.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    rows: usize,
    cols: usize,
    generation: u64,
    levels: Arc<[u32]>,
    max_level: u32,
}

impl Frame {
    pub fn from_snapshot<T: CellState>(snapshot: &Snapshot<T>) -> Self {
        let levels: Arc<[u32]> = snapshot.cells().iter().map(|c| c.level()).collect();
        let max_level = levels.iter().copied().max().unwrap_or(0);
        Self {
            rows: snapshot.rows(),
            cols: snapshot.cols(),
            generation: snapshot.generation(),
            levels,
            max_level,
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn max_level(&self) -> u32 {
        self.max_level
    }

    pub fn level(&self, row: usize, col: usize) -> u32 {
        if row < self.rows && col < self.cols {
            self.levels[row * self.cols + col]
        } else {
            0
        }
    }

    /// Cells with a non-zero level.
    pub fn live_cells(&self) -> usize {
        self.levels.iter().filter(|&&l| l > 0).count()
    }

    /// Level scaled into `0.0..=1.0` against `max(max_level, floor)`.
    pub fn intensity(&self, row: usize, col: usize, floor: u32) -> f32 {
        let top = self.max_level.max(floor).max(1);
        self.level(row, col) as f32 / top as f32
    }
}

/// Bounded time series of step statistics.
#[derive(Debug, Clone)]
pub struct Recorder {
    capacity: usize,
    stats: VecDeque<StepStats>,
    total_changed: u64,
}

impl Recorder {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            stats: VecDeque::with_capacity(capacity.max(1)),
            total_changed: 0,
        }
    }

    pub fn record(&mut self, stats: StepStats) {
        if self.stats.len() == self.capacity {
            self.stats.pop_front();
        }
        self.total_changed += stats.changed;
        self.stats.push_back(stats);
    }

    pub fn last(&self) -> Option<StepStats> {
        self.stats.back().copied()
    }

    /// Sum of `changed` over every recorded step, including evicted ones.
    pub fn total_changed(&self) -> u64 {
        self.total_changed
    }

    /// `changed` values of the retained steps, oldest first.
    pub fn series(&self) -> Vec<u64> {
        self.stats.iter().map(|s| s.changed).collect()
    }

    pub fn len(&self) -> usize {
        self.stats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stats.is_empty()
    }

    pub fn clear(&mut self) {
        self.stats.clear();
        self.total_changed = 0;
    }
}

impl Default for Recorder {
    fn default() -> Self {
        Self::new(256)
    }
}
