// history.rs - Cycle detection over recent generations

use std::collections::VecDeque;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use tracing::debug;

use crate::grid::{CellState, Grid};

pub const DEFAULT_HISTORY: usize = 10;

/// Remembers hashes of the last few grids so a driver can stop once the
/// automaton starts repeating itself.
#[derive(Debug, Clone)]
pub struct CycleDetector {
    capacity: usize,
    hashes: VecDeque<u64>,
}

impl CycleDetector {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            hashes: VecDeque::with_capacity(capacity.max(1)),
        }
    }

    pub fn hash_grid<T: CellState>(grid: &Grid<T>) -> u64 {
        let mut hasher = DefaultHasher::new();
        grid.hash(&mut hasher);
        hasher.finish()
    }

    /// Records `grid`. Returns the period when the same grid was seen within
    /// the retained history (1 = unchanged since the previous observation).
    pub fn observe<T: CellState>(&mut self, grid: &Grid<T>) -> Option<usize> {
        let hash = Self::hash_grid(grid);
        let period = self
            .hashes
            .iter()
            .rev()
            .position(|&h| h == hash)
            .map(|i| i + 1);

        if self.hashes.len() == self.capacity {
            self.hashes.pop_front();
        }
        self.hashes.push_back(hash);

        if let Some(period) = period {
            debug!(period, "cycle detected");
        }
        period
    }

    pub fn clear(&mut self) {
        self.hashes.clear();
    }
}

impl Default for CycleDetector {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::engine::{Automaton, Engine};
    use crate::kernel::Boundary;
    use crate::rule::Rule;

    #[test]
    fn test_blinker_has_period_two() {
        let mut engine = Engine::with_size(Arc::new(Rule::life()), 5, 5, Boundary::Fixed).unwrap();
        engine.set_region(2, 1, &["111"]).unwrap();
        let mut detector = CycleDetector::default();
        assert_eq!(detector.observe(engine.current_array().grid()), None);
        engine.step().unwrap();
        assert_eq!(detector.observe(engine.current_array().grid()), None);
        engine.step().unwrap();
        assert_eq!(detector.observe(engine.current_array().grid()), Some(2));
    }

    #[test]
    fn test_still_life_has_period_one() {
        let mut grid = Grid::<u8>::zeros(4, 4).unwrap();
        grid.set_region(1, 1, &["11", "11"]).unwrap();
        let mut detector = CycleDetector::new(3);
        detector.observe(&grid);
        assert_eq!(detector.observe(&grid), Some(1));
    }

    #[test]
    fn test_history_forgets() {
        let mut detector = CycleDetector::new(2);
        let grids: Vec<Grid<u8>> = (0..3u8)
            .map(|v| Grid::new(2, 2, v).unwrap())
            .collect();
        for g in &grids {
            assert_eq!(detector.observe(g), None);
        }
        // the first grid has been evicted
        assert_eq!(detector.observe(&grids[0]), None);
        detector.clear();
        assert_eq!(detector.observe(&grids[2]), None);
    }
}
