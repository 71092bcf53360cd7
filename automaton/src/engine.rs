// engine.rs - Stepper: reduce -> lookup -> commit over a shared rule

use std::sync::Arc;

use tracing::{debug, trace};

use crate::error::{CaError, Result};
use crate::grid::{CellState, Grid, Snapshot};
use crate::kernel::Boundary;
use crate::rule::Rule;
use crate::view::Frame;

/// Statistics returned by a single step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StepStats {
    /// Generation reached by the step.
    pub generation: u64,
    /// Cells that changed state (toppled, for sandpiles).
    pub changed: u64,
}

/// Interface every automaton exposes to drivers and viewers.
pub trait Automaton {
    type Cell: CellState;

    /// Advances one generation. On error the state is left untouched.
    fn step(&mut self) -> Result<StepStats>;

    /// Immutable view of the current state.
    fn current_array(&self) -> Snapshot<Self::Cell>;

    fn generation(&self) -> u64;

    /// Runs `steps` generations, stopping at the first error.
    fn loop_steps(&mut self, steps: usize) -> Result<Vec<StepStats>> {
        (0..steps).map(|_| self.step()).collect()
    }

    /// Render-ready view of the current state.
    fn frame(&self) -> Frame {
        Frame::from_snapshot(&self.current_array())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Stepping,
}

/// Generic 2-D automaton driven by a kernel and a transition table.
///
/// The live grid sits behind an `Arc`; each step builds a new grid and swaps
/// it in, so snapshots taken before the step keep their contents.
#[derive(Debug, Clone)]
pub struct Engine {
    rule: Arc<Rule>,
    boundary: Boundary,
    grid: Arc<Grid<u8>>,
    generation: u64,
    phase: Phase,
}

impl Engine {
    /// Fails with `TableLookupOverflow` when the rule's table cannot cover
    /// every summary its kernel produces over the table's own states, and
    /// with `InvalidPattern` when a cell holds a state outside them.
    pub fn new(rule: Arc<Rule>, grid: Grid<u8>, boundary: Boundary) -> Result<Self> {
        let max_state = rule.table().max_state().max(1);
        rule.table().covers(rule.kernel(), max_state)?;
        check_states(&rule, &grid)?;
        debug!(
            rule = %rule,
            rows = grid.rows(),
            cols = grid.cols(),
            ?boundary,
            "engine created"
        );
        Ok(Self {
            rule,
            boundary,
            grid: Arc::new(grid),
            generation: 0,
            phase: Phase::Idle,
        })
    }

    /// Empty `rows x cols` grid.
    pub fn with_size(rule: Arc<Rule>, rows: usize, cols: usize, boundary: Boundary) -> Result<Self> {
        Self::new(rule, Grid::zeros(rows, cols)?, boundary)
    }

    pub fn rule(&self) -> &Rule {
        &self.rule
    }

    pub fn boundary(&self) -> Boundary {
        self.boundary
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn population(&self) -> usize {
        self.grid.population()
    }

    /// Seeds a block of digit strings. Copies the grid first if a snapshot
    /// still holds it. Digits above the rule's largest state are rejected.
    pub fn set_region<S: AsRef<str>>(&mut self, row: usize, col: usize, patterns: &[S]) -> Result<()> {
        let mut next = Grid::clone(&self.grid);
        next.set_region(row, col, patterns)?;
        check_states(&self.rule, &next)?;
        self.grid = Arc::new(next);
        Ok(())
    }

    /// Replaces the whole state and restarts the generation count.
    pub fn reset(&mut self, grid: Grid<u8>) -> Result<()> {
        if grid.shape() != self.grid.shape() {
            return Err(CaError::InvalidDimension {
                rows: grid.rows(),
                cols: grid.cols(),
            });
        }
        check_states(&self.rule, &grid)?;
        self.grid = Arc::new(grid);
        self.generation = 0;
        Ok(())
    }

    fn advance(&self) -> Result<(Grid<u8>, u64)> {
        let reduced = self.rule.kernel().correlate(&self.grid, self.boundary);
        let table = self.rule.table();
        let mut next = Grid::clone(&self.grid);
        let mut changed = 0u64;
        for (cell, &summary) in next.cells_mut().iter_mut().zip(reduced.cells()) {
            let state = table.lookup(summary)?;
            if *cell != state {
                changed += 1;
                *cell = state;
            }
        }
        Ok((next, changed))
    }
}

/// Every cell must be a state the rule's table can produce.
fn check_states(rule: &Rule, grid: &Grid<u8>) -> Result<()> {
    let max_state = rule.table().max_state().max(1);
    match grid.cells().iter().position(|&c| c > max_state) {
        Some(index) => {
            let (row, col) = (index / grid.cols(), index % grid.cols());
            Err(CaError::pattern(format!(
                "cell ({row}, {col}) holds {}; {rule} has states 0..={max_state}",
                grid.cells()[index]
            )))
        }
        None => Ok(()),
    }
}

impl Automaton for Engine {
    type Cell = u8;

    fn step(&mut self) -> Result<StepStats> {
        self.phase = Phase::Stepping;
        let result = self.advance();
        self.phase = Phase::Idle;

        let (next, changed) = result?;
        self.grid = Arc::new(next);
        self.generation += 1;
        trace!(generation = self.generation, changed, "step");
        Ok(StepStats {
            generation: self.generation,
            changed,
        })
    }

    fn current_array(&self) -> Snapshot<u8> {
        Snapshot::new(self.generation, Arc::clone(&self.grid))
    }

    fn generation(&self) -> u64 {
        self.generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::TransitionTable;
    use crate::kernel::Kernel;

    fn life(rows: usize, cols: usize, boundary: Boundary) -> Engine {
        Engine::with_size(Arc::new(Rule::life()), rows, cols, boundary).unwrap()
    }

    #[test]
    fn test_block_is_still_life() {
        let mut engine = life(6, 6, Boundary::Fixed);
        engine.set_region(2, 2, &["11", "11"]).unwrap();
        let before = engine.current_array();
        let stats = engine.step().unwrap();
        assert_eq!(stats, StepStats { generation: 1, changed: 0 });
        assert_eq!(engine.current_array().grid(), before.grid());
    }

    #[test]
    fn test_blinker_oscillates() {
        let mut engine = life(5, 5, Boundary::Fixed);
        engine.set_region(2, 1, &["111"]).unwrap();
        let horizontal = engine.current_array();
        engine.step().unwrap();
        let vertical = engine.current_array();
        assert_eq!(vertical.get(1, 2), Some(1));
        assert_eq!(vertical.get(2, 2), Some(1));
        assert_eq!(vertical.get(3, 2), Some(1));
        assert_eq!(vertical.population(), 3);
        engine.step().unwrap();
        assert_eq!(engine.current_array().grid(), horizontal.grid());
    }

    #[test]
    fn test_snapshot_survives_step() {
        let mut engine = life(5, 5, Boundary::Wrap);
        engine.set_region(2, 1, &["111"]).unwrap();
        let held = engine.current_array();
        engine.step().unwrap();
        assert_eq!(held.row(2).unwrap(), &[0, 1, 1, 1, 0]);
        assert_eq!(held.generation(), 0);
    }

    #[test]
    fn test_set_region_does_not_touch_snapshots() {
        let mut engine = life(4, 4, Boundary::Fixed);
        let held = engine.current_array();
        engine.set_region(0, 0, &["1"]).unwrap();
        assert_eq!(held.population(), 0);
        assert_eq!(engine.population(), 1);
    }

    #[test]
    fn test_short_table_rejected_at_construction() {
        let table = TransitionTable::from_set(18, &[3, 12, 13]).unwrap();
        let rule = Rule::new("short", Kernel::life(), table);
        let err = Engine::with_size(Arc::new(rule), 4, 4, Boundary::Fixed).unwrap_err();
        assert_eq!(err, CaError::TableLookupOverflow { value: 18, len: 18 });
    }

    #[test]
    fn test_out_of_range_states_rejected() {
        let rule = Arc::new(Rule::life());
        let mut seeded = Grid::zeros(3, 3).unwrap();
        seeded.set(1, 1, 3).unwrap();
        assert!(matches!(
            Engine::new(Arc::clone(&rule), seeded.clone(), Boundary::Fixed),
            Err(CaError::InvalidPattern(_))
        ));

        let mut engine = life(3, 3, Boundary::Fixed);
        engine.set_region(0, 0, &["1"]).unwrap();
        assert!(matches!(
            engine.set_region(0, 0, &["107"]),
            Err(CaError::InvalidPattern(_))
        ));
        assert!(matches!(engine.reset(seeded), Err(CaError::InvalidPattern(_))));
        assert_eq!(engine.population(), 1);
        assert_eq!(engine.current_array().get(0, 0), Some(1));
        engine.step().unwrap();
    }

    #[test]
    fn test_failed_step_commits_nothing() {
        // bypass construction checks with a table too short for the kernel
        let table = TransitionTable::from_set(4, &[3]).unwrap();
        let mut grid = Grid::zeros(3, 3).unwrap();
        grid.set(1, 1, 1).unwrap();
        let mut engine = Engine {
            rule: Arc::new(Rule::new("short", Kernel::life(), table)),
            boundary: Boundary::Fixed,
            grid: Arc::new(grid),
            generation: 0,
            phase: Phase::Idle,
        };
        let before = engine.current_array();
        assert!(matches!(
            engine.step(),
            Err(CaError::TableLookupOverflow { value: 10, len: 4 })
        ));
        assert_eq!(engine.generation(), 0);
        assert_eq!(engine.phase(), Phase::Idle);
        assert_eq!(engine.current_array(), before);
    }

    #[test]
    fn test_loop_steps() {
        let mut engine = life(8, 8, Boundary::Wrap);
        engine.set_region(0, 0, &["010", "001", "111"]).unwrap();
        let stats = engine.loop_steps(3).unwrap();
        assert_eq!(stats.len(), 3);
        assert_eq!(stats[2].generation, 3);
        assert_eq!(engine.population(), 5);
    }

    #[test]
    fn test_reset_checks_shape() {
        let mut engine = life(4, 4, Boundary::Fixed);
        assert!(engine.reset(Grid::zeros(3, 4).unwrap()).is_err());
        engine.step().unwrap();
        engine.reset(Grid::zeros(4, 4).unwrap()).unwrap();
        assert_eq!(engine.generation(), 0);
    }
}
