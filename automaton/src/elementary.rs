// elementary.rs - 1-D Wolfram automata, one row per generation

use std::sync::Arc;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, trace};

use crate::engine::{Automaton, StepStats};
use crate::error::{CaError, Result};
use crate::grid::{Grid, Snapshot};
use crate::kernel::{Boundary, Kernel};
use crate::table::TransitionTable;

/// Elementary cellular automaton that keeps its whole history.
///
/// Row `i` of the array holds generation `i`; `next` is the first row not
/// yet written.
#[derive(Debug, Clone)]
pub struct Elementary {
    rule: u8,
    table: TransitionTable,
    kernel: Kernel,
    boundary: Boundary,
    array: Arc<Grid<u8>>,
    next: usize,
}

impl Elementary {
    /// `cols` defaults to `2 * rows + 1`, wide enough that a single seed
    /// never reaches a fixed edge.
    pub fn new(rule: u8, rows: usize, cols: Option<usize>, boundary: Boundary) -> Result<Self> {
        let cols = cols.unwrap_or(2 * rows + 1);
        let array = Grid::zeros(rows, cols)?;
        debug!(rule, rows, cols, ?boundary, "elementary automaton created");
        Ok(Self {
            rule,
            table: TransitionTable::from_wolfram(rule),
            kernel: Kernel::elementary(),
            boundary,
            array: Arc::new(array),
            next: 0,
        })
    }

    pub fn rule(&self) -> u8 {
        self.rule
    }

    pub fn table(&self) -> &TransitionTable {
        &self.table
    }

    pub fn next_row(&self) -> usize {
        self.next
    }

    pub fn rows(&self) -> usize {
        self.array.rows()
    }

    pub fn cols(&self) -> usize {
        self.array.cols()
    }

    /// One live cell in the middle of the first row.
    pub fn start_single(&mut self) -> Result<()> {
        let mid = self.cols() / 2;
        self.start_with(|row| row[mid] = 1)
    }

    /// Uniformly random first row.
    pub fn start_random(&mut self, seed: u64) -> Result<()> {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        self.start_with(|row| row.iter_mut().for_each(|c| *c = u8::from(rng.gen_bool(0.5))))
    }

    /// First row from a string of `0`/`1`, left-aligned.
    pub fn start_string(&mut self, s: &str) -> Result<()> {
        let mut first = Grid::zeros(1, self.cols())?;
        first.set_region(0, 0, &[s])?;
        if first.cells().iter().any(|&c| c > 1) {
            return Err(CaError::pattern(format!("{s:?} is not binary")));
        }
        self.start_with(|row| row.copy_from_slice(first.cells()))
    }

    fn start_with(&mut self, fill: impl FnOnce(&mut [u8])) -> Result<()> {
        let mut array = Grid::zeros(self.rows(), self.cols())?;
        fill(array.row_mut(0));
        self.array = Arc::new(array);
        self.next = 1;
        Ok(())
    }

    /// Columns `start..end` of the history.
    pub fn get_array(&self, start: usize, end: Option<usize>) -> Result<Grid<u8>> {
        self.array.columns(start, end)
    }
}

impl Automaton for Elementary {
    type Cell = u8;

    fn step(&mut self) -> Result<StepStats> {
        if self.next == 0 {
            return Err(CaError::NotSeeded);
        }
        if self.next >= self.rows() {
            return Err(CaError::HistoryExhausted { rows: self.rows() });
        }

        let cols = self.cols();
        let prev = self
            .array
            .row(self.next - 1)
            .ok_or(CaError::HistoryExhausted { rows: self.rows() })?;
        let window = Grid::from_vec(1, cols, prev.to_vec())?;
        let reduced = self.kernel.correlate(&window, self.boundary);
        let row = reduced
            .cells()
            .iter()
            .map(|&summary| self.table.lookup(summary))
            .collect::<Result<Vec<u8>>>()?;

        let changed = row.iter().zip(prev).filter(|(a, b)| a != b).count() as u64;
        let mut array = Grid::clone(&self.array);
        array.row_mut(self.next).copy_from_slice(&row);
        self.array = Arc::new(array);
        self.next += 1;

        trace!(row = self.next - 1, changed, "elementary step");
        Ok(StepStats {
            generation: self.generation(),
            changed,
        })
    }

    fn current_array(&self) -> Snapshot<u8> {
        Snapshot::new(self.generation(), Arc::clone(&self.array))
    }

    /// Index of the last written row.
    fn generation(&self) -> u64 {
        self.next.saturating_sub(1) as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(ca: &Elementary) -> Vec<String> {
        ca.current_array()
            .iter_rows()
            .map(|r| r.iter().map(|&c| if c == 1 { '#' } else { '.' }).collect())
            .collect()
    }

    #[test]
    fn test_rule_90_sierpinski() {
        let mut ca = Elementary::new(90, 4, None, Boundary::Fixed).unwrap();
        ca.start_single().unwrap();
        ca.loop_steps(3).unwrap();
        assert_eq!(
            render(&ca),
            vec![
                "....#....",
                "...#.#...",
                "..#...#..",
                ".#.#.#.#.",
            ]
        );
    }

    #[test]
    fn test_rule_30_left_edge() {
        let mut ca = Elementary::new(30, 3, Some(7), Boundary::Fixed).unwrap();
        ca.start_single().unwrap();
        ca.loop_steps(2).unwrap();
        assert_eq!(render(&ca), vec!["...#...", "..###..", ".##..#."]);
    }

    #[test]
    fn test_wrap_boundary_reaches_around() {
        let mut ca = Elementary::new(90, 2, Some(5), Boundary::Wrap).unwrap();
        ca.start_string("1").unwrap();
        ca.step().unwrap();
        assert_eq!(render(&ca)[1], ".#..#");

        let mut fixed = Elementary::new(90, 2, Some(5), Boundary::Fixed).unwrap();
        fixed.start_string("1").unwrap();
        fixed.step().unwrap();
        assert_eq!(render(&fixed)[1], ".#...");
    }

    #[test]
    fn test_step_requires_seed() {
        let mut ca = Elementary::new(30, 3, None, Boundary::Fixed).unwrap();
        assert_eq!(ca.step(), Err(CaError::NotSeeded));
    }

    #[test]
    fn test_history_is_bounded() {
        let mut ca = Elementary::new(30, 3, None, Boundary::Fixed).unwrap();
        ca.start_single().unwrap();
        ca.loop_steps(2).unwrap();
        assert_eq!(ca.next_row(), 3);
        assert_eq!(ca.step(), Err(CaError::HistoryExhausted { rows: 3 }));
        assert_eq!(ca.generation(), 2);
    }

    #[test]
    fn test_start_string_validation() {
        let mut ca = Elementary::new(30, 2, Some(4), Boundary::Fixed).unwrap();
        assert!(matches!(
            ca.start_string("10101"),
            Err(CaError::OutOfBounds { .. })
        ));
        assert!(matches!(ca.start_string("12"), Err(CaError::InvalidPattern(_))));
        ca.start_string("0110").unwrap();
        assert_eq!(ca.current_array().row(0).unwrap(), &[0, 1, 1, 0]);
    }

    #[test]
    fn test_random_start_is_seeded() {
        let mut a = Elementary::new(30, 10, None, Boundary::Wrap).unwrap();
        let mut b = Elementary::new(30, 10, None, Boundary::Wrap).unwrap();
        a.start_random(7).unwrap();
        b.start_random(7).unwrap();
        a.loop_steps(9).unwrap();
        b.loop_steps(9).unwrap();
        assert_eq!(a.current_array(), b.current_array());
    }

    #[test]
    fn test_get_array_trims_columns() {
        let mut ca = Elementary::new(18, 4, None, Boundary::Fixed).unwrap();
        ca.start_single().unwrap();
        ca.loop_steps(3).unwrap();
        let trimmed = ca.get_array(2, Some(7)).unwrap();
        assert_eq!(trimmed.shape(), (4, 5));
        assert_eq!(trimmed.row(0).unwrap(), &[0, 0, 1, 0, 0]);
    }
}
