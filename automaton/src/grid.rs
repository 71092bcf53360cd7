// grid.rs - Grid and snapshot types shared by every automaton

use std::fmt;
use std::hash::Hash;
use std::ops::Deref;
use std::sync::Arc;

use crate::error::{CaError, Result};

/// A small unsigned cell state.
///
/// Implemented for `u8` (binary and few-state automata), `u32` (sandpile
/// heights) and `i64` (reduced summaries). The reducer widens every state to
/// `i64`, so the accumulator never depends on the cell width.
pub trait CellState: Copy + Default + Eq + Hash + fmt::Debug + Send + Sync + 'static {
    /// Converts a seed-pattern digit (`0..=9`).
    fn from_digit(digit: u8) -> Self;

    fn to_i64(self) -> i64;

    /// Checked narrowing; `None` when the value does not fit.
    fn from_i64(value: i64) -> Option<Self>;

    /// Display level used by frames and text output.
    fn level(self) -> u32;
}

impl CellState for u8 {
    fn from_digit(digit: u8) -> Self {
        digit
    }

    fn to_i64(self) -> i64 {
        i64::from(self)
    }

    fn from_i64(value: i64) -> Option<Self> {
        u8::try_from(value).ok()
    }

    fn level(self) -> u32 {
        u32::from(self)
    }
}

impl CellState for u32 {
    fn from_digit(digit: u8) -> Self {
        u32::from(digit)
    }

    fn to_i64(self) -> i64 {
        i64::from(self)
    }

    fn from_i64(value: i64) -> Option<Self> {
        u32::try_from(value).ok()
    }

    fn level(self) -> u32 {
        self
    }
}

impl CellState for i64 {
    fn from_digit(digit: u8) -> Self {
        i64::from(digit)
    }

    fn to_i64(self) -> i64 {
        self
    }

    fn from_i64(value: i64) -> Option<Self> {
        Some(value)
    }

    fn level(self) -> u32 {
        u32::try_from(self).unwrap_or(0)
    }
}

/// Row-major 2-D array of cell states with fixed dimensions.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Grid<T> {
    rows: usize,
    cols: usize,
    cells: Vec<T>,
}

impl<T: CellState> Grid<T> {
    /// Creates a `rows x cols` grid with every cell set to `initial`.
    pub fn new(rows: usize, cols: usize, initial: T) -> Result<Self> {
        if rows == 0 || cols == 0 {
            return Err(CaError::InvalidDimension { rows, cols });
        }
        Ok(Self {
            rows,
            cols,
            cells: vec![initial; rows * cols],
        })
    }

    pub fn zeros(rows: usize, cols: usize) -> Result<Self> {
        Self::new(rows, cols, T::default())
    }

    /// Wraps an existing row-major buffer.
    pub fn from_vec(rows: usize, cols: usize, cells: Vec<T>) -> Result<Self> {
        if rows == 0 || cols == 0 || cells.len() != rows * cols {
            return Err(CaError::InvalidDimension { rows, cols });
        }
        Ok(Self { rows, cols, cells })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn cells(&self) -> &[T] {
        &self.cells
    }

    pub fn contains(&self, row: i64, col: i64) -> bool {
        row >= 0 && col >= 0 && (row as usize) < self.rows && (col as usize) < self.cols
    }

    pub fn get(&self, row: usize, col: usize) -> Option<T> {
        if row < self.rows && col < self.cols {
            Some(self.cells[row * self.cols + col])
        } else {
            None
        }
    }

    pub fn set(&mut self, row: usize, col: usize, value: T) -> Result<()> {
        if row >= self.rows || col >= self.cols {
            return Err(self.out_of_bounds(row, col));
        }
        self.cells[row * self.cols + col] = value;
        Ok(())
    }

    pub fn row(&self, row: usize) -> Option<&[T]> {
        (row < self.rows).then(|| &self.cells[row * self.cols..(row + 1) * self.cols])
    }

    pub(crate) fn row_mut(&mut self, row: usize) -> &mut [T] {
        let cols = self.cols;
        &mut self.cells[row * cols..(row + 1) * cols]
    }

    pub(crate) fn cells_mut(&mut self) -> &mut [T] {
        &mut self.cells
    }

    pub fn iter_rows(&self) -> impl Iterator<Item = &[T]> {
        self.cells.chunks_exact(self.cols)
    }

    pub fn fill(&mut self, value: T) {
        self.cells.fill(value);
    }

    /// Number of cells matching `pred`.
    pub fn count(&self, pred: impl Fn(T) -> bool) -> usize {
        self.cells.iter().filter(|&&c| pred(c)).count()
    }

    /// Cells that are not in the default (zero) state.
    pub fn population(&self) -> usize {
        self.count(|c| c != T::default())
    }

    pub fn map<U: CellState>(&self, f: impl Fn(T) -> U) -> Grid<U> {
        Grid {
            rows: self.rows,
            cols: self.cols,
            cells: self.cells.iter().map(|&c| f(c)).collect(),
        }
    }

    /// Writes a block of digit strings with its top-left corner at
    /// `(row, col)`. Rows may have different lengths.
    ///
    /// Nothing is written unless every character is a digit and every target
    /// cell lies inside the grid.
    pub fn set_region<S: AsRef<str>>(&mut self, row: usize, col: usize, patterns: &[S]) -> Result<()> {
        let mut writes = Vec::new();
        for (i, line) in patterns.iter().enumerate() {
            for (j, ch) in line.as_ref().chars().enumerate() {
                let digit = ch
                    .to_digit(10)
                    .ok_or_else(|| CaError::pattern(format!("unexpected character {ch:?} in row {i}")))?;
                let (r, c) = (row + i, col + j);
                if r >= self.rows || c >= self.cols {
                    return Err(self.out_of_bounds(r, c));
                }
                writes.push((r * self.cols + c, T::from_digit(digit as u8)));
            }
        }
        for (index, value) in writes {
            self.cells[index] = value;
        }
        Ok(())
    }

    /// Copies the columns `start..end` (all remaining columns when `end` is
    /// `None`) into a new grid.
    pub fn columns(&self, start: usize, end: Option<usize>) -> Result<Self> {
        let end = end.unwrap_or(self.cols);
        if start >= end || end > self.cols {
            return Err(CaError::InvalidDimension {
                rows: self.rows,
                cols: end.saturating_sub(start),
            });
        }
        let cells = self
            .iter_rows()
            .flat_map(|r| r[start..end].iter().copied())
            .collect();
        Self::from_vec(self.rows, end - start, cells)
    }

    /// Immutable copy of the current state.
    pub fn snapshot(&self, generation: u64) -> Snapshot<T> {
        Snapshot::new(generation, Arc::new(self.clone()))
    }

    fn out_of_bounds(&self, row: usize, col: usize) -> CaError {
        CaError::out_of_bounds(row as i64, col as i64, self.rows, self.cols)
    }
}

impl<T: CellState> fmt::Display for Grid<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.iter_rows() {
            let line: String = row
                .iter()
                .map(|c| char::from_digit(c.level(), 10).unwrap_or('#'))
                .collect();
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}

/// Read-only view of a grid at a given generation.
///
/// Automata keep their live state behind an `Arc` and swap in a fresh grid on
/// every step, so a snapshot handed out earlier never changes underneath its
/// holder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot<T> {
    generation: u64,
    grid: Arc<Grid<T>>,
}

impl<T: CellState> Snapshot<T> {
    pub(crate) fn new(generation: u64, grid: Arc<Grid<T>>) -> Self {
        Self { generation, grid }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn grid(&self) -> &Grid<T> {
        &self.grid
    }

    /// Owned copy for callers that want to edit and re-seed.
    pub fn to_grid(&self) -> Grid<T> {
        Grid::clone(&self.grid)
    }
}

impl<T> Deref for Snapshot<T> {
    type Target = Grid<T>;

    fn deref(&self) -> &Self::Target {
        &self.grid
    }
}
