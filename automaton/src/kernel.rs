// kernel.rs - Neighborhood reduction by kernel correlation

use serde::{Deserialize, Serialize};

use crate::error::{CaError, Result};
use crate::grid::{CellState, Grid};

/// How neighbor references that fall outside the grid are resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Boundary {
    /// Out-of-range neighbors read as zero.
    #[default]
    Fixed,
    /// Edges wrap around (toroidal).
    Wrap,
}

/// Odd-sized integer weight matrix, anchored at its centre.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Kernel {
    rows: usize,
    cols: usize,
    weights: Vec<i32>,
}

impl Kernel {
    pub fn new(rows: usize, cols: usize, weights: Vec<i32>) -> Result<Self> {
        if rows == 0 || cols == 0 {
            return Err(CaError::kernel(format!("empty {rows}x{cols} kernel")));
        }
        if rows % 2 == 0 || cols % 2 == 0 {
            return Err(CaError::kernel(format!(
                "{rows}x{cols} kernel has no centre cell"
            )));
        }
        if weights.len() != rows * cols {
            return Err(CaError::kernel(format!(
                "{} weights for a {rows}x{cols} kernel",
                weights.len()
            )));
        }
        Ok(Self {
            rows,
            cols,
            weights,
        })
    }

    /// Builds a kernel from a fixed-size matrix literal.
    pub fn from_rows<const R: usize, const C: usize>(rows: [[i32; C]; R]) -> Result<Self> {
        Self::new(R, C, rows.iter().flatten().copied().collect())
    }

    /// Game of Life: neighbors weigh 1, the cell itself 10.
    pub fn life() -> Self {
        Self {
            rows: 3,
            cols: 3,
            weights: vec![1, 1, 1, 1, 10, 1, 1, 1, 1],
        }
    }

    /// 1-D elementary automata: `left*4 + centre*2 + right`.
    pub fn elementary() -> Self {
        Self {
            rows: 1,
            cols: 3,
            weights: vec![4, 2, 1],
        }
    }

    /// Sandpile toppling: a cell sheds four grains, one to each orthogonal neighbor.
    pub fn topple() -> Self {
        Self {
            rows: 3,
            cols: 3,
            weights: vec![0, 1, 0, 1, -4, 1, 0, 1, 0],
        }
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn weights(&self) -> &[i32] {
        &self.weights
    }

    /// Inclusive range of summaries a grid with states in `0..=max_state`
    /// can produce.
    pub fn summary_range(&self, max_state: i64) -> (i64, i64) {
        self.weights.iter().fold((0, 0), |(lo, hi), &w| {
            let w = i64::from(w);
            if w < 0 {
                (lo + w * max_state, hi)
            } else {
                (lo, hi + w * max_state)
            }
        })
    }

    /// Correlates the kernel with every cell of `grid`.
    ///
    /// `out[i][j] = sum(k[di][dj] * grid[i + di - ci][j + dj - cj])` where
    /// `(ci, cj)` is the kernel centre.
    pub fn correlate<T: CellState>(&self, grid: &Grid<T>, boundary: Boundary) -> Grid<i64> {
        let (rows, cols) = grid.shape();
        let (ci, cj) = ((self.rows / 2) as i64, (self.cols / 2) as i64);
        let src = grid.cells();
        let mut out: Grid<i64> = grid.map(|_| 0);
        let dst = out.cells_mut();

        for i in 0..rows as i64 {
            for j in 0..cols as i64 {
                let mut acc = 0i64;
                for di in 0..self.rows as i64 {
                    for dj in 0..self.cols as i64 {
                        let w = self.weights[(di as usize) * self.cols + dj as usize];
                        if w == 0 {
                            continue;
                        }
                        let (r, c) = (i + di - ci, j + dj - cj);
                        let index = match boundary {
                            Boundary::Fixed => {
                                if r < 0 || c < 0 || r >= rows as i64 || c >= cols as i64 {
                                    continue;
                                }
                                r as usize * cols + c as usize
                            }
                            Boundary::Wrap => {
                                r.rem_euclid(rows as i64) as usize * cols
                                    + c.rem_euclid(cols as i64) as usize
                            }
                        };
                        acc += i64::from(w) * src[index].to_i64();
                    }
                }
                dst[(i as usize) * cols + j as usize] = acc;
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(rows: &[&str]) -> Grid<u8> {
        let mut g = Grid::zeros(rows.len(), rows[0].len()).unwrap();
        g.set_region(0, 0, rows).unwrap();
        g
    }

    #[test]
    fn test_even_kernel_rejected() {
        assert!(Kernel::new(2, 3, vec![0; 6]).is_err());
        assert!(Kernel::new(3, 3, vec![0; 8]).is_err());
    }

    #[test]
    fn test_life_summary_fixed() {
        let g = grid(&["110", "010", "000"]);
        let out = Kernel::life().correlate(&g, Boundary::Fixed);
        // centre: self 10 + two neighbours
        assert_eq!(out.get(1, 1), Some(12));
        assert_eq!(out.get(0, 0), Some(12));
        assert_eq!(out.get(2, 2), Some(1));
        assert_eq!(out.get(2, 0), Some(1));
    }

    #[test]
    fn test_wrap_reaches_opposite_edge() {
        let g = grid(&["100", "000", "000"]);
        let fixed = Kernel::life().correlate(&g, Boundary::Fixed);
        let wrap = Kernel::life().correlate(&g, Boundary::Wrap);
        assert_eq!(fixed.get(2, 2), Some(0));
        assert_eq!(wrap.get(2, 2), Some(1));
    }

    #[test]
    fn test_elementary_window() {
        let g = grid(&["01101"]);
        let fixed = Kernel::elementary().correlate(&g, Boundary::Fixed);
        assert_eq!(fixed.cells(), &[1, 3, 6, 5, 2]);
        let wrap = Kernel::elementary().correlate(&g, Boundary::Wrap);
        assert_eq!(wrap.cells(), &[5, 3, 6, 5, 2]);
    }

    #[test]
    fn test_summary_range() {
        assert_eq!(Kernel::life().summary_range(1), (0, 18));
        assert_eq!(Kernel::elementary().summary_range(1), (0, 7));
        assert_eq!(Kernel::topple().summary_range(1), (-4, 4));
    }

    #[test]
    fn test_from_rows() {
        let k = Kernel::from_rows([[0, 1, 0], [1, -4, 1], [0, 1, 0]]).unwrap();
        assert_eq!(k, Kernel::topple());
    }
}
