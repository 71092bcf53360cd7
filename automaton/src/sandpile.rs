// sandpile.rs - Bak-Tang-Wiesenfeld sandpile with run-to-equilibrium

use std::sync::Arc;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, warn};

use crate::engine::{Automaton, StepStats};
use crate::error::{CaError, Result};
use crate::grid::{Grid, Snapshot};
use crate::kernel::{Boundary, Kernel};

pub const DEFAULT_THRESHOLD: u32 = 4;
pub const DEFAULT_MAX_ITERATIONS: u64 = 1_000_000;
/// Smallest usable threshold: a toppling cell sheds four grains, so it must
/// hold at least four.
pub const MIN_THRESHOLD: u32 = 3;

/// Outcome of [`SandPile::run`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Equilibrium {
    /// Sweep-and-step iterations, including the final quiet one.
    pub duration: u64,
    /// Topple events summed over all iterations.
    pub toppled: u64,
}

#[derive(Debug, Clone)]
pub struct SandPile {
    heights: Arc<Grid<u32>>,
    totals: Grid<u32>,
    kernel: Kernel,
    threshold: u32,
    max_iterations: Option<u64>,
    generation: u64,
    swept_seq: Vec<u64>,
    toppled_seq: Vec<u64>,
    rng: ChaCha8Rng,
}

impl SandPile {
    /// Empty pile. Cells holding more than `threshold` grains topple.
    pub fn new(rows: usize, cols: usize, threshold: u32) -> Result<Self> {
        Self::with_heights(Grid::zeros(rows, cols)?, threshold, 0)
    }

    /// Pile with every height drawn from {2, 3, 4}.
    pub fn random(rows: usize, cols: usize, threshold: u32, seed: u64) -> Result<Self> {
        let mut pile = Self::new(rows, cols, threshold)?;
        pile.rng = ChaCha8Rng::seed_from_u64(seed);
        let mut heights = Grid::clone(&pile.heights);
        for cell in heights.cells_mut() {
            *cell = pile.rng.gen_range(2..=4);
        }
        pile.heights = Arc::new(heights);
        Ok(pile)
    }

    /// Fails with `InvalidRule` for a threshold below [`MIN_THRESHOLD`].
    pub fn with_heights(heights: Grid<u32>, threshold: u32, seed: u64) -> Result<Self> {
        if threshold < MIN_THRESHOLD {
            return Err(CaError::rule(format!(
                "sandpile threshold {threshold} is below {MIN_THRESHOLD}"
            )));
        }
        let totals = Grid::zeros(heights.rows(), heights.cols())?;
        debug!(
            rows = heights.rows(),
            cols = heights.cols(),
            threshold,
            "sandpile created"
        );
        Ok(Self {
            heights: Arc::new(heights),
            totals,
            kernel: Kernel::topple(),
            threshold,
            max_iterations: Some(DEFAULT_MAX_ITERATIONS),
            generation: 0,
            swept_seq: Vec::new(),
            toppled_seq: Vec::new(),
            rng: ChaCha8Rng::seed_from_u64(seed),
        })
    }

    /// Ceiling on [`SandPile::run`] iterations; `None` removes it.
    pub fn with_iteration_limit(mut self, limit: Option<u64>) -> Self {
        self.max_iterations = limit;
        self
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    pub fn max_iterations(&self) -> Option<u64> {
        self.max_iterations
    }

    /// Per-cell count of topple events so far.
    pub fn totals(&self) -> &Grid<u32> {
        &self.totals
    }

    pub fn swept_seq(&self) -> &[u64] {
        &self.swept_seq
    }

    pub fn toppled_seq(&self) -> &[u64] {
        &self.toppled_seq
    }

    pub fn grains(&self) -> u64 {
        self.heights.cells().iter().map(|&h| u64::from(h)).sum()
    }

    /// Clears the pile and stacks `factor * rows * cols` grains on the
    /// centre cell.
    pub fn tower(&mut self, factor: u32) -> Result<()> {
        let (rows, cols) = self.heights.shape();
        let grains = u64::from(factor) * (rows * cols) as u64;
        let height = u32::try_from(grains).map_err(|_| CaError::CellOverflow {
            row: rows / 2,
            col: cols / 2,
            value: i64::try_from(grains).unwrap_or(i64::MAX),
        })?;
        let mut heights = Grid::zeros(rows, cols)?;
        heights.set(rows / 2, cols / 2, height)?;
        self.heights = Arc::new(heights);
        Ok(())
    }

    /// Empties the border rows and columns; returns the grains removed.
    pub fn sweep(&mut self) -> u64 {
        let (rows, cols) = self.heights.shape();
        let mut heights = Grid::clone(&self.heights);
        let mut swept = 0u64;
        for (i, row) in heights.cells_mut().chunks_exact_mut(cols).enumerate() {
            for (j, h) in row.iter_mut().enumerate() {
                if i == 0 || j == 0 || i == rows - 1 || j == cols - 1 {
                    swept += u64::from(*h);
                    *h = 0;
                }
            }
        }
        self.heights = Arc::new(heights);
        swept
    }

    /// Adds one grain to a uniformly random cell.
    pub fn drop(&mut self) -> Result<(usize, usize)> {
        let (rows, cols) = self.heights.shape();
        let (row, col) = (self.rng.gen_range(0..rows), self.rng.gen_range(0..cols));
        let mut heights = Grid::clone(&self.heights);
        let h = heights.get(row, col).unwrap_or(0);
        let raised = h.checked_add(1).ok_or(CaError::CellOverflow {
            row,
            col,
            value: i64::from(h) + 1,
        })?;
        heights.set(row, col, raised)?;
        self.heights = Arc::new(heights);
        Ok((row, col))
    }

    /// Sweeps and steps until a step topples nothing.
    ///
    /// Fails with `UnboundedEquilibriumLoop` once the iteration ceiling is
    /// passed; the pile keeps whatever state it reached.
    pub fn run(&mut self) -> Result<Equilibrium> {
        let mut total = 0u64;
        let mut duration = 0u64;
        loop {
            if let Some(limit) = self.max_iterations {
                if duration >= limit {
                    warn!(iterations = duration, "sandpile did not settle");
                    return Err(CaError::UnboundedEquilibriumLoop {
                        iterations: duration,
                    });
                }
            }
            duration += 1;

            let swept = self.sweep();
            let toppled = self.step()?.changed;
            self.swept_seq.push(swept);
            self.toppled_seq.push(toppled);

            total += toppled;
            if toppled == 0 {
                info!(duration, toppled = total, "sandpile at equilibrium");
                return Ok(Equilibrium {
                    duration,
                    toppled: total,
                });
            }
        }
    }

    /// Drops one grain and relaxes.
    pub fn drop_and_run(&mut self) -> Result<Equilibrium> {
        self.drop()?;
        self.run()
    }
}

impl Automaton for SandPile {
    type Cell = u32;

    /// Topples every cell above the threshold at once.
    fn step(&mut self) -> Result<StepStats> {
        let toppling = self.heights.map(|h| u8::from(h > self.threshold));
        let flow = self.kernel.correlate(&toppling, Boundary::Fixed);

        let (_, cols) = self.heights.shape();
        let mut heights = Grid::clone(&self.heights);
        for (index, (h, &delta)) in heights.cells_mut().iter_mut().zip(flow.cells()).enumerate() {
            let value = i64::from(*h) + delta;
            *h = u32::try_from(value).map_err(|_| CaError::CellOverflow {
                row: index / cols,
                col: index % cols,
                value,
            })?;
        }

        let mut toppled = 0u64;
        for (total, &t) in self.totals.cells_mut().iter_mut().zip(toppling.cells()) {
            *total += u32::from(t);
            toppled += u64::from(t);
        }
        self.heights = Arc::new(heights);
        self.generation += 1;

        Ok(StepStats {
            generation: self.generation,
            changed: toppled,
        })
    }

    fn current_array(&self) -> Snapshot<u32> {
        Snapshot::new(self.generation, Arc::clone(&self.heights))
    }

    fn generation(&self) -> u64 {
        self.generation
    }
}
