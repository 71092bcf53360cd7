// patterns.rs - Named seed patterns and random fills

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::error::{CaError, Result};
use crate::grid::{CellState, Grid};

/// A block of digit rows, as accepted by [`Grid::set_region`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pattern {
    pub name: &'static str,
    pub rows: &'static [&'static str],
}

pub const PATTERNS: &[Pattern] = &[
    Pattern {
        name: "Block",
        rows: &["11", "11"],
    },
    Pattern {
        name: "Blinker",
        rows: &["111"],
    },
    Pattern {
        name: "Toad",
        rows: &["0111", "1110"],
    },
    Pattern {
        name: "Beacon",
        rows: &["1100", "1100", "0011", "0011"],
    },
    Pattern {
        name: "Glider",
        rows: &["010", "001", "111"],
    },
    Pattern {
        name: "R-pentomino",
        rows: &["011", "110", "010"],
    },
    // methuselah, ragged rows
    Pattern {
        name: "Rabbits",
        rows: &["1000111", "111001", "01"],
    },
    Pattern {
        name: "Pulsar",
        rows: &[
            "0011100011100",
            "0000000000000",
            "1000010100001",
            "1000010100001",
            "1000010100001",
            "0011100011100",
            "0000000000000",
            "0011100011100",
            "1000010100001",
            "1000010100001",
            "1000010100001",
            "0000000000000",
            "0011100011100",
        ],
    },
    Pattern {
        name: "Gosper Glider Gun",
        rows: &[
            "000000000000000000000000100000000000",
            "000000000000000000000010100000000000",
            "000000000000110000001100000000000011",
            "000000000001000100001100000000000011",
            "110000000010000010001100000000000000",
            "110000000010001011000010100000000000",
            "000000000010000010000000100000000000",
            "000000000001000100000000000000000000",
            "000000000000110000000000000000000000",
        ],
    },
];

/// Looks a pattern up by name, ignoring case, spaces, dashes and underscores.
pub fn find(name: &str) -> Option<&'static Pattern> {
    let key = normalize(name);
    PATTERNS.iter().find(|p| normalize(p.name) == key)
}

fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| !matches!(c, ' ' | '-' | '_'))
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

impl Pattern {
    /// Bounding box: (rows, longest row).
    pub fn size(&self) -> (usize, usize) {
        let width = self.rows.iter().map(|r| r.len()).max().unwrap_or(0);
        (self.rows.len(), width)
    }

    /// Writes the pattern with its top-left corner at `(row, col)`.
    pub fn place<T: CellState>(&self, grid: &mut Grid<T>, row: usize, col: usize) -> Result<()> {
        grid.set_region(row, col, self.rows)
    }

    /// Clears the grid and writes the pattern in its middle.
    pub fn place_centered<T: CellState>(&self, grid: &mut Grid<T>) -> Result<()> {
        let (h, w) = self.size();
        let row = grid.rows().saturating_sub(h) / 2;
        let col = grid.cols().saturating_sub(w) / 2;
        let mut cleared = Grid::zeros(grid.rows(), grid.cols())?;
        self.place(&mut cleared, row, col)?;
        *grid = cleared;
        Ok(())
    }
}

/// Clears the grid, then sets each cell to 1 with probability `density`.
pub fn random_fill<T: CellState>(grid: &mut Grid<T>, seed: u64, density: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&density) {
        return Err(CaError::pattern(format!("density {density} outside 0..=1")));
    }
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    for cell in grid.cells_mut() {
        *cell = T::from_digit(u8::from(rng.gen_bool(density)));
    }
    Ok(())
}
