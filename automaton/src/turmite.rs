// turmite.rs - Langton's ant

use std::sync::Arc;

use tracing::debug;

use crate::engine::{Automaton, StepStats};
use crate::error::{CaError, Result};
use crate::grid::{Grid, Snapshot};
use crate::kernel::Boundary;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Heading {
    #[default]
    North,
    East,
    South,
    West,
}

impl Heading {
    pub fn right(self) -> Self {
        match self {
            Heading::North => Heading::East,
            Heading::East => Heading::South,
            Heading::South => Heading::West,
            Heading::West => Heading::North,
        }
    }

    pub fn left(self) -> Self {
        match self {
            Heading::North => Heading::West,
            Heading::West => Heading::South,
            Heading::South => Heading::East,
            Heading::East => Heading::North,
        }
    }

    /// (row, col) offset of one move.
    pub fn offset(self) -> (i64, i64) {
        match self {
            Heading::North => (-1, 0),
            Heading::East => (0, 1),
            Heading::South => (1, 0),
            Heading::West => (0, -1),
        }
    }
}

/// An ant walking a binary grid: on a 0 cell it turns right, on a 1 cell
/// left, flipping the cell as it leaves.
///
/// On a fixed boundary the ant may step off the grid. That step still
/// flips and turns; the step after it fails with `OutOfBounds`.
#[derive(Debug, Clone)]
pub struct Turmite {
    grid: Arc<Grid<u8>>,
    location: (i64, i64),
    heading: Heading,
    boundary: Boundary,
    generation: u64,
}

impl Turmite {
    /// Ant in the middle of an empty grid, facing north.
    pub fn new(rows: usize, cols: usize, boundary: Boundary) -> Result<Self> {
        let grid = Grid::zeros(rows, cols)?;
        debug!(rows, cols, ?boundary, "turmite created");
        Ok(Self {
            grid: Arc::new(grid),
            location: ((rows / 2) as i64, (cols / 2) as i64),
            heading: Heading::North,
            boundary,
            generation: 0,
        })
    }

    /// Current cell, or `None` once the ant has walked off a fixed grid.
    pub fn location(&self) -> Option<(usize, usize)> {
        let (r, c) = self.location;
        self.grid
            .contains(r, c)
            .then_some((r as usize, c as usize))
    }

    pub fn heading(&self) -> Heading {
        self.heading
    }

    fn target(&self, heading: Heading) -> (i64, i64) {
        let (rows, cols) = self.grid.shape();
        let (dr, dc) = heading.offset();
        let (r, c) = (self.location.0 + dr, self.location.1 + dc);
        match self.boundary {
            Boundary::Wrap => (r.rem_euclid(rows as i64), c.rem_euclid(cols as i64)),
            Boundary::Fixed => (r, c),
        }
    }
}

impl Automaton for Turmite {
    type Cell = u8;

    /// Fails with `OutOfBounds` once the ant is off the grid.
    fn step(&mut self) -> Result<StepStats> {
        let Some((row, col)) = self.location() else {
            let (rows, cols) = self.grid.shape();
            return Err(CaError::out_of_bounds(self.location.0, self.location.1, rows, cols));
        };
        let cell = self.grid.get(row, col).unwrap_or(0);
        let heading = if cell == 0 {
            self.heading.right()
        } else {
            self.heading.left()
        };

        let mut grid = Grid::clone(&self.grid);
        grid.set(row, col, cell ^ 1)?;
        self.grid = Arc::new(grid);
        self.heading = heading;
        self.location = self.target(heading);
        self.generation += 1;

        if self.location().is_none() {
            debug!(generation = self.generation, "turmite left the grid");
        }
        Ok(StepStats {
            generation: self.generation,
            changed: 1,
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

    #[test]
    fn test_first_moves() {
        let mut ant = Turmite::new(5, 5, Boundary::Fixed).unwrap();
        ant.step().unwrap();
        assert_eq!(ant.heading(), Heading::East);
        assert_eq!(ant.location(), Some((2, 3)));
        assert_eq!(ant.current_array().get(2, 2), Some(1));

        ant.loop_steps(3).unwrap();
        // four right turns bring the ant home
        assert_eq!(ant.location(), Some((2, 2)));
        assert_eq!(ant.heading(), Heading::North);
        assert_eq!(ant.current_array().population(), 4);

        // now on a live cell: turn left, clear it
        ant.step().unwrap();
        assert_eq!(ant.heading(), Heading::West);
        assert_eq!(ant.location(), Some((2, 1)));
        assert_eq!(ant.current_array().get(2, 2), Some(0));
    }

    #[test]
    fn test_leaving_step_still_flips() {
        let mut ant = Turmite::new(1, 1, Boundary::Fixed).unwrap();
        let stats = ant.step().unwrap();
        assert_eq!(stats.generation, 1);
        assert_eq!(ant.heading(), Heading::East);
        assert_eq!(ant.location(), None);
        assert_eq!(ant.current_array().get(0, 0), Some(1));

        let err = ant.step().unwrap_err();
        assert_eq!(
            err,
            CaError::OutOfBounds {
                row: 0,
                col: 1,
                rows: 1,
                cols: 1
            }
        );
        assert_eq!(ant.generation(), 1);
        assert_eq!(ant.heading(), Heading::East);
        assert_eq!(ant.current_array().population(), 1);
    }

    #[test]
    fn test_wrap_boundary() {
        let mut ant = Turmite::new(1, 1, Boundary::Wrap).unwrap();
        ant.step().unwrap();
        assert_eq!(ant.location(), Some((0, 0)));
        assert_eq!(ant.current_array().get(0, 0), Some(1));
    }

    #[test]
    fn test_turns_are_inverse() {
        for h in [Heading::North, Heading::East, Heading::South, Heading::West] {
            assert_eq!(h.right().left(), h);
            assert_eq!(h.right().right().right().right(), h);
        }
    }
}
