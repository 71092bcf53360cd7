// model.rs - Enumerated automaton variants built from configuration

use std::fmt;
use std::sync::Arc;

use tracing::info;

use crate::config::{ModelConfig, SeedConfig, SimulationConfig};
use crate::elementary::Elementary;
use crate::engine::{Automaton, Engine, StepStats};
use crate::error::Result;
use crate::grid::{CellState, Grid};
use crate::history::CycleDetector;
use crate::patterns;
use crate::rule::Rule;
use crate::sandpile::SandPile;
use crate::turmite::Turmite;
use crate::view::Frame;

/// One of the supported automata, chosen by configuration.
#[derive(Debug, Clone)]
pub enum Model {
    Life(Engine),
    Elementary(Elementary),
    SandPile(SandPile),
    Turmite(Turmite),
}

impl Model {
    pub fn from_config(config: &SimulationConfig) -> Result<Self> {
        config.validate()?;
        let (rows, cols) = (config.rows, config.cols);
        let random_seed = config.random_seed.unwrap_or(0);

        let model = match &config.model {
            ModelConfig::Life { rule } => {
                let rule: Rule = rule.parse()?;
                let mut grid = Grid::zeros(rows, cols)?;
                match &config.seed {
                    Some(seed) => seed_grid(&mut grid, seed, random_seed)?,
                    None => {
                        if let Some(glider) = patterns::find("glider") {
                            glider.place(&mut grid, 0, 0)?;
                        }
                    }
                }
                Model::Life(Engine::new(Arc::new(rule), grid, config.boundary)?)
            }
            ModelConfig::Elementary { rule } => {
                let mut ca = Elementary::new(*rule, rows, Some(cols), config.boundary)?;
                let first_row = config
                    .seed
                    .as_ref()
                    .and_then(SeedConfig::rows)
                    .and_then(|rows| rows.into_iter().next());
                match (&config.seed, first_row) {
                    (Some(seed), _) if seed.density.is_some() => ca.start_random(random_seed)?,
                    (_, Some(first)) => ca.start_string(&first)?,
                    _ => ca.start_single()?,
                }
                Model::Elementary(ca)
            }
            ModelConfig::Sandpile {
                threshold,
                max_iterations,
                tower_factor,
            } => {
                let mut pile = match (tower_factor, &config.seed) {
                    (Some(factor), _) => {
                        let mut pile = SandPile::with_heights(Grid::zeros(rows, cols)?, *threshold, random_seed)?;
                        pile.tower(*factor)?;
                        pile
                    }
                    (None, Some(seed)) => {
                        let mut heights = Grid::zeros(rows, cols)?;
                        seed_grid(&mut heights, seed, random_seed)?;
                        SandPile::with_heights(heights, *threshold, random_seed)?
                    }
                    (None, None) => SandPile::random(rows, cols, *threshold, random_seed)?,
                };
                pile = pile.with_iteration_limit((*max_iterations > 0).then_some(*max_iterations));
                Model::SandPile(pile)
            }
            ModelConfig::Turmite => Model::Turmite(Turmite::new(rows, cols, config.boundary)?),
        };

        info!(model = %model, rows, cols, boundary = ?config.boundary, "model built");
        Ok(model)
    }

    pub fn step(&mut self) -> Result<StepStats> {
        match self {
            Model::Life(a) => a.step(),
            Model::Elementary(a) => a.step(),
            Model::SandPile(a) => a.step(),
            Model::Turmite(a) => a.step(),
        }
    }

    pub fn loop_steps(&mut self, steps: usize) -> Result<Vec<StepStats>> {
        match self {
            Model::Life(a) => a.loop_steps(steps),
            Model::Elementary(a) => a.loop_steps(steps),
            Model::SandPile(a) => a.loop_steps(steps),
            Model::Turmite(a) => a.loop_steps(steps),
        }
    }

    pub fn frame(&self) -> Frame {
        match self {
            Model::Life(a) => a.frame(),
            Model::Elementary(a) => a.frame(),
            Model::SandPile(a) => a.frame(),
            Model::Turmite(a) => a.frame(),
        }
    }

    pub fn generation(&self) -> u64 {
        match self {
            Model::Life(a) => a.generation(),
            Model::Elementary(a) => a.generation(),
            Model::SandPile(a) => a.generation(),
            Model::Turmite(a) => a.generation(),
        }
    }

    /// Feeds the current grid to `detector`; see [`CycleDetector::observe`].
    pub fn detect_cycle(&self, detector: &mut CycleDetector) -> Option<usize> {
        match self {
            Model::Life(a) => detector.observe(a.current_array().grid()),
            Model::Elementary(a) => detector.observe(a.current_array().grid()),
            Model::SandPile(a) => detector.observe(a.current_array().grid()),
            Model::Turmite(a) => detector.observe(a.current_array().grid()),
        }
    }

    /// Display name, e.g. `Life B3/S23` or `Rule 30`.
    pub fn name(&self) -> String {
        self.to_string()
    }

    /// Level a frame of this model is normalised against when drawn.
    pub fn display_levels(&self) -> u32 {
        match self {
            Model::SandPile(pile) => pile.threshold() + 3,
            _ => 1,
        }
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Model::Life(engine) => write!(f, "Life {}", engine.rule()),
            Model::Elementary(ca) => write!(f, "Rule {}", ca.rule()),
            Model::SandPile(pile) => write!(f, "Sandpile K={}", pile.threshold()),
            Model::Turmite(_) => f.write_str("Turmite"),
        }
    }
}

/// Applies a seed: a random fill, or a block of rows at `row`/`col`
/// (centred when unset).
fn seed_grid<T: CellState>(grid: &mut Grid<T>, seed: &SeedConfig, random_seed: u64) -> Result<()> {
    if let Some(density) = seed.density {
        return patterns::random_fill(grid, random_seed, density);
    }
    let Some(rows) = seed.rows() else {
        return Ok(());
    };
    let height = rows.len();
    let width = rows.iter().map(|r| r.len()).max().unwrap_or(0);
    let row = seed.row.unwrap_or(grid.rows().saturating_sub(height) / 2);
    let col = seed.col.unwrap_or(grid.cols().saturating_sub(width) / 2);
    grid.set_region(row, col, rows.as_slice())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CaError;

    fn config(toml: &str) -> SimulationConfig {
        SimulationConfig::from_toml(toml).unwrap()
    }

    #[test]
    fn test_default_is_life_with_glider() {
        let mut model = Model::from_config(&SimulationConfig::default()).unwrap();
        assert_eq!(model.to_string(), "Life B3/S23");
        assert_eq!(model.frame().live_cells(), 5);
        model.loop_steps(8).unwrap();
        assert_eq!(model.generation(), 8);
        assert_eq!(model.frame().live_cells(), 5);
    }

    #[test]
    fn test_centred_seed() {
        let model = Model::from_config(&config(
            "rows = 5\ncols = 5\n[seed]\npattern = \"blinker\"\n",
        ))
        .unwrap();
        let frame = model.frame();
        assert_eq!(frame.level(2, 1), 1);
        assert_eq!(frame.level(2, 3), 1);
        assert_eq!(frame.live_cells(), 3);
    }

    #[test]
    fn test_elementary_from_cells() {
        let mut model = Model::from_config(&config(
            "rows = 3\ncols = 5\nboundary = \"fixed\"\n[model]\nkind = \"elementary\"\nrule = 90\n[seed]\ncells = [\"00100\"]\nrow = 0\ncol = 0\n",
        ))
        .unwrap();
        model.step().unwrap();
        let frame = model.frame();
        assert_eq!(frame.level(1, 1), 1);
        assert_eq!(frame.level(1, 3), 1);
        assert_eq!(model.generation(), 1);
    }

    #[test]
    fn test_sandpile_tower_config() {
        let model = Model::from_config(&config(
            "rows = 7\ncols = 7\n[model]\nkind = \"sandpile\"\ntower_factor = 1\nmax_iterations = 0\n",
        ))
        .unwrap();
        assert_eq!(model.name(), "Sandpile K=4");
        assert_eq!(model.frame().level(3, 3), 49);
        match model {
            Model::SandPile(pile) => assert_eq!(pile.max_iterations(), None),
            other => panic!("unexpected model {other}"),
        }
    }

    #[test]
    fn test_turmite_out_of_bounds_surfaces() {
        let mut model = Model::from_config(&config(
            "rows = 1\ncols = 1\nboundary = \"fixed\"\n[model]\nkind = \"turmite\"\n",
        ))
        .unwrap();
        model.step().unwrap();
        assert!(matches!(model.step(), Err(CaError::OutOfBounds { .. })));
        assert_eq!(model.generation(), 1);
    }

    #[test]
    fn test_cycle_detection_through_model() {
        let mut model = Model::from_config(&config(
            "rows = 6\ncols = 6\n[seed]\npattern = \"block\"\n",
        ))
        .unwrap();
        let mut detector = CycleDetector::default();
        assert_eq!(model.detect_cycle(&mut detector), None);
        model.step().unwrap();
        assert_eq!(model.detect_cycle(&mut detector), Some(1));
    }
}
