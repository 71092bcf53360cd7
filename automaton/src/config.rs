//! Configuration for building automata.
//!
//! A [`SimulationConfig`] maps onto a small TOML file. Every field has a
//! default, so an empty file gives a 64x64 toroidal Game of Life, which
//! starts from a glider when no `[seed]` is given.
//!
//! ## Example
//!
//! ```toml
//! rows = 100
//! cols = 201
//! boundary = "fixed"
//!
//! [model]
//! kind = "elementary"
//! rule = 30
//! ```
//!
//! ```toml
//! rows = 50
//! cols = 50
//! random_seed = 7
//!
//! [model]
//! kind = "sandpile"
//! threshold = 4
//! tower_factor = 2
//! max_iterations = 0   # no ceiling
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{CaError, Result};
use crate::kernel::Boundary;
use crate::patterns;
use crate::rule::Rule;
use crate::sandpile::{DEFAULT_MAX_ITERATIONS, DEFAULT_THRESHOLD, MIN_THRESHOLD};

/// Which automaton to build, with its rule parameters.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelConfig {
    Life {
        #[serde(default = "default_life_rule")]
        rule: String,
    },
    Elementary {
        #[serde(default = "default_elementary_rule")]
        rule: u8,
    },
    Sandpile {
        #[serde(default = "default_threshold")]
        threshold: u32,
        /// Iteration ceiling for run-to-equilibrium; 0 disables it.
        #[serde(default = "default_max_iterations")]
        max_iterations: u64,
        /// Start from a centre tower of `factor * rows * cols` grains.
        #[serde(default)]
        tower_factor: Option<u32>,
    },
    Turmite,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self::Life {
            rule: default_life_rule(),
        }
    }
}

fn default_life_rule() -> String {
    "B3/S23".to_string()
}

fn default_elementary_rule() -> u8 {
    30
}

fn default_threshold() -> u32 {
    DEFAULT_THRESHOLD
}

fn default_max_iterations() -> u64 {
    DEFAULT_MAX_ITERATIONS
}

/// Initial cells. Exactly one of `pattern`, `cells` or `density` is used.
///
/// `row`/`col` default to centring the block.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(default)]
pub struct SeedConfig {
    /// Name from [`patterns::PATTERNS`].
    pub pattern: Option<String>,
    /// Explicit digit rows.
    pub cells: Option<Vec<String>>,
    /// Random fill probability; uses `random_seed`.
    pub density: Option<f64>,
    pub row: Option<usize>,
    pub col: Option<usize>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct SimulationConfig {
    pub rows: usize,
    pub cols: usize,
    pub boundary: Boundary,
    pub random_seed: Option<u64>,
    pub model: ModelConfig,
    pub seed: Option<SeedConfig>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            rows: 64,
            cols: 64,
            boundary: Boundary::Wrap,
            random_seed: None,
            model: ModelConfig::default(),
            seed: None,
        }
    }
}

impl SimulationConfig {
    /// Parses and validates TOML.
    pub fn from_toml(content: &str) -> Result<Self> {
        let config = toml::from_str::<Self>(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| CaError::config(format!("{}: {e}", path.display())))?;
        Self::from_toml(&content)
    }

    pub fn validate(&self) -> Result<()> {
        if self.rows == 0 || self.cols == 0 {
            return Err(CaError::InvalidDimension {
                rows: self.rows,
                cols: self.cols,
            });
        }

        match &self.model {
            ModelConfig::Life { rule } => {
                rule.parse::<Rule>()?;
            }
            ModelConfig::Sandpile { threshold, .. } if *threshold < MIN_THRESHOLD => {
                return Err(CaError::config(format!(
                    "sandpile threshold {threshold} is below {MIN_THRESHOLD}"
                )));
            }
            _ => {}
        }

        if let Some(seed) = &self.seed {
            seed.validate()?;
        }
        Ok(())
    }
}

impl SeedConfig {
    pub fn validate(&self) -> Result<()> {
        let sources = [
            self.pattern.is_some(),
            self.cells.is_some(),
            self.density.is_some(),
        ]
        .iter()
        .filter(|&&set| set)
        .count();
        if sources != 1 {
            return Err(CaError::config(
                "seed needs exactly one of `pattern`, `cells` or `density`",
            ));
        }
        if let Some(name) = &self.pattern {
            if patterns::find(name).is_none() {
                return Err(CaError::config(format!("unknown pattern {name:?}")));
            }
        }
        if let Some(density) = self.density {
            if !(0.0..=1.0).contains(&density) {
                return Err(CaError::config(format!("density {density} outside 0..=1")));
            }
        }
        Ok(())
    }

    /// Digit rows of the pattern or explicit cells; `None` for random fills.
    pub fn rows(&self) -> Option<Vec<String>> {
        if let Some(cells) = &self.cells {
            return Some(cells.clone());
        }
        self.pattern
            .as_deref()
            .and_then(patterns::find)
            .map(|p| p.rows.iter().map(|r| r.to_string()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_is_default() {
        let config = SimulationConfig::from_toml("").unwrap();
        assert_eq!(config, SimulationConfig::default());
    }

    #[test]
    fn test_elementary_config() {
        let config = SimulationConfig::from_toml(
            r#"
            rows = 100
            cols = 201
            boundary = "fixed"

            [model]
            kind = "elementary"
            rule = 90
            "#,
        )
        .unwrap();
        assert_eq!(config.boundary, Boundary::Fixed);
        assert_eq!(config.model, ModelConfig::Elementary { rule: 90 });
    }

    #[test]
    fn test_sandpile_defaults() {
        let config = SimulationConfig::from_toml(
            r#"
            [model]
            kind = "sandpile"
            tower_factor = 2
            "#,
        )
        .unwrap();
        assert_eq!(
            config.model,
            ModelConfig::Sandpile {
                threshold: 4,
                max_iterations: DEFAULT_MAX_ITERATIONS,
                tower_factor: Some(2),
            }
        );
    }

    #[test]
    fn test_turmite_config() {
        let config = SimulationConfig::from_toml("[model]\nkind = \"turmite\"\n").unwrap();
        assert_eq!(config.model, ModelConfig::Turmite);
    }

    #[test]
    fn test_seed_cells() {
        let config = SimulationConfig::from_toml(
            r#"
            [seed]
            cells = ["1000111", "111001", "01"]
            row = 3
            "#,
        )
        .unwrap();
        let seed = config.seed.unwrap();
        assert_eq!(seed.rows().unwrap().len(), 3);
        assert_eq!(seed.row, Some(3));
        assert_eq!(seed.col, None);
    }

    #[test]
    fn test_validation_errors() {
        assert!(matches!(
            SimulationConfig::from_toml("rows = 0"),
            Err(CaError::InvalidDimension { rows: 0, .. })
        ));
        assert!(SimulationConfig::from_toml("[model]\nkind = \"life\"\nrule = \"B3\"").is_err());
        assert!(SimulationConfig::from_toml("[model]\nkind = \"sandpile\"\nthreshold = 1").is_err());
        assert!(SimulationConfig::from_toml("[seed]\npattern = \"nope\"").is_err());
        assert!(SimulationConfig::from_toml("[seed]\ndensity = 2.0").is_err());
        assert!(SimulationConfig::from_toml("[seed]\npattern = \"glider\"\ndensity = 0.5").is_err());
        assert!(SimulationConfig::from_toml("[model]\nkind = \"hexagonal\"").is_err());
    }
}
