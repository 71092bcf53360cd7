//! Generic 2-D cellular automata.
//!
//! The core is a [`Grid`] of small unsigned states, a [`Kernel`] that
//! reduces every neighborhood to a number, a [`TransitionTable`] that maps
//! that number to the next state, and an [`Engine`] that runs
//! reduce -> lookup -> commit one generation at a time. Variants built on
//! the same pieces: [`Elementary`] (1-D Wolfram rules), [`SandPile`] and
//! [`Turmite`].
//!
//! Automata publish immutable [`Snapshot`]s; a viewer only ever sees those
//! (or [`Frame`]s derived from them) and never the live grid.
//!
//! ```
//! use std::sync::Arc;
//! use automaton::{Automaton, Boundary, Engine, Rule};
//!
//! let mut life = Engine::with_size(Arc::new(Rule::life()), 8, 8, Boundary::Wrap)?;
//! life.set_region(0, 0, &["010", "001", "111"])?;
//! life.loop_steps(4)?;
//! assert_eq!(life.current_array().get(1, 2), Some(1));
//! # Ok::<(), automaton::CaError>(())
//! ```

pub mod config;
pub mod elementary;
pub mod engine;
pub mod error;
pub mod grid;
pub mod history;
pub mod kernel;
pub mod model;
pub mod patterns;
pub mod rule;
pub mod sandpile;
pub mod table;
pub mod turmite;
pub mod view;

pub use config::{ModelConfig, SeedConfig, SimulationConfig};
pub use elementary::Elementary;
pub use engine::{Automaton, Engine, Phase, StepStats};
pub use error::{CaError, Result};
pub use grid::{CellState, Grid, Snapshot};
pub use history::CycleDetector;
pub use kernel::{Boundary, Kernel};
pub use model::Model;
pub use patterns::{PATTERNS, Pattern};
pub use rule::Rule;
pub use sandpile::{Equilibrium, SandPile};
pub use table::TransitionTable;
pub use turmite::{Heading, Turmite};
pub use view::{Frame, Recorder};
