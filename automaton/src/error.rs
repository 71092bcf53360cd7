//! Error types for the automaton crate.
//!
//! Every failure here is a local, pre-flight-checkable condition: bad
//! dimensions, seeds that do not fit, tables that do not cover their kernel.
//! None of them is retried.

use thiserror::Error;

/// Main error type for automaton operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CaError {
    /// Grid dimensions must both be positive
    #[error("Invalid dimension: {rows}x{cols} (rows and columns must be positive)")]
    InvalidDimension { rows: usize, cols: usize },

    /// A write or move landed outside the grid
    #[error("Cell ({row}, {col}) is outside the {rows}x{cols} grid")]
    OutOfBounds {
        row: i64,
        col: i64,
        rows: usize,
        cols: usize,
    },

    /// A neighborhood summary has no transition table entry
    #[error("Neighborhood summary {value} has no entry in a transition table of {len} entries")]
    TableLookupOverflow { value: i64, len: usize },

    /// Run-to-equilibrium hit its iteration ceiling
    #[error("No equilibrium reached after {iterations} iterations")]
    UnboundedEquilibriumLoop { iterations: u64 },

    /// Kernel shape or weights are unusable
    #[error("Invalid kernel: {0}")]
    InvalidKernel(String),

    /// Rule number, rulestring or table definition is malformed
    #[error("Invalid rule: {0}")]
    InvalidRule(String),

    /// Seed pattern contains something other than digits
    #[error("Invalid pattern: {0}")]
    InvalidPattern(String),

    /// A 1-D automaton was stepped before its first row was written
    #[error("Automaton has not been seeded; call a start method first")]
    NotSeeded,

    /// Every allocated row of a 1-D automaton has been written
    #[error("All {rows} rows have been written")]
    HistoryExhausted { rows: usize },

    /// A cell value does not fit the grid's cell type
    #[error("Value {value} at ({row}, {col}) does not fit the cell type")]
    CellOverflow { row: usize, col: usize, value: i64 },

    /// Configuration could not be parsed or validated
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias for automaton operations.
pub type Result<T> = std::result::Result<T, CaError>;

impl CaError {
    /// Creates an out-of-bounds error for a signed position.
    #[must_use]
    pub fn out_of_bounds(row: i64, col: i64, rows: usize, cols: usize) -> Self {
        Self::OutOfBounds {
            row,
            col,
            rows,
            cols,
        }
    }

    /// Creates a new kernel error.
    #[must_use]
    pub fn kernel<S: Into<String>>(msg: S) -> Self {
        Self::InvalidKernel(msg.into())
    }

    /// Creates a new rule error.
    #[must_use]
    pub fn rule<S: Into<String>>(msg: S) -> Self {
        Self::InvalidRule(msg.into())
    }

    /// Creates a new pattern error.
    #[must_use]
    pub fn pattern<S: Into<String>>(msg: S) -> Self {
        Self::InvalidPattern(msg.into())
    }

    /// Creates a new configuration error.
    #[must_use]
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }
}

impl From<toml::de::Error> for CaError {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CaError::InvalidDimension { rows: 0, cols: 4 };
        assert_eq!(
            err.to_string(),
            "Invalid dimension: 0x4 (rows and columns must be positive)"
        );
    }

    #[test]
    fn test_lookup_overflow_display() {
        let err = CaError::TableLookupOverflow { value: 19, len: 19 };
        assert!(err.to_string().contains("19 entries"));
    }

    #[test]
    fn test_from_toml_error() {
        let toml_err = toml::from_str::<toml::Value>("rows = ").unwrap_err();
        let err: CaError = toml_err.into();
        assert!(matches!(err, CaError::Config(_)));
    }
}
