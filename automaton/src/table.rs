// table.rs - Transition tables: neighborhood summary -> next state

use std::fmt::Write;

use crate::error::{CaError, Result};
use crate::kernel::Kernel;

/// Deterministic lookup from a neighborhood summary to the next cell state.
///
/// Rule numbers use the LSB-first convention: entry `i` is bit `i` of the
/// rule, where `i` is the neighborhood pattern read as a binary number
/// (`left*4 + centre*2 + right` for elementary automata). Both decoding and
/// [`TransitionTable::latex`] use this order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TransitionTable {
    entries: Vec<u8>,
}

impl TransitionTable {
    /// Wraps an explicit table.
    pub fn new(entries: Vec<u8>) -> Result<Self> {
        if entries.is_empty() {
            return Err(CaError::rule("empty transition table"));
        }
        Ok(Self { entries })
    }

    pub(crate) fn from_entries(entries: Vec<u8>) -> Self {
        debug_assert!(!entries.is_empty());
        Self { entries }
    }

    /// Decodes `rule` into `entries` binary entries.
    pub fn from_rule(rule: u64, entries: usize) -> Result<Self> {
        if entries == 0 || entries > 64 {
            return Err(CaError::rule(format!("{entries} entries cannot encode a rule")));
        }
        if entries < 64 && rule >> entries != 0 {
            return Err(CaError::rule(format!(
                "rule {rule} does not fit in {entries} entries"
            )));
        }
        Ok(Self {
            entries: (0..entries).map(|i| ((rule >> i) & 1) as u8).collect(),
        })
    }

    /// Wolfram's 8-entry encoding for elementary automata.
    pub fn from_wolfram(rule: u8) -> Self {
        Self {
            entries: (0..8).map(|i| (rule >> i) & 1).collect(),
        }
    }

    /// `len` entries, 1 for every summary in `alive` and 0 elsewhere.
    pub fn from_set(len: usize, alive: &[usize]) -> Result<Self> {
        let mut entries = vec![0u8; len];
        for &value in alive {
            let slot = entries.get_mut(value).ok_or_else(|| {
                CaError::rule(format!("summary {value} outside a table of {len} entries"))
            })?;
            *slot = 1;
        }
        Self::new(entries)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[u8] {
        &self.entries
    }

    /// Largest state the table can produce.
    pub fn max_state(&self) -> u8 {
        self.entries.iter().copied().max().unwrap_or(0)
    }

    pub fn lookup(&self, summary: i64) -> Result<u8> {
        usize::try_from(summary)
            .ok()
            .and_then(|i| self.entries.get(i).copied())
            .ok_or(CaError::TableLookupOverflow {
                value: summary,
                len: self.entries.len(),
            })
    }

    /// Re-encodes a binary table as its rule number.
    pub fn rule_number(&self) -> Result<u64> {
        if self.entries.len() > 64 {
            return Err(CaError::rule("table too long to encode"));
        }
        self.entries
            .iter()
            .enumerate()
            .try_fold(0u64, |acc, (i, &bit)| match bit {
                0 => Ok(acc),
                1 => Ok(acc | 1 << i),
                other => Err(CaError::rule(format!("entry {i} is {other}, not binary"))),
            })
    }

    /// Checks that every summary `kernel` can produce over states
    /// `0..=max_state` has an entry.
    pub fn covers(&self, kernel: &Kernel, max_state: u8) -> Result<()> {
        let (lo, hi) = kernel.summary_range(i64::from(max_state));
        for value in [lo, hi] {
            self.lookup(value)?;
        }
        Ok(())
    }

    /// Renders the table as a LaTeX tabular.
    ///
    /// The `prev` row lists the neighborhood patterns in index order as
    /// binary strings, the `next` row the corresponding states.
    pub fn latex(&self) -> String {
        let width = usize::BITS as usize - (self.entries.len() - 1).leading_zeros() as usize;
        let width = width.max(1);
        let mut out = String::new();

        let _ = writeln!(out, "\\beforefig");
        let _ = writeln!(out, "\\centerline{{");
        let _ = writeln!(out, "\\begin{{tabular}}{{|{}}}", "c|".repeat(self.entries.len() + 1));
        let _ = writeln!(out, "\\hline");

        let prev: Vec<String> = std::iter::once("prev".to_string())
            .chain((0..self.entries.len()).map(|i| format!("{i:0width$b}")))
            .collect();
        let _ = writeln!(out, "{} \\\\ ", prev.join(" & "));
        let _ = writeln!(out, "\\hline");

        let next: Vec<String> = std::iter::once("next".to_string())
            .chain(self.entries.iter().map(|e| e.to_string()))
            .collect();
        let _ = writeln!(out, "{} \\\\ ", next.join(" &   "));
        let _ = writeln!(out, "\\hline");

        let _ = writeln!(out, "\\end{{tabular}}}}");
        out
    }
}
