// rule.rs - Immutable rule definitions (kernel + transition table)

use std::fmt;
use std::str::FromStr;

use crate::error::{CaError, Result};
use crate::kernel::Kernel;
use crate::table::TransitionTable;

/// Weight of the cell itself in the Life-like kernel; neighbors weigh 1.
const SELF_WEIGHT: usize = 10;
const MAX_NEIGHBORS: u8 = 8;

/// A kernel and the table that interprets its summaries.
///
/// Built once and shared (`Arc<Rule>`) by every engine that runs it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    name: String,
    kernel: Kernel,
    table: TransitionTable,
}

impl Rule {
    pub fn new(name: impl Into<String>, kernel: Kernel, table: TransitionTable) -> Self {
        Self {
            name: name.into(),
            kernel,
            table,
        }
    }

    /// Conway's Game of Life (B3/S23).
    pub fn life() -> Self {
        Self::build_life_like(&[3], &[2, 3])
    }

    /// Life-like rule from birth and survival neighbor counts.
    ///
    /// With the centre weighted 10, a dead cell with `n` live neighbors
    /// summarises to `n` and a live one to `10 + n`.
    pub fn life_like(birth: &[u8], survive: &[u8]) -> Result<Self> {
        if let Some(&n) = birth.iter().chain(survive).find(|&&n| n > MAX_NEIGHBORS) {
            return Err(CaError::rule(format!("{n} neighbors is more than {MAX_NEIGHBORS}")));
        }
        Ok(Self::build_life_like(birth, survive))
    }

    // counts already checked against MAX_NEIGHBORS
    fn build_life_like(birth: &[u8], survive: &[u8]) -> Self {
        let mut entries = vec![0u8; SELF_WEIGHT + usize::from(MAX_NEIGHBORS) + 1];
        for &n in birth {
            entries[usize::from(n)] = 1;
        }
        for &n in survive {
            entries[SELF_WEIGHT + usize::from(n)] = 1;
        }
        let table = TransitionTable::from_entries(entries);
        Self::new(rulestring(birth, survive), Kernel::life(), table)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kernel(&self) -> &Kernel {
        &self.kernel
    }

    pub fn table(&self) -> &TransitionTable {
        &self.table
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Parses `B3/S23`-style rulestrings (case-insensitive, either order).
impl FromStr for Rule {
    type Err = CaError;

    fn from_str(s: &str) -> Result<Self> {
        let mut birth = None;
        let mut survive = None;
        for part in s.trim().split('/') {
            let mut chars = part.chars();
            let slot = match chars.next().map(|c| c.to_ascii_uppercase()) {
                Some('B') => &mut birth,
                Some('S') => &mut survive,
                _ => return Err(CaError::rule(format!("malformed rulestring {s:?}"))),
            };
            if slot.is_some() {
                return Err(CaError::rule(format!("repeated section in {s:?}")));
            }
            let counts = chars
                .map(|c| {
                    c.to_digit(10)
                        .map(|d| d as u8)
                        .ok_or_else(|| CaError::rule(format!("unexpected {c:?} in {s:?}")))
                })
                .collect::<Result<Vec<u8>>>()?;
            *slot = Some(counts);
        }
        match (birth, survive) {
            (Some(b), Some(s)) => Self::life_like(&b, &s),
            _ => Err(CaError::rule(format!("rulestring {s:?} needs B and S sections"))),
        }
    }
}

fn rulestring(birth: &[u8], survive: &[u8]) -> String {
    let digits = |counts: &[u8]| {
        let mut sorted = counts.to_vec();
        sorted.sort_unstable();
        sorted.dedup();
        sorted.iter().map(|n| n.to_string()).collect::<String>()
    };
    format!("B{}/S{}", digits(birth), digits(survive))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_life_table_is_magic_numbers() {
        let expected = TransitionTable::from_set(19, &[3, 12, 13]).unwrap();
        assert_eq!(Rule::life().table(), &expected);
        assert_eq!(Rule::life().name(), "B3/S23");
    }

    #[test]
    fn test_parse_highlife() {
        let rule: Rule = "b63/s32".parse().unwrap();
        assert_eq!(rule.name(), "B36/S23");
        assert_eq!(rule.table().lookup(6), Ok(1));
        assert_eq!(rule.table().lookup(16), Ok(0));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("B3".parse::<Rule>().is_err());
        assert!("B3/S23/B4".parse::<Rule>().is_err());
        assert!("B9/S23".parse::<Rule>().is_err());
        assert!("X3/S23".parse::<Rule>().is_err());
        assert!("B3x/S23".parse::<Rule>().is_err());
    }

    #[test]
    fn test_empty_survival_allowed() {
        // Seeds: B2/S
        let rule: Rule = "B2/S".parse().unwrap();
        assert_eq!(rule.table().entries().iter().filter(|&&e| e == 1).count(), 1);
    }
}
