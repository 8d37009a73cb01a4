//! Success conditions over an observed record count
//!
//! A [`Condition`] is parsed once from the compact `--for` syntax and is
//! immutable afterwards. The grammar is strict: keywords are lowercase,
//! `N` is an unsigned base-10 literal with no sign or whitespace.
//!
//! | Text          | Satisfied when |
//! |---------------|----------------|
//! | `count=N`     | count == N     |
//! | `count-gte=N` | count >= N     |
//! | `count-gt=N`  | count > N      |
//! | `count-lte=N` | count <= N     |
//! | `count-lt=N`  | count < N      |
//! | `any`         | count > 0      |
//! | `none`        | count == 0     |

use std::fmt;
use std::str::FromStr;

use crate::error::{CoreError, Result};

/// Predicate over a non-negative record count
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Condition {
    Exact(u64),
    AtLeast(u64),
    GreaterThan(u64),
    AtMost(u64),
    LessThan(u64),
    Any,
    None,
}

impl Condition {
    /// Parse a condition string, failing with [`CoreError::InvalidCondition`]
    pub fn parse(text: &str) -> Result<Self> {
        let invalid = || CoreError::InvalidCondition {
            text: text.to_string(),
        };

        match text {
            "any" => return Ok(Condition::Any),
            "none" => return Ok(Condition::None),
            _ => {}
        }

        let (key, value) = text.split_once('=').ok_or_else(invalid)?;
        let n = parse_count(value).ok_or_else(invalid)?;

        match key {
            "count" => Ok(Condition::Exact(n)),
            "count-gte" => Ok(Condition::AtLeast(n)),
            "count-gt" => Ok(Condition::GreaterThan(n)),
            "count-lte" => Ok(Condition::AtMost(n)),
            "count-lt" => Ok(Condition::LessThan(n)),
            _ => Err(invalid()),
        }
    }

    /// Evaluate the condition against an observed record count
    #[must_use]
    pub fn satisfied_by(&self, count: u64) -> bool {
        match *self {
            Condition::Exact(n) => count == n,
            Condition::AtLeast(n) => count >= n,
            Condition::GreaterThan(n) => count > n,
            Condition::AtMost(n) => count <= n,
            Condition::LessThan(n) => count < n,
            Condition::Any => count > 0,
            Condition::None => count == 0,
        }
    }
}

/// Strict unsigned decimal: at least one ASCII digit and nothing else.
/// `u64::from_str` alone would accept a leading `+`.
fn parse_count(value: &str) -> Option<u64> {
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    value.parse().ok()
}

impl FromStr for Condition {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        Condition::parse(s)
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::Exact(n) => write!(f, "count={}", n),
            Condition::AtLeast(n) => write!(f, "count-gte={}", n),
            Condition::GreaterThan(n) => write!(f, "count-gt={}", n),
            Condition::AtMost(n) => write!(f, "count-lte={}", n),
            Condition::LessThan(n) => write!(f, "count-lt={}", n),
            Condition::Any => write!(f, "any"),
            Condition::None => write!(f, "none"),
        }
    }
}
