//! Boolean signal series and relational comparisons.
//!
//! All functions here are pure: element-wise transforms of aligned
//! series into `Vec<bool>`. A missing operand value never produces a
//! true signal and never raises.

use crate::domain::error::SmalabError;
use std::fmt;

/// Supported binary relations between two series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    GreaterThan,
    LessThan,
}

impl Relation {
    /// Parse the human-readable form used by config files:
    /// `"greater than"` or `"less than"` (case-insensitive).
    pub fn parse(value: &str) -> Result<Self, SmalabError> {
        match value.trim().to_lowercase().as_str() {
            "greater than" => Ok(Relation::GreaterThan),
            "less than" => Ok(Relation::LessThan),
            _ => Err(SmalabError::InvalidRelation {
                value: value.to_string(),
            }),
        }
    }

    pub fn holds(&self, left: f64, right: f64) -> bool {
        match self {
            Relation::GreaterThan => left > right,
            Relation::LessThan => left < right,
        }
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Relation::GreaterThan => write!(f, "greater than"),
            Relation::LessThan => write!(f, "less than"),
        }
    }
}

/// Element-wise comparison of two aligned series.
///
/// Positions where either operand is missing yield `false`.
pub fn evaluate(left: &[Option<f64>], relation: Relation, right: &[Option<f64>]) -> Vec<bool> {
    left.iter()
        .zip(right.iter())
        .map(|(l, r)| match (l, r) {
            (Some(l), Some(r)) => relation.holds(*l, *r),
            _ => false,
        })
        .collect()
}

/// Crossing detection: true at index `i` iff `left[i] > right[i]` and
/// `left[i-1] <= right[i-1]`. False at index 0 and wherever an operand
/// is missing on either bar.
pub fn cross_above(left: &[Option<f64>], right: &[Option<f64>]) -> Vec<bool> {
    let n = left.len().min(right.len());
    let mut out = vec![false; n];
    for i in 1..n {
        if let (Some(lc), Some(rc), Some(lp), Some(rp)) =
            (left[i], right[i], left[i - 1], right[i - 1])
        {
            out[i] = lc > rc && lp <= rp;
        }
    }
    out
}

/// Element-wise conjunction, used to gate a crossing signal with a
/// trend filter.
pub fn combine_and(a: &[bool], b: &[bool]) -> Vec<bool> {
    a.iter().zip(b.iter()).map(|(x, y)| *x && *y).collect()
}
