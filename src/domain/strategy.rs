//! Strategy definition: typed series references and entry/exit rules.
//!
//! A strategy is validated at construction time, not at evaluation
//! time: every SMA it references must already exist in the
//! [`IndicatorSet`] it is built against.

use crate::domain::error::SmalabError;
use crate::domain::indicator::IndicatorSet;
use crate::domain::series::PriceSeries;
use crate::domain::signal::{self, Relation};
use std::fmt;

/// What a comparison side can refer to: the close-price series or a
/// previously computed SMA column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeriesRef {
    Close,
    Sma(usize),
}

impl SeriesRef {
    /// Parse the config-file form: `"Close"` or `"SMA_<window>"`
    /// (case-insensitive).
    pub fn parse(value: &str) -> Result<Self, SmalabError> {
        let trimmed = value.trim();
        if trimmed.eq_ignore_ascii_case("close") {
            return Ok(SeriesRef::Close);
        }
        if let Some(rest) = trimmed
            .strip_prefix("SMA_")
            .or_else(|| trimmed.strip_prefix("sma_"))
        {
            if let Ok(window) = rest.parse::<usize>() {
                if window > 0 {
                    return Ok(SeriesRef::Sma(window));
                }
            }
        }
        Err(SmalabError::InvalidOperand {
            value: value.to_string(),
        })
    }

    /// Materialize the referenced series, aligned to the price index.
    pub fn resolve(
        &self,
        series: &PriceSeries,
        indicators: &IndicatorSet,
    ) -> Result<Vec<Option<f64>>, SmalabError> {
        match self {
            SeriesRef::Close => Ok(series.closes().into_iter().map(Some).collect()),
            SeriesRef::Sma(window) => indicators
                .get(*window)
                .map(|column| column.values.clone())
                .ok_or(SmalabError::UnknownIndicator { window: *window }),
        }
    }
}

impl fmt::Display for SeriesRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SeriesRef::Close => write!(f, "Close"),
            SeriesRef::Sma(window) => write!(f, "SMA_{}", window),
        }
    }
}

/// One `(left, relation, right)` comparison.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompareRule {
    pub left: SeriesRef,
    pub relation: Relation,
    pub right: SeriesRef,
}

impl CompareRule {
    fn validate_refs(&self, indicators: &IndicatorSet) -> Result<(), SmalabError> {
        for side in [self.left, self.right] {
            if let SeriesRef::Sma(window) = side {
                if !indicators.contains(window) {
                    return Err(SmalabError::UnknownIndicator { window });
                }
            }
        }
        Ok(())
    }

    /// Evaluate the comparison over the whole series.
    pub fn evaluate(
        &self,
        series: &PriceSeries,
        indicators: &IndicatorSet,
    ) -> Result<Vec<bool>, SmalabError> {
        let left = self.left.resolve(series, indicators)?;
        let right = self.right.resolve(series, indicators)?;
        Ok(signal::evaluate(&left, self.relation, &right))
    }
}

impl fmt::Display for CompareRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.left, self.relation, self.right)
    }
}

/// The raw strings a presentation layer collects before validation.
#[derive(Debug, Clone, Default)]
pub struct StrategySpec {
    pub name: String,
    pub entry_left: String,
    pub entry_relation: String,
    pub entry_right: String,
    pub exit_left: String,
    pub exit_relation: String,
    pub exit_right: String,
}

/// A validated entry/exit rule pair. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct Strategy {
    pub name: String,
    pub entry: CompareRule,
    pub exit: CompareRule,
}

impl Strategy {
    /// Parse and validate a spec against the computed indicators.
    ///
    /// Fails with `UnknownIndicator` naming the missing window when a
    /// side references an SMA that was never computed; never silently
    /// substitutes a default.
    pub fn build(spec: &StrategySpec, indicators: &IndicatorSet) -> Result<Self, SmalabError> {
        let entry = CompareRule {
            left: SeriesRef::parse(&spec.entry_left)?,
            relation: Relation::parse(&spec.entry_relation)?,
            right: SeriesRef::parse(&spec.entry_right)?,
        };
        let exit = CompareRule {
            left: SeriesRef::parse(&spec.exit_left)?,
            relation: Relation::parse(&spec.exit_relation)?,
            right: SeriesRef::parse(&spec.exit_right)?,
        };

        entry.validate_refs(indicators)?;
        exit.validate_refs(indicators)?;

        Ok(Strategy {
            name: spec.name.clone(),
            entry,
            exit,
        })
    }

    /// Resolve both rules to aligned entry/exit boolean series.
    pub fn evaluate_signals(
        &self,
        series: &PriceSeries,
        indicators: &IndicatorSet,
    ) -> Result<(Vec<bool>, Vec<bool>), SmalabError> {
        let entry = self.entry.evaluate(series, indicators)?;
        let exit = self.exit.evaluate(series, indicators)?;
        Ok((entry, exit))
    }
}
