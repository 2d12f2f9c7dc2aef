//! Decision aggregation.
//!
//! Averages the last-bar triggers of the requested signals into a technical
//! score, weights it, and maps the composite onto BUY / HOLD / SELL.
//! The onchain and sentiment weights are carried through to the result but
//! have no data source here, so their contribution is always zero.

use std::collections::BTreeMap;
use std::fmt;

use crate::domain::error::CryptomindError;
use crate::domain::indicator::IndicatorPoint;
use crate::domain::ohlcv::PriceSeries;
use crate::domain::signal::{run_signals, SignalConfig};

pub const BUY_THRESHOLD: f64 = 0.25;
pub const SELL_THRESHOLD: f64 = -0.25;

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct DecisionWeights {
    pub technical: f64,
    pub onchain: f64,
    pub sentiment: f64,
}

impl Default for DecisionWeights {
    fn default() -> Self {
        DecisionWeights {
            technical: 0.6,
            onchain: 0.2,
            sentiment: 0.2,
        }
    }
}

impl DecisionWeights {
    /// Weights need not sum to one; they only have to be finite.
    pub fn validate(&self) -> Result<(), CryptomindError> {
        for (key, value) in [
            ("technical", self.technical),
            ("onchain", self.onchain),
            ("sentiment", self.sentiment),
        ] {
            if !value.is_finite() {
                return Err(CryptomindError::invalid_param(
                    "decision",
                    key,
                    format!("weight must be finite, got {value}"),
                ));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize), serde(rename_all = "UPPERCASE"))]
pub enum Recommendation {
    Buy,
    Hold,
    Sell,
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Recommendation::Buy => "BUY",
            Recommendation::Hold => "HOLD",
            Recommendation::Sell => "SELL",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct DecisionResult {
    pub score: f64,
    pub recommendation: Recommendation,
    pub details: BTreeMap<String, IndicatorPoint>,
    pub weights: DecisionWeights,
}

pub fn recommend(score: f64) -> Recommendation {
    if score > BUY_THRESHOLD {
        Recommendation::Buy
    } else if score < SELL_THRESHOLD {
        Recommendation::Sell
    } else {
        Recommendation::Hold
    }
}

/// Mean of last-bar triggers; zero when there are no signals.
pub fn technical_score(details: &BTreeMap<String, IndicatorPoint>) -> f64 {
    if details.is_empty() {
        return 0.0;
    }
    let sum: f64 = details.values().map(|p| f64::from(p.trigger.as_i8())).sum();
    sum / details.len() as f64
}

pub fn decide(
    series: &PriceSeries,
    configs: &[SignalConfig],
    weights: Option<DecisionWeights>,
) -> Result<DecisionResult, CryptomindError> {
    let weights = weights.unwrap_or_default();
    weights.validate()?;

    let details = run_signals(series, configs)?;
    let tech = technical_score(&details);
    let score = weights.technical * tech;
    let recommendation = recommend(score);

    tracing::info!(
        signals = details.len(),
        technical = tech,
        score,
        %recommendation,
        "decision computed"
    );

    Ok(DecisionResult {
        score,
        recommendation,
        details,
        weights,
    })
}
