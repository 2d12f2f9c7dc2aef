//! Exponential Moving Average of close.
//!
//! k = 2/(n+1), seeded by the first close, then EMA[i] = C[i]*k + EMA[i-1]*(1-k).
//! Defined from the first bar. Trigger fires on close crossing the EMA.

use crate::domain::indicator::{assemble, Indicator, IndicatorPoint};
use crate::domain::indicator_helpers::{crossings, ema};
use crate::domain::ohlcv::PriceSeries;

pub const DEFAULT_PERIOD: usize = 20;

#[derive(Debug, Clone, PartialEq)]
pub struct Ema {
    pub period: usize,
}

impl Default for Ema {
    fn default() -> Self {
        Ema {
            period: DEFAULT_PERIOD,
        }
    }
}

impl Indicator for Ema {
    fn lookback(&self) -> usize {
        1
    }

    fn compute(&self, series: &PriceSeries) -> Vec<IndicatorPoint> {
        let closes = series.closes();
        let line = ema(&closes, self.period);
        let spread: Vec<Option<f64>> = closes
            .iter()
            .zip(&line)
            .map(|(c, e)| Some(c - e))
            .collect();
        let triggers = crossings(&spread);
        assemble(series, line.into_iter().map(Some).collect(), triggers)
    }
}
