//! Williams %R.
//!
//! %R = -100 × (HH(n) - C) / (HH(n) - LL(n)), zero range replaced by 1e-9.
//! Scale runs from -100 (at the low) to 0 (at the high), so the thresholds
//! are negative.

use crate::domain::indicator::{assemble, Indicator, IndicatorPoint};
use crate::domain::indicator_helpers::{band_trigger, defined, nonzero, rolling_max, rolling_min};
use crate::domain::ohlcv::PriceSeries;

pub const DEFAULT_PERIOD: usize = 14;
pub const DEFAULT_OVERSOLD: f64 = -80.0;
pub const DEFAULT_OVERBOUGHT: f64 = -20.0;

#[derive(Debug, Clone, PartialEq)]
pub struct WilliamsR {
    pub period: usize,
    pub oversold: f64,
    pub overbought: f64,
}

impl Default for WilliamsR {
    fn default() -> Self {
        WilliamsR {
            period: DEFAULT_PERIOD,
            oversold: DEFAULT_OVERSOLD,
            overbought: DEFAULT_OVERBOUGHT,
        }
    }
}

impl Indicator for WilliamsR {
    fn lookback(&self) -> usize {
        self.period
    }

    fn compute(&self, series: &PriceSeries) -> Vec<IndicatorPoint> {
        let highest = rolling_max(&defined(&series.highs()), self.period);
        let lowest = rolling_min(&defined(&series.lows()), self.period);

        let values: Vec<Option<f64>> = series
            .bars()
            .iter()
            .enumerate()
            .map(|(i, bar)| match (highest[i], lowest[i]) {
                (Some(hh), Some(ll)) => Some(-100.0 * (hh - bar.close) / nonzero(hh - ll)),
                _ => None,
            })
            .collect();
        let triggers = values
            .iter()
            .map(|v| band_trigger(*v, self.oversold, self.overbought))
            .collect();

        assemble(series, values, triggers)
    }
}
