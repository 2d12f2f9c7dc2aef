//! Stochastic oscillator.
//!
//! %K = 100 × (C - LL(k)) / (HH(k) - LL(k)), zero range replaced by 1e-9
//! %D = SMA(%K, d)
//!
//! The reported value is %K. The trigger needs both lines: Buy when both are
//! below `oversold`, Sell when both are above `overbought`.

use crate::domain::indicator::{assemble, Indicator, IndicatorPoint, Trigger};
use crate::domain::indicator_helpers::{defined, nonzero, rolling_max, rolling_mean, rolling_min};
use crate::domain::ohlcv::PriceSeries;

pub const DEFAULT_K_PERIOD: usize = 14;
pub const DEFAULT_D_PERIOD: usize = 3;
pub const DEFAULT_OVERSOLD: f64 = 20.0;
pub const DEFAULT_OVERBOUGHT: f64 = 80.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Stochastic {
    pub k_period: usize,
    pub d_period: usize,
    pub oversold: f64,
    pub overbought: f64,
}

impl Default for Stochastic {
    fn default() -> Self {
        Stochastic {
            k_period: DEFAULT_K_PERIOD,
            d_period: DEFAULT_D_PERIOD,
            oversold: DEFAULT_OVERSOLD,
            overbought: DEFAULT_OVERBOUGHT,
        }
    }
}

impl Stochastic {
    /// (%K, %D) per bar.
    pub fn lines(&self, series: &PriceSeries) -> (Vec<Option<f64>>, Vec<Option<f64>>) {
        let highest = rolling_max(&defined(&series.highs()), self.k_period);
        let lowest = rolling_min(&defined(&series.lows()), self.k_period);

        let k: Vec<Option<f64>> = series
            .bars()
            .iter()
            .enumerate()
            .map(|(i, bar)| match (highest[i], lowest[i]) {
                (Some(hh), Some(ll)) => Some(100.0 * (bar.close - ll) / nonzero(hh - ll)),
                _ => None,
            })
            .collect();
        let d = rolling_mean(&k, self.d_period);
        (k, d)
    }
}

impl Indicator for Stochastic {
    fn lookback(&self) -> usize {
        self.k_period
    }

    fn compute(&self, series: &PriceSeries) -> Vec<IndicatorPoint> {
        let (k, d) = self.lines(series);
        let triggers = k
            .iter()
            .zip(&d)
            .map(|(k, d)| match (k, d) {
                (Some(k), Some(d)) if *k < self.oversold && *d < self.oversold => Trigger::Buy,
                (Some(k), Some(d)) if *k > self.overbought && *d > self.overbought => {
                    Trigger::Sell
                }
                _ => Trigger::Neutral,
            })
            .collect();
        assemble(series, k, triggers)
    }
}
