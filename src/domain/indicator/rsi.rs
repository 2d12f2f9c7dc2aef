//! RSI (Relative Strength Index).
//!
//! Average gain/loss are simple means of the last n close-to-close changes:
//! RSI = 100 - (100 / (1 + avg_gain / avg_loss)), with a zero avg_loss
//! replaced by 1e-9 so a pure uptrend reads just under 100.
//!
//! Warmup: first n bars are undefined (n changes need n + 1 closes).

use crate::domain::indicator::{assemble, Indicator, IndicatorPoint};
use crate::domain::indicator_helpers::{band_trigger, nonzero, rolling_mean};
use crate::domain::ohlcv::PriceSeries;

pub const DEFAULT_PERIOD: usize = 14;
pub const DEFAULT_OVERSOLD: f64 = 30.0;
pub const DEFAULT_OVERBOUGHT: f64 = 70.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Rsi {
    pub period: usize,
    pub oversold: f64,
    pub overbought: f64,
}

impl Default for Rsi {
    fn default() -> Self {
        Rsi {
            period: DEFAULT_PERIOD,
            oversold: DEFAULT_OVERSOLD,
            overbought: DEFAULT_OVERBOUGHT,
        }
    }
}

impl Indicator for Rsi {
    fn lookback(&self) -> usize {
        self.period.saturating_add(1)
    }

    fn compute(&self, series: &PriceSeries) -> Vec<IndicatorPoint> {
        let closes = series.closes();
        let mut gains = vec![None; closes.len()];
        let mut losses = vec![None; closes.len()];
        for i in 1..closes.len() {
            let change = closes[i] - closes[i - 1];
            gains[i] = Some(change.max(0.0));
            losses[i] = Some((-change).max(0.0));
        }

        let avg_gain = rolling_mean(&gains, self.period);
        let avg_loss = rolling_mean(&losses, self.period);

        let values: Vec<Option<f64>> = avg_gain
            .iter()
            .zip(&avg_loss)
            .map(|(g, l)| match (g, l) {
                (Some(g), Some(l)) => Some(100.0 - 100.0 / (1.0 + g / nonzero(*l))),
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
