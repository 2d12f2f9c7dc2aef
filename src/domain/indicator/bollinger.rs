//! Bollinger Bands, reported as a z-score.
//!
//! - Middle: SMA of close over n periods
//! - Upper/Lower: Middle ± (multiplier × StdDev)
//! - Value: (close - Middle) / StdDev, with a zero StdDev replaced by 1e-9
//!
//! StdDev is the sample deviation (divides by N - 1).
//! Warmup: first (period - 1) bars are undefined.

use crate::domain::indicator::{assemble, Indicator, IndicatorPoint, Trigger};
use crate::domain::indicator_helpers::{defined, nonzero, rolling_mean, rolling_sample_std};
use crate::domain::ohlcv::PriceSeries;

pub const DEFAULT_PERIOD: usize = 20;
pub const DEFAULT_MULT: f64 = 2.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Bollinger {
    pub period: usize,
    pub mult: f64,
}

impl Default for Bollinger {
    fn default() -> Self {
        Bollinger {
            period: DEFAULT_PERIOD,
            mult: DEFAULT_MULT,
        }
    }
}

impl Indicator for Bollinger {
    fn lookback(&self) -> usize {
        self.period.max(2)
    }

    fn compute(&self, series: &PriceSeries) -> Vec<IndicatorPoint> {
        let closes = series.closes();
        let input = defined(&closes);
        let middle = rolling_mean(&input, self.period);
        let stddev = rolling_sample_std(&input, self.period);

        let mut values = Vec::with_capacity(closes.len());
        let mut triggers = Vec::with_capacity(closes.len());
        for (i, &close) in closes.iter().enumerate() {
            match (middle[i], stddev[i]) {
                (Some(mid), Some(sd)) => {
                    values.push(Some((close - mid) / nonzero(sd)));
                    let trigger = if close > mid + self.mult * sd {
                        Trigger::Sell
                    } else if close < mid - self.mult * sd {
                        Trigger::Buy
                    } else {
                        Trigger::Neutral
                    };
                    triggers.push(trigger);
                }
                _ => {
                    values.push(None);
                    triggers.push(Trigger::Neutral);
                }
            }
        }

        assemble(series, values, triggers)
    }
}
