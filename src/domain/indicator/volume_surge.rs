//! Volume surge: current volume relative to its rolling mean.
//!
//! Buy-only: fires when volume exceeds `mult` times the average.

use crate::domain::indicator::{assemble, Indicator, IndicatorPoint, Trigger};
use crate::domain::indicator_helpers::{defined, nonzero, rolling_mean};
use crate::domain::ohlcv::PriceSeries;

pub const DEFAULT_LOOKBACK: usize = 20;
pub const DEFAULT_MULT: f64 = 2.0;

#[derive(Debug, Clone, PartialEq)]
pub struct VolumeSurge {
    pub lookback: usize,
    pub mult: f64,
}

impl Default for VolumeSurge {
    fn default() -> Self {
        VolumeSurge {
            lookback: DEFAULT_LOOKBACK,
            mult: DEFAULT_MULT,
        }
    }
}

impl Indicator for VolumeSurge {
    fn lookback(&self) -> usize {
        self.lookback
    }

    fn compute(&self, series: &PriceSeries) -> Vec<IndicatorPoint> {
        let volumes = series.volumes();
        let average = rolling_mean(&defined(&volumes), self.lookback);

        let values: Vec<Option<f64>> = volumes
            .iter()
            .zip(&average)
            .map(|(v, avg)| avg.map(|a| v / nonzero(a)))
            .collect();
        let triggers = values
            .iter()
            .map(|ratio| match ratio {
                Some(r) if *r > self.mult => Trigger::Buy,
                _ => Trigger::Neutral,
            })
            .collect();

        assemble(series, values, triggers)
    }
}
