//! Technical indicator implementations.
//!
//! Every indicator maps a [`PriceSeries`] to one [`IndicatorPoint`] per bar:
//! - `value` is `None` while the indicator lacks the history it needs
//! - `trigger` is always concrete and stays [`Trigger::Neutral`] during warm-up
//!
//! Indicators hold only their parameters, so `compute` is pure and the same
//! input always yields bit-identical output.

pub mod adx;
pub mod bollinger;
pub mod ema;
pub mod macd;
pub mod rsi;
pub mod stochastic;
pub mod volume_surge;
pub mod williams_r;

pub use adx::Adx;
pub use bollinger::Bollinger;
pub use ema::Ema;
pub use macd::Macd;
pub use rsi::Rsi;
pub use stochastic::Stochastic;
pub use volume_surge::VolumeSurge;
pub use williams_r::WilliamsR;

use chrono::{DateTime, Utc};

use crate::domain::ohlcv::PriceSeries;

/// Discrete per-bar signal outcome.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize), serde(into = "i8"))]
pub enum Trigger {
    Sell,
    #[default]
    Neutral,
    Buy,
}

impl Trigger {
    pub fn as_i8(self) -> i8 {
        match self {
            Trigger::Sell => -1,
            Trigger::Neutral => 0,
            Trigger::Buy => 1,
        }
    }
}

impl From<Trigger> for i8 {
    fn from(trigger: Trigger) -> i8 {
        trigger.as_i8()
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct IndicatorPoint {
    pub ts: DateTime<Utc>,
    pub value: Option<f64>,
    pub trigger: Trigger,
}

pub trait Indicator {
    /// Bars needed before the first defined value.
    fn lookback(&self) -> usize;

    fn compute(&self, series: &PriceSeries) -> Vec<IndicatorPoint>;
}

/// Zip per-bar values and triggers back onto the series timestamps.
pub(crate) fn assemble(
    series: &PriceSeries,
    values: Vec<Option<f64>>,
    triggers: Vec<Trigger>,
) -> Vec<IndicatorPoint> {
    series
        .bars()
        .iter()
        .zip(values)
        .zip(triggers)
        .map(|((bar, value), trigger)| IndicatorPoint {
            ts: bar.ts,
            value,
            trigger,
        })
        .collect()
}

/// Build a daily series from closes; open = previous close, high/low one
/// point either side, constant volume.
#[cfg(test)]
pub(crate) fn make_series(closes: &[f64]) -> PriceSeries {
    use crate::domain::ohlcv::Bar;
    use chrono::TimeZone;

    let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let bars = closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            Bar {
                ts: start + chrono::Duration::days(i as i64),
                open,
                high: open.max(close) + 1.0,
                low: open.min(close) - 1.0,
                close,
                volume: 1000.0,
            }
        })
        .collect();
    PriceSeries::new(bars)
}

/// Build a series where every OHLC field equals the close and volume is given.
#[cfg(test)]
pub(crate) fn make_flat_series(closes: &[f64], volumes: &[f64]) -> PriceSeries {
    use crate::domain::ohlcv::Bar;
    use chrono::TimeZone;

    let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let bars = closes
        .iter()
        .zip(volumes)
        .enumerate()
        .map(|(i, (&close, &volume))| Bar {
            ts: start + chrono::Duration::hours(i as i64),
            open: close,
            high: close,
            low: close,
            close,
            volume,
        })
        .collect();
    PriceSeries::new(bars)
}
