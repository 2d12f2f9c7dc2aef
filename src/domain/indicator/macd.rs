//! MACD (Moving Average Convergence Divergence).
//!
//! MACD Line = EMA(fast) - EMA(slow)
//! Signal Line = EMA(signal) of MACD Line
//!
//! Every EMA is seeded by its first input, so the line is defined from the
//! first bar. The reported value is the MACD line; the trigger fires when
//! the line crosses the signal line.

use crate::domain::indicator::{assemble, Indicator, IndicatorPoint};
use crate::domain::indicator_helpers::{crossings, ema};
use crate::domain::ohlcv::PriceSeries;

pub const DEFAULT_FAST: usize = 12;
pub const DEFAULT_SLOW: usize = 26;
pub const DEFAULT_SIGNAL: usize = 9;

#[derive(Debug, Clone, PartialEq)]
pub struct Macd {
    pub fast: usize,
    pub slow: usize,
    pub signal: usize,
}

impl Default for Macd {
    fn default() -> Self {
        Macd {
            fast: DEFAULT_FAST,
            slow: DEFAULT_SLOW,
            signal: DEFAULT_SIGNAL,
        }
    }
}

impl Macd {
    /// (MACD line, signal line) per bar.
    pub fn lines(&self, series: &PriceSeries) -> (Vec<f64>, Vec<f64>) {
        let closes = series.closes();
        let fast = ema(&closes, self.fast);
        let slow = ema(&closes, self.slow);
        let line: Vec<f64> = fast.iter().zip(&slow).map(|(f, s)| f - s).collect();
        let signal = ema(&line, self.signal);
        (line, signal)
    }
}

impl Indicator for Macd {
    fn lookback(&self) -> usize {
        1
    }

    fn compute(&self, series: &PriceSeries) -> Vec<IndicatorPoint> {
        let (line, signal) = self.lines(series);
        let spread: Vec<Option<f64>> = line.iter().zip(&signal).map(|(m, s)| Some(m - s)).collect();
        let triggers = crossings(&spread);
        assemble(series, line.into_iter().map(Some).collect(), triggers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::indicator::{make_series, Trigger};
    use crate::domain::indicator_helpers;
    use approx::assert_relative_eq;

    #[test]
    fn macd_line_is_ema_fast_minus_ema_slow() {
        let closes = [10.0, 20.0, 30.0, 40.0, 50.0, 60.0, 70.0, 80.0, 90.0, 100.0];
        let series = make_series(&closes);
        let macd = Macd {
            fast: 3,
            slow: 5,
            signal: 2,
        };
        let points = macd.compute(&series);

        let fast = indicator_helpers::ema(&closes, 3);
        let slow = indicator_helpers::ema(&closes, 5);
        for (i, p) in points.iter().enumerate() {
            assert_relative_eq!(p.value.unwrap(), fast[i] - slow[i]);
        }
    }

    #[test]
    fn macd_starts_at_zero() {
        let points = Macd::default().compute(&make_series(&[100.0, 101.0]));
        assert_eq!(points[0].value, Some(0.0));
        assert_eq!(points[0].trigger, Trigger::Neutral);
    }

    #[test]
    fn macd_flat_prices_never_cross() {
        let points = Macd::default().compute(&make_series(&[50.0; 40]));
        assert!(points.iter().all(|p| p.trigger == Trigger::Neutral));
        assert!(points.iter().all(|p| p.value == Some(0.0)));
    }

    #[test]
    fn macd_crosses_up_on_rally_and_down_on_selloff() {
        let mut closes = vec![100.0; 10];
        closes.extend((1..=10).map(|i| 100.0 + 3.0 * i as f64));
        closes.extend((1..=15).map(|i| 130.0 - 4.0 * i as f64));
        let macd = Macd {
            fast: 3,
            slow: 6,
            signal: 3,
        };
        let points = macd.compute(&make_series(&closes));

        let first_buy = points.iter().position(|p| p.trigger == Trigger::Buy);
        let first_sell = points.iter().position(|p| p.trigger == Trigger::Sell);
        assert_eq!(first_buy, Some(10));
        // first down bar drags the line under its lagging signal
        assert_eq!(first_sell, Some(20));
    }

    #[test]
    fn macd_lines_signal_is_ema_of_line() {
        let closes: Vec<f64> = (0..20).map(|i| 100.0 + (i as f64).sin() * 5.0).collect();
        let macd = Macd::default();
        let (line, signal) = macd.lines(&make_series(&closes));
        assert_eq!(signal, indicator_helpers::ema(&line, DEFAULT_SIGNAL));
    }

    #[test]
    fn macd_default_constants() {
        assert_eq!(DEFAULT_FAST, 12);
        assert_eq!(DEFAULT_SLOW, 26);
        assert_eq!(DEFAULT_SIGNAL, 9);
    }
}
