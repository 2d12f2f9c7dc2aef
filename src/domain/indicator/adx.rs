//! ADX: Average Directional Index.
//!
//! Steps:
//! 1. True range and +DM/-DM from consecutive bars (TR needs a previous close)
//! 2. Smooth TR, +DM, -DM with an n-bar rolling mean
//! 3. +DI = 100 * smoothed(+DM) / smoothed(TR), same for -DI
//! 4. DX = 100 * |+DI - -DI| / (+DI + -DI)
//! 5. ADX = SMA(DX, n)
//!
//! Zero denominators are replaced by 1e-9. First ADX value lands at bar 2n - 1.

use crate::domain::indicator::{assemble, Indicator, IndicatorPoint, Trigger};
use crate::domain::indicator_helpers::{nonzero, rolling_mean};
use crate::domain::ohlcv::PriceSeries;

pub const DEFAULT_PERIOD: usize = 14;
pub const DEFAULT_THRESHOLD: f64 = 25.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Adx {
    pub period: usize,
    pub adx_threshold: f64,
}

impl Default for Adx {
    fn default() -> Self {
        Adx {
            period: DEFAULT_PERIOD,
            adx_threshold: DEFAULT_THRESHOLD,
        }
    }
}

/// Per-bar directional readings.
#[derive(Debug, Clone, PartialEq)]
pub struct DirectionalLines {
    pub plus_di: Vec<Option<f64>>,
    pub minus_di: Vec<Option<f64>>,
    pub adx: Vec<Option<f64>>,
}

impl Adx {
    pub fn lines(&self, series: &PriceSeries) -> DirectionalLines {
        let bars = series.bars();
        let n = bars.len();

        let mut tr = vec![None; n];
        let mut plus_dm = vec![Some(0.0); n];
        let mut minus_dm = vec![Some(0.0); n];
        for i in 1..n {
            tr[i] = Some(bars[i].true_range(bars[i - 1].close));

            let up = bars[i].high - bars[i - 1].high;
            let down = bars[i - 1].low - bars[i].low;
            if up > down {
                plus_dm[i] = Some(up.max(0.0));
            }
            if down > up {
                minus_dm[i] = Some(down.max(0.0));
            }
        }

        let tr_smooth = rolling_mean(&tr, self.period);
        let plus_smooth = rolling_mean(&plus_dm, self.period);
        let minus_smooth = rolling_mean(&minus_dm, self.period);

        let mut plus_di = vec![None; n];
        let mut minus_di = vec![None; n];
        let mut dx = vec![None; n];
        for i in 0..n {
            if let (Some(tr), Some(p), Some(m)) = (tr_smooth[i], plus_smooth[i], minus_smooth[i]) {
                let pdi = 100.0 * p / nonzero(tr);
                let mdi = 100.0 * m / nonzero(tr);
                plus_di[i] = Some(pdi);
                minus_di[i] = Some(mdi);
                dx[i] = Some(100.0 * (pdi - mdi).abs() / nonzero(pdi + mdi));
            }
        }

        DirectionalLines {
            plus_di,
            minus_di,
            adx: rolling_mean(&dx, self.period),
        }
    }
}

impl Indicator for Adx {
    fn lookback(&self) -> usize {
        self.period.saturating_mul(2)
    }

    fn compute(&self, series: &PriceSeries) -> Vec<IndicatorPoint> {
        let lines = self.lines(series);
        let triggers = (0..series.len())
            .map(|i| match (lines.adx[i], lines.plus_di[i], lines.minus_di[i]) {
                (Some(adx), Some(p), Some(m)) if adx > self.adx_threshold => {
                    if p > m {
                        Trigger::Buy
                    } else if m > p {
                        Trigger::Sell
                    } else {
                        Trigger::Neutral
                    }
                }
                _ => Trigger::Neutral,
            })
            .collect();
        assemble(series, lines.adx, triggers)
    }
}
