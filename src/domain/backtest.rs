//! Backtest simulator.
//!
//! Replays the summed trigger series bar by bar through an all-in/all-out
//! state machine. The position mask is 1 while the trigger sum is positive
//! and 0 otherwise; every change of mask is a trade, executed at the bar's
//! close with the fee taken from the traded notional.

use chrono::{DateTime, Utc};
use std::fmt;

use crate::domain::error::CryptomindError;
use crate::domain::indicator::Indicator;
use crate::domain::ohlcv::PriceSeries;
use crate::domain::signal::{resolve_all, SignalConfig};

pub const DEFAULT_INITIAL_CASH: f64 = 10_000.0;
pub const DEFAULT_FEE_BPS: f64 = 10.0;
/// A fee of 100% of the traded notional.
pub const MAX_FEE_BPS: f64 = 10_000.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BacktestConfig {
    pub initial_cash: f64,
    pub fee_bps: f64,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        BacktestConfig {
            initial_cash: DEFAULT_INITIAL_CASH,
            fee_bps: DEFAULT_FEE_BPS,
        }
    }
}

impl BacktestConfig {
    pub fn validate(&self) -> Result<(), CryptomindError> {
        if !(self.initial_cash.is_finite() && self.initial_cash > 0.0) {
            return Err(CryptomindError::invalid_param(
                "backtest",
                "initial_cash",
                format!("must be positive, got {}", self.initial_cash),
            ));
        }
        if !(0.0..=MAX_FEE_BPS).contains(&self.fee_bps) {
            return Err(CryptomindError::invalid_param(
                "backtest",
                "fee_bps",
                format!("must be within 0..={MAX_FEE_BPS}, got {}", self.fee_bps),
            ));
        }
        Ok(())
    }

    pub fn fee_rate(&self) -> f64 {
        self.fee_bps / 10_000.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize), serde(rename_all = "UPPERCASE"))]
pub enum Side {
    Buy,
    Sell,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Buy => f.write_str("BUY"),
            Side::Sell => f.write_str("SELL"),
        }
    }
}

/// One executed trade. `quantity` is in coin; `fee` is in cash terms.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Fill {
    pub ts: DateTime<Utc>,
    pub side: Side,
    pub price: f64,
    pub quantity: f64,
    pub fee: f64,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct BacktestResult {
    pub final_equity: f64,
    pub return_ratio: f64,
    pub trade_count: usize,
    pub fills: Vec<Fill>,
}

struct SimulatorState {
    cash: f64,
    coin_amount: f64,
}

impl SimulatorState {
    fn buy(&mut self, ts: DateTime<Utc>, price: f64, fee_rate: f64) -> Fill {
        let fee = self.cash * fee_rate;
        let quantity = self.cash * (1.0 - fee_rate) / price;
        self.coin_amount += quantity;
        self.cash = 0.0;
        Fill {
            ts,
            side: Side::Buy,
            price,
            quantity,
            fee,
        }
    }

    fn sell(&mut self, ts: DateTime<Utc>, price: f64, fee_rate: f64) -> Fill {
        let notional = self.coin_amount * price;
        let quantity = self.coin_amount;
        self.cash += notional * (1.0 - fee_rate);
        self.coin_amount = 0.0;
        Fill {
            ts,
            side: Side::Sell,
            price,
            quantity,
            fee: notional * fee_rate,
        }
    }

    fn equity(&self, price: f64) -> f64 {
        self.cash + self.coin_amount * price
    }
}

/// Per-bar sum of trigger values across signals.
fn summed_triggers(
    series: &PriceSeries,
    configs: &[SignalConfig],
) -> Result<Vec<i32>, CryptomindError> {
    let signals = resolve_all(configs)?;
    if series.is_empty() {
        return Err(CryptomindError::EmptySeries);
    }

    let mut sums = vec![0i32; series.len()];
    for (_, signal) in &signals {
        for (sum, point) in sums.iter_mut().zip(signal.compute(series)) {
            *sum += i32::from(point.trigger.as_i8());
        }
    }
    Ok(sums)
}

pub fn run_backtest(
    series: &PriceSeries,
    configs: &[SignalConfig],
    config: &BacktestConfig,
) -> Result<BacktestResult, CryptomindError> {
    config.validate()?;
    let sums = summed_triggers(series, configs)?;
    let fee_rate = config.fee_rate();

    let mut state = SimulatorState {
        cash: config.initial_cash,
        coin_amount: 0.0,
    };
    let mut fills = Vec::new();
    let mut trade_count = 0usize;
    let mut prev_position = false;

    for (bar, sum) in series.bars().iter().zip(sums) {
        let position = sum > 0;
        if position != prev_position {
            trade_count += 1;
            let fill = if position {
                Some(state.buy(bar.ts, bar.close, fee_rate))
            } else if state.coin_amount > 0.0 {
                Some(state.sell(bar.ts, bar.close, fee_rate))
            } else {
                None
            };
            if let Some(fill) = fill {
                tracing::debug!(
                    ts = %fill.ts,
                    side = %fill.side,
                    price = fill.price,
                    quantity = fill.quantity,
                    fee = fill.fee,
                    "fill"
                );
                fills.push(fill);
            }
        }
        prev_position = position;
    }

    let last_close = series.last().map(|b| b.close).unwrap_or_default();
    let final_equity = state.equity(last_close);
    let return_ratio = final_equity / config.initial_cash - 1.0;

    tracing::info!(
        bars = series.len(),
        trades = trade_count,
        final_equity,
        return_ratio,
        "backtest finished"
    );

    Ok(BacktestResult {
        final_equity,
        return_ratio,
        trade_count,
        fills,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::indicator::{make_flat_series, make_series};
    use approx::assert_relative_eq;

    fn config(initial_cash: f64, fee_bps: f64) -> BacktestConfig {
        BacktestConfig {
            initial_cash,
            fee_bps,
        }
    }

    /// Fires on a bar whose volume is well above the previous bar's.
    fn surge() -> SignalConfig {
        SignalConfig::new("volume_surge")
            .with_param("lookback", 2.0)
            .with_param("mult", 1.2)
    }

    #[test]
    fn defaults() {
        let c = BacktestConfig::default();
        assert_relative_eq!(c.initial_cash, 10_000.0);
        assert_relative_eq!(c.fee_bps, 10.0);
        assert_relative_eq!(c.fee_rate(), 0.001);
    }

    #[test]
    fn no_signals_stays_in_cash() {
        let series = make_series(&[100.0, 110.0, 90.0]);
        let result = run_backtest(&series, &[], &BacktestConfig::default()).unwrap();
        assert_eq!(result.final_equity, 10_000.0);
        assert_eq!(result.return_ratio, 0.0);
        assert_eq!(result.trade_count, 0);
        assert!(result.fills.is_empty());
    }

    #[test]
    fn buy_then_sell_on_flat_price_with_fee() {
        // volume 100, 1000, 100: ratio at bar 1 is 1000/550 > 1.2, bar 2 is 100/550
        let series = make_flat_series(&[100.0; 3], &[100.0, 1000.0, 100.0]);
        let result = run_backtest(&series, &[surge()], &config(10_000.0, 100.0)).unwrap();

        assert_relative_eq!(result.final_equity, 9801.0, epsilon = 1e-9);
        assert_eq!(result.trade_count, 2);
        assert_eq!(result.fills.len(), 2);
        assert_eq!(result.fills[0].side, Side::Buy);
        assert_relative_eq!(result.fills[0].quantity, 99.0, epsilon = 1e-9);
        assert_relative_eq!(result.fills[0].fee, 100.0, epsilon = 1e-9);
        assert_eq!(result.fills[1].side, Side::Sell);
        assert_relative_eq!(result.fills[1].fee, 99.0, epsilon = 1e-9);
    }

    #[test]
    fn flat_price_without_fee_preserves_equity() {
        let volumes = [100.0, 1000.0, 100.0, 1000.0, 100.0, 1000.0, 100.0];
        let series = make_flat_series(&[250.0; 7], &volumes);
        let result = run_backtest(&series, &[surge()], &config(10_000.0, 0.0)).unwrap();

        assert_eq!(result.trade_count, 6);
        assert_eq!(result.final_equity, 10_000.0);
    }

    #[test]
    fn open_position_marked_at_last_close() {
        let series = make_flat_series(&[100.0, 100.0], &[100.0, 1000.0]);
        let result = run_backtest(&series, &[surge()], &config(1_000.0, 0.0)).unwrap();

        assert_eq!(result.trade_count, 1);
        assert_relative_eq!(result.final_equity, 1_000.0);
        assert_eq!(result.fills.len(), 1);
    }

    #[test]
    fn rally_pays_while_long() {
        // volume spike at bar 1 buys at 100; bar 2 exits at 150
        let series = make_flat_series(&[100.0, 100.0, 150.0], &[100.0, 1000.0, 100.0]);
        let result = run_backtest(&series, &[surge()], &config(1_000.0, 0.0)).unwrap();
        assert_relative_eq!(result.final_equity, 1_500.0);
        assert_relative_eq!(result.return_ratio, 0.5);
    }

    #[test]
    fn opposing_triggers_cancel() {
        // rsi sells the rally, volume_surge buys the spike: sum is zero
        let closes: Vec<f64> = (0..6).map(|i| 100.0 + i as f64).collect();
        let mut volumes = vec![100.0; 5];
        volumes.push(1000.0);
        let series = make_flat_series(&closes, &volumes);
        let configs = [
            SignalConfig::new("rsi").with_param("period", 2.0),
            surge(),
        ];
        let result = run_backtest(&series, &configs, &config(1_000.0, 0.0)).unwrap();
        assert_eq!(result.trade_count, 0);
    }

    #[test]
    fn empty_series_fails() {
        let err =
            run_backtest(&PriceSeries::default(), &[], &BacktestConfig::default()).unwrap_err();
        assert!(matches!(err, CryptomindError::EmptySeries));
    }

    #[test]
    fn unknown_signal_fails_first() {
        let err = run_backtest(
            &PriceSeries::default(),
            &[SignalConfig::new("vwap")],
            &BacktestConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, CryptomindError::UnknownSignal { .. }));
    }

    #[test]
    fn invalid_config_rejected() {
        let series = make_series(&[1.0]);
        for bad in [
            config(0.0, 10.0),
            config(-5.0, 10.0),
            config(100.0, -1.0),
            config(100.0, f64::NAN),
            config(100.0, 20_000.0),
        ] {
            assert!(matches!(
                run_backtest(&series, &[], &bad),
                Err(CryptomindError::InvalidParameter { .. })
            ));
        }
    }

    #[test]
    fn fee_above_full_notional_rejected() {
        let series = make_flat_series(&[100.0; 3], &[100.0, 1000.0, 100.0]);
        let err = run_backtest(&series, &[surge()], &config(10_000.0, 10_001.0)).unwrap_err();
        assert!(matches!(err, CryptomindError::InvalidParameter { key, .. } if key == "fee_bps"));
    }

    #[test]
    fn full_notional_fee_never_goes_negative() {
        let series = make_flat_series(&[100.0; 3], &[100.0, 1000.0, 100.0]);
        let result = run_backtest(&series, &[surge()], &config(10_000.0, MAX_FEE_BPS)).unwrap();

        assert_eq!(result.fills.len(), 1);
        assert_eq!(result.fills[0].quantity, 0.0);
        assert_eq!(result.final_equity, 0.0);
        assert_eq!(result.trade_count, 2);
    }
}
