#![allow(dead_code)]

use chrono::{DateTime, Duration, TimeZone, Utc};
use cryptomind::domain::error::CryptomindError;
use cryptomind::domain::indicator::IndicatorPoint;
pub use cryptomind::domain::ohlcv::{Bar, PriceSeries};
use cryptomind::ports::audit_port::SignalAuditPort;
use cryptomind::ports::data_port::DataPort;
use std::cell::RefCell;
use std::collections::HashMap;

pub struct MockDataPort {
    pub data: HashMap<String, PriceSeries>,
    pub errors: HashMap<String, String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_series(mut self, symbol: &str, series: PriceSeries) -> Self {
        self.data.insert(symbol.to_string(), series);
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_series(&self, symbol: &str, _timeframe: &str) -> Result<PriceSeries, CryptomindError> {
        if let Some(reason) = self.errors.get(symbol) {
            return Err(CryptomindError::Data {
                reason: reason.clone(),
            });
        }
        self.data
            .get(symbol)
            .cloned()
            .ok_or_else(|| CryptomindError::Data {
                reason: format!("no data for {symbol}"),
            })
    }

    fn list_symbols(&self, _timeframe: &str) -> Result<Vec<String>, CryptomindError> {
        let mut symbols: Vec<String> = self.data.keys().cloned().collect();
        symbols.sort();
        Ok(symbols)
    }
}

/// Audit port that keeps every recorded run in memory.
#[derive(Default)]
pub struct RecordingAudit {
    pub runs: RefCell<Vec<(String, String, String, IndicatorPoint)>>,
}

impl SignalAuditPort for RecordingAudit {
    fn record(
        &self,
        symbol: &str,
        timeframe: &str,
        signal: &str,
        snapshot: &IndicatorPoint,
    ) -> Result<(), CryptomindError> {
        self.runs.borrow_mut().push((
            symbol.to_string(),
            timeframe.to_string(),
            signal.to_string(),
            snapshot.clone(),
        ));
        Ok(())
    }
}

pub fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
}

pub fn make_bar(day: i64, close: f64) -> Bar {
    Bar {
        ts: start() + Duration::days(day),
        open: close - 1.0,
        high: close + 1.0,
        low: close - 2.0,
        close,
        volume: 1000.0,
    }
}

pub fn series_from_closes(closes: &[f64]) -> PriceSeries {
    closes
        .iter()
        .enumerate()
        .map(|(i, &c)| make_bar(i as i64, c))
        .collect::<Vec<_>>()
        .into()
}

/// Every OHLC field at `price`; one bar per volume given.
pub fn flat_series(price: f64, volumes: &[f64]) -> PriceSeries {
    volumes
        .iter()
        .enumerate()
        .map(|(i, &volume)| Bar {
            ts: start() + Duration::hours(i as i64),
            open: price,
            high: price,
            low: price,
            close: price,
            volume,
        })
        .collect::<Vec<_>>()
        .into()
}

pub fn generate_series(count: usize, start_price: f64, step: f64) -> PriceSeries {
    let closes: Vec<f64> = (0..count).map(|i| start_price + step * i as f64).collect();
    series_from_closes(&closes)
}

/// Closes that wander up and down without a trend.
pub fn choppy_series(count: usize) -> PriceSeries {
    let closes: Vec<f64> = (0..count)
        .map(|i| 100.0 + 5.0 * ((i as f64) * 0.7).sin() + ((i * 13) % 7) as f64)
        .collect();
    series_from_closes(&closes)
}
