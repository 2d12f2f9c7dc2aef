//! CSV file data adapter.
//!
//! One file per symbol and timeframe, `<dir>/<SYMBOL>_<timeframe>.csv`, with
//! header `ts,open,high,low,close,volume`. `ts` is RFC 3339 or a bare
//! `YYYY-MM-DD` date (midnight UTC).

use crate::domain::error::CryptomindError;
use crate::domain::ohlcv::{Bar, PriceSeries};
use crate::ports::data_port::DataPort;
use chrono::{DateTime, NaiveDate, Utc};
use std::fs;
use std::path::PathBuf;

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, symbol: &str, timeframe: &str) -> PathBuf {
        self.base_path.join(format!("{}_{}.csv", symbol, timeframe))
    }
}

fn data_err(reason: impl Into<String>) -> CryptomindError {
    CryptomindError::Data {
        reason: reason.into(),
    }
}

pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, CryptomindError> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
        .ok_or_else(|| data_err(format!("invalid timestamp: {raw}")))
}

fn parse_field(
    record: &csv::StringRecord,
    idx: usize,
    name: &str,
) -> Result<f64, CryptomindError> {
    record
        .get(idx)
        .ok_or_else(|| data_err(format!("missing {name} column")))?
        .trim()
        .parse()
        .map_err(|e| data_err(format!("invalid {name} value: {e}")))
}

/// Sort by timestamp; on a repeated timestamp the later row wins.
fn normalize(mut bars: Vec<Bar>) -> Vec<Bar> {
    bars.sort_by_key(|b| b.ts);
    let mut out: Vec<Bar> = Vec::with_capacity(bars.len());
    for bar in bars {
        match out.last_mut() {
            Some(prev) if prev.ts == bar.ts => *prev = bar,
            _ => out.push(bar),
        }
    }
    out
}

impl DataPort for CsvAdapter {
    fn fetch_series(&self, symbol: &str, timeframe: &str) -> Result<PriceSeries, CryptomindError> {
        let path = self.csv_path(symbol, timeframe);
        let content = fs::read_to_string(&path)
            .map_err(|e| data_err(format!("failed to read {}: {}", path.display(), e)))?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut bars = Vec::new();

        for result in rdr.records() {
            let record = result.map_err(|e| data_err(format!("CSV parse error: {}", e)))?;

            let ts = parse_timestamp(record.get(0).ok_or_else(|| data_err("missing ts column"))?)?;

            bars.push(Bar {
                ts,
                open: parse_field(&record, 1, "open")?,
                high: parse_field(&record, 2, "high")?,
                low: parse_field(&record, 3, "low")?,
                close: parse_field(&record, 4, "close")?,
                volume: parse_field(&record, 5, "volume")?,
            });
        }

        let bars = normalize(bars);
        tracing::debug!(
            symbol,
            timeframe,
            bars = bars.len(),
            path = %path.display(),
            "loaded series"
        );
        Ok(PriceSeries::new(bars))
    }

    fn list_symbols(&self, timeframe: &str) -> Result<Vec<String>, CryptomindError> {
        let entries = fs::read_dir(&self.base_path).map_err(|e| {
            data_err(format!(
                "failed to read directory {}: {}",
                self.base_path.display(),
                e
            ))
        })?;

        let suffix = format!("_{}.csv", timeframe);
        let mut symbols = Vec::new();

        for entry in entries {
            let entry = entry.map_err(|e| data_err(format!("directory entry error: {}", e)))?;

            let name = entry.file_name();
            let name_str = name.to_string_lossy();

            if let Some(symbol) = name_str.strip_suffix(&suffix) {
                symbols.push(symbol.to_string());
            }
        }

        symbols.sort();
        Ok(symbols)
    }
}
