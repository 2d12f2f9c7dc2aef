//! Price data access port trait.

use crate::domain::error::CryptomindError;
use crate::domain::ohlcv::PriceSeries;

pub trait DataPort {
    /// Full series for one symbol, ascending by timestamp with no duplicates.
    fn fetch_series(&self, symbol: &str, timeframe: &str) -> Result<PriceSeries, CryptomindError>;

    fn list_symbols(&self, timeframe: &str) -> Result<Vec<String>, CryptomindError>;
}
