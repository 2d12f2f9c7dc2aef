//! Side-by-side performance summary over the tail of a price series.

use crate::domain::error::CryptomindError;
use crate::domain::ohlcv::PriceSeries;

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct PerformanceSummary {
    pub symbol: String,
    pub total_return: f64,
    pub volatility: f64,
    pub last: f64,
}

/// Summarize the last `limit` closes (`0` = the whole series).
///
/// Volatility is the population standard deviation of bar-to-bar simple
/// returns.
pub fn summarize(
    symbol: &str,
    series: &PriceSeries,
    limit: usize,
) -> Result<PerformanceSummary, CryptomindError> {
    let closes = series.tail(limit).closes();
    let (first, last) = match (closes.first(), closes.last()) {
        (Some(&first), Some(&last)) if closes.len() >= 2 => (first, last),
        _ => {
            return Err(CryptomindError::InsufficientData {
                symbol: symbol.to_string(),
                bars: closes.len(),
                minimum: 2,
            });
        }
    };

    let returns: Vec<f64> = closes.windows(2).map(|w| w[1] / w[0] - 1.0).collect();

    Ok(PerformanceSummary {
        symbol: symbol.to_string(),
        total_return: last / first - 1.0,
        volatility: population_std(&returns),
        last,
    })
}

fn population_std(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    var.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::indicator::make_series;
    use approx::assert_relative_eq;

    #[test]
    fn total_return_and_last() {
        let summary = summarize("BTC", &make_series(&[100.0, 110.0, 120.0]), 0).unwrap();
        assert_eq!(summary.symbol, "BTC");
        assert_relative_eq!(summary.total_return, 0.2);
        assert_relative_eq!(summary.last, 120.0);
    }

    #[test]
    fn volatility_of_alternating_returns() {
        // returns +10%, -10%, +10%, -10%
        let summary = summarize("ETH", &make_series(&[100.0, 110.0, 99.0, 108.9, 98.01]), 0)
            .unwrap();
        assert_relative_eq!(summary.volatility, 0.1, epsilon = 1e-12);
    }

    #[test]
    fn single_return_has_zero_volatility() {
        let summary = summarize("SOL", &make_series(&[10.0, 12.0]), 0).unwrap();
        assert_eq!(summary.volatility, 0.0);
        assert_relative_eq!(summary.total_return, 0.2, epsilon = 1e-12);
    }

    #[test]
    fn constant_prices() {
        let summary = summarize("USDT", &make_series(&[1.0; 10]), 0).unwrap();
        assert_eq!(summary.total_return, 0.0);
        assert_eq!(summary.volatility, 0.0);
    }

    #[test]
    fn limit_restricts_window() {
        let summary = summarize("BTC", &make_series(&[50.0, 100.0, 110.0]), 2).unwrap();
        assert_relative_eq!(summary.total_return, 0.1, epsilon = 1e-12);
    }

    #[test]
    fn too_few_bars() {
        let err = summarize("BTC", &make_series(&[100.0]), 0).unwrap_err();
        assert!(matches!(
            err,
            CryptomindError::InsufficientData { bars: 1, minimum: 2, .. }
        ));

        let err = summarize("BTC", &make_series(&[100.0, 101.0]), 1).unwrap_err();
        assert!(matches!(err, CryptomindError::InsufficientData { bars: 1, .. }));

        let err = summarize("BTC", &PriceSeries::default(), 0).unwrap_err();
        assert!(matches!(err, CryptomindError::InsufficientData { bars: 0, .. }));
    }
}
