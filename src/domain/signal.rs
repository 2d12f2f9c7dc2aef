//! Signal dispatch: named configurations resolved to indicator implementations.
//!
//! The indicator set is closed. A name resolves through [`SignalKind`] to a
//! [`Signal`] holding fully validated, typed parameters; caller-supplied
//! params are layered over the kind's defaults and unknown keys are ignored.

use std::collections::BTreeMap;
use std::fmt;

use crate::domain::error::CryptomindError;
use crate::domain::indicator::{
    Adx, Bollinger, Ema, Indicator, IndicatorPoint, Macd, Rsi, Stochastic, VolumeSurge, WilliamsR,
};
use crate::domain::ohlcv::PriceSeries;
use crate::ports::audit_port::SignalAuditPort;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SignalKind {
    Ema,
    Rsi,
    Macd,
    Bollinger,
    VolumeSurge,
    Stochastic,
    WilliamsR,
    Adx,
}

impl SignalKind {
    pub const ALL: [SignalKind; 8] = [
        SignalKind::Ema,
        SignalKind::Rsi,
        SignalKind::Macd,
        SignalKind::Bollinger,
        SignalKind::VolumeSurge,
        SignalKind::Stochastic,
        SignalKind::WilliamsR,
        SignalKind::Adx,
    ];

    pub fn name(self) -> &'static str {
        match self {
            SignalKind::Ema => "ema",
            SignalKind::Rsi => "rsi",
            SignalKind::Macd => "macd",
            SignalKind::Bollinger => "bollinger",
            SignalKind::VolumeSurge => "volume_surge",
            SignalKind::Stochastic => "stochastic",
            SignalKind::WilliamsR => "williams_r",
            SignalKind::Adx => "adx",
        }
    }

    /// Case-sensitive lookup.
    pub fn from_name(name: &str) -> Option<SignalKind> {
        SignalKind::ALL.into_iter().find(|k| k.name() == name)
    }

    pub fn default_params(self) -> &'static [(&'static str, f64)] {
        match self {
            SignalKind::Ema => &[("period", 20.0)],
            SignalKind::Rsi => &[("period", 14.0), ("oversold", 30.0), ("overbought", 70.0)],
            SignalKind::Macd => &[("fast", 12.0), ("slow", 26.0), ("signal", 9.0)],
            SignalKind::Bollinger => &[("period", 20.0), ("mult", 2.0)],
            SignalKind::VolumeSurge => &[("lookback", 20.0), ("mult", 2.0)],
            SignalKind::Stochastic => &[
                ("k_period", 14.0),
                ("d_period", 3.0),
                ("oversold", 20.0),
                ("overbought", 80.0),
            ],
            SignalKind::WilliamsR => &[
                ("period", 14.0),
                ("oversold", -80.0),
                ("overbought", -20.0),
            ],
            SignalKind::Adx => &[("period", 14.0), ("adx_threshold", 25.0)],
        }
    }
}

impl fmt::Display for SignalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SignalConfig {
    pub name: String,
    pub params: BTreeMap<String, f64>,
}

impl SignalConfig {
    pub fn new(name: impl Into<String>) -> Self {
        SignalConfig {
            name: name.into(),
            params: BTreeMap::new(),
        }
    }

    pub fn with_param(mut self, key: impl Into<String>, value: f64) -> Self {
        self.params.insert(key.into(), value);
        self
    }
}

/// A resolved signal: one variant per indicator, parameters already typed.
#[derive(Debug, Clone, PartialEq)]
pub enum Signal {
    Ema(Ema),
    Rsi(Rsi),
    Macd(Macd),
    Bollinger(Bollinger),
    VolumeSurge(VolumeSurge),
    Stochastic(Stochastic),
    WilliamsR(WilliamsR),
    Adx(Adx),
}

impl Signal {
    pub fn kind(&self) -> SignalKind {
        match self {
            Signal::Ema(_) => SignalKind::Ema,
            Signal::Rsi(_) => SignalKind::Rsi,
            Signal::Macd(_) => SignalKind::Macd,
            Signal::Bollinger(_) => SignalKind::Bollinger,
            Signal::VolumeSurge(_) => SignalKind::VolumeSurge,
            Signal::Stochastic(_) => SignalKind::Stochastic,
            Signal::WilliamsR(_) => SignalKind::WilliamsR,
            Signal::Adx(_) => SignalKind::Adx,
        }
    }

    fn indicator(&self) -> &dyn Indicator {
        match self {
            Signal::Ema(i) => i,
            Signal::Rsi(i) => i,
            Signal::Macd(i) => i,
            Signal::Bollinger(i) => i,
            Signal::VolumeSurge(i) => i,
            Signal::Stochastic(i) => i,
            Signal::WilliamsR(i) => i,
            Signal::Adx(i) => i,
        }
    }
}

impl Indicator for Signal {
    fn lookback(&self) -> usize {
        self.indicator().lookback()
    }

    fn compute(&self, series: &PriceSeries) -> Vec<IndicatorPoint> {
        self.indicator().compute(series)
    }
}

/// Defaults overlaid with caller params for one signal.
struct MergedParams<'a> {
    signal: &'a str,
    values: BTreeMap<&'a str, f64>,
}

impl<'a> MergedParams<'a> {
    fn merge(kind: SignalKind, config: &'a SignalConfig) -> Self {
        let mut values: BTreeMap<&'a str, f64> = kind.default_params().iter().copied().collect();
        for (key, value) in &config.params {
            values.insert(key.as_str(), *value);
        }
        MergedParams {
            signal: kind.name(),
            values,
        }
    }

    fn number(&self, key: &str) -> Result<f64, CryptomindError> {
        let value = self
            .values
            .get(key)
            .copied()
            .ok_or_else(|| CryptomindError::invalid_param(self.signal, key, "missing"))?;
        if !value.is_finite() {
            return Err(CryptomindError::invalid_param(
                self.signal,
                key,
                format!("must be finite, got {value}"),
            ));
        }
        Ok(value)
    }

    /// Periods are truncated toward zero and must end up >= 1.
    fn period(&self, key: &str) -> Result<usize, CryptomindError> {
        let value = self.number(key)?;
        let truncated = value.trunc();
        if truncated < 1.0 {
            return Err(CryptomindError::invalid_param(
                self.signal,
                key,
                format!("must be a positive period, got {value}"),
            ));
        }
        Ok(truncated as usize)
    }
}

/// Resolve one config; fails before touching any price data.
pub fn resolve(config: &SignalConfig) -> Result<Signal, CryptomindError> {
    let kind = SignalKind::from_name(&config.name).ok_or_else(|| CryptomindError::UnknownSignal {
        name: config.name.clone(),
    })?;
    let p = MergedParams::merge(kind, config);

    let signal = match kind {
        SignalKind::Ema => Signal::Ema(Ema {
            period: p.period("period")?,
        }),
        SignalKind::Rsi => Signal::Rsi(Rsi {
            period: p.period("period")?,
            oversold: p.number("oversold")?,
            overbought: p.number("overbought")?,
        }),
        SignalKind::Macd => Signal::Macd(Macd {
            fast: p.period("fast")?,
            slow: p.period("slow")?,
            signal: p.period("signal")?,
        }),
        SignalKind::Bollinger => Signal::Bollinger(Bollinger {
            period: p.period("period")?,
            mult: p.number("mult")?,
        }),
        SignalKind::VolumeSurge => Signal::VolumeSurge(VolumeSurge {
            lookback: p.period("lookback")?,
            mult: p.number("mult")?,
        }),
        SignalKind::Stochastic => Signal::Stochastic(Stochastic {
            k_period: p.period("k_period")?,
            d_period: p.period("d_period")?,
            oversold: p.number("oversold")?,
            overbought: p.number("overbought")?,
        }),
        SignalKind::WilliamsR => Signal::WilliamsR(WilliamsR {
            period: p.period("period")?,
            oversold: p.number("oversold")?,
            overbought: p.number("overbought")?,
        }),
        SignalKind::Adx => Signal::Adx(Adx {
            period: p.period("period")?,
            adx_threshold: p.number("adx_threshold")?,
        }),
    };
    tracing::debug!(signal = %config.name, ?signal, "resolved signal");
    Ok(signal)
}

/// Resolve every config, in order, or fail on the first bad one.
pub fn resolve_all(configs: &[SignalConfig]) -> Result<Vec<(String, Signal)>, CryptomindError> {
    configs
        .iter()
        .map(|c| resolve(c).map(|s| (c.name.clone(), s)))
        .collect()
}

/// Last-bar snapshot per signal name. A repeated name keeps the later config.
pub fn run_signals(
    series: &PriceSeries,
    configs: &[SignalConfig],
) -> Result<BTreeMap<String, IndicatorPoint>, CryptomindError> {
    let signals = resolve_all(configs)?;
    if series.is_empty() {
        return Err(CryptomindError::EmptySeries);
    }

    let mut snapshots = BTreeMap::new();
    for (name, signal) in signals {
        if let Some(last) = signal.compute(series).pop() {
            snapshots.insert(name, last);
        }
    }
    Ok(snapshots)
}

/// [`run_signals`], then hand each snapshot to the audit port.
pub fn run_signals_audited(
    series: &PriceSeries,
    configs: &[SignalConfig],
    audit: &dyn SignalAuditPort,
    symbol: &str,
    timeframe: &str,
) -> Result<BTreeMap<String, IndicatorPoint>, CryptomindError> {
    let snapshots = run_signals(series, configs)?;
    for (name, snapshot) in &snapshots {
        audit.record(symbol, timeframe, name, snapshot)?;
    }
    Ok(snapshots)
}
