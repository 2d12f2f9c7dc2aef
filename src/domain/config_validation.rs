//! Configuration validation.
//!
//! Checks every value of the INI layout before anything is computed, so a bad
//! file fails fast with the offending section and key.

use crate::domain::backtest::MAX_FEE_BPS;
use crate::domain::error::CryptomindError;
use crate::domain::signal::{self, SignalConfig, SignalKind};
use crate::ports::config_port::ConfigPort;

/// Section prefix for per-signal parameter overrides: `[signal.rsi]`.
pub const SIGNAL_SECTION_PREFIX: &str = "signal.";

pub fn validate_config(config: &dyn ConfigPort) -> Result<(), CryptomindError> {
    validate_data(config)?;
    validate_weights(config)?;
    validate_backtest(config)?;
    validate_signals(config)?;
    Ok(())
}

/// Ordered names from `[signals] names`, blanks dropped.
pub fn signal_names(config: &dyn ConfigPort) -> Vec<String> {
    config
        .get_string("signals", "names")
        .map(|raw| {
            raw.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect()
        })
        .unwrap_or_default()
}

/// Numeric value of an optional key; present but unparsable is an error.
pub fn optional_number(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<Option<f64>, CryptomindError> {
    match config.get_string(section, key) {
        None => Ok(None),
        Some(raw) => match raw.trim().parse::<f64>() {
            Ok(v) if v.is_finite() => Ok(Some(v)),
            _ => Err(CryptomindError::ConfigInvalid {
                section: section.to_string(),
                key: key.to_string(),
                reason: format!("expected a finite number, got {:?}", raw),
            }),
        },
    }
}

/// Build one [`SignalConfig`] from its `[signal.<name>]` section.
pub fn signal_config(config: &dyn ConfigPort, name: &str) -> Result<SignalConfig, CryptomindError> {
    let section = format!("{SIGNAL_SECTION_PREFIX}{name}");
    let mut signal = SignalConfig::new(name);
    for key in config.keys(&section) {
        if let Some(value) = optional_number(config, &section, &key)? {
            signal.params.insert(key, value);
        }
    }
    Ok(signal)
}

fn validate_data(config: &dyn ConfigPort) -> Result<(), CryptomindError> {
    for key in ["dir", "timeframe"] {
        if let Some(value) = config.get_string("data", key) {
            if value.trim().is_empty() {
                return Err(CryptomindError::ConfigInvalid {
                    section: "data".to_string(),
                    key: key.to_string(),
                    reason: format!("{key} must not be empty"),
                });
            }
        }
    }
    Ok(())
}

fn validate_weights(config: &dyn ConfigPort) -> Result<(), CryptomindError> {
    for key in ["technical", "onchain", "sentiment"] {
        optional_number(config, "decision", key)?;
    }
    Ok(())
}

fn validate_backtest(config: &dyn ConfigPort) -> Result<(), CryptomindError> {
    if let Some(cash) = optional_number(config, "backtest", "initial_cash")? {
        if cash <= 0.0 {
            return Err(CryptomindError::ConfigInvalid {
                section: "backtest".to_string(),
                key: "initial_cash".to_string(),
                reason: "initial_cash must be positive".to_string(),
            });
        }
    }
    if let Some(fee) = optional_number(config, "backtest", "fee_bps")? {
        if !(0.0..=MAX_FEE_BPS).contains(&fee) {
            return Err(CryptomindError::ConfigInvalid {
                section: "backtest".to_string(),
                key: "fee_bps".to_string(),
                reason: format!("fee_bps must be within 0..={MAX_FEE_BPS}"),
            });
        }
    }
    Ok(())
}

fn validate_signals(config: &dyn ConfigPort) -> Result<(), CryptomindError> {
    for name in signal_names(config) {
        if SignalKind::from_name(&name).is_none() {
            return Err(CryptomindError::ConfigInvalid {
                section: "signals".to_string(),
                key: "names".to_string(),
                reason: format!("unknown signal: {name}"),
            });
        }
        let section = format!("{SIGNAL_SECTION_PREFIX}{name}");
        let resolved = signal_config(config, &name).and_then(|c| signal::resolve(&c));
        if let Err(e) = resolved {
            return Err(match e {
                CryptomindError::InvalidParameter { key, reason, .. } => {
                    CryptomindError::ConfigInvalid {
                        section,
                        key,
                        reason,
                    }
                }
                other => other,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::file_config_adapter::FileConfigAdapter;

    fn make_config(content: &str) -> FileConfigAdapter {
        FileConfigAdapter::from_string(content).unwrap()
    }

    #[test]
    fn valid_config_passes() {
        let config = make_config(
            r#"
[data]
dir = ./prices
timeframe = 1d

[decision]
technical = 0.6
onchain = 0.2
sentiment = 0.2

[backtest]
initial_cash = 10000
fee_bps = 10

[signals]
names = ema, rsi, macd

[signal.rsi]
period = 7
overbought = 75
"#,
        );
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn empty_config_passes() {
        assert!(validate_config(&make_config("")).is_ok());
    }

    #[test]
    fn signal_names_are_trimmed_and_ordered() {
        let config = make_config("[signals]\nnames = rsi , ema,, adx\n");
        assert_eq!(signal_names(&config), vec!["rsi", "ema", "adx"]);
    }

    #[test]
    fn unknown_signal_name_fails() {
        let config = make_config("[signals]\nnames = ema, ichimoku\n");
        let err = validate_config(&config).unwrap_err();
        assert!(
            matches!(err, CryptomindError::ConfigInvalid { key, reason, .. } if key == "names" && reason.contains("ichimoku"))
        );
    }

    #[test]
    fn non_numeric_signal_param_fails() {
        let config = make_config("[signals]\nnames = ema\n\n[signal.ema]\nperiod = fast\n");
        let err = validate_config(&config).unwrap_err();
        assert!(
            matches!(err, CryptomindError::ConfigInvalid { section, key, .. } if section == "signal.ema" && key == "period")
        );
    }

    #[test]
    fn zero_period_fails() {
        let config = make_config("[signals]\nnames = macd\n\n[signal.macd]\nslow = 0\n");
        let err = validate_config(&config).unwrap_err();
        assert!(
            matches!(err, CryptomindError::ConfigInvalid { section, key, .. } if section == "signal.macd" && key == "slow")
        );
    }

    #[test]
    fn params_for_unlisted_signal_are_ignored() {
        let config = make_config("[signals]\nnames = ema\n\n[signal.rsi]\nperiod = 0\n");
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn initial_cash_must_be_positive() {
        let config = make_config("[backtest]\ninitial_cash = 0\n");
        let err = validate_config(&config).unwrap_err();
        assert!(matches!(err, CryptomindError::ConfigInvalid { key, .. } if key == "initial_cash"));
    }

    #[test]
    fn negative_fee_fails() {
        let config = make_config("[backtest]\nfee_bps = -1\n");
        let err = validate_config(&config).unwrap_err();
        assert!(matches!(err, CryptomindError::ConfigInvalid { key, .. } if key == "fee_bps"));
    }

    #[test]
    fn fee_above_full_notional_fails() {
        let config = make_config("[backtest]\nfee_bps = 20000\n");
        let err = validate_config(&config).unwrap_err();
        assert!(matches!(err, CryptomindError::ConfigInvalid { key, .. } if key == "fee_bps"));
        assert!(validate_config(&make_config("[backtest]\nfee_bps = 10000\n")).is_ok());
    }

    #[test]
    fn non_numeric_weight_fails() {
        let config = make_config("[decision]\ntechnical = lots\n");
        let err = validate_config(&config).unwrap_err();
        assert!(matches!(err, CryptomindError::ConfigInvalid { key, .. } if key == "technical"));
    }

    #[test]
    fn infinite_weight_fails() {
        let config = make_config("[decision]\nsentiment = inf\n");
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn empty_timeframe_fails() {
        let config = make_config("[data]\ntimeframe =\n");
        let err = validate_config(&config).unwrap_err();
        assert!(matches!(err, CryptomindError::ConfigInvalid { key, .. } if key == "timeframe"));
    }

    #[test]
    fn signal_config_reads_section() {
        let config = make_config("[signal.bollinger]\nperiod = 10\nmult = 2.5\n");
        let signal = signal_config(&config, "bollinger").unwrap();
        assert_eq!(signal.name, "bollinger");
        assert_eq!(signal.params.get("period"), Some(&10.0));
        assert_eq!(signal.params.get("mult"), Some(&2.5));
    }
}
