//! Domain error types.

/// Top-level error type for cryptomind.
#[derive(Debug, thiserror::Error)]
pub enum CryptomindError {
    #[error("unknown signal: {name}")]
    UnknownSignal { name: String },

    #[error("invalid parameter {key} for {signal}: {reason}")]
    InvalidParameter {
        signal: String,
        key: String,
        reason: String,
    },

    #[error("price series is empty")]
    EmptySeries,

    #[error("insufficient data for {symbol}: have {bars} bars, need {minimum}")]
    InsufficientData {
        symbol: String,
        bars: usize,
        minimum: usize,
    },

    #[error("data error: {reason}")]
    Data { reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CryptomindError {
    pub(crate) fn invalid_param(signal: &str, key: &str, reason: impl Into<String>) -> Self {
        CryptomindError::InvalidParameter {
            signal: signal.to_string(),
            key: key.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<&CryptomindError> for std::process::ExitCode {
    fn from(err: &CryptomindError) -> Self {
        let code: u8 = match err {
            CryptomindError::Io(_) => 1,
            CryptomindError::ConfigParse { .. } | CryptomindError::ConfigInvalid { .. } => 2,
            CryptomindError::Data { .. } => 3,
            CryptomindError::UnknownSignal { .. } | CryptomindError::InvalidParameter { .. } => 4,
            CryptomindError::EmptySeries | CryptomindError::InsufficientData { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
