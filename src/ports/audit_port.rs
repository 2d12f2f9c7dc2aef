//! Signal run audit port.
//!
//! Receives one last-bar snapshot per signal each time signals are run, so a
//! persistence layer can keep a history of what every signal said and when.

use crate::domain::error::CryptomindError;
use crate::domain::indicator::IndicatorPoint;

pub trait SignalAuditPort {
    fn record(
        &self,
        symbol: &str,
        timeframe: &str,
        signal: &str,
        snapshot: &IndicatorPoint,
    ) -> Result<(), CryptomindError>;
}
