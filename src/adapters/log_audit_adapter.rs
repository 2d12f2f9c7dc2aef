//! Signal audit adapter that records each run as a structured log event.

use crate::domain::error::CryptomindError;
use crate::domain::indicator::IndicatorPoint;
use crate::ports::audit_port::SignalAuditPort;

#[derive(Debug, Default, Clone, Copy)]
pub struct LogAuditAdapter;

impl SignalAuditPort for LogAuditAdapter {
    fn record(
        &self,
        symbol: &str,
        timeframe: &str,
        signal: &str,
        snapshot: &IndicatorPoint,
    ) -> Result<(), CryptomindError> {
        tracing::info!(
            target: "cryptomind::audit",
            symbol,
            timeframe,
            signal,
            ts = %snapshot.ts,
            value = ?snapshot.value,
            trigger = snapshot.trigger.as_i8(),
            "signal run"
        );
        Ok(())
    }
}
