//! Run summary returned by a successful exchange.

use serde::{Deserialize, Serialize};

/// Statistics for one complete handoff pass.
///
/// Returned by [`crate::exchange::run`] only when every line was
/// processed; an aborted run surfaces as
/// [`crate::error::ExchangeError::Aborted`] instead, because its partial
/// transcript lives in the outgoing file rather than here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeReport {
    /// Lines read from the working file.
    pub lines_total: usize,

    /// Certificate lines whose conversion succeeded.
    pub certificates_converted: usize,

    /// Unrecognised lines copied through byte-for-byte.
    pub passthrough_lines: usize,

    /// Wall-clock duration of the pass, in milliseconds.
    pub duration_ms: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serialises_to_json() {
        let report = ExchangeReport {
            lines_total: 3,
            certificates_converted: 2,
            passthrough_lines: 1,
            duration_ms: 40,
        };
        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"certificates_converted\":2"), "got: {json}");

        let back: ExchangeReport = serde_json::from_str(&json).unwrap();
        assert_eq!(back, report);
    }
}
