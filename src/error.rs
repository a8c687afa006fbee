//! Error types for the cert2pdf library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`ExchangeError`] — **Run-level**: the handoff run as a whole failed
//!   (no incoming file, a line aborted the batch, the working file could
//!   not be claimed). Returned as `Err(ExchangeError)` from
//!   [`crate::exchange::run`].
//!
//! * [`ConvertError`] — **Per-line**: a single conversion attempt failed.
//!   Produced by a [`crate::convert::DocumentConverter`] and consumed by
//!   the exchanger, which turns it into the aborting line's annotation
//!   rather than propagating it directly.
//!
//! The separation matters because the two surfaces differ: run-level
//! failures reach the caller through the exit code, while per-line
//! failures reach the *producer process* through the annotation embedded
//! in the outgoing handoff file.

use std::path::PathBuf;
use thiserror::Error;

/// All run-level errors returned by the cert2pdf library.
///
/// Only [`ExchangeError::NoIncomingFile`] and [`ExchangeError::Aborted`]
/// are part of the handoff protocol; the rest are infrastructure failures
/// (I/O on the exchange files themselves) that the protocol does not
/// model. See [`ExchangeError::is_protocol_failure`].
#[derive(Debug, Error)]
pub enum ExchangeError {
    // ── Startup errors ────────────────────────────────────────────────────
    /// No incoming handoff file exists.
    ///
    /// The producer has not deposited one yet, or another run already
    /// claimed it. Nothing has been touched.
    #[error("no incoming handoff file at '{path}'")]
    NoIncomingFile { path: PathBuf },

    /// The exchange directory could not be resolved from the executable
    /// location.
    #[error("could not resolve the exchange directory: {0}")]
    ExchangeDirUnresolved(String),

    /// Builder validation failed.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Protocol errors ───────────────────────────────────────────────────
    /// A certificate line failed and the batch was aborted.
    ///
    /// The offending line has already been written to the outgoing file
    /// with `status` as its annotation, and the working file has been
    /// removed. No line after `line` was read or written.
    #[error("handoff aborted at line {line}: {status}")]
    Aborted { line: usize, status: String },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Renaming the incoming file to the working name failed.
    #[error("failed to claim incoming file '{path}': {source}")]
    AcquireFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The working file could not be opened or read.
    #[error("failed to read working file '{path}': {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The outgoing file could not be created or written.
    #[error("failed to write outgoing file '{path}': {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The fully consumed working file could not be removed.
    #[error("failed to remove working file '{path}': {source}")]
    CleanupFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ExchangeError {
    /// Whether this failure is part of the handoff protocol.
    ///
    /// Protocol failures share one distinguished exit code (the producer
    /// distinguishes them by reading the outgoing file's trailing
    /// annotation, not by code). Infrastructure failures are outside the
    /// protocol and map to an ordinary non-zero exit.
    pub fn is_protocol_failure(&self) -> bool {
        matches!(
            self,
            ExchangeError::NoIncomingFile { .. } | ExchangeError::Aborted { .. }
        )
    }
}

/// A failed conversion of a single certificate path.
///
/// Carries the converter's message when it produced one; the exchanger
/// forwards it verbatim into the line annotation as `error: <message>`,
/// falling back to a fixed generic status for messageless failures.
#[derive(Debug, Clone, Error)]
#[error("{}", .message.as_deref().unwrap_or("conversion failed"))]
pub struct ConvertError {
    message: Option<String>,
}

impl ConvertError {
    /// A failure carrying a human-readable message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
        }
    }

    /// A failure with no message text. Annotated with the generic status.
    pub fn without_message() -> Self {
        Self { message: None }
    }

    /// The message, if the converter produced one.
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// The annotation status for this failure: `error: <message>`, or the
    /// bare generic text when there is no message.
    pub fn status(&self) -> String {
        match &self.message {
            Some(m) => format!("error: {m}"),
            None => "conversion failed".to_string(),
        }
    }
}

/// A certificate line whose payload could not be extracted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LineError {
    /// The line starts with the certificate key but has no `=` after it.
    #[error("missing '=' after CERTIFICATES_PATH")]
    MissingSeparator,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aborted_display() {
        let e = ExchangeError::Aborted {
            line: 3,
            status: "error: certificates path does not exist".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("line 3"), "got: {msg}");
        assert!(msg.contains("does not exist"));
    }

    #[test]
    fn protocol_failure_classification() {
        let no_file = ExchangeError::NoIncomingFile {
            path: PathBuf::from("/srv/.path"),
        };
        let aborted = ExchangeError::Aborted {
            line: 1,
            status: "conversion failed".into(),
        };
        let io = ExchangeError::ReadFailed {
            path: PathBuf::from("/srv/.old_path"),
            source: std::io::Error::other("boom"),
        };
        assert!(no_file.is_protocol_failure());
        assert!(aborted.is_protocol_failure());
        assert!(!io.is_protocol_failure());
    }

    #[test]
    fn convert_error_status_with_message() {
        let e = ConvertError::new("soffice exited with status 1");
        assert_eq!(e.status(), "error: soffice exited with status 1");
        assert_eq!(e.to_string(), "soffice exited with status 1");
    }

    #[test]
    fn convert_error_status_without_message() {
        let e = ConvertError::without_message();
        assert_eq!(e.status(), "conversion failed");
        assert_eq!(e.to_string(), "conversion failed");
    }

    #[test]
    fn line_error_display() {
        assert_eq!(
            LineError::MissingSeparator.to_string(),
            "missing '=' after CERTIFICATES_PATH"
        );
    }
}
