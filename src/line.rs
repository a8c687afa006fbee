//! The handoff line format: classification, annotation handling, and path
//! extraction.
//!
//! One record per line. The recognised record is
//!
//! ```text
//! CERTIFICATES_PATH="<path>"
//! ```
//!
//! optionally followed by ` {<status>}` — an annotation left by a previous
//! run. Any other line is opaque pass-through text that the exchanger
//! copies byte-for-byte.
//!
//! The grammar is three fixed delimiters (` {`, `=`, `"`), so this module
//! is plain `str` splitting rather than a real parser. Each function is
//! pure and independently tested.
//!
//! ## Known limitation
//!
//! A path containing a literal ` {` cannot be represented: the annotation
//! strip cuts at the first occurrence. The producer writes paths it
//! controls, so the sequence does not occur in practice.

use crate::error::LineError;
use std::path::PathBuf;

/// Key marking a line as a certificate record.
pub const CERTIFICATE_KEY: &str = "CERTIFICATES_PATH";

/// Whether a line is a certificate record.
///
/// Matched against the raw line: a record indented by the producer would
/// not be recognised, and passes through untouched instead.
pub fn is_certificate(line: &str) -> bool {
    line.starts_with(CERTIFICATE_KEY)
}

/// Strip a previous run's annotation, returning the bare record.
///
/// Everything from the first ` {` onward is the annotation, including the
/// separating space. Lines without one are returned unchanged. Statuses
/// are regenerated on every run, never accumulated — reprocessing a line
/// that carries a stale `{error: …}` suffix starts from the bare record.
pub fn strip_annotation(line: &str) -> &str {
    match line.find(" {") {
        Some(idx) => &line[..idx],
        None => line,
    }
}

/// Extract the certificate path from a bare (de-annotated) record.
///
/// The payload is everything after the first `=`, with one leading and
/// one trailing `"` removed when present. The quotes are written by the
/// producer unconditionally; tolerating their absence keeps a hand-edited
/// record usable.
pub fn certificate_path(record: &str) -> Result<PathBuf, LineError> {
    let (_, payload) = record.split_once('=').ok_or(LineError::MissingSeparator)?;
    let payload = payload.strip_prefix('"').unwrap_or(payload);
    let payload = payload.strip_suffix('"').unwrap_or(payload);
    Ok(PathBuf::from(payload))
}

/// Append a status annotation to a bare record.
pub fn annotate(record: &str, status: &str) -> String {
    format!("{record} {{{status}}}")
}

/// Split a raw line as read from the working file into content and
/// terminator.
///
/// The terminator is `"\n"`, `"\r\n"`, or `""` for a final line without
/// one. The exchanger re-emits each processed line with its original
/// terminator, so the outgoing file keeps the incoming file's exact line
/// structure — including a producer that writes a single record with no
/// trailing newline.
pub fn split_terminator(raw: &str) -> (&str, &str) {
    if let Some(content) = raw.strip_suffix("\r\n") {
        (content, "\r\n")
    } else if let Some(content) = raw.strip_suffix('\n') {
        (content, "\n")
    } else {
        (raw, "")
    }
}
