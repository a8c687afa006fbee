//! The Handoff Exchanger: one complete pass over the handoff file.
//!
//! ## Protocol
//!
//! The producer process deposits a line-oriented state file at the
//! incoming name. A run claims it by renaming it to the working name —
//! the rename doubles as the mutual-exclusion mechanism, since at most
//! one run can win it — then streams the working file line by line,
//! recreating the outgoing file (same name as the incoming one) with one
//! annotated output line per input line. The producer later re-reads that
//! file to learn each line's fate.
//!
//! Per run the states are:
//!
//! ```text
//! START ──(no incoming file)──▶ FAILED_NO_INPUT
//! START ──▶ ACQUIRED ──▶ PROCESSING ──▶ DONE
//!                            │
//!                            └──(line fails)──▶ ABORTED
//! ```
//!
//! `DONE` and `ABORTED` both remove the working file; only `ABORTED` and
//! `FAILED_NO_INPUT` are protocol failures
//! (see [`crate::error::ExchangeError::is_protocol_failure`]).
//!
//! ## Partial-failure policy
//!
//! The batch stops at the first failing certificate line. That line is
//! written with an `{error: …}` annotation and nothing after it is read
//! or written, so the producer sees exactly how far the run got:
//! everything above the annotated line was fully processed, everything
//! after it was never attempted.

use crate::config::ExchangeConfig;
use crate::error::ExchangeError;
use crate::line;
use crate::report::ExchangeReport;
use std::fs::{self, File};
use std::io::{BufRead, BufReader, Write};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Status annotated onto a certificate line whose path is absent.
const MISSING_PATH_STATUS: &str = "error: certificates path does not exist";

/// Perform one complete handoff pass.
///
/// # Returns
/// `Ok(ExchangeReport)` only when every line was processed; the working
/// file has been removed and the outgoing file holds the full transcript.
///
/// # Errors
/// - [`ExchangeError::NoIncomingFile`] — nothing was deposited; no file
///   was touched.
/// - [`ExchangeError::Aborted`] — a certificate line failed; the outgoing
///   file ends with that line's annotation and the working file has been
///   removed.
/// - Other variants report I/O failures on the exchange files themselves.
pub fn run(config: &ExchangeConfig) -> Result<ExchangeReport, ExchangeError> {
    let incoming = config.incoming_path();
    let working = config.working_path();

    // ── Step 1: Acquire ──────────────────────────────────────────────────
    if !incoming.is_file() {
        return Err(ExchangeError::NoIncomingFile { path: incoming });
    }
    fs::rename(&incoming, &working).map_err(|e| ExchangeError::AcquireFailed {
        path: incoming.clone(),
        source: e,
    })?;
    debug!("claimed '{}' as '{}'", incoming.display(), working.display());

    // ── Step 2: Iterate ──────────────────────────────────────────────────
    let result = process(config, &working, &incoming);

    // ── Step 3: Finalize ─────────────────────────────────────────────────
    // The working file is consumed on every path after acquisition,
    // success and abort alike. A processing error takes precedence over a
    // cleanup error.
    let cleanup = fs::remove_file(&working);
    let report = result?;
    cleanup.map_err(|e| ExchangeError::CleanupFailed {
        path: working,
        source: e,
    })?;

    info!(
        "handoff complete: {} lines, {} converted, {} passed through, {}ms",
        report.lines_total,
        report.certificates_converted,
        report.passthrough_lines,
        report.duration_ms
    );
    Ok(report)
}

/// Stream the working file into the outgoing file, converting as we go.
fn process(
    config: &ExchangeConfig,
    working: &Path,
    outgoing: &Path,
) -> Result<ExchangeReport, ExchangeError> {
    let start = Instant::now();
    let converter = config.resolve_converter();

    let mut reader = BufReader::new(File::open(working).map_err(|e| ExchangeError::ReadFailed {
        path: working.to_path_buf(),
        source: e,
    })?);
    let mut out = File::create(outgoing).map_err(|e| ExchangeError::WriteFailed {
        path: outgoing.to_path_buf(),
        source: e,
    })?;

    let mut lines_total = 0usize;
    let mut converted = 0usize;
    let mut passthrough = 0usize;

    let mut raw = String::new();
    loop {
        raw.clear();
        let n = reader
            .read_line(&mut raw)
            .map_err(|e| ExchangeError::ReadFailed {
                path: working.to_path_buf(),
                source: e,
            })?;
        if n == 0 {
            break;
        }
        lines_total += 1;

        let (content, terminator) = line::split_terminator(&raw);

        // Unrecognised lines pass through byte-for-byte, terminator
        // included.
        if !line::is_certificate(content) {
            write_out(&mut out, outgoing, raw.as_bytes())?;
            passthrough += 1;
            continue;
        }

        // Statuses are regenerated each run: strip whatever a previous
        // run annotated before doing anything else.
        let record = line::strip_annotation(content.trim()).to_string();

        let failure = match line::certificate_path(&record) {
            Err(e) => Some(format!("error: {e}")),
            Ok(path) if !path.exists() => {
                warn!("line {lines_total}: '{}' does not exist", path.display());
                Some(MISSING_PATH_STATUS.to_string())
            }
            Ok(path) => match converter.convert(&path) {
                Ok(()) => None,
                Err(e) => {
                    warn!("line {lines_total}: conversion failed: {e}");
                    Some(e.status())
                }
            },
        };

        match failure {
            None => {
                // Written only after the converter returned: a crash
                // mid-conversion must not leave a line claiming success.
                write_out(&mut out, outgoing, record.as_bytes())?;
                write_out(&mut out, outgoing, terminator.as_bytes())?;
                converted += 1;
                debug!("line {lines_total}: converted");
            }
            Some(status) => {
                let annotated = line::annotate(&record, &status);
                write_out(&mut out, outgoing, annotated.as_bytes())?;
                write_out(&mut out, outgoing, terminator.as_bytes())?;
                return Err(ExchangeError::Aborted {
                    line: lines_total,
                    status,
                });
            }
        }
    }

    Ok(ExchangeReport {
        lines_total,
        certificates_converted: converted,
        passthrough_lines: passthrough,
        duration_ms: start.elapsed().as_millis() as u64,
    })
}

fn write_out(out: &mut File, outgoing: &Path, bytes: &[u8]) -> Result<(), ExchangeError> {
    out.write_all(bytes).map_err(|e| ExchangeError::WriteFailed {
        path: outgoing.to_path_buf(),
        source: e,
    })
}
