//! # cert2pdf
//!
//! Batch DOCX-to-PDF certificate conversion driven by a rename-based
//! handoff file.
//!
//! ## Why this crate?
//!
//! A scheduling process (in the original deployment, a Go web server that
//! generates event certificates) needs documents converted to PDF by a
//! separately installed converter, without linking against it and without
//! any IPC channel beyond the filesystem. The two sides exchange a single
//! state file: the producer writes a list of certificate paths, this
//! program claims the file by renaming it, converts each path, and writes
//! back the same list with a per-line status embedded — which the
//! producer then re-reads.
//!
//! ## Protocol Overview
//!
//! ```text
//! producer                               cert2pdf
//!    │                                      │
//!    ├─ writes .path                        │
//!    │                                      ├─ 1. Acquire   rename .path → .old_path
//!    │                                      ├─ 2. Iterate   one output line per input line
//!    │                                      │               CERTIFICATES_PATH lines → convert
//!    │                                      │               anything else → pass through
//!    │                                      ├─ 3. Finalize  delete .old_path
//!    ├─ re-reads .path                      │
//!    │  (trailing {error: …} = failure)     │
//! ```
//!
//! The batch is fail-fast: the first failing line is annotated and
//! nothing after it is attempted, so the recreated `.path` file records
//! exactly how far the run got.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use cert2pdf::{exchange, ExchangeConfig};
//!
//! fn main() -> Result<(), cert2pdf::ExchangeError> {
//!     let config = ExchangeConfig::builder()
//!         .exchange_dir("/srv/certificates")
//!         .build()?;
//!     let report = exchange::run(&config)?;
//!     eprintln!("{} certificates converted", report.certificates_converted);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `cert2pdf` binary (clap + anyhow + tracing-subscriber) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! cert2pdf = { version = "0.2", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod error;
pub mod exchange;
pub mod line;
pub mod report;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ExchangeConfig, ExchangeConfigBuilder, INCOMING_FILE_NAME, WORKING_FILE_NAME};
pub use convert::{DocumentConverter, SofficeConverter};
pub use error::{ConvertError, ExchangeError, LineError};
pub use exchange::run;
pub use report::ExchangeReport;
