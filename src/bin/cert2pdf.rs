//! CLI binary for cert2pdf.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `ExchangeConfig`, performs one handoff pass, and maps the outcome to
//! the protocol exit codes the producer process expects.

use anyhow::Context;
use cert2pdf::{exchange, ExchangeConfig, ExchangeError, ExchangeReport};
use clap::Parser;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

// ── Exit codes ───────────────────────────────────────────────────────────────
// 7 is the distinguished protocol code shared by "no incoming file" and
// "aborted mid-run"; the producer tells them apart by reading the
// outgoing file's trailing annotation, not by code.

const EXIT_OK: u8 = 0;
const EXIT_INFRASTRUCTURE: u8 = 1;
const EXIT_HANDOFF_FAILED: u8 = 7;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}

const AFTER_HELP: &str = r#"HANDOFF FILE:
  The producer process writes a '.path' file into the exchange directory,
  one record per line:

    CERTIFICATES_PATH="/srv/certificates/2024-05-17"

  cert2pdf claims the file by renaming it to '.old_path', converts every
  referenced path (a document, or a directory of .docx documents), and
  recreates '.path' with one line per input line. A failed line gains a
  status suffix and ends the file:

    CERTIFICATES_PATH="/srv/certificates/2024-05-17" {error: certificates path does not exist}

  Lines that are not certificate records pass through byte-for-byte.

EXIT CODES:
  0   every line processed
  7   no incoming file, or the batch aborted on a line
      (inspect the trailing annotation in '.path' to tell which)
  1   infrastructure failure outside the protocol (I/O on the
      exchange files themselves)

EXAMPLES:
  # One pass over the handoff file next to the installed binary
  cert2pdf

  # Point at a different exchange directory
  cert2pdf --dir /srv/certificates

  # Use a specific LibreOffice build
  cert2pdf --soffice /opt/libreoffice/program/soffice

  # Machine-readable run report
  cert2pdf --json

ENVIRONMENT VARIABLES:
  CERT2PDF_DIR       Exchange directory (same as --dir)
  CERT2PDF_SOFFICE   LibreOffice executable (same as --soffice)
"#;

/// Convert certificate documents to PDF, driven by a handoff file.
#[derive(Parser, Debug)]
#[command(
    name = "cert2pdf",
    version,
    about = "Convert certificate documents to PDF, driven by a handoff file",
    long_about = "Perform one pass over the rename-based handoff file exchanged with the \
producer process: claim '.path', convert every referenced certificate path to PDF via \
LibreOffice, and write the annotated result back for the producer to re-read.",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Exchange directory holding the handoff files.
    ///
    /// Defaults to the directory containing this executable — the
    /// producer deposits the file there regardless of where it invokes
    /// cert2pdf from.
    #[arg(short, long, env = "CERT2PDF_DIR")]
    dir: Option<PathBuf>,

    /// LibreOffice executable used for conversion.
    #[arg(long, env = "CERT2PDF_SOFFICE")]
    soffice: Option<PathBuf>,

    /// Print the run report as JSON to stdout.
    #[arg(long)]
    json: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "CERT2PDF_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "CERT2PDF_QUIET")]
    quiet: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // stderr only: stdout is reserved for --json, and the handoff file is
    // the protocol failure surface either way.
    let filter = if cli.quiet {
        "error"
    } else if cli.verbose {
        "debug"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_writer(io::stderr)
        .init();

    match execute(&cli) {
        Ok(report) => {
            if cli.json {
                match serde_json::to_string_pretty(&report) {
                    Ok(json) => println!("{json}"),
                    Err(e) => {
                        eprintln!("{} failed to serialise report: {e}", red("✗"));
                        return ExitCode::from(EXIT_INFRASTRUCTURE);
                    }
                }
            } else if !cli.quiet {
                print_summary(&report);
            }
            ExitCode::from(EXIT_OK)
        }
        Err(err) => {
            eprintln!("{} {err:#}", red("✗"));
            let protocol = err
                .downcast_ref::<ExchangeError>()
                .is_some_and(ExchangeError::is_protocol_failure);
            if protocol {
                ExitCode::from(EXIT_HANDOFF_FAILED)
            } else {
                ExitCode::from(EXIT_INFRASTRUCTURE)
            }
        }
    }
}

/// Map CLI args to `ExchangeConfig` and run one pass.
fn execute(cli: &Cli) -> anyhow::Result<ExchangeReport> {
    let mut builder = ExchangeConfig::builder();
    if let Some(ref dir) = cli.dir {
        builder = builder.exchange_dir(dir);
    }
    if let Some(ref soffice) = cli.soffice {
        builder = builder.soffice_program(soffice);
    }
    let config = builder.build().context("invalid configuration")?;

    let report = exchange::run(&config)?;
    Ok(report)
}

fn print_summary(report: &ExchangeReport) {
    eprintln!(
        "{} {} lines  {} converted  {} passed through  {}",
        green("✔"),
        report.lines_total,
        report.certificates_converted,
        report.passthrough_lines,
        dim(&format!("{}ms", report.duration_ms)),
    );
}
