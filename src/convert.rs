//! The conversion seam: an injectable trait over the third-party
//! document-to-PDF routine.
//!
//! ## Why a trait?
//!
//! The exchanger treats conversion as an opaque `convert(path) → success |
//! failure` call; everything it actually owns is the handoff protocol
//! around that call. Putting the converter behind a trait object injected
//! via [`crate::config::ExchangeConfig`] lets tests drive every protocol
//! path (success, failure, failure-without-message) without LibreOffice
//! installed, and lets a host application substitute its own engine.
//!
//! The production implementation is [`SofficeConverter`], which shells out
//! to LibreOffice in headless mode. A certificate path may be a single
//! document or a directory of them — the producer deposits one directory
//! per event, full of generated `.docx` certificates — and the converter
//! handles both.

use crate::error::ConvertError;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, info};

/// Environment variable naming the LibreOffice executable.
pub const SOFFICE_ENV: &str = "CERT2PDF_SOFFICE";

/// Converts the document(s) at a certificate path to PDF.
///
/// Implementations place each produced PDF next to its source document.
/// The exchanger calls this once per certificate line, sequentially, and
/// aborts the batch on the first `Err`.
pub trait DocumentConverter: Send + Sync {
    /// Convert the document at `source`, or every document inside it when
    /// `source` is a directory. The path is known to exist when called.
    fn convert(&self, source: &Path) -> Result<(), ConvertError>;
}

/// LibreOffice (`soffice --headless --convert-to pdf`) converter.
///
/// Each document is converted into a scratch directory first and the PDF
/// then moved next to its source, so an interrupted or failed conversion
/// never leaves a partial PDF among the certificates.
pub struct SofficeConverter {
    program: PathBuf,
}

impl SofficeConverter {
    /// Use a specific LibreOffice executable.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Resolve the executable from [`SOFFICE_ENV`], falling back to
    /// `soffice` on `PATH`.
    pub fn from_env() -> Self {
        let program = std::env::var_os(SOFFICE_ENV)
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("soffice"));
        Self { program }
    }

    fn convert_one(&self, source: &Path) -> Result<(), ConvertError> {
        let scratch = tempfile::tempdir()
            .map_err(|e| ConvertError::new(format!("failed to create scratch directory: {e}")))?;

        debug!("converting {}", source.display());
        let output = Command::new(&self.program)
            .arg("--headless")
            .arg("--convert-to")
            .arg("pdf")
            .arg("--outdir")
            .arg(scratch.path())
            .arg(source)
            .output()
            .map_err(|e| {
                ConvertError::new(format!("failed to run '{}': {e}", self.program.display()))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let detail = stderr.trim();
            return Err(if detail.is_empty() {
                ConvertError::new(format!("'{}' failed ({})", self.program.display(), output.status))
            } else {
                ConvertError::new(format!(
                    "'{}' failed ({}): {detail}",
                    self.program.display(),
                    output.status
                ))
            });
        }

        // soffice can exit 0 without producing anything (unsupported or
        // unreadable input), so the scratch file is checked, not assumed.
        let stem = source
            .file_stem()
            .ok_or_else(|| ConvertError::new(format!("'{}' has no file name", source.display())))?;
        let mut pdf_name = OsString::from(stem);
        pdf_name.push(".pdf");
        let produced = scratch.path().join(&pdf_name);
        if !produced.is_file() {
            return Err(ConvertError::new(format!(
                "converter produced no PDF for '{}'",
                source.display()
            )));
        }

        let dest = source.with_file_name(pdf_name);
        move_file(&produced, &dest).map_err(|e| {
            ConvertError::new(format!("failed to place '{}': {e}", dest.display()))
        })?;

        info!("converted {} -> {}", source.display(), dest.display());
        Ok(())
    }
}

impl DocumentConverter for SofficeConverter {
    fn convert(&self, source: &Path) -> Result<(), ConvertError> {
        let documents = collect_documents(source)?;
        if documents.is_empty() {
            return Err(ConvertError::new(format!(
                "no convertible documents at '{}'",
                source.display()
            )));
        }
        for doc in &documents {
            self.convert_one(doc)?;
        }
        Ok(())
    }
}

/// Expand a certificate path into the documents to convert.
///
/// A file is converted as-is. A directory yields its `.docx` entries in
/// name order, so an aborting batch always stops at the same document on
/// a re-run.
fn collect_documents(source: &Path) -> Result<Vec<PathBuf>, ConvertError> {
    if !source.is_dir() {
        return Ok(vec![source.to_path_buf()]);
    }

    let entries = fs::read_dir(source)
        .map_err(|e| ConvertError::new(format!("failed to list '{}': {e}", source.display())))?;

    let mut documents = Vec::new();
    for entry in entries {
        let entry = entry
            .map_err(|e| ConvertError::new(format!("failed to list '{}': {e}", source.display())))?;
        let path = entry.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "docx") {
            documents.push(path);
        }
    }
    documents.sort();
    Ok(documents)
}

/// Rename, falling back to copy + remove when the scratch directory sits
/// on a different filesystem than the destination.
fn move_file(from: &Path, to: &Path) -> std::io::Result<()> {
    match fs::rename(from, to) {
        Ok(()) => Ok(()),
        Err(_) => {
            fs::copy(from, to)?;
            fs::remove_file(from)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;

    #[test]
    fn single_file_collects_itself() {
        let dir = tempfile::tempdir().unwrap();
        let doc = dir.path().join("certificate.docx");
        File::create(&doc).unwrap();

        assert_eq!(collect_documents(&doc).unwrap(), vec![doc]);
    }

    #[test]
    fn directory_collects_docx_in_name_order() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.docx", "a.docx", "notes.txt", "old.pdf"] {
            File::create(dir.path().join(name)).unwrap();
        }

        let docs = collect_documents(dir.path()).unwrap();
        assert_eq!(
            docs,
            vec![dir.path().join("a.docx"), dir.path().join("b.docx")]
        );
    }

    #[test]
    fn directory_without_documents_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        File::create(dir.path().join("readme.md")).unwrap();

        assert!(collect_documents(dir.path()).unwrap().is_empty());
    }

    #[test]
    fn move_file_replaces_destination() {
        let dir = tempfile::tempdir().unwrap();
        let from = dir.path().join("from.pdf");
        let to = dir.path().join("to.pdf");
        let mut f = File::create(&from).unwrap();
        f.write_all(b"%PDF-1.7").unwrap();
        File::create(&to).unwrap();

        move_file(&from, &to).unwrap();
        assert!(!from.exists());
        assert_eq!(fs::read(&to).unwrap(), b"%PDF-1.7");
    }

    #[test]
    fn missing_program_reports_a_message() {
        let dir = tempfile::tempdir().unwrap();
        let doc = dir.path().join("certificate.docx");
        File::create(&doc).unwrap();

        let converter = SofficeConverter::new("/definitely/not/soffice");
        let err = converter.convert(&doc).unwrap_err();
        assert!(
            err.message().unwrap_or("").contains("/definitely/not/soffice"),
            "got: {err}"
        );
    }
}
