//! Configuration for a handoff exchange run.
//!
//! All behaviour is controlled through [`ExchangeConfig`], built via its
//! [`ExchangeConfigBuilder`]. The config carries the *resolved* exchange
//! directory rather than discovering it at run time, so tests point the
//! exchanger at a temporary directory and the CLI points it at the
//! installation directory — same code path either way.
//!
//! # The exchange directory
//!
//! The handoff files live next to the installed executable, not in the
//! caller's working directory: the external scheduler that deposits the
//! incoming file runs the program from *its own* directory, so resolving
//! against the cwd would look in the wrong place. [`ExchangeConfig::from_exe_dir`]
//! captures that default; `--dir` and tests override it.

use crate::convert::{DocumentConverter, SofficeConverter};
use crate::error::ExchangeError;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Name of the incoming (and outgoing) handoff file.
pub const INCOMING_FILE_NAME: &str = ".path";

/// Name of the working file during a run.
pub const WORKING_FILE_NAME: &str = ".old_path";

/// Configuration for one exchange run.
///
/// # Example
/// ```rust
/// use cert2pdf::ExchangeConfig;
///
/// let config = ExchangeConfig::builder()
///     .exchange_dir("/srv/certificates")
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct ExchangeConfig {
    /// Directory holding the handoff files.
    pub exchange_dir: PathBuf,

    /// Explicit LibreOffice executable. When unset, the converter falls
    /// back to the `CERT2PDF_SOFFICE` environment variable, then to
    /// `soffice` on `PATH`.
    pub soffice_program: Option<PathBuf>,

    /// Pre-constructed converter. Takes precedence over `soffice_program`.
    pub converter: Option<Arc<dyn DocumentConverter>>,
}

impl fmt::Debug for ExchangeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExchangeConfig")
            .field("exchange_dir", &self.exchange_dir)
            .field("soffice_program", &self.soffice_program)
            .field(
                "converter",
                &self.converter.as_ref().map(|_| "<dyn DocumentConverter>"),
            )
            .finish()
    }
}

impl ExchangeConfig {
    /// Create a new builder for `ExchangeConfig`.
    pub fn builder() -> ExchangeConfigBuilder {
        ExchangeConfigBuilder {
            exchange_dir: None,
            soffice_program: None,
            converter: None,
        }
    }

    /// Config rooted at the running executable's directory — the
    /// production default.
    pub fn from_exe_dir() -> Result<Self, ExchangeError> {
        Ok(Self {
            exchange_dir: exe_dir()?,
            soffice_program: None,
            converter: None,
        })
    }

    /// Path of the incoming/outgoing handoff file.
    pub fn incoming_path(&self) -> PathBuf {
        self.exchange_dir.join(INCOMING_FILE_NAME)
    }

    /// Path of the working file during a run.
    pub fn working_path(&self) -> PathBuf {
        self.exchange_dir.join(WORKING_FILE_NAME)
    }

    /// Resolve the converter, from most-specific to least-specific:
    /// pre-built converter → explicit program → `CERT2PDF_SOFFICE` env
    /// var → `soffice` on `PATH`.
    pub(crate) fn resolve_converter(&self) -> Arc<dyn DocumentConverter> {
        if let Some(ref converter) = self.converter {
            return Arc::clone(converter);
        }
        if let Some(ref program) = self.soffice_program {
            return Arc::new(SofficeConverter::new(program.clone()));
        }
        Arc::new(SofficeConverter::from_env())
    }
}

/// Builder for [`ExchangeConfig`].
pub struct ExchangeConfigBuilder {
    exchange_dir: Option<PathBuf>,
    soffice_program: Option<PathBuf>,
    converter: Option<Arc<dyn DocumentConverter>>,
}

impl ExchangeConfigBuilder {
    /// Directory holding the handoff files. Defaults to the running
    /// executable's directory (see [`ExchangeConfig::from_exe_dir`]).
    pub fn exchange_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.exchange_dir = Some(dir.into());
        self
    }

    /// LibreOffice executable to use for conversion.
    pub fn soffice_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.soffice_program = Some(program.into());
        self
    }

    /// Inject a converter directly, bypassing LibreOffice resolution.
    pub fn converter(mut self, converter: Arc<dyn DocumentConverter>) -> Self {
        self.converter = Some(converter);
        self
    }

    /// Build the configuration.
    ///
    /// Infallible when an exchange directory was set explicitly; without
    /// one, the executable's directory must be resolvable.
    pub fn build(self) -> Result<ExchangeConfig, ExchangeError> {
        let exchange_dir = match self.exchange_dir {
            Some(dir) => dir,
            None => exe_dir()?,
        };
        Ok(ExchangeConfig {
            exchange_dir,
            soffice_program: self.soffice_program,
            converter: self.converter,
        })
    }
}

/// The directory containing the running executable, symlinks resolved.
fn exe_dir() -> Result<PathBuf, ExchangeError> {
    let exe = std::env::current_exe()
        .map_err(|e| ExchangeError::ExchangeDirUnresolved(e.to_string()))?;
    let exe = exe
        .canonicalize()
        .map_err(|e| ExchangeError::ExchangeDirUnresolved(e.to_string()))?;
    exe.parent().map(Path::to_path_buf).ok_or_else(|| {
        ExchangeError::ExchangeDirUnresolved(format!("'{}' has no parent directory", exe.display()))
    })
}
