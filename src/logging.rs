use anyhow::{Context, Result};
use tracing::subscriber::DefaultGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use std::{
    fs::File,
    path::{Path, PathBuf},
    sync::Mutex,
};

/// Log file written when none is configured.
pub const DEFAULT_LOG_FILE: &str = "vendas_cli.log";

/// Logging configuration for one run.
///
/// Nothing is installed process-wide: [`Logging::init`] makes the subscriber
/// the default for the current thread until the returned [`LogGuard`] is
/// dropped.
#[derive(Clone, Debug)]
pub struct Logging {
    level: String,
    file: Option<PathBuf>,
}

/// Keeps the run's subscriber active. Logging stops when it is dropped.
#[must_use = "logging stops when the guard is dropped"]
pub struct LogGuard {
    _default: DefaultGuard,
}

impl Logging {
    /// Logs to stderr at `level`.
    ///
    /// `level` is any [`EnvFilter`] directive (`info`, `debug`,
    /// `vendas_cli=trace`, ...); the names `WARNING` and `CRITICAL` are also
    /// accepted. Anything unrecognised falls back to `info`.
    #[must_use]
    pub fn new(level: &str) -> Self {
        Self {
            level: level.to_string(),
            file: None,
        }
    }

    /// Also logs to `path`, which is truncated when logging starts.
    #[must_use]
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        self.file = Some(path.as_ref().to_path_buf());
        self
    }

    /// Starts logging.
    ///
    /// # Errors
    ///
    /// Returns an error if the log file cannot be created.
    pub fn init(&self) -> Result<LogGuard> {
        let file_layer = match &self.file {
            Some(path) => {
                let file = File::create(path)
                    .with_context(|| format!("creating log file {}", path.display()))?;
                Some(
                    fmt::layer()
                        .with_ansi(false)
                        .with_target(false)
                        .with_writer(Mutex::new(file)),
                )
            }
            None => None,
        };
        let console_layer = fmt::layer()
            .with_target(false)
            .with_writer(std::io::stderr);
        let subscriber = tracing_subscriber::registry()
            .with(self.filter())
            .with(console_layer)
            .with(file_layer);
        Ok(LogGuard {
            _default: tracing::subscriber::set_default(subscriber),
        })
    }

    fn filter(&self) -> EnvFilter {
        let normalised = match self.level.to_uppercase().as_str() {
            "WARNING" => "warn".to_string(),
            "CRITICAL" => "error".to_string(),
            _ => self.level.to_lowercase(),
        };
        EnvFilter::try_new(normalised).unwrap_or_else(|_| EnvFilter::new("info"))
    }
}
