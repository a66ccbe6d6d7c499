use std::path::PathBuf;
use std::sync::OnceLock;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

#[derive(Debug, thiserror::Error)]
pub enum LogSetupError {
    #[error("Invalid log filter: {0}")]
    Filter(#[from] tracing_subscriber::filter::ParseError),

    #[error("Failed to create log directory {path}: {source}")]
    Directory {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to create log file appender: {0}")]
    Appender(#[from] tracing_appender::rolling::InitError),

    #[error("Logging already initialized")]
    AlreadyInitialized,
}

#[derive(Debug, Clone)]
pub struct LogOptions {
    /// Log file name prefix, files are `<prefix>.<date>.log`.
    pub prefix: String,
    /// Used when `RUST_LOG` is unset or invalid.
    pub base_level: String,
    /// Directory for rolling log files; `None` logs to the console only.
    pub directory: Option<PathBuf>,
    pub max_files: usize,
}

impl LogOptions {
    pub fn new(prefix: &str, base_level: &str) -> Self {
        Self {
            prefix: prefix.to_string(),
            base_level: base_level.to_string(),
            directory: Some(PathBuf::from("logs")),
            max_files: 5,
        }
    }
}

/// Installs a stderr console layer plus an optional daily-rolling file layer.
pub fn setup_logging(options: &LogOptions) -> Result<(), LogSetupError> {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&options.base_level)?,
    };

    let file_layer = match &options.directory {
        Some(directory) => {
            std::fs::create_dir_all(directory).map_err(|source| LogSetupError::Directory {
                path: directory.clone(),
                source,
            })?;

            let file_appender = tracing_appender::rolling::Builder::new()
                .rotation(tracing_appender::rolling::Rotation::DAILY)
                .filename_prefix(&options.prefix)
                .filename_suffix("log")
                .max_log_files(options.max_files)
                .build(directory)?;

            let (file_writer, guard) = tracing_appender::non_blocking(file_appender);
            LOG_GUARD
                .set(guard)
                .map_err(|_| LogSetupError::AlreadyInitialized)?;

            Some(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_line_number(true)
                    .with_file(true)
                    .with_ansi(false)
                    .with_writer(file_writer),
            )
        }
        None => None,
    };

    // stdout carries results.
    let console_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_ansi(true)
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|_| LogSetupError::AlreadyInitialized)
}
