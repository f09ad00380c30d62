//! Core types and utilities for Musabaha admin tooling

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    rust_2018_idioms
)]

pub mod assets;
pub mod config;
pub mod error;
pub mod stats;
pub mod types;
pub mod utils;

// Re-export commonly used types
pub use assets::AssetResolver;
pub use config::{Config, Credentials, LoggingConfig};
pub use error::{Error, Result};
pub use stats::AggregateStats;
pub use types::{ApprovalStatus, DocumentKind, PaymentRecord, RecordId, UserRegistration};
pub use utils::StatusFilter;

use tracing_appender::non_blocking::WorkerGuard;

/// Initialize the logging system
///
/// `RUST_LOG` takes precedence over the configured level. Output goes to
/// stderr unless a log file is configured. The returned guard must be held
/// until shutdown so buffered lines are flushed.
///
/// # Errors
///
/// Returns an error if the level directive is invalid, the log file cannot
/// be opened, or a global subscriber is already installed.
pub fn init_logging(config: &LoggingConfig) -> Result<WorkerGuard> {
    use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.level)
            .map_err(|e| Error::validation("logging.level", e.to_string()))?,
    };

    let (writer, guard) = match &config.file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)?;
            tracing_appender::non_blocking(file)
        }
        None => tracing_appender::non_blocking(std::io::stderr()),
    };
    let ansi = config.file.is_none();

    let registry = tracing_subscriber::registry().with(filter);
    let result = if config.format == "json" {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(writer))
            .try_init()
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .pretty()
                    .with_ansi(ansi)
                    .with_writer(writer),
            )
            .try_init()
    };
    result.map_err(|e| Error::configuration(format!("failed to install logger: {e}")))?;

    Ok(guard)
}
