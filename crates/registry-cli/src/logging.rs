//! Logging initialization for the `docreg` binary

use anyhow::Result;
use std::env;
use tracing::info;
use tracing_appender::rolling;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Where log output goes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogDestination {
    /// stderr, leaving stdout to command output
    Console,
    /// Daily rotating files
    File { dir: String, prefix: String },
}

impl LogDestination {
    /// Read the destination from the environment
    ///
    /// ## Environment Variables
    ///
    /// - `LOG_DESTINATION`: "console" (default) or "file"
    /// - `LOG_DIR`: directory for log files (default: "./logs")
    /// - `LOG_FILE_PREFIX`: prefix for log file names (default: "docreg")
    pub fn from_env() -> Self {
        let destination = env::var("LOG_DESTINATION").unwrap_or_else(|_| "console".to_string());
        Self::parse(
            &destination,
            env::var("LOG_DIR").ok(),
            env::var("LOG_FILE_PREFIX").ok(),
        )
    }

    fn parse(destination: &str, dir: Option<String>, prefix: Option<String>) -> Self {
        match destination.to_lowercase().as_str() {
            "file" => Self::File {
                dir: dir.unwrap_or_else(|| "./logs".to_string()),
                prefix: prefix.unwrap_or_else(|| "docreg".to_string()),
            },
            _ => Self::Console,
        }
    }
}

/// Initialize tracing; `RUST_LOG` overrides the default `info` level
///
/// The returned guard flushes file output and must live until exit.
pub fn init_logging() -> Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());

    match LogDestination::from_env() {
        LogDestination::Console => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_writer(std::io::stderr)
                        .with_target(false),
                )
                .try_init()
                .map_err(|e| anyhow::anyhow!("Failed to initialize console tracing subscriber: {}", e))?;
            Ok(None)
        }
        LogDestination::File { dir, prefix } => {
            std::fs::create_dir_all(&dir)
                .map_err(|e| anyhow::anyhow!("Failed to create log directory '{}': {}", dir, e))?;

            let (non_blocking, guard) = tracing_appender::non_blocking(rolling::daily(&dir, &prefix));

            tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_writer(non_blocking)
                        .with_ansi(false)
                        .with_target(false),
                )
                .try_init()
                .map_err(|e| anyhow::anyhow!("Failed to initialize file tracing subscriber: {}", e))?;

            info!("Logging to {}/{}.<YYYY-MM-DD>", dir, prefix);
            Ok(Some(guard))
        }
    }
}
