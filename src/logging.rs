//! Tracing setup: human-readable stderr output plus an optional JSON log file

use std::path::PathBuf;

use directories::ProjectDirs;
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    EnvFilter, Layer, filter::LevelFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt,
};

use crate::result::{BotError, Result};

pub const LOG_DIR_ENV: &str = "REVIEWBOT_LOG_DIR";

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Level for stderr when `RUST_LOG` is unset
    pub console_level: Level,
    pub file_level: Level,
    /// `None` disables the file log
    pub log_dir: Option<PathBuf>,
}

impl LoggingConfig {
    pub fn from_env() -> Self {
        let log_dir = std::env::var_os(LOG_DIR_ENV)
            .map(PathBuf::from)
            .or_else(|| ProjectDirs::from("", "", "reviewbot").map(|d| d.data_local_dir().join("logs")));

        Self { console_level: Level::WARN, file_level: Level::INFO, log_dir }
    }

    /// -v raises stderr to info, -vv to debug, -vvv and up to trace.
    pub fn with_verbosity(mut self, verbose: u8) -> Self {
        self.console_level = match verbose {
            0 => Level::WARN,
            1 => Level::INFO,
            2 => Level::DEBUG,
            _ => Level::TRACE,
        };
        self
    }

    /// Apply a level name from the config file; "off" disables the file log.
    pub fn with_file_level(mut self, level: Option<&str>) -> Self {
        match level {
            Some(l) if l.eq_ignore_ascii_case("off") => self.log_dir = None,
            Some(l) => {
                if let Ok(level) = l.parse() {
                    self.file_level = level;
                }
            },
            None => {},
        }
        self
    }
}

pub fn init_logging(config: LoggingConfig) -> Result<Option<WorkerGuard>> {
    let console_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(config.console_level).into())
        .from_env_lossy();
    let console = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .with_filter(console_filter);

    let (file, guard) = match &config.log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir).map_err(|e| {
                BotError::GeneralError(format!("failed to create log dir {}: {e}", dir.display()).into())
            })?;
            let appender = tracing_appender::rolling::daily(dir, "reviewbot.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .json()
                .with_writer(writer)
                .with_filter(LevelFilter::from_level(config.file_level));
            (Some(layer), Some(guard))
        },
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(console)
        .with(file)
        .try_init()
        .map_err(|e| BotError::GeneralError(format!("failed to initialize logging: {e}").into()))?;

    Ok(guard)
}
