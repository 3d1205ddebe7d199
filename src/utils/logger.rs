//! log4rs wiring for the cache.
//!
//! Two rolling files are written under the chosen directory: `app.log` for
//! everything routed through the root logger and `metrics.log` for the
//! periodic counters emitted on [`METRICS_TARGET`] by the maintenance thread.

use crate::errors::CacheError;
use log::LevelFilter;
use log4rs::append::rolling_file::RollingFileAppender;
use log4rs::append::rolling_file::policy::compound::{
    CompoundPolicy, roll::fixed_window::FixedWindowRoller, trigger::size::SizeTrigger,
};
use log4rs::config::{Appender, Config, Logger, Root};
use log4rs::encode::pattern::PatternEncoder;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Target used for periodic metrics lines.
pub const METRICS_TARGET: &str = "mediacache::metrics";

const PATTERN: &str = "{d(%Y-%m-%d %H:%M:%S%.3f)} [{l}] {t} - {m}{n}";
const ROLL_SIZE: u64 = 10 * 1024 * 1024;

static HANDLE: OnceLock<log4rs::Handle> = OnceLock::new();

/// Initializes the logging system from a log4rs YAML/TOML file.
///
/// # Errors
/// Returns `CacheError::Logger` if the file cannot be read or a logger is already set.
pub fn init_path(path: &Path) -> Result<(), CacheError> {
    log4rs::init_file(path, log4rs::config::Deserializers::default()).map_err(logger_error)
}

fn logger_error(e: impl std::fmt::Display) -> CacheError {
    CacheError::Logger(e.to_string())
}

fn parse_level(level: Option<&str>) -> LevelFilter {
    match level.unwrap_or("info").to_ascii_lowercase().as_str() {
        "off" => LevelFilter::Off,
        "error" => LevelFilter::Error,
        "warn" => LevelFilter::Warn,
        "debug" => LevelFilter::Debug,
        "trace" => LevelFilter::Trace,
        _ => LevelFilter::Info,
    }
}

fn rolling(base: &Path, stem: &str, keep: u32) -> Result<RollingFileAppender, CacheError> {
    let roller = FixedWindowRoller::builder()
        .build(&format!("{}", base.join(format!("{stem}.{{}}.log")).display()), keep)
        .map_err(logger_error)?;
    let policy = CompoundPolicy::new(Box::new(SizeTrigger::new(ROLL_SIZE)), Box::new(roller));
    let appender = RollingFileAppender::builder()
        .encoder(Box::new(PatternEncoder::new(PATTERN)))
        .build(base.join(format!("{stem}.log")), Box::new(policy))?;
    Ok(appender)
}

/// Configure logging globally for the process.
///
/// - dir: base directory for logs; if None, current directory.
/// - level: off|error|warn|info|debug|trace
/// - retention: number of rolled files to keep (default 7)
///
/// A second call replaces the active configuration.
///
/// # Errors
/// Returns `CacheError::Io` if the directory cannot be created and
/// `CacheError::Logger` if the appenders or the global logger cannot be set up.
pub fn configure_logging(
    dir: Option<&Path>,
    level: Option<&str>,
    retention: Option<usize>,
) -> Result<(), CacheError> {
    let base = dir
        .map(PathBuf::from)
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));
    std::fs::create_dir_all(&base)?;
    let keep = u32::try_from(retention.unwrap_or(7)).unwrap_or(u32::MAX);
    let lvl = parse_level(level);

    let config = Config::builder()
        .appender(Appender::builder().build("app", Box::new(rolling(&base, "app", keep)?)))
        .appender(Appender::builder().build("metrics", Box::new(rolling(&base, "metrics", keep)?)))
        .logger(Logger::builder().appender("metrics").additive(false).build(METRICS_TARGET, lvl))
        .build(Root::builder().appender("app").build(lvl))
        .map_err(logger_error)?;

    if let Some(handle) = HANDLE.get() {
        handle.set_config(config);
        return Ok(());
    }
    let handle = log4rs::init_config(config).map_err(logger_error)?;
    let _ = HANDLE.set(handle);
    Ok(())
}

/// Configure logging from environment variables if present:
/// - MEDIACACHE_LOG_DIR
/// - MEDIACACHE_LOG_LEVEL
/// - MEDIACACHE_LOG_RETENTION
///
/// # Errors
/// Propagates failures from [`configure_logging`].
pub fn configure_from_env() -> Result<(), CacheError> {
    let dir = std::env::var("MEDIACACHE_LOG_DIR").ok().map(PathBuf::from);
    let level = std::env::var("MEDIACACHE_LOG_LEVEL").ok();
    let retention =
        std::env::var("MEDIACACHE_LOG_RETENTION").ok().and_then(|s| s.parse::<usize>().ok());
    configure_logging(dir.as_deref(), level.as_deref(), retention)
}
