//! Core logging bootstrap.
//!
//! # Responsibility
//! - Initialize rolling file logs exactly once per process.
//! - Resolve logging configuration from the host app or environment.
//!
//! # Invariants
//! - Init is idempotent for the same level and directory.
//! - Re-initialization with a different level or directory is rejected.
//! - Initialization never panics.
//! - Log lines carry ids, counts and states only, never todo text.

use flexi_logger::{Cleanup, Criterion, FileSpec, Logger, LoggerHandle, Naming, WriteMode};
use log::{error, info};
use once_cell::sync::OnceCell;
use std::path::{Path, PathBuf};

/// Environment variable holding the log level.
pub const LOG_LEVEL_ENV: &str = "SECURETODO_LOG_LEVEL";
/// Environment variable holding the absolute log directory.
pub const LOG_DIR_ENV: &str = "SECURETODO_LOG_DIR";

const LOG_FILE_BASENAME: &str = "securetodo";
const MAX_LOG_FILE_SIZE_BYTES: u64 = 5 * 1024 * 1024;
const MAX_LOG_FILES: usize = 3;
const MAX_PANIC_PAYLOAD_CHARS: usize = 160;

static LOGGING_STATE: OnceCell<LoggingState> = OnceCell::new();
static PANIC_HOOK_INSTALLED: OnceCell<()> = OnceCell::new();

struct LoggingState {
    level: &'static str,
    log_dir: PathBuf,
    _logger: LoggerHandle,
}

/// Validated logging configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    pub level: &'static str,
    pub log_dir: PathBuf,
}

impl LogConfig {
    /// Validates raw level and directory values.
    ///
    /// # Errors
    /// - Unsupported level.
    /// - Empty or relative directory.
    pub fn new(level: &str, log_dir: &str) -> Result<Self, String> {
        Ok(Self {
            level: normalize_level(level)?,
            log_dir: normalize_log_dir(log_dir)?,
        })
    }

    /// Reads `SECURETODO_LOG_LEVEL` / `SECURETODO_LOG_DIR`.
    ///
    /// Returns `Ok(None)` when no directory is configured. A missing level
    /// falls back to `default_log_level()`.
    ///
    /// # Errors
    /// Same as `LogConfig::new` for values that are present.
    pub fn from_env() -> Result<Option<Self>, String> {
        let Some(log_dir) = std::env::var(LOG_DIR_ENV)
            .ok()
            .filter(|value| !value.trim().is_empty())
        else {
            return Ok(None);
        };
        let level = std::env::var(LOG_LEVEL_ENV)
            .ok()
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| default_log_level().to_string());
        Self::new(&level, &log_dir).map(Some)
    }
}

/// Initializes core logging with level and directory.
///
/// # Errors
/// - Invalid level or directory.
/// - Directory cannot be created or the logger backend fails to start.
/// - Logging is already active with a different level or directory.
pub fn init_logging(level: &str, log_dir: &str) -> Result<(), String> {
    init_logging_with(&LogConfig::new(level, log_dir)?)
}

/// Initializes core logging from a validated config.
///
/// # Errors
/// Same as `init_logging`, minus input validation.
pub fn init_logging_with(config: &LogConfig) -> Result<(), String> {
    if let Some(state) = LOGGING_STATE.get() {
        return ensure_same_config(state, config);
    }

    let state = LOGGING_STATE.get_or_try_init(|| -> Result<LoggingState, String> {
        std::fs::create_dir_all(&config.log_dir).map_err(|err| {
            format!(
                "failed to create log directory `{}`: {err}",
                config.log_dir.display()
            )
        })?;

        let logger = Logger::try_with_str(config.level)
            .map_err(|err| format!("invalid log level `{}`: {err}", config.level))?
            .log_to_file(
                FileSpec::default()
                    .directory(config.log_dir.as_path())
                    .basename(LOG_FILE_BASENAME),
            )
            .rotate(
                Criterion::Size(MAX_LOG_FILE_SIZE_BYTES),
                Naming::Numbers,
                Cleanup::KeepLogFiles(MAX_LOG_FILES),
            )
            .write_mode(WriteMode::BufferAndFlush)
            .append()
            .format_for_files(flexi_logger::detailed_format)
            .start()
            .map_err(|err| format!("failed to start logger: {err}"))?;

        install_panic_hook_once();

        info!(
            "event=app_start module=core status=ok platform={} build_mode={} version={}",
            std::env::consts::OS,
            if cfg!(debug_assertions) { "debug" } else { "release" },
            env!("CARGO_PKG_VERSION")
        );
        info!(
            "event=logging_init module=core status=ok level={} log_dir={}",
            config.level,
            config.log_dir.display()
        );

        Ok(LoggingState {
            level: config.level,
            log_dir: config.log_dir.clone(),
            _logger: logger,
        })
    })?;

    ensure_same_config(state, config)
}

/// Initializes logging from environment variables, if configured.
///
/// Returns `Ok(false)` when `SECURETODO_LOG_DIR` is unset.
///
/// # Errors
/// Same as `init_logging`.
pub fn init_logging_from_env() -> Result<bool, String> {
    match LogConfig::from_env()? {
        Some(config) => init_logging_with(&config).map(|()| true),
        None => Ok(false),
    }
}

/// Returns `(level, log_dir)` when logging is active.
pub fn logging_status() -> Option<(&'static str, PathBuf)> {
    LOGGING_STATE
        .get()
        .map(|state| (state.level, state.log_dir.clone()))
}

/// `debug` for debug builds, `info` for release builds.
pub fn default_log_level() -> &'static str {
    if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    }
}

const LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

fn ensure_same_config(state: &LoggingState, config: &LogConfig) -> Result<(), String> {
    if state.log_dir == config.log_dir && state.level == config.level {
        return Ok(());
    }
    Err(format!(
        "securetodo logging is active as `{}` in `{}`; cannot switch to `{}` in `{}`",
        state.level,
        state.log_dir.display(),
        config.level,
        config.log_dir.display()
    ))
}

fn normalize_level(level: &str) -> Result<&'static str, String> {
    let wanted = match level.trim().to_ascii_lowercase().as_str() {
        "warning" => "warn".to_string(),
        other => other.to_string(),
    };
    LEVELS
        .iter()
        .copied()
        .find(|known| *known == wanted)
        .ok_or_else(|| {
            format!(
                "{LOG_LEVEL_ENV} `{}` is not one of {}",
                level.trim(),
                LEVELS.join("|")
            )
        })
}

fn normalize_log_dir(log_dir: &str) -> Result<PathBuf, String> {
    let path = Path::new(log_dir.trim());
    if path.as_os_str().is_empty() || !path.is_absolute() {
        return Err(format!(
            "{LOG_DIR_ENV} must be an absolute directory, got `{}`",
            log_dir.trim()
        ));
    }
    Ok(path.to_path_buf())
}

fn install_panic_hook_once() {
    PANIC_HOOK_INSTALLED.get_or_init(|| {
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            let location = info
                .location()
                .map_or_else(|| "unknown".to_string(), |loc| format!("{}:{}", loc.file(), loc.line()));
            let payload = info
                .payload()
                .downcast_ref::<&str>()
                .map(|message| (*message).to_string())
                .or_else(|| info.payload().downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "non-string panic payload".to_string());
            // Payload may echo todo text; keep it short and on one line.
            error!(
                "event=panic_captured module=core status=error location={location} payload={}",
                one_line(&payload, MAX_PANIC_PAYLOAD_CHARS)
            );
            previous(info);
        }));
    });
}

fn one_line(value: &str, max_chars: usize) -> String {
    let mut chars = value.chars().map(|c| if c == '\n' || c == '\r' { ' ' } else { c });
    let mut line: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() {
        line.push_str("...");
    }
    line
}
