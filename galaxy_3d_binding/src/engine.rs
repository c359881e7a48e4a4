/// Galaxy3D binding engine - global logger and configuration
///
/// The binding layer has no other singletons: layouts, caches and bindings are
/// plain values owned by their creators. Only the logging sink and the
/// configuration are process-wide.

use std::sync::{OnceLock, RwLock};
use std::time::SystemTime;
use crate::config::Config;
use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger};

// ===== INTERNAL STATE =====

/// Global logger (initialized with DefaultLogger)
static LOGGER: OnceLock<RwLock<Box<dyn Logger>>> = OnceLock::new();

/// Global configuration (initialized with Config::default())
static CONFIG: OnceLock<RwLock<Config>> = OnceLock::new();

fn logger_lock() -> &'static RwLock<Box<dyn Logger>> {
    LOGGER.get_or_init(|| RwLock::new(Box::new(DefaultLogger)))
}

fn config_lock() -> &'static RwLock<Config> {
    CONFIG.get_or_init(|| RwLock::new(Config::default()))
}

// ===== PUBLIC API =====

/// Process-wide services of the binding layer
///
/// # Example
///
/// ```no_run
/// use galaxy_3d_binding::galaxy3d::{Config, Engine};
///
/// Engine::set_config(Config {
///     sampler_suffix: "_smp".to_string(),
///     ..Config::default()
/// });
/// ```
pub struct Engine;

impl Engine {
    // ===== CONFIGURATION API =====

    /// Replace the global configuration
    pub fn set_config(config: Config) {
        if let Ok(mut lock) = config_lock().write() {
            *lock = config;
        }
    }

    /// Snapshot of the current configuration
    ///
    /// Falls back to the default configuration if the lock is poisoned.
    pub fn config() -> Config {
        config_lock()
            .read()
            .map(|config| config.clone())
            .unwrap_or_default()
    }

    /// Restore the default configuration
    pub fn reset_config() {
        Self::set_config(Config::default());
    }

    // ===== LOGGING API =====

    /// Set a custom logger
    ///
    /// # Example
    ///
    /// ```no_run
    /// use galaxy_3d_binding::galaxy3d::{Engine, log::{Logger, LogEntry}};
    ///
    /// struct FileLogger;
    /// impl Logger for FileLogger {
    ///     fn log(&self, entry: &LogEntry) {
    ///         // Write to file...
    ///     }
    /// }
    ///
    /// Engine::set_logger(FileLogger);
    /// ```
    pub fn set_logger<L: Logger + 'static>(logger: L) {
        if let Ok(mut lock) = logger_lock().write() {
            *lock = Box::new(logger);
        }
    }

    /// Reset logger to default (DefaultLogger)
    pub fn reset_logger() {
        if let Ok(mut lock) = logger_lock().write() {
            *lock = Box::new(DefaultLogger);
        }
    }

    /// Log without file:line (used by engine_info!, engine_warn!, ...)
    pub fn log(severity: LogSeverity, source: &str, message: String) {
        if let Ok(lock) = logger_lock().read() {
            lock.log(&LogEntry {
                severity,
                timestamp: SystemTime::now(),
                source: source.to_string(),
                message,
                file: None,
                line: None,
            });
        }
    }

    /// Log with file:line information (used by engine_error!)
    pub fn log_detailed(
        severity: LogSeverity,
        source: &str,
        message: String,
        file: &'static str,
        line: u32,
    ) {
        if let Ok(lock) = logger_lock().read() {
            lock.log(&LogEntry {
                severity,
                timestamp: SystemTime::now(),
                source: source.to_string(),
                message,
                file: Some(file),
                line: Some(line),
            });
        }
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
