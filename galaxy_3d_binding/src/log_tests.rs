//! Unit tests for log.rs
//!
//! Tests LogSeverity, LogEntry, DefaultLogger formatting and the error macros.

use crate::log::{DefaultLogger, LogEntry, LogSeverity, Logger};
use crate::galaxy3d::{Error, Result};
use crate::test_logger::CapturedLogs;
use std::time::SystemTime;
use serial_test::serial;

// ============================================================================
// TEST HELPERS
// ============================================================================

fn entry(severity: LogSeverity, file: Option<&'static str>, line: Option<u32>) -> LogEntry {
    LogEntry {
        severity,
        timestamp: SystemTime::now(),
        source: "galaxy3d::ShaderResourceLayout".to_string(),
        message: "Shader variable 'g_Tex' is not found".to_string(),
        file,
        line,
    }
}

// ============================================================================
// LOG SEVERITY TESTS
// ============================================================================

#[test]
fn test_log_severity_ordering() {
    assert!(LogSeverity::Trace < LogSeverity::Debug);
    assert!(LogSeverity::Debug < LogSeverity::Info);
    assert!(LogSeverity::Info < LogSeverity::Warn);
    assert!(LogSeverity::Warn < LogSeverity::Error);
}

#[test]
fn test_log_severity_debug() {
    assert_eq!(format!("{:?}", LogSeverity::Warn), "Warn");
    assert_eq!(format!("{:?}", LogSeverity::Error), "Error");
}

// ============================================================================
// DEFAULT LOGGER FORMAT TESTS
// ============================================================================

#[test]
fn test_format_entry_without_location() {
    let line = DefaultLogger::format_entry(&entry(LogSeverity::Warn, None, None));
    assert!(line.contains("galaxy3d::ShaderResourceLayout"));
    assert!(line.contains("Shader variable 'g_Tex' is not found"));
    assert!(!line.contains(".rs:"));
}

#[test]
fn test_format_entry_with_location() {
    let line = DefaultLogger::format_entry(&entry(LogSeverity::Error, Some("layout.rs"), Some(42)));
    assert!(line.contains("(layout.rs:42)"));
}

#[test]
fn test_default_logger_does_not_panic() {
    DefaultLogger.log(&entry(LogSeverity::Info, None, None));
    DefaultLogger.log(&entry(LogSeverity::Error, Some("x.rs"), Some(1)));
}

// ============================================================================
// ERROR MACRO TESTS
// ============================================================================

#[test]
#[serial]
fn test_engine_err_defaults_to_backend_error() {
    let logs = CapturedLogs::install();
    let err = crate::engine_err!("galaxy3d::Test", "code {}", 7);

    assert!(matches!(err, Error::BackendError(ref msg) if msg == "code 7"));
    let captured = logs.entries();
    assert_eq!(captured.len(), 1);
    assert_eq!(captured[0].severity, LogSeverity::Error);
    assert!(captured[0].file.is_some());
}

#[test]
#[serial]
fn test_engine_err_with_variant() {
    let _logs = CapturedLogs::install();
    let err = crate::engine_err!("galaxy3d::Test", LayoutValidation => "table {} is empty", 3);

    assert!(matches!(err, Error::LayoutValidation(ref msg) if msg == "table 3 is empty"));
}

#[test]
#[serial]
fn test_engine_bail_returns_early() {
    fn failing(flag: bool) -> Result<u32> {
        if flag {
            crate::engine_bail!("galaxy3d::Test", UnsupportedResource => "tbuffer '{}'", "g_Data");
        }
        Ok(1)
    }

    let logs = CapturedLogs::install();
    let failed = failing(true);
    let succeeded = failing(false);

    assert!(matches!(failed, Err(Error::UnsupportedResource(_))));
    assert_eq!(succeeded.unwrap(), 1);
    assert_eq!(logs.errors(), 1);
}
