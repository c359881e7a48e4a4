/// Capturing logger for unit tests (no console output)
///
/// Only entries emitted from the thread that installed the logger are kept,
/// so tests running in parallel cannot pollute each other's counts.

#[cfg(test)]
use std::sync::{Arc, Mutex};
#[cfg(test)]
use std::thread::{self, ThreadId};
#[cfg(test)]
use crate::galaxy3d::Engine;
#[cfg(test)]
use crate::log::{LogEntry, LogSeverity, Logger};

#[cfg(test)]
pub struct TestLogger {
    owner: ThreadId,
    entries: Arc<Mutex<Vec<LogEntry>>>,
}

#[cfg(test)]
impl Logger for TestLogger {
    fn log(&self, entry: &LogEntry) {
        if thread::current().id() == self.owner {
            self.entries.lock().unwrap().push(entry.clone());
        }
    }
}

/// Handle to the entries captured since `install()`
#[cfg(test)]
pub struct CapturedLogs {
    entries: Arc<Mutex<Vec<LogEntry>>>,
}

#[cfg(test)]
impl CapturedLogs {
    /// Install a fresh TestLogger as the global logger
    pub fn install() -> Self {
        let entries = Arc::new(Mutex::new(Vec::new()));
        Engine::set_logger(TestLogger {
            owner: thread::current().id(),
            entries: entries.clone(),
        });
        Self { entries }
    }

    pub fn count(&self, severity: LogSeverity) -> usize {
        self.entries.lock().unwrap().iter().filter(|e| e.severity == severity).count()
    }

    pub fn errors(&self) -> usize {
        self.count(LogSeverity::Error)
    }

    pub fn warnings(&self) -> usize {
        self.count(LogSeverity::Warn)
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    pub fn messages(&self) -> Vec<String> {
        self.entries.lock().unwrap().iter().map(|e| e.message.clone()).collect()
    }

    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.entries.lock().unwrap().clear();
    }
}

#[cfg(test)]
impl Drop for CapturedLogs {
    fn drop(&mut self) {
        Engine::reset_logger();
    }
}
