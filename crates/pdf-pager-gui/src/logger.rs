use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Local};
use log::{Level, LevelFilter, Metadata, Record};

#[derive(Clone)]
pub struct LogEntry {
    pub timestamp: DateTime<Local>,
    pub level: Level,
    pub target: String,
    pub message: String,
}

/// In-memory logger backing the log panel. Keeps the newest `max_entries`.
#[derive(Clone)]
pub struct AppLogger {
    entries: Arc<Mutex<VecDeque<LogEntry>>>,
    max_entries: usize,
    level: LevelFilter,
}

impl AppLogger {
    pub fn new(max_entries: usize, level: LevelFilter) -> Self {
        Self {
            entries: Arc::new(Mutex::new(VecDeque::new())),
            max_entries: max_entries.max(1),
            level,
        }
    }

    pub fn init(self) -> Result<(), log::SetLoggerError> {
        let level = self.level;
        log::set_boxed_logger(Box::new(self))?;
        log::set_max_level(level);
        Ok(())
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<LogEntry>> {
        // A panic while logging must not take the log panel down with it
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn entries(&self) -> Vec<LogEntry> {
        self.lock().iter().cloned().collect()
    }

    /// The latest warning or error, for the status line
    pub fn latest_problem(&self) -> Option<LogEntry> {
        self.lock()
            .iter()
            .rev()
            .find(|entry| entry.level <= Level::Warn)
            .cloned()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }
}

impl log::Log for AppLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let entry = LogEntry {
            timestamp: Local::now(),
            level: record.level(),
            target: record.target().to_string(),
            message: record.args().to_string(),
        };

        let mut entries = self.lock();
        entries.push_back(entry);
        while entries.len() > self.max_entries {
            entries.pop_front();
        }
    }

    fn flush(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use log::Log;

    fn record(level: Level, message: &str, f: impl FnOnce(&Record)) {
        f(&Record::builder()
            .level(level)
            .target("pdf_pager")
            .args(format_args!("{}", message))
            .build());
    }

    #[test]
    fn test_keeps_only_newest_entries() {
        let logger = AppLogger::new(2, LevelFilter::Debug);
        for message in ["one", "two", "three"] {
            record(Level::Info, message, |r| logger.log(r));
        }
        let messages: Vec<_> = logger.entries().into_iter().map(|e| e.message).collect();
        assert_eq!(messages, vec!["two", "three"]);
    }

    #[test]
    fn test_filters_below_level() {
        let logger = AppLogger::new(10, LevelFilter::Info);
        record(Level::Debug, "noise", |r| logger.log(r));
        record(Level::Warn, "careful", |r| logger.log(r));
        record(Level::Info, "fine", |r| logger.log(r));

        assert_eq!(logger.entries().len(), 2);
        assert_eq!(logger.latest_problem().unwrap().message, "careful");

        logger.clear();
        assert!(logger.entries().is_empty());
        assert!(logger.latest_problem().is_none());
    }
}
