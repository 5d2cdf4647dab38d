//! Concrete logging sinks for native hosts.

use crate::domain::logging::{LogEntry, LogLevel, Logger, TimeProvider, get_time_provider};
use chrono::{TimeZone, Utc};
use std::io::Write;

/// Writes `[time] LEVEL component: message` lines to stderr.
pub struct ConsoleLogger {
    min_level: LogLevel,
}

impl ConsoleLogger {
    pub fn new(min_level: LogLevel) -> Self {
        Self { min_level }
    }

    pub fn new_production() -> Self {
        Self::new(LogLevel::Info)
    }

    pub fn new_development() -> Self {
        Self::new(LogLevel::Debug)
    }

    pub fn min_level(&self) -> LogLevel {
        self.min_level
    }

    pub fn format_log_entry(&self, entry: &LogEntry) -> String {
        let timestamp = get_time_provider().format_timestamp(entry.timestamp);
        match &entry.metadata {
            Some(metadata) => format!(
                "[{}] {} {}: {} | {}",
                timestamp, entry.level, entry.component, entry.message, metadata
            ),
            None => format!("[{}] {} {}: {}", timestamp, entry.level, entry.component, entry.message),
        }
    }
}

impl Default for ConsoleLogger {
    fn default() -> Self {
        if cfg!(debug_assertions) { Self::new_development() } else { Self::new_production() }
    }
}

impl Logger for ConsoleLogger {
    fn log(&self, entry: LogEntry) {
        if !self.enabled(entry.level) {
            return;
        }
        let line = self.format_log_entry(&entry);
        let _ = writeln!(std::io::stderr().lock(), "{line}");
    }

    fn enabled(&self, level: LogLevel) -> bool {
        level >= self.min_level
    }
}

/// Wall clock in Unix milliseconds
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTimeProvider;

impl SystemTimeProvider {
    pub fn new() -> Self {
        Self
    }
}

impl TimeProvider for SystemTimeProvider {
    fn current_timestamp(&self) -> u64 {
        Utc::now().timestamp_millis().max(0) as u64
    }

    fn format_timestamp(&self, timestamp: u64) -> String {
        match Utc.timestamp_millis_opt(timestamp as i64).single() {
            Some(time) => time.format("%H:%M:%S%.3f").to_string(),
            None => timestamp.to_string(),
        }
    }
}
