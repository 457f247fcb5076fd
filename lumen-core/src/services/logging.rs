//! Logging service - structured event logging to DuckDB
//!
//! Records request outcomes in logs.duckdb. Events carry the operation
//! name, listing mode, row count and error classification only. Addresses,
//! balances and other account data are never logged.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use chrono::Utc;
use duckdb::Connection;
use serde::{Deserialize, Serialize};

use crate::adapters::duckdb::open_with_retry;
use crate::domain::result::{Error, Result};
use crate::log_migrations::LOG_MIGRATIONS;

use super::migration::MigrationService;

/// Counter for generating unique IDs within the same millisecond
static ID_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Generate a unique ID based on timestamp + counter
fn generate_id() -> u64 {
    let timestamp = now_ms() as u64;

    // Lower 16 bits: per-millisecond counter
    let counter = ID_COUNTER.fetch_add(1, Ordering::Relaxed) & 0xFFFF;
    (timestamp << 16) | counter
}

fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

/// Detect the current platform
fn detect_platform() -> &'static str {
    if cfg!(target_os = "macos") {
        "macos"
    } else if cfg!(target_os = "windows") {
        "windows"
    } else if cfg!(target_os = "linux") {
        "linux"
    } else {
        "unknown"
    }
}

/// Which surface issued the request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryPoint {
    Cli,
    Server,
}

impl EntryPoint {
    fn as_str(&self) -> &'static str {
        match self {
            EntryPoint::Cli => "cli",
            EntryPoint::Server => "server",
        }
    }
}

/// A log event to be recorded
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEvent {
    pub event: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record_count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl LogEvent {
    pub fn new(event: impl Into<String>) -> Self {
        Self {
            event: event.into(),
            request_id: None,
            mode: None,
            record_count: None,
            error_message: None,
        }
    }

    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    /// Listing mode ("signer" or "asset")
    pub fn with_mode(mut self, mode: impl Into<String>) -> Self {
        self.mode = Some(mode.into());
        self
    }

    pub fn with_record_count(mut self, count: u64) -> Self {
        self.record_count = Some(count);
        self
    }

    pub fn with_error(mut self, message: impl Into<String>) -> Self {
        self.error_message = Some(message.into());
        self
    }
}

/// A log entry as stored in the database
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: u64,
    pub timestamp: i64,
    pub entry_point: String,
    pub app_version: String,
    pub platform: String,
    pub event: String,
    pub request_id: Option<String>,
    pub mode: Option<String>,
    pub record_count: Option<u64>,
    pub error_message: Option<String>,
}

/// Privacy-safe description of a failure: kind and stage, no payload
pub fn describe_error(err: &Error) -> String {
    let kind = match err {
        Error::NotFound(_) => "not_found",
        Error::Validation(_) => "validation",
        Error::Query { .. } => "query_failed",
        Error::Cancelled { .. } => "cancelled",
        _ => "internal",
    };
    match err.stage() {
        Some(stage) => format!("{}:{}", kind, stage),
        None => kind.to_string(),
    }
}

/// Service for structured event logging
pub struct LoggingService {
    conn: Mutex<Connection>,
    db_path: Option<PathBuf>,
    entry_point: EntryPoint,
    app_version: String,
    platform: &'static str,
}

impl LoggingService {
    /// Open or create logs.duckdb in `data_dir` and run pending migrations
    pub fn new(
        data_dir: &Path,
        entry_point: EntryPoint,
        app_version: impl Into<String>,
    ) -> Result<Self> {
        let db_path = data_dir.join("logs.duckdb");
        let conn = open_with_retry(&db_path)?;
        Self::with_connection(conn, Some(db_path), entry_point, app_version)
    }

    /// Log to an in-memory database
    pub fn in_memory(entry_point: EntryPoint, app_version: impl Into<String>) -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::with_connection(conn, None, entry_point, app_version)
    }

    fn with_connection(
        conn: Connection,
        db_path: Option<PathBuf>,
        entry_point: EntryPoint,
        app_version: impl Into<String>,
    ) -> Result<Self> {
        MigrationService::new(&conn, LOG_MIGRATIONS).run_pending()?;
        Ok(Self {
            conn: Mutex::new(conn),
            db_path,
            entry_point,
            app_version: app_version.into(),
            platform: detect_platform(),
        })
    }

    pub(crate) fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| Error::database(format!("Lock poisoned: {}", e)))
    }

    /// Log an event
    ///
    /// The entry point, app version and platform are added from the
    /// service configuration.
    pub fn log(&self, event: LogEvent) -> Result<()> {
        let conn = self.lock()?;

        conn.execute(
            r#"
            INSERT INTO sys_logs (
                id, timestamp, entry_point, app_version, platform,
                event, request_id, mode, record_count, error_message
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
            duckdb::params![
                generate_id(),
                now_ms(),
                self.entry_point.as_str(),
                &self.app_version,
                self.platform,
                &event.event,
                &event.request_id,
                &event.mode,
                &event.record_count,
                &event.error_message,
            ],
        )?;

        Ok(())
    }

    /// Most recent entries first
    pub fn get_recent(&self, limit: usize) -> Result<Vec<LogEntry>> {
        self.select_entries("", limit)
    }

    /// Most recent failed requests first
    pub fn get_errors(&self, limit: usize) -> Result<Vec<LogEntry>> {
        self.select_entries("WHERE error_message IS NOT NULL", limit)
    }

    fn select_entries(&self, filter: &str, limit: usize) -> Result<Vec<LogEntry>> {
        let conn = self.lock()?;

        let sql = format!(
            "SELECT id, timestamp, entry_point, app_version, platform,
                    event, request_id, mode, record_count, error_message
             FROM sys_logs
             {}
             ORDER BY id DESC
             LIMIT ?",
            filter
        );
        let mut stmt = conn.prepare(&sql)?;

        let entries = stmt
            .query_map([limit as i64], |row| {
                Ok(LogEntry {
                    id: row.get(0)?,
                    timestamp: row.get(1)?,
                    entry_point: row.get(2)?,
                    app_version: row.get(3)?,
                    platform: row.get(4)?,
                    event: row.get(5)?,
                    request_id: row.get(6)?,
                    mode: row.get(7)?,
                    record_count: row.get(8)?,
                    error_message: row.get(9)?,
                })
            })?
            .collect::<duckdb::Result<Vec<_>>>()?;

        Ok(entries)
    }

    pub fn count(&self) -> Result<u64> {
        let conn = self.lock()?;
        let count: u64 = conn.query_row("SELECT COUNT(*) FROM sys_logs", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Delete logs older than the specified timestamp (unix ms)
    pub fn delete_before(&self, timestamp_ms: i64) -> Result<u64> {
        let conn = self.lock()?;
        let deleted = conn.execute("DELETE FROM sys_logs WHERE timestamp < ?", [timestamp_ms])?;
        Ok(deleted as u64)
    }

    /// Path of logs.duckdb, `None` for in-memory logs
    pub fn db_path(&self) -> Option<&Path> {
        self.db_path.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::result::QueryStage;
    use tempfile::tempdir;

    #[test]
    fn test_logging_service_creation() {
        let dir = tempdir().unwrap();
        let service = LoggingService::new(dir.path(), EntryPoint::Cli, "1.0.0").unwrap();

        assert!(service.db_path().unwrap().exists());
    }

    #[test]
    fn test_log_event() {
        let service = LoggingService::in_memory(EntryPoint::Cli, "1.0.0").unwrap();

        service
            .log(LogEvent::new("accounts.list").with_mode("asset").with_record_count(3))
            .unwrap();

        let entries = service.get_recent(10).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].event, "accounts.list");
        assert_eq!(entries[0].mode.as_deref(), Some("asset"));
        assert_eq!(entries[0].record_count, Some(3));
        assert_eq!(entries[0].entry_point, "cli");
        assert_eq!(entries[0].app_version, "1.0.0");
    }

    #[test]
    fn test_get_errors_only_returns_failures() {
        let service = LoggingService::in_memory(EntryPoint::Server, "1.0.0").unwrap();

        service.log(LogEvent::new("account.get")).unwrap();
        service
            .log(LogEvent::new("account.get").with_error("not_found"))
            .unwrap();

        let errors = service.get_errors(10).unwrap();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].error_message.as_deref(), Some("not_found"));
        assert_eq!(errors[0].entry_point, "server");
    }

    #[test]
    fn test_count_and_delete() {
        let service = LoggingService::in_memory(EntryPoint::Cli, "1.0.0").unwrap();

        for _ in 0..3 {
            service.log(LogEvent::new("account.get")).unwrap();
        }
        assert_eq!(service.count().unwrap(), 3);

        let deleted = service.delete_before(now_ms() + 1000).unwrap();
        assert_eq!(deleted, 3);
        assert_eq!(service.count().unwrap(), 0);
    }

    #[test]
    fn test_describe_error_has_no_payload() {
        let err = Error::query(QueryStage::BatchData, Error::database("GABC... secret"));
        assert_eq!(describe_error(&err), "query_failed:batch-data");
        assert_eq!(describe_error(&Error::not_found("GABC")), "not_found");
    }
}
