//! DuckDB connection handling shared by both stores

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread;
use std::time::Duration;

use duckdb::Connection;
use tracing::warn;

use crate::domain::result::{Error, Result};
use crate::services::MigrationService;

/// Maximum number of retries when database file is locked
const MAX_RETRIES: u32 = 5;

/// Initial retry delay in milliseconds (doubles each retry: 50, 100, 200, 400, 800ms)
const INITIAL_RETRY_DELAY_MS: u64 = 50;

/// Check if an error message indicates a file locking issue that should be retried
fn is_retryable_error(err_msg: &str) -> bool {
    let lower = err_msg.to_lowercase();
    // Windows error messages
    lower.contains("being used by another process")
        || lower.contains("cannot access the file")
        // Unix/macOS error messages
        || lower.contains("resource temporarily unavailable")
        || lower.contains("database is locked")
        || lower.contains("file is already open")
        || lower.contains("could not set lock")
}

/// Open a database file, retrying with exponential backoff while it is locked
pub fn open_with_retry(db_path: &Path) -> Result<Connection> {
    let mut last_error = None;

    for attempt in 0..MAX_RETRIES {
        match try_open_connection(db_path) {
            Ok(conn) => return Ok(conn),
            Err(e) => {
                let err_msg = e.to_string();
                if is_retryable_error(&err_msg) && attempt < MAX_RETRIES - 1 {
                    let delay = Duration::from_millis(INITIAL_RETRY_DELAY_MS * 2u64.pow(attempt));
                    warn!(
                        path = %db_path.display(),
                        delay_ms = delay.as_millis() as u64,
                        attempt = attempt + 1,
                        max = MAX_RETRIES,
                        error = %err_msg,
                        "database busy, retrying"
                    );
                    thread::sleep(delay);
                    last_error = Some(e);
                    continue;
                }
                return Err(e);
            }
        }
    }

    Err(last_error.unwrap_or_else(|| {
        Error::database(format!("Failed to open database after {} retries", MAX_RETRIES))
    }))
}

fn try_open_connection(db_path: &Path) -> Result<Connection> {
    // Autoloaded extensions are never needed and can fail code-signing checks
    let config = duckdb::Config::default().enable_autoload_extension(false)?;
    Ok(Connection::open_with_flags(db_path, config)?)
}

/// A migrated connection guarded for use from many request tasks
///
/// Clones share the same connection.
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Open `db_path` and apply `migrations`
    pub fn open(db_path: &Path, migrations: &'static [(&'static str, &'static str)]) -> Result<Self> {
        Self::migrated(open_with_retry(db_path)?, migrations)
    }

    pub fn open_in_memory(migrations: &'static [(&'static str, &'static str)]) -> Result<Self> {
        Self::migrated(Connection::open_in_memory()?, migrations)
    }

    fn migrated(
        conn: Connection,
        migrations: &'static [(&'static str, &'static str)],
    ) -> Result<Self> {
        MigrationService::new(&conn, migrations).run_pending()?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| Error::database(format!("Lock poisoned: {}", e)))
    }
}

/// Run store work on the blocking pool
///
/// Waiting on the connection lock or a running query never occupies an
/// async worker, so a request deadline can fire while the work is still
/// running. The work itself runs to completion; only its result is dropped.
pub async fn blocking<T, F>(work: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| Error::database(format!("Store task failed: {}", e)))?
}

/// `?, ?, ?` for an `IN (...)` list of `count` parameters
pub fn placeholders(count: usize) -> String {
    vec!["?"; count].join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholders() {
        assert_eq!(placeholders(1), "?");
        assert_eq!(placeholders(3), "?, ?, ?");
    }

    #[tokio::test]
    async fn test_blocking_returns_work_result() {
        assert_eq!(blocking(|| Ok(7)).await.unwrap(), 7);
        let err = blocking(|| Err::<(), _>(Error::database("gone"))).await.unwrap_err();
        assert!(matches!(err, Error::Database(_)));
    }

    #[test]
    fn test_retryable_errors() {
        assert!(is_retryable_error("IO Error: Could not set lock on file"));
        assert!(is_retryable_error("database is locked"));
        assert!(!is_retryable_error("Catalog Error: Table does not exist"));
    }
}
