//! Append-only audit log.
//!
//! One record is written per completed generation; records are never
//! updated or deleted. Entries are ordered by a monotonically increasing
//! sequence id assigned at insertion; wall-clock timestamps are recorded
//! for operators but never used for ordering, since they are not unique
//! under concurrent writes.

use chrono::Utc;
use promptdoc_core::{AppError, AppResult};
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

/// One processed-request record, as handed to the sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditRecord {
    /// Rendered prompt text sent to the provider
    pub prompt_text: String,

    /// Generated response text
    pub response_text: String,

    /// Caller identity
    pub user: String,

    /// Purpose the request was processed under
    pub purpose: String,

    /// Provider that served the request
    pub provider: String,

    /// Id of the resolved active prompt
    pub prompt_id: String,

    /// Wall-clock latency of the generation call
    pub latency_ms: u64,
}

/// A stored audit entry: the record plus its assigned ordering.
#[derive(Debug, Clone)]
pub struct AuditEntry {
    /// Monotonically increasing sequence id
    pub seq: i64,

    /// RFC3339 insertion timestamp
    pub timestamp: String,

    /// The recorded request/response
    pub record: AuditRecord,
}

/// A mirrored application log event.
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub seq: i64,
    pub timestamp: String,
    pub level: String,
    pub target: String,
    pub message: String,
}

/// Write-side contract the processor depends on.
///
/// Append failures must be tolerable: the processor logs and discards them,
/// so a broken audit store never fails a user-visible response.
pub trait AuditSink: Send + Sync {
    /// Append one record.
    fn append(&self, record: &AuditRecord) -> AppResult<()>;

    /// Most recent entries, newest first, optionally filtered.
    fn recent(
        &self,
        limit: usize,
        user: Option<&str>,
        purpose: Option<&str>,
    ) -> AppResult<Vec<AuditEntry>>;
}

/// SQLite-backed audit log.
#[derive(Debug)]
pub struct SqliteAuditLog {
    conn: Mutex<Connection>,
}

impl SqliteAuditLog {
    /// Open (and if needed initialize) the audit log at the given path.
    pub fn open(db_path: &Path) -> AppResult<Self> {
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    AppError::Storage(format!("Failed to create audit directory: {}", e))
                })?;
            }
        }

        let conn = Connection::open(db_path)
            .map_err(|e| AppError::Storage(format!("Failed to open audit database: {}", e)))?;
        Self::init_schema(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open an in-memory audit log, for tests.
    pub fn open_in_memory() -> AppResult<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| AppError::Storage(format!("Failed to open audit database: {}", e)))?;
        Self::init_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn init_schema(conn: &Connection) -> AppResult<()> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS predictions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                prompt TEXT NOT NULL,
                response TEXT NOT NULL,
                timestamp TEXT NOT NULL,
                user_id TEXT NOT NULL,
                purpose TEXT NOT NULL,
                provider TEXT NOT NULL,
                prompt_id TEXT NOT NULL,
                latency_ms INTEGER NOT NULL
            );

            CREATE TABLE IF NOT EXISTS logs (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                timestamp TEXT NOT NULL,
                level TEXT NOT NULL,
                target TEXT NOT NULL,
                message TEXT NOT NULL
            );
            "#,
        )
        .map_err(|e| AppError::Storage(format!("Failed to create audit tables: {}", e)))
    }

    fn conn(&self) -> AppResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| AppError::Storage("Audit connection lock poisoned".to_string()))
    }

    /// Mirror one application log event into the `logs` table.
    pub fn log_event(&self, level: &str, target: &str, message: &str) -> AppResult<()> {
        self.conn()?
            .execute(
                "INSERT INTO logs (timestamp, level, target, message) VALUES (?1, ?2, ?3, ?4)",
                params![Utc::now().to_rfc3339(), level, target, message],
            )
            .map_err(|e| AppError::Storage(format!("Failed to insert log event: {}", e)))?;
        Ok(())
    }

    /// Most recent log events, newest first, optionally filtered by level.
    pub fn recent_logs(&self, limit: usize, level: Option<&str>) -> AppResult<Vec<LogEntry>> {
        let conn = self.conn()?;

        let mut stmt = match level {
            Some(_) => conn.prepare(
                "SELECT id, timestamp, level, target, message FROM logs
                 WHERE level = ?1 ORDER BY id DESC LIMIT ?2",
            ),
            None => conn.prepare(
                "SELECT id, timestamp, level, target, message FROM logs
                 ORDER BY id DESC LIMIT ?1",
            ),
        }
        .map_err(|e| AppError::Storage(format!("Failed to prepare log query: {}", e)))?;

        let map_row = |row: &rusqlite::Row<'_>| -> rusqlite::Result<LogEntry> {
            Ok(LogEntry {
                seq: row.get(0)?,
                timestamp: row.get(1)?,
                level: row.get(2)?,
                target: row.get(3)?,
                message: row.get(4)?,
            })
        };

        let rows = match level {
            Some(l) => stmt.query_map(params![l, limit as i64], map_row),
            None => stmt.query_map(params![limit as i64], map_row),
        }
        .map_err(|e| AppError::Storage(format!("Failed to query logs: {}", e)))?;

        rows.collect::<Result<Vec<_>, _>>()
            .map_err(|e| AppError::Storage(format!("Failed to read log row: {}", e)))
    }

}

impl AuditSink for SqliteAuditLog {
    fn append(&self, record: &AuditRecord) -> AppResult<()> {
        self.conn()?
            .execute(
                "INSERT INTO predictions
                 (prompt, response, timestamp, user_id, purpose, provider, prompt_id, latency_ms)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    record.prompt_text,
                    record.response_text,
                    Utc::now().to_rfc3339(),
                    record.user,
                    record.purpose,
                    record.provider,
                    record.prompt_id,
                    record.latency_ms as i64,
                ],
            )
            .map_err(|e| AppError::Storage(format!("Failed to append audit record: {}", e)))?;
        Ok(())
    }

    fn recent(
        &self,
        limit: usize,
        user: Option<&str>,
        purpose: Option<&str>,
    ) -> AppResult<Vec<AuditEntry>> {
        let conn = self.conn()?;

        // Optional filters fold into the query; ordering is always by the
        // insertion sequence id.
        let mut sql = String::from(
            "SELECT id, timestamp, prompt, response, user_id, purpose, provider, prompt_id, latency_ms
             FROM predictions WHERE 1=1",
        );
        let mut args: Vec<Box<dyn rusqlite::types::ToSql>> = Vec::new();

        if let Some(user) = user {
            sql.push_str(" AND user_id = ?");
            args.push(Box::new(user.to_string()));
        }
        if let Some(purpose) = purpose {
            sql.push_str(" AND purpose = ?");
            args.push(Box::new(purpose.to_string()));
        }
        sql.push_str(" ORDER BY id DESC LIMIT ?");
        args.push(Box::new(limit as i64));

        let mut stmt = conn
            .prepare(&sql)
            .map_err(|e| AppError::Storage(format!("Failed to prepare audit query: {}", e)))?;

        let rows = stmt
            .query_map(rusqlite::params_from_iter(args.iter().map(|a| a.as_ref())), |row| {
                Ok(AuditEntry {
                    seq: row.get(0)?,
                    timestamp: row.get(1)?,
                    record: AuditRecord {
                        prompt_text: row.get(2)?,
                        response_text: row.get(3)?,
                        user: row.get(4)?,
                        purpose: row.get(5)?,
                        provider: row.get(6)?,
                        prompt_id: row.get(7)?,
                        latency_ms: row.get::<_, i64>(8)? as u64,
                    },
                })
            })
            .map_err(|e| AppError::Storage(format!("Failed to query audit log: {}", e)))?;

        rows.collect::<Result<Vec<_>, _>>()
            .map_err(|e| AppError::Storage(format!("Failed to read audit row: {}", e)))
    }
}

/// Vec-backed audit sink for tests and memory-backend runs.
#[derive(Debug, Default)]
pub struct MemoryAuditLog {
    entries: Mutex<Vec<AuditEntry>>,
}

impl MemoryAuditLog {
    /// Create an empty in-memory audit log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    /// Whether the log is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl AuditSink for MemoryAuditLog {
    fn append(&self, record: &AuditRecord) -> AppResult<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| AppError::Storage("Audit log lock poisoned".to_string()))?;

        let seq = entries.len() as i64 + 1;
        entries.push(AuditEntry {
            seq,
            timestamp: Utc::now().to_rfc3339(),
            record: record.clone(),
        });
        Ok(())
    }

    fn recent(
        &self,
        limit: usize,
        user: Option<&str>,
        purpose: Option<&str>,
    ) -> AppResult<Vec<AuditEntry>> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| AppError::Storage("Audit log lock poisoned".to_string()))?;

        Ok(entries
            .iter()
            .rev()
            .filter(|e| user.map_or(true, |u| e.record.user == u))
            .filter(|e| purpose.map_or(true, |p| e.record.purpose == p))
            .take(limit)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(user: &str, purpose: &str) -> AuditRecord {
        AuditRecord {
            prompt_text: "rendered".to_string(),
            response_text: "generated".to_string(),
            user: user.to_string(),
            purpose: purpose.to_string(),
            provider: "mock".to_string(),
            prompt_id: "pid".to_string(),
            latency_ms: 100,
        }
    }

    #[test]
    fn test_sqlite_append_and_recent_ordering() {
        let log = SqliteAuditLog::open_in_memory().unwrap();
        log.append(&record("u1", "summarize")).unwrap();
        log.append(&record("u1", "extract")).unwrap();
        log.append(&record("u2", "summarize")).unwrap();

        let entries = log.recent(10, None, None).unwrap();
        assert_eq!(entries.len(), 3);
        // Newest first, by sequence id
        assert!(entries[0].seq > entries[1].seq);
        assert!(entries[1].seq > entries[2].seq);
    }

    #[test]
    fn test_sqlite_recent_filters() {
        let log = SqliteAuditLog::open_in_memory().unwrap();
        log.append(&record("u1", "summarize")).unwrap();
        log.append(&record("u1", "extract")).unwrap();
        log.append(&record("u2", "summarize")).unwrap();

        assert_eq!(log.recent(10, Some("u1"), None).unwrap().len(), 2);
        assert_eq!(log.recent(10, None, Some("summarize")).unwrap().len(), 2);
        assert_eq!(
            log.recent(10, Some("u1"), Some("summarize")).unwrap().len(),
            1
        );
        assert_eq!(log.recent(1, None, None).unwrap().len(), 1);
    }

    #[test]
    fn test_sqlite_log_events() {
        let log = SqliteAuditLog::open_in_memory().unwrap();
        log.log_event("INFO", "promptdoc", "started").unwrap();
        log.log_event("WARN", "promptdoc", "slow provider").unwrap();

        assert_eq!(log.recent_logs(10, None).unwrap().len(), 2);
        let warns = log.recent_logs(10, Some("WARN")).unwrap();
        assert_eq!(warns.len(), 1);
        assert_eq!(warns[0].message, "slow provider");
    }

    #[test]
    fn test_memory_sink_matches_sqlite_semantics() {
        let log = MemoryAuditLog::new();
        log.append(&record("u1", "summarize")).unwrap();
        log.append(&record("u2", "summarize")).unwrap();

        assert_eq!(log.len(), 2);
        let entries = log.recent(10, Some("u2"), None).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].record.user, "u2");
    }
}
