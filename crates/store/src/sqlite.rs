//! Durable-record store backed by SQLite.
//!
//! Every mutating call is an immediate, individually durable write; reads
//! query the database directly with no in-process cache, so state is
//! consistent across process restarts without a full-catalog reload.

use crate::contract::PromptStore;
use crate::types::Prompt;
use chrono::Utc;
use promptdoc_core::{AppError, AppResult};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

/// SQLite-backed prompt store.
///
/// The connection mutex serializes mutations; each statement (or explicit
/// transaction, for cascade deletes) commits before the call returns.
#[derive(Debug)]
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (and if needed initialize) the store at the given path.
    pub fn open(db_path: &Path) -> AppResult<Self> {
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    AppError::Storage(format!("Failed to create database directory: {}", e))
                })?;
            }
        }

        let conn = Connection::open(db_path)
            .map_err(|e| AppError::Storage(format!("Failed to open database: {}", e)))?;

        Self::init_schema(&conn)?;
        tracing::debug!("Opened SQLite prompt store at {:?}", db_path);

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open an in-memory database, for tests.
    pub fn open_in_memory() -> AppResult<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| AppError::Storage(format!("Failed to open database: {}", e)))?;
        Self::init_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn init_schema(conn: &Connection) -> AppResult<()> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS prompts (
                id TEXT PRIMARY KEY,
                purpose TEXT NOT NULL,
                name TEXT NOT NULL,
                template TEXT NOT NULL,
                version INTEGER NOT NULL DEFAULT 1,
                owner TEXT NOT NULL,
                created_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS active_prompts (
                user_id TEXT NOT NULL,
                purpose TEXT NOT NULL,
                prompt_id TEXT NOT NULL,
                activated_at TEXT NOT NULL,
                PRIMARY KEY (user_id, purpose),
                FOREIGN KEY (prompt_id) REFERENCES prompts(id)
            );

            CREATE INDEX IF NOT EXISTS idx_prompts_purpose ON prompts(purpose);
            CREATE INDEX IF NOT EXISTS idx_active_prompt ON active_prompts(prompt_id);
            "#,
        )
        .map_err(|e| AppError::Storage(format!("Failed to create tables: {}", e)))
    }

    fn conn(&self) -> AppResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| AppError::Storage("Database connection lock poisoned".to_string()))
    }

    fn row_to_prompt(row: &Row<'_>) -> rusqlite::Result<Prompt> {
        Ok(Prompt {
            id: row.get(0)?,
            purpose: row.get(1)?,
            name: row.get(2)?,
            template: row.get(3)?,
            version: row.get::<_, i64>(4)? as u32,
            owner: row.get(5)?,
        })
    }

    fn get_with(conn: &Connection, id: &str) -> AppResult<Option<Prompt>> {
        conn.query_row(
            "SELECT id, purpose, name, template, version, owner FROM prompts WHERE id = ?1",
            params![id],
            Self::row_to_prompt,
        )
        .optional()
        .map_err(|e| AppError::Storage(format!("Failed to query prompt: {}", e)))
    }
}

impl PromptStore for SqliteStore {
    fn create(
        &self,
        purpose: &str,
        name: &str,
        template: &str,
        owner: &str,
    ) -> AppResult<Prompt> {
        let prompt = Prompt {
            id: Uuid::new_v4().to_string(),
            purpose: purpose.to_string(),
            name: name.to_string(),
            template: template.to_string(),
            version: 1,
            owner: owner.to_string(),
        };

        self.conn()?
            .execute(
                "INSERT INTO prompts (id, purpose, name, template, version, owner, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    prompt.id,
                    prompt.purpose,
                    prompt.name,
                    prompt.template,
                    prompt.version as i64,
                    prompt.owner,
                    Utc::now().to_rfc3339(),
                ],
            )
            .map_err(|e| AppError::Storage(format!("Failed to insert prompt: {}", e)))?;

        tracing::debug!("Created prompt {} for purpose '{}'", prompt.id, purpose);
        Ok(prompt)
    }

    fn list(&self, purpose: Option<&str>) -> AppResult<Vec<Prompt>> {
        let conn = self.conn()?;

        let mut stmt = match purpose {
            Some(_) => conn.prepare(
                "SELECT id, purpose, name, template, version, owner FROM prompts
                 WHERE purpose = ?1 ORDER BY created_at",
            ),
            None => conn.prepare(
                "SELECT id, purpose, name, template, version, owner FROM prompts
                 ORDER BY created_at",
            ),
        }
        .map_err(|e| AppError::Storage(format!("Failed to prepare query: {}", e)))?;

        let rows = match purpose {
            Some(p) => stmt.query_map(params![p], Self::row_to_prompt),
            None => stmt.query_map([], Self::row_to_prompt),
        }
        .map_err(|e| AppError::Storage(format!("Failed to list prompts: {}", e)))?;

        rows.collect::<Result<Vec<_>, _>>()
            .map_err(|e| AppError::Storage(format!("Failed to read prompt row: {}", e)))
    }

    fn get(&self, id: &str) -> AppResult<Option<Prompt>> {
        let conn = self.conn()?;
        Self::get_with(&conn, id)
    }

    fn update(&self, id: &str, template: &str, requester: &str) -> AppResult<Prompt> {
        let conn = self.conn()?;

        // Guarded single statement: the owner check and the version bump are
        // one atomic write, so concurrent updates cannot lose an increment.
        let changed = conn
            .execute(
                "UPDATE prompts SET template = ?1, version = version + 1
                 WHERE id = ?2 AND owner = ?3",
                params![template, id, requester],
            )
            .map_err(|e| AppError::Storage(format!("Failed to update prompt: {}", e)))?;

        if changed == 0 {
            return Err(AppError::NotFound(id.to_string()));
        }

        Self::get_with(&conn, id)?.ok_or_else(|| AppError::NotFound(id.to_string()))
    }

    fn activate(&self, user: &str, purpose: &str, id: &str) -> AppResult<Prompt> {
        let conn = self.conn()?;

        let prompt = Self::get_with(&conn, id)?
            .filter(|p| p.purpose == purpose)
            .ok_or_else(|| {
                AppError::ActivationMismatch(format!(
                    "Prompt {} does not exist for purpose '{}'",
                    id, purpose
                ))
            })?;

        conn.execute(
            "INSERT OR REPLACE INTO active_prompts (user_id, purpose, prompt_id, activated_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![user, purpose, id, Utc::now().to_rfc3339()],
        )
        .map_err(|e| AppError::Storage(format!("Failed to activate prompt: {}", e)))?;

        Ok(prompt)
    }

    fn get_active(&self, user: &str, purpose: &str) -> AppResult<Option<Prompt>> {
        let conn = self.conn()?;

        let prompt_id: Option<String> = conn
            .query_row(
                "SELECT prompt_id FROM active_prompts WHERE user_id = ?1 AND purpose = ?2",
                params![user, purpose],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| AppError::Storage(format!("Failed to query activation: {}", e)))?;

        match prompt_id {
            Some(id) => Self::get_with(&conn, &id),
            None => Ok(None),
        }
    }

    fn delete(&self, id: &str, requester: &str) -> AppResult<bool> {
        let mut conn = self.conn()?;

        let tx = conn
            .transaction()
            .map_err(|e| AppError::Storage(format!("Failed to begin transaction: {}", e)))?;

        let owner: Option<String> = tx
            .query_row(
                "SELECT owner FROM prompts WHERE id = ?1",
                params![id],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| AppError::Storage(format!("Failed to query prompt: {}", e)))?;

        match owner {
            Some(ref o) if o == requester => {}
            _ => return Ok(false),
        }

        tx.execute("DELETE FROM active_prompts WHERE prompt_id = ?1", params![id])
            .map_err(|e| AppError::Storage(format!("Failed to delete activations: {}", e)))?;
        tx.execute("DELETE FROM prompts WHERE id = ?1", params![id])
            .map_err(|e| AppError::Storage(format!("Failed to delete prompt: {}", e)))?;

        tx.commit()
            .map_err(|e| AppError::Storage(format!("Failed to commit delete: {}", e)))?;

        tracing::debug!("Deleted prompt {} and its activations", id);
        Ok(true)
    }
}
