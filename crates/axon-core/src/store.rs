//! Record Store Gateway: SQLite-backed tables for directives, symbolic fragments, and the action log.
//!
//! The handle only carries connection parameters. Every operation opens its own scoped
//! connection, so the handle is cheap to clone into request handlers and blocking tasks.

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use rusqlite::{params, Connection, OpenFlags, OptionalExtension, Row, TransactionBehavior};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{AxonError, AxonResult};
use crate::types::{Directive, DirectiveDraft, FragmentDraft, LogEntry, SymbolicFragment};

pub const DIRECTIVES_TABLE: &str = "axon_directives";
pub const FRAGMENTS_TABLE: &str = "axon_symbolic_fragments";
pub const LOGS_TABLE: &str = "axon_logs";

const DIRECTIVE_COLUMNS: &str = "id, name, description, priority, tags, created_at, updated_at";
const FRAGMENT_COLUMNS: &str = "id, key, value, tags, created_at, updated_at";
const LOG_COLUMNS: &str = "id, source, content, tags, timestamp";

/// How long a writer waits on a locked database before giving up.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
pub struct SqliteStore {
    db_path: PathBuf,
}

/// Current time truncated to what the timestamp columns can represent.
fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

fn ts_to_sql(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn ts_col(r: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = r.get(idx)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|d| d.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
        })
}

fn tags_col(r: &Row<'_>, idx: usize) -> rusqlite::Result<Vec<String>> {
    let raw: Option<String> = r.get(idx)?;
    match raw {
        None => Ok(Vec::new()),
        Some(s) => serde_json::from_str(&s).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
        }),
    }
}

fn directive_from_row(r: &Row<'_>) -> rusqlite::Result<Directive> {
    Ok(Directive {
        id: r.get(0)?,
        name: r.get(1)?,
        description: r.get(2)?,
        priority: r.get(3)?,
        tags: tags_col(r, 4)?,
        created_at: ts_col(r, 5)?,
        updated_at: ts_col(r, 6)?,
    })
}

fn fragment_from_row(r: &Row<'_>) -> rusqlite::Result<SymbolicFragment> {
    Ok(SymbolicFragment {
        id: r.get(0)?,
        key: r.get(1)?,
        value: r.get(2)?,
        tags: tags_col(r, 3)?,
        created_at: ts_col(r, 4)?,
        updated_at: ts_col(r, 5)?,
    })
}

fn log_from_row(r: &Row<'_>) -> rusqlite::Result<LogEntry> {
    Ok(LogEntry {
        id: r.get(0)?,
        source: r.get(1)?,
        content: r.get(2)?,
        tags: tags_col(r, 3)?,
        timestamp: ts_col(r, 4)?,
    })
}

impl SqliteStore {
    /// Open (and if needed create) the store at `db_path`.
    pub fn open(db_path: impl Into<PathBuf>) -> AxonResult<Self> {
        let this = Self {
            db_path: db_path.into(),
        };
        this.init()?;
        Ok(this)
    }

    pub fn path(&self) -> &Path {
        &self.db_path
    }

    fn connect(&self) -> AxonResult<Connection> {
        if self.db_path.as_os_str().is_empty() {
            return Err(AxonError::StoreUnavailable(
                "store path is not configured".to_string(),
            ));
        }
        let conn = Connection::open_with_flags(
            &self.db_path,
            OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_CREATE,
        )
        .map_err(|e| {
            AxonError::StoreUnavailable(format!("{}: {}", self.db_path.display(), e))
        })?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        Ok(conn)
    }

    fn init(&self) -> AxonResult<()> {
        if let Some(parent) = self.db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    AxonError::StoreUnavailable(format!("{}: {}", parent.display(), e))
                })?;
            }
        }
        let conn = self.connect()?;
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS axon_directives (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                description TEXT NOT NULL,
                priority INTEGER NOT NULL DEFAULT 1,
                tags TEXT NOT NULL DEFAULT '[]',
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_directives_priority ON axon_directives(priority);
            CREATE INDEX IF NOT EXISTS idx_directives_name ON axon_directives(name);

            CREATE TABLE IF NOT EXISTS axon_symbolic_fragments (
                id TEXT PRIMARY KEY,
                key TEXT NOT NULL,
                value TEXT NOT NULL,
                tags TEXT NOT NULL DEFAULT '[]',
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_fragments_key ON axon_symbolic_fragments(key);

            CREATE TABLE IF NOT EXISTS axon_logs (
                id TEXT PRIMARY KEY,
                source TEXT NOT NULL,
                content TEXT NOT NULL,
                tags TEXT NOT NULL DEFAULT '[]',
                timestamp TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_logs_timestamp ON axon_logs(timestamp);
            "#,
        )?;
        Ok(())
    }

    /// Touch every table once. Fails when the store is unreachable or a table is missing.
    pub fn health_check(&self) -> AxonResult<()> {
        let conn = self.connect()?;
        for table in [DIRECTIVES_TABLE, LOGS_TABLE, FRAGMENTS_TABLE] {
            conn.query_row(&format!("SELECT id FROM {} LIMIT 1", table), [], |r| {
                r.get::<_, String>(0)
            })
            .optional()?;
        }
        Ok(())
    }

    // -- directives ---------------------------------------------------------

    /// All directives, highest priority first; equal priorities keep creation order.
    pub fn list_directives(&self) -> AxonResult<Vec<Directive>> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM axon_directives ORDER BY priority DESC, created_at ASC, rowid ASC",
            DIRECTIVE_COLUMNS
        ))?;
        let rows = stmt
            .query_map([], directive_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn insert_directive(&self, draft: &DirectiveDraft) -> AxonResult<Directive> {
        let conn = self.connect()?;
        let id = uuid::Uuid::new_v4().to_string();
        let ts = now();
        conn.execute(
            "INSERT INTO axon_directives (id, name, description, priority, tags, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                id,
                draft.name,
                draft.description,
                draft.priority,
                serde_json::to_string(&draft.tags)?,
                ts_to_sql(&ts),
                ts_to_sql(&ts)
            ],
        )?;
        Ok(Directive {
            id,
            name: draft.name.clone(),
            description: draft.description.clone(),
            priority: draft.priority,
            tags: draft.tags.clone(),
            created_at: ts,
            updated_at: ts,
        })
    }

    /// Full overwrite of name, description, priority, and tags. A missing id is a query error.
    pub fn update_directive(&self, id: &str, draft: &DirectiveDraft) -> AxonResult<Directive> {
        let mut conn = self.connect()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let changed = tx.execute(
            "UPDATE axon_directives SET name = ?1, description = ?2, priority = ?3, tags = ?4, updated_at = ?5 WHERE id = ?6",
            params![
                draft.name,
                draft.description,
                draft.priority,
                serde_json::to_string(&draft.tags)?,
                ts_to_sql(&now()),
                id
            ],
        )?;
        if changed == 0 {
            return Err(AxonError::Query(format!("no directive with id {}", id)));
        }
        let row = tx.query_row(
            &format!("SELECT {} FROM axon_directives WHERE id = ?1", DIRECTIVE_COLUMNS),
            params![id],
            directive_from_row,
        )?;
        tx.commit()?;
        Ok(row)
    }

    /// Set the description of every directive named `name`. Returns the number of rows touched.
    pub fn update_directive_description_by_name(
        &self,
        name: &str,
        description: &str,
    ) -> AxonResult<usize> {
        let conn = self.connect()?;
        let changed = conn.execute(
            "UPDATE axon_directives SET description = ?1, updated_at = ?2 WHERE name = ?3",
            params![description, ts_to_sql(&now()), name],
        )?;
        Ok(changed)
    }

    /// Delete by id and return the deleted directive's name. Read and delete share one transaction.
    pub fn delete_directive(&self, id: &str) -> AxonResult<String> {
        let mut conn = self.connect()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let name: Option<String> = tx
            .query_row(
                "SELECT name FROM axon_directives WHERE id = ?1",
                params![id],
                |r| r.get(0),
            )
            .optional()?;
        let Some(name) = name else {
            return Err(AxonError::Query(format!("no directive with id {}", id)));
        };
        tx.execute("DELETE FROM axon_directives WHERE id = ?1", params![id])?;
        tx.commit()?;
        Ok(name)
    }

    // -- symbolic fragments -------------------------------------------------

    /// Newest first, for the symbolic memory listing.
    pub fn list_fragments(&self) -> AxonResult<Vec<SymbolicFragment>> {
        self.query_fragments("ORDER BY created_at DESC, rowid DESC")
    }

    /// Insertion order; used when scanning for reserved keys.
    pub fn list_fragments_in_store_order(&self) -> AxonResult<Vec<SymbolicFragment>> {
        self.query_fragments("ORDER BY rowid ASC")
    }

    fn query_fragments(&self, order: &str) -> AxonResult<Vec<SymbolicFragment>> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM axon_symbolic_fragments {}",
            FRAGMENT_COLUMNS, order
        ))?;
        let rows = stmt
            .query_map([], fragment_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn insert_fragment(&self, draft: &FragmentDraft) -> AxonResult<SymbolicFragment> {
        let conn = self.connect()?;
        let id = uuid::Uuid::new_v4().to_string();
        let ts = now();
        conn.execute(
            "INSERT INTO axon_symbolic_fragments (id, key, value, tags, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                id,
                draft.key,
                draft.value,
                serde_json::to_string(&draft.tags)?,
                ts_to_sql(&ts),
                ts_to_sql(&ts)
            ],
        )?;
        Ok(SymbolicFragment {
            id,
            key: draft.key.clone(),
            value: draft.value.clone(),
            tags: draft.tags.clone(),
            created_at: ts,
            updated_at: ts,
        })
    }

    pub fn update_fragment(&self, id: &str, draft: &FragmentDraft) -> AxonResult<SymbolicFragment> {
        let mut conn = self.connect()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let changed = tx.execute(
            "UPDATE axon_symbolic_fragments SET key = ?1, value = ?2, tags = ?3, updated_at = ?4 WHERE id = ?5",
            params![
                draft.key,
                draft.value,
                serde_json::to_string(&draft.tags)?,
                ts_to_sql(&now()),
                id
            ],
        )?;
        if changed == 0 {
            return Err(AxonError::Query(format!(
                "no symbolic fragment with id {}",
                id
            )));
        }
        let row = tx.query_row(
            &format!(
                "SELECT {} FROM axon_symbolic_fragments WHERE id = ?1",
                FRAGMENT_COLUMNS
            ),
            params![id],
            fragment_from_row,
        )?;
        tx.commit()?;
        Ok(row)
    }

    /// Delete by id and return the deleted fragment's key.
    pub fn delete_fragment(&self, id: &str) -> AxonResult<String> {
        let mut conn = self.connect()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let key: Option<String> = tx
            .query_row(
                "SELECT key FROM axon_symbolic_fragments WHERE id = ?1",
                params![id],
                |r| r.get(0),
            )
            .optional()?;
        let Some(key) = key else {
            return Err(AxonError::Query(format!(
                "no symbolic fragment with id {}",
                id
            )));
        };
        tx.execute("DELETE FROM axon_symbolic_fragments WHERE id = ?1", params![id])?;
        tx.commit()?;
        Ok(key)
    }

    // -- logs ---------------------------------------------------------------

    pub fn insert_log(&self, source: &str, content: &str, tags: &[String]) -> AxonResult<LogEntry> {
        let conn = self.connect()?;
        let id = uuid::Uuid::new_v4().to_string();
        let ts = now();
        conn.execute(
            "INSERT INTO axon_logs (id, source, content, tags, timestamp) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![id, source, content, serde_json::to_string(tags)?, ts_to_sql(&ts)],
        )?;
        Ok(LogEntry {
            id,
            source: source.to_string(),
            content: content.to_string(),
            tags: tags.to_vec(),
            timestamp: ts,
        })
    }

    /// Most recent entries first; same-instant entries fall back to insertion order.
    pub fn recent_logs(&self, limit: usize) -> AxonResult<Vec<LogEntry>> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM axon_logs ORDER BY timestamp DESC, rowid DESC LIMIT ?1",
            LOG_COLUMNS
        ))?;
        let rows = stmt
            .query_map(params![limit as i64], log_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store() -> (tempfile::TempDir, SqliteStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = SqliteStore::open(dir.path().join("axon.sqlite")).unwrap();
        (dir, store)
    }

    fn directive(name: &str, priority: i64) -> DirectiveDraft {
        DirectiveDraft {
            name: name.to_string(),
            description: format!("{} description", name),
            priority,
            tags: vec!["ethics".to_string()],
        }
    }

    #[test]
    fn empty_path_is_store_unavailable() {
        let store = SqliteStore {
            db_path: PathBuf::new(),
        };
        assert!(matches!(
            store.list_directives(),
            Err(AxonError::StoreUnavailable(_))
        ));
    }

    #[test]
    fn directives_sorted_by_priority_then_creation() {
        let (_dir, store) = temp_store();
        let low = store.insert_directive(&directive("low", 2)).unwrap();
        let high = store.insert_directive(&directive("high", 9)).unwrap();
        let tie = store.insert_directive(&directive("low-again", 2)).unwrap();

        let ids: Vec<String> = store
            .list_directives()
            .unwrap()
            .into_iter()
            .map(|d| d.id)
            .collect();
        assert_eq!(ids, vec![high.id, low.id, tie.id]);
    }

    #[test]
    fn update_overwrites_and_keeps_created_at() {
        let (_dir, store) = temp_store();
        let created = store.insert_directive(&directive("a", 3)).unwrap();
        let updated = store
            .update_directive(
                &created.id,
                &DirectiveDraft {
                    name: "b".to_string(),
                    description: "new".to_string(),
                    priority: 5,
                    tags: Vec::new(),
                },
            )
            .unwrap();
        assert_eq!(updated.name, "b");
        assert_eq!(updated.priority, 5);
        assert!(updated.tags.is_empty());
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at >= created.updated_at);
    }

    #[test]
    fn update_missing_fragment_is_query_error() {
        let (_dir, store) = temp_store();
        let draft = FragmentDraft {
            key: "k".to_string(),
            value: "v".to_string(),
            tags: Vec::new(),
        };
        let err = store.update_fragment("missing", &draft).unwrap_err();
        assert!(matches!(err, AxonError::Query(_)));
        assert!(store.list_fragments().unwrap().is_empty());
    }

    #[test]
    fn delete_returns_label_and_removes_only_that_row() {
        let (_dir, store) = temp_store();
        let keep = store.insert_directive(&directive("keep", 1)).unwrap();
        let gone = store.insert_directive(&directive("gone", 1)).unwrap();

        assert_eq!(store.delete_directive(&gone.id).unwrap(), "gone");
        let remaining = store.list_directives().unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, keep.id);

        assert!(matches!(
            store.delete_directive(&gone.id),
            Err(AxonError::Query(_))
        ));
    }

    #[test]
    fn concurrent_deletes_all_succeed() {
        let (_dir, store) = temp_store();
        let ids: Vec<String> = (0..8)
            .map(|i| store.insert_directive(&directive(&format!("d{}", i), 1)).unwrap().id)
            .collect();

        let handles: Vec<_> = ids
            .into_iter()
            .map(|id| {
                let store = store.clone();
                std::thread::spawn(move || store.delete_directive(&id))
            })
            .collect();
        for h in handles {
            assert!(h.join().unwrap().is_ok());
        }
        assert!(store.list_directives().unwrap().is_empty());
    }

    #[test]
    fn description_update_by_name_reports_rows() {
        let (_dir, store) = temp_store();
        store.insert_directive(&directive("Preserve Life", 9)).unwrap();
        assert_eq!(
            store
                .update_directive_description_by_name("Preserve Life", "Protect all life")
                .unwrap(),
            1
        );
        assert_eq!(
            store
                .update_directive_description_by_name("Nobody", "ignored")
                .unwrap(),
            0
        );
        assert_eq!(
            store.list_directives().unwrap()[0].description,
            "Protect all life"
        );
    }

    #[test]
    fn recent_logs_newest_first_with_limit() {
        let (_dir, store) = temp_store();
        for i in 0..5 {
            store
                .insert_log("system", &format!("entry {}", i), &["system".to_string()])
                .unwrap();
        }
        let logs = store.recent_logs(3).unwrap();
        assert_eq!(logs.len(), 3);
        assert_eq!(logs[0].content, "entry 4");
        assert_eq!(logs[2].content, "entry 2");
        assert_eq!(logs[0].tags, vec!["system".to_string()]);
    }

    #[test]
    fn health_check_fails_without_tables() {
        let (_dir, store) = temp_store();
        store.health_check().unwrap();
        store
            .connect()
            .unwrap()
            .execute_batch("DROP TABLE axon_logs;")
            .unwrap();
        assert!(matches!(store.health_check(), Err(AxonError::Query(_))));
    }
}
