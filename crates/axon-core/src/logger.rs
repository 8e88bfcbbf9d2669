//! Action Logger: appends timestamped entries to the `axon_logs` table.

use crate::error::{AxonError, AxonResult};
use crate::store::SqliteStore;
use crate::types::LogEntry;

/// Warning attached to a response when the primary action succeeded but its log entry did not.
pub const LOG_WRITE_WARNING: &str = "Action completed but its log entry could not be written";

#[derive(Debug, Clone)]
pub struct ActionLogger {
    store: SqliteStore,
}

impl ActionLogger {
    pub fn new(store: SqliteStore) -> Self {
        Self { store }
    }

    /// Append one entry. Any store failure comes back as [`AxonError::Log`].
    pub fn log(&self, source: &str, content: &str, tags: &[&str]) -> AxonResult<LogEntry> {
        let tags: Vec<String> = tags.iter().map(|t| t.to_string()).collect();
        let entry = self
            .store
            .insert_log(source, content, &tags)
            .map_err(|e| AxonError::Log(e.to_string()))?;
        tracing::debug!(target: "axon::log", source = %source, tags = ?tags, "{}", content);
        Ok(entry)
    }

    /// Append one entry without letting a failure escape. Returns a warning when the write failed.
    pub fn log_best_effort(&self, source: &str, content: &str, tags: &[&str]) -> Option<String> {
        match self.log(source, content, tags) {
            Ok(_) => None,
            Err(e) => {
                tracing::warn!(target: "axon::log", source = %source, error = %e, "Action log write failed");
                Some(LOG_WRITE_WARNING.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_then_best_effort_after_table_loss() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("axon.sqlite");
        let store = SqliteStore::open(&path).unwrap();
        let logger = ActionLogger::new(store.clone());

        let entry = logger
            .log("system", "Axon initialized", &["system", "initialization"])
            .unwrap();
        assert_eq!(entry.source, "system");
        assert_eq!(entry.tags, vec!["system", "initialization"]);

        rusqlite::Connection::open(&path)
            .unwrap()
            .execute_batch("DROP TABLE axon_logs;")
            .unwrap();

        assert!(matches!(
            logger.log("system", "lost", &[]),
            Err(AxonError::Log(_))
        ));
        assert_eq!(
            logger.log_best_effort("system", "lost", &[]).as_deref(),
            Some(LOG_WRITE_WARNING)
        );
    }
}
