//! State Aggregator: the snapshot of directives and fragments the prompt is built from.

use crate::error::{AxonError, AxonResult};
use crate::store::SqliteStore;
use crate::types::{
    AggregatedState, SymbolicFragment, DEFAULT_IDENTITY, DEFAULT_MISSION, IDENTITY_KEY,
    MISSION_KEY,
};

#[derive(Debug, Clone)]
pub struct StateAggregator {
    store: SqliteStore,
}

impl StateAggregator {
    pub fn new(store: SqliteStore) -> Self {
        Self { store }
    }

    /// Read directives and fragments and derive identity and mission. Fails fast: no partial state.
    pub fn get_state(&self) -> AxonResult<AggregatedState> {
        let directives = self.store.list_directives().map_err(|e| {
            tracing::error!(target: "axon::state", error = %e, "Error fetching directives");
            AxonError::Fetch("Failed to fetch directives".to_string())
        })?;

        let fragments = self.store.list_fragments_in_store_order().map_err(|e| {
            tracing::error!(target: "axon::state", error = %e, "Error fetching symbolic fragments");
            AxonError::Fetch("Failed to fetch symbolic fragments".to_string())
        })?;

        let identity = reserved_value(&fragments, IDENTITY_KEY).unwrap_or(DEFAULT_IDENTITY);
        let mission = reserved_value(&fragments, MISSION_KEY).unwrap_or(DEFAULT_MISSION);

        Ok(AggregatedState {
            identity: identity.to_string(),
            mission: mission.to_string(),
            directives,
            symbolic_fragments: fragments,
        })
    }
}

/// Value of the first fragment (in store order) whose key matches.
fn reserved_value<'a>(fragments: &'a [SymbolicFragment], key: &str) -> Option<&'a str> {
    fragments
        .iter()
        .find(|f| f.key == key)
        .map(|f| f.value.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DirectiveDraft, FragmentDraft};

    fn fragment(key: &str, value: &str) -> FragmentDraft {
        FragmentDraft {
            key: key.to_string(),
            value: value.to_string(),
            tags: Vec::new(),
        }
    }

    #[test]
    fn defaults_when_reserved_keys_absent() {
        let dir = tempfile::tempdir().unwrap();
        let store = SqliteStore::open(dir.path().join("axon.sqlite")).unwrap();
        let state = StateAggregator::new(store).get_state().unwrap();
        assert_eq!(state.identity, DEFAULT_IDENTITY);
        assert_eq!(state.mission, DEFAULT_MISSION);
        assert!(state.directives.is_empty());
    }

    #[test]
    fn first_reserved_fragment_wins() {
        let dir = tempfile::tempdir().unwrap();
        let store = SqliteStore::open(dir.path().join("axon.sqlite")).unwrap();
        store.insert_fragment(&fragment("identity", "Axon Prime")).unwrap();
        store.insert_fragment(&fragment("identity", "Axon Shadow")).unwrap();
        store.insert_fragment(&fragment("mission", "Keep the peace")).unwrap();
        store
            .insert_directive(&DirectiveDraft {
                name: "Preserve Life".to_string(),
                description: "Never cause harm".to_string(),
                priority: 9,
                tags: Vec::new(),
            })
            .unwrap();

        let state = StateAggregator::new(store).get_state().unwrap();
        assert_eq!(state.identity, "Axon Prime");
        assert_eq!(state.mission, "Keep the peace");
        assert_eq!(state.symbolic_fragments.len(), 3);
        assert_eq!(state.directives.len(), 1);
    }

    #[test]
    fn missing_table_aborts_aggregation() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("axon.sqlite");
        let store = SqliteStore::open(&path).unwrap();
        rusqlite::Connection::open(&path)
            .unwrap()
            .execute_batch("DROP TABLE axon_symbolic_fragments;")
            .unwrap();

        let err = StateAggregator::new(store).get_state().unwrap_err();
        assert_eq!(err.to_string(), "Fetch error: Failed to fetch symbolic fragments");
    }
}
