//! Nexus sync: externally triggered actions applied to the store.
//!
//! The action string is parsed once into [`SyncAction`]; dispatch is an exhaustive match.

use serde::Serialize;
use serde_json::Value;

use crate::error::{AxonError, AxonResult};
use crate::logger::ActionLogger;
use crate::store::SqliteStore;
use crate::types::FragmentDraft;

/// Tags given to concepts installed without explicit tags.
pub const NEXUS_INSTALLED_TAG: &str = "nexus-installed";

#[derive(Debug, Clone, PartialEq)]
pub enum SyncAction {
    /// Record that a document arrived. No content processing yet.
    Ingest { name: String },
    /// Replace the description of every directive with this name.
    UpdateDirective { name: String, description: String },
    /// Add a symbolic fragment.
    InstallConcept {
        key: String,
        value: String,
        tags: Option<Vec<String>>,
    },
    Unknown(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SyncOutcome {
    pub success: bool,
    pub message: String,
}

fn required_str(payload: &Value, field: &str) -> Option<String> {
    payload
        .get(field)
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .map(str::to_string)
}

fn missing(action: &str, field: &str) -> AxonError {
    AxonError::Validation(format!("Payload for {} requires {}", action, field))
}

impl SyncAction {
    /// Parse a known action and its payload. Unrecognized actions are not an error.
    pub fn parse(action: &str, payload: &Value) -> AxonResult<Self> {
        match action {
            "ingest" => Ok(SyncAction::Ingest {
                name: required_str(payload, "name").ok_or_else(|| missing(action, "name"))?,
            }),
            "update_directive" => {
                let name = required_str(payload, "name").ok_or_else(|| missing(action, "name"))?;
                let description = required_str(payload, "content")
                    .or_else(|| required_str(payload, "description"))
                    .ok_or_else(|| missing(action, "content"))?;
                Ok(SyncAction::UpdateDirective { name, description })
            }
            "install_concept" => {
                let key = required_str(payload, "key").ok_or_else(|| missing(action, "key"))?;
                let value =
                    required_str(payload, "value").ok_or_else(|| missing(action, "value"))?;
                let tags = payload.get("tags").and_then(Value::as_array).map(|arr| {
                    arr.iter()
                        .filter_map(Value::as_str)
                        .map(str::to_string)
                        .collect()
                });
                Ok(SyncAction::InstallConcept { key, value, tags })
            }
            other => Ok(SyncAction::Unknown(other.to_string())),
        }
    }

    pub fn action_name(&self) -> &str {
        match self {
            SyncAction::Ingest { .. } => "ingest",
            SyncAction::UpdateDirective { .. } => "update_directive",
            SyncAction::InstallConcept { .. } => "install_concept",
            SyncAction::Unknown(action) => action,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, SyncAction::Unknown(_))
    }
}

#[derive(Debug, Clone)]
pub struct SyncHandler {
    store: SqliteStore,
    logger: ActionLogger,
}

impl SyncHandler {
    pub fn new(store: SqliteStore) -> Self {
        Self {
            logger: ActionLogger::new(store.clone()),
            store,
        }
    }

    /// Apply one action. Store or log failures inside a recognized action become [`AxonError::Sync`].
    pub fn sync(&self, action: SyncAction) -> AxonResult<SyncOutcome> {
        self.apply(action).map_err(|e| {
            tracing::error!(target: "axon::sync", error = %e, "Error handling Nexus sync");
            AxonError::Sync("Failed to handle Nexus sync".to_string())
        })
    }

    fn apply(&self, action: SyncAction) -> AxonResult<SyncOutcome> {
        match action {
            SyncAction::Ingest { name } => {
                self.logger.log(
                    "nexus",
                    &format!("Ingesting document: {}", name),
                    &["nexus", "ingest"],
                )?;
                Ok(SyncOutcome {
                    success: true,
                    message: format!("Successfully ingested document: {}", name),
                })
            }
            SyncAction::UpdateDirective { name, description } => {
                self.logger.log(
                    "nexus",
                    &format!("Updating directive: {}", name),
                    &["nexus", "directive"],
                )?;
                let touched = self
                    .store
                    .update_directive_description_by_name(&name, &description)?;
                tracing::debug!(target: "axon::sync", name = %name, rows = touched, "Directive description updated");
                Ok(SyncOutcome {
                    success: true,
                    message: format!("Successfully updated directive: {}", name),
                })
            }
            SyncAction::InstallConcept { key, value, tags } => {
                self.logger.log(
                    "nexus",
                    &format!("Installing symbolic concept: {}", key),
                    &["nexus", "concept"],
                )?;
                self.store.insert_fragment(&FragmentDraft {
                    key: key.clone(),
                    value,
                    tags: tags.unwrap_or_else(|| vec![NEXUS_INSTALLED_TAG.to_string()]),
                })?;
                Ok(SyncOutcome {
                    success: true,
                    message: format!("Successfully installed concept: {}", key),
                })
            }
            SyncAction::Unknown(action) => Ok(SyncOutcome {
                success: false,
                message: format!("Unknown action: {}", action),
            }),
        }
    }
}
