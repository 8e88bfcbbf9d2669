//! Record types persisted by the store and the request drafts that create them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{AxonError, AxonResult};

/// Priority assigned when a request omits it or sends something unusable.
pub const DEFAULT_PRIORITY: i64 = 1;
pub const MIN_PRIORITY: i64 = 1;
pub const MAX_PRIORITY: i64 = 10;

/// Fragment key whose value replaces the default identity in the system prompt.
pub const IDENTITY_KEY: &str = "identity";
/// Fragment key whose value replaces the default mission in the system prompt.
pub const MISSION_KEY: &str = "mission";

pub const DEFAULT_IDENTITY: &str = "Axon, the central orchestrator of the Pantheon Ecosystem";
pub const DEFAULT_MISSION: &str = "To coordinate multiple autonomous AI agents, hold memory of actions and decisions, and govern with symbolic, ethical, and strategic intelligence.";

/// A named, prioritized instruction guiding the assistant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Directive {
    pub id: String,
    pub name: String,
    pub description: String,
    pub priority: i64,
    #[serde(default)]
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Key/value memory record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolicFragment {
    pub id: String,
    pub key: String,
    pub value: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Append-only audit record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: String,
    pub source: String,
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub timestamp: DateTime<Utc>,
}

/// Snapshot the prompt builder works from. Recomputed on every call.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregatedState {
    pub identity: String,
    pub mission: String,
    pub directives: Vec<Directive>,
    pub symbolic_fragments: Vec<SymbolicFragment>,
}

/// Validated directive fields ready for insert or full overwrite.
#[derive(Debug, Clone, PartialEq)]
pub struct DirectiveDraft {
    pub name: String,
    pub description: String,
    pub priority: i64,
    pub tags: Vec<String>,
}

/// Validated fragment fields ready for insert or full overwrite.
#[derive(Debug, Clone, PartialEq)]
pub struct FragmentDraft {
    pub key: String,
    pub value: String,
    pub tags: Vec<String>,
}

/// Request body for directive create/update. Everything is optional so that missing
/// fields surface as validation errors instead of deserialization failures.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DirectiveInput {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub priority: Option<serde_json::Value>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
}

/// Request body for fragment create/update.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FragmentInput {
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
}

impl DirectiveInput {
    pub fn validate(self) -> AxonResult<DirectiveDraft> {
        let name = non_empty(self.name);
        let description = non_empty(self.description);
        let (Some(name), Some(description)) = (name, description) else {
            return Err(AxonError::Validation(
                "Name and description are required".to_string(),
            ));
        };
        Ok(DirectiveDraft {
            name,
            description,
            priority: resolve_priority(self.priority.as_ref())?,
            tags: self.tags.unwrap_or_default(),
        })
    }
}

impl FragmentInput {
    pub fn validate(self) -> AxonResult<FragmentDraft> {
        let key = non_empty(self.key);
        let value = non_empty(self.value);
        let (Some(key), Some(value)) = (key, value) else {
            return Err(AxonError::Validation("Key and value are required".to_string()));
        };
        Ok(FragmentDraft {
            key,
            value,
            tags: self.tags.unwrap_or_default(),
        })
    }
}

/// Blank-only strings count as missing; accepted values are stored exactly as sent.
fn non_empty(s: Option<String>) -> Option<String> {
    s.filter(|v| !v.trim().is_empty())
}

/// Absent, null, zero, or non-integer priorities fall back to [`DEFAULT_PRIORITY`].
/// An explicit integer outside 1–10 is rejected.
pub fn resolve_priority(raw: Option<&serde_json::Value>) -> AxonResult<i64> {
    let parsed = match raw {
        Some(serde_json::Value::Number(n)) => n.as_i64(),
        Some(serde_json::Value::String(s)) => s.trim().parse::<i64>().ok(),
        _ => None,
    };
    match parsed {
        None | Some(0) => Ok(DEFAULT_PRIORITY),
        Some(p) if (MIN_PRIORITY..=MAX_PRIORITY).contains(&p) => Ok(p),
        Some(_) => Err(AxonError::Validation(format!(
            "Priority must be between {} and {}",
            MIN_PRIORITY, MAX_PRIORITY
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn directive_requires_name_and_description() {
        let input = DirectiveInput {
            name: Some("  ".to_string()),
            description: Some("Never cause harm".to_string()),
            ..Default::default()
        };
        let err = input.validate().unwrap_err();
        assert!(err.is_validation());
        assert_eq!(
            err.to_string(),
            "Validation error: Name and description are required"
        );
    }

    #[test]
    fn directive_defaults_priority_and_tags() {
        let draft = DirectiveInput {
            name: Some("Preserve Life".to_string()),
            description: Some("Never cause harm".to_string()),
            ..Default::default()
        }
        .validate()
        .unwrap();
        assert_eq!(draft.priority, DEFAULT_PRIORITY);
        assert!(draft.tags.is_empty());
    }

    #[test]
    fn accepted_values_are_kept_as_sent() {
        let draft = DirectiveInput {
            name: Some(" Preserve Life ".to_string()),
            description: Some("Never cause harm\n".to_string()),
            ..Default::default()
        }
        .validate()
        .unwrap();
        assert_eq!(draft.name, " Preserve Life ");
        assert_eq!(draft.description, "Never cause harm\n");

        let fragment = FragmentInput {
            key: Some("mission ".to_string()),
            value: Some("  Coordinate".to_string()),
            tags: None,
        }
        .validate()
        .unwrap();
        assert_eq!(fragment.key, "mission ");
        assert_eq!(fragment.value, "  Coordinate");
    }

    #[test]
    fn priority_resolution() {
        assert_eq!(resolve_priority(None).unwrap(), 1);
        assert_eq!(resolve_priority(Some(&json!(null))).unwrap(), 1);
        assert_eq!(resolve_priority(Some(&json!(0))).unwrap(), 1);
        assert_eq!(resolve_priority(Some(&json!("high"))).unwrap(), 1);
        assert_eq!(resolve_priority(Some(&json!(2.5))).unwrap(), 1);
        assert_eq!(resolve_priority(Some(&json!(9))).unwrap(), 9);
        assert_eq!(resolve_priority(Some(&json!("7"))).unwrap(), 7);
        assert!(resolve_priority(Some(&json!(11))).unwrap_err().is_validation());
        assert!(resolve_priority(Some(&json!(-3))).unwrap_err().is_validation());
    }

    #[test]
    fn fragment_requires_key_and_value() {
        let err = FragmentInput {
            key: Some("identity".to_string()),
            value: None,
            tags: None,
        }
        .validate()
        .unwrap_err();
        assert_eq!(err.to_string(), "Validation error: Key and value are required");
    }

    #[test]
    fn aggregated_state_serializes_camel_case() {
        let state = AggregatedState {
            identity: DEFAULT_IDENTITY.to_string(),
            mission: DEFAULT_MISSION.to_string(),
            directives: Vec::new(),
            symbolic_fragments: Vec::new(),
        };
        let v = serde_json::to_value(&state).unwrap();
        assert!(v.get("symbolicFragments").is_some());
    }
}
