//! axon-core: records, action log, state aggregation, prompt construction, and Nexus sync
//! for the Axon orchestrator.
//!
//! The gateway owns one [`SqliteStore`] handle and hands clones to each component; nothing
//! here keeps mutable state between calls.

mod completion;
mod config;
mod error;
mod logger;
mod responder;
mod state;
mod store;
mod sync;
mod types;
pub mod prompts;

pub use completion::{ChatCompletionClient, CompletionClient};
pub use config::{AxonConfig, DEFAULT_CONFIG_PATH};
pub use error::{AxonError, AxonResult};
pub use logger::{ActionLogger, LOG_WRITE_WARNING};
pub use responder::{Responder, IDENTITY_TAGS, INPUT_TAGS, RESPONSE_TAGS};
pub use state::StateAggregator;
pub use store::{SqliteStore, DIRECTIVES_TABLE, FRAGMENTS_TABLE, LOGS_TABLE};
pub use sync::{SyncAction, SyncHandler, SyncOutcome, NEXUS_INSTALLED_TAG};
pub use types::{
    resolve_priority, AggregatedState, Directive, DirectiveDraft, DirectiveInput, FragmentDraft,
    FragmentInput, LogEntry, SymbolicFragment, DEFAULT_IDENTITY, DEFAULT_MISSION,
    DEFAULT_PRIORITY, IDENTITY_KEY, MAX_PRIORITY, MIN_PRIORITY, MISSION_KEY,
};

/// Number of entries the log listing returns.
pub const RECENT_LOG_LIMIT: usize = 100;

/// Run store work on the blocking pool. A panicked or cancelled task surfaces as [`AxonError::Query`].
pub async fn run_blocking<T, F>(f: F) -> AxonResult<T>
where
    T: Send + 'static,
    F: FnOnce() -> AxonResult<T> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| AxonError::Query(format!("blocking task failed: {}", e)))?
}

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
