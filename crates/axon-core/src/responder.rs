//! Responder: aggregate state, build the prompt, ask the completion API, log the exchange.
//!
//! Failures at any step come back as a generic [`AxonError::Process`]; the cause is only
//! written to the tracing output.

use std::sync::Arc;

use crate::completion::CompletionClient;
use crate::error::{AxonError, AxonResult};
use crate::logger::ActionLogger;
use crate::prompts::{build_system_prompt, identity_prompt};
use crate::run_blocking;
use crate::state::StateAggregator;
use crate::store::SqliteStore;
use crate::types::AggregatedState;

pub const INPUT_TAGS: [&str; 2] = ["interaction", "input"];
pub const RESPONSE_TAGS: [&str; 2] = ["interaction", "response"];
pub const IDENTITY_TAGS: [&str; 2] = ["system", "identity"];

#[derive(Clone)]
pub struct Responder {
    aggregator: StateAggregator,
    logger: ActionLogger,
    completion: Arc<dyn CompletionClient>,
}

impl Responder {
    pub fn new(store: SqliteStore, completion: Arc<dyn CompletionClient>) -> Self {
        Self {
            aggregator: StateAggregator::new(store.clone()),
            logger: ActionLogger::new(store),
            completion,
        }
    }

    /// Answer a user message in the Axon persona. Writes exactly two log entries on success.
    pub async fn respond(&self, message: &str) -> AxonResult<String> {
        self.respond_inner(message).await.map_err(|e| {
            tracing::error!(target: "axon::responder", error = %e, "Error processing message");
            AxonError::Process("Failed to process message".to_string())
        })
    }

    /// Generated 2–3 paragraph self-introduction from identity and mission.
    pub async fn identity_summary(&self) -> AxonResult<String> {
        self.identity_inner().await.map_err(|e| {
            tracing::error!(target: "axon::responder", error = %e, "Error getting Axon identity");
            AxonError::Process("Failed to get Axon identity".to_string())
        })
    }

    async fn state(&self) -> AxonResult<AggregatedState> {
        let aggregator = self.aggregator.clone();
        run_blocking(move || aggregator.get_state()).await
    }

    async fn respond_inner(&self, message: &str) -> AxonResult<String> {
        let state = self.state().await?;
        let system_prompt = build_system_prompt(&state);
        tracing::debug!(
            target: "axon::responder",
            directives = state.directives.len(),
            fragments = state.symbolic_fragments.len(),
            "System prompt assembled"
        );

        let reply = self.completion.complete(Some(&system_prompt), message).await?;

        let logger = self.logger.clone();
        let input = message.to_string();
        let output = reply.clone();
        run_blocking(move || {
            logger.log("user", &input, &INPUT_TAGS)?;
            logger.log("axon", &output, &RESPONSE_TAGS)?;
            Ok(())
        })
        .await?;

        Ok(reply)
    }

    async fn identity_inner(&self) -> AxonResult<String> {
        let state = self.state().await?;
        let text = self.completion.complete(None, &identity_prompt(&state)).await?;

        let logger = self.logger.clone();
        run_blocking(move || {
            logger
                .log("system", "Retrieved Axon identity", &IDENTITY_TAGS)
                .map(|_| ())
        })
        .await?;

        Ok(text)
    }
}
