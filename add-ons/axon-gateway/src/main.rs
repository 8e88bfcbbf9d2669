//! Axon gateway: REST surface for directives, symbolic memory, the action log, the console,
//! and Nexus sync. Serves the four-tab UI at `/`.

mod handlers;

use std::sync::Arc;

use axon_core::{
    ActionLogger, AxonConfig, ChatCompletionClient, CompletionClient, Responder, SqliteStore,
    StateAggregator, SyncHandler,
};
use axum::http::Method;
use axum::response::Html;
use axum::routing::{get, post, put};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::handlers::{axon, directives, fragments, logs, nexus};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) config: Arc<AxonConfig>,
    pub(crate) store: SqliteStore,
    pub(crate) logger: ActionLogger,
    pub(crate) aggregator: StateAggregator,
    pub(crate) responder: Responder,
    pub(crate) sync: SyncHandler,
}

impl AppState {
    pub(crate) fn new(
        config: AxonConfig,
        store: SqliteStore,
        completion: Arc<dyn CompletionClient>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            logger: ActionLogger::new(store.clone()),
            aggregator: StateAggregator::new(store.clone()),
            responder: Responder::new(store.clone(), completion),
            sync: SyncHandler::new(store.clone()),
            store,
        }
    }
}

fn build_app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        .route("/", get(serve_ui))
        .route("/health", get(health))
        .route(
            "/api/axon/directives",
            get(directives::list).post(directives::create),
        )
        .route(
            "/api/axon/directives/:id",
            put(directives::update).delete(directives::delete),
        )
        .route(
            "/api/axon/symbolic-fragments",
            get(fragments::list).post(fragments::create),
        )
        .route(
            "/api/axon/symbolic-fragments/:id",
            put(fragments::update).delete(fragments::delete),
        )
        .route("/api/axon/logs", get(logs::list))
        .route("/api/axon/identity", get(axon::identity))
        .route("/api/axon/initialize", get(axon::initialize))
        .route("/api/axon/state", get(axon::aggregated_state))
        .route("/api/axon/process", post(axon::process))
        .route("/api/nexus/sync", post(nexus::sync))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> &'static str {
    "OK"
}

async fn serve_ui() -> Html<&'static str> {
    const INDEX: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/static/index.html"));
    Html(INDEX)
}

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match AxonConfig::load() {
        Ok(c) => c,
        Err(e) => {
            tracing::error!(target: "axon::gateway", error = %e, "Failed to load configuration");
            std::process::exit(1);
        }
    };
    if !config.has_completion_key() {
        tracing::warn!(
            target: "axon::gateway",
            "No completion API key configured; /api/axon/process and /api/axon/identity will fail"
        );
    }

    let store = match SqliteStore::open(&config.store_path) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!(target: "axon::gateway", error = %e, path = %config.store_path, "Failed to open store");
            std::process::exit(1);
        }
    };

    let completion: Arc<dyn CompletionClient> = Arc::new(ChatCompletionClient::from_config(&config));
    let addr = config.bind_addr();
    tracing::info!(
        target: "axon::gateway",
        app = %config.app_name,
        version = axon_core::version(),
        model = %config.completion_model,
        timeout_secs = config.completion_timeout_secs,
        "Starting gateway"
    );

    let app = build_app(AppState::new(config, store, completion));
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!(target: "axon::gateway", error = %e, addr = %addr, "Failed to bind");
            std::process::exit(1);
        }
    };
    tracing::info!(target: "axon::gateway", "Listening on http://{}", addr);
    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!(target: "axon::gateway", error = %e, "Server error");
        std::process::exit(1);
    }
}
