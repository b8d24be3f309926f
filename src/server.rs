//! Axum server setup, shared application state, and graceful shutdown.
//!
//! Contains [`AppState`] (the `Arc`-shared pipeline and stats),
//! [`build_state`] for wiring the directory API into the diagnostic
//! pipeline, [`build_router`] for constructing the Axum router, and
//! [`shutdown_signal`] for SIGTERM / Ctrl+C handling.
//!
//! Every request, `/health` included, reaches the router's fallback and is
//! served by [`Pipeline::serve`].

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::response::Response;
use axum::Router;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::api::Api;
use crate::config::model::Config;
use crate::directory::repository::Directory;
use crate::health::Stats;
use crate::middleware::logging::Redactor;
use crate::middleware::Pipeline;

pub struct AppState {
    pub pipeline: Pipeline<Api>,
    pub stats: Arc<Stats>,
}

#[must_use]
pub fn build_state(config: &Config, max_body: usize) -> Arc<AppState> {
    let stats = Arc::new(Stats::new());
    let directory = Directory::in_memory(config);
    let api = Api::new(directory, Arc::clone(&stats));
    let redactor = Redactor::new(&config.diagnostics.redact_fields);
    Arc::new(AppState {
        pipeline: Pipeline::new(api, redactor, max_body),
        stats,
    })
}

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .fallback(pipeline_handler)
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(state)
}

async fn pipeline_handler(State(state): State<Arc<AppState>>, request: Request) -> Response {
    let response = state.pipeline.serve(request).await;
    state.stats.record(response.status());
    response
}

pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("received Ctrl+C"),
        () = terminate => tracing::info!("received SIGTERM"),
    }
}
