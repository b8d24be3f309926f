//! `roster run`: start the API server.
//!
//! Loads the configuration (explicit file, auto-detected file, or
//! defaults), seeds the in-memory directory, and serves the pipeline with
//! graceful shutdown.

use std::net::SocketAddr;

use crate::cli::RunArgs;
use crate::config;
use crate::error::RosterError;
use crate::logging;
use crate::server;

pub async fn execute(args: RunArgs) -> Result<(), RosterError> {
    let log_format = logging::resolve_format(args.pretty, args.json);
    logging::init(&args.log_level, log_format);

    let loaded = config::load(args.config.as_deref()).await?;
    let managers = loaded.config.managers.len();
    let employees = loaded.config.employees.len();

    let state = server::build_state(&loaded.config, args.max_body);
    let router = server::build_router(state);

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!(
        addr = %addr,
        config = %loaded.source_name,
        managers,
        employees,
        redacted = ?loaded.config.diagnostics.redact_fields,
        "roster started"
    );

    axum::serve(listener, router)
        .with_graceful_shutdown(server::shutdown_signal())
        .await?;

    tracing::info!("roster stopped");
    Ok(())
}
