//! KeyGate HTTP Server
//!
//! Main entry point for the gateway.

use std::{sync::Arc, time::Duration};

use anyhow::Context;
use application::{
    ChatService, KeyService,
    ports::{ClockPort, InferencePort, KeyRecordStore},
};
use infrastructure::{
    AppConfig, ChatCompletionsInferenceAdapter, FileKeyRecordStore, SystemClock, init_logging,
};
use presentation_http::{AppState, CredentialHeaders, create_app, error::set_expose_internal_errors};
use tokio::{net::TcpListener, signal};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load().context("Failed to load configuration")?;
    init_logging(config.server.log_format)?;

    info!("KeyGate v{} starting...", env!("CARGO_PKG_VERSION"));

    // No secrets, no server
    config.validate().context("Refusing to start")?;
    set_expose_internal_errors(!config.is_production());

    info!(
        environment = %config.environment,
        host = %config.server.host,
        port = %config.server.port,
        model = %config.inference.default_model,
        key_path = %config.key_store.path.display(),
        "Configuration loaded"
    );

    let clock: Arc<dyn ClockPort> = Arc::new(SystemClock);
    let store: Arc<dyn KeyRecordStore> =
        Arc::new(FileKeyRecordStore::new(config.key_store.path.clone()));
    let admin_secret = config.admin_secret()?;

    let key_service = Arc::new(KeyService::new(
        admin_secret.clone(),
        store,
        Arc::clone(&clock),
    ));
    key_service.initialize().await;

    let inference: Arc<dyn InferencePort> = Arc::new(
        ChatCompletionsInferenceAdapter::new(config.inference.clone())
            .context("Failed to initialize upstream client")?,
    );
    let chat_service = Arc::new(ChatService::new(inference));

    let headers = CredentialHeaders::parse(
        &config.security.admin_header,
        &config.security.api_key_header,
    )?;

    let state = AppState {
        key_service,
        chat_service,
        admin_secret: Arc::new(admin_secret),
        headers,
        clock,
    };

    let app = create_app(state, config.server.max_body_size_bytes);

    let addr = config.server.bind_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("Listening on http://{}", addr);

    let shutdown_timeout = Duration::from_secs(config.server.shutdown_timeout_secs.unwrap_or(30));

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown_timeout))
        .await?;

    info!("Server shutdown complete");

    Ok(())
}

/// Wait for shutdown signals (SIGINT, SIGTERM)
async fn shutdown_signal(timeout: Duration) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            },
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown");
        }
        () = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown");
        }
    }

    // Hard stop if connections do not drain in time
    tokio::spawn(async move {
        tokio::time::sleep(timeout).await;
        tracing::warn!(?timeout, "Graceful shutdown timed out, exiting");
        std::process::exit(1);
    });
}
