use anyhow::Context;
use axum::Router;
use qris_checkout::api::{self, CheckoutState};
use qris_checkout::config::AppConfig;
use qris_checkout::database::InMemoryOrderStore;
use qris_checkout::health::HealthChecker;
use qris_checkout::logging::init_tracing;
use qris_checkout::middleware::logging::{request_logging_middleware, UuidRequestId};
use qris_checkout::payments::providers::{MidtransConfig, MidtransProvider};
use qris_checkout::payments::signature::SignatureVerifier;
use qris_checkout::services::transaction_orchestrator::{
    OrchestratorConfig, TransactionOrchestrator,
};
use qris_checkout::services::views::{ViewContext, POLL_INTERVAL_MS};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tower::ServiceBuilder;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, starting graceful shutdown");
}

fn build_app(config: &AppConfig) -> anyhow::Result<Router> {
    let gateway = Arc::new(
        MidtransProvider::new(MidtransConfig::from(&config.gateway))
            .context("failed to initialise Midtrans client")?,
    );
    let store = Arc::new(InMemoryOrderStore::new());

    let orchestrator = Arc::new(TransactionOrchestrator::new(
        store.clone(),
        gateway.clone(),
        SignatureVerifier::new(config.gateway.server_key.clone()),
        OrchestratorConfig::from(&config.checkout),
    ));

    let state = Arc::new(CheckoutState {
        orchestrator,
        views: ViewContext {
            min_amount: config.checkout.min_amount,
            client_key: config.gateway.client_key.clone(),
            snap_js_url: config.gateway.snap_js_url(),
            poll_interval_ms: POLL_INTERVAL_MS,
        },
        health_checker: HealthChecker::new(store, gateway),
    });

    Ok(api::router(state).layer(
        ServiceBuilder::new()
            .layer(SetRequestIdLayer::x_request_id(UuidRequestId))
            .layer(TraceLayer::new_for_http())
            .layer(axum::middleware::from_fn(request_logging_middleware))
            .layer(PropagateRequestIdLayer::x_request_id()),
    ))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env().context("failed to load configuration")?;
    init_tracing(&config.logging);
    config.validate().context("invalid configuration")?;

    info!(gateway = ?config.gateway, checkout = ?config.checkout, "🔧 Configuration loaded");
    if !config.gateway.is_production {
        warn!("Midtrans sandbox mode: payments are simulated");
    }
    if config.gateway.client_key.is_none() {
        warn!("MIDTRANS_CLIENT_KEY not set: the Snap popup cannot be opened");
    }

    let app = build_app(&config)?;
    info!("✅ Routes configured");

    let addr: SocketAddr = config
        .server
        .bind_address()
        .parse()
        .context("invalid HOST/PORT")?;
    let listener = tokio::net::TcpListener::bind(addr).await.map_err(|e| {
        error!("❌ Failed to bind to address {}: {}", addr, e);
        e
    })?;

    info!(address = %addr, "🚀 Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("👋 Server shutdown complete");

    Ok(())
}
