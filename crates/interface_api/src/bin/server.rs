//! Parametric Fire Insurance - API Server Binary
//!
//! # Usage
//!
//! ```bash
//! API_ORACLE_ID=... API_DATABASE_URL=postgres://... cargo run --bin fire-insurance-api
//! ```
//!
//! # Environment Variables
//!
//! * `API_HOST` - Server host (default: 0.0.0.0)
//! * `API_PORT` - Server port (default: 8080)
//! * `API_JWT_SECRET` - JWT signing secret (required in production)
//! * `API_JWT_EXPIRATION_SECS` - JWT token expiration in seconds (default: 3600)
//! * `API_DATABASE_URL` - PostgreSQL connection string
//! * `API_LOG_LEVEL` - Log level: trace, debug, info, warn, error (default: info)
//! * `API_LOG_JSON` - Emit JSON log lines (default: false)
//! * `API_ORACLE_ID` - Oracle answering fire severity requests (required)
//! * `API_ORACLE_ACTOR` - Actor granted the oracle role at startup
//! * `API_PRODUCT_NAME` - Product name (default: FireInsurance)
//! * `API_CURRENCY` - Premium currency (default: USD)

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use core_kernel::ActorId;
use domain_policy::{FireInsuranceService, Role, TracingEventPublisher};
use infra_db::{create_pool, run_migrations, OutboxOracleAdapter, PostgresUnderwritingAdapter};
use interface_api::{config::ApiConfig, create_router};

/// Initializes logging, connects the ledger, restores the registry and
/// serves the HTTP API until shutdown.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (useful for local development)
    dotenvy::dotenv().ok();

    let config = ApiConfig::from_env().context("invalid API_* configuration")?;

    init_tracing(&config.log_level, config.log_json);

    let product = config.product_config()?;
    tracing::info!(
        host = %config.host,
        port = %config.port,
        product = %product.product_name,
        version = %product.product_version,
        oracle_id = %product.oracle_id,
        "Starting fire insurance API server"
    );

    let pool = create_pool(config.database_config()).await?;
    run_migrations(&pool).await?;

    let ledger = PostgresUnderwritingAdapter::new(pool.clone());
    if let Some(actor) = config.oracle_actor {
        ledger.grant(ActorId::from_uuid(actor), Role::Oracle).await?;
    }

    let service = FireInsuranceService::new(
        Arc::new(ledger),
        Arc::new(OutboxOracleAdapter::new(pool)),
        Arc::new(TracingEventPublisher),
        product,
    );
    let active = service.restore().await?;
    tracing::info!(active, "Registry restored");

    let app = create_router(Arc::new(service), config.clone());

    let addr: SocketAddr = config.server_addr().parse()?;
    tracing::info!(%addr, "Server listening");

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Initializes the tracing subscriber for structured logging.
///
/// `RUST_LOG` takes precedence over the configured level.
fn init_tracing(log_level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_target(true))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_target(true))
            .init();
    }
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
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
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
