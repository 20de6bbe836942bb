//! HTTP API Layer
//!
//! REST API for the parametric fire insurance product using Axum.
//!
//! # Architecture
//!
//! - **Handlers**: policy, oracle and health endpoints
//! - **Middleware**: JWT authentication, audit logging, tracing
//! - **DTOs**: Request/Response data transfer objects
//! - **Error Handling**: `PolicyError` mapped to HTTP statuses
//!
//! # Example
//!
//! ```rust,ignore
//! use interface_api::create_router;
//!
//! let app = create_router(Arc::new(service), config);
//! axum::serve(listener, app).await?;
//! ```

pub mod config;
pub mod error;
pub mod middleware;
pub mod handlers;
pub mod dto;
pub mod auth;

use std::sync::Arc;

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use domain_policy::FireInsuranceService;

use crate::config::ApiConfig;
use crate::handlers::{health, oracle, policy};
use crate::middleware::{audit_middleware, auth_middleware};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<FireInsuranceService>,
    pub config: ApiConfig,
}

/// Creates the main API router
pub fn create_router(service: Arc<FireInsuranceService>, config: ApiConfig) -> Router {
    let state = AppState { service, config };

    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check));

    let policy_routes = Router::new()
        .route("/", post(policy::apply_for_policy).get(policy::list_policies))
        .route("/:id", get(policy::get_policy))
        .route("/:id/expire", post(policy::expire_policy));

    let oracle_routes = Router::new()
        .route("/", get(oracle::oracle_info))
        .route("/requests", get(oracle::outstanding_requests))
        .route("/callback", post(oracle::oracle_callback));

    // Protected API routes
    let api_routes = Router::new()
        .nest("/policies", policy_routes)
        .nest("/oracle", oracle_routes)
        .layer(axum_middleware::from_fn(audit_middleware))
        .layer(axum_middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .merge(public_routes)
        .nest("/api/v1", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
