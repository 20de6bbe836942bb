//! Policy handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use uuid::Uuid;
use validator::Validate;

use core_kernel::{Currency, Money, ProcessId};

use crate::auth::{permissions, Claims};
use crate::dto::policy::*;
use crate::{error::ApiError, AppState};

/// Applies for a policy on behalf of the token subject
pub async fn apply_for_policy(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(request): Json<ApplyForPolicyRequest>,
) -> Result<(StatusCode, Json<ApplicationReceiptResponse>), ApiError> {
    claims.require(permissions::POLICY_APPLY)?;
    request.validate()?;
    let holder = claims.actor_id()?;

    let currency = match request.currency.as_deref() {
        Some(code) => code
            .parse::<Currency>()
            .map_err(|e| ApiError::BadRequest(e.to_string()))?,
        None => state.service.product().currency,
    };

    let receipt = state
        .service
        .apply_for_policy(
            holder,
            &request.object_name,
            Money::new(request.premium, currency),
            Money::new(request.sum_insured, currency),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(receipt.into())))
}

/// Lists the ids of all applications in creation order
pub async fn list_policies(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<PolicyListResponse>, ApiError> {
    claims.require(permissions::POLICY_READ)?;

    let count = state.service.applications().await;
    let mut process_ids = Vec::with_capacity(count);
    for index in 0..count {
        process_ids.push(state.service.application_id(index).await?);
    }

    Ok(Json(PolicyListResponse { count, process_ids }))
}

/// Gets a policy with its claims and payouts
pub async fn get_policy(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<Json<PolicyResponse>, ApiError> {
    claims.require(permissions::POLICY_READ)?;

    let view = state.service.policy(ProcessId::from_uuid(id)).await?;
    Ok(Json(view.into()))
}

/// Expires a policy
pub async fn expire_policy(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    claims.require(permissions::POLICY_EXPIRE)?;

    state.service.expire_policy(ProcessId::from_uuid(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}
