//! Oracle handlers

use axum::{extract::State, Extension, Json};

use core_kernel::{ProcessId, RequestId};

use crate::auth::{permissions, Claims};
use crate::dto::oracle::*;
use crate::{error::ApiError, AppState};

/// Oracle id and product information
pub async fn oracle_info(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<OracleInfoResponse>, ApiError> {
    claims.require(permissions::POLICY_READ)?;
    Ok(Json(state.service.product().into()))
}

/// Requests still waiting for an answer
pub async fn outstanding_requests(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<OutstandingRequestResponse>>, ApiError> {
    claims.require(permissions::ORACLE_CALLBACK)?;

    let requests = state.service.outstanding_requests().await;
    Ok(Json(requests.into_iter().map(Into::into).collect()))
}

/// Delivers an oracle answer; the token subject is the calling oracle
pub async fn oracle_callback(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(request): Json<OracleCallbackRequest>,
) -> Result<Json<CallbackResponse>, ApiError> {
    claims.require(permissions::ORACLE_CALLBACK)?;
    let caller = claims.actor_id()?;

    let response = serde_json::to_vec(&request.response)
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let outcome = state
        .service
        .oracle_callback(
            caller,
            RequestId::from_uuid(request.request_id),
            ProcessId::from_uuid(request.process_id),
            &response,
        )
        .await?;

    Ok(Json(outcome.into()))
}
