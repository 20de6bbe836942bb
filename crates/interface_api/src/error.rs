//! API error handling

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use domain_policy::{ErrorKind, PolicyError};

use crate::auth::AuthError;

/// API error types
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Validation error: {0}")]
    Validation(String, Vec<String>),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error(transparent)]
    Policy(#[from] PolicyError),
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<String>>,
}

fn policy_status(err: &PolicyError) -> StatusCode {
    match err {
        PolicyError::NonExistingPolicy { .. } | PolicyError::ApplicationIndexOutOfRange { .. } => {
            StatusCode::NOT_FOUND
        }
        PolicyError::ActivePolicyExists { .. }
        | PolicyError::AlreadyExpired { .. }
        | PolicyError::ExpiredOrUnknownPolicy { .. }
        | PolicyError::CorrelationMismatch { .. } => StatusCode::CONFLICT,
        other => match other.kind() {
            ErrorKind::Validation => StatusCode::UNPROCESSABLE_ENTITY,
            ErrorKind::Authorization => StatusCode::FORBIDDEN,
            ErrorKind::Decode => StatusCode::BAD_REQUEST,
            ErrorKind::Infrastructure => StatusCode::INTERNAL_SERVER_ERROR,
        },
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::Validation(..) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Policy(err) => policy_status(err),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (error_type, message, details) = match self {
            ApiError::NotFound(msg) => ("not_found", msg, None),
            ApiError::BadRequest(msg) => ("bad_request", msg, None),
            ApiError::Unauthorized => ("unauthorized", "Unauthorized".to_string(), None),
            ApiError::Forbidden(msg) => ("forbidden", msg, None),
            ApiError::Validation(msg, details) => ("validation_error", msg, Some(details)),
            ApiError::Internal(msg) => ("internal_error", msg, None),
            ApiError::Policy(err) => {
                if status == StatusCode::INTERNAL_SERVER_ERROR {
                    tracing::error!(error = %err, "Fire insurance operation failed");
                }
                (err.code(), err.to_string(), None)
            }
        };

        let body = ErrorResponse {
            error: error_type.to_string(),
            message,
            details,
        };

        (status, Json(body)).into_response()
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidToken | AuthError::TokenExpired => ApiError::Unauthorized,
            AuthError::InvalidSubject(_) | AuthError::MissingPermission(_) => {
                ApiError::Forbidden(err.to_string())
            }
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let details = errors
            .field_errors()
            .iter()
            .map(|(field, errs)| {
                let codes: Vec<_> = errs.iter().map(|e| e.code.to_string()).collect();
                format!("{}: {}", field, codes.join(", "))
            })
            .collect();
        ApiError::Validation("Request validation failed".to_string(), details)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::{ActorId, MoneyError, PortError, ProcessId};

    #[test]
    fn test_policy_error_statuses() {
        let pid = ProcessId::new_v7();
        let cases = [
            (PolicyError::InvalidPremium("USD 0.00".into()), StatusCode::UNPROCESSABLE_ENTITY),
            (PolicyError::ActivePolicyExists { object_name: "h".into() }, StatusCode::CONFLICT),
            (PolicyError::NonExistingPolicy { process_id: pid }, StatusCode::NOT_FOUND),
            (PolicyError::AlreadyExpired { process_id: pid }, StatusCode::CONFLICT),
            (PolicyError::unauthorized(ActorId::new(), "oracle"), StatusCode::FORBIDDEN),
            (
                PolicyError::from(MoneyError::CurrencyMismatch("USD".into(), "EUR".into())),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                PolicyError::from(PortError::internal("boom")),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status(), status);
        }
    }

    #[test]
    fn test_missing_permission_is_forbidden() {
        let err = ApiError::from(AuthError::MissingPermission("policy:expire".into()));
        assert_eq!(err.status(), StatusCode::FORBIDDEN);
        assert_eq!(ApiError::from(AuthError::TokenExpired).status(), StatusCode::UNAUTHORIZED);
    }
}
