//! Authentication and authorization
//!
//! Callers authenticate with a bearer JWT. The token subject is the caller's
//! `ActorId`; the roles claim lists permission strings. Whether a caller may
//! act as the oracle is decided by the ledger, not by the token.

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use core_kernel::ActorId;

/// JWT claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (actor UUID)
    pub sub: String,
    /// Granted permissions
    pub roles: Vec<String>,
    /// Expiration timestamp
    pub exp: i64,
    /// Issued at timestamp
    pub iat: i64,
}

impl Claims {
    /// Parses the subject as an actor id
    pub fn actor_id(&self) -> Result<ActorId, AuthError> {
        Uuid::parse_str(&self.sub)
            .map(ActorId::from_uuid)
            .map_err(|_| AuthError::InvalidSubject(self.sub.clone()))
    }

    /// Fails unless the token carries `permission`
    pub fn require(&self, permission: &str) -> Result<(), AuthError> {
        if has_role(self, permission) {
            Ok(())
        } else {
            Err(AuthError::MissingPermission(permission.to_string()))
        }
    }
}

/// Auth errors
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid token")]
    InvalidToken,
    #[error("Token expired")]
    TokenExpired,
    #[error("Token subject is not an actor id: {0}")]
    InvalidSubject(String),
    #[error("Missing permission: {0}")]
    MissingPermission(String),
}

/// Creates a new JWT token
///
/// # Arguments
///
/// * `actor` - Token subject
/// * `roles` - Granted permissions
/// * `secret` - JWT secret key
/// * `expiration_secs` - Token validity in seconds
pub fn create_token(
    actor: ActorId,
    roles: Vec<String>,
    secret: &str,
    expiration_secs: u64,
) -> Result<String, AuthError> {
    let now = Utc::now();
    let exp = now + Duration::seconds(expiration_secs as i64);

    let claims = Claims {
        sub: actor.as_uuid().to_string(),
        roles,
        exp: exp.timestamp(),
        iat: now.timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|_| AuthError::InvalidToken)
}

/// Validates a JWT token
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, AuthError> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => AuthError::TokenExpired,
        _ => AuthError::InvalidToken,
    })?;

    Ok(token_data.claims)
}

/// Checks if user has required role
pub fn has_role(claims: &Claims, required_role: &str) -> bool {
    claims.roles.iter().any(|r| r == required_role || r == "admin")
}

/// Permission definitions
pub mod permissions {
    pub const POLICY_APPLY: &str = "policy:apply";
    pub const POLICY_READ: &str = "policy:read";
    pub const POLICY_EXPIRE: &str = "policy:expire";
    pub const ORACLE_CALLBACK: &str = "oracle:callback";
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";

    #[test]
    fn test_token_roundtrip_keeps_actor() {
        let actor = ActorId::new();
        let token = create_token(actor, vec![permissions::POLICY_READ.into()], SECRET, 60).unwrap();
        let claims = validate_token(&token, SECRET).unwrap();

        assert_eq!(claims.actor_id().unwrap(), actor);
        assert!(claims.require(permissions::POLICY_READ).is_ok());
        assert!(matches!(
            claims.require(permissions::POLICY_EXPIRE),
            Err(AuthError::MissingPermission(_))
        ));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = create_token(ActorId::new(), vec![], SECRET, 60).unwrap();
        assert!(matches!(validate_token(&token, "other"), Err(AuthError::InvalidToken)));
    }

    #[test]
    fn test_admin_has_every_permission() {
        let claims = Claims {
            sub: "ops".into(),
            roles: vec!["admin".into()],
            exp: 0,
            iat: 0,
        };
        assert!(claims.require(permissions::ORACLE_CALLBACK).is_ok());
        assert!(matches!(claims.actor_id(), Err(AuthError::InvalidSubject(_))));
    }
}
