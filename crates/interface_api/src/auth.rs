//! Authentication and authorization
//!
//! Tokens are HS256 JWTs whose subject is the actor id. The role travels
//! in the token; approval status does not, since it can change and the
//! engine re-reads it on every operation.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::request::Parts,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use core_kernel::ActorId;
use domain_wallet::Role;

use crate::error::ApiError;

/// JWT claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (actor ID)
    pub sub: String,
    pub role: Role,
    /// Expiration timestamp
    pub exp: i64,
    /// Issued at timestamp
    pub iat: i64,
}

/// Auth errors
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid token")]
    InvalidToken,
    #[error("Token expired")]
    TokenExpired,
    #[error("Missing permission: {0}")]
    MissingPermission(String),
    #[error("Token signing failed: {0}")]
    Signing(String),
}

/// Creates a new JWT token
///
/// # Arguments
///
/// * `actor_id` - Actor the token authenticates
/// * `role` - The actor's role
/// * `secret` - JWT secret key
/// * `expiration_secs` - Token validity in seconds
pub fn create_token(
    actor_id: ActorId,
    role: Role,
    secret: &str,
    expiration_secs: u64,
) -> Result<String, AuthError> {
    let now = Utc::now();
    let exp = now + Duration::seconds(expiration_secs.min(u64::from(u32::MAX)) as i64);

    let claims = Claims {
        sub: actor_id.as_uuid().to_string(),
        role,
        exp: exp.timestamp(),
        iat: now.timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AuthError::Signing(e.to_string()))
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

/// The caller, as established by the auth middleware
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedActor {
    pub id: ActorId,
    pub role: Role,
}

impl AuthenticatedActor {
    pub fn from_claims(claims: &Claims) -> Result<Self, AuthError> {
        let id = claims.sub.parse().map_err(|_| AuthError::InvalidToken)?;
        Ok(Self {
            id,
            role: claims.role,
        })
    }

    /// Fails unless the caller has `role`
    pub fn require(&self, role: Role) -> Result<(), AuthError> {
        if self.role == role {
            Ok(())
        } else {
            Err(AuthError::MissingPermission(format!("{} role required", role)))
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedActor
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let claims = parts
            .extensions
            .get::<Claims>()
            .ok_or(ApiError::Unauthorized)?;
        Ok(AuthenticatedActor::from_claims(claims)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";

    #[test]
    fn test_token_round_trip() {
        let actor = ActorId::new_v7();
        let token = create_token(actor, Role::Agent, SECRET, 60).unwrap();
        let claims = validate_token(&token, SECRET).unwrap();
        let caller = AuthenticatedActor::from_claims(&claims).unwrap();

        assert_eq!(caller.id, actor);
        assert_eq!(caller.role, Role::Agent);
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let token = create_token(ActorId::new(), Role::User, SECRET, 60).unwrap();
        assert!(matches!(
            validate_token(&token, "other-secret"),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn test_require_role() {
        let caller = AuthenticatedActor {
            id: ActorId::new(),
            role: Role::User,
        };
        assert!(caller.require(Role::User).is_ok());
        assert!(matches!(
            caller.require(Role::Admin),
            Err(AuthError::MissingPermission(_))
        ));
    }

    #[test]
    fn test_malformed_subject_is_rejected() {
        let claims = Claims {
            sub: "not-a-uuid".to_string(),
            role: Role::User,
            exp: 0,
            iat: 0,
        };
        assert!(AuthenticatedActor::from_claims(&claims).is_err());
    }
}
