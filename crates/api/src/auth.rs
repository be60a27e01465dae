//! JWT principal gate.
//!
//! The deployment's concrete [`PrincipalGate`]: resolves an HS256 bearer
//! token to `{id, role}`. The rest of the system never looks inside the
//! credential.

use axum::http::{HeaderMap, header};
use chrono::Utc;
use domain::{AuthError, Operation, Principal, PrincipalGate, Role, is_allowed};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiError;

/// JWT claim set: subject id, role, expiry.
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    role: Role,
    exp: usize,
}

/// HS256 bearer-token gate.
#[derive(Clone)]
pub struct JwtGate {
    secret: String,
}

impl JwtGate {
    /// Creates a gate verifying tokens against the given secret.
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    /// Issues a token for a principal, valid for the given duration.
    ///
    /// Token issuance proper belongs to the authentication service; this
    /// helper exists for tests and local tooling and mirrors its claim set.
    pub fn sign(
        &self,
        principal: &Principal,
        ttl: chrono::Duration,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let claims = Claims {
            sub: principal.id.to_string(),
            role: principal.role,
            exp: (Utc::now() + ttl).timestamp() as usize,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
    }
}

impl PrincipalGate for JwtGate {
    fn resolve(&self, credential: Option<&str>) -> Result<Principal, AuthError> {
        let token = credential.ok_or(AuthError::MissingCredential)?;

        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::new(Algorithm::HS256),
        )
        .map_err(|e| AuthError::InvalidCredential(e.to_string()))?;

        let id = Uuid::parse_str(&data.claims.sub).map_err(|_| AuthError::UnknownPrincipal)?;
        Ok(Principal {
            id: id.into(),
            role: data.claims.role,
        })
    }
}

/// Extracts the bearer token from the `Authorization` header, if any.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

/// Checks the role policy for an operation; violations are a 403, never a
/// 404.
pub fn authorize(operation: Operation, principal: &Principal) -> Result<(), ApiError> {
    if is_allowed(operation, principal.role) {
        Ok(())
    } else {
        Err(ApiError::Forbidden("Admin role required"))
    }
}
