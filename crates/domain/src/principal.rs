//! The authenticated principal contract.
//!
//! Authentication itself is an external collaborator: the core consumes a
//! resolved `{id, role}` pair or a rejection, and never inspects credential
//! internals.

use common::UserId;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Role of an authenticated principal. Flat two-level policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An authenticated actor: identity plus role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub id: UserId,
    pub role: Role,
}

/// Rejections from the principal gate, distinguishable by kind.
#[derive(Debug, Error)]
pub enum AuthError {
    /// No credential was presented.
    #[error("Missing authentication credential")]
    MissingCredential,

    /// The credential is malformed or expired.
    #[error("Invalid credential: {0}")]
    InvalidCredential(String),

    /// The credential names a principal that does not resolve.
    #[error("Unknown principal")]
    UnknownPrincipal,
}

/// Resolves a caller's credential to a principal.
///
/// Any rejection means no creation and no privileged action; the caller
/// surfaces it as an authentication failure.
pub trait PrincipalGate: Send + Sync {
    fn resolve(&self, credential: Option<&str>) -> Result<Principal, AuthError>;
}
