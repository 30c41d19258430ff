use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::accounts::repo_types::Role;

/// JWT payload of a session credential.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,   // account ID
    pub role: Role,
    pub iat: usize,  // issued at (unix timestamp)
    pub exp: usize,  // expires at (unix timestamp)
    pub iss: String, // issuer
    pub aud: String, // audience
}

/// Caller identity established from a verified credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Session {
    pub account_id: Uuid,
    pub role: Role,
}

impl From<Claims> for Session {
    fn from(c: Claims) -> Self {
        Self {
            account_id: c.sub,
            role: c.role,
        }
    }
}
