use serde::{Deserialize, Serialize};

/// JWT payload. Carries exactly the identity fields embedded at issuance;
/// never any secret material.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i64,         // user ID
    pub email: String,
    pub username: String,
    pub iat: usize,       // issued at (unix timestamp)
    pub exp: usize,       // expires at (unix timestamp)
}

/// The authenticated caller, as resolved from a verified token. Trusted for
/// the token-embedded fields only; no per-request store lookup, so a deleted
/// user's unexpired token keeps working until it expires.
#[derive(Debug, Clone, Serialize)]
pub struct Identity {
    pub id: i64,
    pub email: String,
    pub username: String,
}

impl From<Claims> for Identity {
    fn from(claims: Claims) -> Self {
        Self {
            id: claims.sub,
            email: claims.email,
            username: claims.username,
        }
    }
}
