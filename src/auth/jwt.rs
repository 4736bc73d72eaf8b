use axum::extract::FromRef;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use time::{Duration, OffsetDateTime};
use tracing::debug;

use super::claims::Claims;
use crate::state::AppState;

/// Tokens are valid for a fixed seven days from issuance.
pub const TOKEN_TTL: Duration = Duration::days(7);

#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        Self::new(&state.config.jwt.secret)
    }
}

impl JwtKeys {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    pub fn sign(&self, user_id: i64, email: &str, username: &str) -> anyhow::Result<String> {
        let now = OffsetDateTime::now_utc();
        let claims = Claims {
            sub: user_id,
            email: email.to_string(),
            username: username.to_string(),
            iat: now.unix_timestamp() as usize,
            exp: (now + TOKEN_TTL).unix_timestamp() as usize,
        };
        let token = encode(&Header::default(), &claims, &self.encoding)?;
        debug!(user_id, "jwt signed");
        Ok(token)
    }

    /// Rejects bad signatures, expired tokens, and malformed tokens alike.
    /// Callers map any failure to one uniform 401; the cause is not exposed.
    pub fn verify(&self, token: &str) -> anyhow::Result<Claims> {
        let data = decode::<Claims>(token, &self.decoding, &Validation::default())?;
        debug!(user_id = data.claims.sub, "jwt verified");
        Ok(data.claims)
    }
}
