use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, instrument, warn};

use super::{
    claims::Identity,
    dto::{AuthResponse, LoginRequest, PublicUser, RegisterRequest},
    extractors::AuthUser,
    jwt::JwtKeys,
    password::{hash_password, verify_password},
    repo::User,
};
use crate::{error::ApiError, state::AppState};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/me", get(me))
}

fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

fn validate_register(
    payload: RegisterRequest,
) -> Result<(String, String, String), ApiError> {
    let username = payload.username.unwrap_or_default();
    let email = payload.email.unwrap_or_default().trim().to_lowercase();
    let password = payload.password.unwrap_or_default();

    let mut errors = Vec::new();
    if !(3..=30).contains(&username.chars().count()) {
        errors.push("Username must be between 3 and 30 characters".to_string());
    }
    if !is_valid_email(&email) {
        errors.push("Please enter a valid email".to_string());
    }
    if password.chars().count() < 6 {
        errors.push("Password must be at least 6 characters long".to_string());
    }
    if errors.is_empty() {
        Ok((username, email, password))
    } else {
        Err(ApiError::validation_errors(errors))
    }
}

fn validate_login(payload: LoginRequest) -> Result<(String, String), ApiError> {
    let email = payload.email.unwrap_or_default().trim().to_lowercase();
    let password = payload.password.unwrap_or_default();

    let mut errors = Vec::new();
    if !is_valid_email(&email) {
        errors.push("Please enter a valid email".to_string());
    }
    if password.is_empty() {
        errors.push("Password is required".to_string());
    }
    if errors.is_empty() {
        Ok((email, password))
    } else {
        Err(ApiError::validation_errors(errors))
    }
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    let (username, email, password) = validate_register(payload)?;

    if User::find_by_username_or_email(&state.db, &username, &email)
        .await?
        .is_some()
    {
        warn!(%email, "registration for taken username or email");
        return Err(ApiError::Conflict(
            "User with this email or username already exists".into(),
        ));
    }

    let hash = hash_password(&password)?;
    let user = User::create(&state.db, &username, &email, &hash).await?;

    let keys = JwtKeys::from_ref(&state);
    let token = keys.sign(user.id, &user.email, &user.username)?;

    info!(user_id = user.id, %email, "user registered");
    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            success: true,
            message: "User registered successfully".into(),
            token,
            user: PublicUser::from(&user),
        }),
    ))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let (email, password) = validate_login(payload)?;

    // Unknown email and wrong password produce the same rejection.
    let user = User::find_by_email(&state.db, &email)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Invalid credentials".into()))?;

    if !verify_password(&password, &user.password_hash)? {
        warn!(user_id = user.id, "login with invalid password");
        return Err(ApiError::Unauthorized("Invalid credentials".into()));
    }

    let keys = JwtKeys::from_ref(&state);
    let token = keys.sign(user.id, &user.email, &user.username)?;

    info!(user_id = user.id, %email, "user logged in");
    Ok(Json(AuthResponse {
        success: true,
        message: "Login successful".into(),
        token,
        user: PublicUser::from(&user),
    }))
}

/// Answers from the token alone; the identity is not re-checked against the
/// store (stateless trust, see extractors).
#[instrument(skip_all)]
pub async fn me(AuthUser(identity): AuthUser) -> Json<Identity> {
    Json(identity)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_shapes() {
        assert!(is_valid_email("someone@example.com"));
        assert!(is_valid_email("a.b+c@sub.domain.io"));
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("missing@tld"));
        assert!(!is_valid_email("spaces in@example.com"));
    }

    #[test]
    fn register_collects_every_field_error() {
        let err = validate_register(RegisterRequest {
            username: Some("ab".into()),
            email: Some("nope".into()),
            password: Some("short".into()),
        })
        .unwrap_err();
        match err {
            ApiError::Validation { message, errors } => {
                assert_eq!(message, "Validation error");
                assert_eq!(errors.len(), 3);
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn register_accepts_valid_input_and_normalizes_email() {
        let (username, email, password) = validate_register(RegisterRequest {
            username: Some("writer".into()),
            email: Some("  Writer@Example.COM ".into()),
            password: Some("secret123".into()),
        })
        .expect("valid input");
        assert_eq!(username, "writer");
        assert_eq!(email, "writer@example.com");
        assert_eq!(password, "secret123");
    }

    #[test]
    fn register_treats_missing_fields_as_invalid() {
        let err = validate_register(RegisterRequest {
            username: None,
            email: None,
            password: None,
        })
        .unwrap_err();
        match err {
            ApiError::Validation { errors, .. } => assert_eq!(errors.len(), 3),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn login_requires_password() {
        let err = validate_login(LoginRequest {
            email: Some("reader@example.com".into()),
            password: Some(String::new()),
        })
        .unwrap_err();
        match err {
            ApiError::Validation { errors, .. } => {
                assert_eq!(errors, vec!["Password is required".to_string()]);
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }
}
