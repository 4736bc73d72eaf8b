use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Domain error taxonomy. Repository and handler code returns these typed
/// outcomes; the envelope rendering below is the only place status codes and
/// response bodies are decided.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{message}")]
    Validation {
        message: String,
        errors: Vec<String>,
    },
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("Something went wrong on the server")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            errors: Vec::new(),
        }
    }

    /// Several field-level messages under the generic "Validation error"
    /// heading, mirroring the `errors` array convention of the API.
    pub fn validation_errors(errors: Vec<String>) -> Self {
        Self::Validation {
            message: "Validation error".into(),
            errors,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            // Conflict renders as 400, matching the register/category-create
            // responses this API has always produced.
            Self::Validation { .. } | Self::Conflict(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            match db_err.code().as_deref() {
                // unique_violation: a duplicate slipped past a pre-check
                Some("23505") => return Self::Conflict("Resource already exists".into()),
                // foreign_key_violation: e.g. a category_id referencing
                // no existing category
                Some("23503") => return Self::validation("Referenced record does not exist"),
                _ => {}
            }
        }
        Self::Internal(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let mut body = json!({
            "success": false,
            "message": self.to_string(),
        });
        match &self {
            Self::Validation { errors, .. } if !errors.is_empty() => {
                body["errors"] = json!(errors);
            }
            Self::Internal(err) => {
                error!(error = ?err, "internal server error");
                if development() {
                    body["error"] = json!(format!("{err:#}"));
                }
            }
            _ => {}
        }
        (status, Json(body)).into_response()
    }
}

fn development() -> bool {
    std::env::var("APP_ENV").map(|v| v == "development").unwrap_or(false)
}
