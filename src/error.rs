use axum::{
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde_json::json;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("No tenant identifier in token or X-Tenant-Id header")]
    MissingTenant,

    #[error("Unknown tenant: {0}")]
    UnknownTenant(String),

    #[error("Account is deactivated")]
    AccountInactive,

    #[error("Account is temporarily locked. Try again later")]
    AccountLocked,

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("An application for this job already exists")]
    DuplicateApplication,

    #[error("The application deadline for this job has passed")]
    DeadlinePassed,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Database error: {0}")]
    Database(sqlx::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Multipart error: {0}")]
    Multipart(#[from] axum::extract::multipart::MultipartError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Stable machine-readable code carried in the response envelope.
    pub fn code(&self) -> &'static str {
        match self {
            Error::Config(_) => "config_error",
            Error::InvalidToken => "invalid_token",
            Error::MissingTenant => "missing_tenant",
            Error::UnknownTenant(_) => "unknown_tenant",
            Error::AccountInactive => "account_inactive",
            Error::AccountLocked => "account_locked",
            Error::InvalidCredentials => "invalid_credentials",
            Error::Forbidden(_) => "forbidden",
            Error::DuplicateApplication => "duplicate_application",
            Error::DeadlinePassed => "deadline_passed",
            Error::NotFound(_) => "not_found",
            Error::BadRequest(_) => "bad_request",
            Error::Validation(_) => "validation_error",
            Error::Database(_) => "database_error",
            Error::Json(_) => "bad_request",
            Error::Multipart(_) => "bad_request",
            Error::Io(_) => "internal_error",
            Error::Reqwest(_) => "upstream_error",
            Error::Anyhow(_) => "internal_error",
            Error::Internal(_) => "internal_error",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::InvalidToken
            | Error::MissingTenant
            | Error::UnknownTenant(_)
            | Error::AccountInactive
            | Error::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Error::AccountLocked => StatusCode::LOCKED,
            Error::Forbidden(_) => StatusCode::FORBIDDEN,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::DeadlinePassed => StatusCode::GONE,
            Error::DuplicateApplication
            | Error::BadRequest(_)
            | Error::Validation(_)
            | Error::Json(_)
            | Error::Multipart(_) => StatusCode::BAD_REQUEST,
            Error::Reqwest(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = ?self, "request failed");
        }
        let body = Json(json!({
            "success": false,
            "message": self.to_string(),
            "error": self.code(),
        }));
        (status, body).into_response()
    }
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => Error::NotFound("Resource not found".to_string()),
            other => Error::Database(other),
        }
    }
}
