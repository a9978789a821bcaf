use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Failures talking to the extraction capability.  These never leave the extractor; they are
/// folded into a default-valued result.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("failed to build http client: {0}")]
    ClientBuild(reqwest::Error),
    #[error("failed to send request to extraction api: {0}")]
    Request(reqwest::Error),
    #[error("extraction api returned {status}: {body}")]
    Api { status: u16, body: String },
    #[error("failed to deserialize extraction api response: {0}")]
    Deserialize(reqwest::Error),
    #[error("extraction api response had no choices")]
    EmptyResponse,
}

/// Failures persisting a call record.  These propagate to the webhook caller.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
    #[error("failed to send request to store: {0}")]
    Request(reqwest::Error),
    #[error("{0}")]
    Rejected(String),
}

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("{0} not set")]
    Missing(&'static str),
    #[error("invalid value for {var}: '{value}'")]
    Invalid { var: &'static str, value: String },
    #[error("no store configured; set DATABASE_URL or SUPABASE_URL and SUPABASE_SERVICE_ROLE_KEY")]
    NoStore,
}

/// Errors surfaced by the webhook handler as an HTTP response.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Bad request")]
    BadRequest,
    #[error("{0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::BadRequest => (StatusCode::BAD_REQUEST, self.to_string()).into_response(),
            AppError::Internal(message) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": message })),
            )
                .into_response(),
        }
    }
}
