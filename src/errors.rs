use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use miette::Diagnostic;
use serde_json::json;
use thiserror::Error;

use crate::schemas::ValidationError;

#[derive(Debug, Error, Diagnostic)]
pub enum ChikaError {
    #[error("Property {0} not found")]
    #[diagnostic(code(chika::not_found))]
    NotFound(i32),

    #[error("Validation failed: {0}")]
    #[diagnostic(code(chika::validation))]
    Validation(#[from] ValidationError),

    #[error("Store unavailable: {0}")]
    #[diagnostic(
        code(chika::store_unavailable),
        help("Check that database.url points at a reachable SQLite file")
    )]
    StoreUnavailable(#[from] sea_orm::DbErr),

    #[error("I/O error: {0}")]
    #[diagnostic(code(chika::io))]
    Io(#[from] std::io::Error),

    #[error("Config error: {0}")]
    #[diagnostic(code(chika::config))]
    Config(#[from] config::ConfigError),

    #[error("Serialization error: {0}")]
    #[diagnostic(code(chika::serde))]
    Serde(#[from] serde_json::Error),

    #[error("Import error: {0}")]
    #[diagnostic(
        code(chika::import),
        help("Expected a JSON object with a `sheets` map or a `rows` array of survey rows")
    )]
    Import(String),
}

impl IntoResponse for ChikaError {
    fn into_response(self) -> Response {
        match self {
            ChikaError::NotFound(_) => (
                StatusCode::NOT_FOUND,
                Json(json!({ "detail": "Property not found" })),
            )
                .into_response(),
            ChikaError::Validation(err) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(json!({ "detail": err.errors })),
            )
                .into_response(),
            ChikaError::StoreUnavailable(err) => {
                tracing::error!(error = %err, "database operation failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "detail": "store unavailable", "error": err.to_string() })),
                )
                    .into_response()
            }
            other => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "detail": other.to_string() })),
            )
                .into_response(),
        }
    }
}
