use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::db::StorageError;
use crate::email::DeliveryError;
use crate::submission::ValidationError;
use crate::submission::parser::ParseError;

pub const SUCCESS_MESSAGE: &str = "Form submitted and stored successfully!";

/// Everything that can stop a form submission, one variant per gate.
#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("DB Error: {0}")]
    Storage(#[from] StorageError),
    #[error("Email Error: {0}")]
    Delivery(#[from] DeliveryError),
}

impl SubmitError {
    pub fn status(&self) -> StatusCode {
        match self {
            SubmitError::Parse(_) | SubmitError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            SubmitError::Storage(_) | SubmitError::Delivery(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            SubmitError::Parse(_) => "invalid_request",
            SubmitError::Validation(_) => "validation_failed",
            SubmitError::Storage(e) => e.code(),
            SubmitError::Delivery(e) => e.code(),
        }
    }
}

impl IntoResponse for SubmitError {
    fn into_response(self) -> Response {
        match &self {
            SubmitError::Parse(e) => tracing::debug!("Rejected form body: {e}"),
            SubmitError::Validation(e) => tracing::debug!("Rejected submission: {e}"),
            SubmitError::Storage(e) => tracing::error!(error = %error_chain(e), "Storage error"),
            SubmitError::Delivery(e) => tracing::error!(error = %error_chain(e), "Delivery error"),
        }

        let body = json!({
            "success": false,
            "message": self.to_string(),
            "code": self.code(),
        });
        (self.status(), axum::Json(body)).into_response()
    }
}

pub fn success() -> Response {
    let body = json!({ "success": true, "message": SUCCESS_MESSAGE });
    (StatusCode::OK, axum::Json(body)).into_response()
}

/// Flatten an error and its sources into one line for logs.
fn error_chain(e: &dyn std::error::Error) -> String {
    let mut out = e.to_string();
    let mut current = e.source();
    while let Some(cause) = current {
        out.push_str(": ");
        out.push_str(&cause.to_string());
        current = cause.source();
    }
    out
}
