//! Error taxonomy for grading requests.
//!
//! Every variant is terminal for the request: nothing is retried and no partial
//! `GradeResult` is ever returned. Validation and eligibility errors carry
//! actionable detail; not-found and internal errors surface a generic message.

use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// Reasons a `hard` mode request is refused before scoring.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EligibilityError {
    #[error("scenario '{scenario_id}' is not eligible for hard mode")]
    NotHardEligible { scenario_id: String },

    #[error("hard mode requires an explanation of at least {min} characters (got {actual})")]
    ExplanationTooShort { min: usize, actual: usize },
}

#[derive(Debug, Error)]
pub enum GradeError {
    /// Malformed request shape or out-of-range value.
    #[error("invalid request: {}", details.join("; "))]
    Validation { details: Vec<String> },

    /// Unknown scenario or missing answer key.
    #[error("not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Eligibility(#[from] EligibilityError),

    /// Unexpected failure inside the pipeline. The message is logged, never returned.
    #[error("internal error: {0}")]
    Internal(String),
}

impl GradeError {
    pub fn validation(detail: impl Into<String>) -> Self {
        GradeError::Validation { details: vec![detail.into()] }
    }

    /// Short machine-readable kind, shared by HTTP and WebSocket replies.
    pub fn kind(&self) -> &'static str {
        match self {
            GradeError::Validation { .. } => "validation",
            GradeError::NotFound(_) => "not_found",
            GradeError::Eligibility(_) => "eligibility",
            GradeError::Internal(_) => "internal",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            GradeError::Validation { .. } => StatusCode::BAD_REQUEST,
            GradeError::NotFound(_) => StatusCode::NOT_FOUND,
            GradeError::Eligibility(_) => StatusCode::UNPROCESSABLE_ENTITY,
            GradeError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Body served to clients. Internal state never leaks through here.
    pub fn to_body(&self) -> ErrorOut {
        match self {
            GradeError::Validation { details } => ErrorOut {
                error: self.kind(),
                message: "Request failed validation.".into(),
                details: details.clone(),
            },
            GradeError::NotFound(_) => ErrorOut {
                error: self.kind(),
                message: "Requested resource was not found.".into(),
                details: vec![],
            },
            GradeError::Eligibility(e) => ErrorOut {
                error: self.kind(),
                message: e.to_string(),
                details: vec![],
            },
            GradeError::Internal(_) => ErrorOut {
                error: self.kind(),
                message: "Grading failed. Please try again later.".into(),
                details: vec![],
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorOut {
    pub error: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<String>,
}

impl IntoResponse for GradeError {
    fn into_response(self) -> axum::response::Response {
        if let GradeError::Internal(detail) = &self {
            error!(target: "grading", %detail, "Internal grading failure");
        }
        (self.status(), Json(self.to_body())).into_response()
    }
}
