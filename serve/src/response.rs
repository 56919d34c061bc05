//! Request and response bodies for `POST /research`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

pub(crate) const NO_ANSWER_MESSAGE: &str = "no answer generated";

#[derive(Debug, Deserialize)]
pub(crate) struct ResearchRequest {
    pub(crate) question: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct ResearchResponse {
    pub(crate) answer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) message: Option<&'static str>,
}

impl ResearchResponse {
    /// A blank answer counts as no answer.
    pub(crate) fn from_answer(answer: Option<String>) -> Self {
        match answer.filter(|a| !a.trim().is_empty()) {
            Some(answer) => Self {
                answer: Some(answer),
                message: None,
            },
            None => Self {
                answer: None,
                message: Some(NO_ANSWER_MESSAGE),
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct ErrorBody {
    pub(crate) error: String,
}

/// Status plus `{"error": ...}`.
pub(crate) fn error_response(status: StatusCode, error: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorBody {
            error: error.into(),
        }),
    )
        .into_response()
}
