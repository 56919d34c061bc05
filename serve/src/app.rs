//! Axum app: shared runner, router, and the research handler.
//!
//! Single route: `POST /research` runs one question through the research graph and
//! answers with the final answer (or why there is none).

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use prism::ResearchRunner;

use crate::response::{error_response, ResearchRequest, ResearchResponse};

/// Shared state for the HTTP server. Each request runs on its own state; only the
/// compiled graph and its clients are shared.
#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) runner: Arc<ResearchRunner>,
}

pub(crate) fn router(state: AppState) -> Router {
    Router::new()
        .route("/research", post(research_handler))
        .with_state(state)
}

async fn research_handler(
    State(state): State<AppState>,
    body: Result<Json<ResearchRequest>, JsonRejection>,
) -> Response {
    let request = match body {
        Ok(Json(request)) => request,
        Err(rejection) => {
            return error_response(StatusCode::BAD_REQUEST, rejection.body_text());
        }
    };
    let question = request.question.trim();
    if question.is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "question must not be empty");
    }

    match state.runner.run(question).await {
        Ok(final_state) => {
            (StatusCode::OK, Json(ResearchResponse::from_answer(final_state.final_answer)))
                .into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, stage = ?e.stage(), "Research run failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}
