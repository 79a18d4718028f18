use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::http::header::CONTENT_TYPE;
use axum::response::{IntoResponse, Response};

use crate::error;
use crate::state::SharedState;
use crate::submission::pipeline;

pub async fn submit_form(
    State(state): State<SharedState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let content_type = headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok());

    match pipeline::run(&state, content_type, body).await {
        Ok(_) => error::success(),
        Err(e) => e.into_response(),
    }
}
