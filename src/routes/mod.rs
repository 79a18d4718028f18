pub mod health;
pub mod submit;

use axum::Router;
use axum::routing::{get, post};

use crate::state::SharedState;

pub fn form_routes() -> Router<SharedState> {
    Router::new().route("/submit-form", post(submit::submit_form))
}

pub fn health_routes() -> Router<SharedState> {
    Router::new()
        .route("/health", get(health::live))
        .route("/health/ready", get(health::ready))
}
