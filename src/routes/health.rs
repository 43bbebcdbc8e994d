use axum::{Router, routing};

use crate::core::app_state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", routing::get(index))
        .route("/healthz", routing::get(healthz))
}

async fn index() -> &'static str {
    "Gastro ordering service"
}

async fn healthz() -> &'static str {
    "OK"
}
