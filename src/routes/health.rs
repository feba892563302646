use axum::{http::StatusCode, routing::get, Router};

/// Create a router to serve health checks.
pub fn create_router() -> Router {
    Router::new().route("/health", get(is_alive))
}

/// Simple `is_alive` endpoint that will always return a 200 OK.
/// Used to indicate when the webserver is up and running.
#[tracing::instrument]
async fn is_alive() -> StatusCode {
    tracing::debug!("Service is alive");
    StatusCode::OK
}
