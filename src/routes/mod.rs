pub mod image;
pub mod page;
pub mod story;

use std::sync::Arc;

use axum::{
    BoxError, Router,
    error_handling::HandleErrorLayer,
    http::StatusCode,
    routing::any,
};
use tower::ServiceBuilder;
use tower::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;
use crate::error::RelayError;
use crate::provider::InferenceProvider;
use crate::relay::Relay;

pub use image::generate_image;
pub use page::index;
pub use story::generate_story;

pub struct AppState<P> {
    pub relay: Arc<Relay<P>>,
    pub max_body_bytes: usize,
}

// Manual impl: the provider itself need not be Clone.
impl<P> Clone for AppState<P> {
    fn clone(&self) -> Self {
        Self {
            relay: self.relay.clone(),
            max_body_bytes: self.max_body_bytes,
        }
    }
}

pub fn build_router<P: InferenceProvider>(relay: Arc<Relay<P>>, config: &ServerConfig) -> Router {
    let state = AppState {
        relay,
        max_body_bytes: config.max_body_bytes,
    };

    Router::new()
        .route("/", any(index))
        .route("/story", any(generate_story::<P>))
        .route("/generate-image", any(generate_image::<P>))
        .fallback(not_found)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(HandleErrorLayer::new(handle_middleware_error))
                .layer(TimeoutLayer::new(config.request_timeout)),
        )
        .with_state(state)
}

async fn not_found() -> RelayError {
    RelayError::NotFound
}

async fn handle_middleware_error(err: BoxError) -> (StatusCode, String) {
    if err.is::<tower::timeout::error::Elapsed>() {
        tracing::error!("upstream inference timed out");
        (
            StatusCode::GATEWAY_TIMEOUT,
            "Upstream inference timed out.".to_string(),
        )
    } else {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Unhandled internal error: {}", err),
        )
    }
}
