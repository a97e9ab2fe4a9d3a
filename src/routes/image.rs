use axum::{
    extract::{Request, State},
    response::Response,
};

use super::AppState;
use crate::error::RelayError;
use crate::provider::InferenceProvider;
use crate::request::{IMAGE_SHAPES, extract_prompt};

/// `POST /generate-image` with `{ "prompt": ... }`.
pub async fn generate_image<P: InferenceProvider>(
    State(state): State<AppState<P>>,
    request: Request,
) -> Result<Response, RelayError> {
    let prompt = extract_prompt(request, IMAGE_SHAPES, state.max_body_bytes).await?;

    state
        .relay
        .handle_image_generation(prompt.as_deref().unwrap_or_default())
        .await
}
