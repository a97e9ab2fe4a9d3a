use axum::{
    extract::{Request, State},
    response::Response,
};

use super::AppState;
use crate::error::RelayError;
use crate::provider::InferenceProvider;
use crate::request::{STORY_SHAPES, extract_prompt};

/// `POST /story` with `{ "userInput": ... }`, or `GET /story?prompt=...`.
pub async fn generate_story<P: InferenceProvider>(
    State(state): State<AppState<P>>,
    request: Request,
) -> Result<Response, RelayError> {
    let prompt = extract_prompt(request, STORY_SHAPES, state.max_body_bytes).await?;

    state
        .relay
        .handle_text_generation(prompt.as_deref().unwrap_or_default())
        .await
}
