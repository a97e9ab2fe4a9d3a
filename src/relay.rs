//! Stream relay.
//!
//! Text runs are proxied eagerly: the provider's chunk stream becomes the
//! response body as-is, so each chunk reaches the client as soon as the
//! provider emits it. Image runs are buffered whole before responding since
//! a partial image is of no use.

use axum::{
    body::Body,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use futures::TryStreamExt;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::RelaySettings;
use crate::error::RelayError;
use crate::provider::{ChatMessage, ImageParams, InferenceProvider, TextParams};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InferenceKind {
    Text,
    Image,
}

/// A prompt ready to go upstream. `prompt` is never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InferenceRequest {
    pub kind: InferenceKind,
    pub prompt: String,
    pub system_preamble: Option<String>,
}

impl InferenceRequest {
    pub fn new(kind: InferenceKind, prompt: &str, fallback: &str) -> Self {
        let prompt = if prompt.is_empty() { fallback } else { prompt };

        Self {
            kind,
            prompt: prompt.to_string(),
            system_preamble: None,
        }
    }

    pub fn with_system_preamble(mut self, preamble: Option<String>) -> Self {
        self.system_preamble = preamble;
        self
    }

    pub fn text_params(&self) -> TextParams {
        let mut messages = Vec::with_capacity(2);
        if let Some(preamble) = &self.system_preamble {
            messages.push(ChatMessage::system(preamble.clone()));
        }
        messages.push(ChatMessage::user(self.prompt.clone()));

        TextParams {
            messages,
            stream: true,
        }
    }

    pub fn image_params(&self) -> ImageParams {
        ImageParams {
            prompt: self.prompt.clone(),
        }
    }
}

pub struct Relay<P> {
    provider: P,
    settings: RelaySettings,
}

impl<P: InferenceProvider> Relay<P> {
    pub fn new(provider: P, mut settings: RelaySettings) -> Self {
        let defaults = RelaySettings::default();
        if settings.story_fallback.is_empty() {
            settings.story_fallback = defaults.story_fallback;
        }
        if settings.image_fallback.is_empty() {
            settings.image_fallback = defaults.image_fallback;
        }

        Self { provider, settings }
    }

    /// Build the upstream request for `kind`: fallback prompt, and the
    /// system preamble for text runs.
    pub fn request(&self, kind: InferenceKind, prompt: &str) -> InferenceRequest {
        let fallback = match kind {
            InferenceKind::Text => &self.settings.story_fallback,
            InferenceKind::Image => &self.settings.image_fallback,
        };
        let request = InferenceRequest::new(kind, prompt, fallback);

        match request.kind {
            InferenceKind::Text => request.with_system_preamble(self.settings.system_preamble.clone()),
            InferenceKind::Image => request,
        }
    }

    pub fn story_request(&self, prompt: &str) -> InferenceRequest {
        self.request(InferenceKind::Text, prompt)
    }

    pub fn image_request(&self, prompt: &str) -> InferenceRequest {
        self.request(InferenceKind::Image, prompt)
    }

    /// Open a streaming text run and return a response whose body is that
    /// stream, relayed chunk for chunk.
    pub async fn handle_text_generation(&self, prompt: &str) -> Result<Response, RelayError> {
        let request = self.story_request(prompt);
        let request_id = Uuid::new_v4();
        let model = &self.settings.text_model;

        info!(%request_id, model = %model, "relaying story stream");

        let stream = self
            .provider
            .run_text(model, request.text_params())
            .await?
            .inspect_err(move |e| warn!(%request_id, error = %e, "story stream interrupted"));

        let response = (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, "text/event-stream"),
                (header::CACHE_CONTROL, "no-cache"),
            ],
            Body::from_stream(stream),
        );

        Ok(response.into_response())
    }

    /// Run image generation to completion and return the bytes.
    pub async fn handle_image_generation(&self, prompt: &str) -> Result<Response, RelayError> {
        let request = self.image_request(prompt);
        let request_id = Uuid::new_v4();
        let model = &self.settings.image_model;

        info!(%request_id, model = %model, "relaying image generation");

        let image = self
            .provider
            .run_image(model, request.image_params())
            .await?;

        info!(%request_id, bytes = image.bytes.len(), "image generated");

        let response = (
            StatusCode::OK,
            [(header::CONTENT_TYPE, image.mime_type)],
            image.bytes,
        );

        Ok(response.into_response())
    }
}
