//! Outbound inference capability.
//!
//! The relay only sees [`InferenceProvider`]: one call that opens a chunk
//! stream for text and one that returns a whole image.

pub mod mock;
pub mod workers_ai;

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};

use crate::error::UpstreamInferenceError;

pub use mock::MockProvider;
pub use workers_ai::WorkersAiProvider;

/// Provider stream handle. Each item is one opaque chunk, in emission order.
pub type ChunkStream = BoxStream<'static, Result<Bytes, UpstreamInferenceError>>;

pub const DEFAULT_IMAGE_MIME: &str = "image/png";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Parameters for a text generation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextParams {
    pub messages: Vec<ChatMessage>,
    pub stream: bool,
}

/// Parameters for an image generation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageParams {
    pub prompt: String,
}

#[derive(Debug, Clone)]
pub struct ImageResult {
    pub bytes: Bytes,
    pub mime_type: String,
}

#[async_trait]
pub trait InferenceProvider: Send + Sync + 'static {
    /// Start a streaming text run. Resolves once the stream is open; chunks
    /// are pulled only as the returned stream is polled.
    async fn run_text(
        &self,
        model: &str,
        params: TextParams,
    ) -> Result<ChunkStream, UpstreamInferenceError>;

    /// Run image generation to completion.
    async fn run_image(
        &self,
        model: &str,
        params: ImageParams,
    ) -> Result<ImageResult, UpstreamInferenceError>;
}
