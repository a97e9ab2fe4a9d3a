use async_trait::async_trait;
use futures::TryStreamExt;
use reqwest::header;
use tracing::debug;

use super::{
    ChunkStream, DEFAULT_IMAGE_MIME, ImageParams, ImageResult, InferenceProvider, TextParams,
};
use crate::error::UpstreamInferenceError;

pub const WORKERS_AI_DEFAULT_URL: &str = "https://api.cloudflare.com/client/v4";

/// Workers AI over its REST API: `POST {base}/accounts/{account}/ai/run/{model}`.
#[derive(Debug, Clone)]
pub struct WorkersAiProvider {
    client: reqwest::Client,
    base_url: String,
    account_id: String,
    api_token: String,
}

impl WorkersAiProvider {
    pub fn new(
        base_url: impl Into<String>,
        account_id: impl Into<String>,
        api_token: impl Into<String>,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            account_id: account_id.into(),
            api_token: api_token.into(),
        }
    }

    fn run_url(&self, model: &str) -> String {
        format!(
            "{}/accounts/{}/ai/run/{}",
            self.base_url.trim_end_matches('/'),
            self.account_id,
            model.trim_start_matches('/')
        )
    }

    async fn send<T: serde::Serialize + ?Sized>(
        &self,
        model: &str,
        body: &T,
    ) -> Result<reqwest::Response, UpstreamInferenceError> {
        debug!(model, "calling Workers AI");

        let response = self
            .client
            .post(self.run_url(model))
            .bearer_auth(&self.api_token)
            .json(body)
            .send()
            .await
            .map_err(|e| UpstreamInferenceError::Transport(format!("Workers AI request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response
                .text()
                .await
                .unwrap_or_else(|e| format!("<unreadable body: {}>", e));
            return Err(UpstreamInferenceError::Status { status, message });
        }

        Ok(response)
    }
}

#[async_trait]
impl InferenceProvider for WorkersAiProvider {
    async fn run_text(
        &self,
        model: &str,
        params: TextParams,
    ) -> Result<ChunkStream, UpstreamInferenceError> {
        let response = self.send(model, &params).await?;

        let stream = response
            .bytes_stream()
            .map_err(|e| UpstreamInferenceError::Interrupted(format!("Workers AI read error: {}", e)));

        Ok(Box::pin(stream))
    }

    async fn run_image(
        &self,
        model: &str,
        params: ImageParams,
    ) -> Result<ImageResult, UpstreamInferenceError> {
        let response = self.send(model, &params).await?;

        let mime_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .filter(|v| v.starts_with("image/"))
            .unwrap_or(DEFAULT_IMAGE_MIME)
            .to_string();

        let bytes = response
            .bytes()
            .await
            .map_err(|e| UpstreamInferenceError::Interrupted(format!("Workers AI read error: {}", e)))?;

        Ok(ImageResult { bytes, mime_type })
    }
}
