//! Scripted in-process provider.
//!
//! Serves canned chunks and image bytes without touching the network. The
//! binary uses it for `--backend mock`; tests use it to observe exactly what
//! the relay sent upstream and how far the chunk stream was pulled.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_stream::stream;
use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::Mutex;

use super::{
    ChunkStream, DEFAULT_IMAGE_MIME, ImageParams, ImageResult, InferenceProvider, TextParams,
};
use crate::error::UpstreamInferenceError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedCall {
    Text { model: String, params: TextParams },
    Image { model: String, params: ImageParams },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Behavior {
    #[default]
    Succeed,
    Fail,
    Stall,
    /// Open the stream, then break it after this many chunks.
    FailAfter(usize),
}

#[derive(Debug, Clone)]
pub struct MockProvider {
    chunks: Vec<Bytes>,
    image: Bytes,
    behavior: Behavior,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
    reads: Arc<AtomicUsize>,
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new(
            [
                "data: {\"response\":\"Once\"}\n\n",
                "data: {\"response\":\" upon\"}\n\n",
                "data: {\"response\":\" a time.\"}\n\n",
                "data: [DONE]\n\n",
            ],
            Bytes::from_static(b"\x89PNG\r\n\x1a\n"),
        )
    }
}

impl MockProvider {
    pub fn new<I, C>(chunks: I, image: impl Into<Bytes>) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Bytes>,
    {
        Self {
            chunks: chunks.into_iter().map(Into::into).collect(),
            image: image.into(),
            behavior: Behavior::Succeed,
            calls: Arc::new(Mutex::new(Vec::new())),
            reads: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Every call is rejected with a 500 status.
    pub fn failing(mut self) -> Self {
        self.behavior = Behavior::Fail;
        self
    }

    /// Text streams yield `chunks` chunks and then an `Interrupted` error.
    pub fn failing_after(mut self, chunks: usize) -> Self {
        self.behavior = Behavior::FailAfter(chunks);
        self
    }

    /// Every call suspends forever.
    pub fn stalled(mut self) -> Self {
        self.behavior = Behavior::Stall;
        self
    }

    pub async fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().await.clone()
    }

    /// Number of chunks pulled out of text streams so far.
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    async fn begin(&self, call: RecordedCall) -> Result<(), UpstreamInferenceError> {
        self.calls.lock().await.push(call);

        match self.behavior {
            Behavior::Succeed | Behavior::FailAfter(_) => Ok(()),
            Behavior::Fail => Err(UpstreamInferenceError::Status {
                status: 500,
                message: "mock provider failure".to_string(),
            }),
            Behavior::Stall => std::future::pending().await,
        }
    }
}

#[async_trait]
impl InferenceProvider for MockProvider {
    async fn run_text(
        &self,
        model: &str,
        params: TextParams,
    ) -> Result<ChunkStream, UpstreamInferenceError> {
        self.begin(RecordedCall::Text {
            model: model.to_string(),
            params,
        })
        .await?;

        let chunks = self.chunks.clone();
        let reads = self.reads.clone();
        let fail_after = match self.behavior {
            Behavior::FailAfter(k) => Some(k),
            _ => None,
        };

        Ok(Box::pin(stream! {
            for (index, chunk) in chunks.into_iter().enumerate() {
                if fail_after == Some(index) {
                    yield Err::<Bytes, _>(UpstreamInferenceError::Interrupted("mock stream broken".to_string()));
                    return;
                }
                reads.fetch_add(1, Ordering::SeqCst);
                yield Ok::<_, UpstreamInferenceError>(chunk);
            }
        }))
    }

    async fn run_image(
        &self,
        model: &str,
        params: ImageParams,
    ) -> Result<ImageResult, UpstreamInferenceError> {
        self.begin(RecordedCall::Image {
            model: model.to_string(),
            params,
        })
        .await?;

        Ok(ImageResult {
            bytes: self.image.clone(),
            mime_type: DEFAULT_IMAGE_MIME.to_string(),
        })
    }
}
