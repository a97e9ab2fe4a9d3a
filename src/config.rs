//! Runtime configuration.
//!
//! Every knob is a CLI flag with an environment variable fallback.

use std::time::Duration;

use clap::{Parser, ValueEnum};

use crate::provider::workers_ai::WORKERS_AI_DEFAULT_URL;

pub const DEFAULT_STORY_PROMPT: &str = "Once upon a time, there was a little llama named Llama-2-13b";
pub const DEFAULT_IMAGE_PROMPT: &str = "cyberpunk cat";
pub const DEFAULT_SYSTEM_PREAMBLE: &str = "Tell a story for good night";
pub const DEFAULT_TEXT_MODEL: &str = "@hf/thebloke/llama-2-13b-chat-awq";
pub const DEFAULT_IMAGE_MODEL: &str = "@cf/bytedance/stable-diffusion-xl-lightning";
pub const DEFAULT_LISTEN: &str = "0.0.0.0:8080";
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;
pub const DEFAULT_MAX_BODY_BYTES: usize = 64 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Backend {
    /// Cloudflare Workers AI REST API.
    WorkersAi,
    /// Canned responses, no network.
    Mock,
}

/// Command-line arguments.
#[derive(Parser, Debug, Clone)]
#[command(name = "story-relay", about = "Streams hosted AI stories and images to the browser")]
pub struct Cli {
    /// HTTP listen address.
    #[arg(long, env = "STORY_RELAY_LISTEN", default_value = DEFAULT_LISTEN)]
    pub listen: String,

    /// Inference backend.
    #[arg(long, env = "STORY_RELAY_BACKEND", value_enum, default_value_t = Backend::WorkersAi)]
    pub backend: Backend,

    /// Cloudflare account id (workers-ai backend).
    #[arg(long, env = "CLOUDFLARE_ACCOUNT_ID")]
    pub account_id: Option<String>,

    /// Cloudflare API token (workers-ai backend).
    #[arg(long, env = "CLOUDFLARE_API_TOKEN", hide_env_values = true)]
    pub api_token: Option<String>,

    /// Workers AI API base URL.
    #[arg(long, env = "WORKERS_AI_URL", default_value = WORKERS_AI_DEFAULT_URL)]
    pub base_url: String,

    #[arg(long, env = "STORY_TEXT_MODEL", default_value = DEFAULT_TEXT_MODEL)]
    pub text_model: String,

    #[arg(long, env = "STORY_IMAGE_MODEL", default_value = DEFAULT_IMAGE_MODEL)]
    pub image_model: String,

    /// System instruction sent ahead of every story prompt.
    #[arg(long, env = "STORY_SYSTEM_PREAMBLE", default_value = DEFAULT_SYSTEM_PREAMBLE)]
    pub system_preamble: String,

    /// Prompt used when a story request carries none.
    #[arg(long, env = "STORY_FALLBACK_PROMPT", default_value = DEFAULT_STORY_PROMPT)]
    pub story_fallback: String,

    /// Prompt used when an image request carries none.
    #[arg(long, env = "STORY_IMAGE_FALLBACK_PROMPT", default_value = DEFAULT_IMAGE_PROMPT)]
    pub image_fallback: String,

    /// Deadline for the upstream call to start responding.
    #[arg(long, env = "STORY_RELAY_TIMEOUT_SECS", default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub request_timeout_secs: u64,

    /// Largest accepted JSON request body.
    #[arg(long, env = "STORY_RELAY_MAX_BODY_BYTES", default_value_t = DEFAULT_MAX_BODY_BYTES)]
    pub max_body_bytes: usize,

    /// Enable verbose logging.
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    pub fn server_config(&self) -> ServerConfig {
        ServerConfig {
            listen: self.listen.clone(),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            max_body_bytes: self.max_body_bytes,
        }
    }

    pub fn relay_settings(&self) -> RelaySettings {
        RelaySettings {
            text_model: self.text_model.clone(),
            image_model: self.image_model.clone(),
            system_preamble: Some(self.system_preamble.clone()).filter(|s| !s.is_empty()),
            story_fallback: self.story_fallback.clone(),
            image_fallback: self.image_fallback.clone(),
        }
    }

    /// Credentials for the workers-ai backend, or an error naming what is missing.
    pub fn workers_ai_credentials(&self) -> anyhow::Result<(String, String)> {
        let account_id = self
            .account_id
            .clone()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| anyhow::anyhow!("CLOUDFLARE_ACCOUNT_ID (or --account-id) is required for the workers-ai backend"))?;
        let api_token = self
            .api_token
            .clone()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| anyhow::anyhow!("CLOUDFLARE_API_TOKEN (or --api-token) is required for the workers-ai backend"))?;

        Ok((account_id, api_token))
    }
}

/// HTTP server settings.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub listen: String,
    pub request_timeout: Duration,
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: DEFAULT_LISTEN.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

/// What the relay sends upstream.
#[derive(Debug, Clone)]
pub struct RelaySettings {
    pub text_model: String,
    pub image_model: String,
    pub system_preamble: Option<String>,
    pub story_fallback: String,
    pub image_fallback: String,
}

impl Default for RelaySettings {
    fn default() -> Self {
        Self {
            text_model: DEFAULT_TEXT_MODEL.to_string(),
            image_model: DEFAULT_IMAGE_MODEL.to_string(),
            system_preamble: Some(DEFAULT_SYSTEM_PREAMBLE.to_string()),
            story_fallback: DEFAULT_STORY_PROMPT.to_string(),
            image_fallback: DEFAULT_IMAGE_PROMPT.to_string(),
        }
    }
}
