use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;
use tracing::info;

use story_relay::config::{Backend, Cli, ServerConfig};
use story_relay::provider::{InferenceProvider, MockProvider, WorkersAiProvider};
use story_relay::{Relay, build_router};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "story_relay=debug,tower_http=debug"
    } else {
        "story_relay=info,tower_http=info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| filter.into()),
        )
        .init();

    let server = cli.server_config();
    let settings = cli.relay_settings();

    info!(
        backend = ?cli.backend,
        text_model = %settings.text_model,
        image_model = %settings.image_model,
        "story-relay v{}",
        env!("CARGO_PKG_VERSION")
    );

    match cli.backend {
        Backend::WorkersAi => {
            let (account_id, api_token) = cli.workers_ai_credentials()?;
            let provider = WorkersAiProvider::new(cli.base_url.clone(), account_id, api_token);
            serve(Relay::new(provider, settings), &server).await
        }
        Backend::Mock => serve(Relay::new(MockProvider::default(), settings), &server).await,
    }
}

async fn serve<P: InferenceProvider>(relay: Relay<P>, server: &ServerConfig) -> anyhow::Result<()> {
    let app = build_router(Arc::new(relay), server);

    let listener = TcpListener::bind(&server.listen).await?;

    info!("story-relay listening on http://{}", listener.local_addr()?);
    info!("Available endpoints:");
    info!("  - GET  /                - Story and image page");
    info!("  - POST /story           - Streaming story (SSE), JSON {{ userInput }}");
    info!("  - GET  /story?prompt=   - Streaming story (SSE)");
    info!("  - POST /generate-image  - Image generation, JSON {{ prompt }}");

    axum::serve(listener, app).await?;

    Ok(())
}
