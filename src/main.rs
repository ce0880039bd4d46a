use anyhow::Result;
use dotenv::dotenv;
use std::sync::Arc;

use wellness_bridge::config::Config;
use wellness_bridge::services::{GeminiClient, TextGenerator};
use wellness_bridge::WellnessAdvisor;

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables before the logger reads RUST_LOG
    dotenv().ok();
    env_logger::init();

    log::info!("🚀 Starting wellness bridge...");

    let config = Config::from_env()?;

    let gemini: Arc<dyn TextGenerator> =
        Arc::new(GeminiClient::new(config.api_key.clone(), config.endpoint()));
    log::info!("✅ Gemini client initialized with model: {}", config.model);

    let advisor = Arc::new(WellnessAdvisor::new(gemini));

    #[cfg(feature = "http-server")]
    {
        use anyhow::Context;
        use wellness_bridge::api::server::create_api_router;

        let app = create_api_router(advisor.clone(), config.static_dir.as_deref());
        if let Some(dir) = &config.static_dir {
            log::info!("📁 Serving front end from {}", dir);
        }

        let listener = tokio::net::TcpListener::bind(&config.bind_addr)
            .await
            .with_context(|| format!("Failed to bind {}", config.bind_addr))?;
        log::info!("🌐 API server listening on {}", config.bind_addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = tokio::signal::ctrl_c().await;
                log::info!("🛑 Shutting down...");
            })
            .await
            .context("API server failed")?;
    }

    #[cfg(not(feature = "http-server"))]
    {
        let _ = advisor;
        log::warn!("⚠️ Built without the http-server feature; nothing to serve");
    }

    Ok(())
}
