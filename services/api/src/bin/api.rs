//! services/api/src/bin/api.rs

use api_lib::{
    adapters::{MockAuthAdapter, MockCatalogAdapter, MockCriteriaAdapter, OpenAiCriteriaAdapter},
    config::Config,
    error::ApiError,
    web::{
        build_router,
        state::{AppState, ClientRegistry},
    },
};
use async_openai::{config::OpenAIConfig, Client};
use interview_prep_core::ports::CriteriaExtractionService;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Initialize Service Adapters ---
    let extractor: Arc<dyn CriteriaExtractionService> = match &config.openai_api_key {
        Some(key) => {
            info!("Using LLM criteria extraction with model {}", config.extraction_model);
            let client = Client::with_config(OpenAIConfig::new().with_api_key(key));
            Arc::new(OpenAiCriteriaAdapter::new(
                client,
                config.extraction_model.clone(),
            ))
        }
        None => {
            info!("OPENAI_API_KEY not set; using mock criteria extraction.");
            Arc::new(MockCriteriaAdapter::new())
        }
    };

    // --- 3. Build the Shared AppState ---
    let app_state = Arc::new(AppState {
        config: config.clone(),
        catalog: Arc::new(MockCatalogAdapter::new()),
        auth: Arc::new(MockAuthAdapter::new(config.auth_delay)),
        extractor,
        clients: ClientRegistry::new(),
    });

    // --- 4. Create the Web Router ---
    let app = build_router(app_state)?;

    // --- 5. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
