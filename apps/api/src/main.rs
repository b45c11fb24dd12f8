mod config;
mod enrichment;
mod errors;
mod llm_client;
mod models;
mod recipes;
mod routes;
mod state;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::enrichment::cache::{CacheStore, ExpiringCache, MemoryCacheStore, RedisCacheStore, SystemClock};
use crate::enrichment::nutrition::{NutritionLookupClient, CACHE_NAMESPACE};
use crate::enrichment::pipeline::RecipeEnrichmentPipeline;
use crate::llm_client::LlmClient;
use crate::recipes::dataset::load_recipe_source;
use crate::recipes::recommender::RecipeRecommender;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Recipe API v{}", env!("CARGO_PKG_VERSION"));

    // Nutrition cache: Redis when configured, process memory otherwise
    let store: Arc<dyn CacheStore> = match &config.redis_url {
        Some(url) => {
            let client = redis::Client::open(url.as_str())?;
            info!("Nutrition cache backed by Redis");
            Arc::new(RedisCacheStore::new(client))
        }
        None => {
            info!("REDIS_URL not set; nutrition cache is in-memory");
            Arc::new(MemoryCacheStore::new())
        }
    };
    let cache = ExpiringCache::new(store, Arc::new(SystemClock), CACHE_NAMESPACE);

    let nutrition = NutritionLookupClient::new(
        &config.usda_api_url,
        config.usda_api_key.clone(),
        Duration::from_secs(config.nutrition_timeout_secs),
        cache,
        chrono::Duration::days(config.nutrition_cache_ttl_days),
    )
    .context("Failed to build nutrition client")?;
    info!(
        "Nutrition client initialized (cache TTL: {} days)",
        config.nutrition_cache_ttl_days
    );

    let llm = LlmClient::new(
        config.anthropic_api_url.clone(),
        config.anthropic_api_key.clone(),
        Duration::from_secs(config.llm_timeout_secs),
    )
    .context("Failed to build LLM client")?;
    info!("LLM client initialized (model: {})", llm_client::MODEL);

    let dataset = load_recipe_source(Path::new(&config.recipe_csv_path));

    let pipeline = RecipeEnrichmentPipeline::new(Arc::new(nutrition), config.lookup_concurrency);
    let recommender = RecipeRecommender::new(dataset, Arc::new(llm), pipeline);

    let state = AppState {
        recommender: Arc::new(recommender),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the web client has a fixed host

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
