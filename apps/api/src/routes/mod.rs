pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::recipes::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health::index_handler))
        .route("/health", get(health::health_handler))
        .route("/generate-recipe", post(handlers::handle_generate_recipe))
        .with_state(state)
}
