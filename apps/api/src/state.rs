use std::sync::Arc;

use crate::recipes::recommender::RecipeRecommender;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Owns the dataset, the model client and the enrichment pipeline.
    pub recommender: Arc<RecipeRecommender>,
}
