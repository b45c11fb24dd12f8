use axum::{extract::rejection::JsonRejection, extract::State, Json};
use tracing::debug;

use crate::errors::AppError;
use crate::models::recipe::{EnrichedRecipe, RecipeRequest};
use crate::state::AppState;

/// POST /generate-recipe
/// A body that is not JSON, or has no `preference`, is a validation error.
pub async fn handle_generate_recipe(
    State(state): State<AppState>,
    payload: Result<Json<RecipeRequest>, JsonRejection>,
) -> Result<Json<EnrichedRecipe>, AppError> {
    let Json(req) = payload.map_err(|rejection| {
        debug!("Rejected request body: {}", rejection.body_text());
        AppError::Validation(
            "Please send a JSON body like {\"preference\": \"curry\"}".to_string(),
        )
    })?;

    let recipe = state.recommender.recommend(&req).await?;
    Ok(Json(recipe))
}
