//! Recipe recommendation: picks a recipe for a preference and enriches it.
//!
//! Flow: validate → dataset title search → (random pick among matches) → enrich.
//! No match, or no dataset at all → model suggestion → model details → enrich.

use std::sync::Arc;

use rand::seq::SliceRandom;
use tracing::{debug, info, warn};

use crate::enrichment::pipeline::{RecipeDraft, RecipeEnrichmentPipeline};
use crate::errors::AppError;
use crate::models::recipe::{EnrichedRecipe, RecipeOrigin, RecipeRequest};
use crate::recipes::dataset::RecipeSource;
use crate::recipes::generator::{ModelIngredient, ModelRecipe, ModelRecipeDetails, RecipeGenerator};

pub struct RecipeRecommender {
    dataset: Arc<dyn RecipeSource>,
    generator: Arc<dyn RecipeGenerator>,
    pipeline: RecipeEnrichmentPipeline,
}

impl RecipeRecommender {
    pub fn new(
        dataset: Arc<dyn RecipeSource>,
        generator: Arc<dyn RecipeGenerator>,
        pipeline: RecipeEnrichmentPipeline,
    ) -> Self {
        Self {
            dataset,
            generator,
            pipeline,
        }
    }

    pub async fn recommend(&self, request: &RecipeRequest) -> Result<EnrichedRecipe, AppError> {
        let preference = request.preference.trim();
        if preference.is_empty() {
            return Err(AppError::Validation(
                "Please tell us what you'd like to cook!".to_string(),
            ));
        }

        info!("Finding recipe for preference: {preference}");
        debug!(
            "Unapplied hints: dietary_restrictions={:?} budget_preference={:?}",
            request.dietary_restrictions, request.budget_preference
        );

        match self.dataset.find_by_preference(preference) {
            Ok(matches) => {
                let picked = matches.choose(&mut rand::thread_rng()).cloned();
                if let Some(row) = picked {
                    info!(
                        "Picked '{}' from {} dataset matches",
                        row.title,
                        matches.len()
                    );
                    return Ok(self.pipeline.enrich(&row, preference).await);
                }
                info!("No dataset recipe matches {preference:?}; generating one");
            }
            Err(e) => warn!("Dataset lookup failed ({e}); generating a recipe instead"),
        }

        self.generate(preference).await
    }

    async fn generate(&self, preference: &str) -> Result<EnrichedRecipe, AppError> {
        let recipe = self.generator.generate_recipe(preference).await?;
        if recipe.recipe_name.trim().is_empty() {
            return Err(AppError::Serialization(
                "Model suggested a recipe without a name".to_string(),
            ));
        }
        debug!(
            "Model guesses for '{}': budget={:?} difficulty={:?} (recomputed below)",
            recipe.recipe_name, recipe.budget_category, recipe.difficulty
        );

        let details = self.generator.generate_details(&recipe.recipe_name).await?;
        info!(
            "Generated '{}' with {} ingredients",
            recipe.recipe_name,
            details.ingredients.len()
        );

        Ok(self.pipeline.enrich_draft(draft_from_model(recipe, details)).await)
    }
}

fn draft_from_model(recipe: ModelRecipe, details: ModelRecipeDetails) -> RecipeDraft {
    let recommendation_text = if recipe.description.trim().is_empty() {
        format!("A delicious {} just for you!", recipe.recipe_name.trim())
    } else {
        recipe.description.trim().to_string()
    };

    RecipeDraft {
        recipe_name: recipe.recipe_name.trim().to_string(),
        recommendation_text,
        ingredients: details
            .ingredients
            .into_iter()
            .map(ModelIngredient::into_parsed)
            .collect(),
        instructions: non_blank(details.instructions),
        extra_tips: non_blank(details.tips),
        equipment: non_blank(details.equipment),
        source: RecipeOrigin::Generated,
    }
}

fn non_blank(lines: Vec<String>) -> Vec<String> {
    lines
        .into_iter()
        .map(|l| l.trim().to_string())
        .filter(|l| !l.is_empty())
        .collect()
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::enrichment::test_support::StaticNutrition;
    use crate::enrichment::tips::GENERAL_TIPS;
    use crate::llm_client::LlmError;
    use crate::models::recipe::RawRecipeRow;
    use crate::recipes::dataset::{CsvRecipeDataset, UnavailableDataset};

    pub(crate) enum FakeGenerator {
        Ok,
        Unreachable,
        Garbled,
    }

    pub(crate) struct CountingGenerator {
        pub(crate) mode: FakeGenerator,
        pub(crate) calls: AtomicUsize,
    }

    impl CountingGenerator {
        pub(crate) fn new(mode: FakeGenerator) -> Self {
            Self {
                mode,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl RecipeGenerator for CountingGenerator {
        async fn generate_recipe(&self, preference: &str) -> Result<ModelRecipe, LlmError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.mode {
                FakeGenerator::Ok => Ok(ModelRecipe {
                    recipe_name: format!("Model {preference} Bowl"),
                    description: "Warm and filling.".to_string(),
                    budget_category: Some("premium".to_string()),
                    difficulty: Some("hard".to_string()),
                }),
                FakeGenerator::Unreachable => Err(LlmError::Api {
                    status: 503,
                    message: "overloaded".to_string(),
                }),
                FakeGenerator::Garbled => Err(LlmError::EmptyContent),
            }
        }

        async fn generate_details(&self, _recipe_name: &str) -> Result<ModelRecipeDetails, LlmError> {
            let details = serde_json::json!({
                "ingredients": [
                    {"item": "quinoa", "quantity": "1", "unit": "cup"},
                    "2 cups water",
                    {"item": "salt"}
                ],
                "instructions": ["Rinse quinoa", "Boil water", " ", "Simmer 15 minutes"],
                "tips": ["Fluff with a fork"],
                "equipment": []
            });
            Ok(serde_json::from_value(details).unwrap())
        }
    }

    pub(crate) fn curry_dataset() -> CsvRecipeDataset {
        CsvRecipeDataset::from_rows(vec![
            RawRecipeRow {
                title: "Spicy Chickpea Curry".to_string(),
                ingredients_text: "1 can chickpeas, 2 tbsp curry powder, salt".to_string(),
                instructions_text: "Toast the curry powder. Add chickpeas. Simmer.".to_string(),
            },
            RawRecipeRow {
                title: "Lemon Tart".to_string(),
                ingredients_text: "3 lemons, 1 cup sugar".to_string(),
                instructions_text: "Bake.".to_string(),
            },
        ])
    }

    fn recommender(
        dataset: Arc<dyn RecipeSource>,
        generator: Arc<CountingGenerator>,
    ) -> RecipeRecommender {
        let pipeline = RecipeEnrichmentPipeline::new(Arc::new(StaticNutrition::new()), 4);
        RecipeRecommender::new(dataset, generator, pipeline)
    }

    fn request(preference: &str) -> RecipeRequest {
        RecipeRequest {
            preference: preference.to_string(),
            dietary_restrictions: Some(vec!["vegan".to_string()]),
            budget_preference: None,
        }
    }

    #[tokio::test]
    async fn test_dataset_match_is_enriched() {
        let generator = Arc::new(CountingGenerator::new(FakeGenerator::Ok));
        let recommender = recommender(Arc::new(curry_dataset()), generator.clone());

        let recipe = recommender.recommend(&request("curry")).await.unwrap();

        assert_eq!(recipe.recipe_name, "Spicy Chickpea Curry");
        assert_eq!(recipe.ingredients.len(), 3);
        assert!(recipe.tips.len() >= 2);
        assert_eq!(recipe.tips[0], GENERAL_TIPS[0]);
        assert_eq!(recipe.source, RecipeOrigin::Dataset);
        assert_eq!(generator.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_no_match_falls_back_to_model() {
        let generator = Arc::new(CountingGenerator::new(FakeGenerator::Ok));
        let recommender = recommender(Arc::new(curry_dataset()), generator.clone());

        let recipe = recommender.recommend(&request("quinoa")).await.unwrap();

        assert_eq!(recipe.recipe_name, "Model quinoa Bowl");
        assert_eq!(recipe.recommendation_text, "Warm and filling.");
        assert_eq!(recipe.source, RecipeOrigin::Generated);
        assert_eq!(recipe.ingredients.len(), 3);
        assert_eq!(recipe.ingredients[1].unit, "cups");
        assert_eq!(recipe.instructions.len(), 3);
        // 3 * 0.6 + 3 * 0.4 = 3.0, whatever the model guessed
        assert_eq!(recipe.difficulty, crate::models::recipe::Difficulty::Easy);
        assert_eq!(recipe.tips.last().map(String::as_str), Some("Fluff with a fork"));
        assert_eq!(recipe.equipment.len(), 4, "empty model equipment uses the standard set");
        assert_eq!(generator.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_unavailable_dataset_falls_back_to_model() {
        let generator = Arc::new(CountingGenerator::new(FakeGenerator::Ok));
        let recommender = recommender(Arc::new(UnavailableDataset), generator.clone());

        let recipe = recommender.recommend(&request("curry")).await.unwrap();
        assert_eq!(recipe.source, RecipeOrigin::Generated);
    }

    #[tokio::test]
    async fn test_blank_preference_is_validation_error() {
        let generator = Arc::new(CountingGenerator::new(FakeGenerator::Ok));
        let recommender = recommender(Arc::new(curry_dataset()), generator.clone());

        let err = recommender.recommend(&request("   ")).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(generator.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_model_failures_surface_with_classification() {
        let unreachable = recommender(
            Arc::new(UnavailableDataset),
            Arc::new(CountingGenerator::new(FakeGenerator::Unreachable)),
        );
        assert!(matches!(
            unreachable.recommend(&request("ramen")).await,
            Err(AppError::Llm(_))
        ));

        let garbled = recommender(
            Arc::new(UnavailableDataset),
            Arc::new(CountingGenerator::new(FakeGenerator::Garbled)),
        );
        assert!(matches!(
            garbled.recommend(&request("ramen")).await,
            Err(AppError::Serialization(_))
        ));
    }
}
