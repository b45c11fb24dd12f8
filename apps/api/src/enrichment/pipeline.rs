//! Recipe enrichment: orchestrates the per-recipe flow.
//!
//! Flow: split ingredients → parse each → split instructions →
//!       nutrition lookups (bounded concurrency, order kept) → budget + prices →
//!       difficulty → nutrition tips from the first three ingredients → assemble.
//!
//! Every stage has a safe default, so enrichment itself cannot fail. A request
//! that is dropped mid-way cancels its outstanding lookups and yields nothing.

use std::sync::Arc;

use tracing::{debug, info};

use crate::enrichment::cost::CostEstimator;
use crate::enrichment::difficulty::estimate_difficulty;
use crate::enrichment::ingredient_parser::{parse_ingredients, split_ingredient_list};
use crate::enrichment::nutrition::NutritionLookup;
use crate::enrichment::tips::{
    assemble_tips, nutrition_tips, standard_equipment, TIP_INGREDIENT_LIMIT,
};
use crate::models::recipe::{EnrichedRecipe, ParsedIngredient, RawRecipeRow, RecipeOrigin};

/// A recipe whose content is settled but which has not been enriched yet.
#[derive(Debug, Clone)]
pub struct RecipeDraft {
    pub recipe_name: String,
    pub recommendation_text: String,
    pub ingredients: Vec<ParsedIngredient>,
    pub instructions: Vec<String>,
    /// Tips supplied by the recipe source, appended after the computed ones.
    pub extra_tips: Vec<String>,
    /// Empty means "use the standard equipment list".
    pub equipment: Vec<String>,
    pub source: RecipeOrigin,
}

pub struct RecipeEnrichmentPipeline {
    cost: CostEstimator,
}

impl RecipeEnrichmentPipeline {
    pub fn new(nutrition: Arc<dyn NutritionLookup>, lookup_concurrency: usize) -> Self {
        Self {
            cost: CostEstimator::new(nutrition, lookup_concurrency),
        }
    }

    /// Enriches a dataset row matched for `preference`.
    pub async fn enrich(&self, raw: &RawRecipeRow, preference: &str) -> EnrichedRecipe {
        let fragments = split_ingredient_list(&raw.ingredients_text);

        let draft = RecipeDraft {
            recipe_name: raw.title.trim().to_string(),
            recommendation_text: format!("A delicious {preference} recipe just for you!"),
            ingredients: parse_ingredients(&fragments),
            instructions: split_instructions(&raw.instructions_text),
            extra_tips: Vec::new(),
            equipment: Vec::new(),
            source: RecipeOrigin::Dataset,
        };

        self.enrich_draft(draft).await
    }

    /// Computes budget, price, difficulty, tips and equipment for a settled recipe.
    pub async fn enrich_draft(&self, draft: RecipeDraft) -> EnrichedRecipe {
        let lookup_names: Vec<String> = draft
            .ingredients
            .iter()
            .map(|i| i.lookup_name().to_string())
            .collect();

        let estimate = self.cost.estimate_budget_category(&lookup_names).await;
        debug!("Ingredient prices: {:?}", estimate.items);
        let difficulty = estimate_difficulty(draft.instructions.len(), draft.ingredients.len());

        let nutrition = nutrition_tips(estimate.records.iter().take(TIP_INGREDIENT_LIMIT));
        let tips = assemble_tips(nutrition, draft.extra_tips);

        let equipment = if draft.equipment.is_empty() {
            standard_equipment()
        } else {
            draft.equipment
        };

        info!(
            "Enriched '{}': {} ingredients, {} steps, budget={:?}, difficulty={:?}",
            draft.recipe_name,
            draft.ingredients.len(),
            draft.instructions.len(),
            estimate.budget_category,
            difficulty
        );

        EnrichedRecipe {
            recipe_name: draft.recipe_name,
            recommendation_text: draft.recommendation_text,
            budget_category: estimate.budget_category,
            difficulty,
            estimated_cost: estimate.total,
            ingredients: draft.ingredients,
            instructions: draft.instructions,
            tips,
            equipment,
            source: draft.source,
        }
    }
}

/// Splits instruction text into steps at sentence-ending periods and line breaks.
/// A period only ends a sentence when followed by whitespace or the end of text,
/// so "1.5 cups" stays in one step.
pub fn split_instructions(text: &str) -> Vec<String> {
    let mut steps = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((idx, c)) = chars.next() {
        let boundary = match c {
            '\n' => true,
            '.' => chars.peek().map_or(true, |(_, next)| next.is_whitespace()),
            _ => false,
        };
        if boundary {
            push_step(&mut steps, &text[start..idx]);
            start = idx + c.len_utf8();
        }
    }
    push_step(&mut steps, &text[start..]);

    steps
}

fn push_step(steps: &mut Vec<String>, candidate: &str) {
    let step = candidate.trim().trim_end_matches('.').trim_end();
    if !step.is_empty() {
        steps.push(step.to_string());
    }
}
