use serde::{Deserialize, Serialize};

/// One recipe as it comes out of the dataset. Consumed by a single request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRecipeRow {
    pub title: String,
    pub ingredients_text: String,
    pub instructions_text: String,
}

/// A normalized ingredient line. `item` is never empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedIngredient {
    /// Free-form, e.g. "1/2" or "as needed".
    pub quantity: String,
    #[serde(default)]
    pub unit: String,
    /// Ingredient name, possibly followed by parenthesized preparation notes.
    pub item: String,
}

impl ParsedIngredient {
    /// The ingredient name without trailing preparation notes, used for lookups.
    pub fn lookup_name(&self) -> &str {
        match self.item.find(" (") {
            Some(idx) if self.item.ends_with(')') && idx > 0 => self.item[..idx].trim(),
            _ => self.item.trim(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BudgetCategory {
    BudgetFriendly,
    #[default]
    Moderate,
    Premium,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

/// Where the recommended recipe came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecipeOrigin {
    Dataset,
    Generated,
}

/// The final, fully enriched recommendation returned to the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichedRecipe {
    pub recipe_name: String,
    pub recommendation_text: String,
    pub budget_category: BudgetCategory,
    pub difficulty: Difficulty,
    /// Rough total in USD, summed from per-ingredient estimates.
    pub estimated_cost: f64,
    pub ingredients: Vec<ParsedIngredient>,
    pub instructions: Vec<String>,
    pub tips: Vec<String>,
    pub equipment: Vec<String>,
    pub source: RecipeOrigin,
}

/// Request body for `POST /generate-recipe`.
#[derive(Debug, Clone, Deserialize)]
pub struct RecipeRequest {
    pub preference: String,
    // Accepted and logged, not yet used for filtering.
    #[serde(default)]
    pub dietary_restrictions: Option<Vec<String>>,
    #[serde(default)]
    pub budget_preference: Option<String>,
}
