//! Model-backed recipe generation, used when the dataset has nothing for a preference.
//!
//! Two calls: a short recipe suggestion, then the details for the suggested name.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use crate::enrichment::ingredient_parser::{parse_ingredient, AS_NEEDED};
use crate::llm_client::prompts::{JSON_ONLY_SYSTEM, MEASUREMENT_INSTRUCTION};
use crate::llm_client::{LlmClient, LlmError};
use crate::models::recipe::ParsedIngredient;
use crate::recipes::prompts::{DETAILS_PROMPT_TEMPLATE, RECIPE_PROMPT_TEMPLATE};

/// The model's recipe suggestion.
#[derive(Debug, Clone, Deserialize)]
pub struct ModelRecipe {
    pub recipe_name: String,
    #[serde(default)]
    pub description: String,
    /// The model's own guess; the pipeline recomputes it.
    #[serde(default)]
    pub budget_category: Option<String>,
    /// The model's own guess; the pipeline recomputes it.
    #[serde(default)]
    pub difficulty: Option<String>,
}

/// Models return ingredients either as objects or as plain lines.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ModelIngredient {
    Structured {
        item: String,
        #[serde(default)]
        quantity: Option<Value>,
        #[serde(default)]
        unit: Option<String>,
    },
    Line(String),
}

impl ModelIngredient {
    pub fn into_parsed(self) -> ParsedIngredient {
        match self {
            ModelIngredient::Line(line) => parse_ingredient(&line),
            ModelIngredient::Structured {
                item,
                quantity,
                unit,
            } => {
                let item = item.trim();
                if item.is_empty() {
                    return parse_ingredient(&item_less_line(quantity, unit));
                }
                ParsedIngredient {
                    quantity: quantity_text(quantity),
                    unit: unit.map(|u| u.trim().to_string()).unwrap_or_default(),
                    item: item.to_string(),
                }
            }
        }
    }
}

fn quantity_text(quantity: Option<Value>) -> String {
    let text = match quantity {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    };
    if text.is_empty() {
        AS_NEEDED.to_string()
    } else {
        text
    }
}

fn item_less_line(quantity: Option<Value>, unit: Option<String>) -> String {
    let quantity = match quantity {
        Some(Value::String(s)) => s,
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    };
    format!("{quantity} {}", unit.unwrap_or_default())
}

/// The model's details for a named recipe.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ModelRecipeDetails {
    #[serde(default)]
    pub ingredients: Vec<ModelIngredient>,
    #[serde(default)]
    pub instructions: Vec<String>,
    #[serde(default)]
    pub tips: Vec<String>,
    #[serde(default)]
    pub equipment: Vec<String>,
}

/// The external recipe-generation capability. `LlmClient` is the production
/// implementation; tests swap in fakes.
#[async_trait]
pub trait RecipeGenerator: Send + Sync {
    async fn generate_recipe(&self, preference: &str) -> Result<ModelRecipe, LlmError>;

    async fn generate_details(&self, recipe_name: &str) -> Result<ModelRecipeDetails, LlmError>;
}

#[async_trait]
impl RecipeGenerator for LlmClient {
    async fn generate_recipe(&self, preference: &str) -> Result<ModelRecipe, LlmError> {
        let prompt = RECIPE_PROMPT_TEMPLATE
            .replace("{preference}", preference)
            .replace("{measurement_instruction}", MEASUREMENT_INSTRUCTION);
        self.call_json(&prompt, JSON_ONLY_SYSTEM).await
    }

    async fn generate_details(&self, recipe_name: &str) -> Result<ModelRecipeDetails, LlmError> {
        let prompt = DETAILS_PROMPT_TEMPLATE
            .replace("{recipe_name}", recipe_name)
            .replace("{measurement_instruction}", MEASUREMENT_INSTRUCTION);
        self.call_json(&prompt, JSON_ONLY_SYSTEM).await
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn test_details_accept_mixed_ingredient_shapes() {
        let json = r#"{
            "ingredients": [
                {"item": "basmati rice", "quantity": 2, "unit": "cups"},
                {"item": "salt", "quantity": "", "unit": ""},
                "1 tbsp ghee, melted",
                {"item": "", "quantity": "3", "unit": "cloves"}
            ],
            "instructions": ["Rinse the rice", "Cook"],
            "tips": ["Soak the rice first"]
        }"#;

        let details: ModelRecipeDetails = serde_json::from_str(json).unwrap();
        assert!(details.equipment.is_empty());

        let parsed: Vec<_> = details
            .ingredients
            .into_iter()
            .map(ModelIngredient::into_parsed)
            .collect();

        assert_eq!(parsed[0].quantity, "2");
        assert_eq!(parsed[0].unit, "cups");
        assert_eq!(parsed[0].item, "basmati rice");
        assert_eq!(parsed[1].quantity, "as needed");
        assert_eq!(parsed[2].quantity, "1");
        assert_eq!(parsed[2].unit, "tbsp");
        assert_eq!(parsed[2].item, "ghee (melted)");
        assert!(!parsed[3].item.is_empty());
    }

    #[test]
    fn test_model_recipe_guesses_are_optional() {
        let recipe: ModelRecipe =
            serde_json::from_str(r#"{"recipe_name": "Dal Tadka"}"#).unwrap();
        assert_eq!(recipe.recipe_name, "Dal Tadka");
        assert!(recipe.description.is_empty());
        assert!(recipe.budget_category.is_none());
    }

    #[tokio::test]
    async fn test_llm_client_generates_recipe() {
        let mut server = mockito::Server::new_async().await;
        let text = r#"{"recipe_name": "Chana Masala", "description": "Hearty.", "budget_category": "budget-friendly", "difficulty": "easy"}"#;
        let body = serde_json::json!({
            "content": [{"type": "text", "text": text}],
            "usage": {"input_tokens": 12, "output_tokens": 30}
        });
        server
            .mock("POST", "/v1/messages")
            .match_body(mockito::Matcher::Regex("chickpea".to_string()))
            .with_status(200)
            .with_body(body.to_string())
            .create_async()
            .await;

        let client = LlmClient::new(
            format!("{}/v1/messages", server.url()),
            "key".to_string(),
            Duration::from_secs(5),
        )
        .unwrap();

        let recipe = client.generate_recipe("chickpea").await.unwrap();
        assert_eq!(recipe.recipe_name, "Chana Masala");
        assert_eq!(recipe.description, "Hearty.");
    }
}
