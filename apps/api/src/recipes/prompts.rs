// Prompt constants for recipe generation.
// Reuses cross-cutting fragments from llm_client::prompts.

/// Recipe suggestion prompt. Replace `{preference}` and `{measurement_instruction}` before sending.
pub const RECIPE_PROMPT_TEMPLATE: &str = r#"Based on preference: {preference}
Please suggest ONE recipe that matches this preference.

Return a JSON object with this EXACT schema (no extra fields):
{
  "recipe_name": "Name of the recipe",
  "description": "2-3 sentence description",
  "budget_category": "budget-friendly|moderate|premium",
  "difficulty": "easy|medium|hard"
}

{measurement_instruction}"#;

/// Recipe details prompt. Replace `{recipe_name}` and `{measurement_instruction}` before sending.
pub const DETAILS_PROMPT_TEMPLATE: &str = r#"Generate detailed instructions for: {recipe_name}

Return a JSON object with this EXACT schema (no extra fields):
{
  "ingredients": [
    {"item": "ingredient name", "quantity": "amount", "unit": "measurement"}
  ],
  "instructions": [
    "step 1",
    "step 2"
  ],
  "tips": [
    "tip 1"
  ],
  "equipment": [
    "item 1"
  ]
}

{measurement_instruction}"#;
