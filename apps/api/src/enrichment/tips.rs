//! Nutrition tips derived from lookup results, plus the fixed general tips
//! and equipment every recipe gets.

use crate::enrichment::nutrition::NutritionRecord;

pub const GENERAL_TIPS: [&str; 2] = [
    "Read through the entire recipe before starting",
    "Prep all ingredients before cooking for best results",
];

pub const STANDARD_EQUIPMENT: [&str; 4] = [
    "Basic kitchen equipment needed for cooking",
    "Measuring cups and spoons",
    "Mixing bowls",
    "Cooking utensils",
];

/// Only the first few ingredients contribute nutrition tips.
pub const TIP_INGREDIENT_LIMIT: usize = 3;
pub const MAX_NUTRITION_TIPS: usize = 3;

/// Scans nutrients in reported order. For each nutrient the first matching rule
/// wins; at most `MAX_NUTRITION_TIPS` tips come back across all records.
pub fn nutrition_tips<'a, I>(records: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a NutritionRecord>,
{
    let mut tips = Vec::new();

    for record in records.into_iter().filter(|r| r.matched) {
        for nutrient in &record.nutrients {
            if tips.len() >= MAX_NUTRITION_TIPS {
                return tips;
            }
            let name = nutrient.name.to_lowercase();
            let value = nutrient.value;

            if name.contains("protein") && value > 5.0 {
                tips.push(format!("Good source of protein ({value:.1}g per serving)"));
            } else if name.contains("fiber") && value > 3.0 {
                tips.push(format!("High in fiber ({value:.1}g per serving)"));
            } else if name.contains("vitamin") && value > 10.0 {
                tips.push(format!("Contains {}", nutrient.name));
            }
        }
    }

    tips
}

/// General tips first, then nutrition tips, then any extra tips.
pub fn assemble_tips(nutrition: Vec<String>, extra: Vec<String>) -> Vec<String> {
    GENERAL_TIPS
        .iter()
        .map(|t| t.to_string())
        .chain(nutrition)
        .chain(extra.into_iter().filter(|t| !t.trim().is_empty()))
        .collect()
}

pub fn standard_equipment() -> Vec<String> {
    STANDARD_EQUIPMENT.iter().map(|e| e.to_string()).collect()
}
