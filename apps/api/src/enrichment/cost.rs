//! Cost estimation: a budget signal per recipe and a rough price per ingredient.
//!
//! Matched lookups are weighted by what the match says about the food (branded
//! products cost more, protein-rich foods cost more). Unmatched ingredients fall
//! back to static per-100g reference prices keyed by food-type keywords.

use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt};
use futures::stream::{self, StreamExt};
use serde::Serialize;
use tracing::{debug, warn};

use crate::enrichment::nutrition::{NutritionLookup, NutritionRecord};
use crate::models::recipe::BudgetCategory;

const BRANDED_WEIGHT: f64 = 3.0;
const PROTEIN_WEIGHT: f64 = 2.5;
const MATCHED_WEIGHT: f64 = 1.5;
const DEFAULT_WEIGHT: f64 = 2.0;

const PREMIUM_ABOVE: f64 = 2.5;
const MODERATE_ABOVE: f64 = 1.8;

const DEFAULT_SERVING_GRAMS: f64 = 100.0;

/// Food families with their reference price in USD per 100 g.
const CATEGORY_PRICES: &[(&[&str], f64)] = &[
    (&["vegetable", "carrot", "broccoli", "spinach", "onion", "tomato", "potato"], 2.0),
    (&["fruit", "apple", "banana", "orange", "lemon", "berr"], 2.5),
    (&["meat", "beef", "chicken", "pork", "lamb", "bacon", "turkey"], 5.0),
    (&["fish", "salmon", "tuna", "shrimp", "cod"], 6.0),
    (&["milk", "cheese", "yogurt", "cream"], 1.5),
    (&["rice", "bread", "pasta", "noodle", "oats"], 1.0),
    (&["spice", "herb", "seasoning", "cumin", "paprika", "curry", "cinnamon"], 10.0),
    (&["oil", "butter"], 1.5),
];

/// Pantry staples priced per recipe portion when no match is available.
const STAPLE_PRICES: &[(&str, f64)] = &[
    ("salt", 0.1),
    ("pepper", 0.2),
    ("water", 0.0),
    ("sugar", 0.5),
    ("flour", 0.8),
    ("oil", 1.5),
];

#[derive(Debug, Clone, Serialize)]
pub struct IngredientCost {
    pub item: String,
    pub estimated_price: f64,
}

#[derive(Debug, Clone)]
pub struct CostEstimate {
    pub budget_category: BudgetCategory,
    pub items: Vec<IngredientCost>,
    pub total: f64,
    /// One lookup result per input item, in input order.
    pub records: Vec<NutritionRecord>,
}

pub struct CostEstimator {
    nutrition: Arc<dyn NutritionLookup>,
    concurrency: usize,
}

impl CostEstimator {
    pub fn new(nutrition: Arc<dyn NutritionLookup>, concurrency: usize) -> Self {
        Self {
            nutrition,
            concurrency: concurrency.max(1),
        }
    }

    /// Looks up every item with bounded concurrency. Results keep input order.
    pub async fn lookup_all(&self, items: &[String]) -> Vec<NutritionRecord> {
        let lookups: BoxFuture<'_, Vec<NutritionRecord>> = stream::iter(items)
            .map(|item| self.nutrition.lookup(item))
            .buffered(self.concurrency)
            .collect::<Vec<_>>()
            .boxed();
        lookups.await
    }

    /// Budget category for `items`, together with the per-ingredient prices and
    /// lookup records from the same pass, so callers never look an item up twice.
    pub async fn estimate_budget_category(&self, items: &[String]) -> CostEstimate {
        let records = self.lookup_all(items).await;
        let budget_category = budget_category(&records);

        let items: Vec<IngredientCost> = records
            .iter()
            .map(|r| IngredientCost {
                item: r.ingredient_query.clone(),
                estimated_price: round_cents(estimated_price(r)),
            })
            .collect();
        let total = round_cents(items.iter().map(|c| c.estimated_price).sum());

        debug!(
            "Cost estimate: {:?}, total ${total:.2} over {} items",
            budget_category,
            items.len()
        );

        CostEstimate {
            budget_category,
            items,
            total,
            records,
        }
    }
}

/// Weight of one ingredient. Unmatched items weigh their food family's
/// reference price per 100 g.
pub fn item_weight(record: &NutritionRecord) -> f64 {
    if record.matched {
        if record.is_branded {
            BRANDED_WEIGHT
        } else if record.has_nutrient("Protein") {
            PROTEIN_WEIGHT
        } else {
            MATCHED_WEIGHT
        }
    } else {
        category_price(&record.ingredient_query).unwrap_or(DEFAULT_WEIGHT)
    }
}

/// Averages item weights. No items, or an average that is not a number, is `Moderate`.
pub fn budget_category(records: &[NutritionRecord]) -> BudgetCategory {
    if records.is_empty() {
        return BudgetCategory::Moderate;
    }

    let average = records.iter().map(item_weight).sum::<f64>() / records.len() as f64;
    if !average.is_finite() {
        warn!("Budget average is not finite; defaulting to moderate");
        return BudgetCategory::Moderate;
    }

    if average > PREMIUM_ABOVE {
        BudgetCategory::Premium
    } else if average > MODERATE_ABOVE {
        BudgetCategory::Moderate
    } else {
        BudgetCategory::BudgetFriendly
    }
}

/// Rough USD price of one ingredient portion.
pub fn estimated_price(record: &NutritionRecord) -> f64 {
    if record.matched {
        let described = record
            .description
            .as_deref()
            .unwrap_or(&record.ingredient_query);
        let per_100g = category_price(described).unwrap_or(DEFAULT_WEIGHT);
        let serving = record
            .serving_size
            .filter(|s| s.is_finite() && *s > 0.0)
            .unwrap_or(DEFAULT_SERVING_GRAMS);
        per_100g * serving / DEFAULT_SERVING_GRAMS
    } else {
        staple_price(&record.ingredient_query)
    }
}

fn category_price(text: &str) -> Option<f64> {
    let lower = text.to_lowercase();
    CATEGORY_PRICES
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| lower.contains(k)))
        .map(|(_, price)| *price)
}

fn staple_price(text: &str) -> f64 {
    let lower = text.to_lowercase();
    STAPLE_PRICES
        .iter()
        .find(|(name, _)| lower.contains(name))
        .map(|(_, price)| *price)
        .unwrap_or(DEFAULT_WEIGHT)
}

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
