//! In-memory stand-ins for the nutrition source, shared by enrichment tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::enrichment::nutrition::{Nutrient, NutritionLookup, NutritionRecord};

/// Answers from a fixed table; unknown ingredients are unmatched.
#[derive(Default)]
pub(crate) struct StaticNutrition {
    records: HashMap<String, NutritionRecord>,
    calls: AtomicUsize,
}

impl StaticNutrition {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with(mut self, record: NutritionRecord) -> Self {
        self.records.insert(record.ingredient_query.clone(), record);
        self
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl NutritionLookup for StaticNutrition {
    async fn lookup(&self, ingredient: &str) -> NutritionRecord {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.records
            .get(ingredient)
            .cloned()
            .unwrap_or_else(|| NutritionRecord::unmatched(ingredient))
    }
}

/// Builds a matched record with the given nutrients.
pub(crate) fn matched(query: &str, nutrients: &[(&str, f64)], branded: bool) -> NutritionRecord {
    NutritionRecord {
        ingredient_query: query.to_string(),
        matched: true,
        nutrients: nutrients
            .iter()
            .map(|(name, value)| Nutrient {
                name: name.to_string(),
                value: *value,
            })
            .collect(),
        is_branded: branded,
        description: Some(query.to_string()),
        serving_size: None,
    }
}
