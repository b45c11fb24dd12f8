//! Recipe dataset: title search over the recipe CSV.

use std::path::Path;
use std::sync::Arc;

use csv::ReaderBuilder;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::models::recipe::RawRecipeRow;

const TITLE_COL: &str = "Title";
const INGREDIENTS_COL: &str = "Ingredients";
const INSTRUCTIONS_COL: &str = "Instructions";

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("Recipe dataset not available")]
    Unavailable,

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Column '{0}' not found")]
    MissingColumn(&'static str),
}

/// Anything that can find recipes for a free-text preference.
pub trait RecipeSource: Send + Sync {
    fn find_by_preference(&self, preference: &str) -> Result<Vec<RawRecipeRow>, DatasetError>;
}

/// Recipes loaded once at startup and held in memory.
#[derive(Debug, Default)]
pub struct CsvRecipeDataset {
    rows: Vec<RawRecipeRow>,
}

impl CsvRecipeDataset {
    pub fn load(path: &Path) -> Result<Self, DatasetError> {
        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_path(path)?;

        let headers = rdr.headers()?.clone();
        let column = |name: &'static str| {
            headers
                .iter()
                .position(|h| h.trim() == name)
                .ok_or(DatasetError::MissingColumn(name))
        };
        let title_idx = column(TITLE_COL)?;
        let ingredients_idx = column(INGREDIENTS_COL)?;
        let instructions_idx = column(INSTRUCTIONS_COL)?;

        let mut rows = Vec::new();
        for (index, result) in rdr.records().enumerate() {
            let record = match result {
                Ok(record) => record,
                Err(e) => {
                    warn!("Skipping unreadable recipe record {}: {e}", index + 1);
                    continue;
                }
            };
            let title = record.get(title_idx).unwrap_or("").trim();
            if title.is_empty() {
                continue;
            }
            rows.push(RawRecipeRow {
                title: title.to_string(),
                ingredients_text: record.get(ingredients_idx).unwrap_or("").to_string(),
                instructions_text: record.get(instructions_idx).unwrap_or("").to_string(),
            });
        }

        Ok(Self { rows })
    }

    #[cfg(test)]
    pub fn from_rows(rows: Vec<RawRecipeRow>) -> Self {
        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }
}

impl RecipeSource for CsvRecipeDataset {
    /// Case-insensitive substring match of the preference against titles.
    fn find_by_preference(&self, preference: &str) -> Result<Vec<RawRecipeRow>, DatasetError> {
        let needle = preference.trim().to_lowercase();
        if needle.is_empty() {
            return Ok(Vec::new());
        }

        Ok(self
            .rows
            .iter()
            .filter(|row| row.title.to_lowercase().contains(&needle))
            .cloned()
            .collect())
    }
}

/// Stands in for a dataset that failed to load. Every lookup reports it.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnavailableDataset;

impl RecipeSource for UnavailableDataset {
    fn find_by_preference(&self, _preference: &str) -> Result<Vec<RawRecipeRow>, DatasetError> {
        Err(DatasetError::Unavailable)
    }
}

/// Loads the dataset, or logs the failure and returns a source that always
/// reports itself unavailable so requests fall over to model generation.
pub fn load_recipe_source(path: &Path) -> Arc<dyn RecipeSource> {
    match CsvRecipeDataset::load(path) {
        Ok(dataset) => {
            info!("Successfully loaded {} recipes from {:?}", dataset.len(), path);
            Arc::new(dataset)
        }
        Err(e) => {
            error!("Failed to load recipe dataset from {:?}: {e}", path);
            Arc::new(UnavailableDataset)
        }
    }
}
