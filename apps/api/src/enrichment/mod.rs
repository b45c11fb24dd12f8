// Ingredient enrichment: parsing, cached nutrition lookups, cost and
// difficulty estimation, and the pipeline that folds them into one recipe.

pub mod cache;
pub mod cost;
pub mod difficulty;
pub mod ingredient_parser;
pub mod nutrition;
pub mod pipeline;
pub mod tips;

#[cfg(test)]
pub(crate) mod test_support;
