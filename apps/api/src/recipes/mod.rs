// Recipe selection: dataset matches first, model generation as the fallback.
// Whatever is selected goes through the enrichment pipeline before it is returned.

pub mod dataset;
pub mod generator;
pub mod handlers;
pub mod prompts;
pub mod recommender;
