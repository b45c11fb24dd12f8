use tracing::warn;

use crate::models::recipe::Difficulty;

const INSTRUCTION_WEIGHT: f64 = 0.6;
const INGREDIENT_WEIGHT: f64 = 0.4;
const HARD_ABOVE: f64 = 15.0;
const MEDIUM_ABOVE: f64 = 8.0;

/// Weighted complexity score: 0.6 per step plus 0.4 per ingredient.
pub fn difficulty_score(instruction_count: usize, ingredient_count: usize) -> f64 {
    instruction_count as f64 * INSTRUCTION_WEIGHT + ingredient_count as f64 * INGREDIENT_WEIGHT
}

pub fn estimate_difficulty(instruction_count: usize, ingredient_count: usize) -> Difficulty {
    let score = difficulty_score(instruction_count, ingredient_count);
    if !score.is_finite() {
        warn!("Difficulty score is not finite; defaulting to medium");
        return Difficulty::Medium;
    }

    if score > HARD_ABOVE {
        Difficulty::Hard
    } else if score > MEDIUM_ABOVE {
        Difficulty::Medium
    } else {
        Difficulty::Easy
    }
}
