//! Composite similarity between two slugs
//!
//! Ingredient identifiers are short multi-word phrases, so a shared whole
//! word counts for more than character-level closeness:
//!
//! `score = 0.6 * jaccard(tokens) + 0.4 * (1 - levenshtein / max_len)`

use recipe_domain::IngredientSlug;
use std::collections::HashSet;

pub const TOKEN_WEIGHT: f64 = 0.6;
pub const EDIT_WEIGHT: f64 = 0.4;

/// Jaccard similarity of the two hyphen-split token sets (0 if both are empty).
pub fn token_score(a: &IngredientSlug, b: &IngredientSlug) -> f64 {
    let left: HashSet<&str> = a.tokens().collect();
    let right: HashSet<&str> = b.tokens().collect();
    let union = left.union(&right).count();
    if union == 0 {
        return 0.0;
    }
    let intersection = left.intersection(&right).count();
    intersection as f64 / union as f64
}

/// `1 - levenshtein(a, b) / max(len(a), len(b), 1)` over the full strings.
pub fn edit_score(a: &IngredientSlug, b: &IngredientSlug) -> f64 {
    let distance = strsim::levenshtein(a.as_str(), b.as_str());
    let max_len = a.len().max(b.len()).max(1);
    1.0 - distance as f64 / max_len as f64
}

/// Combined similarity in [0, 1]
pub fn similarity(a: &IngredientSlug, b: &IngredientSlug) -> f64 {
    TOKEN_WEIGHT * token_score(a, b) + EDIT_WEIGHT * edit_score(a, b)
}
