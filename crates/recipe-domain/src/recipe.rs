//! Parsed recipe model
//!
//! The shape extracted by the model and stored as ground truth. Ingredient
//! identifiers are kept as free text here: predictions carry raw model output
//! until canonicalization rewrites them.

use serde::{Deserialize, Serialize};

use crate::error::DatasetError;

/// One ingredient line of a recipe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeIngredient {
    /// Ingredient identifier (raw in predictions, canonical after resolution)
    pub ingredient: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preparation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl RecipeIngredient {
    pub fn new(ingredient: impl Into<String>) -> Self {
        Self {
            ingredient: ingredient.into(),
            amount: None,
            unit: None,
            preparation: None,
            note: None,
        }
    }
}

/// A named (or anonymous) block of ingredient lines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngredientGroup {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub items: Vec<RecipeIngredient>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub title: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cuisine: Option<String>,
    pub servings: u32,
    /// Minutes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prep_time: Option<u32>,
    /// Minutes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cook_time: Option<u32>,
    pub ingredient_groups: Vec<IngredientGroup>,
    pub instructions: Vec<String>,
}

impl Recipe {
    /// Iterate all ingredient lines in group order, then item order.
    pub fn ingredients(&self) -> impl Iterator<Item = &RecipeIngredient> {
        self.ingredient_groups.iter().flat_map(|g| g.items.iter())
    }

    pub fn ingredient_count(&self) -> usize {
        self.ingredient_groups.iter().map(|g| g.items.len()).sum()
    }

    /// Check the structural constraints every stored recipe must meet.
    pub fn validate(&self) -> Result<(), DatasetError> {
        if self.title.trim().is_empty() {
            return Err(DatasetError::EmptyField { field: "title" });
        }
        if self.description.trim().is_empty() {
            return Err(DatasetError::EmptyField {
                field: "description",
            });
        }
        if self.servings == 0 {
            return Err(DatasetError::InvalidServings);
        }
        if self.ingredient_groups.is_empty() {
            return Err(DatasetError::EmptyField {
                field: "ingredientGroups",
            });
        }
        for (group_idx, group) in self.ingredient_groups.iter().enumerate() {
            if group.items.is_empty() {
                return Err(DatasetError::EmptyGroup { group: group_idx });
            }
            for (item_idx, item) in group.items.iter().enumerate() {
                if item.ingredient.trim().is_empty() {
                    return Err(DatasetError::EmptyIngredient {
                        group: group_idx,
                        item: item_idx,
                    });
                }
                if matches!(item.amount, Some(a) if a <= 0.0 || !a.is_finite()) {
                    return Err(DatasetError::InvalidAmount {
                        group: group_idx,
                        item: item_idx,
                    });
                }
            }
        }
        if self.instructions.is_empty() || self.instructions.iter().any(|s| s.trim().is_empty()) {
            return Err(DatasetError::EmptyField {
                field: "instructions",
            });
        }
        Ok(())
    }
}
