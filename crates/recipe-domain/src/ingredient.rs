//! Ingredient registry types

use serde::{Deserialize, Serialize};

use crate::error::DatasetError;
use crate::slugs::IngredientSlug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IngredientCategory {
    Protein,
    Vegetable,
    Fruit,
    Herb,
    Dairy,
    Grain,
    Spice,
    Condiment,
    OilFat,
    Liquid,
    Other,
}

/// An entry of the controlled ingredient vocabulary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalIngredient {
    pub slug: IngredientSlug,
    pub name: String,
    pub category: IngredientCategory,
}

/// The canonical ingredient registry file: `{ "ingredients": [...] }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalIngredients {
    pub ingredients: Vec<CanonicalIngredient>,
}

impl CanonicalIngredients {
    pub fn slugs(&self) -> impl Iterator<Item = &IngredientSlug> {
        self.ingredients.iter().map(|i| &i.slug)
    }

    pub fn validate(&self) -> Result<(), DatasetError> {
        if self.ingredients.is_empty() {
            return Err(DatasetError::NoEntries);
        }
        for (idx, ingredient) in self.ingredients.iter().enumerate() {
            if ingredient.slug.is_empty() {
                return Err(DatasetError::EmptySlug { index: idx });
            }
            if ingredient.name.trim().is_empty() {
                return Err(DatasetError::EmptyField { field: "name" });
            }
        }
        Ok(())
    }
}

/// Ingredient annotation attached to a ground-truth or prediction entry.
/// The category is optional here, unlike the registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnownIngredient {
    pub slug: IngredientSlug,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<IngredientCategory>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_parse() {
        let json = r#"{"ingredients": [
            {"slug": "bell-pepper", "name": "Bell pepper", "category": "vegetable"},
            {"slug": "Olive Oil", "name": "Olive oil", "category": "oil-fat"}
        ]}"#;
        let registry: CanonicalIngredients = serde_json::from_str(json).unwrap();
        assert!(registry.validate().is_ok());
        assert_eq!(registry.ingredients[1].category, IngredientCategory::OilFat);
        // Slugs are normalized on the way in
        let slugs: Vec<_> = registry.slugs().map(|s| s.as_str()).collect();
        assert_eq!(slugs, vec!["bell-pepper", "olive-oil"]);
    }

    #[test]
    fn test_registry_rejects_blank_slug() {
        let json = r#"{"ingredients": [{"slug": "***", "name": "Nothing", "category": "other"}]}"#;
        let registry: CanonicalIngredients = serde_json::from_str(json).unwrap();
        assert!(matches!(registry.validate(), Err(DatasetError::EmptySlug { index: 0 })));
    }

    #[test]
    fn test_unknown_category_is_rejected() {
        let json = r#"{"slug": "x", "name": "X", "category": "mineral"}"#;
        assert!(serde_json::from_str::<CanonicalIngredient>(json).is_err());
    }
}
