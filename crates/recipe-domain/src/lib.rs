//! recipe-domain: shared types for the recipe extraction pipeline
//!
//! This crate holds the pure data model with NO I/O:
//! - Ingredient slugs and the slug normalizer
//! - Recipe, ingredient group and ingredient line types
//! - Canonical ingredient registry types
//! - Ground-truth and prediction datasets, with structural validation
//! - The `Inflector` trait and the default English inflector

pub mod dataset;
pub mod error;
pub mod ingredient;
pub mod pluralization;
pub mod recipe;
pub mod slugs;

pub use dataset::{
    image_set_key, GroundTruthDataset, GroundTruthEntry, PredictionEntry, PredictionsDataset,
};
pub use error::DatasetError;
pub use ingredient::{CanonicalIngredient, CanonicalIngredients, IngredientCategory, KnownIngredient};
pub use pluralization::{EnglishInflector, Inflector};
pub use recipe::{IngredientGroup, Recipe, RecipeIngredient};
pub use slugs::{normalize_slug, IngredientSlug};
