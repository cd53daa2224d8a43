//! Dataset validation errors

use thiserror::Error;

/// Structural problems found while validating recipes and datasets
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DatasetError {
    #[error("Dataset has no entries")]
    NoEntries,

    #[error("Entry {entry} has no images")]
    NoImages { entry: usize },

    #[error("Entry {entry} has an empty image name")]
    EmptyImageName { entry: usize },

    #[error("Field '{field}' must not be empty")]
    EmptyField { field: &'static str },

    #[error("Servings must be a positive integer")]
    InvalidServings,

    #[error("Ingredient group {group} has no items")]
    EmptyGroup { group: usize },

    #[error("Ingredient {item} of group {group} has an empty identifier")]
    EmptyIngredient { group: usize, item: usize },

    #[error("Ingredient {item} of group {group} has a non-positive amount")]
    InvalidAmount { group: usize, item: usize },

    #[error("Ingredient {index} normalizes to an empty slug")]
    EmptySlug { index: usize },

    #[error("Entry {entry}: {source}")]
    InEntry {
        entry: usize,
        #[source]
        source: Box<DatasetError>,
    },
}
