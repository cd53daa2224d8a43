//! Ground-truth and prediction datasets
//!
//! Entries on both sides are keyed by the set of images the recipe was
//! extracted from; [`image_set_key`] turns that list into a lookup key.

use serde::{Deserialize, Serialize};

use crate::error::DatasetError;
use crate::ingredient::KnownIngredient;
use crate::recipe::Recipe;

/// Separator for image-set keys. NUL cannot appear in a file name.
pub const IMAGE_KEY_SEP: char = '\u{0}';

/// Build the lookup key for an ordered list of images.
pub fn image_set_key(images: &[String]) -> String {
    let mut key = String::new();
    for (idx, image) in images.iter().enumerate() {
        if idx > 0 {
            key.push(IMAGE_KEY_SEP);
        }
        key.push_str(image);
    }
    key
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroundTruthEntry {
    pub images: Vec<String>,
    pub expected: Recipe,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub known_ingredients: Option<Vec<KnownIngredient>>,
}

impl GroundTruthEntry {
    pub fn key(&self) -> String {
        image_set_key(&self.images)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroundTruthDataset {
    pub entries: Vec<GroundTruthEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionEntry {
    pub images: Vec<String>,
    pub predicted: Recipe,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub predicted_ingredients: Option<Vec<KnownIngredient>>,
}

impl PredictionEntry {
    pub fn key(&self) -> String {
        image_set_key(&self.images)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionsDataset {
    pub entries: Vec<PredictionEntry>,
}

fn validate_images(entry: usize, images: &[String]) -> Result<(), DatasetError> {
    if images.is_empty() {
        return Err(DatasetError::NoImages { entry });
    }
    if images.iter().any(|i| i.is_empty()) {
        return Err(DatasetError::EmptyImageName { entry });
    }
    Ok(())
}

fn in_entry(entry: usize) -> impl FnOnce(DatasetError) -> DatasetError {
    move |source| DatasetError::InEntry {
        entry,
        source: Box::new(source),
    }
}

impl GroundTruthDataset {
    pub fn validate(&self) -> Result<(), DatasetError> {
        if self.entries.is_empty() {
            return Err(DatasetError::NoEntries);
        }
        for (idx, entry) in self.entries.iter().enumerate() {
            validate_images(idx, &entry.images)?;
            entry.expected.validate().map_err(in_entry(idx))?;
            if let Some(known) = &entry.known_ingredients {
                if let Some(pos) = known.iter().position(|k| k.slug.is_empty()) {
                    return Err(in_entry(idx)(DatasetError::EmptySlug { index: pos }));
                }
            }
        }
        Ok(())
    }
}

impl PredictionsDataset {
    pub fn validate(&self) -> Result<(), DatasetError> {
        if self.entries.is_empty() {
            return Err(DatasetError::NoEntries);
        }
        for (idx, entry) in self.entries.iter().enumerate() {
            validate_images(idx, &entry.images)?;
            entry.predicted.validate().map_err(in_entry(idx))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recipe::fixtures::recipe_with;

    #[test]
    fn test_image_set_key() {
        let images = vec!["a.jpg".to_string(), "b.jpg".to_string()];
        assert_eq!(image_set_key(&images), "a.jpg\u{0}b.jpg");
        assert_eq!(image_set_key(&[]), "");
    }

    #[test]
    fn test_key_is_order_sensitive() {
        let ab = image_set_key(&["a".to_string(), "b".to_string()]);
        let ba = image_set_key(&["b".to_string(), "a".to_string()]);
        assert_ne!(ab, ba);
    }

    #[test]
    fn test_ground_truth_validation() {
        let dataset = GroundTruthDataset {
            entries: vec![GroundTruthEntry {
                images: vec!["a.jpg".to_string()],
                expected: recipe_with(&["garlic"]),
                known_ingredients: None,
            }],
        };
        assert!(dataset.validate().is_ok());

        let empty = GroundTruthDataset { entries: vec![] };
        assert_eq!(empty.validate(), Err(DatasetError::NoEntries));
    }

    #[test]
    fn test_validation_reports_entry_index() {
        let mut bad = recipe_with(&["garlic"]);
        bad.title = "  ".to_string();
        let dataset = PredictionsDataset {
            entries: vec![
                PredictionEntry {
                    images: vec!["a.jpg".to_string()],
                    predicted: recipe_with(&["garlic"]),
                    predicted_ingredients: None,
                },
                PredictionEntry {
                    images: vec!["b.jpg".to_string()],
                    predicted: bad,
                    predicted_ingredients: None,
                },
            ],
        };
        let err = dataset.validate().unwrap_err();
        assert!(matches!(err, DatasetError::InEntry { entry: 1, .. }));
        assert_eq!(err.to_string(), "Entry 1: Field 'title' must not be empty");
    }

    #[test]
    fn test_missing_images_rejected() {
        let dataset = PredictionsDataset {
            entries: vec![PredictionEntry {
                images: vec![],
                predicted: recipe_with(&["garlic"]),
                predicted_ingredients: None,
            }],
        };
        assert_eq!(dataset.validate(), Err(DatasetError::NoImages { entry: 0 }));
    }
}
