//! Dataset files on disk
//!
//! Every loader parses and then validates; writers emit pretty JSON with a
//! trailing newline and create missing parent directories.

use recipe_domain::{CanonicalIngredients, GroundTruthDataset, PredictionsDataset};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use crate::error::{EvalError, Result};

pub const GROUND_TRUTH_PATH: &str = "data/ground-truth.json";
pub const IMAGES_DIR: &str = "data/recipe-images";
pub const CANONICAL_INGREDIENTS_PATH: &str = "data/canonical-ingredients.json";
pub const PREPARED_PATH: &str = "outputs/prepared.json";
pub const PREDICTIONS_PATH: &str = "outputs/predictions.json";
pub const CANONICALIZED_PREDICTIONS_PATH: &str = "outputs/predictions-canonicalized.json";
pub const CANONICALIZATION_DECISIONS_PATH: &str = "outputs/canonicalization-decisions.json";
pub const NORMALIZED_PREDICTIONS_PATH: &str = "outputs/predictions-normalized.json";
pub const NORMALIZATION_DECISIONS_PATH: &str = "outputs/normalization-decisions.json";
pub const METRICS_PATH: &str = "outputs/metrics.json";
pub const PER_IMAGE_SCORES_PATH: &str = "outputs/per-image-scores.json";

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> EvalError + '_ {
    move |source| EvalError::Io {
        path: path.display().to_string(),
        source,
    }
}

pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = fs::read_to_string(path).map_err(io_error(path))?;
    serde_json::from_str(&content).map_err(|source| EvalError::Json {
        path: path.display().to_string(),
        source,
    })
}

pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_error(parent))?;
    }
    let mut json = serde_json::to_string_pretty(value).map_err(|source| EvalError::Json {
        path: path.display().to_string(),
        source,
    })?;
    json.push('\n');
    fs::write(path, json).map_err(io_error(path))?;
    tracing::debug!(path = %path.display(), "Wrote JSON");
    Ok(())
}

pub fn load_ground_truth(path: &Path) -> Result<GroundTruthDataset> {
    let dataset: GroundTruthDataset = read_json(path)?;
    dataset.validate()?;
    Ok(dataset)
}

pub fn load_predictions(path: &Path) -> Result<PredictionsDataset> {
    let dataset: PredictionsDataset = read_json(path)?;
    dataset.validate()?;
    Ok(dataset)
}

pub fn load_canonical_ingredients(path: &Path) -> Result<CanonicalIngredients> {
    let registry: CanonicalIngredients = read_json(path)?;
    registry.validate()?;
    Ok(registry)
}

/// Image file names in `dir`. A missing directory has none.
pub fn list_image_files(dir: &Path) -> Result<BTreeSet<String>> {
    if !dir.exists() {
        return Ok(BTreeSet::new());
    }

    let mut files = BTreeSet::new();
    for entry in fs::read_dir(dir).map_err(io_error(dir))? {
        let entry = entry.map_err(io_error(dir))?;
        let name = entry.file_name().to_string_lossy().into_owned();
        let is_image = Path::new(&name)
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext));
        if is_image {
            files.insert(name);
        }
    }
    Ok(files)
}

/// Images referenced by `dataset` but absent from `available`, in dataset order
pub fn missing_images(dataset: &GroundTruthDataset, available: &BTreeSet<String>) -> Vec<String> {
    dataset
        .entries
        .iter()
        .flat_map(|entry| entry.images.iter())
        .filter(|image| !available.contains(*image))
        .cloned()
        .collect()
}
