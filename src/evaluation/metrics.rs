//! Recipe extraction metrics
//!
//! Word-level and slug-level F1 plus exact-match accuracies, per entry and
//! aggregated over a ground-truth dataset. Serialized shapes are camelCase
//! to match the rest of the pipeline's JSON.

use recipe_domain::{GroundTruthEntry, PredictionEntry, Recipe, RecipeIngredient};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::hash::Hash;

use crate::error::EvalError;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct F1Scores {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
}

impl F1Scores {
    pub const PERFECT: Self = Self {
        precision: 1.0,
        recall: 1.0,
        f1: 1.0,
    };

    pub const ZERO: Self = Self {
        precision: 0.0,
        recall: 0.0,
        f1: 0.0,
    };

    fn from_counts(true_positives: usize, predicted: usize, expected: usize) -> Self {
        let ratio = |n: usize, d: usize| if d == 0 { 0.0 } else { n as f64 / d as f64 };
        let precision = ratio(true_positives, predicted);
        let recall = ratio(true_positives, expected);
        let f1 = if precision + recall == 0.0 {
            0.0
        } else {
            2.0 * precision * recall / (precision + recall)
        };
        Self {
            precision,
            recall,
            f1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Accuracy {
    pub accuracy: f64,
}

impl Accuracy {
    fn of<T: PartialEq + ?Sized>(predicted: &T, expected: &T) -> Self {
        Self {
            accuracy: if predicted == expected { 1.0 } else { 0.0 },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScalarFieldScores {
    pub title: F1Scores,
    pub description: F1Scores,
    pub cuisine: Accuracy,
    pub servings: Accuracy,
    pub prep_time: Accuracy,
    pub cook_time: Accuracy,
}

impl ScalarFieldScores {
    /// Mean of the six field scores (F1 for text, accuracy otherwise)
    pub fn mean(&self) -> f64 {
        avg([
            self.title.f1,
            self.description.f1,
            self.cuisine.accuracy,
            self.servings.accuracy,
            self.prep_time.accuracy,
            self.cook_time.accuracy,
        ])
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FieldScores {
    pub name: F1Scores,
    pub amount: Accuracy,
    pub unit: Accuracy,
    pub preparation: F1Scores,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngredientParsingScores {
    /// Bag F1 over ingredient slugs
    #[serde(flatten)]
    pub slugs: F1Scores,
    pub field_scores: FieldScores,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryScoreSummary {
    pub overall: f64,
    pub scalar_fields: f64,
    pub ingredient_parsing: f64,
    pub instructions: f64,
}

impl EntryScoreSummary {
    pub const ZERO: Self = Self {
        overall: 0.0,
        scalar_fields: 0.0,
        ingredient_parsing: 0.0,
        instructions: 0.0,
    };
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryScores {
    pub images: Vec<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub missing_prediction: bool,
    pub scores: EntryScoreSummary,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OverallScore {
    pub score: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryMetrics {
    pub scalar_fields: ScalarFieldScores,
    pub ingredient_parsing: IngredientParsingScores,
    pub instructions: F1Scores,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateMetrics {
    pub overall: OverallScore,
    pub by_category: CategoryMetrics,
    pub entry_count: usize,
}

/// Aggregate metrics plus the per-entry breakdown
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub metrics: AggregateMetrics,
    pub per_entry: Vec<EntryScores>,
}

impl Evaluation {
    pub fn missing_count(&self) -> usize {
        self.per_entry.iter().filter(|e| e.missing_prediction).count()
    }
}

// ============================================================================
// Primitives
// ============================================================================

/// Lowercase, replace anything but letters, digits and whitespace with a
/// space, and split on whitespace.
pub fn split_words(text: &str) -> Vec<String> {
    let cleaned: String = text
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c.is_whitespace() {
                c
            } else {
                ' '
            }
        })
        .collect();
    cleaned.split_whitespace().map(str::to_string).collect()
}

pub fn set_f1<T: Eq + Hash>(predicted: &HashSet<T>, expected: &HashSet<T>) -> F1Scores {
    if predicted.is_empty() && expected.is_empty() {
        return F1Scores::PERFECT;
    }
    let true_positives = predicted.intersection(expected).count();
    F1Scores::from_counts(true_positives, predicted.len(), expected.len())
}

/// F1 over multisets: each occurrence matches at most one occurrence on the
/// other side.
pub fn bag_f1<T: Eq + Hash>(predicted: &[T], expected: &[T]) -> F1Scores {
    if predicted.is_empty() && expected.is_empty() {
        return F1Scores::PERFECT;
    }

    fn counts<T: Eq + Hash>(items: &[T]) -> HashMap<&T, usize> {
        let mut counts: HashMap<&T, usize> = HashMap::new();
        for item in items {
            *counts.entry(item).or_default() += 1;
        }
        counts
    }
    let predicted_counts = counts(predicted);
    let expected_counts = counts(expected);

    let true_positives = predicted_counts
        .iter()
        .map(|(item, p)| (*p).min(expected_counts.get(item).copied().unwrap_or(0)))
        .sum();
    F1Scores::from_counts(true_positives, predicted.len(), expected.len())
}

pub fn word_overlap_f1(predicted: &str, expected: &str) -> F1Scores {
    let predicted: HashSet<String> = split_words(predicted).into_iter().collect();
    let expected: HashSet<String> = split_words(expected).into_iter().collect();
    set_f1(&predicted, &expected)
}

/// Arithmetic mean; 0 for no values
fn avg(values: impl IntoIterator<Item = f64>) -> f64 {
    let (sum, count) = values
        .into_iter()
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

/// Component-wise mean; all zeros for no scores
fn avg_f1<'a>(scores: impl IntoIterator<Item = &'a F1Scores> + Clone) -> F1Scores {
    F1Scores {
        precision: avg(scores.clone().into_iter().map(|s| s.precision)),
        recall: avg(scores.clone().into_iter().map(|s| s.recall)),
        f1: avg(scores.into_iter().map(|s| s.f1)),
    }
}

fn avg_accuracy<'a>(accuracies: impl IntoIterator<Item = &'a Accuracy>) -> Accuracy {
    Accuracy {
        accuracy: avg(accuracies.into_iter().map(|a| a.accuracy)),
    }
}

// ============================================================================
// Per-category evaluation
// ============================================================================

pub fn evaluate_scalar_fields(predicted: &Recipe, expected: &Recipe) -> ScalarFieldScores {
    let lowered = |c: &Option<String>| c.as_ref().map(|s| s.to_lowercase());
    ScalarFieldScores {
        title: word_overlap_f1(&predicted.title, &expected.title),
        description: word_overlap_f1(&predicted.description, &expected.description),
        cuisine: Accuracy::of(&lowered(&predicted.cuisine), &lowered(&expected.cuisine)),
        servings: Accuracy::of(&predicted.servings, &expected.servings),
        prep_time: Accuracy::of(&predicted.prep_time, &expected.prep_time),
        cook_time: Accuracy::of(&predicted.cook_time, &expected.cook_time),
    }
}

/// Items grouped by ingredient slug, in recipe order within each slug
fn items_by_slug(recipe: &Recipe) -> BTreeMap<&str, Vec<&RecipeIngredient>> {
    let mut map: BTreeMap<&str, Vec<&RecipeIngredient>> = BTreeMap::new();
    for item in recipe.ingredients() {
        map.entry(item.ingredient.as_str()).or_default().push(item);
    }
    map
}

/// Slug bag F1, then field scores for items whose slug appears on both
/// sides, paired by position within that slug.
pub fn evaluate_ingredient_parsing(predicted: &Recipe, expected: &Recipe) -> IngredientParsingScores {
    let predicted_items = items_by_slug(predicted);
    let expected_items = items_by_slug(expected);

    let predicted_slugs: Vec<&str> = predicted.ingredients().map(|i| i.ingredient.as_str()).collect();
    let expected_slugs: Vec<&str> = expected.ingredients().map(|i| i.ingredient.as_str()).collect();
    let slugs = bag_f1(&predicted_slugs, &expected_slugs);

    let mut names = Vec::new();
    let mut amounts = Vec::new();
    let mut units = Vec::new();
    let mut preparations = Vec::new();

    for (slug, preds) in &predicted_items {
        let Some(exps) = expected_items.get(slug) else {
            continue;
        };
        for (pred, exp) in preds.iter().zip(exps) {
            names.push(F1Scores::PERFECT);
            amounts.push(Accuracy::of(&pred.amount, &exp.amount));
            units.push(Accuracy::of(&pred.unit, &exp.unit));
            preparations.push(word_overlap_f1(
                pred.preparation.as_deref().unwrap_or(""),
                exp.preparation.as_deref().unwrap_or(""),
            ));
        }
    }

    IngredientParsingScores {
        slugs,
        field_scores: FieldScores {
            name: avg_f1(&names),
            amount: avg_accuracy(&amounts),
            unit: avg_accuracy(&units),
            preparation: avg_f1(&preparations),
        },
    }
}

pub fn evaluate_instructions(predicted: &Recipe, expected: &Recipe) -> F1Scores {
    word_overlap_f1(&predicted.instructions.join(" "), &expected.instructions.join(" "))
}

pub fn entry_scores(
    scalar: &ScalarFieldScores,
    ingredients: &IngredientParsingScores,
    instructions: &F1Scores,
) -> EntryScoreSummary {
    let scalar_fields = scalar.mean();
    EntryScoreSummary {
        overall: avg([scalar_fields, ingredients.slugs.f1, instructions.f1]),
        scalar_fields,
        ingredient_parsing: ingredients.slugs.f1,
        instructions: instructions.f1,
    }
}

// ============================================================================
// Aggregation
// ============================================================================

/// Score predictions against ground truth.
///
/// Every ground-truth entry gets a per-entry score. Entries without a
/// prediction score zero there but are left out of the by-category means.
/// Two predictions for the same image set are an error.
pub fn aggregate_metrics(
    predictions: &[PredictionEntry],
    ground_truth: &[GroundTruthEntry],
) -> Result<Evaluation, EvalError> {
    let mut by_key: HashMap<String, &PredictionEntry> = HashMap::with_capacity(predictions.len());
    for prediction in predictions {
        if let Some(existing) = by_key.insert(prediction.key(), prediction) {
            return Err(EvalError::DuplicatePrediction {
                images: prediction.images.join(", "),
                existing_title: existing.predicted.title.clone(),
                duplicate_title: prediction.predicted.title.clone(),
            });
        }
    }

    let mut scalars = Vec::new();
    let mut ingredients = Vec::new();
    let mut instructions = Vec::new();
    let mut per_entry = Vec::with_capacity(ground_truth.len());

    for truth in ground_truth {
        let Some(prediction) = by_key.get(&truth.key()) else {
            per_entry.push(EntryScores {
                images: truth.images.clone(),
                missing_prediction: true,
                scores: EntryScoreSummary::ZERO,
            });
            continue;
        };

        let scalar = evaluate_scalar_fields(&prediction.predicted, &truth.expected);
        let ingredient = evaluate_ingredient_parsing(&prediction.predicted, &truth.expected);
        let instruction = evaluate_instructions(&prediction.predicted, &truth.expected);

        per_entry.push(EntryScores {
            images: prediction.images.clone(),
            missing_prediction: false,
            scores: entry_scores(&scalar, &ingredient, &instruction),
        });
        scalars.push(scalar);
        ingredients.push(ingredient);
        instructions.push(instruction);
    }

    let truth_keys: HashSet<String> = ground_truth.iter().map(GroundTruthEntry::key).collect();
    let unmatched: Vec<&PredictionEntry> = predictions
        .iter()
        .filter(|p| !truth_keys.contains(&p.key()))
        .collect();
    if !unmatched.is_empty() {
        let sample: Vec<String> = unmatched
            .iter()
            .take(3)
            .map(|p| p.images.join(","))
            .collect();
        tracing::warn!(
            count = unmatched.len(),
            sample = %sample.join("; "),
            "Predictions without matching ground truth entries"
        );
    }

    let scalar_fields = ScalarFieldScores {
        title: avg_f1(scalars.iter().map(|s| &s.title)),
        description: avg_f1(scalars.iter().map(|s| &s.description)),
        cuisine: avg_accuracy(scalars.iter().map(|s| &s.cuisine)),
        servings: avg_accuracy(scalars.iter().map(|s| &s.servings)),
        prep_time: avg_accuracy(scalars.iter().map(|s| &s.prep_time)),
        cook_time: avg_accuracy(scalars.iter().map(|s| &s.cook_time)),
    };

    let ingredient_parsing = IngredientParsingScores {
        slugs: avg_f1(ingredients.iter().map(|s| &s.slugs)),
        field_scores: FieldScores {
            name: avg_f1(ingredients.iter().map(|s| &s.field_scores.name)),
            amount: avg_accuracy(ingredients.iter().map(|s| &s.field_scores.amount)),
            unit: avg_accuracy(ingredients.iter().map(|s| &s.field_scores.unit)),
            preparation: avg_f1(ingredients.iter().map(|s| &s.field_scores.preparation)),
        },
    };

    let metrics = AggregateMetrics {
        overall: OverallScore {
            score: avg(per_entry.iter().map(|e| e.scores.overall)),
        },
        by_category: CategoryMetrics {
            scalar_fields,
            ingredient_parsing,
            instructions: avg_f1(&instructions),
        },
        entry_count: ground_truth.len(),
    };

    Ok(Evaluation { metrics, per_entry })
}
