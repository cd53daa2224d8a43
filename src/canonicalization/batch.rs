//! Batch application over recipes and prediction datasets
//!
//! Rewrites every ingredient identifier of a recipe to its resolved slug and
//! keeps the decisions, in group order then item order, for the audit log.

use chrono::{DateTime, Utc};
use rayon::prelude::*;
use recipe_domain::{PredictionEntry, PredictionsDataset, Recipe};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::decision::ResolutionDecision;
use super::resolver::{Canonicalizer, OntologyTiers};

/// A rewritten recipe and the decision behind each of its ingredients
#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalizedRecipe {
    pub recipe: Recipe,
    pub decisions: Vec<ResolutionDecision>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalizedEntry {
    pub entry: PredictionEntry,
    pub decisions: Vec<ResolutionDecision>,
}

/// Decisions for one prediction entry, as written to the decisions log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryDecisions {
    pub images: Vec<String>,
    pub decisions: Vec<ResolutionDecision>,
}

/// On-disk audit log for a canonicalization run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionLog {
    pub generated_at: DateTime<Utc>,
    pub entries: Vec<EntryDecisions>,
}

impl DecisionLog {
    pub fn new(entries: Vec<EntryDecisions>) -> Self {
        Self {
            generated_at: Utc::now(),
            entries,
        }
    }

    /// Decisions across all entries
    pub fn decisions(&self) -> impl Iterator<Item = &ResolutionDecision> {
        self.entries.iter().flat_map(|e| e.decisions.iter())
    }
}

/// Counts by outcome, for run summaries
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecisionSummary {
    pub total: usize,
    pub exact: usize,
    pub fuzzy: usize,
    pub unresolved: usize,
}

impl DecisionSummary {
    pub fn from_decisions<'a>(decisions: impl IntoIterator<Item = &'a ResolutionDecision>) -> Self {
        let mut summary = Self::default();
        for decision in decisions {
            summary.total += 1;
            if decision.method.is_exact() {
                summary.exact += 1;
            } else if decision.method.is_fuzzy() {
                summary.fuzzy += 1;
            } else {
                summary.unresolved += 1;
            }
        }
        summary
    }
}

/// Normalize a predicted cuisine label.
///
/// Trims; blank becomes `None`. Allow-listed compound cuisines (`tex-mex`)
/// pass through as written. Anything else keeps the text before its first
/// hyphen (`French-Style` → `French`).
pub fn normalize_cuisine_label(
    cuisine: Option<&str>,
    compound_cuisines: &BTreeSet<String>,
) -> Option<String> {
    let trimmed = cuisine?.trim();
    if trimmed.is_empty() {
        return None;
    }
    if compound_cuisines
        .iter()
        .any(|c| c.eq_ignore_ascii_case(trimmed))
    {
        return Some(trimmed.to_string());
    }

    let first_segment = trimmed.split('-').next().unwrap_or_default().trim();
    if first_segment.is_empty() {
        None
    } else {
        Some(first_segment.to_string())
    }
}

impl Canonicalizer {
    /// Resolve every ingredient of `recipe`. The input is left untouched.
    pub fn canonicalize_recipe(&self, recipe: &Recipe, tiers: &OntologyTiers<'_>) -> CanonicalizedRecipe {
        let mut rewritten = recipe.clone();
        let mut decisions = Vec::with_capacity(recipe.ingredient_count());

        for item in rewritten
            .ingredient_groups
            .iter_mut()
            .flat_map(|group| group.items.iter_mut())
        {
            let decision = self.resolve(&item.ingredient, tiers);
            item.ingredient = decision.resolved_slug.as_str().to_string();
            decisions.push(decision);
        }

        CanonicalizedRecipe {
            recipe: rewritten,
            decisions,
        }
    }

    /// Canonicalize a prediction's ingredients and normalize its cuisine label
    pub fn canonicalize_prediction(
        &self,
        entry: &PredictionEntry,
        tiers: &OntologyTiers<'_>,
    ) -> CanonicalizedEntry {
        let CanonicalizedRecipe {
            mut recipe,
            decisions,
        } = self.canonicalize_recipe(&entry.predicted, tiers);
        recipe.cuisine =
            normalize_cuisine_label(recipe.cuisine.as_deref(), &self.config().compound_cuisines);

        CanonicalizedEntry {
            entry: PredictionEntry {
                images: entry.images.clone(),
                predicted: recipe,
                predicted_ingredients: entry.predicted_ingredients.clone(),
            },
            decisions,
        }
    }

    /// Canonicalize a whole predictions dataset in parallel. `tiers_for`
    /// picks the ontology tiers for each entry. Entry order is preserved.
    pub fn canonicalize_dataset<'t, F>(
        &self,
        predictions: &PredictionsDataset,
        tiers_for: F,
    ) -> (PredictionsDataset, DecisionLog)
    where
        F: Fn(&PredictionEntry) -> OntologyTiers<'t> + Sync,
    {
        let results: Vec<CanonicalizedEntry> = predictions
            .entries
            .par_iter()
            .map(|entry| self.canonicalize_prediction(entry, &tiers_for(entry)))
            .collect();

        let mut entries = Vec::with_capacity(results.len());
        let mut log_entries = Vec::with_capacity(results.len());
        for CanonicalizedEntry { entry, decisions } in results {
            log_entries.push(EntryDecisions {
                images: entry.images.clone(),
                decisions,
            });
            entries.push(entry);
        }

        let log = DecisionLog::new(log_entries);
        let summary = DecisionSummary::from_decisions(log.decisions());
        tracing::info!(
            entries = entries.len(),
            decisions = summary.total,
            exact = summary.exact,
            fuzzy = summary.fuzzy,
            unresolved = summary.unresolved,
            "Canonicalized predictions"
        );

        (PredictionsDataset { entries }, log)
    }
}
