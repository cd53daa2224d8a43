//! Resolution decision records
//!
//! One `ResolutionDecision` is produced per ingredient identifier. It is the
//! audit trail consumed by debugging tooling: which slug was chosen, by which
//! method, and the ranked candidates behind it.

use recipe_domain::IngredientSlug;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::cmp::Ordering;

/// Which ontology tier a candidate came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchScope {
    Local,
    Global,
}

/// How the resolved slug was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResolutionMethod {
    Exact,
    ExactLocal,
    ExactGlobal,
    Fuzzy,
    FuzzyLocal,
    FuzzyGlobal,
    None,
}

impl ResolutionMethod {
    pub fn exact(scope: Option<MatchScope>) -> Self {
        match scope {
            None => Self::Exact,
            Some(MatchScope::Local) => Self::ExactLocal,
            Some(MatchScope::Global) => Self::ExactGlobal,
        }
    }

    pub fn fuzzy(scope: Option<MatchScope>) -> Self {
        match scope {
            None => Self::Fuzzy,
            Some(MatchScope::Local) => Self::FuzzyLocal,
            Some(MatchScope::Global) => Self::FuzzyGlobal,
        }
    }

    pub fn is_exact(self) -> bool {
        matches!(self, Self::Exact | Self::ExactLocal | Self::ExactGlobal)
    }

    pub fn is_fuzzy(self) -> bool {
        matches!(self, Self::Fuzzy | Self::FuzzyLocal | Self::FuzzyGlobal)
    }

    pub fn is_resolved(self) -> bool {
        self != Self::None
    }
}

/// Why an identifier was left unresolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UnresolvedReason {
    /// Top candidate cleared the threshold but the runner-up was too close
    Ambiguous,
    /// Candidates exist but none cleared its tier's threshold
    BelowThreshold,
    /// Nothing to score against
    NoCandidates,
}

/// A scored hypothesis that an identifier refers to `slug`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateScore {
    pub slug: IngredientSlug,
    pub score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<MatchScope>,
}

impl CandidateScore {
    /// Ranking order: score descending, then slug ascending.
    pub fn rank_cmp(&self, other: &Self) -> Ordering {
        other
            .score
            .total_cmp(&self.score)
            .then_with(|| self.slug.cmp(&other.slug))
    }
}

/// Sort into ranking order and keep the first `limit`. Stable, so equal
/// entries keep their incoming order.
pub(crate) fn rank_candidates(candidates: &mut Vec<CandidateScore>, limit: usize) {
    candidates.sort_by(CandidateScore::rank_cmp);
    candidates.truncate(limit);
}

pub type RankedCandidates = SmallVec<[CandidateScore; 5]>;

/// The audit record for one resolution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolutionDecision {
    /// Identifier exactly as received
    pub original_slug: String,
    /// Normalized form of the original
    pub base_slug: IngredientSlug,
    /// Canonical result, or `base_slug` when unresolved
    pub resolved_slug: IngredientSlug,
    pub method: ResolutionMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<UnresolvedReason>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threshold: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub margin: Option<f64>,
    pub candidates: RankedCandidates,
}

impl ResolutionDecision {
    pub fn is_resolved(&self) -> bool {
        self.method.is_resolved()
    }
}
