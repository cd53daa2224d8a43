//! Resolution policy
//!
//! Turns one raw identifier into a [`ResolutionDecision`] against one or two
//! ontology tiers. Exact matches are tried on every tier before any fuzzy
//! scoring happens; fuzzy acceptance then walks the tiers in priority order,
//! each with its own threshold.
//!
//! Resolution never fails: anything that cannot be matched comes back as
//! `method: none` with a reason.

use recipe_domain::{EnglishInflector, IngredientSlug, Inflector};
use smallvec::SmallVec;
use std::collections::HashMap;
use std::sync::Arc;

use super::candidates::RewriteRules;
use super::decision::{
    rank_candidates, CandidateScore, MatchScope, RankedCandidates, ResolutionDecision,
    ResolutionMethod, UnresolvedReason,
};
use super::index::OntologyIndex;
use super::similarity::similarity;
use crate::config::CanonicalizerConfig;

/// One ontology to resolve against
#[derive(Debug, Clone, Copy)]
pub struct Tier<'a> {
    /// `None` for single-tier resolution
    pub scope: Option<MatchScope>,
    pub index: &'a OntologyIndex,
}

/// Ontology tiers in priority order
#[derive(Debug, Clone)]
pub struct OntologyTiers<'a> {
    tiers: SmallVec<[Tier<'a>; 2]>,
}

impl<'a> OntologyTiers<'a> {
    pub fn single(index: &'a OntologyIndex) -> Self {
        Self {
            tiers: smallvec::smallvec![Tier { scope: None, index }],
        }
    }

    /// Local tier first, global second
    pub fn layered(local: &'a OntologyIndex, global: &'a OntologyIndex) -> Self {
        Self {
            tiers: smallvec::smallvec![
                Tier {
                    scope: Some(MatchScope::Local),
                    index: local,
                },
                Tier {
                    scope: Some(MatchScope::Global),
                    index: global,
                },
            ],
        }
    }

    /// Layered when a local ontology is given, single-tier otherwise
    pub fn with_local(local: Option<&'a OntologyIndex>, global: &'a OntologyIndex) -> Self {
        match local {
            Some(local) => Self::layered(local, global),
            None => Self::single(global),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Tier<'a>> {
        self.tiers.iter()
    }

    pub fn len(&self) -> usize {
        self.tiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiers.is_empty()
    }
}

/// Fuzzy candidates ranked within one tier
#[derive(Debug, Clone)]
struct TierRanking {
    scope: Option<MatchScope>,
    threshold: f64,
    ranked: Vec<CandidateScore>,
}

/// The ingredient canonicalizer.
///
/// Holds the compiled rewrite rules and thresholds; immutable and shareable
/// across threads once built.
pub struct Canonicalizer {
    config: CanonicalizerConfig,
    rules: RewriteRules,
    inflector: Arc<dyn Inflector>,
}

impl Canonicalizer {
    /// Canonicalizer with the default English morphology
    pub fn new(config: CanonicalizerConfig) -> Self {
        Self::with_inflector(config, Arc::new(EnglishInflector))
    }

    pub fn with_inflector(config: CanonicalizerConfig, inflector: Arc<dyn Inflector>) -> Self {
        let rules = RewriteRules::from_tables(&config.rules);
        Self {
            config,
            rules,
            inflector,
        }
    }

    pub fn config(&self) -> &CanonicalizerConfig {
        &self.config
    }

    /// Rewritten identifiers for `raw`, in the order exact matching tries them
    pub fn candidates(&self, raw: &str) -> Vec<IngredientSlug> {
        self.rules.generate(raw, self.inflector.as_ref())
    }

    /// Fuzzy acceptance threshold for a tier
    pub fn threshold_for(&self, scope: Option<MatchScope>) -> f64 {
        let t = &self.config.thresholds;
        match scope {
            None => t.single,
            Some(MatchScope::Local) => t.local,
            Some(MatchScope::Global) => t.global,
        }
    }

    /// Resolve one raw identifier against the given tiers
    pub fn resolve(&self, raw: &str, tiers: &OntologyTiers<'_>) -> ResolutionDecision {
        let base = IngredientSlug::new(raw);
        let candidates = self.candidates(raw);

        let decision = match self.exact_match(&candidates, tiers) {
            Some((slug, scope)) => exact_decision(raw, base, slug, scope),
            None => {
                let rankings: Vec<TierRanking> = tiers
                    .iter()
                    .map(|tier| TierRanking {
                        scope: tier.scope,
                        threshold: self.threshold_for(tier.scope),
                        ranked: self.score_tier(&candidates, tier),
                    })
                    .collect();
                self.fuzzy_decision(raw, base, &rankings)
            }
        };

        tracing::trace!(
            original = raw,
            resolved = decision.resolved_slug.as_str(),
            method = ?decision.method,
            reason = ?decision.reason,
            score = ?decision.score,
            "Resolved ingredient"
        );
        decision
    }

    /// First candidate present in a tier, tiers in priority order
    fn exact_match(
        &self,
        candidates: &[IngredientSlug],
        tiers: &OntologyTiers<'_>,
    ) -> Option<(IngredientSlug, Option<MatchScope>)> {
        tiers.iter().find_map(|tier| {
            candidates
                .iter()
                .find(|c| tier.index.contains(c.as_str()))
                .map(|c| (c.clone(), tier.scope))
        })
    }

    /// Score every candidate against its shortlist in one tier, keep the best
    /// score per ontology slug, and rank.
    fn score_tier(&self, candidates: &[IngredientSlug], tier: &Tier<'_>) -> Vec<CandidateScore> {
        let mut best: HashMap<&IngredientSlug, f64> = HashMap::new();
        for candidate in candidates {
            for slug in tier.index.shortlist(candidate) {
                let score = similarity(candidate, slug);
                best.entry(slug)
                    .and_modify(|s| *s = s.max(score))
                    .or_insert(score);
            }
        }

        let mut scored: Vec<CandidateScore> = best
            .into_iter()
            .map(|(slug, score)| CandidateScore {
                slug: slug.clone(),
                score,
                scope: tier.scope,
            })
            .collect();
        rank_candidates(&mut scored, self.config.max_candidates);
        scored
    }

    fn fuzzy_decision(
        &self,
        raw: &str,
        base: IngredientSlug,
        rankings: &[TierRanking],
    ) -> ResolutionDecision {
        let mut merged: Vec<CandidateScore> = rankings
            .iter()
            .flat_map(|r| r.ranked.iter().cloned())
            .collect();
        rank_candidates(&mut merged, self.config.max_candidates);
        let candidates: RankedCandidates = merged.into_iter().collect();

        for ranking in rankings {
            let Some(best) = ranking.ranked.first() else {
                continue;
            };
            if best.score < ranking.threshold {
                continue;
            }

            let margin = ranking
                .ranked
                .get(1)
                .map(|second| best.score - second.score)
                .unwrap_or(1.0);

            if margin >= self.config.thresholds.margin {
                return ResolutionDecision {
                    original_slug: raw.to_string(),
                    base_slug: base,
                    resolved_slug: best.slug.clone(),
                    method: ResolutionMethod::fuzzy(ranking.scope),
                    reason: None,
                    score: Some(best.score),
                    threshold: Some(ranking.threshold),
                    margin: Some(margin),
                    candidates,
                };
            }

            // A close runner-up on a tier that cleared its threshold ends the
            // search; lower tiers are not consulted.
            return ResolutionDecision {
                original_slug: raw.to_string(),
                resolved_slug: base.clone(),
                base_slug: base,
                method: ResolutionMethod::None,
                reason: Some(UnresolvedReason::Ambiguous),
                score: Some(best.score),
                threshold: Some(ranking.threshold),
                margin: Some(margin),
                candidates,
            };
        }

        let reason = if candidates.is_empty() {
            UnresolvedReason::NoCandidates
        } else {
            UnresolvedReason::BelowThreshold
        };
        let threshold = rankings
            .last()
            .map(|r| r.threshold)
            .unwrap_or(self.config.thresholds.single);

        ResolutionDecision {
            original_slug: raw.to_string(),
            resolved_slug: base.clone(),
            base_slug: base,
            method: ResolutionMethod::None,
            reason: Some(reason),
            score: candidates.first().map(|c| c.score),
            threshold: Some(threshold),
            margin: match candidates.as_slice() {
                [first, second, ..] => Some(first.score - second.score),
                _ => None,
            },
            candidates,
        }
    }
}

fn exact_decision(
    raw: &str,
    base: IngredientSlug,
    slug: IngredientSlug,
    scope: Option<MatchScope>,
) -> ResolutionDecision {
    ResolutionDecision {
        original_slug: raw.to_string(),
        base_slug: base,
        resolved_slug: slug.clone(),
        method: ResolutionMethod::exact(scope),
        reason: None,
        score: Some(1.0),
        threshold: Some(1.0),
        margin: None,
        candidates: smallvec::smallvec![CandidateScore {
            slug,
            score: 1.0,
            scope,
        }],
    }
}

impl Default for Canonicalizer {
    fn default() -> Self {
        Self::new(CanonicalizerConfig::default())
    }
}

impl std::fmt::Debug for Canonicalizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Canonicalizer")
            .field("preset", &self.config.preset)
            .field("thresholds", &self.config.thresholds)
            .finish_non_exhaustive()
    }
}
