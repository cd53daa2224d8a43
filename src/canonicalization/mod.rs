//! Ingredient canonicalization
//!
//! Resolves noisy, model-generated ingredient identifiers to slugs from a
//! controlled ontology:
//!
//! ```text
//! raw identifier
//!   → candidates    (rule rewrites: fixups, stripping, morphology, aliases)
//!   → exact match   (per tier, local before global)
//!   → fuzzy match   (index shortlist + similarity, threshold and margin)
//!   → ResolutionDecision
//! ```

pub mod batch;
pub mod candidates;
pub mod decision;
pub mod index;
pub mod layered;
pub mod resolver;
pub mod similarity;

pub use batch::{
    normalize_cuisine_label, CanonicalizedEntry, CanonicalizedRecipe, DecisionLog,
    DecisionSummary, EntryDecisions,
};
pub use candidates::RewriteRules;
pub use decision::{
    CandidateScore, MatchScope, RankedCandidates, ResolutionDecision, ResolutionMethod,
    UnresolvedReason,
};
pub use index::{IndexStats, Ontology, OntologyIndex};
pub use layered::LayeredOntologies;
pub use resolver::{Canonicalizer, OntologyTiers, Tier};
pub use similarity::similarity;
