//! recipe-eval - ingredient canonicalization and recipe extraction scoring
//!
//! Model-extracted recipes name their ingredients in free text ("garlic
//! clove", "Red Peppers", "tomatoe"). Before they can be scored against
//! ground truth, those identifiers are resolved to slugs from a controlled
//! ontology, with an audit record per decision.
//!
//! ## Pipeline
//! ```text
//! ground truth ─► prepare ─► prepared.json ─┐
//!                                           ├─► normalize (layered) ─┐
//! predictions ──────────────────────────────┤                        ├─► evaluate
//!                                           └─► canonicalize ────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use recipe_eval::canonicalization::{Canonicalizer, OntologyIndex, OntologyTiers};
//! use recipe_eval::config::CanonicalizerConfig;
//!
//! let index = OntologyIndex::from_slugs(["bell-pepper", "garlic", "tomato"]);
//! let canonicalizer = Canonicalizer::new(CanonicalizerConfig::single_tier());
//! let decision = canonicalizer.resolve("Red Peppers", &OntologyTiers::single(&index));
//! assert_eq!(decision.resolved_slug, "bell-pepper");
//! ```

// Error handling
pub mod error;

// Thresholds, presets and rewrite tables
pub mod config;

// Entity resolution engine
pub mod canonicalization;

// F1 / accuracy scoring
pub mod evaluation;

// Dataset files
pub mod io;

pub use canonicalization::{Canonicalizer, OntologyIndex, OntologyTiers, ResolutionDecision};
pub use config::{CanonicalizerConfig, Preset};
pub use error::EvalError;
pub use recipe_domain;
