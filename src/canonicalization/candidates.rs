//! Deterministic candidate generation (the "rule" stage)
//!
//! Expands one raw identifier into a short, ordered list of rewritten slugs.
//! Each step adds to an accumulating ordered set, so later steps see the
//! output of earlier ones:
//!
//! 1. normalize (base, always first)
//! 2. token fixups (`clov` → `clove`)
//! 3. two-token reversal (`breast-chicken` → `chicken-breast`)
//! 4. modifier stripping (`fresh`, `dried`, ...)
//! 5. noise stripping (`of`, `slices`, ...)
//! 6. conjunction stripping (`and`, only with more than two tokens)
//! 7. suffix stripping (`parmesan-cheese` → `parmesan`)
//! 8. singular and plural of every variant so far
//! 9. alias targets of every variant so far (one pass, not transitive)
//!
//! Order matters: exact matching takes the first variant found in an ontology.

use recipe_domain::{normalize_slug, IngredientSlug, Inflector};
use std::collections::{HashMap, HashSet};

use crate::config::RuleTables;

const CONJUNCTION: &str = "and";

/// Compiled rewrite tables. Immutable once built.
#[derive(Debug, Clone, Default)]
pub struct RewriteRules {
    token_fixups: HashMap<String, String>,
    modifier_tokens: HashSet<String>,
    noise_tokens: HashSet<String>,
    /// Stored with the leading hyphen (`-cheese`)
    strip_suffixes: Vec<String>,
    aliases: HashMap<IngredientSlug, IngredientSlug>,
}

impl RewriteRules {
    /// Compile rule tables. Every key and value is slug-normalized; entries
    /// that normalize to nothing are dropped.
    pub fn from_tables(tables: &RuleTables) -> Self {
        let token_fixups = tables
            .token_fixups
            .iter()
            .map(|(from, to)| (normalize_slug(from), normalize_slug(to)))
            .filter(|(from, to)| !from.is_empty() && !to.is_empty())
            .collect();

        let token_set = |words: &std::collections::BTreeSet<String>| -> HashSet<String> {
            words
                .iter()
                .map(|w| normalize_slug(w))
                .filter(|w| !w.is_empty())
                .collect()
        };

        let strip_suffixes = tables
            .strip_suffixes
            .iter()
            .map(|s| normalize_slug(s))
            .filter(|s| !s.is_empty())
            .map(|s| format!("-{}", s))
            .collect();

        let aliases = tables
            .aliases
            .iter()
            .map(|(from, to)| (IngredientSlug::new(from), IngredientSlug::new(to)))
            .filter(|(from, to)| !from.is_empty() && !to.is_empty())
            .collect();

        Self {
            token_fixups,
            modifier_tokens: token_set(&tables.modifier_tokens),
            noise_tokens: token_set(&tables.noise_tokens),
            strip_suffixes,
            aliases,
        }
    }

    /// Alias target for an exact slug, if any
    pub fn alias(&self, slug: &str) -> Option<&IngredientSlug> {
        self.aliases.get(slug)
    }

    /// Generate the ordered, duplicate-free, non-empty list of rewritten
    /// identifiers for `raw`. The normalized form comes first whenever it is
    /// non-empty; an empty identifier produces no candidates.
    pub fn generate(&self, raw: &str, inflector: &dyn Inflector) -> Vec<IngredientSlug> {
        let base = IngredientSlug::new(raw);
        let mut out = VariantSet::default();
        out.add(base.clone());

        let fixed: Vec<&str> = base
            .tokens()
            .map(|t| self.token_fixups.get(t).map(String::as_str).unwrap_or(t))
            .collect();
        out.add(IngredientSlug::from_tokens(fixed.iter().copied()));

        if let [first, second] = fixed.as_slice() {
            out.add(IngredientSlug::from_tokens([*second, *first]));
        }

        let without_modifiers = strip_tokens(&fixed, &self.modifier_tokens);
        if !without_modifiers.is_empty() && without_modifiers.len() != fixed.len() {
            out.add(IngredientSlug::from_tokens(without_modifiers));
        }

        let without_noise = strip_tokens(&fixed, &self.noise_tokens);
        if !without_noise.is_empty() && without_noise.len() != fixed.len() {
            out.add(IngredientSlug::from_tokens(without_noise.iter().copied()));
        }

        for tokens in [&fixed, &without_noise] {
            if tokens.len() > 2 && tokens.contains(&CONJUNCTION) {
                out.add(IngredientSlug::from_tokens(
                    tokens.iter().copied().filter(|t| *t != CONJUNCTION),
                ));
            }
        }

        for suffix in &self.strip_suffixes {
            if let Some(stem) = base.as_str().strip_suffix(suffix.as_str()) {
                out.add(IngredientSlug::new(stem));
            }
        }

        let before_morphology = out.len();
        for idx in 0..before_morphology {
            let phrase = out.get(idx).to_phrase();
            out.add(IngredientSlug::new(&inflector.singularize(&phrase)));
            out.add(IngredientSlug::new(&inflector.pluralize(&phrase)));
        }

        let before_aliases = out.len();
        for idx in 0..before_aliases {
            if let Some(target) = self.aliases.get(out.get(idx)).cloned() {
                out.add(target);
            }
        }

        out.into_vec()
    }
}

fn strip_tokens<'a>(tokens: &[&'a str], drop: &HashSet<String>) -> Vec<&'a str> {
    tokens
        .iter()
        .copied()
        .filter(|t| !drop.contains(*t))
        .collect()
}

/// Insertion-ordered set of non-empty slugs. Candidate lists are a few dozen
/// entries at most, so a linear scan beats hashing here.
#[derive(Default)]
struct VariantSet(Vec<IngredientSlug>);

impl VariantSet {
    fn add(&mut self, slug: IngredientSlug) {
        if !slug.is_empty() && !self.0.contains(&slug) {
            self.0.push(slug);
        }
    }

    fn get(&self, idx: usize) -> &IngredientSlug {
        &self.0[idx]
    }

    fn len(&self) -> usize {
        self.0.len()
    }

    fn into_vec(self) -> Vec<IngredientSlug> {
        self.0
    }
}
