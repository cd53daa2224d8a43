//! Ontology and its lookup index
//!
//! The `OntologyIndex` gives fast, in-memory shortlisting of canonical slugs
//! without scanning the whole vocabulary per candidate. It is built once per
//! ontology, never mutated afterwards, and can be shared across threads
//! (`&OntologyIndex` or `Arc<OntologyIndex>`).

use recipe_domain::IngredientSlug;
use smallvec::SmallVec;
use std::collections::{BTreeSet, HashMap};
use std::fmt;

/// Slugs within this many characters of a candidate's length form the
/// fallback shortlist when no token is shared.
pub const LENGTH_WINDOW: usize = 2;

/// An immutable set of canonical ingredient slugs.
///
/// Built from any iterator of strings; every entry is normalized and empty
/// results are dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ontology {
    slugs: BTreeSet<IngredientSlug>,
}

impl Ontology {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, slug: &str) -> bool {
        self.slugs.contains(slug)
    }

    pub fn len(&self) -> usize {
        self.slugs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slugs.is_empty()
    }

    /// Slugs in ascending order
    pub fn iter(&self) -> impl Iterator<Item = &IngredientSlug> {
        self.slugs.iter()
    }
}

impl<S: AsRef<str>> FromIterator<S> for Ontology {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut ontology = Self::new();
        ontology.extend(iter);
        ontology
    }
}

impl<S: AsRef<str>> Extend<S> for Ontology {
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        self.slugs.extend(
            iter.into_iter()
                .map(|s| IngredientSlug::new(s.as_ref()))
                .filter(|s| !s.is_empty()),
        );
    }
}

/// Read-only lookup structure over an ontology
#[derive(Debug, Clone, Default)]
pub struct OntologyIndex {
    ontology: Ontology,

    /// Slug length → slugs of that length (ascending)
    by_length: HashMap<usize, Vec<IngredientSlug>>,

    /// Token → slugs containing that token (ascending)
    by_token: HashMap<String, SmallVec<[IngredientSlug; 8]>>,
}

impl OntologyIndex {
    /// Build the index in a single pass over the ontology.
    pub fn build(ontology: Ontology) -> Self {
        let mut by_length: HashMap<usize, Vec<IngredientSlug>> = HashMap::new();
        let mut by_token: HashMap<String, SmallVec<[IngredientSlug; 8]>> = HashMap::new();

        for slug in ontology.iter() {
            by_length.entry(slug.len()).or_default().push(slug.clone());

            for token in slug.tokens() {
                let slugs = by_token.entry(token.to_string()).or_default();
                // A slug repeating a token ("bean-bean") registers once
                if slugs.last() != Some(slug) {
                    slugs.push(slug.clone());
                }
            }
        }

        tracing::debug!(
            slugs = ontology.len(),
            tokens = by_token.len(),
            lengths = by_length.len(),
            "Built ontology index"
        );

        Self {
            ontology,
            by_length,
            by_token,
        }
    }

    pub fn from_slugs<I, S>(slugs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::build(slugs.into_iter().collect())
    }

    pub fn ontology(&self) -> &Ontology {
        &self.ontology
    }

    pub fn contains(&self, slug: &str) -> bool {
        self.ontology.contains(slug)
    }

    pub fn len(&self) -> usize {
        self.ontology.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ontology.is_empty()
    }

    /// Slugs containing `token` as one of their words
    pub fn lookup_by_token(&self, token: &str) -> Option<&SmallVec<[IngredientSlug; 8]>> {
        self.by_token.get(token)
    }

    /// Slugs with exactly `len` characters
    pub fn lookup_by_length(&self, len: usize) -> &[IngredientSlug] {
        self.by_length.get(&len).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Ontology slugs worth scoring against `candidate`.
    ///
    /// Slugs sharing a token with the candidate; failing that, slugs within
    /// [`LENGTH_WINDOW`] characters of its length; failing that, everything.
    pub fn shortlist(&self, candidate: &IngredientSlug) -> BTreeSet<&IngredientSlug> {
        let mut shortlist: BTreeSet<&IngredientSlug> = candidate
            .tokens()
            .filter_map(|token| self.lookup_by_token(token))
            .flat_map(|slugs| slugs.iter())
            .collect();

        if shortlist.is_empty() {
            let len = candidate.len();
            for target in len.saturating_sub(LENGTH_WINDOW)..=len + LENGTH_WINDOW {
                shortlist.extend(self.lookup_by_length(target));
            }
        }

        if shortlist.is_empty() {
            shortlist.extend(self.ontology.iter());
        }

        shortlist
    }

    /// Statistics for logging
    pub fn stats(&self) -> IndexStats {
        IndexStats {
            slug_count: self.ontology.len(),
            token_index_size: self.by_token.len(),
            length_buckets: self.by_length.len(),
            longest_posting: self.by_token.values().map(|v| v.len()).max().unwrap_or(0),
        }
    }
}

/// Index statistics
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexStats {
    pub slug_count: usize,
    pub token_index_size: usize,
    pub length_buckets: usize,
    /// Most slugs registered under a single token
    pub longest_posting: usize,
}

impl fmt::Display for IndexStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Ontology Index Statistics:")?;
        writeln!(f, "  Slugs: {}", self.slug_count)?;
        writeln!(f, "  Token index entries: {}", self.token_index_size)?;
        writeln!(f, "  Length buckets: {}", self.length_buckets)?;
        writeln!(f, "  Longest token posting: {}", self.longest_posting)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_test_index() -> OntologyIndex {
        OntologyIndex::from_slugs([
            "chicken-breast",
            "chicken-thigh",
            "bell-pepper",
            "black-pepper",
            "tomato",
            "garlic",
        ])
    }

    fn slugs(set: BTreeSet<&IngredientSlug>) -> Vec<&str> {
        set.into_iter().map(|s| s.as_str()).collect()
    }

    #[test]
    fn test_ontology_normalizes_and_drops_empty() {
        let ontology: Ontology = ["Bell Pepper", "", "***", "garlic", "garlic"].into_iter().collect();
        assert_eq!(ontology.len(), 2);
        assert!(ontology.contains("bell-pepper"));
        assert!(!ontology.contains("Bell Pepper"));
    }

    #[test]
    fn test_lookup_by_token() {
        let index = make_test_index();
        let peppers = index.lookup_by_token("pepper").unwrap();
        assert_eq!(peppers.len(), 2);
        assert!(index.lookup_by_token("onion").is_none());
    }

    #[test]
    fn test_lookup_by_length() {
        let index = make_test_index();
        let six: Vec<_> = index.lookup_by_length(6).iter().map(|s| s.as_str()).collect();
        assert_eq!(six, vec!["garlic", "tomato"]);
        assert!(index.lookup_by_length(99).is_empty());
    }

    #[test]
    fn test_shortlist_by_shared_token() {
        let index = make_test_index();
        let shortlist = index.shortlist(&IngredientSlug::new("chicken-wing"));
        assert_eq!(slugs(shortlist), vec!["chicken-breast", "chicken-thigh"]);
    }

    #[test]
    fn test_shortlist_falls_back_to_length_window() {
        let index = make_test_index();
        // No shared token; length 7 picks up the two 6-letter slugs
        let shortlist = index.shortlist(&IngredientSlug::new("tomatoe"));
        assert_eq!(slugs(shortlist), vec!["garlic", "tomato"]);
    }

    #[test]
    fn test_shortlist_falls_back_to_everything() {
        let index = make_test_index();
        let shortlist = index.shortlist(&IngredientSlug::new("x"));
        assert_eq!(shortlist.len(), index.len());
    }

    #[test]
    fn test_empty_index() {
        let index = OntologyIndex::from_slugs(Vec::<String>::new());
        assert!(index.is_empty());
        assert!(index.shortlist(&IngredientSlug::new("garlic")).is_empty());
        assert_eq!(index.stats().slug_count, 0);
    }

    #[test]
    fn test_repeated_token_registers_once() {
        let index = OntologyIndex::from_slugs(["bean-bean", "bean"]);
        assert_eq!(index.lookup_by_token("bean").unwrap().len(), 2);
    }

    #[test]
    fn test_stats() {
        let stats = make_test_index().stats();
        assert_eq!(stats.slug_count, 6);
        assert_eq!(stats.longest_posting, 2);
        assert!(stats.to_string().contains("Slugs: 6"));
    }
}
