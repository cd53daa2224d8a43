//! Local and global ontologies derived from ground truth
//!
//! Each ground-truth entry contributes a local ontology: its known
//! ingredients plus the ingredient slugs of its expected recipe. The global
//! ontology is the union of all of them. Predictions find their local tier
//! through the image-set key.

use recipe_domain::{image_set_key, GroundTruthDataset, GroundTruthEntry};
use std::collections::HashMap;

use super::index::{Ontology, OntologyIndex};
use super::resolver::OntologyTiers;

#[derive(Debug, Clone, Default)]
pub struct LayeredOntologies {
    global: OntologyIndex,
    local_by_key: HashMap<String, OntologyIndex>,
    /// Local tier for predictions with no ground-truth entry
    empty: OntologyIndex,
}

fn local_ontology(entry: &GroundTruthEntry) -> Ontology {
    let mut ontology = Ontology::new();
    if let Some(known) = &entry.known_ingredients {
        ontology.extend(known.iter().map(|k| k.slug.as_str()));
    }
    ontology.extend(entry.expected.ingredients().map(|i| i.ingredient.as_str()));
    ontology
}

impl LayeredOntologies {
    pub fn from_ground_truth(ground_truth: &GroundTruthDataset) -> Self {
        let mut global = Ontology::new();
        let mut local_by_key = HashMap::with_capacity(ground_truth.entries.len());

        for entry in &ground_truth.entries {
            let local = local_ontology(entry);
            global.extend(local.iter());
            local_by_key.insert(entry.key(), OntologyIndex::build(local));
        }

        let global = OntologyIndex::build(global);
        tracing::info!(
            entries = local_by_key.len(),
            global_slugs = global.len(),
            "Built layered ontologies"
        );

        Self {
            global,
            local_by_key,
            empty: OntologyIndex::default(),
        }
    }

    pub fn global(&self) -> &OntologyIndex {
        &self.global
    }

    pub fn local(&self, images: &[String]) -> Option<&OntologyIndex> {
        self.local_by_key.get(&image_set_key(images))
    }

    /// Local-then-global tiers for a prediction's images. An unknown image
    /// set gets an empty local tier.
    pub fn tiers_for(&self, images: &[String]) -> OntologyTiers<'_> {
        let local = self.local(images).unwrap_or(&self.empty);
        OntologyTiers::layered(local, &self.global)
    }
}
