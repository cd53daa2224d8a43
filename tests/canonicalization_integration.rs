//! Integration tests for ingredient canonicalization
//!
//! Tests verify:
//! 1. Registry-backed single-tier resolution end to end
//! 2. Prediction entry rewriting (ingredients and cuisine)
//! 3. Layered resolution against ontologies built from ground truth
//! 4. Config overrides changing resolution behavior
//! 5. Decision log output

use pretty_assertions::assert_eq;
use recipe_eval::canonicalization::{
    Canonicalizer, DecisionLog, LayeredOntologies, MatchScope, OntologyIndex, OntologyTiers,
    ResolutionMethod, UnresolvedReason,
};
use recipe_eval::config::CanonicalizerConfig;
use recipe_eval::io;
use recipe_eval::recipe_domain::{
    CanonicalIngredients, GroundTruthDataset, GroundTruthEntry, IngredientGroup, PredictionEntry,
    PredictionsDataset, Recipe, RecipeIngredient,
};

// ============================================================================
// TEST FIXTURES
// ============================================================================

const REGISTRY: &str = r#"{
  "ingredients": [
    {"slug": "bell-pepper", "name": "Bell pepper", "category": "vegetable"},
    {"slug": "black-pepper", "name": "Black pepper", "category": "spice"},
    {"slug": "chicken-breast", "name": "Chicken breast", "category": "protein"},
    {"slug": "garlic", "name": "Garlic", "category": "vegetable"},
    {"slug": "olive-oil", "name": "Olive oil", "category": "oil-fat"},
    {"slug": "parmesan", "name": "Parmesan", "category": "dairy"},
    {"slug": "pork-sausage", "name": "Pork sausage", "category": "protein"},
    {"slug": "salt", "name": "Salt", "category": "spice"},
    {"slug": "tomato", "name": "Tomato", "category": "vegetable"},
    {"slug": "white-onion", "name": "White onion", "category": "vegetable"}
  ]
}"#;

fn registry_index() -> OntologyIndex {
    let registry: CanonicalIngredients = serde_json::from_str(REGISTRY).unwrap();
    registry.validate().unwrap();
    OntologyIndex::from_slugs(registry.slugs())
}

fn recipe(items: &[&str], cuisine: Option<&str>) -> Recipe {
    Recipe {
        title: "Skillet Chicken".to_string(),
        description: "One-pan chicken with peppers".to_string(),
        cuisine: cuisine.map(str::to_string),
        servings: 4,
        prep_time: Some(15),
        cook_time: Some(25),
        ingredient_groups: vec![IngredientGroup {
            name: Some("Main".to_string()),
            items: items.iter().map(|i| RecipeIngredient::new(*i)).collect(),
        }],
        instructions: vec!["Brown the chicken.".to_string(), "Add vegetables.".to_string()],
    }
}

fn prediction(image: &str, items: &[&str], cuisine: Option<&str>) -> PredictionEntry {
    PredictionEntry {
        images: vec![image.to_string()],
        predicted: recipe(items, cuisine),
        predicted_ingredients: None,
    }
}

fn ground_truth(image: &str, items: &[&str]) -> GroundTruthEntry {
    GroundTruthEntry {
        images: vec![image.to_string()],
        expected: recipe(items, Some("Mexican")),
        known_ingredients: None,
    }
}

// ============================================================================
// SINGLE-TIER RESOLUTION
// ============================================================================

#[test]
fn test_registry_resolution_outcomes() {
    let index = registry_index();
    let tiers = OntologyTiers::single(&index);
    let canonicalizer = Canonicalizer::new(CanonicalizerConfig::single_tier());

    let cases = [
        ("Red Peppers", "bell-pepper", ResolutionMethod::Exact),
        ("garlic cloves", "garlic", ResolutionMethod::Exact),
        ("Parmesan Cheese", "parmesan", ResolutionMethod::Exact),
        ("sausages", "pork-sausage", ResolutionMethod::Exact),
        ("½ tomato", "tomato", ResolutionMethod::Exact),
        ("ｔｏｍａｔｏ", "", ResolutionMethod::None),
        ("tomatoe", "tomatoe", ResolutionMethod::None),
        ("salt-and-pepper", "salt-and-pepper", ResolutionMethod::None),
    ];
    for (raw, expected, method) in cases {
        let decision = canonicalizer.resolve(raw, &tiers);
        assert_eq!(decision.resolved_slug, expected, "resolving {raw}");
        assert_eq!(decision.method, method, "resolving {raw}");
    }
}

#[test]
fn test_resolved_output_is_stable() {
    let index = registry_index();
    let tiers = OntologyTiers::single(&index);
    let canonicalizer = Canonicalizer::default();

    for raw in ["Red Peppers", "onions", "chicken fillets", "tomatoe", "Extra Virgin Olive Oil"] {
        let first = canonicalizer.resolve(raw, &tiers);
        let second = canonicalizer.resolve(first.resolved_slug.as_str(), &tiers);
        assert_eq!(second.resolved_slug, first.resolved_slug, "re-resolving {raw}");
    }
}

#[test]
fn test_unresolved_decision_shape() {
    let index = registry_index();
    let decision = Canonicalizer::default().resolve("tomatoe", &OntologyTiers::single(&index));
    assert_eq!(decision.reason, Some(UnresolvedReason::BelowThreshold));
    assert_eq!(decision.resolved_slug, decision.base_slug);
    assert!(!decision.candidates.is_empty());
    assert!(decision.candidates.len() <= 5);
    assert_eq!(decision.candidates[0].slug, "tomato");
    assert!(decision.candidates.iter().all(|c| c.scope.is_none()));
}

#[test]
fn test_empty_ontology_yields_printable_no_candidates_decision() {
    let empty = OntologyIndex::from_slugs(Vec::<String>::new());
    let local = OntologyIndex::from_slugs(Vec::<String>::new());
    let canonicalizer = Canonicalizer::default();

    for tiers in [
        OntologyTiers::with_local(None, &empty),
        OntologyTiers::with_local(Some(&local), &empty),
    ] {
        let decision = canonicalizer.resolve("Red Peppers", &tiers);
        assert_eq!(decision.reason, Some(UnresolvedReason::NoCandidates));
        assert_eq!(decision.resolved_slug, "red-peppers");

        let json = serde_json::to_value(&decision).unwrap();
        assert_eq!(json["method"], "none");
        assert_eq!(json["reason"], "no-candidates");
        assert_eq!(json["candidates"], serde_json::json!([]));
    }
    assert_eq!(OntologyTiers::with_local(Some(&local), &empty).len(), 2);
}

#[test]
fn test_engine_is_shareable_across_threads() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Canonicalizer>();
    assert_send_sync::<OntologyIndex>();
    assert_send_sync::<LayeredOntologies>();
}

// ============================================================================
// PREDICTION ENTRIES
// ============================================================================

#[test]
fn test_prediction_entry_rewrite() {
    let index = registry_index();
    let entry = prediction("tacos.jpg", &["chicken-fillets", "garlic-clove", "mystery-spice"], Some("Tex-Mex"));
    let result = Canonicalizer::default().canonicalize_prediction(&entry, &OntologyTiers::single(&index));

    let slugs: Vec<_> = result.entry.predicted.ingredients().map(|i| i.ingredient.as_str()).collect();
    assert_eq!(slugs, vec!["chicken-breast", "garlic", "mystery-spice"]);
    assert_eq!(result.entry.predicted.cuisine.as_deref(), Some("Tex-Mex"));
    assert_eq!(result.decisions.len(), 3);
    assert!(!result.decisions[2].is_resolved());
    // Everything else is carried over
    assert_eq!(result.entry.predicted.title, entry.predicted.title);
    assert_eq!(result.entry.predicted.ingredient_groups[0].name.as_deref(), Some("Main"));
}

#[test]
fn test_cuisine_suffix_is_dropped() {
    let index = registry_index();
    let entry = prediction("stew.jpg", &["white-onion"], Some("French-Style"));
    let result = Canonicalizer::default().canonicalize_prediction(&entry, &OntologyTiers::single(&index));
    assert_eq!(result.entry.predicted.cuisine.as_deref(), Some("French"));
}

// ============================================================================
// LAYERED RESOLUTION
// ============================================================================

#[test]
fn test_layered_dataset_normalization() {
    let truth = GroundTruthDataset {
        entries: vec![
            ground_truth("tacos.jpg", &["chicken-breast", "bell-pepper", "tortilla"]),
            ground_truth("soup.jpg", &["leek", "potato", "vegetable-stock"]),
        ],
    };
    let predictions = PredictionsDataset {
        entries: vec![
            prediction("tacos.jpg", &["chicken fillets", "red peppers", "tortillas"], Some("Mexican")),
            prediction("soup.jpg", &["leeks", "stock vegetable", "potatos"], None),
            prediction("unknown.jpg", &["tortilla"], None),
        ],
    };

    let ontologies = LayeredOntologies::from_ground_truth(&truth);
    let canonicalizer = Canonicalizer::new(CanonicalizerConfig::layered());
    let (rewritten, log) =
        canonicalizer.canonicalize_dataset(&predictions, |entry| ontologies.tiers_for(&entry.images));

    let slugs = |idx: usize| -> Vec<String> {
        rewritten.entries[idx]
            .predicted
            .ingredients()
            .map(|i| i.ingredient.clone())
            .collect()
    };
    assert_eq!(slugs(0), vec!["chicken-breast", "bell-pepper", "tortilla"]);
    assert_eq!(slugs(1), vec!["leek", "vegetable-stock", "potato"]);
    assert_eq!(slugs(2), vec!["tortilla"]);

    let methods: Vec<_> = log.entries[1].decisions.iter().map(|d| d.method).collect();
    assert_eq!(
        methods,
        vec![
            ResolutionMethod::ExactLocal,
            ResolutionMethod::ExactLocal,
            ResolutionMethod::ExactLocal,
        ]
    );
    // No local tier for an unknown image set
    assert_eq!(log.entries[2].decisions[0].method, ResolutionMethod::ExactGlobal);
    assert_eq!(log.entries[2].decisions[0].candidates[0].scope, Some(MatchScope::Global));
}

#[test]
fn test_layered_fuzzy_local() {
    let truth = GroundTruthDataset {
        entries: vec![ground_truth("salad.jpg", &["virgin-olive-oil", "tomato"])],
    };
    let ontologies = LayeredOntologies::from_ground_truth(&truth);
    let tiers = ontologies.tiers_for(&["salad.jpg".to_string()]);
    let decision = Canonicalizer::new(CanonicalizerConfig::layered()).resolve("oil olive virgin", &tiers);

    assert_eq!(decision.method, ResolutionMethod::FuzzyLocal);
    assert_eq!(decision.resolved_slug, "virgin-olive-oil");
    assert_eq!(decision.threshold, Some(0.70));
    // Merged candidates carry both scopes
    assert!(decision.candidates.iter().any(|c| c.scope == Some(MatchScope::Local)));
    assert!(decision.candidates.iter().any(|c| c.scope == Some(MatchScope::Global)));
}

// ============================================================================
// CONFIGURATION
// ============================================================================

#[test]
fn test_yaml_aliases_change_resolution() {
    let config = CanonicalizerConfig::load_from_str(
        r#"
rules:
  aliases:
    scallion: white-onion
"#,
    )
    .unwrap();
    let index = registry_index();
    let tiers = OntologyTiers::single(&index);

    let custom = Canonicalizer::new(config);
    assert_eq!(custom.resolve("scallions", &tiers).resolved_slug, "white-onion");
    // Replacing the alias table drops the defaults
    assert_eq!(custom.resolve("red-pepper", &tiers).method, ResolutionMethod::None);

    let default = Canonicalizer::default();
    assert_eq!(default.resolve("scallions", &tiers).method, ResolutionMethod::None);
}

#[test]
fn test_sample_config_file_loads() {
    let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("config/canonicalization.yaml");
    let config = CanonicalizerConfig::load_from_file(&path).unwrap();
    assert_eq!(config.preset, recipe_eval::Preset::Layered);
    assert!(config.rules.noise_tokens.contains("extra"));
}

// ============================================================================
// DECISION LOG
// ============================================================================

#[test]
fn test_decision_log_written_and_read_back() {
    let index = registry_index();
    let predictions = PredictionsDataset {
        entries: vec![prediction("a.jpg", &["onions", "tomatoe"], None)],
    };
    let (rewritten, log) =
        Canonicalizer::default().canonicalize_dataset(&predictions, |_| OntologyTiers::single(&index));

    let dir = tempfile::TempDir::new().unwrap();
    let log_path = dir.path().join("outputs/canonicalization-decisions.json");
    let out_path = dir.path().join("outputs/predictions-canonicalized.json");
    io::write_json(&log_path, &log).unwrap();
    io::write_json(&out_path, &rewritten).unwrap();

    let raw: serde_json::Value = io::read_json(&log_path).unwrap();
    let decision = &raw["entries"][0]["decisions"][1];
    assert_eq!(decision["originalSlug"], "tomatoe");
    assert_eq!(decision["method"], "none");
    assert_eq!(decision["reason"], "below-threshold");
    assert!(raw["generatedAt"].is_string());

    let parsed: DecisionLog = io::read_json(&log_path).unwrap();
    let summarize = |log: &DecisionLog| -> Vec<(String, ResolutionMethod)> {
        log.decisions()
            .map(|d| (d.resolved_slug.to_string(), d.method))
            .collect()
    };
    assert_eq!(summarize(&parsed), summarize(&log));
    assert_eq!(io::load_predictions(&out_path).unwrap(), rewritten);
}
