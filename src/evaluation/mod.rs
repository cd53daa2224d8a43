//! Scoring of extracted recipes against ground truth

pub mod metrics;

pub use metrics::{
    aggregate_metrics, bag_f1, entry_scores, evaluate_ingredient_parsing, evaluate_instructions,
    evaluate_scalar_fields, set_f1, split_words, word_overlap_f1, Accuracy, AggregateMetrics,
    CategoryMetrics, EntryScoreSummary, EntryScores, Evaluation, F1Scores, FieldScores,
    IngredientParsingScores, OverallScore, ScalarFieldScores,
};
