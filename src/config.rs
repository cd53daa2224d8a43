//! Canonicalizer Configuration
//!
//! Thresholds and rewrite tables for ingredient canonicalization. Two named
//! presets are compiled in, matching the two resolution modes of the pipeline:
//!
//! - `single-tier`: one ontology (the canonical ingredient registry)
//! - `layered`: a local ontology (ingredients of the matching ground-truth
//!   entry) preferred over a global one; additionally treats `extra` as noise
//!
//! A YAML file may pick a preset and override any part of it:
//!
//! ```yaml
//! preset: layered
//! thresholds:
//!   local: 0.75
//! rules:
//!   aliases:
//!     scallion: spring-onion
//! ```
//!
//! The resulting config is immutable once loaded.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

pub const DEFAULT_TOKEN_FIXUPS: &[(&str, &str)] = &[
    ("clov", "clove"),
    ("flak", "flakes"),
    ("sausag", "sausages"),
    ("veg", "vegetables"),
];

pub const DEFAULT_MODIFIER_TOKENS: &[&str] = &[
    "fresh", "dried", "dry", "frozen", "light", "extra", "medium", "semi", "skimmed", "hot",
];

pub const DEFAULT_NOISE_TOKENS: &[&str] = &["of", "slice", "slices", "cooked"];

/// Noise tokens added on top of the defaults by the layered preset
pub const LAYERED_EXTRA_NOISE_TOKENS: &[&str] = &["extra"];

/// Trailing words stripped from the base slug (`parmesan-cheese` → `parmesan`)
pub const DEFAULT_STRIP_SUFFIXES: &[&str] = &["cheese", "powder"];

pub const DEFAULT_ALIASES: &[(&str, &str)] = &[
    ("onion", "white-onion"),
    ("chicken-fillet", "chicken-breast"),
    ("garlic-clove", "garlic"),
    ("red-pepper", "bell-pepper"),
    ("yellow-pepper", "bell-pepper"),
    ("green-pepper", "bell-pepper"),
    ("sausage", "pork-sausage"),
];

/// Hyphenated cuisine labels that are names in their own right
pub const DEFAULT_COMPOUND_CUISINES: &[&str] = &["indo-chinese", "tex-mex"];

pub const DEFAULT_SINGLE_THRESHOLD: f64 = 0.85;
pub const DEFAULT_LOCAL_THRESHOLD: f64 = 0.70;
pub const DEFAULT_GLOBAL_THRESHOLD: f64 = 0.85;
pub const DEFAULT_MARGIN: f64 = 0.04;
pub const DEFAULT_MAX_CANDIDATES: usize = 5;

/// Named starting point for a configuration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Preset {
    #[default]
    SingleTier,
    Layered,
}

/// Fuzzy acceptance thresholds per ontology tier
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    /// Score a single-tier match must reach
    pub single: f64,
    /// Score a local-tier match must reach
    pub local: f64,
    /// Score a global-tier match must reach
    pub global: f64,
    /// Minimum gap between best and runner-up
    pub margin: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            single: DEFAULT_SINGLE_THRESHOLD,
            local: DEFAULT_LOCAL_THRESHOLD,
            global: DEFAULT_GLOBAL_THRESHOLD,
            margin: DEFAULT_MARGIN,
        }
    }
}

/// Rewrite tables feeding candidate generation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleTables {
    pub token_fixups: BTreeMap<String, String>,
    pub modifier_tokens: BTreeSet<String>,
    pub noise_tokens: BTreeSet<String>,
    pub strip_suffixes: Vec<String>,
    pub aliases: BTreeMap<String, String>,
}

fn owned_pairs(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn owned_set(words: &[&str]) -> BTreeSet<String> {
    words.iter().map(|w| w.to_string()).collect()
}

impl RuleTables {
    pub fn single_tier() -> Self {
        Self {
            token_fixups: owned_pairs(DEFAULT_TOKEN_FIXUPS),
            modifier_tokens: owned_set(DEFAULT_MODIFIER_TOKENS),
            noise_tokens: owned_set(DEFAULT_NOISE_TOKENS),
            strip_suffixes: DEFAULT_STRIP_SUFFIXES.iter().map(|s| s.to_string()).collect(),
            aliases: owned_pairs(DEFAULT_ALIASES),
        }
    }

    pub fn layered() -> Self {
        let mut tables = Self::single_tier();
        tables
            .noise_tokens
            .extend(LAYERED_EXTRA_NOISE_TOKENS.iter().map(|w| w.to_string()));
        tables
    }
}

impl Default for RuleTables {
    fn default() -> Self {
        Self::single_tier()
    }
}

/// Root configuration for ingredient canonicalization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalizerConfig {
    pub preset: Preset,
    pub thresholds: Thresholds,
    /// Length of the ranked candidate list kept on each decision
    pub max_candidates: usize,
    pub rules: RuleTables,
    pub compound_cuisines: BTreeSet<String>,
}

impl Default for CanonicalizerConfig {
    fn default() -> Self {
        Self::single_tier()
    }
}

impl CanonicalizerConfig {
    pub fn single_tier() -> Self {
        Self::from_preset(Preset::SingleTier)
    }

    pub fn layered() -> Self {
        Self::from_preset(Preset::Layered)
    }

    pub fn from_preset(preset: Preset) -> Self {
        let rules = match preset {
            Preset::SingleTier => RuleTables::single_tier(),
            Preset::Layered => RuleTables::layered(),
        };
        Self {
            preset,
            thresholds: Thresholds::default(),
            max_candidates: DEFAULT_MAX_CANDIDATES,
            rules,
            compound_cuisines: owned_set(DEFAULT_COMPOUND_CUISINES),
        }
    }

    /// Load from a YAML file
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::IoError {
            path: path.display().to_string(),
            source: e,
        })?;

        Self::load_from_str(&content)
    }

    /// Load from a YAML string. Fields left out keep the preset's values.
    pub fn load_from_str(yaml: &str) -> Result<Self, ConfigError> {
        let overrides: ConfigOverrides =
            serde_yaml::from_str(yaml).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        let config = overrides.apply();
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let t = &self.thresholds;
        for (name, value) in [
            ("single", t.single),
            ("local", t.local),
            ("global", t.global),
            ("margin", t.margin),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::Invalid(format!(
                    "threshold '{}' must be within [0, 1], got {}",
                    name, value
                )));
            }
        }
        if self.max_candidates == 0 {
            return Err(ConfigError::Invalid(
                "max_candidates must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ThresholdOverrides {
    single: Option<f64>,
    local: Option<f64>,
    global: Option<f64>,
    margin: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RuleOverrides {
    token_fixups: Option<BTreeMap<String, String>>,
    modifier_tokens: Option<BTreeSet<String>>,
    noise_tokens: Option<BTreeSet<String>>,
    strip_suffixes: Option<Vec<String>>,
    aliases: Option<BTreeMap<String, String>>,
}

/// On-disk shape: every field optional, applied over the chosen preset
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigOverrides {
    preset: Preset,
    thresholds: ThresholdOverrides,
    max_candidates: Option<usize>,
    rules: RuleOverrides,
    compound_cuisines: Option<BTreeSet<String>>,
}

impl ConfigOverrides {
    fn apply(self) -> CanonicalizerConfig {
        let mut config = CanonicalizerConfig::from_preset(self.preset);

        let t = &mut config.thresholds;
        t.single = self.thresholds.single.unwrap_or(t.single);
        t.local = self.thresholds.local.unwrap_or(t.local);
        t.global = self.thresholds.global.unwrap_or(t.global);
        t.margin = self.thresholds.margin.unwrap_or(t.margin);

        if let Some(max) = self.max_candidates {
            config.max_candidates = max;
        }

        let rules = &mut config.rules;
        if let Some(fixups) = self.rules.token_fixups {
            rules.token_fixups = fixups;
        }
        if let Some(modifiers) = self.rules.modifier_tokens {
            rules.modifier_tokens = modifiers;
        }
        if let Some(noise) = self.rules.noise_tokens {
            rules.noise_tokens = noise;
        }
        if let Some(suffixes) = self.rules.strip_suffixes {
            rules.strip_suffixes = suffixes;
        }
        if let Some(aliases) = self.rules.aliases {
            rules.aliases = aliases;
        }

        if let Some(cuisines) = self.compound_cuisines {
            config.compound_cuisines = cuisines;
        }
        config
    }
}

/// Errors that can occur when loading canonicalizer configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read file {path}: {source}")]
    IoError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse YAML: {0}")]
    ParseError(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SAMPLE_CONFIG: &str = r#"
preset: layered
thresholds:
  local: 0.75
  margin: 0.05
max_candidates: 3
rules:
  aliases:
    scallion: spring-onion
compound_cuisines:
  - tex-mex
  - pan-asian
"#;

    #[test]
    fn test_presets_differ_only_in_noise_tokens() {
        let single = CanonicalizerConfig::single_tier();
        let layered = CanonicalizerConfig::layered();
        assert!(!single.rules.noise_tokens.contains("extra"));
        assert!(layered.rules.noise_tokens.contains("extra"));
        assert_eq!(single.rules.modifier_tokens, layered.rules.modifier_tokens);
        assert_eq!(single.thresholds, layered.thresholds);
    }

    #[test]
    fn test_default_thresholds() {
        let config = CanonicalizerConfig::default();
        assert_eq!(config.preset, Preset::SingleTier);
        assert_eq!(config.thresholds.single, 0.85);
        assert_eq!(config.thresholds.local, 0.70);
        assert_eq!(config.thresholds.global, 0.85);
        assert_eq!(config.thresholds.margin, 0.04);
        assert_eq!(config.max_candidates, 5);
    }

    #[test]
    fn test_load_overrides_over_preset() {
        let config = CanonicalizerConfig::load_from_str(SAMPLE_CONFIG).unwrap();
        assert_eq!(config.preset, Preset::Layered);
        assert_eq!(config.thresholds.local, 0.75);
        assert_eq!(config.thresholds.global, 0.85);
        assert_eq!(config.thresholds.margin, 0.05);
        assert_eq!(config.max_candidates, 3);
        // Replaced tables replace wholesale, untouched tables keep the preset
        assert_eq!(config.rules.aliases.len(), 1);
        assert_eq!(config.rules.token_fixups.len(), DEFAULT_TOKEN_FIXUPS.len());
        assert!(config.rules.noise_tokens.contains("extra"));
        assert!(config.compound_cuisines.contains("pan-asian"));
    }

    #[test]
    fn test_empty_yaml_is_single_tier_preset() {
        let config = CanonicalizerConfig::load_from_str("{}").unwrap();
        assert_eq!(config, CanonicalizerConfig::single_tier());
    }

    #[test]
    fn test_rejects_out_of_range_threshold() {
        let err = CanonicalizerConfig::load_from_str("thresholds:\n  global: 1.5\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_rejects_zero_candidates_and_unknown_fields() {
        assert!(matches!(
            CanonicalizerConfig::load_from_str("max_candidates: 0\n"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            CanonicalizerConfig::load_from_str("threshold: 0.5\n"),
            Err(ConfigError::ParseError(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        let err = CanonicalizerConfig::load_from_file(Path::new("/nonexistent/canon.yaml"))
            .unwrap_err();
        assert!(matches!(err, ConfigError::IoError { .. }));
    }
}
