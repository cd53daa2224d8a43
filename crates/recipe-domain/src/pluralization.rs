//! Singular/plural inflection of ingredient phrases
//!
//! Canonicalization asks an [`Inflector`] for both number forms of every
//! rewritten identifier. The trait keeps the engine independent of any
//! particular morphology; [`EnglishInflector`] is the default, a small
//! rule-based English inflector tuned for ingredient vocabulary.

/// Number inflection over space-separated phrases.
///
/// Implementations must be total: unknown words come back unchanged.
pub trait Inflector: Send + Sync {
    fn singularize(&self, phrase: &str) -> String;
    fn pluralize(&self, phrase: &str) -> String;
}

/// Mass nouns common in recipes. These never inflect.
const UNCOUNTABLE_INGREDIENTS: &[&str] = &[
    "butter", "water", "milk", "rice", "pasta", "flour", "sugar", "salt", "pepper", "garlic",
    "spinach", "cheese", "msg",
];

/// Words whose singular and plural are spelled the same.
const INVARIANT_NOUNS: &[&str] = &[
    "asparagus",
    "couscous",
    "hummus",
    "molasses",
    "fish",
    "sheep",
    "series",
    "species",
    "bass",
];

/// (singular, plural)
const IRREGULAR: &[(&str, &str)] = &[
    ("leaf", "leaves"),
    ("loaf", "loaves"),
    ("half", "halves"),
    ("knife", "knives"),
    ("calf", "calves"),
    ("shelf", "shelves"),
    ("child", "children"),
    ("foot", "feet"),
    ("tooth", "teeth"),
    ("goose", "geese"),
    ("mouse", "mice"),
    ("person", "people"),
];

/// Rule-based English inflector. Inflects the last word of a phrase and
/// returns lowercase output.
///
/// # Examples
///
/// ```
/// use recipe_domain::pluralization::{EnglishInflector, Inflector};
///
/// let inflector = EnglishInflector;
/// assert_eq!(inflector.singularize("garlic cloves"), "garlic clove");
/// assert_eq!(inflector.pluralize("tomato"), "tomatoes");
/// assert_eq!(inflector.pluralize("rice"), "rice");
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct EnglishInflector;

impl Inflector for EnglishInflector {
    fn singularize(&self, phrase: &str) -> String {
        inflect_last_word(phrase, singular_word)
    }

    fn pluralize(&self, phrase: &str) -> String {
        inflect_last_word(phrase, plural_word)
    }
}

fn inflect_last_word(phrase: &str, inflect: fn(&str) -> String) -> String {
    let phrase = phrase.trim().to_lowercase();
    match phrase.rsplit_once(' ') {
        Some((head, last)) => format!("{} {}", head, inflect(last)),
        None if phrase.is_empty() => phrase,
        None => inflect(&phrase),
    }
}

fn is_invariant(word: &str) -> bool {
    UNCOUNTABLE_INGREDIENTS.contains(&word) || INVARIANT_NOUNS.contains(&word)
}

fn is_consonant(c: u8) -> bool {
    c.is_ascii_alphabetic() && !matches!(c, b'a' | b'e' | b'i' | b'o' | b'u')
}

/// Byte before the final `suffix_len` bytes, if any.
fn byte_before(word: &str, suffix_len: usize) -> Option<u8> {
    word.len()
        .checked_sub(suffix_len + 1)
        .map(|idx| word.as_bytes()[idx])
}

fn singular_word(word: &str) -> String {
    if is_invariant(word) {
        return word.to_string();
    }
    if let Some((singular, _)) = IRREGULAR
        .iter()
        .find(|(s, p)| *p == word || *s == word)
    {
        return singular.to_string();
    }

    if word.len() > 3 && word.ends_with("ies") {
        return format!("{}y", &word[..word.len() - 3]);
    }
    if word.ends_with("oes") {
        return word[..word.len() - 2].to_string();
    }
    for suffix in ["ches", "shes", "sses", "xes", "zes"] {
        if word.ends_with(suffix) {
            return word[..word.len() - 2].to_string();
        }
    }
    if word.ends_with("ss") || word.ends_with("us") || word.ends_with("is") {
        return word.to_string();
    }
    if word.len() > 1 && word.ends_with('s') {
        return word[..word.len() - 1].to_string();
    }
    word.to_string()
}

fn plural_word(word: &str) -> String {
    if is_invariant(word) {
        return word.to_string();
    }
    if let Some((_, plural)) = IRREGULAR
        .iter()
        .find(|(s, p)| *s == word || *p == word)
    {
        return plural.to_string();
    }

    if word.ends_with("ss") {
        return format!("{}es", word);
    }
    if word.ends_with('s') {
        // Already plural as far as we can tell
        return word.to_string();
    }
    if word.ends_with('x') || word.ends_with('z') || word.ends_with("ch") || word.ends_with("sh") {
        return format!("{}es", word);
    }
    if word.ends_with('y') && byte_before(word, 1).is_some_and(is_consonant) {
        return format!("{}ies", &word[..word.len() - 1]);
    }
    if word.ends_with('o') && byte_before(word, 1).is_some_and(is_consonant) {
        return format!("{}es", word);
    }
    format!("{}s", word)
}
