//! Text normalisation and category resolution.

use lifeline_config::Catalog;
use lifeline_core::Category;

/// Lowercase and drop the characters that carry no meaning for lookup: a
/// leading `/` command trigger and question marks.
pub fn normalize(text: &str) -> String {
    let text = text.trim();
    let text = text.strip_prefix('/').unwrap_or(text);
    text.to_lowercase().replace('?', "")
}

/// Split normalised text into words. Punctuation around a word is removed
/// ("mumbai," → "mumbai").
pub fn tokenize(text: &str) -> Vec<String> {
    text.split_whitespace()
        .map(|word| word.trim_matches(|c: char| !c.is_alphanumeric()))
        .filter(|word| !word.is_empty())
        .map(str::to_string)
        .collect()
}

/// The category selected by the first token that is exactly an alias.
///
/// Tokens are scanned left to right; the first hit wins.
pub fn resolve_category(tokens: &[String], catalog: &Catalog) -> Option<Category> {
    tokens.iter().find_map(|token| catalog.lookup(token))
}
