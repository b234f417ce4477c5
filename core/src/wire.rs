//! Serialization contract between the recommender and the presentation layer.

use crate::engine::RankedMovie;

/// Separator for joined title lists. Corpus loading rejects any title
/// containing it.
pub const TITLE_SEPARATOR: &str = "---";

/// Fixed sentinel for an unknown title, distinguishable from any joined list.
pub const NOT_FOUND_MESSAGE: &str = "Sorry! Try another movie name";

pub fn join_titles(ranked: &[RankedMovie]) -> String {
    ranked
        .iter()
        .map(|m| m.title.as_str())
        .collect::<Vec<_>>()
        .join(TITLE_SEPARATOR)
}

/// Map a recommendation outcome to its wire string.
pub fn render(outcome: Option<&[RankedMovie]>) -> String {
    match outcome {
        Some(ranked) => join_titles(ranked),
        None => NOT_FOUND_MESSAGE.to_string(),
    }
}
