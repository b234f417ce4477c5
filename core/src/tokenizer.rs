use unicode_normalization::UnicodeNormalization;

/// Case-fold a string with NFKC normalization and lowercasing.
/// Used both for title lookup keys and for feature-bag tokens.
pub fn fold(text: &str) -> String {
    text.nfkc().collect::<String>().to_lowercase()
}

/// Tokenize a feature bag into normalized tokens, split on Unicode whitespace.
pub fn tokenize(text: &str) -> Vec<String> {
    fold(text)
        .split_whitespace()
        .map(|t| t.to_string())
        .collect()
}

/// Capitalize a title for the suggestion list: first character upper-cased,
/// the remainder lower-cased.
pub fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(|c| c.to_lowercase()))
            .collect(),
        None => String::new(),
    }
}
