//! Strict parsers for the bracket-delimited list fields of the
//! recommendation-page request.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseListError {
    #[error("expected a bracket-quoted list like [\"a\",\"b\"]")]
    MissingBrackets,

    #[error("invalid number {token:?}")]
    InvalidNumber { token: String },
}

/// Parse the quoted wire format `["a","b"]` into its entries. Anything not
/// shaped as a bracket-quoted list is rejected.
pub fn parse_quoted_list(raw: &str) -> Result<Vec<String>, ParseListError> {
    let raw = raw.trim();
    if raw == "[]" {
        return Ok(Vec::new());
    }
    let inner = raw
        .strip_prefix("[\"")
        .and_then(|s| s.strip_suffix("\"]"))
        .ok_or(ParseListError::MissingBrackets)?;
    Ok(inner.split("\",\"").map(|s| s.to_string()).collect())
}

/// Parse the numeric wire format `[1,2,3]`.
pub fn parse_id_list(raw: &str) -> Result<Vec<i64>, ParseListError> {
    let raw = raw.trim();
    let inner = raw
        .strip_prefix('[')
        .and_then(|s| s.strip_suffix(']'))
        .ok_or(ParseListError::MissingBrackets)?;
    if inner.trim().is_empty() {
        return Ok(Vec::new());
    }
    inner
        .split(',')
        .map(|tok| {
            let tok = tok.trim();
            tok.parse::<i64>()
                .map_err(|_| ParseListError::InvalidNumber {
                    token: tok.to_string(),
                })
        })
        .collect()
}

/// Biography text arrives with literal `\n` and `\"` sequences; restore them.
pub fn unescape_text(text: &str) -> String {
    text.replace("\\n", "\n").replace("\\\"", "\"")
}
