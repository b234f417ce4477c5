use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CorpusError {
    #[error("failed to read corpus file {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed corpus row {row}")]
    MalformedRow {
        row: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("corpus contains no movies")]
    Empty,

    #[error("duplicate movie title {title:?}")]
    DuplicateTitle { title: String },

    #[error("movie title {title:?} contains the reserved separator {separator:?}")]
    SeparatorInTitle { title: String, separator: &'static str },
}

#[derive(Debug, Error)]
pub enum BuildError {
    #[error(transparent)]
    Corpus(#[from] CorpusError),

    #[error("vocabulary is empty after frequency filtering")]
    EmptyVocabulary,
}
