pub mod corpus;
pub mod engine;
pub mod error;
pub mod persist;
pub mod similarity;
pub mod tokenizer;
pub mod vectorizer;
pub mod wire;

pub use corpus::{Corpus, Movie};
pub use engine::{BuildStats, Engine, RankedMovie};
pub use error::{BuildError, CorpusError};

/// Row index into the corpus; also the row/column index of the similarity matrix.
pub type MovieId = u32;
pub type TokenId = u32;
