use crate::corpus::Corpus;
use crate::error::BuildError;
use crate::tokenizer::tokenize;
use crate::TokenId;
use std::collections::HashMap;

/// Fixed mapping from token to column index, bounded to the top-N tokens
/// by corpus-wide occurrence count. Never updated after build.
pub struct Vocabulary {
    tokens: Vec<String>,
    ids: HashMap<String, TokenId>,
}

impl Vocabulary {
    pub fn id(&self, token: &str) -> Option<TokenId> {
        self.ids.get(token).copied()
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Rebuild the id map from a persisted token list. Column order is the
    /// list order, which save/load preserves.
    pub fn from_tokens(tokens: Vec<String>) -> Self {
        let ids = tokens
            .iter()
            .enumerate()
            .map(|(i, t)| (t.clone(), i as TokenId))
            .collect();
        Self { tokens, ids }
    }
}

/// Binary presence vectors, one row per movie, stored as the sorted set of
/// vocabulary token ids appearing in the movie's feature bag.
pub struct FeatureVectors {
    vocabulary_size: usize,
    rows: Vec<Vec<TokenId>>,
}

impl FeatureVectors {
    pub fn rows(&self) -> &[Vec<TokenId>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary_size
    }

    /// Movies whose vector is all-zero because every token of their feature
    /// bag fell outside the bounded vocabulary.
    pub fn zero_rows(&self) -> usize {
        self.rows.iter().filter(|r| r.is_empty()).count()
    }
}

pub struct Vectorized {
    pub vocabulary: Vocabulary,
    pub vectors: FeatureVectors,
    /// Distinct tokens seen across the corpus before the vocabulary cap.
    pub distinct_tokens: usize,
}

/// Default vocabulary bound, matching the corpus this was sized for.
pub const DEFAULT_MAX_VOCABULARY: usize = 8000;

/// Build the vocabulary and the binary presence vectors in one pass over the
/// corpus. Token multiplicity within a feature bag does not matter, only
/// presence. Ties in corpus-wide frequency break lexicographically and column
/// ids are assigned in lexicographic order, so two builds of the same corpus
/// are identical.
pub fn vectorize(corpus: &Corpus, max_tokens: usize) -> Result<Vectorized, BuildError> {
    let tokenized: Vec<Vec<String>> = corpus
        .movies()
        .iter()
        .map(|m| tokenize(&m.feature_bag))
        .collect();

    let mut counts: HashMap<&str, u64> = HashMap::new();
    for tokens in &tokenized {
        for t in tokens {
            *counts.entry(t.as_str()).or_insert(0) += 1;
        }
    }
    let distinct_tokens = counts.len();

    let mut ranked: Vec<(&str, u64)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    ranked.truncate(max_tokens);

    let mut tokens: Vec<String> = ranked.into_iter().map(|(t, _)| t.to_string()).collect();
    if tokens.is_empty() {
        return Err(BuildError::EmptyVocabulary);
    }
    tokens.sort_unstable();
    let vocabulary = Vocabulary::from_tokens(tokens);

    let rows = tokenized
        .iter()
        .map(|movie_tokens| {
            let mut row: Vec<TokenId> = movie_tokens
                .iter()
                .filter_map(|t| vocabulary.id(t))
                .collect();
            row.sort_unstable();
            row.dedup();
            row
        })
        .collect();

    Ok(Vectorized {
        vectors: FeatureVectors {
            vocabulary_size: vocabulary.len(),
            rows,
        },
        vocabulary,
        distinct_tokens,
    })
}
