use crate::corpus::Corpus;
use crate::error::BuildError;
use crate::persist::{self, IndexPaths};
use crate::similarity::SimilarityMatrix;
use crate::tokenizer::capitalize;
use crate::vectorizer::{vectorize, DEFAULT_MAX_VOCABULARY};
use parking_lot::RwLock;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// A recommendation: a title and its similarity to the queried movie.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedMovie {
    pub title: String,
    pub score: f32,
}

/// Counters reported after an index build.
#[derive(Debug, Clone, Copy)]
pub struct BuildStats {
    pub num_movies: usize,
    pub vocabulary_size: usize,
    pub distinct_tokens: usize,
    pub zero_vector_movies: usize,
}

/// Everything derived from one pass over the corpus: the similarity matrix
/// and the capitalized suggestion list, index-aligned with corpus row order.
struct Index {
    corpus: Corpus,
    matrix: SimilarityMatrix,
    suggestions: Vec<String>,
    stats: BuildStats,
}

impl Index {
    fn assemble(corpus: Corpus, matrix: SimilarityMatrix, stats: BuildStats) -> Self {
        let suggestions = corpus
            .movies()
            .iter()
            .map(|m| capitalize(&m.title))
            .collect();
        Self {
            corpus,
            matrix,
            suggestions,
            stats,
        }
    }
}

enum Source {
    CorpusFile {
        path: PathBuf,
        max_vocabulary: usize,
    },
    Preloaded,
}

/// The recommendation service. Owns the lazily-built index and guards the
/// one-time build so concurrent first requests run it exactly once; every
/// later call is a pure read against the shared, immutable index.
pub struct Engine {
    source: Source,
    state: RwLock<Option<Arc<Index>>>,
    builds: AtomicU64,
}

impl Engine {
    /// Engine that builds its index from a corpus file on first use.
    pub fn from_corpus<P: AsRef<Path>>(path: P, max_vocabulary: usize) -> Self {
        Self {
            source: Source::CorpusFile {
                path: path.as_ref().to_path_buf(),
                max_vocabulary,
            },
            state: RwLock::new(None),
            builds: AtomicU64::new(0),
        }
    }

    /// Engine that builds from a corpus file with the default vocabulary cap.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self::from_corpus(path, DEFAULT_MAX_VOCABULARY)
    }

    /// Engine backed by an index directory written by the indexer. The index
    /// is loaded eagerly; no in-process build ever runs.
    pub fn from_prebuilt<P: AsRef<Path>>(dir: P) -> anyhow::Result<Self> {
        let paths = IndexPaths::new(dir.as_ref());
        let (movies, matrix, meta) = persist::load_runtime(&paths)?;
        let corpus = Corpus::from_movies(movies)?;
        let stats = BuildStats {
            num_movies: meta.num_movies as usize,
            vocabulary_size: meta.vocabulary_size as usize,
            distinct_tokens: meta.distinct_tokens as usize,
            zero_vector_movies: meta.zero_vector_movies as usize,
        };
        Ok(Self {
            source: Source::Preloaded,
            state: RwLock::new(Some(Arc::new(Index::assemble(corpus, matrix, stats)))),
            builds: AtomicU64::new(0),
        })
    }

    /// Top-k recommendations for a title. `Ok(None)` means the title is not
    /// in the corpus, which is a normal outcome rather than an error.
    pub fn recommend(&self, title: &str, k: usize) -> Result<Option<Vec<RankedMovie>>, BuildError> {
        let index = self.index()?;
        let Some(id) = index.corpus.lookup(title) else {
            return Ok(None);
        };
        let ranked = index
            .matrix
            .top_k(id, k)
            .into_iter()
            .map(|(j, score)| RankedMovie {
                title: index.corpus.movies()[j as usize].title.clone(),
                score,
            })
            .collect();
        Ok(Some(ranked))
    }

    /// Capitalized titles in corpus order, for client-side autocomplete.
    pub fn suggestions(&self) -> Result<Vec<String>, BuildError> {
        Ok(self.index()?.suggestions.clone())
    }

    pub fn stats(&self) -> Result<BuildStats, BuildError> {
        Ok(self.index()?.stats)
    }

    /// Force the one-time build now instead of on the first request.
    pub fn warm(&self) -> Result<(), BuildError> {
        self.index().map(|_| ())
    }

    /// How many in-process builds have run. At most 1 for the whole process
    /// lifetime, regardless of how many callers raced the first request.
    pub fn build_count(&self) -> u64 {
        self.builds.load(Ordering::SeqCst)
    }

    /// Build-if-absent behind a double-checked lock; concurrent first calls
    /// run the build once. A failed build is not cached, the next call
    /// retries.
    fn index(&self) -> Result<Arc<Index>, BuildError> {
        if let Some(index) = self.state.read().as_ref() {
            return Ok(Arc::clone(index));
        }
        let mut guard = self.state.write();
        if let Some(index) = guard.as_ref() {
            return Ok(Arc::clone(index));
        }
        let index = match &self.source {
            Source::CorpusFile {
                path,
                max_vocabulary,
            } => Arc::new(build_index(path, *max_vocabulary)?),
            // Preloaded engines are constructed with a populated state.
            Source::Preloaded => unreachable!("preloaded engine has no index"),
        };
        self.builds.fetch_add(1, Ordering::SeqCst);
        *guard = Some(Arc::clone(&index));
        Ok(index)
    }
}

fn build_index(path: &Path, max_vocabulary: usize) -> Result<Index, BuildError> {
    let corpus = Corpus::load(path)?;
    let vectorized = vectorize(&corpus, max_vocabulary)?;
    let matrix = SimilarityMatrix::build(&vectorized.vectors);
    let stats = BuildStats {
        num_movies: corpus.len(),
        vocabulary_size: vectorized.vocabulary.len(),
        distinct_tokens: vectorized.distinct_tokens,
        zero_vector_movies: vectorized.vectors.zero_rows(),
    };
    tracing::info!(
        num_movies = stats.num_movies,
        vocabulary_size = stats.vocabulary_size,
        distinct_tokens = stats.distinct_tokens,
        zero_vector_movies = stats.zero_vector_movies,
        "similarity index built"
    );
    if stats.zero_vector_movies > 0 {
        tracing::warn!(
            zero_vector_movies = stats.zero_vector_movies,
            "movies with no vocabulary tokens can only receive zero-similarity recommendations"
        );
    }
    Ok(Index::assemble(corpus, matrix, stats))
}
