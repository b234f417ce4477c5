use anyhow::Result;
use cinematch_core::corpus::Corpus;
use cinematch_core::persist::{
    save_meta, save_movies, save_similarity, save_vocabulary, IndexPaths, MetaFile,
};
use cinematch_core::similarity::SimilarityMatrix;
use cinematch_core::vectorizer::{vectorize, DEFAULT_MAX_VOCABULARY};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "indexer")]
#[command(about = "Build and persist the movie similarity index", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the index from a corpus file (JSON or JSONL)
    Build {
        /// Corpus file with one movie per row
        #[arg(long)]
        corpus: PathBuf,
        /// Output index directory
        #[arg(long)]
        output: PathBuf,
        /// Keep only the top-N tokens by corpus-wide frequency
        #[arg(long, default_value_t = DEFAULT_MAX_VOCABULARY)]
        max_vocabulary: usize,
    },
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Build {
            corpus,
            output,
            max_vocabulary,
        } => build_index(&corpus, &output, max_vocabulary),
    }
}

fn build_index(corpus_path: &PathBuf, output: &PathBuf, max_vocabulary: usize) -> Result<()> {
    let corpus = Corpus::load(corpus_path)?;
    tracing::info!(num_movies = corpus.len(), "corpus loaded");

    let vectorized = vectorize(&corpus, max_vocabulary)?;
    let zero_vector_movies = vectorized.vectors.zero_rows();
    tracing::info!(
        vocabulary_size = vectorized.vocabulary.len(),
        distinct_tokens = vectorized.distinct_tokens,
        "vocabulary selected"
    );
    if zero_vector_movies > 0 {
        tracing::warn!(
            zero_vector_movies,
            "movies lost every token to the vocabulary cap"
        );
    }

    let matrix = SimilarityMatrix::build(&vectorized.vectors);

    let paths = IndexPaths::new(output);
    save_movies(&paths, corpus.movies())?;
    save_vocabulary(&paths, &vectorized.vocabulary)?;
    save_similarity(&paths, &matrix)?;
    let meta = MetaFile {
        num_movies: corpus.len() as u32,
        vocabulary_size: vectorized.vocabulary.len() as u32,
        distinct_tokens: vectorized.distinct_tokens as u32,
        zero_vector_movies: zero_vector_movies as u32,
        created_at: time::OffsetDateTime::now_utc()
            .format(&time::format_description::well_known::Rfc3339)
            .unwrap_or_else(|_| "".into()),
        version: 1,
    };
    save_meta(&paths, &meta)?;

    tracing::info!(output = %output.display(), "index build complete");
    Ok(())
}
