use crate::corpus::Movie;
use crate::similarity::SimilarityMatrix;
use crate::vectorizer::Vocabulary;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs::{create_dir_all, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

#[derive(Debug, Serialize, Deserialize)]
pub struct MetaFile {
    pub num_movies: u32,
    pub vocabulary_size: u32,
    pub distinct_tokens: u32,
    pub zero_vector_movies: u32,
    pub created_at: String,
    pub version: u32,
}

pub struct IndexPaths {
    pub root: PathBuf,
}

impl IndexPaths {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }
    fn movies(&self) -> PathBuf {
        self.root.join("movies.bin")
    }
    fn vocabulary(&self) -> PathBuf {
        self.root.join("vocabulary.bin")
    }
    fn similarity(&self) -> PathBuf {
        self.root.join("similarity.bin")
    }
    fn meta(&self) -> PathBuf {
        self.root.join("meta.json")
    }
}

pub fn save_movies(paths: &IndexPaths, movies: &[Movie]) -> Result<()> {
    create_dir_all(&paths.root)?;
    let mut f = File::create(paths.movies())?;
    let bytes = bincode::serialize(movies)?;
    f.write_all(&bytes)?;
    Ok(())
}

pub fn load_movies(paths: &IndexPaths) -> Result<Vec<Movie>> {
    let mut f = File::open(paths.movies())?;
    let mut buf = Vec::new();
    f.read_to_end(&mut buf)?;
    let movies = bincode::deserialize(&buf)?;
    Ok(movies)
}

/// The vocabulary is persisted for inspection and rebuild tooling; the
/// serving path never needs it since the matrix is already materialized.
pub fn save_vocabulary(paths: &IndexPaths, vocabulary: &Vocabulary) -> Result<()> {
    create_dir_all(&paths.root)?;
    let mut f = File::create(paths.vocabulary())?;
    let bytes = bincode::serialize(vocabulary.tokens())?;
    f.write_all(&bytes)?;
    Ok(())
}

pub fn load_vocabulary(paths: &IndexPaths) -> Result<Vocabulary> {
    let mut f = File::open(paths.vocabulary())?;
    let mut buf = Vec::new();
    f.read_to_end(&mut buf)?;
    let tokens: Vec<String> = bincode::deserialize(&buf)?;
    Ok(Vocabulary::from_tokens(tokens))
}

pub fn save_similarity(paths: &IndexPaths, matrix: &SimilarityMatrix) -> Result<()> {
    create_dir_all(&paths.root)?;
    let mut f = File::create(paths.similarity())?;
    let bytes = bincode::serialize(matrix)?;
    f.write_all(&bytes)?;
    Ok(())
}

pub fn load_similarity(paths: &IndexPaths) -> Result<SimilarityMatrix> {
    let mut f = File::open(paths.similarity())?;
    let mut buf = Vec::new();
    f.read_to_end(&mut buf)?;
    let matrix = bincode::deserialize(&buf)?;
    Ok(matrix)
}

pub fn save_meta(paths: &IndexPaths, meta: &MetaFile) -> Result<()> {
    create_dir_all(&paths.root)?;
    let mut f = File::create(paths.meta())?;
    let json = serde_json::to_string_pretty(meta)?;
    f.write_all(json.as_bytes())?;
    Ok(())
}

pub fn load_meta(paths: &IndexPaths) -> Result<MetaFile> {
    let mut f = File::open(paths.meta())?;
    let mut buf = String::new();
    f.read_to_string(&mut buf)?;
    let meta: MetaFile = serde_json::from_str(&buf)?;
    Ok(meta)
}

/// Load only what the serving path requires: movies, similarity, meta.
pub fn load_runtime(paths: &IndexPaths) -> Result<(Vec<Movie>, SimilarityMatrix, MetaFile)> {
    let movies = load_movies(paths)?;
    let matrix = load_similarity(paths)?;
    let meta = load_meta(paths)?;
    Ok((movies, matrix, meta))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::Corpus;
    use crate::similarity::SimilarityMatrix;
    use crate::vectorizer::vectorize;
    use tempfile::tempdir;

    #[test]
    fn roundtrip_preserves_index() {
        let corpus = Corpus::from_movies(vec![
            Movie {
                title: "A".into(),
                feature_bag: "action hero gun".into(),
            },
            Movie {
                title: "B".into(),
                feature_bag: "action hero car".into(),
            },
        ])
        .unwrap();
        let v = vectorize(&corpus, 100).unwrap();
        let matrix = SimilarityMatrix::build(&v.vectors);

        let dir = tempdir().unwrap();
        let paths = IndexPaths::new(dir.path());
        save_movies(&paths, corpus.movies()).unwrap();
        save_vocabulary(&paths, &v.vocabulary).unwrap();
        save_similarity(&paths, &matrix).unwrap();
        save_meta(
            &paths,
            &MetaFile {
                num_movies: 2,
                vocabulary_size: v.vocabulary.len() as u32,
                distinct_tokens: v.distinct_tokens as u32,
                zero_vector_movies: 0,
                created_at: "2026-01-01T00:00:00Z".into(),
                version: 1,
            },
        )
        .unwrap();

        let (movies, loaded, meta) = load_runtime(&paths).unwrap();
        assert_eq!(movies.len(), 2);
        assert_eq!(movies[0].title, "A");
        assert_eq!(meta.num_movies, 2);
        assert_eq!(loaded.len(), matrix.len());
        assert!((loaded.score(0, 1) - matrix.score(0, 1)).abs() < 1e-6);

        let vocab = load_vocabulary(&paths).unwrap();
        assert_eq!(vocab.tokens(), v.vocabulary.tokens());
    }
}
