use crate::error::CorpusError;
use crate::tokenizer::fold;
use crate::wire::TITLE_SEPARATOR;
use crate::MovieId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

/// One corpus row: a title and its concatenated feature-bag token stream
/// (genres, cast, director, keywords joined into one string).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Movie {
    pub title: String,
    pub feature_bag: String,
}

#[derive(Debug, Deserialize)]
struct InputRow {
    #[serde(alias = "movie_title")]
    title: String,
    #[serde(alias = "comb")]
    features: String,
}

/// Ordered, read-only movie corpus with a case-insensitive title lookup.
#[derive(Debug)]
pub struct Corpus {
    movies: Vec<Movie>,
    by_title: HashMap<String, MovieId>,
}

impl Corpus {
    /// Load a corpus from a JSON Lines file (one row per line) or a single
    /// JSON array, chosen by file extension.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, CorpusError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| CorpusError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let rows = if path.extension().and_then(|s| s.to_str()) == Some("jsonl") {
            read_jsonl(file, path)?
        } else {
            read_json(file, path)?
        };

        let movies = rows
            .into_iter()
            .map(|row| Movie {
                title: row.title,
                feature_bag: row.features,
            })
            .collect();
        Self::from_movies(movies)
    }

    /// Build a corpus from already-materialized rows, validating titles.
    /// Duplicate titles are rejected rather than resolved last-wins.
    pub fn from_movies(movies: Vec<Movie>) -> Result<Self, CorpusError> {
        if movies.is_empty() {
            return Err(CorpusError::Empty);
        }
        let mut by_title = HashMap::with_capacity(movies.len());
        for (id, movie) in movies.iter().enumerate() {
            if movie.title.contains(TITLE_SEPARATOR) {
                return Err(CorpusError::SeparatorInTitle {
                    title: movie.title.clone(),
                    separator: TITLE_SEPARATOR,
                });
            }
            if by_title.insert(fold(&movie.title), id as MovieId).is_some() {
                return Err(CorpusError::DuplicateTitle {
                    title: movie.title.clone(),
                });
            }
        }
        Ok(Self { movies, by_title })
    }

    /// Resolve a title to its row id by exact case-insensitive match.
    pub fn lookup(&self, title: &str) -> Option<MovieId> {
        self.by_title.get(&fold(title)).copied()
    }

    pub fn movies(&self) -> &[Movie] {
        &self.movies
    }

    pub fn len(&self) -> usize {
        self.movies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.movies.is_empty()
    }
}

fn read_jsonl(file: File, path: &Path) -> Result<Vec<InputRow>, CorpusError> {
    let reader = BufReader::new(file);
    let mut rows = Vec::new();
    for (line_no, line) in reader.lines().enumerate() {
        let line = line.map_err(|source| CorpusError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        if line.trim().is_empty() {
            continue;
        }
        let row = serde_json::from_str(&line).map_err(|source| CorpusError::MalformedRow {
            row: line_no + 1,
            source,
        })?;
        rows.push(row);
    }
    Ok(rows)
}

fn read_json(mut file: File, path: &Path) -> Result<Vec<InputRow>, CorpusError> {
    let mut buf = String::new();
    file.read_to_string(&mut buf).map_err(|source| CorpusError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&buf).map_err(|source| CorpusError::MalformedRow { row: 1, source })
}
