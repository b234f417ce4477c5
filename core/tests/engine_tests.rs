use cinematch_core::persist::{self, IndexPaths, MetaFile};
use cinematch_core::similarity::SimilarityMatrix;
use cinematch_core::tokenizer::capitalize;
use cinematch_core::vectorizer::vectorize;
use cinematch_core::{Corpus, Engine};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;

fn write_corpus(dir: &std::path::Path, rows: &[(&str, &str)]) -> PathBuf {
    let path = dir.join("corpus.jsonl");
    let mut f = std::fs::File::create(&path).unwrap();
    for (title, features) in rows {
        writeln!(
            f,
            "{}",
            serde_json::json!({ "title": title, "features": features })
        )
        .unwrap();
    }
    path
}

const THREE_MOVIES: &[(&str, &str)] = &[
    ("A", "action hero gun"),
    ("B", "action hero car"),
    ("C", "romance drama love"),
];

#[test]
fn end_to_end_example() {
    let dir = tempfile::tempdir().unwrap();
    let engine = Engine::new(write_corpus(dir.path(), THREE_MOVIES));

    let two = engine.recommend("A", 2).unwrap().unwrap();
    assert_eq!(
        two.iter().map(|m| m.title.as_str()).collect::<Vec<_>>(),
        vec!["B", "C"]
    );
    assert!(two[0].score > two[1].score);

    let one = engine.recommend("A", 1).unwrap().unwrap();
    assert_eq!(one.len(), 1);
    assert_eq!(one[0].title, "B");
}

#[test]
fn lookup_is_case_insensitive() {
    let dir = tempfile::tempdir().unwrap();
    let engine = Engine::new(write_corpus(
        dir.path(),
        &[("The Matrix", "action scifi hacker"), ("Heat", "action crime")],
    ));
    let upper = engine.recommend("The Matrix", 5).unwrap().unwrap();
    let lower = engine.recommend("the matrix", 5).unwrap().unwrap();
    assert_eq!(upper, lower);
}

#[test]
fn unknown_title_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let engine = Engine::new(write_corpus(dir.path(), THREE_MOVIES));
    assert!(engine
        .recommend("Not A Real Movie Title", 10)
        .unwrap()
        .is_none());
}

#[test]
fn output_is_bounded_by_corpus_size() {
    let dir = tempfile::tempdir().unwrap();
    let engine = Engine::new(write_corpus(dir.path(), THREE_MOVIES));
    // k larger than the corpus: everything but the query itself
    assert_eq!(engine.recommend("A", 10).unwrap().unwrap().len(), 2);
}

#[test]
fn rebuilds_are_deterministic() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_corpus(
        dir.path(),
        &[
            ("A", "action hero gun"),
            ("B", "action hero car"),
            ("C", "romance drama love"),
            ("D", "action drama war hero"),
            ("E", "gun car chase action"),
        ],
    );
    let first = Engine::new(&path);
    let second = Engine::new(&path);
    for title in ["A", "B", "C", "D", "E"] {
        assert_eq!(
            first.recommend(title, 4).unwrap().unwrap(),
            second.recommend(title, 4).unwrap().unwrap()
        );
    }
}

#[test]
fn suggestions_align_with_corpus_order() {
    let dir = tempfile::tempdir().unwrap();
    let rows = &[("the matrix", "action scifi"), ("HEAT", "action crime")];
    let engine = Engine::new(write_corpus(dir.path(), rows));
    let suggestions = engine.suggestions().unwrap();
    let expected: Vec<String> = rows.iter().map(|(t, _)| capitalize(t)).collect();
    assert_eq!(suggestions, expected);
    assert_eq!(suggestions, vec!["The matrix", "Heat"]);
}

#[test]
fn concurrent_first_calls_build_once() {
    let dir = tempfile::tempdir().unwrap();
    let engine = Arc::new(Engine::new(write_corpus(dir.path(), THREE_MOVIES)));

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let engine = Arc::clone(&engine);
            thread::spawn(move || {
                if i % 2 == 0 {
                    engine.recommend("A", 2).unwrap().unwrap();
                } else {
                    engine.suggestions().unwrap();
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    assert_eq!(engine.build_count(), 1);
}

#[test]
fn prebuilt_engine_matches_lazy_build() {
    let dir = tempfile::tempdir().unwrap();
    let corpus_path = write_corpus(dir.path(), THREE_MOVIES);

    // What the indexer does: build and persist.
    let corpus = Corpus::load(&corpus_path).unwrap();
    let v = vectorize(&corpus, 8000).unwrap();
    let matrix = SimilarityMatrix::build(&v.vectors);
    let index_dir = dir.path().join("index");
    let paths = IndexPaths::new(&index_dir);
    persist::save_movies(&paths, corpus.movies()).unwrap();
    persist::save_vocabulary(&paths, &v.vocabulary).unwrap();
    persist::save_similarity(&paths, &matrix).unwrap();
    persist::save_meta(
        &paths,
        &MetaFile {
            num_movies: corpus.len() as u32,
            vocabulary_size: v.vocabulary.len() as u32,
            distinct_tokens: v.distinct_tokens as u32,
            zero_vector_movies: v.vectors.zero_rows() as u32,
            created_at: "2026-01-01T00:00:00Z".into(),
            version: 1,
        },
    )
    .unwrap();

    let lazy = Engine::new(&corpus_path);
    let prebuilt = Engine::from_prebuilt(&index_dir).unwrap();
    assert_eq!(prebuilt.build_count(), 0);
    for title in ["A", "B", "C"] {
        assert_eq!(
            lazy.recommend(title, 2).unwrap().unwrap(),
            prebuilt.recommend(title, 2).unwrap().unwrap()
        );
    }
    assert_eq!(lazy.suggestions().unwrap(), prebuilt.suggestions().unwrap());
}
