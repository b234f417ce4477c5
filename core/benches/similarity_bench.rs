use cinematch_core::corpus::{Corpus, Movie};
use cinematch_core::similarity::SimilarityMatrix;
use cinematch_core::vectorizer::vectorize;
use criterion::{criterion_group, criterion_main, Criterion};

const TOKEN_POOL: &[&str] = &[
    "action", "drama", "comedy", "thriller", "romance", "war", "space", "heist", "noir", "hero",
    "detective", "alien", "robot", "chase", "family", "ocean", "desert", "city", "night", "winter",
];

fn synthetic_corpus(n: usize) -> Corpus {
    let movies = (0..n)
        .map(|i| {
            let bag: Vec<&str> = (0..6)
                .map(|j| TOKEN_POOL[(i * 7 + j * 3) % TOKEN_POOL.len()])
                .collect();
            Movie {
                title: format!("movie {i}"),
                feature_bag: bag.join(" "),
            }
        })
        .collect();
    Corpus::from_movies(movies).expect("nonempty corpus")
}

fn bench_build(c: &mut Criterion) {
    let corpus = synthetic_corpus(500);
    c.bench_function("build_similarity_500", |b| {
        b.iter(|| {
            let v = vectorize(&corpus, 8000).expect("vocabulary");
            SimilarityMatrix::build(&v.vectors)
        })
    });
}

fn bench_top_k(c: &mut Criterion) {
    let corpus = synthetic_corpus(500);
    let v = vectorize(&corpus, 8000).expect("vocabulary");
    let matrix = SimilarityMatrix::build(&v.vectors);
    c.bench_function("top_k_10_of_500", |b| b.iter(|| matrix.top_k(250, 10)));
}

criterion_group!(benches, bench_build, bench_top_k);
criterion_main!(benches);
