use crate::vectorizer::FeatureVectors;
use crate::MovieId;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

/// All-pairs cosine similarity over binary presence vectors, stored sparsely:
/// each row keeps only its nonzero entries, sorted by movie id. The diagonal
/// is 1 by convention, including for all-zero vectors; off-diagonal entries
/// involving an all-zero vector are 0 and never materialized.
#[derive(Serialize, Deserialize)]
pub struct SimilarityMatrix {
    rows: Vec<Vec<(MovieId, f32)>>,
}

impl SimilarityMatrix {
    /// Build the full matrix. For binary vectors the cosine reduces to
    /// `|a ∩ b| / (sqrt(|a|) * sqrt(|b|))`, computed through per-token
    /// postings so only co-occurring pairs are ever touched.
    pub fn build(vectors: &FeatureVectors) -> Self {
        let n = vectors.len();
        let mut postings: Vec<Vec<MovieId>> = vec![Vec::new(); vectors.vocabulary_size()];
        for (i, row) in vectors.rows().iter().enumerate() {
            for &t in row {
                postings[t as usize].push(i as MovieId);
            }
        }

        let norms: Vec<f32> = vectors
            .rows()
            .iter()
            .map(|r| (r.len() as f32).sqrt())
            .collect();

        let mut rows = Vec::with_capacity(n);
        for (i, tokens) in vectors.rows().iter().enumerate() {
            let mut shared: HashMap<MovieId, u32> = HashMap::new();
            for &t in tokens {
                for &j in &postings[t as usize] {
                    *shared.entry(j).or_insert(0) += 1;
                }
            }
            let mut row: Vec<(MovieId, f32)> = shared
                .into_iter()
                .filter(|&(j, _)| j as usize != i)
                .map(|(j, count)| (j, count as f32 / (norms[i] * norms[j as usize])))
                .collect();
            row.push((i as MovieId, 1.0));
            row.sort_unstable_by_key(|&(j, _)| j);
            rows.push(row);
        }
        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Similarity of a pair; zero for entries not materialized.
    pub fn score(&self, i: MovieId, j: MovieId) -> f32 {
        let row = &self.rows[i as usize];
        match row.binary_search_by_key(&j, |&(id, _)| id) {
            Ok(pos) => row[pos].1,
            Err(_) => 0.0,
        }
    }

    /// Top-k neighbors of a movie, excluding the movie itself, ordered by
    /// descending similarity with ties broken by corpus row order. Partial
    /// selection via a bounded heap rather than a full sort; rows with fewer
    /// than `k` nonzero neighbors are padded with zero-score movies in corpus
    /// order so the result always has `min(k, n - 1)` entries.
    pub fn top_k(&self, id: MovieId, k: usize) -> Vec<(MovieId, f32)> {
        let row = &self.rows[id as usize];
        let mut heap: BinaryHeap<Candidate> = BinaryHeap::with_capacity(k + 1);
        for &(j, score) in row {
            if j == id {
                continue;
            }
            heap.push(Candidate { id: j, score });
            if heap.len() > k {
                heap.pop();
            }
        }

        let mut top: Vec<Candidate> = heap.into_vec();
        top.sort_unstable_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.id.cmp(&b.id))
        });
        let mut out: Vec<(MovieId, f32)> = top.into_iter().map(|c| (c.id, c.score)).collect();

        if out.len() < k {
            for j in 0..self.rows.len() as MovieId {
                if out.len() == k {
                    break;
                }
                if row.binary_search_by_key(&j, |&(id, _)| id).is_err() {
                    out.push((j, 0.0));
                }
            }
        }
        out
    }
}

#[derive(Clone, Copy)]
struct Candidate {
    id: MovieId,
    score: f32,
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Candidate {}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// Heap order: the worst candidate (lowest score, then latest corpus row)
// compares greatest, so it sits on top of the max-heap and is evicted first.
impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .score
            .partial_cmp(&self.score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| self.id.cmp(&other.id))
    }
}
