//! Word-window chunking and a tf-idf index over the chunk set.
//!
//! The index is fitted once per site and queried with cosine similarity;
//! vectors are l2-normalized at fit time so scoring is a dot product.

use std::collections::HashMap;

/// Split text into non-overlapping windows of `window` whitespace-delimited
/// words, each window re-joined with single spaces. The last window may be
/// shorter. Joining all chunks with spaces recovers the original word
/// sequence.
pub fn chunk_text(text: &str, window: usize) -> Vec<String> {
    let window = window.max(1);
    let words: Vec<&str> = text.split_whitespace().collect();
    words.chunks(window).map(|w| w.join(" ")).collect()
}

/// Lowercased alphanumeric tokens of length >= 2. Single characters and
/// punctuation carry no ranking signal and only widen the vocabulary.
fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| t.chars().count() >= 2)
        .map(|t| t.to_string())
        .collect()
}

fn l2_normalize(v: &mut [f32]) {
    let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in v.iter_mut() {
            *x /= norm;
        }
    }
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// Term-frequency / inverse-document-frequency vector space over a fixed
/// chunk set. Uses smoothed idf (`ln((1+n)/(1+df)) + 1`) so terms present in
/// every chunk still contribute.
#[derive(Debug)]
pub struct TfIdfIndex {
    vocab: HashMap<String, usize>,
    idf: Vec<f32>,
    vectors: Vec<Vec<f32>>,
}

impl TfIdfIndex {
    /// Fit the weighting model and chunk vectors in one pass over the chunks.
    pub fn fit(chunks: &[String]) -> Self {
        let tokenized: Vec<Vec<String>> = chunks.iter().map(|c| tokenize(c)).collect();

        // Vocabulary in sorted order for deterministic column assignment.
        let mut terms: Vec<&String> = tokenized.iter().flatten().collect();
        terms.sort();
        terms.dedup();
        let vocab: HashMap<String, usize> = terms
            .into_iter()
            .enumerate()
            .map(|(i, t)| (t.clone(), i))
            .collect();

        let mut df = vec![0usize; vocab.len()];
        for tokens in &tokenized {
            let mut seen = vec![false; vocab.len()];
            for t in tokens {
                let col = vocab[t];
                if !seen[col] {
                    seen[col] = true;
                    df[col] += 1;
                }
            }
        }

        let n = chunks.len() as f32;
        let idf: Vec<f32> = df
            .iter()
            .map(|&d| ((1.0 + n) / (1.0 + d as f32)).ln() + 1.0)
            .collect();

        let vectors = tokenized
            .iter()
            .map(|tokens| {
                let mut v = term_counts(tokens, &vocab);
                for (col, x) in v.iter_mut().enumerate() {
                    *x *= idf[col];
                }
                l2_normalize(&mut v);
                v
            })
            .collect();

        Self { vocab, idf, vectors }
    }

    /// Chunk indices ranked by cosine similarity to `query`, best first,
    /// at most `k` of them. Ties keep original chunk order.
    pub fn rank(&self, query: &str, k: usize) -> Vec<usize> {
        if self.vectors.is_empty() || k == 0 {
            return Vec::new();
        }

        let mut q = term_counts(&tokenize(query), &self.vocab);
        for (col, x) in q.iter_mut().enumerate() {
            *x *= self.idf[col];
        }
        l2_normalize(&mut q);

        let scores: Vec<f32> = self.vectors.iter().map(|v| dot(&q, v)).collect();

        let mut order: Vec<usize> = (0..scores.len()).collect();
        // Stable sort: equal scores keep ascending chunk order.
        order.sort_by(|&a, &b| {
            scores[b]
                .partial_cmp(&scores[a])
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        order.truncate(k);
        order
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }
}

fn term_counts(tokens: &[String], vocab: &HashMap<String, usize>) -> Vec<f32> {
    let mut counts = vec![0.0f32; vocab.len()];
    for t in tokens {
        if let Some(&col) = vocab.get(t) {
            counts[col] += 1.0;
        }
    }
    counts
}
