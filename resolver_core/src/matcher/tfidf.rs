//! Sparse lexical tier: a TF-IDF vector space over the vibe keys.

use std::collections::HashMap;

/// TF-IDF index over word unigrams, bigrams, and trigrams.
///
/// Built once from the knowledge base keys at matcher construction time;
/// queries are scored by cosine similarity against the indexed documents.
#[derive(Debug, Clone, Default)]
pub struct TfidfIndex {
    /// Ngram -> vocabulary slot.
    vocabulary: HashMap<String, usize>,

    /// Smoothed inverse document frequency per vocabulary slot.
    idf: Vec<f32>,

    /// L2-normalized sparse document vectors, one per indexed key.
    documents: Vec<HashMap<usize, f32>>,
}

impl TfidfIndex {
    /// Build the index from the given documents (vibe keys).
    pub fn fit<S: AsRef<str>>(documents: &[S]) -> Self {
        let tokenized: Vec<Vec<String>> = documents
            .iter()
            .map(|doc| ngrams(doc.as_ref()))
            .collect();

        let mut vocabulary: HashMap<String, usize> = HashMap::new();
        let mut document_frequency: Vec<usize> = Vec::new();

        for tokens in &tokenized {
            let mut seen: Vec<usize> = Vec::new();
            for token in tokens {
                let slot = *vocabulary.entry(token.clone()).or_insert_with(|| {
                    document_frequency.push(0);
                    document_frequency.len() - 1
                });
                if !seen.contains(&slot) {
                    document_frequency[slot] += 1;
                    seen.push(slot);
                }
            }
        }

        let n = tokenized.len() as f32;
        let idf: Vec<f32> = document_frequency
            .iter()
            .map(|&df| ((1.0 + n) / (1.0 + df as f32)).ln() + 1.0)
            .collect();

        let mut index = Self {
            vocabulary,
            idf,
            documents: Vec::with_capacity(tokenized.len()),
        };
        for tokens in &tokenized {
            let vector = index.vectorize(tokens);
            index.documents.push(vector);
        }
        index
    }

    /// Best-matching document index and cosine score for a query phrase.
    pub fn best_match(&self, phrase: &str) -> Option<(usize, f32)> {
        if self.documents.is_empty() {
            return None;
        }
        let query = self.vectorize(&ngrams(phrase));
        if query.is_empty() {
            return None;
        }

        let mut best: Option<(usize, f32)> = None;
        for (index, document) in self.documents.iter().enumerate() {
            let score = sparse_dot(&query, document);
            if best.map_or(true, |(_, b)| score > b) {
                best = Some((index, score));
            }
        }
        best.filter(|(_, score)| *score > 0.0)
    }

    /// Number of indexed documents.
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Whether the index is empty.
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Build an L2-normalized TF-IDF vector for a token list.
    fn vectorize(&self, tokens: &[String]) -> HashMap<usize, f32> {
        let mut counts: HashMap<usize, f32> = HashMap::new();
        for token in tokens {
            if let Some(&slot) = self.vocabulary.get(token) {
                *counts.entry(slot).or_default() += 1.0;
            }
        }
        for (slot, count) in counts.iter_mut() {
            *count *= self.idf[*slot];
        }

        let norm: f32 = counts.values().map(|v| v * v).sum::<f32>().sqrt();
        if norm > f32::EPSILON {
            for value in counts.values_mut() {
                *value /= norm;
            }
        }
        counts
    }
}

/// Lowercased word unigrams, bigrams, and trigrams of a phrase.
fn ngrams(text: &str) -> Vec<String> {
    let words: Vec<String> = text
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric() && c != '\'' && c != '-')
        .filter(|w| !w.is_empty())
        .map(str::to_string)
        .collect();

    let mut grams = Vec::new();
    for size in 1..=3usize {
        if words.len() < size {
            break;
        }
        for window in words.windows(size) {
            grams.push(window.join(" "));
        }
    }
    grams
}

/// Dot product of two sparse vectors; cosine when both are normalized.
fn sparse_dot(a: &HashMap<usize, f32>, b: &HashMap<usize, f32>) -> f32 {
    let (small, large) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    small
        .iter()
        .filter_map(|(slot, value)| large.get(slot).map(|other| value * other))
        .sum()
}
