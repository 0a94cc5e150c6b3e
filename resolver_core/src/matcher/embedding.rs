//! Embedding backend abstraction for the dense semantic tier.

/// Produces a dense vector for a phrase.
///
/// Returning `None` models an unavailable backend: the dense tier then
/// contributes score 0 and control falls through to the lexical tier.
pub trait Embedder: Send + Sync {
    /// Embed a phrase, or `None` when the backend is unavailable.
    fn embed(&self, text: &str) -> Option<Vec<f32>>;
}

/// Deterministic hash-based word embeddings.
///
/// A phrase vector is the L2-normalized average of its word vectors, so
/// phrases sharing words land close together under cosine similarity. Same
/// text always yields the same vector, which keeps matching reproducible
/// without an external model.
#[derive(Debug, Clone)]
pub struct HashEmbedder {
    dimensions: usize,
}

impl HashEmbedder {
    /// Create an embedder with the given vector width.
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions }
    }

    fn word_vector(&self, word: &str) -> Vec<f32> {
        let bytes = word.as_bytes();
        let mut vector = vec![0.0f32; self.dimensions];
        for (i, value) in vector.iter_mut().enumerate() {
            let byte = bytes[i % bytes.len().max(1)];
            *value = ((byte as usize * 31 + i * 17) % 256) as f32 / 255.0 - 0.5;
        }
        normalize(&mut vector);
        vector
    }
}

impl Default for HashEmbedder {
    fn default() -> Self {
        Self::new(64)
    }
}

impl Embedder for HashEmbedder {
    fn embed(&self, text: &str) -> Option<Vec<f32>> {
        let words: Vec<&str> = text
            .split_whitespace()
            .filter(|word| !word.is_empty())
            .collect();
        if words.is_empty() {
            return None;
        }

        let mut sum = vec![0.0f32; self.dimensions];
        for word in &words {
            let vector = self.word_vector(&word.to_lowercase());
            for (acc, value) in sum.iter_mut().zip(vector) {
                *acc += value;
            }
        }
        for value in sum.iter_mut() {
            *value /= words.len() as f32;
        }
        normalize(&mut sum);
        Some(sum)
    }
}

/// An always-unavailable backend, for degraded-mode operation and tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullEmbedder;

impl Embedder for NullEmbedder {
    fn embed(&self, _text: &str) -> Option<Vec<f32>> {
        None
    }
}

/// Cosine similarity between two equal-length vectors, clamped to [0, 1].
pub fn cosine(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a <= f32::EPSILON || norm_b <= f32::EPSILON {
        return 0.0;
    }
    (dot / (norm_a * norm_b)).clamp(0.0, 1.0)
}

fn normalize(vector: &mut [f32]) {
    // f64 accumulation avoids drift across wide vectors.
    let magnitude = vector
        .iter()
        .map(|x| (*x as f64) * (*x as f64))
        .sum::<f64>()
        .sqrt() as f32;
    if magnitude > 1e-10 {
        for value in vector.iter_mut() {
            *value /= magnitude;
        }
    }
}
