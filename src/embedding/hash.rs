//! Feature-hashing embedder.
//!
//! Each lowercase alphanumeric token is hashed with SHA-256 into one of N
//! signed buckets, and the result is L2-normalized. Texts sharing words end
//! up with positive cosine similarity; there is no notion of synonyms.

use sha2::{Digest, Sha256};

use super::Embedder;
use crate::error::AppError;

pub struct HashEmbedder {
    dimensions: usize,
    name: String,
}

impl HashEmbedder {
    pub fn new(dimensions: usize) -> Result<Self, AppError> {
        if dimensions == 0 {
            return Err(AppError::Embedding(
                "hash embedder needs at least one dimension".to_string(),
            ));
        }
        Ok(Self {
            dimensions,
            name: format!("hash-{}", dimensions),
        })
    }
}

impl Embedder for HashEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>, AppError> {
        let mut vector = vec![0.0f32; self.dimensions];

        for token in tokens(text) {
            let digest = Sha256::digest(token.as_bytes());
            let mut bucket_bytes = [0u8; 8];
            bucket_bytes.copy_from_slice(&digest[..8]);
            let bucket = (u64::from_le_bytes(bucket_bytes) % self.dimensions as u64) as usize;
            let sign = if digest[8] & 1 == 0 { 1.0 } else { -1.0 };
            vector[bucket] += sign;
        }

        let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            vector.iter_mut().for_each(|v| *v /= norm);
        }
        Ok(vector)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn model_name(&self) -> &str {
        &self.name
    }
}

fn tokens(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cosine(a: &[f32], b: &[f32]) -> f32 {
        a.iter().zip(b).map(|(x, y)| x * y).sum()
    }

    #[test]
    fn test_deterministic_and_sized() {
        let embedder = HashEmbedder::new(64).unwrap();
        let a = embedder.embed("Whisper on port 10300").unwrap();
        let b = embedder.embed("Whisper on port 10300").unwrap();
        assert_eq!(a.len(), 64);
        assert_eq!(a, b);
    }

    #[test]
    fn test_case_and_punctuation_insensitive() {
        let embedder = HashEmbedder::new(128).unwrap();
        let a = embedder.embed("NPU load!").unwrap();
        let b = embedder.embed("npu, load").unwrap();
        assert!((cosine(&a, &b) - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_shared_words_score_higher() {
        let embedder = HashEmbedder::new(4096).unwrap();
        let doc = embedder.embed("Voice Pipeline\n\nWhisper on port 10300").unwrap();
        let related = embedder.embed("speech to text port").unwrap();
        let unrelated = embedder.embed("gpio camera ffmpeg").unwrap();
        assert!(cosine(&doc, &related) > cosine(&doc, &unrelated));
    }

    #[test]
    fn test_empty_text_is_zero_vector() {
        let embedder = HashEmbedder::new(8).unwrap();
        assert!(embedder.embed("  ").unwrap().iter().all(|v| *v == 0.0));
    }

    #[test]
    fn test_zero_dimensions_rejected() {
        assert!(HashEmbedder::new(0).is_err());
    }
}
