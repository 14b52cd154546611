//! Text embedding
//!
//! The embedding model itself is an external collaborator reached over
//! HTTP; this module owns the trait seam, the error taxonomy, and the
//! process-wide cache. Every vector handed to the rest of the system is
//! unit-normalized, which the similarity mapping in the concept bridge
//! depends on.

pub mod cache;
pub mod client;

pub use cache::EmbeddingCache;
pub use client::{EncoderProvider, HttpEncoder};

use thiserror::Error;

/// Embedding errors
#[derive(Error, Debug)]
pub enum EmbedError {
    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("empty embedding returned for '{0}'")]
    EmptyEmbedding(String),
}

pub type EmbedResult<T> = Result<T, EmbedError>;

/// Turns a text label into a fixed-length vector
///
/// Implementations must be deterministic for a given label; the cache
/// relies on redundant encodes being idempotent. Normalization is handled
/// by the cache, not the implementation.
pub trait TextEncoder: Send + Sync {
    fn encode(&self, text: &str) -> EmbedResult<Vec<f32>>;
}

/// Scale a vector to unit length in place; zero vectors are left as-is
pub fn normalize(vector: &mut [f32]) {
    let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm > 0.0 {
        for v in vector.iter_mut() {
            *v /= norm;
        }
    }
}
