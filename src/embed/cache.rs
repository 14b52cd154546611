//! Process-wide embedding cache
//!
//! Eviction-free memoization keyed by the exact label text. Lifetime is
//! the owning reasoner's lifetime; label vocabularies are small enough
//! that unbounded growth is the intended policy. Concurrent misses for
//! the same label may both compute; the second store wins, which is
//! harmless because the encoder is deterministic per label.

use super::{normalize, EmbedResult, TextEncoder};
use rustc_hash::FxHashMap;
use std::sync::{Arc, RwLock};

/// Label -> unit-normalized vector cache
#[derive(Debug, Default)]
pub struct EmbeddingCache {
    entries: RwLock<FxHashMap<String, Arc<Vec<f32>>>>,
}

impl EmbeddingCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of cached labels
    pub fn len(&self) -> usize {
        self.entries.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Encode through the cache, unit-normalizing on first computation
    pub fn encode(&self, encoder: &dyn TextEncoder, text: &str) -> EmbedResult<Arc<Vec<f32>>> {
        if let Some(hit) = self.entries.read().unwrap().get(text) {
            return Ok(Arc::clone(hit));
        }

        let mut vector = encoder.encode(text)?;
        normalize(&mut vector);
        let vector = Arc::new(vector);
        self.entries
            .write()
            .unwrap()
            .insert(text.to_string(), Arc::clone(&vector));
        Ok(vector)
    }
}
