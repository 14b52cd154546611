//! The query-time semantic path reasoning engine
//!
//! Control flow per query: terminology normalization -> evidence
//! retrieval -> concept bridging on both sides -> path discovery and
//! ranking -> fallback synthesis when nothing fully connects ->
//! narrative rendering.

pub mod bridge;
pub mod engine;
pub mod fallback;
pub mod narrate;
pub mod paths;

pub use bridge::{BridgeError, BridgeResult, ConceptBridge, EvidenceBridges, SimilarityMatch};
pub use engine::{ArtifactPaths, PathReasoner, ReasonError, ReasonResult};
pub use fallback::{
    FallbackChain, FALLBACK_AE_PREFIX, NO_CONCEPT, NO_EVIDENCE_AE, NO_EVIDENCE_DRUG,
};
pub use narrate::{Narrative, Narrator};
pub use paths::{CandidateChain, RankedChain};

use serde::{Deserialize, Serialize};

/// Tuning knobs for a query
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReasonerConfig {
    /// Neighbors requested per bridged label
    pub neighbors: usize,
    /// Minimum similarity for a bridge to be retained
    pub similarity_floor: f32,
    /// Ranked chains kept after scoring
    pub max_paths: usize,
    /// Fallback entries per channel (drug side) / concepts scanned per
    /// term (term side)
    pub max_fallback: usize,
}

impl Default for ReasonerConfig {
    fn default() -> Self {
        Self {
            neighbors: 5,
            similarity_floor: 0.7,
            max_paths: 5,
            max_fallback: 3,
        }
    }
}

/// Everything a query returns
///
/// Ranked chains and fallback chains are separate channels; when
/// `fully_connected` is true the fallback channels are empty, and when it
/// is false the ranked list is empty and narratives cover the fallbacks
/// (drug-side entries first).
#[derive(Debug, Clone, Serialize)]
pub struct QueryOutcome {
    pub fully_connected: bool,
    pub ranked: Vec<RankedChain>,
    pub drug_fallback: Vec<FallbackChain>,
    pub term_fallback: Vec<FallbackChain>,
    pub narratives: Vec<Narrative>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ReasonerConfig::default();
        assert_eq!(config.neighbors, 5);
        assert!((config.similarity_floor - 0.7).abs() < 1e-6);
        assert_eq!(config.max_paths, 5);
        assert_eq!(config.max_fallback, 3);
    }
}
