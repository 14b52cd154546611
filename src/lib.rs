//! aetrace: semantic path tracing from drugs to adverse effects
//!
//! Given a drug name and a set of adverse-effect terms, the engine checks
//! whether a curated evidence knowledge graph links the drug to effects
//! that are semantically close, through a standardized ontology, to the
//! supplied terms, and renders a ranked explanation of each connecting
//! chain. When nothing fully connects, it degrades gracefully: both
//! fallback channels return the best partial evidence, clearly marked,
//! instead of an empty result.
//!
//! # Architecture
//!
//! - [`terminology`]: drug-name normalization against a pipe-delimited
//!   terminology source
//! - [`graph`]: the evidence multigraph and the ontology concept graph
//! - [`vector`]: exact nearest-neighbor search over concept embeddings
//! - [`embed`]: the text-encoder seam, its cache, and the HTTP client
//! - [`reason`]: bridging, path discovery, ranking, fallbacks,
//!   narratives, and the [`reason::PathReasoner`] orchestrator
//! - [`artifact`]: the versioned on-disk envelope all graph/index
//!   artifacts share
//!
//! # Example
//!
//! ```rust
//! use aetrace::graph::OntologyGraph;
//!
//! let mut ontology = OntologyGraph::new();
//! ontology.add_relation("nausea", "gastrointestinal disorder", "subClassOf");
//!
//! assert!(ontology.contains("nausea"));
//! assert!(ontology.has_edge("nausea", "gastrointestinal disorder"));
//! assert!(!ontology.has_edge("gastrointestinal disorder", "nausea"));
//! ```

#![allow(missing_docs)]
#![warn(clippy::all)]

pub mod artifact;
pub mod embed;
pub mod graph;
pub mod reason;
pub mod terminology;
pub mod vector;

// Re-export main types for convenience
pub use graph::{Cui, EvidenceGraph, EvidenceTriple, NodeId, OntologyGraph, RelationType};

pub use reason::{
    ArtifactPaths, CandidateChain, FallbackChain, Narrative, PathReasoner, QueryOutcome,
    RankedChain, ReasonError, ReasonResult, ReasonerConfig, SimilarityMatch,
};

pub use embed::{EmbeddingCache, HttpEncoder, TextEncoder};

pub use terminology::{TermDictionary, TerminologyError};

pub use vector::ConceptIndex;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get version string
pub fn version() -> &'static str {
    VERSION
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        let ver = version();
        assert!(!ver.is_empty());
        assert_eq!(ver, "0.1.0");
    }
}
