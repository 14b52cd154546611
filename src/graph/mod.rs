//! Graph structures consumed by the reasoning engine
//!
//! Two read-only graphs back a query: the corpus-derived evidence
//! multigraph (drug -> adverse-effect causal edges) and the ontology
//! concept graph used as the semantic bridge between vocabularies.

pub mod evidence;
pub mod ontology;
pub mod types;

pub use evidence::{EvidenceEdge, EvidenceGraph, EvidenceNode, EvidenceTriple, GraphError, GraphResult};
pub use ontology::OntologyGraph;
pub use types::{Cui, NodeId, RelationType};
