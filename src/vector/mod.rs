//! Nearest-neighbor search over ontology concept embeddings

pub mod index;

pub use index::{ConceptIndex, VectorError, VectorResult};
