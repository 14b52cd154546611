//! Ontology concept graph
//!
//! Directed graph of canonical concept labels with relation-tagged edges
//! (subclass relations and the like), derived offline from an ontology
//! source and loaded here read-only. The path finder only ever asks two
//! questions of it: is this label a concept, and is there a direct edge
//! between these two concepts.

use super::types::RelationType;
use crate::artifact::{self, ArtifactKind, ArtifactResult};
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct StoredRelation {
    source: u32,
    target: u32,
    relation: RelationType,
}

/// Serialized adjacency-list form of the graph
#[derive(Debug, Clone, Serialize, Deserialize)]
struct OntologyData {
    labels: Vec<String>,
    edges: Vec<StoredRelation>,
}

/// In-memory ontology graph with membership indexes
#[derive(Debug, Clone, Default)]
pub struct OntologyGraph {
    labels: Vec<String>,
    edges: Vec<StoredRelation>,
    label_index: FxHashMap<String, u32>,
    edge_set: FxHashSet<(u32, u32)>,
}

impl OntologyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a concept label if absent, returning its dense id
    pub fn add_concept(&mut self, label: &str) -> u32 {
        if let Some(&id) = self.label_index.get(label) {
            return id;
        }
        let id = self.labels.len() as u32;
        self.labels.push(label.to_string());
        self.label_index.insert(label.to_string(), id);
        id
    }

    /// Add a directed, relation-tagged edge (concepts inserted as needed)
    pub fn add_relation(&mut self, source: &str, target: &str, relation: impl Into<RelationType>) {
        let source = self.add_concept(source);
        let target = self.add_concept(target);
        self.edges.push(StoredRelation {
            source,
            target,
            relation: relation.into(),
        });
        self.edge_set.insert((source, target));
    }

    /// Exact membership test for a concept label
    pub fn contains(&self, label: &str) -> bool {
        self.label_index.contains_key(label)
    }

    /// Directed edge test between two concept labels, any relation
    pub fn has_edge(&self, source: &str, target: &str) -> bool {
        match (self.label_index.get(source), self.label_index.get(target)) {
            (Some(&s), Some(&t)) => self.edge_set.contains(&(s, t)),
            _ => false,
        }
    }

    pub fn concept_count(&self) -> usize {
        self.labels.len()
    }

    pub fn relation_count(&self) -> usize {
        self.edges.len()
    }

    fn from_data(data: OntologyData) -> Self {
        let label_index = data
            .labels
            .iter()
            .enumerate()
            .map(|(idx, label)| (label.clone(), idx as u32))
            .collect();
        let edge_set = data.edges.iter().map(|e| (e.source, e.target)).collect();
        Self {
            labels: data.labels,
            edges: data.edges,
            label_index,
            edge_set,
        }
    }

    /// Load from a versioned artifact file
    pub fn load(path: impl AsRef<Path>) -> ArtifactResult<Self> {
        let data: OntologyData = artifact::load(path.as_ref(), ArtifactKind::OntologyGraph)?;
        let graph = Self::from_data(data);
        info!(
            "Loaded ontology graph: {} concepts, {} relations",
            graph.concept_count(),
            graph.relation_count()
        );
        Ok(graph)
    }

    /// Persist to a versioned artifact file
    pub fn save(&self, path: impl AsRef<Path>) -> ArtifactResult<()> {
        let data = OntologyData {
            labels: self.labels.clone(),
            edges: self.edges.clone(),
        };
        artifact::save(path.as_ref(), ArtifactKind::OntologyGraph, &data)
    }
}
