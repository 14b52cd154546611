//! Evidence knowledge graph
//!
//! Corpus-derived directed multigraph encoding drug -> adverse-effect
//! causal edges as observed in text. Nodes are a tagged variant (drug
//! nodes carry their resolved terminology identifiers), edges carry a
//! relation tag and the identifier of the source document. The graph is
//! loaded read-only at query time; the two retrieval operations here are
//! the only ways the engine consumes it.

use super::types::{Cui, NodeId, RelationType};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use thiserror::Error;

/// Errors raised while assembling an evidence graph
#[derive(Error, Debug, PartialEq)]
pub enum GraphError {
    #[error("invalid edge: source node {0} does not exist")]
    InvalidEdgeSource(NodeId),

    #[error("invalid edge: target node {0} does not exist")]
    InvalidEdgeTarget(NodeId),
}

pub type GraphResult<T> = Result<T, GraphError>;

/// A node in the evidence graph
///
/// The discriminant replaces ad hoc per-node attribute maps: consumers
/// match on the variant instead of probing for attribute presence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EvidenceNode {
    Drug {
        label: String,
        doc: String,
        cuis: BTreeSet<Cui>,
    },
    AdverseEffect {
        label: String,
        doc: String,
    },
}

impl EvidenceNode {
    pub fn label(&self) -> &str {
        match self {
            EvidenceNode::Drug { label, .. } => label,
            EvidenceNode::AdverseEffect { label, .. } => label,
        }
    }
}

/// A relation-tagged edge with its source document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvidenceEdge {
    pub source: NodeId,
    pub target: NodeId,
    pub relation: RelationType,
    pub doc: String,
}

/// One drug -> AE causal observation for a matched drug node
///
/// `cui_str` is the matched node's identifier set rendered as a sorted,
/// comma-joined string, ready for display. Never empty: a node only
/// matches when its identifier set intersects the query's.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvidenceTriple {
    pub drug_label: String,
    pub ae_label: String,
    pub cui_str: String,
}

/// In-memory evidence multigraph with adjacency lists
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EvidenceGraph {
    nodes: Vec<EvidenceNode>,
    edges: Vec<EvidenceEdge>,
    /// Outgoing edge indices per node
    outgoing: Vec<Vec<usize>>,
}

impl EvidenceGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a drug node with its resolved identifier set
    pub fn add_drug(
        &mut self,
        label: impl Into<String>,
        doc: impl Into<String>,
        cuis: BTreeSet<Cui>,
    ) -> NodeId {
        self.push_node(EvidenceNode::Drug {
            label: label.into(),
            doc: doc.into(),
            cuis,
        })
    }

    /// Add an adverse-effect node
    pub fn add_adverse_effect(&mut self, label: impl Into<String>, doc: impl Into<String>) -> NodeId {
        self.push_node(EvidenceNode::AdverseEffect {
            label: label.into(),
            doc: doc.into(),
        })
    }

    fn push_node(&mut self, node: EvidenceNode) -> NodeId {
        let id = NodeId::new(self.nodes.len() as u32);
        self.nodes.push(node);
        self.outgoing.push(Vec::new());
        id
    }

    /// Add a directed edge; multiple edges between the same endpoints are
    /// allowed (one per source document)
    pub fn add_edge(
        &mut self,
        source: NodeId,
        target: NodeId,
        relation: impl Into<RelationType>,
        doc: impl Into<String>,
    ) -> GraphResult<()> {
        if source.as_usize() >= self.nodes.len() {
            return Err(GraphError::InvalidEdgeSource(source));
        }
        if target.as_usize() >= self.nodes.len() {
            return Err(GraphError::InvalidEdgeTarget(target));
        }

        let edge_idx = self.edges.len();
        self.edges.push(EvidenceEdge {
            source,
            target,
            relation: relation.into(),
            doc: doc.into(),
        });
        self.outgoing[source.as_usize()].push(edge_idx);
        Ok(())
    }

    pub fn node(&self, id: NodeId) -> Option<&EvidenceNode> {
        self.nodes.get(id.as_usize())
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Drug-typed nodes whose identifier set intersects the input set
    pub fn matching_drugs(&self, cuis: &BTreeSet<Cui>) -> Vec<NodeId> {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| match node {
                EvidenceNode::Drug { cuis: node_cuis, .. } => {
                    node_cuis.intersection(cuis).next().is_some()
                }
                EvidenceNode::AdverseEffect { .. } => false,
            })
            .map(|(idx, _)| NodeId::new(idx as u32))
            .collect()
    }

    /// Follow outgoing edges of the matched drug nodes to adverse-effect
    /// nodes, one triple per edge
    ///
    /// AE labels are lowercased here so downstream bridging and display see
    /// a uniform casing. Duplicate (drug, AE) observations from different
    /// documents are retained.
    pub fn causal_triples(&self, drug_ids: &[NodeId]) -> Vec<EvidenceTriple> {
        let mut triples = Vec::new();
        for &id in drug_ids {
            let Some(node) = self.nodes.get(id.as_usize()) else {
                continue;
            };
            let (drug_label, cui_str) = match node {
                EvidenceNode::Drug { label, cuis, .. } => {
                    let joined = cuis
                        .iter()
                        .map(Cui::to_string)
                        .collect::<Vec<_>>()
                        .join(", ");
                    (label.clone(), joined)
                }
                EvidenceNode::AdverseEffect { .. } => continue,
            };

            for &edge_idx in &self.outgoing[id.as_usize()] {
                let edge = &self.edges[edge_idx];
                if let EvidenceNode::AdverseEffect { label, .. } = &self.nodes[edge.target.as_usize()] {
                    triples.push(EvidenceTriple {
                        drug_label: drug_label.clone(),
                        ae_label: label.to_lowercase(),
                        cui_str: cui_str.clone(),
                    });
                }
            }
        }
        triples
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cuis(ids: &[&str]) -> BTreeSet<Cui> {
        ids.iter().map(|id| Cui::new(*id)).collect()
    }

    fn sample_graph() -> EvidenceGraph {
        let mut graph = EvidenceGraph::new();
        let metformin = graph.add_drug("METFORMIN", "DOC.1", cuis(&["C0025598", "C0700899"]));
        let nausea = graph.add_adverse_effect("Nausea", "DOC.1");
        let cramps = graph.add_adverse_effect("stomach cramps", "DOC.2");

        graph.add_edge(metformin, nausea, "causes", "DOC.1").unwrap();
        graph.add_edge(metformin, cramps, "causes", "DOC.2").unwrap();
        graph.add_edge(nausea, metformin, "adr_of", "DOC.1").unwrap();
        graph
    }

    #[test]
    fn test_matching_drugs_by_cui_intersection() {
        let graph = sample_graph();

        let matched = graph.matching_drugs(&cuis(&["C0025598"]));
        assert_eq!(matched.len(), 1);
        assert_eq!(graph.node(matched[0]).unwrap().label(), "METFORMIN");

        assert!(graph.matching_drugs(&cuis(&["C0000000"])).is_empty());
    }

    #[test]
    fn test_causal_triples_lowercase_and_join_cuis() {
        let graph = sample_graph();
        let matched = graph.matching_drugs(&cuis(&["C0700899"]));
        let triples = graph.causal_triples(&matched);

        assert_eq!(triples.len(), 2);
        assert_eq!(triples[0].ae_label, "nausea");
        assert_eq!(triples[0].cui_str, "C0025598, C0700899");
        assert_eq!(triples[1].ae_label, "stomach cramps");
    }

    #[test]
    fn test_multigraph_duplicates_retained() {
        let mut graph = sample_graph();
        let drug = graph.matching_drugs(&cuis(&["C0025598"]))[0];
        let nausea = NodeId::new(1);
        graph.add_edge(drug, nausea, "causes", "DOC.3").unwrap();

        let triples = graph.causal_triples(&[drug]);
        let nausea_count = triples.iter().filter(|t| t.ae_label == "nausea").count();
        assert_eq!(nausea_count, 2);
    }

    #[test]
    fn test_reverse_edges_do_not_yield_triples() {
        let graph = sample_graph();
        // An AE node id is never produced by matching_drugs, and a drug
        // target is skipped by the adverse-effect check
        let triples = graph.causal_triples(&[NodeId::new(1)]);
        assert!(triples.is_empty());
    }

    #[test]
    fn test_invalid_edge() {
        let mut graph = EvidenceGraph::new();
        let drug = graph.add_drug("X", "D", cuis(&["C1"]));
        let err = graph.add_edge(drug, NodeId::new(9), "causes", "D").unwrap_err();
        assert_eq!(err, GraphError::InvalidEdgeTarget(NodeId::new(9)));
    }

    #[test]
    fn test_empty_match_is_not_an_error() {
        let graph = sample_graph();
        let triples = graph.causal_triples(&graph.matching_drugs(&cuis(&["C9999999"])));
        assert!(triples.is_empty());
    }
}
