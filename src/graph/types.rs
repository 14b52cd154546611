//! Core type definitions shared by the evidence and ontology graphs

use serde::{Deserialize, Serialize};
use std::fmt;

/// Canonical terminology code for a normalized drug concept
///
/// A free-text drug name may resolve to a *set* of these; ambiguous names
/// keep every matching code rather than picking one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct Cui(String);

impl Cui {
    pub fn new(cui: impl Into<String>) -> Self {
        Cui(cui.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Cui {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for Cui {
    fn from(s: String) -> Self {
        Cui(s)
    }
}

impl From<&str> for Cui {
    fn from(s: &str) -> Self {
        Cui(s.to_string())
    }
}

/// Unique identifier for a node in the evidence graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl NodeId {
    pub fn new(id: u32) -> Self {
        NodeId(id)
    }

    pub fn as_usize(&self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}

impl From<u32> for NodeId {
    fn from(id: u32) -> Self {
        NodeId(id)
    }
}

/// Relation tag on a graph edge (e.g., "causes", "subClassOf")
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct RelationType(String);

impl RelationType {
    pub fn new(relation: impl Into<String>) -> Self {
        RelationType(relation.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RelationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for RelationType {
    fn from(s: String) -> Self {
        RelationType(s)
    }
}

impl From<&str> for RelationType {
    fn from(s: &str) -> Self {
        RelationType(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cui() {
        let cui = Cui::new("C0025598");
        assert_eq!(cui.as_str(), "C0025598");
        assert_eq!(format!("{}", cui), "C0025598");

        let cui2: Cui = "C0004057".into();
        assert!(cui2 < cui);
    }

    #[test]
    fn test_node_id() {
        let id = NodeId::new(42);
        assert_eq!(id.as_usize(), 42);
        assert_eq!(format!("{}", id), "NodeId(42)");

        let id2: NodeId = 7.into();
        assert!(id2 < id);
    }

    #[test]
    fn test_relation_type() {
        let rel = RelationType::new("causes");
        assert_eq!(rel.as_str(), "causes");
        assert_eq!(format!("{}", rel), "causes");

        let rel2: RelationType = "subClassOf".into();
        assert_ne!(rel, rel2);
    }
}
