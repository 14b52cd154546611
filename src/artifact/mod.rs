//! Versioned artifact persistence
//!
//! All four query-time inputs (evidence graph, ontology graph, concept
//! index, concept label list) are produced by external offline builders and
//! read here from a common bincode envelope carrying a format version, an
//! artifact kind tag, and a build timestamp. Loading verifies version and
//! kind so a stale or misrouted file fails loudly instead of deserializing
//! into the wrong structure.

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::fmt;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// On-disk format version; bump on any breaking payload change
pub const FORMAT_VERSION: u16 = 1;

/// Kind tag distinguishing the persisted artifacts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArtifactKind {
    EvidenceGraph,
    OntologyGraph,
    ConceptIndex,
    ConceptLabels,
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ArtifactKind::EvidenceGraph => "evidence-graph",
            ArtifactKind::OntologyGraph => "ontology-graph",
            ArtifactKind::ConceptIndex => "concept-index",
            ArtifactKind::ConceptLabels => "concept-labels",
        };
        write!(f, "{}", name)
    }
}

/// Artifact load/save errors
#[derive(Error, Debug)]
pub enum ArtifactError {
    #[error("required artifact missing: {0}")]
    Missing(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] bincode::Error),

    #[error("unsupported artifact version {got} (expected {expected})")]
    VersionMismatch { expected: u16, got: u16 },

    #[error("artifact kind mismatch: expected {expected}, got {got}")]
    KindMismatch {
        expected: ArtifactKind,
        got: ArtifactKind,
    },
}

pub type ArtifactResult<T> = Result<T, ArtifactError>;

#[derive(Debug, Serialize, Deserialize)]
struct Envelope<T> {
    version: u16,
    kind: ArtifactKind,
    built_at: i64,
    payload: T,
}

/// Write a payload wrapped in the versioned envelope
pub fn save<T: Serialize>(path: &Path, kind: ArtifactKind, payload: &T) -> ArtifactResult<()> {
    let envelope = Envelope {
        version: FORMAT_VERSION,
        kind,
        built_at: chrono::Utc::now().timestamp_millis(),
        payload,
    };

    let file = File::create(path)?;
    bincode::serialize_into(BufWriter::new(file), &envelope)?;
    debug!("Wrote {} artifact to {:?}", kind, path);
    Ok(())
}

/// Read a payload back, verifying the envelope's version and kind
pub fn load<T: DeserializeOwned>(path: &Path, kind: ArtifactKind) -> ArtifactResult<T> {
    if !path.exists() {
        return Err(ArtifactError::Missing(path.to_path_buf()));
    }

    let file = File::open(path)?;
    let envelope: Envelope<T> = bincode::deserialize_from(BufReader::new(file))?;

    if envelope.version != FORMAT_VERSION {
        return Err(ArtifactError::VersionMismatch {
            expected: FORMAT_VERSION,
            got: envelope.version,
        });
    }
    if envelope.kind != kind {
        return Err(ArtifactError::KindMismatch {
            expected: kind,
            got: envelope.kind,
        });
    }

    debug!("Loaded {} artifact from {:?}", kind, path);
    Ok(envelope.payload)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("labels.bin");

        let labels = vec!["nausea".to_string(), "vomiting".to_string()];
        save(&path, ArtifactKind::ConceptLabels, &labels).unwrap();

        let loaded: Vec<String> = load(&path, ArtifactKind::ConceptLabels).unwrap();
        assert_eq!(loaded, labels);
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.bin");

        let err = load::<Vec<String>>(&path, ArtifactKind::ConceptLabels).unwrap_err();
        assert!(matches!(err, ArtifactError::Missing(_)));
    }

    #[test]
    fn test_kind_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("labels.bin");

        let labels = vec!["nausea".to_string()];
        save(&path, ArtifactKind::ConceptLabels, &labels).unwrap();

        let err = load::<Vec<String>>(&path, ArtifactKind::OntologyGraph).unwrap_err();
        assert!(matches!(err, ArtifactError::KindMismatch { .. }));
    }
}
