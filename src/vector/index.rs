//! Exact nearest-neighbor index over concept embeddings
//!
//! A row-major matrix of unit-normalized embedding vectors, searched
//! exhaustively by squared Euclidean distance. Row *i* of the matrix
//! corresponds to entry *i* of the parallel concept label list artifact;
//! callers resolve rows to labels themselves.
//!
//! The distance convention is load-bearing: for unit-normalized vectors,
//! squared L2 distance and cosine similarity are related by
//! `d2 = 2 - 2*cos`, which is what lets the bridge map distances to
//! similarities with `sim = 1 - d2/2`. An index holding unnormalized rows
//! would silently break that mapping.

use crate::artifact::{self, ArtifactKind, ArtifactResult};
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::path::Path;
use thiserror::Error;
use tracing::info;

/// Vector index errors
#[derive(Error, Debug, PartialEq)]
pub enum VectorError {
    #[error("Dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    #[error("embedding matrix of {rows} rows x {dim} dims does not fit {len} values")]
    MalformedMatrix { rows: usize, dim: usize, len: usize },
}

pub type VectorResult<T> = Result<T, VectorError>;

/// Serialized form: dimension plus the flat row-major matrix
#[derive(Debug, Clone, Serialize, Deserialize)]
struct IndexData {
    dim: usize,
    data: Vec<f32>,
}

/// Flat exact-search index over concept embeddings
#[derive(Debug, Clone)]
pub struct ConceptIndex {
    dim: usize,
    rows: Array2<f32>,
}

impl ConceptIndex {
    /// Build an index from per-row vectors (row order is the label order)
    pub fn from_rows(dim: usize, vectors: &[Vec<f32>]) -> VectorResult<Self> {
        let mut data = Vec::with_capacity(vectors.len() * dim);
        for vector in vectors {
            if vector.len() != dim {
                return Err(VectorError::DimensionMismatch {
                    expected: dim,
                    got: vector.len(),
                });
            }
            data.extend_from_slice(vector);
        }
        Self::from_flat(dim, data)
    }

    fn from_flat(dim: usize, data: Vec<f32>) -> VectorResult<Self> {
        if dim == 0 || data.len() % dim != 0 {
            return Err(VectorError::MalformedMatrix {
                rows: if dim == 0 { 0 } else { data.len() / dim },
                dim,
                len: data.len(),
            });
        }
        let nrows = data.len() / dim;
        let len = data.len();
        let rows = Array2::from_shape_vec((nrows, dim), data)
            .map_err(|_| VectorError::MalformedMatrix {
                rows: nrows,
                dim,
                len,
            })?;
        Ok(Self { dim, rows })
    }

    /// Number of indexed rows
    pub fn len(&self) -> usize {
        self.rows.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.nrows() == 0
    }

    /// Embedding dimensionality
    pub fn dimensions(&self) -> usize {
        self.dim
    }

    /// Exhaustive k-nearest search by squared L2 distance
    ///
    /// Returns (row, squared distance) pairs in ascending distance order;
    /// equal distances keep row order.
    pub fn search(&self, query: &[f32], k: usize) -> VectorResult<Vec<(usize, f32)>> {
        if query.len() != self.dim {
            return Err(VectorError::DimensionMismatch {
                expected: self.dim,
                got: query.len(),
            });
        }

        let mut scored: Vec<(usize, f32)> = self
            .rows
            .rows()
            .into_iter()
            .enumerate()
            .map(|(row, vector)| {
                let mut d2 = 0.0f32;
                for (a, b) in vector.iter().zip(query.iter()) {
                    let diff = a - b;
                    d2 += diff * diff;
                }
                (row, d2)
            })
            .collect();

        scored.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal));
        scored.truncate(k);
        Ok(scored)
    }

    /// Load from a versioned artifact file
    pub fn load(path: impl AsRef<Path>) -> ArtifactResult<Self> {
        let data: IndexData = artifact::load(path.as_ref(), ArtifactKind::ConceptIndex)?;
        let dim = data.dim;
        let index = Self::from_flat(data.dim, data.data).map_err(|_| {
            artifact::ArtifactError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("malformed concept index (dim {})", dim),
            ))
        })?;
        info!(
            "Loaded concept index: {} rows x {} dims",
            index.len(),
            index.dimensions()
        );
        Ok(index)
    }

    /// Persist to a versioned artifact file
    pub fn save(&self, path: impl AsRef<Path>) -> ArtifactResult<()> {
        let data = IndexData {
            dim: self.dim,
            data: self.rows.iter().copied().collect(),
        };
        artifact::save(path.as_ref(), ArtifactKind::ConceptIndex, &data)
    }
}
