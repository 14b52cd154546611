//! Concept bridging
//!
//! Maps free-text labels onto canonical ontology concepts by nearest
//! neighbor search over the concept embedding index. Used twice per
//! query: once per distinct adverse-effect label from the evidence graph,
//! and once per user-supplied term. The two call sites differ in one
//! respect: a user term must not "match itself", since a verbatim hit on the
//! term's own label would mask the need for a real bridge, so the input
//! side requests one extra neighbor and drops verbatim matches.

use crate::embed::{EmbedError, EmbeddingCache, TextEncoder};
use crate::vector::{ConceptIndex, VectorError};
use indexmap::IndexMap;
use rayon::prelude::*;
use serde::Serialize;
use thiserror::Error;

/// Bridging errors
#[derive(Error, Debug)]
pub enum BridgeError {
    #[error(transparent)]
    Embed(#[from] EmbedError),

    #[error(transparent)]
    Vector(#[from] VectorError),
}

pub type BridgeResult<T> = Result<T, BridgeError>;

/// A retained similarity between a source label and an ontology concept
///
/// Scores are in [0, 1]: the similarity floor filters below, and cosine
/// similarity of unit vectors caps above.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimilarityMatch {
    pub source: String,
    pub target: String,
    pub score: f32,
}

/// Evidence AE label -> bridged concepts, preserving input label order
///
/// Insertion order matters downstream: candidate chains are generated in
/// this order, which is what makes ranked tie-breaking deterministic.
pub type EvidenceBridges = IndexMap<String, Vec<SimilarityMatch>>;

/// Nearest-neighbor matcher from labels to ontology concepts
pub struct ConceptBridge<'a> {
    index: &'a ConceptIndex,
    labels: &'a [String],
    encoder: &'a dyn TextEncoder,
    cache: &'a EmbeddingCache,
}

impl<'a> ConceptBridge<'a> {
    pub fn new(
        index: &'a ConceptIndex,
        labels: &'a [String],
        encoder: &'a dyn TextEncoder,
        cache: &'a EmbeddingCache,
    ) -> Self {
        Self {
            index,
            labels,
            encoder,
            cache,
        }
    }

    /// Nearest concepts for one label as (concept, similarity) pairs in
    /// descending similarity order
    ///
    /// Squared L2 distance over unit vectors maps to cosine similarity via
    /// `sim = 1 - d2/2`; see the index module for the convention.
    fn neighbors(&self, label: &str, k: usize) -> BridgeResult<Vec<(String, f32)>> {
        let query = self.cache.encode(self.encoder, label)?;
        let hits = self.index.search(&query, k)?;
        Ok(hits
            .into_iter()
            .map(|(row, d2)| (self.labels[row].clone(), 1.0 - d2 / 2.0))
            .collect())
    }

    /// Bridge each evidence AE label to up to `k` concepts at or above the
    /// similarity floor
    ///
    /// Labels are processed in parallel; the returned map preserves the
    /// caller's label order.
    pub fn evidence_bridges(
        &self,
        ae_labels: &[String],
        k: usize,
        floor: f32,
    ) -> BridgeResult<EvidenceBridges> {
        let per_label: Vec<(String, Vec<SimilarityMatch>)> = ae_labels
            .par_iter()
            .map(|label| {
                let matches = self
                    .neighbors(label, k)?
                    .into_iter()
                    .filter(|(_, sim)| *sim >= floor)
                    .map(|(target, score)| SimilarityMatch {
                        source: label.clone(),
                        target,
                        score,
                    })
                    .collect();
                Ok((label.clone(), matches))
            })
            .collect::<BridgeResult<_>>()?;

        Ok(per_label.into_iter().collect())
    }

    /// Bridge each user term to up to `k` concepts, excluding verbatim
    /// self-matches
    ///
    /// One extra neighbor is requested to compensate for a possibly
    /// removed self-match. Results are flat, grouped by term in input
    /// order, descending similarity within a term.
    pub fn input_bridges(
        &self,
        terms: &[String],
        k: usize,
        floor: f32,
    ) -> BridgeResult<Vec<SimilarityMatch>> {
        let per_term: Vec<Vec<SimilarityMatch>> = terms
            .par_iter()
            .map(|term| {
                let mut kept = Vec::new();
                for (target, sim) in self.neighbors(term, k + 1)? {
                    if sim < floor {
                        continue;
                    }
                    if target == *term {
                        continue;
                    }
                    kept.push(SimilarityMatch {
                        source: term.clone(),
                        target,
                        score: sim,
                    });
                    if kept.len() >= k {
                        break;
                    }
                }
                Ok(kept)
            })
            .collect::<BridgeResult<_>>()?;

        Ok(per_term.into_iter().flatten().collect())
    }
}
