//! Query orchestration
//!
//! Owns the four loaded artifacts plus the encoder and cache, and runs
//! the full per-query control flow: normalize -> retrieve evidence ->
//! bridge both sides -> find and rank chains -> fall back when nothing
//! connects -> render narratives. Everything loaded is immutable for the
//! query's duration; `query` takes `&self` and may be called from
//! concurrent threads.

use super::bridge::{BridgeError, ConceptBridge};
use super::fallback::{drug_side_fallback, term_side_fallback};
use super::narrate::Narrator;
use super::paths::{evidence_similarities, find_candidate_chains, input_similarities, rank_chains};
use super::{QueryOutcome, ReasonerConfig};
use crate::artifact::{self, ArtifactError, ArtifactKind};
use crate::embed::{EmbeddingCache, TextEncoder};
use crate::graph::{EvidenceGraph, OntologyGraph};
use crate::terminology::{TermDictionary, TerminologyError};
use crate::vector::ConceptIndex;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

/// Fatal query errors
///
/// Missing evidence and missing connections are *not* errors; they are
/// handled by the fallback channels and reported through the outcome's
/// `fully_connected` flag.
#[derive(Error, Debug)]
pub enum ReasonError {
    #[error(transparent)]
    Terminology(#[from] TerminologyError),

    #[error(transparent)]
    Artifact(#[from] ArtifactError),

    #[error(transparent)]
    Bridge(#[from] BridgeError),

    #[error("no adverse-effect terms supplied")]
    NoTerms,

    #[error("concept index has {rows} rows but label list has {labels} entries")]
    LabelMismatch { rows: usize, labels: usize },
}

pub type ReasonResult<T> = Result<T, ReasonError>;

/// Locations of the persisted query-time inputs
#[derive(Debug, Clone)]
pub struct ArtifactPaths {
    pub terminology_dir: PathBuf,
    pub evidence_graph: PathBuf,
    pub ontology_graph: PathBuf,
    pub concept_index: PathBuf,
    pub concept_labels: PathBuf,
}

impl ArtifactPaths {
    /// Conventional file names under a single data directory
    pub fn from_data_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            terminology_dir: dir.join("terminology"),
            evidence_graph: dir.join("evidence_graph.bin"),
            ontology_graph: dir.join("ontology_graph.bin"),
            concept_index: dir.join("concept_index.bin"),
            concept_labels: dir.join("concept_labels.bin"),
        }
    }
}

/// The query-time semantic path reasoning engine
pub struct PathReasoner {
    terminology: TermDictionary,
    evidence: EvidenceGraph,
    ontology: OntologyGraph,
    index: ConceptIndex,
    labels: Vec<String>,
    encoder: Box<dyn TextEncoder>,
    cache: EmbeddingCache,
    config: ReasonerConfig,
}

impl PathReasoner {
    /// Assemble a reasoner from already-loaded parts
    pub fn new(
        terminology: TermDictionary,
        evidence: EvidenceGraph,
        ontology: OntologyGraph,
        index: ConceptIndex,
        labels: Vec<String>,
        encoder: Box<dyn TextEncoder>,
        config: ReasonerConfig,
    ) -> ReasonResult<Self> {
        if index.len() != labels.len() {
            return Err(ReasonError::LabelMismatch {
                rows: index.len(),
                labels: labels.len(),
            });
        }
        Ok(Self {
            terminology,
            evidence,
            ontology,
            index,
            labels,
            encoder,
            cache: EmbeddingCache::new(),
            config,
        })
    }

    /// Load every artifact and assemble the reasoner
    pub fn load(
        paths: &ArtifactPaths,
        encoder: Box<dyn TextEncoder>,
        config: ReasonerConfig,
    ) -> ReasonResult<Self> {
        let source = paths.terminology_dir.join(crate::terminology::SOURCE_FILE);
        if !source.exists() {
            return Err(ArtifactError::Missing(source).into());
        }
        let terminology = TermDictionary::load(&paths.terminology_dir)?;
        let evidence: EvidenceGraph =
            artifact::load(&paths.evidence_graph, ArtifactKind::EvidenceGraph)?;
        info!(
            "Loaded evidence graph: {} nodes, {} edges",
            evidence.node_count(),
            evidence.edge_count()
        );
        let ontology = OntologyGraph::load(&paths.ontology_graph)?;
        let index = ConceptIndex::load(&paths.concept_index)?;
        let labels: Vec<String> = artifact::load(&paths.concept_labels, ArtifactKind::ConceptLabels)?;

        Self::new(terminology, evidence, ontology, index, labels, encoder, config)
    }

    pub fn config(&self) -> &ReasonerConfig {
        &self.config
    }

    /// Answer one drug / adverse-effect-terms question
    pub fn query(&self, drug: &str, terms: &[String]) -> ReasonResult<QueryOutcome> {
        if terms.is_empty() {
            return Err(ReasonError::NoTerms);
        }

        let cuis = self.terminology.normalize(drug)?;
        let matched = self.evidence.matching_drugs(&cuis);
        let triples = self.evidence.causal_triples(&matched);
        info!(
            "Drug '{}': {} matched node(s), {} causal triple(s)",
            drug,
            matched.len(),
            triples.len()
        );

        // Distinct evidence AE labels, sorted for a deterministic bridge
        // and chain-generation order
        let ae_labels: Vec<String> = triples
            .iter()
            .map(|t| t.ae_label.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let bridge = ConceptBridge::new(
            &self.index,
            &self.labels,
            self.encoder.as_ref(),
            &self.cache,
        );
        let k = self.config.neighbors;
        let floor = self.config.similarity_floor;
        let evidence_bridges = bridge.evidence_bridges(&ae_labels, k, floor)?;
        let input_matches = bridge.input_bridges(terms, k, floor)?;

        let evidence_sim = evidence_similarities(&evidence_bridges);
        let input_sim = input_similarities(&input_matches);

        let chains = find_candidate_chains(drug, &evidence_bridges, &input_matches, &self.ontology);
        let ranked = rank_chains(chains, &evidence_sim, &input_sim, self.config.max_paths);

        let narrator = Narrator::new(drug, &triples, &evidence_sim, &input_sim);

        if !ranked.is_empty() {
            info!("Found {} fully connected path(s)", ranked.len());
            let narratives = ranked
                .iter()
                .map(|r| narrator.render(&r.chain, r.score))
                .collect();
            return Ok(QueryOutcome {
                fully_connected: true,
                ranked,
                drug_fallback: Vec::new(),
                term_fallback: Vec::new(),
                narratives,
            });
        }

        let drug_fallback = drug_side_fallback(drug, &evidence_bridges, self.config.max_fallback);
        let term_fallback = term_side_fallback(
            terms,
            &evidence_bridges,
            &input_matches,
            &triples,
            self.config.max_fallback,
        );
        info!(
            "No fully connected paths; fallbacks: {} drug-side, {} term-side",
            drug_fallback.len(),
            term_fallback.len()
        );

        let narratives = drug_fallback
            .iter()
            .chain(term_fallback.iter())
            .map(|f| narrator.render(&f.chain, f.score))
            .collect();

        Ok(QueryOutcome {
            fully_connected: false,
            ranked: Vec::new(),
            drug_fallback,
            term_fallback,
            narratives,
        })
    }
}
