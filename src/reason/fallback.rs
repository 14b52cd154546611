//! Fallback chain synthesis
//!
//! Runs only when ranking produced nothing. Two independent channels:
//! the drug side surfaces the strongest evidence-to-ontology bridges even
//! though no user term connects to them, and the term side guarantees one
//! entry per user term, recovering evidence where any exists. Placeholder
//! labels mark the legs that have no genuine counterpart, so consumers
//! can tell a recovered connection from a synthesized one.

use super::bridge::{EvidenceBridges, SimilarityMatch};
use super::paths::CandidateChain;
use crate::graph::EvidenceTriple;
use rustc_hash::FxHashMap;
use serde::Serialize;
use std::cmp::Ordering;

/// Marks a pseudo adverse-effect label on drug-side entries
pub const FALLBACK_AE_PREFIX: &str = "__fallback_ae__::";
/// Evidence AE placeholder when no evidence bridge reaches the concept
pub const NO_EVIDENCE_AE: &str = "__no_evidence_ae__";
/// Drug placeholder when no evidence drug can be recovered
pub const NO_EVIDENCE_DRUG: &str = "__no_evidence_drug__";
/// Concept placeholder for a term that bridged to nothing
pub const NO_CONCEPT: &str = "__no_concept__";

/// A chain synthesized without full connectivity
///
/// Shaped like a ranked chain but kept as a distinct type: fallback
/// entries never mix into the ranked list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FallbackChain {
    pub chain: CandidateChain,
    pub score: f32,
}

/// Strongest evidence-side bridges as pseudo-chains
///
/// Flattens every (evidence AE, concept, similarity) bridge, keeps the
/// top `max_entries` by similarity, and pairs each with the input drug
/// label under a marked pseudo AE label. Empty when there are no bridges
/// to flatten (e.g. the drug had no evidence triples at all).
pub fn drug_side_fallback(
    drug_input: &str,
    evidence_bridges: &EvidenceBridges,
    max_entries: usize,
) -> Vec<FallbackChain> {
    let mut edges: Vec<(&String, &SimilarityMatch)> = evidence_bridges
        .iter()
        .flat_map(|(ae, matches)| matches.iter().map(move |m| (ae, m)))
        .collect();
    edges.sort_by(|a, b| b.1.score.partial_cmp(&a.1.score).unwrap_or(Ordering::Equal));
    edges.truncate(max_entries);

    edges
        .into_iter()
        .map(|(evidence_ae, m)| FallbackChain {
            chain: CandidateChain {
                drug_label: drug_input.to_string(),
                term_label: format!("{}{}", FALLBACK_AE_PREFIX, m.target),
                concepts: vec![m.target.clone()],
                evidence_ae: evidence_ae.clone(),
            },
            score: m.score,
        })
        .collect()
}

/// Exactly one best-effort chain per user term
///
/// Scans each term's bridged concepts in descending similarity, at most
/// `max_scan` of them, for one with evidence support (some evidence AE
/// bridged to the same concept). The reverse index is built once, not per
/// term. A supported concept recovers the highest-similarity evidence AE
/// and the first evidence drug recorded for it; otherwise the term's best
/// concept is emitted with placeholder evidence labels, and a term with
/// no bridges at all gets a fully synthetic entry.
pub fn term_side_fallback(
    terms: &[String],
    evidence_bridges: &EvidenceBridges,
    input_matches: &[SimilarityMatch],
    triples: &[EvidenceTriple],
    max_scan: usize,
) -> Vec<FallbackChain> {
    let mut reverse: FxHashMap<&str, Vec<(&str, f32)>> = FxHashMap::default();
    for (ae, matches) in evidence_bridges {
        for m in matches {
            reverse
                .entry(m.target.as_str())
                .or_default()
                .push((ae.as_str(), m.score));
        }
    }

    let mut drug_by_ae: FxHashMap<&str, &str> = FxHashMap::default();
    for triple in triples {
        drug_by_ae
            .entry(triple.ae_label.as_str())
            .or_insert(triple.drug_label.as_str());
    }

    let mut fallback = Vec::new();
    for term in terms {
        let mut neighbors: Vec<&SimilarityMatch> =
            input_matches.iter().filter(|m| m.source == *term).collect();
        neighbors.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));

        let recovered = neighbors.iter().take(max_scan).find_map(|m| {
            let candidates = reverse.get(m.target.as_str())?;
            // First maximum wins on ties
            let mut best = candidates[0];
            for c in &candidates[1..] {
                if c.1 > best.1 {
                    best = *c;
                }
            }
            let drug = drug_by_ae.get(best.0).copied().unwrap_or(NO_EVIDENCE_DRUG);
            Some(FallbackChain {
                chain: CandidateChain {
                    drug_label: drug.to_string(),
                    term_label: term.clone(),
                    concepts: vec![m.target.clone()],
                    evidence_ae: best.0.to_string(),
                },
                score: m.score,
            })
        });

        let entry = recovered.unwrap_or_else(|| match neighbors.first() {
            Some(m) => FallbackChain {
                chain: CandidateChain {
                    drug_label: NO_EVIDENCE_DRUG.to_string(),
                    term_label: term.clone(),
                    concepts: vec![m.target.clone()],
                    evidence_ae: NO_EVIDENCE_AE.to_string(),
                },
                score: m.score,
            },
            None => FallbackChain {
                chain: CandidateChain {
                    drug_label: NO_EVIDENCE_DRUG.to_string(),
                    term_label: term.clone(),
                    concepts: vec![NO_CONCEPT.to_string()],
                    evidence_ae: NO_EVIDENCE_AE.to_string(),
                },
                score: 0.0,
            },
        });
        fallback.push(entry);
    }
    fallback
}
