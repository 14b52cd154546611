//! Candidate chain discovery and ranking
//!
//! Intersects the two bridge outputs through the ontology graph. A chain
//! is one concept (both sides reached the same concept) or two concepts
//! joined by a direct ontology edge; nothing longer is attempted, so the
//! traversal stays quadratic in the bridged candidates rather than an
//! open-ended graph search.

use super::bridge::{EvidenceBridges, SimilarityMatch};
use crate::graph::OntologyGraph;
use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use serde::Serialize;
use std::cmp::Ordering;

/// A discovered reasoning chain, not yet scored
///
/// `evidence_ae` is the evidence-side adverse-effect label whose bridge
/// produced `concepts[0]`; recording it at generation time is what lets
/// the ranker score the generating bridge and the renderer name the
/// causal step, without re-deriving the anchor by scanning.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandidateChain {
    pub drug_label: String,
    pub term_label: String,
    pub concepts: Vec<String>,
    pub evidence_ae: String,
}

/// A chain with its two-term additive score
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedChain {
    pub chain: CandidateChain,
    pub score: f32,
}

/// (source, target) -> similarity over the evidence-side bridges
pub fn evidence_similarities(bridges: &EvidenceBridges) -> FxHashMap<(String, String), f32> {
    bridges
        .iter()
        .flat_map(|(ae, matches)| {
            matches
                .iter()
                .map(move |m| ((ae.clone(), m.target.clone()), m.score))
        })
        .collect()
}

/// (term, target) -> similarity over the input-side bridges
pub fn input_similarities(matches: &[SimilarityMatch]) -> FxHashMap<(String, String), f32> {
    matches
        .iter()
        .map(|m| ((m.source.clone(), m.target.clone()), m.score))
        .collect()
}

/// Enumerate 1- and 2-concept chains between the bridged sides
///
/// Generation order is deterministic: evidence AE labels in map order,
/// their concepts in bridge order, user terms in first-seen order. That
/// order is what a later stable sort falls back to on score ties.
pub fn find_candidate_chains(
    drug_label: &str,
    evidence_bridges: &EvidenceBridges,
    input_matches: &[SimilarityMatch],
    ontology: &OntologyGraph,
) -> Vec<CandidateChain> {
    let mut input_map: IndexMap<&str, Vec<&str>> = IndexMap::new();
    for m in input_matches {
        input_map
            .entry(m.source.as_str())
            .or_default()
            .push(m.target.as_str());
    }

    let mut chains = Vec::new();
    for (evidence_ae, matches) in evidence_bridges {
        for candidate in matches {
            for (term, concepts) in &input_map {
                for &concept_in in concepts {
                    if candidate.target == concept_in {
                        chains.push(CandidateChain {
                            drug_label: drug_label.to_string(),
                            term_label: (*term).to_string(),
                            concepts: vec![candidate.target.clone()],
                            evidence_ae: evidence_ae.clone(),
                        });
                    } else if ontology.has_edge(&candidate.target, concept_in) {
                        chains.push(CandidateChain {
                            drug_label: drug_label.to_string(),
                            term_label: (*term).to_string(),
                            concepts: vec![candidate.target.clone(), concept_in.to_string()],
                            evidence_ae: evidence_ae.clone(),
                        });
                    }
                }
            }
        }
    }
    chains
}

/// Score chains (evidence-side similarity + input-side similarity, 0.0
/// per missing entry), sort descending, truncate to `max_paths`
///
/// The sort is stable, so equal scores keep generation order; that
/// ordering is implementation-defined and not part of the contract.
pub fn rank_chains(
    chains: Vec<CandidateChain>,
    evidence_sim: &FxHashMap<(String, String), f32>,
    input_sim: &FxHashMap<(String, String), f32>,
    max_paths: usize,
) -> Vec<RankedChain> {
    let mut ranked: Vec<RankedChain> = chains
        .into_iter()
        .map(|chain| {
            let sim1 = chain
                .concepts
                .first()
                .and_then(|c| evidence_sim.get(&(chain.evidence_ae.clone(), c.clone())))
                .copied()
                .unwrap_or(0.0);
            let sim2 = chain
                .concepts
                .last()
                .and_then(|c| input_sim.get(&(chain.term_label.clone(), c.clone())))
                .copied()
                .unwrap_or(0.0);
            RankedChain {
                chain,
                score: sim1 + sim2,
            }
        })
        .collect();

    ranked.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
    ranked.truncate(max_paths);
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matches(entries: &[(&str, &str, f32)]) -> Vec<SimilarityMatch> {
        entries
            .iter()
            .map(|(source, target, score)| SimilarityMatch {
                source: source.to_string(),
                target: target.to_string(),
                score: *score,
            })
            .collect()
    }

    fn bridges(entries: &[(&str, &str, f32)]) -> EvidenceBridges {
        let mut out = EvidenceBridges::new();
        for (source, target, score) in entries {
            out.entry(source.to_string())
                .or_default()
                .push(SimilarityMatch {
                    source: source.to_string(),
                    target: target.to_string(),
                    score: *score,
                });
        }
        out
    }

    #[test]
    fn test_shared_concept_yields_single_hop() {
        let evidence = bridges(&[("nausea", "nausea concept", 0.91)]);
        let input = matches(&[("queasiness", "nausea concept", 0.88)]);
        let ontology = OntologyGraph::new();

        let chains = find_candidate_chains("metformin", &evidence, &input, &ontology);
        assert_eq!(chains.len(), 1);
        assert_eq!(chains[0].concepts, vec!["nausea concept"]);
        assert_eq!(chains[0].evidence_ae, "nausea");
        assert_eq!(chains[0].term_label, "queasiness");
    }

    #[test]
    fn test_ontology_edge_yields_two_hop() {
        let evidence = bridges(&[("nausea", "nausea concept", 0.9)]);
        let input = matches(&[("sickness", "gi disorder", 0.8)]);

        let mut ontology = OntologyGraph::new();
        ontology.add_relation("nausea concept", "gi disorder", "subClassOf");

        let chains = find_candidate_chains("metformin", &evidence, &input, &ontology);
        assert_eq!(chains.len(), 1);
        assert_eq!(chains[0].concepts, vec!["nausea concept", "gi disorder"]);
    }

    #[test]
    fn test_edge_direction_respected() {
        let evidence = bridges(&[("nausea", "nausea concept", 0.9)]);
        let input = matches(&[("sickness", "gi disorder", 0.8)]);

        // Edge points the wrong way
        let mut ontology = OntologyGraph::new();
        ontology.add_relation("gi disorder", "nausea concept", "subClassOf");

        let chains = find_candidate_chains("metformin", &evidence, &input, &ontology);
        assert!(chains.is_empty());
    }

    #[test]
    fn test_disconnected_concepts_yield_nothing() {
        let evidence = bridges(&[("nausea", "nausea concept", 0.9)]);
        let input = matches(&[("tinnitus", "ear disorder", 0.8)]);
        let ontology = OntologyGraph::new();

        let chains = find_candidate_chains("metformin", &evidence, &input, &ontology);
        assert!(chains.is_empty());
    }

    #[test]
    fn test_rank_scores_are_additive_and_sorted() {
        let evidence = bridges(&[
            ("nausea", "nausea concept", 0.91),
            ("headache", "headache concept", 0.75),
        ]);
        let input = matches(&[
            ("queasiness", "nausea concept", 0.88),
            ("head pain", "headache concept", 0.80),
        ]);
        let ontology = OntologyGraph::new();

        let chains = find_candidate_chains("metformin", &evidence, &input, &ontology);
        let ranked = rank_chains(
            chains,
            &evidence_similarities(&evidence),
            &input_similarities(&input),
            5,
        );

        assert_eq!(ranked.len(), 2);
        assert!((ranked[0].score - 1.79).abs() < 1e-4);
        assert!((ranked[1].score - 1.55).abs() < 1e-4);
        assert!(ranked[0].score >= ranked[1].score);
    }

    #[test]
    fn test_rank_truncates_to_max_paths() {
        let evidence = bridges(&[
            ("a", "c1", 0.9),
            ("a", "c2", 0.8),
            ("b", "c3", 0.7),
        ]);
        let input = matches(&[
            ("t", "c1", 0.9),
            ("t", "c2", 0.8),
            ("t", "c3", 0.7),
        ]);
        let ontology = OntologyGraph::new();

        let chains = find_candidate_chains("drug", &evidence, &input, &ontology);
        assert_eq!(chains.len(), 3);

        let ranked = rank_chains(
            chains,
            &evidence_similarities(&evidence),
            &input_similarities(&input),
            2,
        );
        assert_eq!(ranked.len(), 2);
        assert!((ranked[0].score - 1.8).abs() < 1e-4);
    }

    #[test]
    fn test_missing_similarity_contributes_zero() {
        let chain = CandidateChain {
            drug_label: "drug".to_string(),
            term_label: "term".to_string(),
            concepts: vec!["c1".to_string(), "c2".to_string()],
            evidence_ae: "ae".to_string(),
        };
        let evidence_sim =
            FxHashMap::from_iter([(("ae".to_string(), "c1".to_string()), 0.75f32)]);
        let input_sim = FxHashMap::default();

        let ranked = rank_chains(vec![chain], &evidence_sim, &input_sim, 5);
        assert!((ranked[0].score - 0.75).abs() < 1e-6);
    }

    #[test]
    fn test_ties_keep_generation_order() {
        let evidence = bridges(&[("a", "c1", 0.8), ("b", "c2", 0.8)]);
        let input = matches(&[("t", "c1", 0.8), ("t", "c2", 0.8)]);
        let ontology = OntologyGraph::new();

        let chains = find_candidate_chains("drug", &evidence, &input, &ontology);
        let ranked = rank_chains(
            chains,
            &evidence_similarities(&evidence),
            &input_similarities(&input),
            5,
        );

        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].chain.evidence_ae, "a");
        assert_eq!(ranked[1].chain.evidence_ae, "b");
    }
}
