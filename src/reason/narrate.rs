//! Narrative rendering
//!
//! Turns a chain (ranked or fallback) into an ordered list of explanatory
//! statements: normalization, the causal edge, the similarity bridge on
//! each side, `relates_to` hops for two-concept chains, and a trailing
//! aggregate score. Pure formatting; every lookup tolerates the
//! placeholder labels fallback chains carry, defaulting to 0.00
//! similarities and an `N/A` identifier string.

use super::paths::CandidateChain;
use crate::graph::EvidenceTriple;
use rustc_hash::FxHashMap;
use serde::Serialize;
use std::fmt;

/// An explanation trace with its originating score
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Narrative {
    pub statements: Vec<String>,
    pub score: f32,
}

impl fmt::Display for Narrative {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.statements.join("; "))
    }
}

/// Renders chains against the query's auxiliary lookup tables
pub struct Narrator<'a> {
    drug_input: &'a str,
    cui_by_ae: FxHashMap<&'a str, &'a str>,
    drug_by_ae: FxHashMap<&'a str, &'a str>,
    evidence_sim: &'a FxHashMap<(String, String), f32>,
    input_sim: &'a FxHashMap<(String, String), f32>,
}

impl<'a> Narrator<'a> {
    /// Build the per-query lookup tables (first triple wins per AE label)
    pub fn new(
        drug_input: &'a str,
        triples: &'a [EvidenceTriple],
        evidence_sim: &'a FxHashMap<(String, String), f32>,
        input_sim: &'a FxHashMap<(String, String), f32>,
    ) -> Self {
        let mut cui_by_ae = FxHashMap::default();
        let mut drug_by_ae = FxHashMap::default();
        for triple in triples {
            cui_by_ae
                .entry(triple.ae_label.as_str())
                .or_insert(triple.cui_str.as_str());
            drug_by_ae
                .entry(triple.ae_label.as_str())
                .or_insert(triple.drug_label.as_str());
        }
        Self {
            drug_input,
            cui_by_ae,
            drug_by_ae,
            evidence_sim,
            input_sim,
        }
    }

    /// Render one chain with its score
    pub fn render(&self, chain: &CandidateChain, score: f32) -> Narrative {
        let anchor = chain.evidence_ae.as_str();
        let evidence_drug = self
            .drug_by_ae
            .get(anchor)
            .copied()
            .unwrap_or(chain.drug_label.as_str());
        let cui_str = self.cui_by_ae.get(anchor).copied().unwrap_or("N/A");

        let mut statements = vec![
            format!(
                "{} normalizes_to evidence_drug {} via CUI(s)({})",
                self.drug_input, evidence_drug, cui_str
            ),
            format!("{} causes {}", evidence_drug, anchor),
        ];

        if let (Some(first), Some(last)) = (chain.concepts.first(), chain.concepts.last()) {
            let sim1 = self
                .evidence_sim
                .get(&(anchor.to_string(), first.clone()))
                .copied()
                .unwrap_or(0.0);
            statements.push(format!("{} is_similar_to {} (sim={:.2})", anchor, first, sim1));

            for hop in chain.concepts.windows(2) {
                statements.push(format!("{} relates_to {} (in ontology)", hop[0], hop[1]));
            }

            let sim2 = self
                .input_sim
                .get(&(chain.term_label.clone(), last.clone()))
                .copied()
                .unwrap_or(0.0);
            statements.push(format!(
                "{} is_similar_to {} (sim={:.2})",
                last, chain.term_label, sim2
            ));
        }

        statements.push(format!("# total path score = {:.2}", score));
        Narrative { statements, score }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reason::fallback::{NO_EVIDENCE_AE, NO_EVIDENCE_DRUG};

    fn triples() -> Vec<EvidenceTriple> {
        vec![EvidenceTriple {
            drug_label: "METFORMIN".to_string(),
            ae_label: "nausea".to_string(),
            cui_str: "C0025598".to_string(),
        }]
    }

    fn sims(entries: &[(&str, &str, f32)]) -> FxHashMap<(String, String), f32> {
        entries
            .iter()
            .map(|(a, b, s)| ((a.to_string(), b.to_string()), *s))
            .collect()
    }

    fn chain(concepts: &[&str], evidence_ae: &str, drug: &str, term: &str) -> CandidateChain {
        CandidateChain {
            drug_label: drug.to_string(),
            term_label: term.to_string(),
            concepts: concepts.iter().map(|c| c.to_string()).collect(),
            evidence_ae: evidence_ae.to_string(),
        }
    }

    #[test]
    fn test_single_concept_chain_renders_five_statements() {
        let triples = triples();
        let evidence_sim = sims(&[("nausea", "nausea", 0.91)]);
        let input_sim = sims(&[("queasiness", "nausea", 0.88)]);
        let narrator = Narrator::new("metformin", &triples, &evidence_sim, &input_sim);

        let narrative = narrator.render(
            &chain(&["nausea"], "nausea", "metformin", "queasiness"),
            1.79,
        );

        assert_eq!(narrative.statements.len(), 5);
        assert_eq!(
            narrative.statements[0],
            "metformin normalizes_to evidence_drug METFORMIN via CUI(s)(C0025598)"
        );
        assert_eq!(narrative.statements[1], "METFORMIN causes nausea");
        assert_eq!(
            narrative.statements[2],
            "nausea is_similar_to nausea (sim=0.91)"
        );
        assert_eq!(
            narrative.statements[3],
            "nausea is_similar_to queasiness (sim=0.88)"
        );
        assert_eq!(narrative.statements[4], "# total path score = 1.79");
        assert!(!narrative.to_string().contains("relates_to"));
        assert_eq!(narrative.to_string().matches("; ").count(), 4);
    }

    #[test]
    fn test_two_concept_chain_renders_one_interior_hop() {
        let triples = triples();
        let evidence_sim = sims(&[("nausea", "nausea concept", 0.91)]);
        let input_sim = sims(&[("sickness", "gi disorder", 0.8)]);
        let narrator = Narrator::new("metformin", &triples, &evidence_sim, &input_sim);

        let narrative = narrator.render(
            &chain(
                &["nausea concept", "gi disorder"],
                "nausea",
                "metformin",
                "sickness",
            ),
            1.71,
        );

        assert_eq!(narrative.statements.len(), 6);
        let interior: Vec<&String> = narrative
            .statements
            .iter()
            .filter(|s| s.contains("relates_to"))
            .collect();
        assert_eq!(interior.len(), 1);
        assert_eq!(
            interior[0],
            "nausea concept relates_to gi disorder (in ontology)"
        );
    }

    #[test]
    fn test_placeholder_chain_renders_without_failing_lookups() {
        let evidence_sim = FxHashMap::default();
        let input_sim = sims(&[("sickness", "nausea concept", 0.82)]);
        let narrator = Narrator::new("aspirin", &[], &evidence_sim, &input_sim);

        let narrative = narrator.render(
            &chain(
                &["nausea concept"],
                NO_EVIDENCE_AE,
                NO_EVIDENCE_DRUG,
                "sickness",
            ),
            0.82,
        );

        assert_eq!(narrative.statements.len(), 5);
        assert_eq!(
            narrative.statements[0],
            "aspirin normalizes_to evidence_drug __no_evidence_drug__ via CUI(s)(N/A)"
        );
        assert_eq!(
            narrative.statements[1],
            "__no_evidence_drug__ causes __no_evidence_ae__"
        );
        assert_eq!(
            narrative.statements[2],
            "__no_evidence_ae__ is_similar_to nausea concept (sim=0.00)"
        );
    }

    #[test]
    fn test_drug_side_fallback_resolves_real_evidence_drug() {
        let triples = triples();
        let evidence_sim = sims(&[("nausea", "nausea concept", 0.91)]);
        let input_sim = FxHashMap::default();
        let narrator = Narrator::new("metformin", &triples, &evidence_sim, &input_sim);

        let narrative = narrator.render(
            &chain(
                &["nausea concept"],
                "nausea",
                "metformin",
                "__fallback_ae__::nausea concept",
            ),
            0.91,
        );

        // The anchor resolves to the evidence drug even though the chain
        // carries the input drug label
        assert_eq!(narrative.statements[1], "METFORMIN causes nausea");
        assert_eq!(
            narrative.statements[3],
            "nausea concept is_similar_to __fallback_ae__::nausea concept (sim=0.00)"
        );
    }
}
