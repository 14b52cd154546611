//! Terminology source loading and drug-name normalization
//!
//! The terminology source is a pipe-delimited concept file (RRF layout).
//! Only English, unsuppressed records contribute to the identifier map.
//! Normalization resolves a free-text drug name to every matching canonical
//! code; names in free text are often abbreviated or suffixed, so matching
//! is a permissive case-insensitive substring test.

use crate::graph::Cui;
use rustc_hash::FxHashMap;
use std::collections::BTreeSet;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use thiserror::Error;
use tracing::info;

/// File name expected inside the terminology directory
pub const SOURCE_FILE: &str = "RXNCONSO.RRF";

const LANGUAGE: &str = "ENG";
const SUPPRESSED: &str = "Y";

const COL_CUI: usize = 0;
const COL_LANGUAGE: usize = 1;
const COL_NAME: usize = 14;
const COL_SUPPRESS: usize = 16;

/// Terminology errors
#[derive(Error, Debug)]
pub enum TerminologyError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// No identifiers found for the input drug name. Callers decide
    /// fatality; the query engine treats this as fatal.
    #[error("no terminology identifiers found for '{drug}'")]
    NoMatch { drug: String },
}

pub type TerminologyResult<T> = Result<T, TerminologyError>;

/// Identifier -> lowercased name variants
#[derive(Debug, Clone, Default)]
pub struct TermDictionary {
    names: FxHashMap<Cui, BTreeSet<String>>,
}

impl TermDictionary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register one name variant for an identifier (lowercased on insert)
    pub fn insert(&mut self, cui: impl Into<Cui>, name: &str) {
        self.names
            .entry(cui.into())
            .or_default()
            .insert(name.to_lowercase());
    }

    /// Number of distinct identifiers
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Load the dictionary from a terminology directory
    ///
    /// Reads `RXNCONSO.RRF` inside `dir`. A record contributes only when
    /// its language column is `ENG` and its suppression flag is not `Y`.
    pub fn load(dir: impl AsRef<Path>) -> TerminologyResult<Self> {
        let path = dir.as_ref().join(SOURCE_FILE);
        info!("Loading terminology mappings from {:?}", path);

        let file = File::open(&path)?;
        let mut dict = TermDictionary::new();

        for line in BufReader::new(file).lines() {
            let line = line?;
            let parts: Vec<&str> = line.trim_end().split('|').collect();
            if parts.len() <= COL_SUPPRESS {
                continue;
            }
            if parts[COL_LANGUAGE] != LANGUAGE || parts[COL_SUPPRESS] == SUPPRESSED {
                continue;
            }
            dict.insert(parts[COL_CUI], parts[COL_NAME]);
        }

        info!("Loaded {} CUIs", dict.len());
        Ok(dict)
    }

    /// Resolve a drug name to its set of matching identifiers
    ///
    /// An identifier matches when *any* of its name variants contains the
    /// lowercased input as a substring. An empty result is the typed
    /// `NoMatch` failure; nothing downstream can proceed without
    /// identifiers.
    pub fn normalize(&self, drug: &str) -> TerminologyResult<BTreeSet<Cui>> {
        let norm = drug.to_lowercase();
        let matched: BTreeSet<Cui> = self
            .names
            .iter()
            .filter(|(_, names)| names.iter().any(|name| name.contains(&norm)))
            .map(|(cui, _)| cui.clone())
            .collect();

        if matched.is_empty() {
            return Err(TerminologyError::NoMatch {
                drug: drug.to_string(),
            });
        }
        info!("Matched {} CUI(s) for drug '{}'", matched.len(), drug);
        Ok(matched)
    }
}
