use crate::error::Result;
use crate::index::reader::IndexReader;
use crate::index::types::{IndexEntry, sort_by_file_name};
use crate::utils::pattern_tokens;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Exclusions and result cap for a search
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchOptions {
    /// Entries with any keyword containing one of these terms are dropped
    #[serde(default)]
    pub exclude: Vec<String>,
    /// Maximum number of results; 0 means unbounded
    #[serde(default)]
    pub max_results: usize,
}

impl SearchOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn exclude<I, S>(mut self, terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.exclude
            .extend(terms.into_iter().map(|term| term.as_ref().to_string()));
        self
    }

    pub fn max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }

    /// Lowercased, non-empty exclusion terms
    fn exclusion_terms(&self) -> Vec<String> {
        self.exclude
            .iter()
            .map(|term| term.to_lowercase())
            .filter(|term| !term.is_empty())
            .collect()
    }
}

/// Multi-keyword AND search over an [`IndexReader`]
pub struct IndexSearcher<'a> {
    reader: &'a IndexReader,
}

impl<'a> IndexSearcher<'a> {
    pub fn new(reader: &'a IndexReader) -> Self {
        Self { reader }
    }

    /// Entries matching every token of `pattern`
    pub fn search(&self, pattern: &str) -> Result<Vec<IndexEntry>> {
        self.search_with(pattern, &SearchOptions::default())
    }

    /// Entries matching every token of `pattern`, minus exclusions, capped at
    /// `options.max_results`, sorted by file name
    pub fn search_with(&self, pattern: &str, options: &SearchOptions) -> Result<Vec<IndexEntry>> {
        let tokens = pattern_tokens(pattern);
        let Some((first, rest)) = tokens.split_first() else {
            return Ok(Vec::new());
        };
        let exclude = options.exclusion_terms();

        // Keyed by identity so truncation below is deterministic
        let mut entries = self.candidates(first, &exclude)?;

        for token in rest {
            if entries.is_empty() {
                break;
            }
            let matched = self.candidates(token, &exclude)?;
            entries.retain(|key, _| matched.contains_key(key));
        }

        let mut results: Vec<IndexEntry> = entries.into_values().collect();
        if options.max_results > 0 {
            results.truncate(options.max_results);
        }
        sort_by_file_name(&mut results);

        log::debug!("search {:?}: {} results", pattern, results.len());
        Ok(results)
    }

    /// Lookup results for one token with excluded entries filtered out
    fn candidates(&self, token: &str, exclude: &[String]) -> Result<BTreeMap<String, IndexEntry>> {
        Ok(self
            .reader
            .read_by_keyword(token)?
            .into_iter()
            .filter(|entry| !is_excluded(entry, exclude))
            .map(|entry| (entry.key().to_string(), entry))
            .collect())
    }
}

fn is_excluded(entry: &IndexEntry, exclude: &[String]) -> bool {
    exclude.iter().any(|term| entry.has_keyword_containing(term))
}
