//! In-memory staging store for index updates
//!
//! An [`IndexDocument`] owns every staged [`IndexEntry`] (keyed by its
//! lowercased path) and keeps a keyword map that refers back to those
//! entries by key. Both maps are sorted, which gives the writer its
//! ascending keyword order for free.

use crate::error::{IndexError, Result};
use crate::index::types::IndexEntry;
use crate::utils::path_key;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::path::Path;

/// Mutable inverted index used while staging adds and removes before a flush
#[derive(Debug, Default, Clone)]
pub struct IndexDocument {
    /// Lowercased path -> entry (the only owner of entries)
    entries: BTreeMap<String, IndexEntry>,
    /// Keyword -> lowercased paths of the entries carrying it
    keywords: BTreeMap<String, BTreeSet<String>>,
    /// Lowercased paths removed during this session
    excluded: HashSet<String>,
}

impl IndexDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage a file with extra tags.
    ///
    /// No-op if the path is already staged or was removed earlier in this
    /// session (case-insensitive).
    pub fn add<I, S>(&mut self, path: &Path, tags: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        if path.as_os_str().is_empty() {
            return Err(IndexError::InvalidArgument("empty path".to_string()));
        }

        let key = path_key(path);
        if self.entries.contains_key(&key) || self.excluded.contains(&key) {
            return Ok(());
        }

        self.insert(IndexEntry::new(path, tags));
        Ok(())
    }

    /// Remove a file and suppress re-adding it for the rest of this session
    pub fn remove(&mut self, path: &Path) -> Result<()> {
        if path.as_os_str().is_empty() {
            return Err(IndexError::InvalidArgument("empty path".to_string()));
        }

        let key = path_key(path);
        self.excluded.insert(key.clone());

        let Some(entry) = self.entries.remove(&key) else {
            return Ok(());
        };

        for keyword in entry.keywords() {
            if let Some(bucket) = self.keywords.get_mut(keyword) {
                bucket.remove(&key);
            }
        }
        self.keywords.retain(|_, bucket| !bucket.is_empty());

        Ok(())
    }

    /// Stage an already-decoded entry (rehydration from disk).
    /// Keywords are taken as-is; an entry whose path is already staged is ignored.
    pub fn insert_entry(&mut self, entry: IndexEntry) {
        if self.entries.contains_key(entry.key()) {
            return;
        }
        self.insert(entry);
    }

    fn insert(&mut self, entry: IndexEntry) {
        let key = entry.key().to_string();
        for keyword in entry.keywords() {
            self.keywords
                .entry(keyword.clone())
                .or_default()
                .insert(key.clone());
        }
        self.entries.insert(key, entry);
    }

    /// Number of distinct staged paths
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.entries.contains_key(&path_key(path))
    }

    pub fn get(&self, path: &Path) -> Option<&IndexEntry> {
        self.entries.get(&path_key(path))
    }

    pub fn is_excluded(&self, path: &Path) -> bool {
        self.excluded.contains(&path_key(path))
    }

    /// Staged entries ordered by file name
    pub fn entries(&self) -> Vec<&IndexEntry> {
        let mut entries: Vec<&IndexEntry> = self.entries.values().collect();
        entries.sort_by(|a, b| a.cmp_by_file_name(b));
        entries
    }

    /// Keywords in ascending order
    pub fn keywords(&self) -> impl Iterator<Item = &str> {
        self.keywords.keys().map(String::as_str)
    }

    pub fn keyword_count(&self) -> usize {
        self.keywords.len()
    }

    pub fn has_keyword(&self, keyword: &str) -> bool {
        self.keywords.contains_key(keyword)
    }

    /// Entries carrying exactly `keyword`, in path order
    pub fn entries_for_keyword(&self, keyword: &str) -> Vec<&IndexEntry> {
        self.keywords
            .get(keyword)
            .map(|keys| keys.iter().filter_map(|key| self.entries.get(key)).collect())
            .unwrap_or_default()
    }

    /// Verify the keyword map and the path map describe the same entries
    pub fn check_consistency(&self) -> Result<()> {
        for (key, entry) in &self.entries {
            if key != entry.key() {
                return Err(IndexError::Inconsistent(format!(
                    "entry {} stored under key {}",
                    entry.key(),
                    key
                )));
            }
            for keyword in entry.keywords() {
                let listed = self
                    .keywords
                    .get(keyword)
                    .is_some_and(|bucket| bucket.contains(key));
                if !listed {
                    return Err(IndexError::Inconsistent(format!(
                        "{} missing from keyword bucket {:?}",
                        key, keyword
                    )));
                }
            }
        }

        for (keyword, bucket) in &self.keywords {
            if bucket.is_empty() {
                return Err(IndexError::Inconsistent(format!(
                    "empty keyword bucket {:?}",
                    keyword
                )));
            }
            for key in bucket {
                let owned = self
                    .entries
                    .get(key)
                    .is_some_and(|entry| entry.keywords().contains(keyword));
                if !owned {
                    return Err(IndexError::Inconsistent(format!(
                        "keyword bucket {:?} lists {} which does not carry it",
                        keyword, key
                    )));
                }
            }
        }

        Ok(())
    }
}
