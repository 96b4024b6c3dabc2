use crate::error::{IndexError, Result};
use crate::utils::{ByteCursor, entry_keywords, path_key, path_keywords, put_i32, put_i64, put_prefixed_str};
use serde::Serialize;
use std::borrow::Cow;
use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};

/// File holding first-character sections: `[u8 len][utf-8 char][Address]`
pub const DICTIONARY_FILE: &str = "dictionary";
/// File holding keyword records grouped by first character: `[i32 len][keyword][Address]`
pub const KEYWORDS_FILE: &str = "keywords";
/// File holding per-keyword entry lists: `[i32 count][count x Address]`
pub const ADDRESSES_FILE: &str = "addresses";
/// File holding serialized entries: `[i32 total][entry bytes]`
pub const DATA_FILE: &str = "data";

/// All four store files, in the order they are written
pub const STORE_FILES: [&str; 4] = [DATA_FILE, ADDRESSES_FILE, KEYWORDS_FILE, DICTIONARY_FILE];

/// (offset, length) pointer into one of the store regions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Address {
    pub start: i64,
    pub length: i64,
}

impl Address {
    /// Size of an encoded address in bytes
    pub const SIZE: usize = 8 + 8;

    /// Marker for an absent address
    pub const NULL: Address = Address {
        start: -1,
        length: 0,
    };

    pub fn new(start: i64, length: i64) -> Self {
        Self { start, length }
    }

    pub fn is_null(&self) -> bool {
        self.start < 0 || self.length == 0
    }

    pub fn end(&self) -> i64 {
        self.start + self.length
    }

    /// Grow this address to also cover `length` more bytes directly after it
    pub fn extend(&mut self, length: i64) {
        self.length += length;
    }

    pub fn encode(&self, buf: &mut Vec<u8>) {
        put_i64(buf, self.start);
        put_i64(buf, self.length);
    }

    pub fn decode(cursor: &mut ByteCursor<'_>) -> Result<Self> {
        let start = cursor.read_i64()?;
        let length = cursor.read_i64()?;
        Ok(Self { start, length })
    }

    /// Byte range this address covers inside a region of `region_len` bytes
    pub fn range(&self, region: &'static str, region_len: usize) -> Result<std::ops::Range<usize>> {
        if self.start < 0 || self.length < 0 {
            return Err(IndexError::Corrupted {
                region,
                offset: self.start,
                reason: format!("invalid address {}+{}", self.start, self.length),
            });
        }
        let start = self.start as usize;
        let end = start.checked_add(self.length as usize).filter(|&end| end <= region_len);
        match end {
            Some(end) => Ok(start..end),
            None => Err(IndexError::Corrupted {
                region,
                offset: self.start,
                reason: format!(
                    "address {}+{} exceeds region size {}",
                    self.start, self.length, region_len
                ),
            }),
        }
    }
}

/// One indexed file: its path and its keyword set.
///
/// Identity is the lowercased path; two entries for `/A/B.txt` and
/// `/a/b.txt` are equal and hash the same.
#[derive(Debug, Clone, Serialize)]
pub struct IndexEntry {
    path: PathBuf,
    #[serde(skip)]
    key: String,
    keywords: BTreeSet<String>,
}

impl IndexEntry {
    /// Build an entry for `path`, deriving keywords from the path and adding `tags`
    pub fn new<I, S>(path: impl Into<PathBuf>, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let path = path.into();
        let keywords = entry_keywords(&path, tags);
        Self::with_keywords(path, keywords)
    }

    /// Build an entry with an exact keyword set
    pub fn with_keywords(path: impl Into<PathBuf>, keywords: BTreeSet<String>) -> Self {
        let path = path.into();
        let key = path_key(&path);
        Self {
            path,
            key,
            keywords,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Lowercased path, the identity of this entry
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn keywords(&self) -> &BTreeSet<String> {
        &self.keywords
    }

    pub fn file_name(&self) -> Cow<'_, str> {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy())
            .unwrap_or(Cow::Borrowed(""))
    }

    /// True if any keyword contains `term` as a substring
    pub fn has_keyword_containing(&self, term: &str) -> bool {
        self.keywords.iter().any(|keyword| keyword.contains(term))
    }

    /// Ordering used for every entry listing: file name, then identity
    pub fn cmp_by_file_name(&self, other: &Self) -> Ordering {
        self.file_name()
            .cmp(&other.file_name())
            .then_with(|| self.key.cmp(&other.key))
    }

    /// Encode as `[path][i32 count][keyword]*`, strings `[i32 len][utf-8]`
    pub fn encode(&self, buf: &mut Vec<u8>) {
        put_prefixed_str(buf, &self.path.to_string_lossy());
        put_i32(buf, self.keywords.len() as i32);
        for keyword in &self.keywords {
            put_prefixed_str(buf, keyword);
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        self.encode(&mut buf);
        buf
    }

    /// Decode an entry. The path comes back lowercased and the keyword set is
    /// the union of the stored keywords and the tokens of the decoded path.
    pub fn decode(cursor: &mut ByteCursor<'_>) -> Result<Self> {
        let path = cursor.read_prefixed_str()?.to_lowercase();
        let count = cursor.read_len()?;

        let path = PathBuf::from(path);
        let mut keywords = path_keywords(&path);
        for _ in 0..count {
            keywords.insert(cursor.read_prefixed_str()?.to_owned());
        }

        Ok(Self::with_keywords(path, keywords))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut cursor = ByteCursor::new(bytes, DATA_FILE);
        Self::decode(&mut cursor)
    }
}

impl PartialEq for IndexEntry {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for IndexEntry {}

impl Hash for IndexEntry {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

/// Sort entries by file name (ties broken by identity)
pub fn sort_by_file_name(entries: &mut [IndexEntry]) {
    entries.sort_by(IndexEntry::cmp_by_file_name);
}
