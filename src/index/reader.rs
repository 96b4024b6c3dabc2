use crate::error::{IndexError, Result};
use crate::index::document::IndexDocument;
use crate::index::types::*;
use crate::utils::ByteCursor;
use memmap2::Mmap;
use std::collections::HashSet;
use std::fs::File;
use std::path::{Path, PathBuf};

/// One memory-mapped store file
struct Region {
    name: &'static str,
    /// `None` for an empty file, which cannot be mapped on every platform
    map: Option<Mmap>,
}

impl Region {
    fn open(index_path: &Path, name: &'static str) -> Result<Self> {
        let file = File::open(index_path.join(name))?;
        let map = if file.metadata()?.len() == 0 {
            None
        } else {
            // SAFETY: the store is only rewritten by a flush, and callers must
            // not flush while a reader over the same directory is alive.
            Some(unsafe { Mmap::map(&file)? })
        };
        Ok(Self { name, map })
    }

    fn bytes(&self) -> &[u8] {
        self.map.as_deref().unwrap_or(&[])
    }

    fn len(&self) -> usize {
        self.bytes().len()
    }

    /// Cursor over the bytes an address points at
    fn cursor(&self, address: Address) -> Result<ByteCursor<'_>> {
        let range = address.range(self.name, self.len())?;
        let base = range.start;
        Ok(ByteCursor::at(&self.bytes()[range], self.name, base))
    }

    fn cursor_all(&self) -> ByteCursor<'_> {
        ByteCursor::new(self.bytes(), self.name)
    }
}

/// Counts gathered by walking a store
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IndexStats {
    pub letters: usize,
    pub keywords: usize,
    pub entries: usize,
    pub dictionary_bytes: usize,
    pub keyword_bytes: usize,
    pub address_bytes: usize,
    pub data_bytes: usize,
}

impl IndexStats {
    pub fn total_bytes(&self) -> usize {
        self.dictionary_bytes + self.keyword_bytes + self.address_bytes + self.data_bytes
    }
}

/// Memory-mapped reader answering keyword lookups against a four-file store.
///
/// Lookups chase addresses from the dictionary to a keyword section, from
/// matching keywords to their address lists, and from there to individual
/// entries in the data region. Only the entries touched are decoded.
pub struct IndexReader {
    index_path: PathBuf,
    dictionary: Region,
    keywords: Region,
    addresses: Region,
    data: Region,
}

impl IndexReader {
    /// Map the four store files in `index_path`
    pub fn open(index_path: &Path) -> Result<Self> {
        if !Self::exists(index_path) {
            return Err(IndexError::MissingStore(index_path.to_path_buf()));
        }

        let reader = Self {
            index_path: index_path.to_path_buf(),
            dictionary: Region::open(index_path, DICTIONARY_FILE)?,
            keywords: Region::open(index_path, KEYWORDS_FILE)?,
            addresses: Region::open(index_path, ADDRESSES_FILE)?,
            data: Region::open(index_path, DATA_FILE)?,
        };

        log::debug!(
            "opened index {} ({} data bytes)",
            index_path.display(),
            reader.data.len()
        );
        Ok(reader)
    }

    /// True if all four store files are present
    pub fn exists(index_path: &Path) -> bool {
        STORE_FILES.iter().all(|name| index_path.join(name).is_file())
    }

    pub fn index_path(&self) -> &Path {
        &self.index_path
    }

    /// Decode every entry in the data region into a fresh document
    pub fn read_all(&self) -> Result<IndexDocument> {
        let mut document = IndexDocument::new();
        let mut cursor = self.data.cursor_all();

        while !cursor.is_empty() {
            let size = cursor.read_len()?;
            let bytes = cursor.read_bytes(size)?;
            document.insert_entry(IndexEntry::from_bytes(bytes)?);
        }

        Ok(document)
    }

    /// All entries with a keyword containing `keyword`, sorted by file name.
    ///
    /// Only keywords sharing the first character of `keyword` are scanned.
    pub fn read_by_keyword(&self, keyword: &str) -> Result<Vec<IndexEntry>> {
        let keyword = keyword.to_lowercase();
        let Some(letter) = keyword.chars().next() else {
            return Err(IndexError::InvalidArgument("empty keyword".to_string()));
        };

        let section = self.find_section(letter)?;
        if section.is_null() {
            return Ok(Vec::new());
        }

        let lists = self.get_address_lists(&keyword, section)?;
        log::trace!("keyword {:?}: {} matching keyword records", keyword, lists.len());
        if lists.is_empty() {
            return Ok(Vec::new());
        }

        let mut seen = HashSet::new();
        let mut entries = Vec::new();
        for list in lists {
            for address in self.get_data_addresses(list)? {
                let entry = self.get_entry(address)?;
                if seen.insert(entry.key().to_string()) {
                    entries.push(entry);
                }
            }
        }

        sort_by_file_name(&mut entries);
        Ok(entries)
    }

    /// Section of the keyword region holding keywords that start with `letter`,
    /// or [`Address::NULL`] if there is none
    pub fn find_section(&self, letter: char) -> Result<Address> {
        let mut cursor = self.dictionary.cursor_all();

        while !cursor.is_empty() {
            let len = cursor.read_u8()? as usize;
            let stored = cursor.read_str(len)?;
            if stored.chars().next() == Some(letter) {
                return Address::decode(&mut cursor);
            }
            cursor.skip(Address::SIZE)?;
        }

        Ok(Address::NULL)
    }

    /// Address lists of every keyword in `section` that contains `keyword`
    pub fn get_address_lists(&self, keyword: &str, section: Address) -> Result<Vec<Address>> {
        let mut cursor = self.keywords.cursor(section)?;
        let mut matches = Vec::new();

        while !cursor.is_empty() {
            let stored = cursor.read_prefixed_str()?;
            let list = Address::decode(&mut cursor)?;
            if stored.contains(keyword) {
                matches.push(list);
            }
        }

        Ok(matches)
    }

    /// Data addresses listed at `list`
    pub fn get_data_addresses(&self, list: Address) -> Result<Vec<Address>> {
        let mut cursor = self.addresses.cursor(list)?;
        let count = cursor.read_len()?;

        let mut addresses = Vec::with_capacity(count.min(cursor.remaining() / Address::SIZE));
        for _ in 0..count {
            addresses.push(Address::decode(&mut cursor)?);
        }
        Ok(addresses)
    }

    /// Decode the entry stored at `address`, skipping its length prefix
    pub fn get_entry(&self, address: Address) -> Result<IndexEntry> {
        let mut cursor = self.data.cursor(address)?;
        cursor.skip(4)?;
        IndexEntry::decode(&mut cursor)
    }

    /// Walk the store and count letters, keywords, and entries
    pub fn stats(&self) -> Result<IndexStats> {
        let mut letters = 0;
        let mut cursor = self.dictionary.cursor_all();
        while !cursor.is_empty() {
            let len = cursor.read_u8()? as usize;
            cursor.skip(len + Address::SIZE)?;
            letters += 1;
        }

        let mut keywords = 0;
        let mut cursor = self.keywords.cursor_all();
        while !cursor.is_empty() {
            let len = cursor.read_len()?;
            cursor.skip(len + Address::SIZE)?;
            keywords += 1;
        }

        let mut entries = 0;
        let mut cursor = self.data.cursor_all();
        while !cursor.is_empty() {
            let len = cursor.read_len()?;
            cursor.skip(len)?;
            entries += 1;
        }

        Ok(IndexStats {
            letters,
            keywords,
            entries,
            dictionary_bytes: self.dictionary.len(),
            keyword_bytes: self.keywords.len(),
            address_bytes: self.addresses.len(),
            data_bytes: self.data.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::writer::IndexWriter;
    use std::fs;

    const NO_TAGS: [&str; 0] = [];

    fn store(paths: &[(&str, &[&str])]) -> (tempfile::TempDir, IndexReader) {
        let dir = tempfile::tempdir().unwrap();
        let mut doc = IndexDocument::new();
        for (path, tags) in paths {
            doc.add(Path::new(path), tags.iter()).unwrap();
        }
        IndexWriter::open(dir.path()).unwrap().flush(&doc).unwrap();
        let reader = IndexReader::open(dir.path()).unwrap();
        (dir, reader)
    }

    #[test]
    fn test_substring_lookup() {
        let (_dir, reader) = store(&[("/a/b/document.txt", &[])]);
        let found = reader.read_by_keyword("doc").unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].path(), Path::new("/a/b/document.txt"));
    }

    #[test]
    fn test_lookup_only_scans_first_letter_section() {
        // "cument" is inside "document" but sections are chosen by first letter
        let (_dir, reader) = store(&[("/a/b/document.txt", &[])]);
        assert!(reader.read_by_keyword("cument").unwrap().is_empty());
    }

    #[test]
    fn test_lookup_missing_letter_is_empty() {
        let (_dir, reader) = store(&[("/a/b.txt", &[])]);
        assert_eq!(reader.find_section('q').unwrap(), Address::NULL);
        assert!(reader.read_by_keyword("quartz").unwrap().is_empty());
    }

    #[test]
    fn test_lookup_deduplicates_across_keywords() {
        // "rep" matches both "report" and "reports" on the same entry
        let (_dir, reader) = store(&[("/x/report.txt", &["reports"]), ("/y/repo.md", &[])]);
        let found = reader.read_by_keyword("rep").unwrap();
        let names: Vec<_> = found.iter().map(|e| e.file_name().into_owned()).collect();
        assert_eq!(names, vec!["repo.md", "report.txt"]);
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let (_dir, reader) = store(&[("/Music/Track.MP3", &["Favourite"])]);
        assert_eq!(reader.read_by_keyword("FAV").unwrap().len(), 1);
        assert_eq!(reader.read_by_keyword("mp3").unwrap().len(), 1);
    }

    #[test]
    fn test_empty_keyword_is_invalid() {
        let (_dir, reader) = store(&[("/a/b.txt", &[])]);
        let err = reader.read_by_keyword("").unwrap_err();
        assert!(matches!(err, IndexError::InvalidArgument(_)));
    }

    #[test]
    fn test_read_all_rehydrates() {
        let (_dir, reader) = store(&[("/a/one.txt", &["x"]), ("/b/two.txt", &[])]);
        let doc = reader.read_all().unwrap();
        assert_eq!(doc.len(), 2);
        assert!(doc.has_keyword("x"));
        doc.check_consistency().unwrap();
    }

    #[test]
    fn test_empty_store() {
        let (_dir, reader) = store(&[]);
        assert!(reader.read_all().unwrap().is_empty());
        assert!(reader.read_by_keyword("any").unwrap().is_empty());
        assert_eq!(reader.stats().unwrap(), IndexStats::default());
    }

    #[test]
    fn test_stats_counts() {
        let (_dir, reader) = store(&[("/a/one.txt", &[]), ("/a/two.txt", &[])]);
        let stats = reader.stats().unwrap();
        // a, one, two, txt
        assert_eq!(stats.keywords, 4);
        assert_eq!(stats.letters, 3);
        assert_eq!(stats.entries, 2);
        assert!(stats.total_bytes() > 0);
    }

    #[test]
    fn test_missing_store() {
        let dir = tempfile::tempdir().unwrap();
        let err = IndexReader::open(dir.path()).err().unwrap();
        assert!(matches!(err, IndexError::MissingStore(_)));
    }

    #[test]
    fn test_truncated_data_is_corruption() {
        let dir = tempfile::tempdir().unwrap();
        let mut doc = IndexDocument::new();
        doc.add(Path::new("/a/document.txt"), NO_TAGS).unwrap();
        IndexWriter::open(dir.path()).unwrap().flush(&doc).unwrap();

        let data_path = dir.path().join(DATA_FILE);
        let data = fs::read(&data_path).unwrap();
        fs::write(&data_path, &data[..data.len() / 2]).unwrap();

        let reader = IndexReader::open(dir.path()).unwrap();
        assert!(reader.read_by_keyword("doc").unwrap_err().is_corrupted());
        assert!(reader.read_all().unwrap_err().is_corrupted());
    }
}
