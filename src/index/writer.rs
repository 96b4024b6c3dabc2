use crate::error::{IndexError, Result};
use crate::index::document::IndexDocument;
use crate::index::reader::IndexReader;
use crate::index::types::*;
use crate::utils::{put_i32, put_prefixed_str};
use memmap2::MmapMut;
use std::collections::HashMap;
use std::fs::{self, OpenOptions};
use std::path::{Component, Path, PathBuf};

/// Sizes of the four regions produced by one flush
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlushSummary {
    pub entries: usize,
    pub keywords: usize,
    pub letters: usize,
    pub data_bytes: usize,
    pub address_bytes: usize,
    pub keyword_bytes: usize,
    pub dictionary_bytes: usize,
}

/// The four serialized regions, built in dependency order
#[derive(Debug, Default)]
pub struct StoreImage {
    pub data: Vec<u8>,
    pub addresses: Vec<u8>,
    pub keywords: Vec<u8>,
    pub dictionary: Vec<u8>,
    summary: FlushSummary,
}

impl StoreImage {
    /// Lay out a document as the four regions.
    ///
    /// Data first, then the per-keyword address lists pointing into it, then
    /// the keyword records pointing at those lists, then the per-letter
    /// dictionary pointing at keyword sections.
    pub fn build(document: &IndexDocument) -> Self {
        let mut image = StoreImage::default();

        let entry_addresses = image.write_data(document);

        // Keyword sections must be contiguous per first character, so the
        // serializer sorts rather than trusting the document's map order.
        let mut keywords: Vec<&str> = document.keywords().collect();
        keywords.sort_unstable();

        let list_addresses = image.write_address_lists(document, &keywords, &entry_addresses);
        let sections = image.write_keywords(&keywords, &list_addresses);
        image.write_dictionary(&sections);

        image.summary = FlushSummary {
            entries: entry_addresses.len(),
            keywords: keywords.len(),
            letters: sections.len(),
            data_bytes: image.data.len(),
            address_bytes: image.addresses.len(),
            keyword_bytes: image.keywords.len(),
            dictionary_bytes: image.dictionary.len(),
        };
        image
    }

    pub fn summary(&self) -> FlushSummary {
        self.summary
    }

    /// Entries in file-name order, each as `[i32 total][entry bytes]`
    fn write_data<'d>(&mut self, document: &'d IndexDocument) -> HashMap<&'d str, Address> {
        let mut addresses = HashMap::with_capacity(document.len());

        for entry in document.entries() {
            let bytes = entry.to_bytes();
            let start = self.data.len() as i64;

            put_i32(&mut self.data, bytes.len() as i32);
            self.data.extend_from_slice(&bytes);

            let length = self.data.len() as i64 - start;
            addresses.insert(entry.key(), Address::new(start, length));
        }

        addresses
    }

    /// One `[i32 count][Address]*` list per keyword
    fn write_address_lists<'k>(
        &mut self,
        document: &IndexDocument,
        keywords: &[&'k str],
        entry_addresses: &HashMap<&str, Address>,
    ) -> HashMap<&'k str, Address> {
        let mut lists = HashMap::with_capacity(keywords.len());

        for &keyword in keywords {
            let mut targets = Vec::new();
            for entry in document.entries_for_keyword(keyword) {
                match entry_addresses.get(entry.key()) {
                    Some(address) => targets.push(*address),
                    None => log::warn!("entry {} has no data address; skipped", entry.key()),
                }
            }

            let start = self.addresses.len() as i64;
            put_i32(&mut self.addresses, targets.len() as i32);
            for address in &targets {
                address.encode(&mut self.addresses);
            }

            let length = self.addresses.len() as i64 - start;
            lists.insert(keyword, Address::new(start, length));
        }

        lists
    }

    /// Keyword records, coalescing each first character into one section
    fn write_keywords(
        &mut self,
        keywords: &[&str],
        list_addresses: &HashMap<&str, Address>,
    ) -> Vec<(char, Address)> {
        let mut sections: Vec<(char, Address)> = Vec::new();

        for &keyword in keywords {
            let Some(letter) = keyword.chars().next() else {
                continue;
            };
            let Some(list) = list_addresses.get(keyword) else {
                continue;
            };

            let start = self.keywords.len() as i64;
            put_prefixed_str(&mut self.keywords, keyword);
            list.encode(&mut self.keywords);
            let length = self.keywords.len() as i64 - start;

            match sections.last_mut() {
                Some((current, section)) if *current == letter => section.extend(length),
                _ => sections.push((letter, Address::new(start, length))),
            }
        }

        sections
    }

    /// `[u8 len][utf-8 char][Address]` per first character
    fn write_dictionary(&mut self, sections: &[(char, Address)]) {
        let mut utf8 = [0u8; 4];
        for (letter, section) in sections {
            let encoded = letter.encode_utf8(&mut utf8);
            self.dictionary.push(encoded.len() as u8);
            self.dictionary.extend_from_slice(encoded.as_bytes());
            section.encode(&mut self.dictionary);
        }
    }
}

/// Stages additions and removals against an index store and flushes them.
///
/// The first mutation loads whatever the store already holds, so each
/// [`write`](IndexWriter::write) is a read-modify-write of the whole index.
pub struct IndexWriter {
    index_path: PathBuf,
    document: Option<IndexDocument>,
}

impl IndexWriter {
    /// Open a writer over a storage directory, creating it if missing
    pub fn open(index_path: &Path) -> Result<Self> {
        fs::create_dir_all(index_path)?;
        let index_path = lexical_absolute(index_path)?;

        Ok(Self {
            index_path,
            document: None,
        })
    }

    pub fn index_path(&self) -> &Path {
        &self.index_path
    }

    /// Open a reader over the same store
    pub fn reader(&self) -> Result<IndexReader> {
        IndexReader::open(&self.index_path)
    }

    /// Number of entries currently staged, if a document is open
    pub fn staged(&self) -> Option<usize> {
        self.document.as_ref().map(IndexDocument::len)
    }

    /// Stage one file with tags
    pub fn include<I, S>(&mut self, path: &Path, tags: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let Some(path) = self.resolve(path)? else {
            return Ok(());
        };
        self.document()?.add(&path, tags)
    }

    /// Stage several files sharing the same tags
    pub fn include_all<P, S>(&mut self, paths: impl IntoIterator<Item = P>, tags: &[S]) -> Result<()>
    where
        P: AsRef<Path>,
        S: AsRef<str>,
    {
        for path in paths {
            self.include(path.as_ref(), tags)?;
        }
        Ok(())
    }

    /// Remove one file from the index
    pub fn exclude(&mut self, path: &Path) -> Result<()> {
        let Some(path) = self.resolve(path)? else {
            return Ok(());
        };
        self.document()?.remove(&path)
    }

    pub fn exclude_all<P>(&mut self, paths: impl IntoIterator<Item = P>) -> Result<()>
    where
        P: AsRef<Path>,
    {
        for path in paths {
            self.exclude(path.as_ref())?;
        }
        Ok(())
    }

    /// Flush the staged document, if any, and drop it
    pub fn write(&mut self) -> Result<Option<FlushSummary>> {
        let Some(document) = self.document.take() else {
            return Ok(None);
        };
        self.flush(&document).map(Some)
    }

    /// Serialize a document into the store, replacing all four files
    pub fn flush(&self, document: &IndexDocument) -> Result<FlushSummary> {
        let image = StoreImage::build(document);
        let summary = image.summary();

        write_region(&self.index_path.join(DATA_FILE), &image.data)?;
        write_region(&self.index_path.join(ADDRESSES_FILE), &image.addresses)?;
        write_region(&self.index_path.join(KEYWORDS_FILE), &image.keywords)?;
        write_region(&self.index_path.join(DICTIONARY_FILE), &image.dictionary)?;

        log::debug!(
            "flushed {} entries, {} keywords, {} letters to {} ({} data bytes)",
            summary.entries,
            summary.keywords,
            summary.letters,
            self.index_path.display(),
            summary.data_bytes
        );
        Ok(summary)
    }

    /// Load the current store contents, or an empty document if there is no store yet
    pub fn load(&self) -> Result<IndexDocument> {
        if !IndexReader::exists(&self.index_path) {
            return Ok(IndexDocument::new());
        }
        self.reader()?.read_all()
    }

    fn document(&mut self) -> Result<&mut IndexDocument> {
        if self.document.is_none() {
            self.document = Some(self.load()?);
        }
        self.document
            .as_mut()
            .ok_or_else(|| IndexError::Inconsistent("staged document missing".to_string()))
    }

    /// Absolute form of `path`, or `None` for files living in the store directory
    fn resolve(&self, path: &Path) -> Result<Option<PathBuf>> {
        if path.as_os_str().is_empty() {
            return Err(IndexError::InvalidArgument("empty path".to_string()));
        }
        let path = lexical_absolute(path)?;
        if path.parent() == Some(self.index_path.as_path()) {
            return Ok(None);
        }
        Ok(Some(path))
    }
}

/// Absolute form of `path` with `.` and `..` segments folded away.
///
/// Purely lexical: the path need not exist, so removals of deleted files
/// still resolve to the identity they were indexed under.
fn lexical_absolute(path: &Path) -> Result<PathBuf> {
    let absolute = std::path::absolute(path)?;
    let mut normal = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                // `..` at the root stays at the root
                if matches!(normal.components().next_back(), Some(Component::Normal(_))) {
                    normal.pop();
                }
            }
            other => normal.push(other),
        }
    }
    Ok(normal)
}

/// Replace a region file with `bytes` through a mapping of exactly that size
fn write_region(path: &Path, bytes: &[u8]) -> Result<()> {
    let file = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)?;
    file.set_len(bytes.len() as u64)?;

    if bytes.is_empty() {
        return Ok(());
    }

    // SAFETY: the file was just truncated and sized by us; no other mapping
    // of it is created while this one is alive.
    let mut map = unsafe { MmapMut::map_mut(&file)? };
    map.copy_from_slice(bytes);
    map.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::ByteCursor;

    const NO_TAGS: [&str; 0] = [];

    fn sample() -> IndexDocument {
        let mut doc = IndexDocument::new();
        doc.add(Path::new("/r/beta.txt"), ["apple"]).unwrap();
        doc.add(Path::new("/r/alpha.txt"), ["avocado"]).unwrap();
        doc
    }

    #[test]
    fn test_data_region_in_file_name_order() {
        let image = StoreImage::build(&sample());
        let mut cursor = ByteCursor::new(&image.data, DATA_FILE);

        let first_len = cursor.read_len().unwrap();
        let first = IndexEntry::from_bytes(cursor.read_bytes(first_len).unwrap()).unwrap();
        let second_len = cursor.read_len().unwrap();
        let second = IndexEntry::from_bytes(cursor.read_bytes(second_len).unwrap()).unwrap();

        assert_eq!(first.file_name(), "alpha.txt");
        assert_eq!(second.file_name(), "beta.txt");
        assert!(cursor.is_empty());
    }

    #[test]
    fn test_sections_are_contiguous_per_letter() {
        let image = StoreImage::build(&sample());
        // keywords: alpha apple avocado beta r txt -> letters a, b, r, t
        assert_eq!(image.summary().keywords, 6);
        assert_eq!(image.summary().letters, 4);

        let mut dict = ByteCursor::new(&image.dictionary, DICTIONARY_FILE);
        let mut covered = 0i64;
        let mut letters = String::new();
        while !dict.is_empty() {
            let len = dict.read_u8().unwrap() as usize;
            letters.push_str(dict.read_str(len).unwrap());
            let section = Address::decode(&mut dict).unwrap();
            assert_eq!(section.start, covered);
            covered = section.end();
        }
        assert_eq!(letters, "abrt");
        assert_eq!(covered as usize, image.keywords.len());
    }

    #[test]
    fn test_address_list_counts_match() {
        let image = StoreImage::build(&sample());
        let mut lists = ByteCursor::new(&image.addresses, ADDRESSES_FILE);
        let mut total = 0;
        while !lists.is_empty() {
            let count = lists.read_len().unwrap();
            for _ in 0..count {
                let address = Address::decode(&mut lists).unwrap();
                address.range(DATA_FILE, image.data.len()).unwrap();
            }
            total += count;
        }
        // alpha, apple, avocado, beta, r x2, txt x2
        assert_eq!(total, 8);
    }

    #[test]
    fn test_empty_document_produces_empty_regions() {
        let image = StoreImage::build(&IndexDocument::new());
        assert!(image.data.is_empty());
        assert!(image.addresses.is_empty());
        assert!(image.keywords.is_empty());
        assert!(image.dictionary.is_empty());
    }

    #[test]
    fn test_multibyte_first_letter() {
        let mut doc = IndexDocument::new();
        doc.add(Path::new("/ökonomie.pdf"), Vec::<String>::new()).unwrap();
        let image = StoreImage::build(&doc);

        let mut dict = ByteCursor::new(&image.dictionary, DICTIONARY_FILE);
        let mut letters = Vec::new();
        while !dict.is_empty() {
            let len = dict.read_u8().unwrap() as usize;
            letters.push(dict.read_str(len).unwrap().to_string());
            Address::decode(&mut dict).unwrap();
        }
        assert_eq!(letters, vec!["p", "ö"]);
    }

    #[test]
    fn test_write_is_noop_without_staging() {
        let dir = tempfile::tempdir().unwrap();
        let mut writer = IndexWriter::open(dir.path()).unwrap();
        assert_eq!(writer.write().unwrap(), None);
        assert!(!IndexReader::exists(dir.path()));
    }

    #[test]
    fn test_files_inside_store_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let mut writer = IndexWriter::open(dir.path()).unwrap();
        writer
            .include(&dir.path().join(DATA_FILE), Vec::<String>::new())
            .unwrap();
        assert_eq!(writer.staged(), None);

        writer
            .include(Path::new("/elsewhere/notes.txt"), Vec::<String>::new())
            .unwrap();
        assert_eq!(writer.staged(), Some(1));
    }

    #[test]
    fn test_dot_segments_resolve_to_one_identity() {
        let dir = tempfile::tempdir().unwrap();
        let mut writer = IndexWriter::open(dir.path()).unwrap();
        writer.include(Path::new("/data/b/report.txt"), NO_TAGS).unwrap();
        writer.include(Path::new("/data/a/../b/./report.txt"), NO_TAGS).unwrap();
        assert_eq!(writer.staged(), Some(1));

        writer.exclude(Path::new("/data/a/../b/report.txt")).unwrap();
        assert_eq!(writer.staged(), Some(0));
        writer.write().unwrap();
        assert!(writer.reader().unwrap().read_all().unwrap().is_empty());

        // No phantom keyword from the folded-away segment
        writer.include(Path::new("/data/x/../b/report.txt"), NO_TAGS).unwrap();
        writer.write().unwrap();
        let doc = writer.reader().unwrap().read_all().unwrap();
        assert!(doc.contains(Path::new("/data/b/report.txt")));
        assert!(!doc.has_keyword("x"));
    }

    #[test]
    fn test_lexical_absolute() {
        assert_eq!(
            lexical_absolute(Path::new("/a/b/../c/./d.txt")).unwrap(),
            PathBuf::from("/a/c/d.txt")
        );
        assert_eq!(
            lexical_absolute(Path::new("/../../x.txt")).unwrap(),
            PathBuf::from("/x.txt")
        );
        let relative = lexical_absolute(Path::new("sub/../file.txt")).unwrap();
        assert!(relative.is_absolute());
        assert!(relative.ends_with("file.txt"));
        assert!(!relative.ends_with("sub/file.txt"));
    }

    #[test]
    fn test_write_region_replaces_contents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("region");
        write_region(&path, b"longer contents").unwrap();
        write_region(&path, b"short").unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"short");
        write_region(&path, b"").unwrap();
        assert_eq!(fs::read(&path).unwrap().len(), 0);
    }
}
