//! Integration tests for multi-keyword search over a flushed store.

use pathdex::index::{IndexDocument, IndexReader, IndexWriter};
use pathdex::query::{IndexSearcher, SearchOptions};
use std::path::Path;

const NO_TAGS: [&str; 0] = [];

/// Store built from (path, tags) pairs; the temp dir must outlive the reader
fn open_store(files: &[(&str, &[&str])]) -> (tempfile::TempDir, IndexReader) {
    let dir = tempfile::tempdir().unwrap();
    let mut doc = IndexDocument::new();
    for (path, tags) in files {
        doc.add(Path::new(path), tags.iter()).unwrap();
    }
    IndexWriter::open(dir.path()).unwrap().flush(&doc).unwrap();
    let reader = IndexReader::open(dir.path()).unwrap();
    (dir, reader)
}

fn names(entries: &[pathdex::IndexEntry]) -> Vec<String> {
    entries.iter().map(|e| e.file_name().into_owned()).collect()
}

fn report_store() -> (tempfile::TempDir, IndexReader) {
    open_store(&[
        ("/s/a.txt", &["report", "final"]),
        ("/s/b.txt", &["report", "draft"]),
    ])
}

#[test]
fn test_and_search_requires_every_token() {
    let (_dir, reader) = report_store();
    let searcher = IndexSearcher::new(&reader);

    assert_eq!(names(&searcher.search("report final").unwrap()), vec!["a.txt"]);
    assert_eq!(names(&searcher.search("report").unwrap()), vec!["a.txt", "b.txt"]);
    assert!(searcher.search("report missing").unwrap().is_empty());
}

#[test]
fn test_exclusion_filters_candidates() {
    let (_dir, reader) = report_store();
    let searcher = IndexSearcher::new(&reader);

    let options = SearchOptions::new().exclude(["draft"]);
    assert_eq!(names(&searcher.search_with("report", &options).unwrap()), vec!["a.txt"]);

    // Exclusion is substring containment on keywords, case-insensitive
    let options = SearchOptions::new().exclude(["FIN"]);
    assert_eq!(names(&searcher.search_with("report", &options).unwrap()), vec!["b.txt"]);
}

#[test]
fn test_exclusion_applies_to_later_tokens_too() {
    let (_dir, reader) = report_store();
    let searcher = IndexSearcher::new(&reader);

    let options = SearchOptions::new().exclude(["draft"]);
    let found = searcher.search_with("txt report", &options).unwrap();
    assert_eq!(names(&found), vec!["a.txt"]);
}

#[test]
fn test_empty_exclusion_terms_are_ignored() {
    let (_dir, reader) = report_store();
    let searcher = IndexSearcher::new(&reader);

    let options = SearchOptions::new().exclude([""]);
    assert_eq!(searcher.search_with("report", &options).unwrap().len(), 2);
}

#[test]
fn test_max_results_caps_and_sorts() {
    let (_dir, reader) = open_store(&[
        ("/p/echo.log", &[]),
        ("/p/delta.log", &[]),
        ("/p/charlie.log", &[]),
        ("/p/bravo.log", &[]),
        ("/p/alpha.log", &[]),
    ]);
    let searcher = IndexSearcher::new(&reader);

    assert_eq!(searcher.search("log").unwrap().len(), 5);

    let capped = searcher
        .search_with("log", &SearchOptions::new().max_results(2))
        .unwrap();
    assert_eq!(capped.len(), 2);
    let mut sorted = names(&capped);
    sorted.sort();
    assert_eq!(names(&capped), sorted);

    let unbounded = searcher
        .search_with("log", &SearchOptions::new().max_results(0))
        .unwrap();
    assert_eq!(unbounded.len(), 5);
}

#[test]
fn test_empty_pattern_returns_nothing() {
    let (_dir, reader) = report_store();
    let searcher = IndexSearcher::new(&reader);
    assert!(searcher.search("").unwrap().is_empty());
    assert!(searcher.search(" - _ . ").unwrap().is_empty());
}

#[test]
fn test_pattern_uses_path_separators() {
    let (_dir, reader) = open_store(&[
        ("/home/user/Quarterly-Report.xlsx", &[]),
        ("/home/user/notes.txt", &[]),
    ]);
    let searcher = IndexSearcher::new(&reader);

    let found = searcher.search("quarterly_report.XLSX").unwrap();
    assert_eq!(names(&found), vec!["quarterly-report.xlsx"]);
}

#[test]
fn test_tokens_match_by_substring() {
    let (_dir, reader) = open_store(&[("/a/b/document.txt", &[])]);
    let searcher = IndexSearcher::new(&reader);

    assert_eq!(searcher.search("doc").unwrap().len(), 1);
    assert_eq!(searcher.search("doc tx").unwrap().len(), 1);
    assert!(searcher.search("doc pdf").unwrap().is_empty());
}

#[test]
fn test_case_insensitive_identity_in_results() {
    let dir = tempfile::tempdir().unwrap();
    let mut doc = IndexDocument::new();
    doc.add(Path::new("/A/B.txt"), NO_TAGS).unwrap();
    doc.add(Path::new("/a/b.txt"), ["extra"]).unwrap();
    assert_eq!(doc.len(), 1);

    IndexWriter::open(dir.path()).unwrap().flush(&doc).unwrap();
    let reader = IndexReader::open(dir.path()).unwrap();
    let searcher = IndexSearcher::new(&reader);
    assert_eq!(searcher.search("b txt").unwrap().len(), 1);
    assert!(searcher.search("extra").unwrap().is_empty());
}
