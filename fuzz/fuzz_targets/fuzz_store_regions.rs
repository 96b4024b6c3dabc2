#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use pathdex::index::{ADDRESSES_FILE, DATA_FILE, DICTIONARY_FILE, IndexReader, KEYWORDS_FILE};
use std::fs;

#[derive(Arbitrary, Debug)]
struct Regions {
    dictionary: Vec<u8>,
    keywords: Vec<u8>,
    addresses: Vec<u8>,
    data: Vec<u8>,
    query: String,
}

fuzz_target!(|regions: Regions| {
    // Garbage regions must surface as corruption errors, never panics
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join(DICTIONARY_FILE), &regions.dictionary).unwrap();
    fs::write(dir.path().join(KEYWORDS_FILE), &regions.keywords).unwrap();
    fs::write(dir.path().join(ADDRESSES_FILE), &regions.addresses).unwrap();
    fs::write(dir.path().join(DATA_FILE), &regions.data).unwrap();

    let reader = IndexReader::open(dir.path()).unwrap();
    let _ = reader.read_all();
    let _ = reader.stats();
    let _ = reader.read_by_keyword(&regions.query);
});
