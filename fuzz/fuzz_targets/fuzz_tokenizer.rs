#![no_main]

use libfuzzer_sys::fuzz_target;
use std::path::Path;

fuzz_target!(|data: &str| {
    let tokens = pathdex::utils::pattern_tokens(data);
    assert!(tokens.iter().all(|t| !t.is_empty()));

    let keywords = pathdex::utils::path_keywords(Path::new(data));
    assert!(keywords.iter().all(|k| !k.is_empty()));
});
