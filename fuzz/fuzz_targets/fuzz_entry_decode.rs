#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Arbitrary bytes must decode or fail with an error, never panic
    let _ = pathdex::IndexEntry::from_bytes(data);
});
