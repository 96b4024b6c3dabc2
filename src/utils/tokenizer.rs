use std::collections::BTreeSet;
use std::path::Path;

/// Characters that separate keywords inside a path or a search pattern
pub const SEPARATORS: &[char] = &[
    ' ', '.', ',', ';', '(', ')', '[', ']', '{', '}', '/', '\\', '-', '_',
];

/// Split text on the separator set, dropping empty pieces.
/// Case is preserved; callers lowercase before or after as needed.
pub fn split_normalised(text: &str) -> impl Iterator<Item = &str> {
    text.split(SEPARATORS).filter(|part| !part.is_empty())
}

/// Lowercased tokens of a search pattern, in pattern order
pub fn pattern_tokens(pattern: &str) -> Vec<String> {
    split_normalised(pattern).map(str::to_lowercase).collect()
}

/// Lowercased path string used as the identity of an indexed file
pub fn path_key(path: &Path) -> String {
    path.to_string_lossy().to_lowercase()
}

/// Keywords derived from a full path: every separator-delimited token, lowercased
pub fn path_keywords(path: &Path) -> BTreeSet<String> {
    let lower = path_key(path);
    split_normalised(&lower).map(str::to_owned).collect()
}

/// Keywords for an entry: caller tags (lowercased, empty ones dropped) plus path tokens
pub fn entry_keywords<I, S>(path: &Path, tags: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut keywords = path_keywords(path);
    for tag in tags {
        let tag = tag.as_ref().to_lowercase();
        if !tag.is_empty() {
            keywords.insert(tag);
        }
    }
    keywords
}
