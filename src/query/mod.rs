//! Multi-keyword search over an index store.
//!
//! A pattern is split into tokens the same way paths are; each token is
//! looked up by substring, and the per-token result sets are intersected.

pub mod searcher;

pub use searcher::{IndexSearcher, SearchOptions};
