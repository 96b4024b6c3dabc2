//! # pathdex - Embedded File Path Search Engine
//!
//! pathdex keeps a persistent inverted index from normalized keywords to the
//! files they were derived from, and answers multi-keyword AND queries over
//! it through memory-mapped lookups, without loading the whole index.
//!
//! ## Architecture
//!
//! The crate is organized into these main modules:
//!
//! - [`index`] - Staging document, four-file writer, memory-mapped reader
//! - [`query`] - Multi-keyword search with exclusions and result caps
//! - [`output`] - Result formatting (plain or JSON lines)
//! - [`utils`] - Tokenizer, binary encoding helpers, configuration
//! - [`error`] - Error type shared by every module
//!
//! ## Quick Start
//!
//! ```no_run
//! use pathdex::index::{IndexReader, IndexWriter};
//! use pathdex::query::{IndexSearcher, SearchOptions};
//! use std::path::Path;
//!
//! # fn main() -> pathdex::Result<()> {
//! let store = Path::new("/tmp/pathdex-store");
//!
//! // Stage files and flush them to the store
//! let mut writer = IndexWriter::open(store)?;
//! writer.include(Path::new("/docs/report-final.txt"), ["work"])?;
//! writer.include(Path::new("/docs/report-draft.txt"), ["work"])?;
//! writer.write()?;
//!
//! // Query the store
//! let reader = IndexReader::open(store)?;
//! let searcher = IndexSearcher::new(&reader);
//! let options = SearchOptions::new().exclude(["draft"]);
//! for entry in searcher.search_with("report", &options)? {
//!     println!("{}", entry.path().display());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Storage
//!
//! A store is a directory holding four raw regions:
//!
//! 1. **dictionary** - first character -> section of the keyword region
//! 2. **keywords** - keyword -> its list in the address region
//! 3. **addresses** - per-keyword lists of entry addresses
//! 4. **data** - the serialized entries
//!
//! Every flush rewrites all four files. A flush interrupted midway leaves
//! them inconsistent with each other; there is no recovery.

pub mod error;
pub mod index;
pub mod output;
pub mod query;
pub mod utils;

pub use error::{IndexError, Result};
pub use index::{Address, IndexDocument, IndexEntry, IndexReader, IndexWriter};
pub use query::{IndexSearcher, SearchOptions};
