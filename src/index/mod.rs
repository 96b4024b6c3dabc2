pub mod document;
pub mod reader;
pub mod stats;
pub mod types;
pub mod writer;

pub use document::IndexDocument;
pub use reader::{IndexReader, IndexStats};
pub use types::*;
pub use writer::{FlushSummary, IndexWriter, StoreImage};
