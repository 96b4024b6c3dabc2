//! Utility functions shared by the index and query layers.
//!
//! ## Modules
//!
//! - [`app_data`] - Configuration file and default storage location
//! - [`encoding`] - Little-endian primitives and the bounds-checked [`ByteCursor`]
//! - [`tokenizer`] - Separator splitting for paths and search patterns
//!
//! ## Key Functions
//!
//! ```
//! use pathdex::utils::{path_keywords, pattern_tokens};
//! use std::path::Path;
//!
//! let keywords = path_keywords(Path::new("/home/me/Annual-Report.pdf"));
//! assert!(keywords.contains("report"));
//!
//! assert_eq!(pattern_tokens("Annual report"), vec!["annual", "report"]);
//! ```

pub mod app_data;
pub mod encoding;
pub mod tokenizer;

pub use app_data::*;
pub use encoding::*;
pub use tokenizer::*;
