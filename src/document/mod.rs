pub mod analyzer;
pub mod document;

pub use crate::types::identifiers::{DocumentId, DocumentVersion};
pub use analyzer::{tokenize, Analyzer};
pub use document::Document;
