pub mod corpus;
pub mod corpus_index;

pub use corpus::{Corpus, CorpusEntry};
pub use corpus_index::{CorpusIndex, IndexError};
