pub mod identifiers;
pub mod results;

pub use identifiers::{CorpusVersion, DocumentId, DocumentVersion};
pub use results::{
    BenchmarkReport, JudgeDescription, ModelRun, ModelSummary, Query, QueryReport, ScoredResult,
};
