//! Lexical retrieval models and graded-relevance evaluation.
//!
//! A [`CorpusIndex`](index::CorpusIndex) is built once from a corpus snapshot.
//! Four interchangeable [`Scorer`](models::Scorer)s rank it: TF-IDF cosine,
//! BM25, Jelinek-Mercer smoothed query likelihood and a boolean AND/OR/NOT
//! matcher. Ranked lists are scored by nDCG@k against judgments that cover
//! every corpus document.
//!
//! ```no_run
//! use rank_eval::index::CorpusIndex;
//! use rank_eval::ranking::Ranker;
//! use rank_eval::config::ModelParams;
//!
//! let index = CorpusIndex::from_pairs([("d1", "jazz piano"), ("d2", "rock guitar")])?;
//! let ranker = Ranker::by_name("bm25", &ModelParams::default())?;
//! let top = ranker.rank(&index, &index.query("jazz"), Some(5))?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod bench;
pub mod config;
pub mod document;
pub mod evaluation;
pub mod index;
pub mod judge;
pub mod models;
pub mod ranking;
pub mod types;
