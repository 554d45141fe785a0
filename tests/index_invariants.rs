use std::fs;

use rank_eval::document::{tokenize, Analyzer, DocumentId};
use rank_eval::index::{Corpus, CorpusIndex, IndexError};
use tempfile::tempdir;

#[test]
fn invariant_query_and_document_share_normalization() {
    let index = CorpusIndex::from_pairs([("d1", "The Jazz-Piano, and PYTHON's tools!")]).unwrap();
    let query = index.query("jazz PIANO python's");

    for term in &query.terms {
        assert!(index.in_vocabulary(term), "query term {term} must be indexed identically");
    }
    assert_eq!(query.terms, vec!["jazz", "piano", "python's"]);
    assert!(!index.in_vocabulary("the"), "stop words are dropped at index time");
}

#[test]
fn invariant_tokenizer_is_deterministic() {
    let text = "Don't stop: 42 results, 42 RESULTS.";
    assert_eq!(tokenize(text), tokenize(text));
    assert_eq!(tokenize(text), vec!["don't", "stop", "42", "results", "42", "results"]);
    assert_eq!(
        Analyzer::keep_stopwords().analyze("the cat"),
        vec!["the", "cat"]
    );
}

#[test]
fn invariant_empty_corpus_is_rejected() {
    let err = CorpusIndex::build(&Corpus::default()).unwrap_err();
    assert!(matches!(err, IndexError::EmptyCorpus));
}

#[test]
fn invariant_duplicate_ids_are_rejected() {
    let err = CorpusIndex::from_pairs([("d1", "one"), ("d2", "two"), ("d1", "again")]).unwrap_err();
    assert!(matches!(err, IndexError::DuplicateDocumentId(id) if id == "d1"));
}

#[test]
fn invariant_statistics_match_the_collection() {
    let index = CorpusIndex::from_pairs([
        ("d1", "cat cat dog"),
        ("d2", "dog bird"),
        ("d3", "fish"),
    ])
    .unwrap();

    assert_eq!(index.len(), 3);
    assert_eq!(index.document_frequency("cat"), 1);
    assert_eq!(index.document_frequency("dog"), 2);
    assert_eq!(index.collection_frequency("cat"), 2);
    assert_eq!(index.total_length(), 6);
    assert!((index.average_document_length() - 2.0).abs() < 1e-12);
    assert_eq!(index.vocabulary_size(), 4);
    assert_eq!(index.term_frequency(&DocumentId::new("d1"), "cat"), 2);
    assert_eq!(index.document_length(&DocumentId::new("d3")), Some(1));
    assert_eq!(index.document_length(&DocumentId::new("d9")), None);
}

#[test]
fn invariant_corpus_version_ignores_input_order() {
    let a = CorpusIndex::from_pairs([("d1", "alpha"), ("d2", "beta")]).unwrap();
    let b = CorpusIndex::from_pairs([("d2", "beta"), ("d1", "alpha")]).unwrap();
    let c = CorpusIndex::from_pairs([("d1", "alpha"), ("d2", "gamma")]).unwrap();

    assert_eq!(a.version(), b.version());
    assert_ne!(a.version(), c.version());
    assert!(a.version().as_str().starts_with("sha256:"));
}

#[test]
fn invariant_corpus_files_in_every_layout_load_the_same() {
    let dir = tempdir().unwrap();

    let array = dir.path().join("corpus.json");
    fs::write(
        &array,
        r#"[{"id": "d1", "text": "jazz piano"}, {"id": "d2", "text": "rock guitar"}]"#,
    )
    .unwrap();

    let object = dir.path().join("object.json");
    fs::write(&object, r#"{"d1": "jazz piano", "d2": "rock guitar"}"#).unwrap();

    let lines = dir.path().join("corpus.jsonl");
    fs::write(
        &lines,
        "{\"id\": \"d1\", \"text\": \"jazz piano\"}\n\n{\"id\": \"d2\", \"text\": \"rock guitar\"}\n",
    )
    .unwrap();

    let versions: Vec<_> = [&array, &object, &lines]
        .into_iter()
        .map(|path| {
            let corpus = Corpus::load(path).unwrap();
            assert_eq!(corpus.len(), 2);
            CorpusIndex::build(&corpus).unwrap().version().clone()
        })
        .collect();

    assert_eq!(versions[0], versions[1]);
    assert_eq!(versions[1], versions[2]);
}

#[test]
fn invariant_unsupported_corpus_layout_is_rejected() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("corpus.json");
    fs::write(&path, r#"{"d1": 42}"#).unwrap();
    assert!(matches!(Corpus::load(&path), Err(IndexError::InvalidCorpusFile(_))));

    fs::write(&path, "\"just a string\"").unwrap();
    assert!(matches!(Corpus::load(&path), Err(IndexError::InvalidCorpusFile(_))));
}

#[test]
fn invariant_shipped_sample_corpus_indexes() {
    let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("data/corpus.json");
    let corpus = Corpus::load(&path).unwrap();
    let index = CorpusIndex::build(&corpus).unwrap();
    assert_eq!(index.len(), 10);
    assert!(index.in_vocabulary("learning"));
}
