use std::collections::BTreeSet;

use rank_eval::document::DocumentId;
use rank_eval::index::CorpusIndex;
use rank_eval::models::{
    BooleanModel, Bm25Model, JelinekMercerModel, Scorer, SyntaxError, VectorSpaceModel,
};
use rank_eval::ranking::{Ranker, RankingError};
use rank_eval::types::ScoredResult;

fn animals() -> CorpusIndex {
    CorpusIndex::from_pairs([("d1", "cat cat dog"), ("d2", "dog bird"), ("d3", "fish")]).unwrap()
}

fn score_of(results: &[ScoredResult], id: &str) -> f64 {
    results
        .iter()
        .find(|r| r.id.as_str() == id)
        .map(|r| r.score)
        .expect("document must be scored")
}

fn matching(index: &CorpusIndex, raw: &str) -> BTreeSet<String> {
    BooleanModel::matches(index, raw)
        .unwrap()
        .into_iter()
        .map(|id| id.as_str().to_string())
        .collect()
}

#[test]
fn invariant_tfidf_weight_matches_hand_computation() {
    let index = animals();
    let d1 = index.document(&DocumentId::new("d1")).unwrap();

    let expected = (1.0 + 2f64.log10()) * 3f64.log10();
    assert!((VectorSpaceModel::term_weight(&index, d1, "cat") - expected).abs() < 1e-9);

    let results = VectorSpaceModel.score(&index, &index.query("cat")).unwrap();
    let cat = (1.0 + 2f64.log10()) * 3f64.log10();
    let dog = 1.5f64.log10();
    let expected_cosine = cat / (cat * cat + dog * dog).sqrt();
    assert!((score_of(&results, "d1") - expected_cosine).abs() < 1e-9);
    assert_eq!(score_of(&results, "d2"), 0.0);
}

#[test]
fn invariant_tfidf_uses_decimal_logarithms() {
    let index = CorpusIndex::from_pairs([
        ("d0", "bird dog dog fish"),
        ("d1", "cat fish cow cat dog"),
        ("d2", "cat bird cow fish cow"),
        ("d3", "bird bird cow fish"),
    ])
    .unwrap();

    let ranked = Ranker::new(VectorSpaceModel)
        .rank(&index, &index.query("cow fish"), None)
        .unwrap();
    let ids: Vec<&str> = ranked.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, ["d3", "d2", "d1", "d0"]);

    // cow is the only weighted query term, so cosine is w(cow, d) / |d|.
    let idf_cow = (4.0f64 / 3.0).log10();
    let idf_bird = idf_cow;
    let d3_norm = (((1.0 + 2f64.log10()) * idf_bird).powi(2) + idf_cow.powi(2)).sqrt();
    assert!((score_of(&ranked, "d3") - idf_cow / d3_norm).abs() < 1e-9);
    assert_eq!(score_of(&ranked, "d0"), 0.0);
}

#[test]
fn invariant_cosine_lies_in_unit_interval() {
    let index = animals();
    for raw in ["cat", "dog bird", "cat dog bird fish", "unicorn", ""] {
        let results = VectorSpaceModel.score(&index, &index.query(raw)).unwrap();
        assert_eq!(results.len(), index.len());
        for r in &results {
            assert!((0.0..=1.0 + 1e-12).contains(&r.score), "{raw}: {} out of range", r.score);
        }
    }
}

#[test]
fn invariant_bm25_is_non_negative_and_hand_computed() {
    let index = animals();
    let results = Bm25Model::default().score(&index, &index.query("fish")).unwrap();

    let idf = (8.0f64 / 3.0).ln();
    let length_norm = 1.0 - 0.75 + 0.75 * (1.0 / 2.0);
    let expected = idf * 2.5 / (1.0 + 1.5 * length_norm);
    assert!((score_of(&results, "d3") - expected).abs() < 1e-9);

    for raw in ["cat dog", "dog", "bird fish cat", "unicorn"] {
        for r in Bm25Model::default().score(&index, &index.query(raw)).unwrap() {
            assert!(r.score >= 0.0, "{raw}: negative BM25 score {}", r.score);
        }
    }
}

#[test]
fn invariant_bm25_rewards_term_frequency() {
    let index = CorpusIndex::from_pairs([("a", "rust rust code"), ("b", "rust code guide")]).unwrap();
    let results = Bm25Model::default().score(&index, &index.query("rust")).unwrap();
    assert!(score_of(&results, "a") > score_of(&results, "b"));
}

#[test]
fn invariant_language_model_is_smoothed_and_finite() {
    let index = animals();
    let model = JelinekMercerModel::default();
    let results = model.score(&index, &index.query("cat unicorn")).unwrap();

    assert!((score_of(&results, "d2") - (1.0f64 / 6.0).ln()).abs() < 1e-9);
    for r in &results {
        assert!(r.score.is_finite(), "{} has non-finite score", r.id);
    }
    assert!(score_of(&results, "d1") > score_of(&results, "d2"));
}

#[test]
fn invariant_boolean_precedence_and_negation() {
    let index =
        CorpusIndex::from_pairs([("D1", "cat dog"), ("D2", "dog"), ("D3", "bird")]).unwrap();

    assert_eq!(matching(&index, "dog AND NOT cat"), BTreeSet::from(["D2".to_string()]));
    assert_eq!(
        matching(&index, "bird OR dog AND cat"),
        BTreeSet::from(["D1".to_string(), "D3".to_string()])
    );
    assert_eq!(matching(&index, "(bird OR dog) AND NOT cat"), BTreeSet::from(["D2".to_string(), "D3".to_string()]));
    assert_eq!(matching(&index, "dog cat"), BTreeSet::from(["D1".to_string()]));
    assert_eq!(matching(&index, "not Dog"), BTreeSet::from(["D3".to_string()]));
}

#[test]
fn invariant_boolean_accepts_nested_expression() {
    let index = animals();
    assert!(BooleanModel::matches(&index, "a AND (b OR NOT c)").is_ok());
}

#[test]
fn invariant_boolean_syntax_errors() {
    let index = animals();
    assert!(matches!(
        BooleanModel::matches(&index, "a AND"),
        Err(SyntaxError::MissingOperand { .. })
    ));
    assert!(matches!(
        BooleanModel::matches(&index, "(a AND b"),
        Err(SyntaxError::UnmatchedParenthesis { .. })
    ));
    assert!(matches!(
        BooleanModel::matches(&index, "cat )"),
        Err(SyntaxError::UnmatchedParenthesis { .. })
    ));
    assert!(matches!(BooleanModel::matches(&index, "   "), Err(SyntaxError::EmptyQuery)));

    let err = BooleanModel.score(&index, &index.query("OR cat")).unwrap_err();
    assert!(matches!(err, RankingError::Syntax(SyntaxError::MissingOperand { .. })));
}

#[test]
fn invariant_boolean_rejects_runaway_nesting() {
    let index = animals();
    let parens = format!("{}cat", "(".repeat(100_000));
    assert!(matches!(
        BooleanModel::matches(&index, &parens),
        Err(SyntaxError::TooManyTokens { .. })
    ));

    let negations = format!("{}cat", "NOT ".repeat(200));
    let err = BooleanModel.score(&index, &index.query(&negations)).unwrap_err();
    assert!(matches!(err, RankingError::Syntax(SyntaxError::NestingTooDeep { .. })));

    let shallow = format!("{}cat{}", "(".repeat(32), ")".repeat(32));
    assert_eq!(matching(&index, &shallow), BTreeSet::from(["d1".to_string()]));
}

#[test]
fn invariant_boolean_returns_only_matches_with_uniform_score() {
    let index = animals();
    let results = BooleanModel.score(&index, &index.query("dog")).unwrap();
    let ids: BTreeSet<_> = results.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, BTreeSet::from(["d1", "d2"]));
    assert!(results.iter().all(|r| r.score == BooleanModel::MATCH_SCORE));
}
