use std::collections::HashSet;

use rank_eval::config::ModelParams;
use rank_eval::document::DocumentId;
use rank_eval::index::CorpusIndex;
use rank_eval::models::ModelKind;
use rank_eval::ranking::{sort_ranked, Ranker, RankingError};
use rank_eval::types::ScoredResult;

fn sample_index() -> CorpusIndex {
    CorpusIndex::from_pairs([
        ("d3", "machine learning systems learn from data"),
        ("d1", "deep learning neural networks"),
        ("d2", "car insurance premiums"),
        ("d5", "machine translation"),
        ("d4", "learning to cook pasta"),
    ])
    .unwrap()
}

#[test]
fn invariant_ranking_is_ordered_and_duplicate_free() {
    let index = sample_index();
    let params = ModelParams::default();

    for kind in ModelKind::ALL {
        let ranker = Ranker::new(kind.scorer(&params));
        let ranked = ranker.rank(&index, &index.query("machine learning"), None).unwrap();

        let unique: HashSet<&DocumentId> = ranked.iter().map(|r| &r.id).collect();
        assert_eq!(unique.len(), ranked.len(), "{kind}: duplicate documents");

        for pair in ranked.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            assert!(
                a.score > b.score || (a.score == b.score && a.id < b.id),
                "{kind}: {} ({}) must precede {} ({})",
                a.id,
                a.score,
                b.id,
                b.score
            );
        }
    }
}

#[test]
fn invariant_ties_break_by_identifier() {
    let index = sample_index();
    let ranker = Ranker::by_name("boolean", &ModelParams::default()).unwrap();
    let ranked = ranker.rank(&index, &index.query("learning"), None).unwrap();
    let ids: Vec<&str> = ranked.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, ["d1", "d3", "d4"]);

    let mut results = vec![
        ScoredResult::new("b".into(), 1.0),
        ScoredResult::new("c".into(), 2.0),
        ScoredResult::new("a".into(), 1.0),
    ];
    sort_ranked(&mut results);
    let ids: Vec<&str> = results.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, ["c", "a", "b"]);
}

#[test]
fn invariant_top_k_truncates_without_reordering() {
    let index = sample_index();
    let ranker = Ranker::by_name("bm25", &ModelParams::default()).unwrap();
    let query = index.query("machine learning");

    let full = ranker.rank(&index, &query, None).unwrap();
    let top = ranker.rank(&index, &query, Some(2)).unwrap();
    assert_eq!(top.len(), 2);
    assert_eq!(top, full[..2].to_vec());

    let beyond = ranker.rank(&index, &query, Some(50)).unwrap();
    assert_eq!(beyond.len(), index.len());
    assert!(ranker.rank(&index, &query, Some(0)).unwrap().is_empty());
}

#[test]
fn invariant_ranking_is_deterministic() {
    let params = ModelParams::default();
    for kind in ModelKind::ALL {
        let render = || {
            let index = sample_index();
            let ranked = Ranker::new(kind.scorer(&params))
                .rank(&index, &index.query("machine learning data"), Some(3))
                .unwrap();
            serde_json::to_string(&ranked).unwrap()
        };
        assert_eq!(render(), render(), "{kind} output must be byte-identical");
    }
}

#[test]
fn invariant_unknown_model_is_rejected() {
    let err = Ranker::by_name("pagerank", &ModelParams::default()).err().unwrap();
    assert!(matches!(err, RankingError::UnknownModel(name) if name == "pagerank"));
}
