use std::sync::atomic::Ordering;

use rank_eval::config::{JudgeBackend, JudgeConfig};
use rank_eval::document::DocumentId;
use rank_eval::evaluation::{JudgmentVector, RelevanceGrade};
use rank_eval::index::CorpusIndex;
use rank_eval::judge::{
    CacheKey, FixedJudgments, HeuristicJudge, JudgeError, JudgmentCache, LlmJudge,
    RelevanceOracle, ResolvedBackend,
};
use tempfile::tempdir;

fn index() -> CorpusIndex {
    CorpusIndex::from_pairs([
        ("d1", "Machine learning builds models from data."),
        ("d2", "Learning to play the piano."),
        ("d3", "Car insurance premiums explained."),
    ])
    .unwrap()
}

fn offline_config(backend: JudgeBackend, cache_path: std::path::PathBuf) -> JudgeConfig {
    JudgeConfig {
        backend,
        gemini_api_key: None,
        groq_api_key: None,
        cache_path,
        ..JudgeConfig::default()
    }
}

#[test]
fn invariant_heuristic_judges_every_document() {
    let index = index();
    let judgments = HeuristicJudge.judge("machine learning models", &index).unwrap();

    judgments.check_coverage(&index).unwrap();
    assert_eq!(judgments.grade(&DocumentId::new("d1")), Some(RelevanceGrade::High));
    assert_eq!(judgments.grade(&DocumentId::new("d2")), Some(RelevanceGrade::Partial));
    assert_eq!(judgments.grade(&DocumentId::new("d3")), Some(RelevanceGrade::NotRelevant));
}

#[test]
fn invariant_auto_without_keys_uses_heuristic() {
    let dir = tempdir().unwrap();
    let judge = LlmJudge::new(offline_config(JudgeBackend::Auto, dir.path().join("cache.json"))).unwrap();
    assert_eq!(judge.backend(), ResolvedBackend::Heuristic);
    assert_eq!(judge.describe().backend, "heuristic");

    let index = index();
    let judgments = judge.judge("machine learning models", &index).unwrap();
    assert_eq!(judgments, HeuristicJudge.judge("machine learning models", &index).unwrap());
}

#[test]
fn invariant_cached_grades_are_reused() {
    let dir = tempdir().unwrap();
    let cache_path = dir.path().join("judge").join("cache.json");
    let index = index();

    let first = LlmJudge::new(offline_config(JudgeBackend::Heuristic, cache_path.clone())).unwrap();
    let judged = first.judge("piano lessons", &index).unwrap();
    assert_eq!(first.stats().misses.load(Ordering::Relaxed), 3);
    assert_eq!(first.stats().hits.load(Ordering::Relaxed), 0);
    assert!(cache_path.exists(), "cache file must be written");

    let second = LlmJudge::new(offline_config(JudgeBackend::Heuristic, cache_path.clone())).unwrap();
    let rejudged = second.judge("piano lessons", &index).unwrap();
    assert_eq!(rejudged, judged);
    assert_eq!(second.stats().hits.load(Ordering::Relaxed), 3);
    assert_eq!(second.stats().misses.load(Ordering::Relaxed), 0);
}

#[test]
fn invariant_forced_backend_without_key_fails_on_cache_miss() {
    let dir = tempdir().unwrap();
    let judge = LlmJudge::new(offline_config(JudgeBackend::Groq, dir.path().join("cache.json"))).unwrap();
    assert_eq!(judge.backend(), ResolvedBackend::Groq);

    let err = judge.judge("anything", &index()).unwrap_err();
    assert!(matches!(err, JudgeError::NotConfigured("groq")));
}

#[test]
fn invariant_forced_backend_without_key_serves_cached_grades() {
    let dir = tempdir().unwrap();
    let cache_path = dir.path().join("cache.json");
    let config = offline_config(JudgeBackend::Groq, cache_path.clone());
    let index = index();

    let mut cache = JudgmentCache::open(&cache_path).unwrap();
    for (document, grade) in index.documents().iter().zip([
        RelevanceGrade::High,
        RelevanceGrade::NotRelevant,
        RelevanceGrade::Partial,
    ]) {
        let key = CacheKey {
            backend: config.backend.as_str(),
            gemini_model: &config.gemini_model,
            groq_model: &config.groq_model,
            query: "machine learning",
            document,
        };
        cache.insert(&key, grade);
    }
    cache.save().unwrap();

    let judge = LlmJudge::new(config).unwrap();
    let judgments = judge.judge("machine learning", &index).unwrap();
    assert_eq!(
        judgments,
        JudgmentVector::from_grades([("d1", 2), ("d2", 0), ("d3", 1)]).unwrap()
    );
}

#[test]
fn invariant_fixed_judgments_prefer_query_specific_vectors() {
    let index = index();
    let uniform = JudgmentVector::from_grades([("d1", 0), ("d2", 0), ("d3", 0)]).unwrap();
    let specific = JudgmentVector::from_grades([("d1", 2), ("d2", 1), ("d3", 0)]).unwrap();

    let oracle = FixedJudgments::uniform(uniform.clone()).with_query("learning", specific.clone());
    assert_eq!(oracle.judge("learning", &index).unwrap(), specific);
    assert_eq!(oracle.judge("other", &index).unwrap(), uniform);

    let empty = FixedJudgments::default();
    assert!(matches!(empty.judge("q", &index), Err(JudgeError::UnknownQuery(q)) if q == "q"));
}
