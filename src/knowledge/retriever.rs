//! 키워드 검색기 - 점수 계산, 정렬, 거부 게이트
//!
//! 점수 = 질의 키워드와 청크 키워드의 교집합 크기.
//! 최고 점수가 `min_score` 미만이면 빈 결과를 반환합니다 (거부).
//! 빈 결과는 "답하지 말 것"이라는 명시적 신호입니다.

use serde::{Deserialize, Serialize};

use super::corpus::Corpus;
use super::fragment::{Fragment, ScoredFragment};
use super::keywords::{extract_keywords, KeywordSet};

// ============================================================================
// Options
// ============================================================================

/// 검색 옵션
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrieveOptions {
    /// 최대 반환 개수
    pub top_k: usize,
    /// 거부 임계값 (최고 점수가 이 값 미만이면 거부)
    ///
    /// 2-gram 기준 경험적으로 3~5 범위가 적당합니다.
    /// 2는 오탐이 늘고, 4 이상은 매우 엄격합니다.
    pub min_score: usize,
}

impl Default for RetrieveOptions {
    fn default() -> Self {
        Self {
            top_k: 3,
            min_score: 3,
        }
    }
}

impl RetrieveOptions {
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn with_min_score(mut self, min_score: usize) -> Self {
        self.min_score = min_score;
        self
    }
}

// ============================================================================
// Ranking
// ============================================================================

/// 전체 후보 순위 (게이트/자르기 없음)
///
/// 점수 0인 청크는 제외하고, 점수 내림차순으로 정렬합니다.
/// 동점이면 입력 순서를 유지합니다 (stable sort).
pub fn rank_fragments(query: &str, fragments: &[Fragment]) -> Vec<ScoredFragment> {
    let keywords = extract_keywords(query);
    rank_with_keywords(&keywords, fragments)
}

fn rank_with_keywords(keywords: &KeywordSet, fragments: &[Fragment]) -> Vec<ScoredFragment> {
    let mut scored: Vec<ScoredFragment> = fragments
        .iter()
        .filter_map(|fragment| {
            let score = keywords.overlap(&extract_keywords(fragment.text()));
            (score > 0).then(|| ScoredFragment::new(fragment, score))
        })
        .collect();

    scored.sort_by(|a, b| b.score().cmp(&a.score()));
    scored
}

/// 키워드 매칭 검색
///
/// # Arguments
/// * `query` - 사용자 질문
/// * `fragments` - 전체 청크 (읽기 전용)
/// * `options` - `top_k`, `min_score`
///
/// # Returns
/// 최대 `top_k`개의 점수 붙은 청크. 최고 점수 < `min_score`이면 빈 벡터 (거부)
pub fn simple_retrieve(
    query: &str,
    fragments: &[Fragment],
    options: &RetrieveOptions,
) -> Vec<ScoredFragment> {
    let keywords = extract_keywords(query);
    let mut ranked = rank_with_keywords(&keywords, fragments);

    let top_score = ranked.first().map(ScoredFragment::score).unwrap_or(0);
    if ranked.is_empty() || top_score < options.min_score {
        tracing::debug!(
            "Refused: top score {} < min_score {} (query keywords: {})",
            top_score,
            options.min_score,
            keywords.len()
        );
        return Vec::new();
    }

    ranked.truncate(options.top_k);
    ranked
}

// ============================================================================
// Retriever
// ============================================================================

/// 코퍼스 + 옵션을 묶은 검색기
pub struct Retriever {
    corpus: Corpus,
    options: RetrieveOptions,
}

impl Retriever {
    pub fn new(corpus: Corpus, options: RetrieveOptions) -> Self {
        Self { corpus, options }
    }

    /// 게이트 적용 검색
    pub fn retrieve(&self, query: &str) -> Vec<ScoredFragment> {
        simple_retrieve(query, self.corpus.fragments(), &self.options)
    }

    /// 거부 여부와 무관하게 전체 후보 순위
    pub fn explain(&self, query: &str) -> Vec<ScoredFragment> {
        rank_fragments(query, self.corpus.fragments())
    }

    pub fn corpus(&self) -> &Corpus {
        &self.corpus
    }

    pub fn options(&self) -> &RetrieveOptions {
        &self.options
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    use crate::knowledge::corpus::Page;
    use crate::knowledge::fragment::{build_chunks, ChunkConfig};

    fn corpus_of(texts: &[&str]) -> Vec<Fragment> {
        // 페이지 하나당 청크 하나가 되도록 큰 윈도우 사용
        texts
            .iter()
            .enumerate()
            .flat_map(|(i, t)| build_chunks(t, i as u32 + 1, 1000, 0).unwrap())
            .collect()
    }

    fn ids(results: &[ScoredFragment]) -> Vec<&str> {
        results.iter().map(|r| r.id()).collect()
    }

    #[test]
    fn test_retrieve_ranks_by_score() {
        let fragments = corpus_of(&[
            "项目边界包括拒答",
            "最小验收标准：能准确回答文档内的问题",
            "验收标准",
        ]);

        let results = simple_retrieve("最小验收标准是什么", &fragments, &RetrieveOptions::default());

        // p2: 最小, 小验, 验收, 收标, 标准 = 5 / p3: 验收, 收标, 标准 = 3
        assert_eq!(ids(&results), vec!["p2-c0", "p3-c0"]);
        assert_eq!(results[0].score(), 5);
        assert_eq!(results[1].score(), 3);
    }

    #[test]
    fn test_zero_overlap_refuses() {
        let fragments = corpus_of(&["最小验收标准", "核心原则"]);
        let results = simple_retrieve("今天天气怎么样", &fragments, &RetrieveOptions::default());
        assert!(results.is_empty());
    }

    #[test]
    fn test_below_threshold_refuses() {
        let fragments = corpus_of(&["retrieve chunk text"]);

        // 점수 2 < 3
        let results = simple_retrieve("retrieve chunk", &fragments, &RetrieveOptions::default());
        assert!(results.is_empty());

        let lenient = RetrieveOptions::default().with_min_score(2);
        let results = simple_retrieve("retrieve chunk", &fragments, &lenient);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].score(), 2);
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let fragments = corpus_of(&["alpha beta gamma delta"]);
        let results = simple_retrieve("alpha beta gamma", &fragments, &RetrieveOptions::default());
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].score(), 3);
    }

    #[test]
    fn test_tie_keeps_input_order() {
        // 페이지 번호가 큰 청크를 먼저 넣어 입력 순서와 페이지/ID 순서를 구분
        let mut fragments = build_chunks("one two three", 5, 1000, 0).unwrap();
        fragments.extend(build_chunks("x one two three y", 9, 1000, 0).unwrap());
        fragments.extend(build_chunks("one two three", 2, 1000, 0).unwrap());

        let results = simple_retrieve("one two three", &fragments, &RetrieveOptions::default());
        assert_eq!(ids(&results), vec!["p5-c0", "p9-c0", "p2-c0"]);
    }

    #[test]
    fn test_top_k_truncates() {
        let fragments = corpus_of(&["a b c d", "a b c", "a b c x", "a b c y"]);
        let options = RetrieveOptions::default().with_top_k(2);
        let results = simple_retrieve("a b c d", &fragments, &options);

        assert_eq!(ids(&results), vec!["p1-c0", "p2-c0"]);
        assert_eq!(results[0].score(), 4);
    }

    #[test]
    fn test_low_scores_follow_a_passing_top() {
        // 게이트는 최고 점수만 봄; 나머지는 임계값 미만이어도 포함
        let fragments = corpus_of(&["a b c", "a"]);
        let results = simple_retrieve("a b c", &fragments, &RetrieveOptions::default());
        assert_eq!(ids(&results), vec!["p1-c0", "p2-c0"]);
        assert_eq!(results[1].score(), 1);
    }

    #[test]
    fn test_score_bound() {
        let fragments = corpus_of(&["a b c d e", "c d", "验收标准 a"]);
        let query = "a b c 验收标准";
        let max = extract_keywords(query).len();

        for scored in rank_fragments(query, &fragments) {
            assert!(scored.score() >= 1);
            assert!(scored.score() <= max);
        }
    }

    #[test]
    fn test_refusal_monotonic_in_min_score() {
        let fragments = corpus_of(&["a b c d e", "a b", "验收标准"]);
        let queries = ["a b c", "a", "验收标准", "z", "a b c d e f"];

        let mut previously_refused: HashSet<&str> = HashSet::new();
        for min_score in 0..8 {
            let options = RetrieveOptions::default().with_min_score(min_score);
            let refused: HashSet<&str> = queries
                .iter()
                .copied()
                .filter(|q| simple_retrieve(q, &fragments, &options).is_empty())
                .collect();
            assert!(
                previously_refused.is_subset(&refused),
                "min_score {}: {:?} -> {:?}",
                min_score,
                previously_refused,
                refused
            );
            previously_refused = refused;
        }
    }

    #[test]
    fn test_retrieve_deterministic() {
        let fragments = corpus_of(&["a b c", "b c d", "c d e"]);
        let options = RetrieveOptions::default().with_min_score(1);
        let a = simple_retrieve("b c", &fragments, &options);
        let b = simple_retrieve("b c", &fragments, &options);
        assert_eq!(a, b);
    }

    #[test]
    fn test_input_fragments_untouched() {
        let fragments = corpus_of(&["a b c"]);
        let snapshot = fragments.clone();
        let _ = simple_retrieve("a b c", &fragments, &RetrieveOptions::default());
        assert_eq!(fragments, snapshot);
    }

    #[test]
    fn test_retriever_explain_ignores_gate() {
        let pages = vec![Page::new(1, "retrieve chunk text"), Page::new(2, "nothing")];
        let corpus = Corpus::build(pages, &ChunkConfig::default()).unwrap();
        let retriever = Retriever::new(corpus, RetrieveOptions::default());

        assert!(retriever.retrieve("retrieve chunk").is_empty());

        let explained = retriever.explain("retrieve chunk");
        assert_eq!(ids(&explained), vec!["p1-c0"]);
        assert_eq!(explained[0].score(), 2);
    }

    #[test]
    fn test_options_default() {
        let options = RetrieveOptions::default();
        assert_eq!(options.top_k, 3);
        assert_eq!(options.min_score, 3);
    }
}
