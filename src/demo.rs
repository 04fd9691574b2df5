//! 내장 데모 코퍼스
//!
//! 파일을 지정하지 않으면 이 두 페이지와 라벨된 질의 세트를 사용합니다.
//! 페이지 번호는 출처 추적의 핵심이므로 그대로 유지합니다.

use crate::extractor::parse_page_map;
use crate::knowledge::{ChunkConfig, Page};
use crate::regression::{parse_test_cases, TestCase};

const DEMO_PAGES: &str = include_str!("../data/demo_pages.json");
const DEMO_TEST_CASES: &str = include_str!("../data/demo_test_cases.json");

/// 데모 페이지
pub fn demo_pages() -> Vec<Page> {
    parse_page_map(DEMO_PAGES).expect("bundled demo pages are valid JSON")
}

/// 데모 회귀 테스트 케이스
pub fn demo_test_cases() -> Vec<TestCase> {
    parse_test_cases(DEMO_TEST_CASES).expect("bundled demo test cases are valid JSON")
}

/// 데모 코퍼스 청킹 설정
pub fn demo_chunk_config() -> ChunkConfig {
    ChunkConfig::for_demo()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::answer::{Answer, AnswerConfig};
    use crate::knowledge::{simple_retrieve, Corpus, RetrieveOptions};
    use crate::regression::{run_regression, run_regression_test};

    fn demo_corpus() -> Corpus {
        Corpus::build(demo_pages(), &demo_chunk_config()).unwrap()
    }

    #[test]
    fn test_demo_corpus_shape() {
        let corpus = demo_corpus();
        assert_eq!(corpus.pages().len(), 2);
        assert_eq!(corpus.page_fragments(1).count(), 7);
        assert_eq!(corpus.page_fragments(2).count(), 7);
        assert_eq!(corpus.fragments()[0].id(), "p1-c0");
        assert_eq!(corpus.fragments()[7].id(), "p2-c0");
    }

    #[test]
    fn test_demo_regression_all_pass() {
        let corpus = demo_corpus();
        let cases = demo_test_cases();
        assert_eq!(cases.len(), 9);

        let report = run_regression(&cases, corpus.fragments(), &RetrieveOptions::default());
        assert_eq!(report.passed(), 9, "{}", report);
        assert!(run_regression_test(&cases, corpus.fragments()));
    }

    #[test]
    fn test_demo_scores() {
        let corpus = demo_corpus();
        let results = simple_retrieve(
            "对超出文档范围的问题怎么处理？",
            corpus.fragments(),
            &RetrieveOptions::default(),
        );
        let ranked: Vec<(&str, usize)> = results.iter().map(|r| (r.id(), r.score())).collect();
        assert_eq!(ranked, vec![("p1-c5", 9), ("p1-c4", 4), ("p2-c0", 3)]);

        // 정확히 임계값(3)인 최고 점수도 답변
        let results = simple_retrieve("Python标准库", corpus.fragments(), &RetrieveOptions::default());
        assert_eq!(results[0].id(), "p1-c1");
        assert_eq!(results[0].score(), 3);
    }

    #[test]
    fn test_demo_answer() {
        let corpus = demo_corpus();
        let results = simple_retrieve(
            "项目的最小验收标准是什么？",
            corpus.fragments(),
            &RetrieveOptions::default(),
        );
        let answer = Answer::from_results(&results, &AnswerConfig::default());
        assert_eq!(
            answer.to_string(),
            "[답변] 最小验收标准：能准确回答文档内的问题，并对未知问题拒答。\n[출처] p2-c0, p1-c0, p1-c1"
        );
    }
}
