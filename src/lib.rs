//! minirag - 키워드 기반 최소 RAG 시스템
//!
//! 문서를 ID가 붙은 청크로 나누고, 한자 2-gram + 영문/숫자 토큰 겹침으로
//! 관련 청크를 찾아 답하거나, 근거가 부족하면 답하지 않습니다 (거부).
//! 회귀 테스트로 적중과 거부를 함께 검증합니다.

pub mod answer;
pub mod cli;
pub mod collector;
pub mod config;
pub mod demo;
pub mod error;
pub mod extractor;
pub mod knowledge;
pub mod regression;

// Re-exports
pub use answer::{Answer, AnswerConfig};
pub use config::{get_data_dir, ChunkOverrides, RagConfig};
pub use error::{RagError, Result};
pub use knowledge::{
    build_chunks, build_page_chunks, extract_keywords, rank_fragments, simple_retrieve,
    ChunkConfig, Corpus, CorpusStats, Fragment, KeywordSet, Page, RetrieveOptions, Retriever,
    ScoredFragment,
};
pub use regression::{
    load_test_cases, run_regression, run_regression_test, CaseOutcome, RegressionReport,
    TestCase, Verdict,
};
