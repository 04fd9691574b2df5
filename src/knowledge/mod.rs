//! Knowledge 모듈 - 청킹, 키워드 추출, 검색
//!
//! - Fragment: 페이지를 `p{page}-c{seq}` ID가 붙은 청크로 분할
//! - Keywords: 한자 2-gram + 영문/숫자 토큰
//! - Retriever: 키워드 교집합 점수 + 거부 게이트
//! - Corpus: 페이지 → 청크 목록

mod corpus;
mod fragment;
mod keywords;
mod retriever;

// Re-exports
pub use corpus::{Corpus, CorpusStats, Page};
pub use fragment::{build_chunks, build_page_chunks, ChunkConfig, Fragment, ScoredFragment};
pub use keywords::{extract_keywords, KeywordSet};
pub use retriever::{rank_fragments, simple_retrieve, RetrieveOptions, Retriever};
