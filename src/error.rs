//! 에러 타입
//!
//! 라이브러리 계층은 `RagError`를 반환하고, CLI 계층은 anyhow로 감싸서 출력합니다.
//! "검색 결과 없음"은 에러가 아닙니다 (빈 결과 = 거부).

use std::path::PathBuf;

use thiserror::Error;

/// minirag 결과 타입
pub type Result<T> = std::result::Result<T, RagError>;

/// minirag 에러
#[derive(Debug, Error)]
pub enum RagError {
    /// 청킹 설정 위반 (overlap >= max_len)
    #[error("invalid chunk config: overlap ({overlap}) must be smaller than max_len ({max_len})")]
    InvalidChunkConfig { max_len: usize, overlap: usize },

    /// 같은 페이지 번호가 두 번 등장 (청크 ID 충돌)
    #[error("duplicate page number: {0}")]
    DuplicatePage(u32),

    /// 테스트 케이스 파일 읽기 실패
    #[error("failed to read test cases from {path:?}: {source}")]
    TestCaseIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// 테스트 케이스 형식 오류 (필드 누락 등)
    #[error("malformed test cases in {path:?}: {source}")]
    MalformedTestCases {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// 페이지 소스 읽기/파싱 실패
    #[error("failed to load pages from {path:?}: {message}")]
    PageSource { path: PathBuf, message: String },

    /// 설정 로드/검증 실패
    #[error("configuration error: {0}")]
    Config(String),
}
