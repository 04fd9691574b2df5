//! Fragment 모듈 - 페이지 텍스트를 ID가 있는 청크로 분할
//!
//! 문자(char) 단위 고정 윈도우 + 오버랩 방식입니다.
//! 바이트가 아닌 문자 기준이므로 한중일 텍스트도 안전하게 분할됩니다.
//!
//! 청크 ID 형식: `p{page}-c{seq}` (예: `p1-c0` = 1페이지 0번째 청크)

use serde::{Deserialize, Serialize};

use crate::error::{RagError, Result};

// ============================================================================
// Chunk Configuration
// ============================================================================

/// 청킹 설정
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkConfig {
    /// 청크 최대 길이 (문자 수)
    pub max_len: usize,
    /// 인접 청크 간 중복 문자 수
    pub overlap: usize,
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self {
            max_len: 200,
            overlap: 40,
        }
    }
}

impl ChunkConfig {
    /// 검증된 설정 생성
    pub fn new(max_len: usize, overlap: usize) -> Result<Self> {
        let config = Self { max_len, overlap };
        config.validate()?;
        Ok(config)
    }

    /// 데모 코퍼스용 설정 (짧은 청크)
    pub fn for_demo() -> Self {
        Self {
            max_len: 30,
            overlap: 5,
        }
    }

    /// `overlap < max_len` 확인
    pub fn validate(&self) -> Result<()> {
        if self.overlap >= self.max_len {
            return Err(RagError::InvalidChunkConfig {
                max_len: self.max_len,
                overlap: self.overlap,
            });
        }
        Ok(())
    }

    /// 윈도우 이동 폭
    pub fn step(&self) -> usize {
        self.max_len - self.overlap
    }
}

// ============================================================================
// Types
// ============================================================================

/// 검색 단위 청크 (생성 후 불변)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Fragment {
    id: String,
    page: u32,
    text: String,
}

impl Fragment {
    fn new(page: u32, seq: usize, text: String) -> Self {
        Self {
            id: format!("p{}-c{}", page, seq),
            page,
            text,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

/// 점수가 붙은 청크 (검색 호출마다 새로 생성)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoredFragment {
    #[serde(flatten)]
    fragment: Fragment,
    score: usize,
}

impl ScoredFragment {
    /// 원본을 복제해서 점수를 붙임 (원본은 그대로)
    pub fn new(fragment: &Fragment, score: usize) -> Self {
        Self {
            fragment: fragment.clone(),
            score,
        }
    }

    pub fn fragment(&self) -> &Fragment {
        &self.fragment
    }

    pub fn id(&self) -> &str {
        self.fragment.id()
    }

    pub fn page(&self) -> u32 {
        self.fragment.page()
    }

    pub fn text(&self) -> &str {
        self.fragment.text()
    }

    /// 질의와 겹치는 키워드 수
    pub fn score(&self) -> usize {
        self.score
    }
}

// ============================================================================
// Chunking
// ============================================================================

/// 한 페이지 텍스트를 청크로 분할
///
/// `max_len` 문자 윈도우를 `max_len - overlap` 문자씩 이동합니다.
/// 마지막 윈도우는 `max_len`보다 짧을 수 있으며, 비어 있으면 버립니다.
///
/// # Arguments
/// * `text` - 페이지 텍스트
/// * `page_num` - 페이지 번호 (청크 ID에 사용)
/// * `max_len` - 청크 최대 문자 수
/// * `overlap` - 인접 청크 간 중복 문자 수 (`max_len`보다 작아야 함)
///
/// # Errors
/// `overlap >= max_len`이면 `RagError::InvalidChunkConfig`
pub fn build_chunks(
    text: &str,
    page_num: u32,
    max_len: usize,
    overlap: usize,
) -> Result<Vec<Fragment>> {
    let config = ChunkConfig::new(max_len, overlap)?;
    let step = config.step();

    let chars: Vec<char> = text.chars().collect();
    let mut fragments = Vec::with_capacity(chars.len().div_ceil(step));

    for offset in (0..chars.len()).step_by(step) {
        let end = (offset + max_len).min(chars.len());
        let window = &chars[offset..end];
        if window.is_empty() {
            break;
        }

        fragments.push(Fragment::new(page_num, offset / step, window.iter().collect()));
    }

    tracing::debug!("Page {} -> {} chunks", page_num, fragments.len());
    Ok(fragments)
}

/// 설정 객체로 청크 분할
pub fn build_page_chunks(text: &str, page_num: u32, config: &ChunkConfig) -> Result<Vec<Fragment>> {
    build_chunks(text, page_num, config.max_len, config.overlap)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(fragments: &[Fragment]) -> Vec<&str> {
        fragments.iter().map(|f| f.text()).collect()
    }

    #[test]
    fn test_build_chunks_basic() {
        let chunks = build_chunks("abcde", 1, 3, 1).unwrap();

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].id(), "p1-c0");
        assert_eq!(chunks[0].text(), "abc");
        assert_eq!(chunks[1].id(), "p1-c1");
        assert_eq!(chunks[1].text(), "cde");
        assert!(chunks.iter().all(|c| c.page() == 1));
    }

    #[test]
    fn test_build_chunks_trailing_partial() {
        // step=2: offsets 0, 2, 4
        let chunks = build_chunks("abcdef", 2, 3, 1).unwrap();
        assert_eq!(texts(&chunks), vec!["abc", "cde", "ef"]);
        assert_eq!(chunks[2].id(), "p2-c2");
    }

    #[test]
    fn test_build_chunks_no_overlap() {
        let chunks = build_chunks("0123456789", 3, 5, 0).unwrap();
        assert_eq!(texts(&chunks), vec!["01234", "56789"]);
    }

    #[test]
    fn test_build_chunks_empty() {
        let chunks = build_chunks("", 1, 30, 5).unwrap();
        assert!(chunks.is_empty());
    }

    #[test]
    fn test_build_chunks_shorter_than_window() {
        let chunks = build_chunks("ab", 7, 30, 5).unwrap();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].id(), "p7-c0");
        assert_eq!(chunks[0].text(), "ab");
    }

    #[test]
    fn test_build_chunks_multibyte() {
        // 문자 단위 분할이어야 함 (바이트 단위면 패닉)
        let chunks = build_chunks("最小验收标准", 1, 4, 2).unwrap();
        assert_eq!(texts(&chunks), vec!["最小验收", "验收标准", "标准"]);
        assert_eq!(chunks[2].id(), "p1-c2");
    }

    #[test]
    fn test_build_chunks_rejects_bad_overlap() {
        let err = build_chunks("abc", 1, 3, 3).unwrap_err();
        assert!(matches!(
            err,
            RagError::InvalidChunkConfig {
                max_len: 3,
                overlap: 3
            }
        ));

        assert!(build_chunks("abc", 1, 3, 5).is_err());
        assert!(build_chunks("abc", 1, 0, 0).is_err());
    }

    #[test]
    fn test_build_chunks_deterministic() {
        let text = "本项目目标是构建一个可信的RAG教学系统。核心原则：只用标准库。";
        let a = build_chunks(text, 3, 10, 3).unwrap();
        let b = build_chunks(text, 3, 10, 3).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_ids_unique_and_monotonic() {
        let text = "x".repeat(97);
        let chunks = build_chunks(&text, 4, 10, 4).unwrap();

        let seqs: Vec<usize> = chunks
            .iter()
            .map(|c| c.id().trim_start_matches("p4-c").parse().unwrap())
            .collect();
        let expected: Vec<usize> = (0..chunks.len()).collect();
        assert_eq!(seqs, expected);
    }

    #[test]
    fn test_coverage_reconstructs_page() {
        let text = "项目边界包括：只处理文档内的问题，对超出文档范围的问题应该拒答。abc123";
        let config = ChunkConfig::new(8, 3).unwrap();
        let chunks = build_page_chunks(text, 1, &config).unwrap();

        // 첫 청크 전체 + 이후 청크는 오버랩 부분을 제외하고 이어붙임
        let mut rebuilt = String::new();
        for (i, chunk) in chunks.iter().enumerate() {
            let skip = if i == 0 { 0 } else { config.overlap };
            let tail: String = chunk.text().chars().skip(skip).collect();
            rebuilt.push_str(&tail);
        }
        assert_eq!(rebuilt, text);
    }

    #[test]
    fn test_scored_fragment_does_not_touch_source() {
        let chunks = build_chunks("abcde", 1, 3, 1).unwrap();
        let before = chunks[0].clone();

        let scored = ScoredFragment::new(&chunks[0], 4);
        assert_eq!(scored.score(), 4);
        assert_eq!(scored.id(), "p1-c0");
        assert_eq!(chunks[0], before);
    }

    #[test]
    fn test_scored_fragment_serializes_flat() {
        let chunks = build_chunks("abc", 2, 3, 1).unwrap();
        let value = serde_json::to_value(ScoredFragment::new(&chunks[0], 1)).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"id": "p2-c0", "page": 2, "text": "abc", "score": 1})
        );
    }

    #[test]
    fn test_config_presets() {
        let default = ChunkConfig::default();
        assert_eq!(default.max_len, 200);
        assert_eq!(default.overlap, 40);
        assert_eq!(default.step(), 160);

        let demo = ChunkConfig::for_demo();
        assert_eq!(demo.step(), 25);
        assert!(demo.validate().is_ok());
    }
}
