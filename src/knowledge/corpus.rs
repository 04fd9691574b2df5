//! Corpus - 페이지 집합에서 만든 청크 목록
//!
//! 페이지 입력 순서대로 청크를 이어 붙입니다. 청크 ID의 유일성은
//! 페이지 번호의 유일성에 의존하므로 중복 페이지는 거부합니다.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::{RagError, Result};

use super::fragment::{build_page_chunks, ChunkConfig, Fragment};

// ============================================================================
// Types
// ============================================================================

/// 수집 단위 페이지
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    /// 페이지 번호 (1부터)
    pub number: u32,
    /// 페이지 텍스트
    pub text: String,
}

impl Page {
    pub fn new(number: u32, text: impl Into<String>) -> Self {
        Self {
            number,
            text: text.into(),
        }
    }
}

/// 코퍼스 통계
#[derive(Debug, Clone, Serialize)]
pub struct CorpusStats {
    pub page_count: usize,
    pub fragment_count: usize,
    pub total_chars: usize,
    pub chunk_config: ChunkConfig,
}

// ============================================================================
// Corpus
// ============================================================================

/// 순서가 있는 청크 목록 (읽기 전용)
#[derive(Debug, Clone)]
pub struct Corpus {
    pages: Vec<Page>,
    fragments: Vec<Fragment>,
    config: ChunkConfig,
}

impl Corpus {
    /// 페이지들을 청킹해서 코퍼스 생성
    ///
    /// # Errors
    /// - 청킹 설정 위반
    /// - 페이지 번호 중복
    pub fn build(pages: Vec<Page>, config: &ChunkConfig) -> Result<Self> {
        config.validate()?;

        let mut seen = HashSet::with_capacity(pages.len());
        let mut fragments = Vec::new();

        for page in &pages {
            if !seen.insert(page.number) {
                return Err(RagError::DuplicatePage(page.number));
            }
            fragments.extend(build_page_chunks(&page.text, page.number, config)?);
        }

        tracing::info!(
            "Corpus built: {} pages, {} chunks (max_len={}, overlap={})",
            pages.len(),
            fragments.len(),
            config.max_len,
            config.overlap
        );

        Ok(Self {
            pages,
            fragments,
            config: *config,
        })
    }

    pub fn fragments(&self) -> &[Fragment] {
        &self.fragments
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn config(&self) -> &ChunkConfig {
        &self.config
    }

    /// 특정 페이지의 청크
    pub fn page_fragments(&self, page: u32) -> impl Iterator<Item = &Fragment> {
        self.fragments.iter().filter(move |f| f.page() == page)
    }

    pub fn stats(&self) -> CorpusStats {
        CorpusStats {
            page_count: self.pages.len(),
            fragment_count: self.fragments.len(),
            total_chars: self.pages.iter().map(|p| p.text.chars().count()).sum(),
            chunk_config: self.config,
        }
    }

    /// 청크 ID + 텍스트의 SHA-256 (hex)
    ///
    /// 같은 입력과 설정이면 항상 같은 값이 나옵니다.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        for fragment in &self.fragments {
            hasher.update(fragment.id().as_bytes());
            hasher.update([0u8]);
            hasher.update(fragment.text().as_bytes());
            hasher.update([0u8]);
        }
        format!("{:x}", hasher.finalize())
    }
}

// ============================================================================
// Tests
// ============================================================================
