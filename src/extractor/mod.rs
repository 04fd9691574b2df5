//! 페이지 추출 모듈
//!
//! 파일 형식별로 텍스트를 페이지 단위로 추출합니다.
//! - 텍스트 파일: 폼피드(`\x0c`)로 페이지 구분, 없으면 전체가 1페이지
//! - JSON 파일: `{"1": "...", "2": "..."}` 페이지 번호 → 텍스트
//! - PDF 파일: pdf-extract로 텍스트 추출

pub mod pdf;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::collector::{CollectedFile, FileType};
use crate::error::RagError;
use crate::knowledge::Page;

// ============================================================================
// Content Extractor
// ============================================================================

/// 페이지 추출기
#[derive(Debug, Default)]
pub struct ContentExtractor;

impl ContentExtractor {
    pub fn new() -> Self {
        Self
    }

    /// 파일에서 페이지 추출 (페이지 번호는 파일 내 기준, 1부터)
    pub async fn extract(&self, path: &Path, file_type: FileType) -> Result<Vec<Page>> {
        match file_type {
            FileType::Text => self.extract_text(path).await,
            FileType::Json => self.extract_json(path).await,
            FileType::Pdf => self.extract_pdf(path).await,
        }
    }

    /// 여러 파일에서 추출 후 페이지 번호를 전역으로 다시 매김
    ///
    /// 두 번째 파일의 페이지는 첫 번째 파일의 마지막 번호 뒤부터 이어집니다.
    pub async fn extract_all(&self, files: &[CollectedFile]) -> Result<Vec<Page>> {
        let mut sources = Vec::with_capacity(files.len());

        for file in files {
            let pages = self
                .extract(&file.path, file.file_type)
                .await
                .with_context(|| format!("Failed to extract pages: {:?}", file.path))?;

            tracing::info!(
                "[{}] {:?}: {} pages",
                file.file_type.label(),
                file.path,
                pages.len()
            );
            sources.push((file.path.clone(), pages));
        }

        Ok(renumber_pages(sources)?)
    }

    /// 텍스트 파일에서 추출
    async fn extract_text(&self, path: &Path) -> Result<Vec<Page>> {
        let text = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read text file: {:?}", path))?;

        Ok(split_text_pages(&text))
    }

    /// JSON 페이지 맵에서 추출
    async fn extract_json(&self, path: &Path) -> Result<Vec<Page>> {
        let raw = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read JSON file: {:?}", path))?;

        parse_page_map(&raw).map_err(|e| {
            RagError::PageSource {
                path: path.to_path_buf(),
                message: e.to_string(),
            }
            .into()
        })
    }

    /// PDF 파일에서 추출
    async fn extract_pdf(&self, path: &Path) -> Result<Vec<Page>> {
        // PDF 추출은 CPU 바운드이므로 spawn_blocking 사용
        let path = path.to_path_buf();
        let pages = tokio::task::spawn_blocking(move || pdf::extract_pages_from_pdf(&path))
            .await
            .context("PDF extraction task failed")??;

        Ok(pages)
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// 폼피드로 페이지 분리 (빈 페이지는 건너뛰되 번호는 유지)
pub fn split_text_pages(text: &str) -> Vec<Page> {
    text.split('\x0c')
        .zip(1u32..)
        .filter(|(page, _)| !page.trim().is_empty())
        .map(|(page, number)| Page::new(number, page))
        .collect()
}

/// JSON 페이지 맵 파싱 (페이지 번호 오름차순)
pub fn parse_page_map(raw: &str) -> serde_json::Result<Vec<Page>> {
    let map: BTreeMap<u32, String> = serde_json::from_str(raw)?;
    Ok(map
        .into_iter()
        .map(|(number, text)| Page::new(number, text))
        .collect())
}

/// 소스별 페이지 번호를 전역 번호로 변환
///
/// 번호가 `u32` 범위를 넘으면 넘친 소스 경로와 함께 `PageSource` 에러.
fn renumber_pages(sources: Vec<(PathBuf, Vec<Page>)>) -> crate::error::Result<Vec<Page>> {
    if sources.len() == 1 {
        return Ok(sources.into_iter().flat_map(|(_, pages)| pages).collect());
    }

    let mut offset = 0u32;
    let mut pages = Vec::new();

    for (path, source) in sources {
        let last = source.iter().map(|p| p.number).max().unwrap_or(0);
        for page in source {
            let number = offset
                .checked_add(page.number)
                .ok_or_else(|| page_overflow(&path, offset))?;
            pages.push(Page::new(number, page.text));
        }
        offset = offset
            .checked_add(last)
            .ok_or_else(|| page_overflow(&path, offset))?;
    }

    Ok(pages)
}

fn page_overflow(path: &Path, offset: u32) -> RagError {
    RagError::PageSource {
        path: path.to_path_buf(),
        message: format!("page number overflows u32 after offset {}", offset),
    }
}

// ============================================================================
// Tests
// ============================================================================
