//! PDF 텍스트 추출 모듈
//!
//! pdf-extract 크레이트를 사용하여 PDF에서 페이지별 텍스트를 추출합니다.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::{RagError, Result};
use crate::knowledge::Page;

/// "--- Page 3 ---", "=== 3 ===" 같은 페이지 구분 줄
static PAGE_MARKER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[\s]*[-=]+[\s]*(?:Page[\s]*)?(\d+)[\s]*[-=]+[\s]*$")
        .expect("valid page marker regex")
});

/// PDF에서 페이지 추출
///
/// 페이지 번호는 1부터 시작합니다. 텍스트가 없으면 (스캔 문서 등) 빈 목록을 반환합니다.
pub fn extract_pages_from_pdf(path: &Path) -> Result<Vec<Page>> {
    let bytes = std::fs::read(path).map_err(|e| RagError::PageSource {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let text = pdf_extract::extract_text_from_mem(&bytes).map_err(|e| RagError::PageSource {
        path: path.to_path_buf(),
        message: format!("PDF text extraction failed: {}", e),
    })?;

    if text.trim().is_empty() {
        tracing::warn!(
            "No text extracted from PDF: {:?}. It might be a scanned document.",
            path
        );
        return Ok(Vec::new());
    }

    Ok(pages_from_pdf_text(&text))
}

/// 분리된 페이지에 1부터 순서대로 번호 부여
///
/// 구분 줄의 숫자("--- Page 7 ---"의 7)는 쓰지 않고, 번호는 항상 추출된 순서를 따릅니다.
fn pages_from_pdf_text(text: &str) -> Vec<Page> {
    split_pdf_pages(text)
        .into_iter()
        .zip(1u32..)
        .map(|(text, number)| Page::new(number, text))
        .collect()
}

/// PDF 텍스트를 페이지별로 분리 (구분 줄 자체는 버림)
fn split_pdf_pages(text: &str) -> Vec<String> {
    // 폼피드 문자 (\x0c)로 페이지 분리 시도
    let pages: Vec<String> = text
        .split('\x0c')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();

    if pages.len() > 1 {
        return pages;
    }

    // 페이지 구분자 패턴으로 시도
    if PAGE_MARKER_RE.is_match(text) {
        let pages: Vec<String> = PAGE_MARKER_RE
            .split(text)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        if pages.len() > 1 {
            return pages;
        }
    }

    // 분리 실패 - 전체를 하나의 페이지로
    vec![text.trim().to_string()]
}

// ============================================================================
// Tests
// ============================================================================
