//! 키워드 추출 - 한자 2-gram + 영문/숫자 토큰
//!
//! 형태소 분석기나 사전 없이 띄어쓰기 없는 언어를 대략적인 단어 단위로 매칭합니다.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;

/// 영문/숫자 연속 구간 (소문자화한 텍스트에 적용)
static ALNUM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[a-z0-9]+").expect("valid alnum regex"));

/// CJK Unified Ideographs (U+4E00..=U+9FFF)
#[inline]
fn is_cjk_ideograph(c: char) -> bool {
    ('\u{4E00}'..='\u{9FFF}').contains(&c)
}

// ============================================================================
// KeywordSet
// ============================================================================

/// 텍스트에서 추출한 키워드 집합
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeywordSet(BTreeSet<String>);

impl KeywordSet {
    /// 두 집합의 교집합 크기 (관련성 점수)
    pub fn overlap(&self, other: &KeywordSet) -> usize {
        self.0.intersection(&other.0).count()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, keyword: &str) -> bool {
        self.0.contains(keyword)
    }

    /// 정렬된 순서로 순회
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl FromIterator<String> for KeywordSet {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

// ============================================================================
// Extraction
// ============================================================================

/// 텍스트에서 키워드 추출
///
/// - 한자만 골라낸 뒤 인접한 두 글자마다 2-gram 생성
///   (사이에 낀 비한자 문자는 인접성을 끊지 않음)
/// - 영문/숫자 연속 구간은 하나의 토큰으로. 전체 텍스트를 먼저 유니코드 소문자로
///   바꾼 뒤 찾으므로 `K`(U+212A 켈빈 기호)도 `k`가 됩니다.
pub fn extract_keywords(text: &str) -> KeywordSet {
    let ideographs: Vec<char> = text.chars().filter(|&c| is_cjk_ideograph(c)).collect();

    let bigrams = ideographs
        .windows(2)
        .map(|pair| pair.iter().collect::<String>());

    let lowered = text.to_lowercase();
    let tokens = ALNUM_RE.find_iter(&lowered).map(|m| m.as_str().to_string());

    bigrams.chain(tokens).collect()
}

// ============================================================================
// Tests
// ============================================================================
