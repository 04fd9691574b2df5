//! 답변 생성 - 검색 결과를 출처가 붙은 답변 또는 거부로 변환
//!
//! 실제 RAG라면 여기서 LLM을 호출하겠지만, 이 시스템은 최상위 청크의
//! 앞부분을 그대로 보여주고 출처 ID를 붙입니다.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::knowledge::ScoredFragment;

/// 답변 설정
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnswerConfig {
    /// 미리보기 최대 문자 수
    pub preview_chars: usize,
}

impl Default for AnswerConfig {
    fn default() -> Self {
        Self { preview_chars: 80 }
    }
}

/// 답변
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Answer {
    /// 관련 내용 없음 - 답하지 않음
    Refused,
    /// 문서 근거가 있는 답변
    Grounded {
        preview: String,
        sources: Vec<String>,
    },
}

impl Answer {
    /// 검색 결과에서 답변 생성
    pub fn from_results(results: &[ScoredFragment], config: &AnswerConfig) -> Self {
        let Some(top) = results.first() else {
            return Answer::Refused;
        };

        let text = top.text();
        let mut preview: String = text
            .chars()
            .take(config.preview_chars)
            .collect::<String>()
            .trim()
            .to_string();
        if text.chars().count() > config.preview_chars {
            preview.push_str("...");
        }

        Answer::Grounded {
            preview,
            sources: results.iter().map(|r| r.id().to_string()).collect(),
        }
    }

    pub fn is_refused(&self) -> bool {
        matches!(self, Answer::Refused)
    }
}

impl fmt::Display for Answer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Answer::Refused => write!(f, "[거부] 죄송합니다. 문서에서 관련 정보를 찾지 못했습니다."),
            Answer::Grounded { preview, sources } => {
                write!(f, "[답변] {}\n[출처] {}", preview, sources.join(", "))
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
