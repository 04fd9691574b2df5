//! 회귀 테스트 - 검색 적중과 거부를 라벨된 질의로 검증
//!
//! - 사실 질문 (is_factual = true): 최상위 결과가 기대 페이지여야 통과
//! - 반사실 질문 (is_factual = false): 결과가 비어 있어야 통과 (거부)
//!   결과가 있으면 RISK (문서에 없는 내용을 지어낼 위험)

use std::fmt;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{RagError, Result};
use crate::knowledge::{simple_retrieve, Fragment, RetrieveOptions};

/// 회귀 테스트에서 쓰는 top_k
pub const REGRESSION_TOP_K: usize = 3;

// ============================================================================
// Types
// ============================================================================

/// 라벨된 테스트 케이스
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCase {
    pub query: String,
    pub expected_page: u32,
    pub is_factual: bool,
}

/// 케이스 판정
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum Verdict {
    /// 사실 질문 적중 또는 반사실 질문 거부
    Pass,
    /// 사실 질문이 기대 페이지를 맞히지 못함 (`actual` = None이면 미적중)
    Fail { expected: u32, actual: Option<u32> },
    /// 반사실 질문이 청크에 적중함
    Risk { matched_id: String },
}

/// 케이스별 결과
#[derive(Debug, Clone, Serialize)]
pub struct CaseOutcome {
    pub case: TestCase,
    #[serde(flatten)]
    pub verdict: Verdict,
}

impl CaseOutcome {
    pub fn passed(&self) -> bool {
        self.verdict == Verdict::Pass
    }
}

impl fmt::Display for CaseOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let query = &self.case.query;
        match &self.verdict {
            Verdict::Pass if self.case.is_factual => write!(f, "[PASS] {}", query),
            Verdict::Pass => write!(f, "[PASS] (거부): {}", query),
            Verdict::Fail { expected, actual } => {
                let actual = actual
                    .map(|p| format!("p{}", p))
                    .unwrap_or_else(|| "미적중".to_string());
                write!(f, "[FAIL] (기대 p{}, 실제 {}): {}", expected, actual, query)
            }
            Verdict::Risk { matched_id } => {
                write!(f, "[RISK] (지어낼 위험): {} -> 적중 {}", query, matched_id)
            }
        }
    }
}

/// 회귀 테스트 보고서
#[derive(Debug, Clone, Serialize)]
pub struct RegressionReport {
    pub run_at: DateTime<Utc>,
    pub options: RetrieveOptions,
    pub outcomes: Vec<CaseOutcome>,
}

impl RegressionReport {
    pub fn passed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.passed()).count()
    }

    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    pub fn all_passed(&self) -> bool {
        self.passed() == self.total()
    }

    /// RISK 판정 개수
    pub fn risks(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.verdict, Verdict::Risk { .. }))
            .count()
    }
}

impl fmt::Display for RegressionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for outcome in &self.outcomes {
            writeln!(f, "{}", outcome)?;
        }
        writeln!(f)?;
        write!(f, "[회귀 테스트 결과] {}/{} 통과", self.passed(), self.total())
    }
}

// ============================================================================
// Loading
// ============================================================================

/// JSON 파일에서 테스트 케이스 로드
///
/// 읽기 실패나 필드 누락은 치명적 에러입니다 (일부만 실행하지 않음).
pub fn load_test_cases(path: &Path) -> Result<Vec<TestCase>> {
    let raw = std::fs::read_to_string(path).map_err(|source| RagError::TestCaseIo {
        path: path.to_path_buf(),
        source,
    })?;

    parse_test_cases(&raw).map_err(|source| RagError::MalformedTestCases {
        path: path.to_path_buf(),
        source,
    })
}

/// JSON 문자열에서 테스트 케이스 파싱
pub fn parse_test_cases(raw: &str) -> std::result::Result<Vec<TestCase>, serde_json::Error> {
    serde_json::from_str(raw)
}

// ============================================================================
// Running
// ============================================================================

/// 단일 케이스 판정
fn judge(case: &TestCase, fragments: &[Fragment], options: &RetrieveOptions) -> Verdict {
    let retrieved = simple_retrieve(&case.query, fragments, options);
    let top = retrieved.first();

    if case.is_factual {
        match top {
            Some(hit) if hit.page() == case.expected_page => Verdict::Pass,
            _ => Verdict::Fail {
                expected: case.expected_page,
                actual: top.map(|hit| hit.page()),
            },
        }
    } else {
        match top {
            None => Verdict::Pass,
            Some(hit) => Verdict::Risk {
                matched_id: hit.id().to_string(),
            },
        }
    }
}

/// 모든 케이스 실행 후 보고서 반환
pub fn run_regression(
    test_cases: &[TestCase],
    fragments: &[Fragment],
    options: &RetrieveOptions,
) -> RegressionReport {
    let outcomes: Vec<CaseOutcome> = test_cases
        .iter()
        .map(|case| {
            let verdict = judge(case, fragments, options);
            if verdict != Verdict::Pass {
                tracing::debug!("Case not passed: {:?} -> {:?}", case.query, verdict);
            }
            CaseOutcome {
                case: case.clone(),
                verdict,
            }
        })
        .collect();

    let report = RegressionReport {
        run_at: Utc::now(),
        options: *options,
        outcomes,
    };

    tracing::info!(
        "Regression finished: {}/{} passed, {} risks",
        report.passed(),
        report.total(),
        report.risks()
    );

    report
}

/// 기본 옵션(top_k=3, 기본 min_score)으로 실행하고 보고서를 출력
///
/// # Returns
/// 전부 통과했는지 여부
pub fn run_regression_test(test_cases: &[TestCase], fragments: &[Fragment]) -> bool {
    let options = RetrieveOptions::default().with_top_k(REGRESSION_TOP_K);
    let report = run_regression(test_cases, fragments, &options);
    println!("{}", report);
    report.all_passed()
}

// ============================================================================
// Tests
// ============================================================================
