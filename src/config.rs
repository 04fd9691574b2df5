//! 설정 로더
//!
//! 우선순위 (뒤가 앞을 덮어씀):
//! 1. 기본값
//! 2. TOML 파일 (`~/.minirag/config.toml` 또는 `--config`)
//! 3. `MINIRAG_` 환경변수 (중첩 키는 `__`로 구분, 예: `MINIRAG_RETRIEVAL__MIN_SCORE=4`)
//!
//! CLI 플래그는 로드 이후 호출 측에서 덮어씁니다.

use std::path::{Path, PathBuf};

use figment::providers::{Env, Format, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::answer::AnswerConfig;
use crate::error::{RagError, Result};
use crate::knowledge::{ChunkConfig, RetrieveOptions};

/// 환경변수 접두사
pub const ENV_PREFIX: &str = "MINIRAG_";

// ============================================================================
// Data Directory
// ============================================================================

/// 데이터 디렉토리 경로 (~/.minirag/)
pub fn get_data_dir() -> PathBuf {
    dirs::home_dir()
        .or_else(dirs::data_local_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".minirag")
}

/// 기본 설정 파일 경로
pub fn default_config_path() -> PathBuf {
    get_data_dir().join("config.toml")
}

// ============================================================================
// Chunk Overrides
// ============================================================================

/// 청킹 설정 일부만 덮어쓰기
///
/// 지정하지 않은 필드는 소스별 기본값(데모 30/5, 파일 200/40)을 따릅니다.
/// `MINIRAG_CHUNK__OVERLAP=10`처럼 한 키만 줘도 됩니다.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkOverrides {
    pub max_len: Option<usize>,
    pub overlap: Option<usize>,
}

impl ChunkOverrides {
    /// 기본값 위에 지정된 필드만 적용
    pub fn apply(&self, base: ChunkConfig) -> ChunkConfig {
        ChunkConfig {
            max_len: self.max_len.unwrap_or(base.max_len),
            overlap: self.overlap.unwrap_or(base.overlap),
        }
    }
}

// ============================================================================
// RagConfig
// ============================================================================

/// 전체 설정
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RagConfig {
    /// 청킹 설정 (부분 지정 가능)
    pub chunk: ChunkOverrides,
    /// 검색 옵션
    pub retrieval: RetrieveOptions,
    /// 답변 설정
    pub answer: AnswerConfig,
}

impl RagConfig {
    /// 지정 경로에서 로드 (파일이 없으면 기본값 + 환경변수)
    pub fn load_from(path: &Path) -> Result<Self> {
        let config: RagConfig = Self::figment(path)
            .extract()
            .map_err(|e| RagError::Config(e.to_string()))?;

        config.validate()?;
        tracing::debug!("Config loaded from {:?}: {:?}", path, config);
        Ok(config)
    }

    fn figment(path: &Path) -> Figment {
        Figment::new()
            .merge(Toml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// 설정 검증
    ///
    /// 청킹 설정은 두 키가 모두 있을 때만 여기서 검사하고,
    /// 한쪽만 있으면 소스 기본값과 합친 뒤 코퍼스 생성 시 검사합니다.
    pub fn validate(&self) -> Result<()> {
        if let ChunkOverrides {
            max_len: Some(max_len),
            overlap: Some(overlap),
        } = self.chunk
        {
            ChunkConfig { max_len, overlap }.validate()?;
        }
        if self.retrieval.top_k == 0 {
            return Err(RagError::Config("retrieval.top_k must be at least 1".into()));
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
