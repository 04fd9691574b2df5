//! 파일 수집 모듈
//!
//! 로컬 파일 및 폴더에서 페이지 소스 파일을 수집합니다.
//! .gitignore 패턴을 존중하고, 지원하는 확장자만 수집합니다.
//! 결과는 경로 순으로 정렬되어 페이지 번호가 실행마다 같게 매겨집니다.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use ignore::WalkBuilder;
use thiserror::Error;

// ============================================================================
// File Types
// ============================================================================

/// 지원하는 파일 타입
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    /// 텍스트 파일 (폼피드로 페이지 구분)
    Text,
    /// JSON 페이지 맵 ({"1": "...", "2": "..."})
    Json,
    /// PDF 파일
    Pdf,
}

impl FileType {
    /// 확장자로 파일 타입 결정
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "txt" | "md" | "markdown" | "text" => Some(FileType::Text),
            "json" => Some(FileType::Json),
            "pdf" => Some(FileType::Pdf),
            _ => None,
        }
    }

    /// 파일 경로에서 타입 결정
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }

    /// 짧은 표시 이름
    pub fn label(&self) -> &'static str {
        match self {
            FileType::Text => "TXT",
            FileType::Json => "JSON",
            FileType::Pdf => "PDF",
        }
    }
}

// ============================================================================
// Collected File
// ============================================================================

/// 수집된 파일 정보
#[derive(Debug, Clone)]
pub struct CollectedFile {
    /// 파일 절대 경로
    pub path: PathBuf,
    /// 파일 타입
    pub file_type: FileType,
    /// 파일 크기 (바이트)
    pub size: u64,
}

impl CollectedFile {
    /// 파일에서 CollectedFile 생성
    pub fn from_path(path: PathBuf) -> Result<Option<Self>> {
        let Some(file_type) = FileType::from_path(&path) else {
            return Ok(None); // 지원하지 않는 확장자
        };

        let metadata = std::fs::metadata(&path)
            .with_context(|| format!("Failed to read metadata: {:?}", path))?;

        if !metadata.is_file() {
            return Ok(None);
        }

        Ok(Some(Self {
            path,
            file_type,
            size: metadata.len(),
        }))
    }
}

// ============================================================================
// File Collector
// ============================================================================

/// 파일을 수집하지 않은 이유
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SkipReason {
    #[error("지원하지 않는 파일 형식")]
    Unsupported,
    #[error("파일 크기 초과 ({size} bytes > {limit} bytes)")]
    TooLarge { size: u64, limit: u64 },
    #[error("PDF 건너뜀 (--skip-pdfs)")]
    PdfSkipped,
}

/// 파일 수집기 설정
#[derive(Debug, Clone)]
pub struct CollectorConfig {
    /// .gitignore 패턴 존중 여부
    pub respect_gitignore: bool,
    /// 숨김 파일 포함 여부
    pub include_hidden: bool,
    /// 최대 파일 크기 (바이트, 0이면 제한 없음)
    pub max_file_size: u64,
    /// PDF 파일 건너뛰기
    pub skip_pdfs: bool,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            respect_gitignore: true,
            include_hidden: false,
            max_file_size: 10 * 1024 * 1024, // 10MB
            skip_pdfs: false,
        }
    }
}

/// 파일 수집기
pub struct FileCollector {
    config: CollectorConfig,
}

impl FileCollector {
    /// 새 수집기 생성
    pub fn new(config: CollectorConfig) -> Self {
        Self { config }
    }

    /// 기본 설정으로 수집기 생성
    pub fn with_defaults() -> Self {
        Self::new(CollectorConfig::default())
    }

    /// 단일 파일 수집
    ///
    /// 건너뛰는 파일이면 [`SkipReason`]을 담은 에러를 돌려줍니다.
    pub fn collect_file(&self, path: &Path) -> Result<CollectedFile> {
        let abs_path = absolutize(path)?;

        if !abs_path.is_file() {
            anyhow::bail!("File not found: {:?}", abs_path);
        }

        let reason = match CollectedFile::from_path(abs_path.clone())? {
            Some(file) => match self.skip_reason(&file) {
                None => return Ok(file),
                Some(reason) => reason,
            },
            None => SkipReason::Unsupported,
        };

        Err(anyhow::Error::new(reason).context(format!("Skipped file: {:?}", abs_path)))
    }

    /// 폴더 재귀 수집 (경로 순 정렬)
    pub fn collect_directory(&self, path: &Path) -> Result<Vec<CollectedFile>> {
        let abs_path = absolutize(path)?;

        if !abs_path.is_dir() {
            anyhow::bail!("Directory not found: {:?}", abs_path);
        }

        let mut files = Vec::new();

        // ignore 크레이트로 .gitignore 지원
        let walker = WalkBuilder::new(&abs_path)
            .hidden(!self.config.include_hidden)
            .git_ignore(self.config.respect_gitignore)
            .git_global(self.config.respect_gitignore)
            .git_exclude(self.config.respect_gitignore)
            .build();

        for entry in walker {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    tracing::warn!("Failed to read entry: {}", e);
                    continue;
                }
            };

            if !entry.file_type().is_some_and(|ft| ft.is_file()) {
                continue;
            }

            match CollectedFile::from_path(entry.path().to_path_buf()) {
                Ok(Some(file)) => match self.skip_reason(&file) {
                    None => files.push(file),
                    Some(reason) => tracing::debug!("Skipping {:?}: {}", file.path, reason),
                },
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!("Failed to collect file: {}", e);
                }
            }
        }

        files.sort_by(|a, b| a.path.cmp(&b.path));

        tracing::info!("Collected {} files from {:?}", files.len(), abs_path);
        Ok(files)
    }

    /// 필터 조건에 걸리면 그 이유
    pub fn skip_reason(&self, file: &CollectedFile) -> Option<SkipReason> {
        if self.config.max_file_size > 0 && file.size > self.config.max_file_size {
            return Some(SkipReason::TooLarge {
                size: file.size,
                limit: self.config.max_file_size,
            });
        }

        if self.config.skip_pdfs && file.file_type == FileType::Pdf {
            return Some(SkipReason::PdfSkipped);
        }

        None
    }
}

fn absolutize(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_file_type_from_extension() {
        assert_eq!(FileType::from_extension("md"), Some(FileType::Text));
        assert_eq!(FileType::from_extension("TXT"), Some(FileType::Text));
        assert_eq!(FileType::from_extension("json"), Some(FileType::Json));
        assert_eq!(FileType::from_extension("PDF"), Some(FileType::Pdf));
        assert_eq!(FileType::from_extension("png"), None);
        assert_eq!(FileType::from_extension("rs"), None);
    }

    #[test]
    fn test_collector_config_default() {
        let config = CollectorConfig::default();
        assert!(config.respect_gitignore);
        assert!(!config.include_hidden);
        assert_eq!(config.max_file_size, 10 * 1024 * 1024);
    }

    #[test]
    fn test_collect_directory_sorted_and_filtered() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("b.txt"), "second").unwrap();
        std::fs::write(dir.path().join("a.md"), "first").unwrap();
        std::fs::write(dir.path().join("image.png"), [0u8; 4]).unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        std::fs::write(dir.path().join("sub").join("c.json"), "{}").unwrap();
        std::fs::write(dir.path().join("doc.pdf"), "not really a pdf").unwrap();

        let collector = FileCollector::with_defaults();
        let files = collector.collect_directory(dir.path()).unwrap();
        let names: Vec<String> = files
            .iter()
            .map(|f| {
                f.path
                    .strip_prefix(dir.path())
                    .unwrap()
                    .to_string_lossy()
                    .replace('\\', "/")
            })
            .collect();
        assert_eq!(names, vec!["a.md", "b.txt", "doc.pdf", "sub/c.json"]);

        let no_pdf = FileCollector::new(CollectorConfig {
            skip_pdfs: true,
            ..Default::default()
        });
        assert_eq!(no_pdf.collect_directory(dir.path()).unwrap().len(), 3);
    }

    #[test]
    fn test_collect_file_missing() {
        let dir = TempDir::new().unwrap();
        let collector = FileCollector::with_defaults();
        assert!(collector.collect_file(&dir.path().join("nope.txt")).is_err());
    }

    #[test]
    fn test_collect_file_unsupported() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data.bin");
        std::fs::write(&path, [1u8, 2, 3]).unwrap();

        let collector = FileCollector::with_defaults();
        let err = collector.collect_file(&path).unwrap_err();
        assert_eq!(err.downcast_ref::<SkipReason>(), Some(&SkipReason::Unsupported));
    }

    #[test]
    fn test_collect_file_reports_size_limit() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("big.txt");
        std::fs::write(&path, "0123456789").unwrap();

        let collector = FileCollector::new(CollectorConfig {
            max_file_size: 4,
            ..Default::default()
        });
        let err = collector.collect_file(&path).unwrap_err();
        assert_eq!(
            err.downcast_ref::<SkipReason>(),
            Some(&SkipReason::TooLarge { size: 10, limit: 4 })
        );
    }

    #[test]
    fn test_collect_file_reports_skipped_pdf() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("doc.pdf");
        std::fs::write(&path, "not really a pdf").unwrap();

        let collector = FileCollector::new(CollectorConfig {
            skip_pdfs: true,
            ..Default::default()
        });
        let err = collector.collect_file(&path).unwrap_err();
        assert_eq!(err.downcast_ref::<SkipReason>(), Some(&SkipReason::PdfSkipped));
        assert!(!format!("{:#}", err).contains("지원하지 않는"));

        let file = FileCollector::with_defaults().collect_file(&path).unwrap();
        assert_eq!(file.file_type, FileType::Pdf);
    }
}
