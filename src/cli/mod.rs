//! CLI 모듈
//!
//! minirag CLI 명령어 정의 및 구현

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::answer::{Answer, AnswerConfig};
use crate::collector::{CollectorConfig, FileCollector};
use crate::config::{default_config_path, ChunkOverrides, RagConfig};
use crate::demo::{demo_chunk_config, demo_pages, demo_test_cases};
use crate::extractor::ContentExtractor;
use crate::knowledge::{extract_keywords, ChunkConfig, Corpus, RetrieveOptions, Retriever};
use crate::regression::{load_test_cases, run_regression, REGRESSION_TOP_K};

// ============================================================================
// CLI Definition
// ============================================================================

#[derive(Parser)]
#[command(name = "minirag")]
#[command(version, about = "키워드 기반 최소 RAG 시스템", long_about = None)]
pub struct Cli {
    /// 설정 파일 경로 (기본: ~/.minirag/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// 문서 소스 옵션 (지정하지 않으면 내장 데모 코퍼스)
#[derive(Args, Debug, Clone, Default)]
pub struct SourceArgs {
    /// 페이지를 읽을 파일 (.txt, .md, .json, .pdf)
    #[arg(long)]
    pub file: Option<PathBuf>,

    /// 페이지를 읽을 폴더 (재귀, 경로 순)
    #[arg(short, long)]
    pub dir: Option<PathBuf>,

    /// 청크 최대 문자 수
    #[arg(long)]
    pub max_len: Option<usize>,

    /// 청크 간 중복 문자 수
    #[arg(long)]
    pub overlap: Option<usize>,

    /// PDF 파일 건너뛰기
    #[arg(long)]
    pub skip_pdfs: bool,
}

impl SourceArgs {
    fn is_demo(&self) -> bool {
        self.file.is_none() && self.dir.is_none()
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// 청크 목록 확인
    Chunks {
        #[command(flatten)]
        source: SourceArgs,

        /// 출력할 청크 수
        #[arg(short, long, default_value = "3")]
        limit: usize,
    },

    /// 텍스트에서 추출되는 키워드 확인
    Keywords {
        /// 분석할 텍스트
        text: String,
    },

    /// 한 번 질문하기
    Ask {
        /// 질문
        question: String,

        #[command(flatten)]
        source: SourceArgs,

        /// 최대 결과 수
        #[arg(short = 'k', long)]
        top_k: Option<usize>,

        /// 거부 임계값
        #[arg(short, long)]
        min_score: Option<usize>,

        /// 임계값 미만 후보까지 모두 출력
        #[arg(long)]
        explain: bool,
    },

    /// 대화형 질의응답
    Chat {
        #[command(flatten)]
        source: SourceArgs,

        /// 최대 결과 수
        #[arg(short = 'k', long)]
        top_k: Option<usize>,

        /// 거부 임계값
        #[arg(short, long)]
        min_score: Option<usize>,
    },

    /// 회귀 테스트 실행
    Test {
        /// 테스트 케이스 JSON (기본: 내장 데모 케이스)
        #[arg(short, long)]
        cases: Option<PathBuf>,

        #[command(flatten)]
        source: SourceArgs,

        /// 거부 임계값
        #[arg(short, long)]
        min_score: Option<usize>,

        /// JSON 보고서 출력
        #[arg(long)]
        json: bool,
    },

    /// 상태 확인
    Status {
        #[command(flatten)]
        source: SourceArgs,
    },
}

// ============================================================================
// CLI Runner
// ============================================================================

/// CLI 명령어 실행
pub async fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config.clone().unwrap_or_else(default_config_path);
    let config = RagConfig::load_from(&config_path).context("설정 로드 실패")?;

    match cli.command {
        Commands::Chunks { source, limit } => cmd_chunks(&config, &source, limit).await,
        Commands::Keywords { text } => cmd_keywords(&text),
        Commands::Ask {
            question,
            source,
            top_k,
            min_score,
            explain,
        } => {
            let options = retrieve_options(&config, top_k, min_score)?;
            cmd_ask(&config, &source, options, &question, explain).await
        }
        Commands::Chat {
            source,
            top_k,
            min_score,
        } => {
            let options = retrieve_options(&config, top_k, min_score)?;
            cmd_chat(&config, &source, options).await
        }
        Commands::Test {
            cases,
            source,
            min_score,
            json,
        } => cmd_test(&config, &source, cases.as_deref(), min_score, json).await,
        Commands::Status { source } => cmd_status(&config, &config_path, &source).await,
    }
}

// ============================================================================
// Corpus Loading
// ============================================================================

/// 소스별 기본 청킹 설정 → 설정 파일 → CLI 플래그 순으로 결정
fn chunk_config(config: &RagConfig, source: &SourceArgs) -> ChunkConfig {
    let base = if source.is_demo() {
        demo_chunk_config()
    } else {
        ChunkConfig::default()
    };
    let flags = ChunkOverrides {
        max_len: source.max_len,
        overlap: source.overlap,
    };

    flags.apply(config.chunk.apply(base))
}

fn retrieve_options(
    config: &RagConfig,
    top_k: Option<usize>,
    min_score: Option<usize>,
) -> Result<RetrieveOptions> {
    let mut options = config.retrieval;
    if let Some(top_k) = top_k {
        if top_k == 0 {
            bail!("--top-k는 1 이상이어야 합니다");
        }
        options = options.with_top_k(top_k);
    }
    if let Some(min_score) = min_score {
        options = options.with_min_score(min_score);
    }
    Ok(options)
}

/// 페이지 로드 후 코퍼스 생성
async fn load_corpus(config: &RagConfig, source: &SourceArgs) -> Result<Corpus> {
    let chunk = chunk_config(config, source);

    let collector = FileCollector::new(CollectorConfig {
        skip_pdfs: source.skip_pdfs,
        ..Default::default()
    });

    let files = match (&source.file, &source.dir) {
        (Some(file_path), _) => vec![collector.collect_file(file_path)?],
        (None, Some(dir_path)) => collector.collect_directory(dir_path)?,
        (None, None) => Vec::new(),
    };

    let pages = if source.is_demo() {
        tracing::info!("Using built-in demo corpus");
        demo_pages()
    } else if files.is_empty() {
        bail!("수집할 파일이 없습니다");
    } else {
        ContentExtractor::new()
            .extract_all(&files)
            .await
            .context("페이지 추출 실패")?
    };

    Corpus::build(pages, &chunk).context("코퍼스 생성 실패")
}

// ============================================================================
// Command Implementations
// ============================================================================

/// 청크 목록 명령어 (chunks)
async fn cmd_chunks(config: &RagConfig, source: &SourceArgs, limit: usize) -> Result<()> {
    let corpus = load_corpus(config, source).await?;

    println!("=== 청크 생성 ===");
    for page in corpus.pages() {
        println!(
            "{}페이지: {} 청크",
            page.number,
            corpus.page_fragments(page.number).count()
        );
    }
    println!("총 {} 청크\n", corpus.fragments().len());

    println!("=== 청크 예시 ===");
    for fragment in corpus.fragments().iter().take(limit) {
        println!("{}: {}", fragment.id(), truncate_text(fragment.text(), 50));
    }
    println!();
    println!("[*] fingerprint: {}", corpus.fingerprint());

    Ok(())
}

/// 키워드 명령어 (keywords)
fn cmd_keywords(text: &str) -> Result<()> {
    let keywords = extract_keywords(text);

    if keywords.is_empty() {
        println!("[!] 추출된 키워드가 없습니다.");
        return Ok(());
    }

    println!("[OK] 키워드 ({} 개):", keywords.len());
    println!("  {}", keywords.iter().collect::<Vec<_>>().join(" "));
    Ok(())
}

/// 질문 명령어 (ask)
async fn cmd_ask(
    config: &RagConfig,
    source: &SourceArgs,
    options: RetrieveOptions,
    question: &str,
    explain: bool,
) -> Result<()> {
    let corpus = load_corpus(config, source).await?;
    let retriever = Retriever::new(corpus, options);

    let answer = ask_once(&retriever, question, &config.answer);
    println!("\n{}", answer);

    if explain {
        print_explain(&retriever, question);
    }

    Ok(())
}

/// 대화형 명령어 (chat)
///
/// exit / quit / q 로 종료합니다.
async fn cmd_chat(config: &RagConfig, source: &SourceArgs, options: RetrieveOptions) -> Result<()> {
    let corpus = load_corpus(config, source).await?;
    let stats = corpus.stats();
    let retriever = Retriever::new(corpus, options);

    println!("=== RAG 대화형 질의응답 ===");
    println!(
        "{} 페이지, {} 청크 (top_k={}, min_score={})",
        stats.page_count, stats.fragment_count, options.top_k, options.min_score
    );
    println!("질문을 입력하세요. exit / quit / q 로 종료합니다.\n");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        print!("질문: ");
        std::io::stdout().flush().context("stdout flush 실패")?;

        let Some(line) = lines.next_line().await.context("입력 읽기 실패")? else {
            println!("\n입력 종료.");
            break;
        };

        let question = line.trim();
        if question.is_empty() {
            println!("빈 입력입니다. 계속 질문하거나 exit 로 종료하세요.");
            continue;
        }
        if is_exit_command(question) {
            println!("안녕히 가세요!");
            break;
        }

        let answer = ask_once(&retriever, question, &config.answer);
        println!("\n{}\n", answer);
    }

    Ok(())
}

/// 회귀 테스트 명령어 (test)
async fn cmd_test(
    config: &RagConfig,
    source: &SourceArgs,
    cases_path: Option<&Path>,
    min_score: Option<usize>,
    json: bool,
) -> Result<()> {
    let cases = match cases_path {
        Some(path) => load_test_cases(path).context("테스트 케이스 로드 실패")?,
        None => demo_test_cases(),
    };

    let corpus = load_corpus(config, source).await?;

    let mut options = config.retrieval.with_top_k(REGRESSION_TOP_K);
    if let Some(min_score) = min_score {
        options = options.with_min_score(min_score);
    }

    let report = run_regression(&cases, corpus.fragments(), &options);

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("보고서 직렬화 실패")?
        );
    } else {
        println!("=== 회귀 테스트 실행 ===\n");
        println!("{}", report);
    }

    if !report.all_passed() {
        bail!(
            "일부 테스트 실패 ({}/{} 통과, RISK {}). 검색 로직이나 임계값을 조정하세요.",
            report.passed(),
            report.total(),
            report.risks()
        );
    }

    if !json {
        println!("\n[SUCCESS] 모든 테스트 통과. RAG 시스템이 정상 동작합니다.");
    }
    Ok(())
}

/// 상태 명령어 (status)
async fn cmd_status(config: &RagConfig, config_path: &Path, source: &SourceArgs) -> Result<()> {
    println!("minirag v{}", env!("CARGO_PKG_VERSION"));
    println!();

    if config_path.exists() {
        println!("[OK] 설정 파일: {}", config_path.display());
    } else {
        println!("[*] 설정 파일 없음 (기본값 사용): {}", config_path.display());
    }
    println!(
        "[*] 검색: top_k={}, min_score={}",
        config.retrieval.top_k, config.retrieval.min_score
    );

    match load_corpus(config, source).await {
        Ok(corpus) => {
            let stats = corpus.stats();
            println!(
                "[OK] 코퍼스: {} 페이지, {} 청크, {} 문자",
                stats.page_count, stats.fragment_count, stats.total_chars
            );
            println!(
                "     청킹: max_len={}, overlap={}",
                stats.chunk_config.max_len, stats.chunk_config.overlap
            );
            println!("     fingerprint: {}", corpus.fingerprint());
        }
        Err(e) => {
            println!("[!] 코퍼스 로드 실패: {:#}", e);
        }
    }

    Ok(())
}

// ============================================================================
// Helper Functions
// ============================================================================

/// 검색 → 결과 출력 → 답변 생성
fn ask_once(retriever: &Retriever, question: &str, answer_config: &AnswerConfig) -> Answer {
    let retrieved = retriever.retrieve(question);

    println!("[RETRIEVAL]");
    if retrieved.is_empty() {
        println!("(관련 내용 없음)");
    }
    for result in &retrieved {
        println!("{} score={}", result.id(), result.score());
    }

    Answer::from_results(&retrieved, answer_config)
}

/// 게이트와 무관한 전체 후보 출력
fn print_explain(retriever: &Retriever, question: &str) {
    let keywords = extract_keywords(question);
    let candidates = retriever.explain(question);

    println!();
    println!("[EXPLAIN] 질의 키워드 {} 개, 후보 {} 개", keywords.len(), candidates.len());
    for candidate in &candidates {
        let mark = if candidate.score() >= retriever.options().min_score {
            "+"
        } else {
            "-"
        };
        println!(
            "  {} {} score={} | {}",
            mark,
            candidate.id(),
            candidate.score(),
            truncate_text(candidate.text(), 40)
        );
    }
}

fn is_exit_command(input: &str) -> bool {
    matches!(input.to_lowercase().as_str(), "exit" | "quit" | "q")
}

/// 텍스트 자르기 (UTF-8 안전)
fn truncate_text(text: &str, max_chars: usize) -> String {
    let cleaned = text.replace('\n', " ").replace('\r', "");
    let cleaned = cleaned.trim();

    if cleaned.chars().count() <= max_chars {
        cleaned.to_string()
    } else {
        let truncated: String = cleaned.chars().take(max_chars).collect();
        format!("{}...", truncated)
    }
}

// ============================================================================
// Tests
// ============================================================================
