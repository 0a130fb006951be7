//! DevSage - 代码库文档生成工具
//!
//! 扫描源码目录，分批交给 LLM 总结，生成 Markdown 文档和项目概览。

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod error;
mod llm;
mod services;

use config::AppConfig;
use llm::{ChatOptions, LlmClient, ModelSummarizer};
use services::doc_generator::{DocGenService, ReportWriter, SummaryMode};

/// 命令行参数
#[derive(Debug, Parser)]
#[command(name = "devsage", version, about = "Generate documentation for a codebase with an LLM")]
struct Cli {
    /// 要分析的源码目录
    target: PathBuf,

    /// 输出目录
    #[arg(long, default_value = "docs")]
    out: PathBuf,

    /// 总结模式：batch 或 per-file
    #[arg(long)]
    mode: Option<SummaryMode>,

    /// 单批次 token 上限
    #[arg(long)]
    max_tokens: Option<usize>,

    /// 缓存目录
    #[arg(long)]
    cache_dir: Option<PathBuf>,

    /// 禁用总结缓存
    #[arg(long)]
    no_cache: bool,

    /// 同时进行的批次数
    #[arg(long)]
    concurrency: Option<usize>,

    /// JSON 配置文件（默认读取当前目录下的 devsage.json）
    #[arg(long)]
    config: Option<PathBuf>,
}

impl Cli {
    /// 命令行参数覆盖配置
    fn apply(&self, config: &mut AppConfig) {
        let docgen = &mut config.docgen;
        if let Some(mode) = self.mode {
            docgen.mode = mode;
        }
        if let Some(max_tokens) = self.max_tokens {
            docgen.max_tokens = max_tokens;
        }
        if let Some(dir) = &self.cache_dir {
            docgen.cache_dir = dir.clone();
        }
        if self.no_cache {
            docgen.cache_enabled = false;
        }
        if self.concurrency.is_some() {
            docgen.concurrency = self.concurrency;
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    dotenvy::dotenv().ok();

    // 初始化日志（stdout 留给最终概览）
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "devsage_rs=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut config = AppConfig::load(cli.config.as_deref())?;
    config.apply_env();
    cli.apply(&mut config);
    config.validate()?;

    info!(
        "Starting DevSage: target={}, mode={}, max_tokens={}",
        cli.target.display(),
        config.docgen.mode,
        config.docgen.max_tokens
    );

    let client = Arc::new(LlmClient::new(
        config.api_key.clone(),
        config.base_url.clone(),
        config.synthesis_timeout_secs.max(config.batch_timeout_secs),
    )?);

    let options = |timeout: u64| ChatOptions {
        temperature: Some(config.temperature),
        max_tokens: config.max_output_tokens,
        timeout: Some(timeout),
    };
    let summarizer = Arc::new(ModelSummarizer::new(
        client.clone(),
        config.model.clone(),
        options(config.batch_timeout_secs),
    ));
    let synthesizer = Arc::new(ModelSummarizer::new(
        client,
        config.synthesis_model.clone(),
        options(config.synthesis_timeout_secs),
    ));
    info!("Models: summary={}, synthesis={}", summarizer.model(), synthesizer.model());

    let service = DocGenService::new(config.docgen.clone(), summarizer, synthesizer);
    let output = service.generate(&cli.target).await?;

    let writer = ReportWriter::new(cli.out.clone(), config.docgen.clone());
    let report_path = writer.save_report(&output).await?;
    writer
        .save_overview(&output.overview)
        .await
        .with_context(|| format!("failed to write overview to {}", writer.out_dir().display()))?;

    println!("\n=== Final Project Overview ===\n");
    println!("{}", output.overview);

    info!("Run statistics: {}", output.stats);
    info!("Done. Documentation written to {}", report_path.display());
    Ok(())
}
