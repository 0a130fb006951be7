//! 管线调度器
//!
//! 扫描 → 打包 → 并发总结所有批次 → 按批次序号还原顺序 → 一次综合调用

use futures::stream::{self, StreamExt};
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info};

use super::cache::SummaryCache;
use super::packer::BatchPacker;
use super::prompts;
use super::scanner::{DirectoryScanner, ScanError};
use super::summarizer::BatchSummarizer;
use super::tokens::TokenEstimator;
use super::types::{now_millis, Batch, BatchSummary, DocGenConfig, PipelineOutput, RunStats, SourceFile};
use crate::llm::{LlmError, Summarizer};

/// 文档生成服务（主入口）
pub struct DocGenService {
    config: DocGenConfig,
    batch_summarizer: BatchSummarizer,
    synthesizer: Arc<dyn Summarizer>,
}

impl DocGenService {
    /// 创建新的文档生成服务
    ///
    /// `summarizer` 用于批次/文件总结，`synthesizer` 用于最终综合
    pub fn new(config: DocGenConfig, summarizer: Arc<dyn Summarizer>, synthesizer: Arc<dyn Summarizer>) -> Self {
        let cache = if config.cache_enabled {
            SummaryCache::new(&config.cache_dir)
        } else {
            SummaryCache::disabled()
        };
        if cache.is_enabled() {
            info!("Summary cache: {}", cache.dir().display());
        } else {
            info!("Summary cache disabled");
        }
        let batch_summarizer = BatchSummarizer::new(summarizer, Arc::new(cache), config.mode);

        Self {
            config,
            batch_summarizer,
            synthesizer,
        }
    }

    /// 扫描目录并运行完整管线
    pub async fn generate(&self, source_path: &Path) -> Result<PipelineOutput, ProcessorError> {
        let scanner = DirectoryScanner::new(self.config.clone());
        let paths = scanner.scan(source_path)?;
        let files = scanner.read_sources(source_path, paths).await;
        self.run_pipeline(files).await
    }

    /// 对已读取的文件运行管线
    pub async fn run_pipeline(&self, files: Vec<SourceFile>) -> Result<PipelineOutput, ProcessorError> {
        if files.is_empty() {
            return Err(ProcessorError::NoSourceFiles);
        }
        if self.config.max_tokens == 0 {
            return Err(ProcessorError::InvalidConfig("max_tokens must be positive".to_string()));
        }

        let mut stats = RunStats {
            total_files: files.len(),
            start_time: Some(now_millis()),
            ..Default::default()
        };

        let packer = BatchPacker::new(
            self.config.max_tokens,
            TokenEstimator::new(self.config.chars_per_token),
        );
        let batches = packer.pack(files);
        stats.total_batches = batches.len();
        stats.estimated_tokens = batches.iter().map(|b| b.token_count).sum();

        // 开始前输出每个批次的规模，便于对照定位失败批次
        for (i, batch) in batches.iter().enumerate() {
            info!(
                "Batch {}: Summarizing {} files... (estimated {} tokens)",
                i + 1,
                batch.len(),
                batch.token_count
            );
        }

        let summaries = self.summarize_all(batches).await;
        for summary in &summaries {
            stats.absorb(summary);
        }

        let overview = self.synthesize(&summaries).await?;
        stats.end_time = Some(now_millis());

        info!("Pipeline finished: {}", stats);

        Ok(PipelineOutput {
            mode: self.config.mode,
            batches: summaries,
            overview,
            stats,
        })
    }

    /// 并发总结所有批次
    ///
    /// 批次之间不传递先前上下文；结果按批次序号排序，与完成顺序无关
    async fn summarize_all(&self, batches: Vec<Batch>) -> Vec<BatchSummary> {
        let total = batches.len();
        let concurrency = self.config.concurrency.unwrap_or(total).clamp(1, total.max(1));
        info!(
            "Summarizing {} batches ({} mode), concurrency: {}",
            total,
            self.batch_summarizer.mode(),
            concurrency
        );

        let summarizer = &self.batch_summarizer;
        let mut summaries: Vec<BatchSummary> = stream::iter(batches.into_iter().enumerate())
            .map(|(index, batch)| async move { summarizer.summarize_batch(index, &batch, "").await })
            .buffer_unordered(concurrency)
            .collect()
            .await;

        summaries.sort_by_key(|s| s.index);
        summaries
    }

    /// 综合所有批次总结，生成项目概览
    async fn synthesize(&self, summaries: &[BatchSummary]) -> Result<String, ProcessorError> {
        let joined = summaries
            .iter()
            .map(|s| s.text.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        let prompt = prompts::format_synthesis_prompt(&joined);

        info!("Generating final project overview...");
        self.synthesizer.summarize(&prompt).await.map_err(|e| {
            error!("Final synthesis failed: {}", e);
            ProcessorError::Synthesis(e)
        })
    }
}

/// 处理器错误类型
#[derive(Debug, thiserror::Error)]
pub enum ProcessorError {
    #[error("No supported source files found")]
    NoSourceFiles,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Scan error: {0}")]
    Scan(#[from] ScanError),

    #[error("Final synthesis failed: {0}")]
    Synthesis(#[source] LlmError),
}
