//! 批次总结器
//!
//! 两种模式：
//! - 批次模式：整批内容拼接为一个 prompt，一次远程调用
//! - 逐文件模式：每个文件先按内容哈希查缓存，未命中才调用模型并写回缓存
//!
//! 远程调用失败不会向上抛出，而是生成带 [`SUMMARY_FAILED_MARKER`] 的占位文本。

use std::sync::Arc;
use tracing::{info, warn};

use super::cache::{content_hash, SummaryCache};
use super::prompts;
use super::types::{Batch, BatchSummary, FileSummary, SummaryMode, SummaryOrigin};
use crate::llm::{LlmError, Summarizer};

/// 失败占位文本的标记
pub const SUMMARY_FAILED_MARKER: &str = "[summary failed]";

/// 生成失败占位文本
pub fn failure_placeholder(subject: &str, err: &LlmError) -> String {
    format!("{} Error while summarizing {}: {}", SUMMARY_FAILED_MARKER, subject, err)
}

/// 逐文件结果在批次文本中的格式
fn labeled(name: &str, summary: &str) -> String {
    format!("### {}\n\n{}", name, summary)
}

/// 批次总结器
pub struct BatchSummarizer {
    summarizer: Arc<dyn Summarizer>,
    cache: Arc<SummaryCache>,
    mode: SummaryMode,
}

impl BatchSummarizer {
    pub fn new(summarizer: Arc<dyn Summarizer>, cache: Arc<SummaryCache>, mode: SummaryMode) -> Self {
        Self {
            summarizer,
            cache,
            mode,
        }
    }

    pub fn mode(&self) -> SummaryMode {
        self.mode
    }

    /// 总结一个批次
    pub async fn summarize_batch(&self, index: usize, batch: &Batch, prior_context: &str) -> BatchSummary {
        info!(
            "Batch {}: summarizing {} files ({} mode)",
            index + 1,
            batch.len(),
            self.mode
        );

        match self.mode {
            SummaryMode::Batch => self.summarize_whole(index, batch, prior_context).await,
            SummaryMode::PerFile => self.summarize_per_file(index, batch, prior_context).await,
        }
    }

    async fn summarize_whole(&self, index: usize, batch: &Batch, prior_context: &str) -> BatchSummary {
        let submissions: Vec<_> = batch.files.iter().map(|f| f.submission_text()).collect();
        let prompt = prompts::format_batch_summary_prompt(
            prior_context,
            batch
                .files
                .iter()
                .zip(&submissions)
                .map(|(f, text)| (f.name.as_str(), &**text)),
        );

        let (text, failed_count) = match self.summarizer.summarize(&prompt).await {
            Ok(summary) => (summary, 0),
            Err(e) => {
                warn!("Batch {} failed: {}", index + 1, e);
                (failure_placeholder(&format!("batch {}", index + 1), &e), 1)
            }
        };

        BatchSummary {
            index,
            file_paths: file_paths(batch),
            token_count: batch.token_count,
            text,
            files: Vec::new(),
            remote_calls: 1,
            cache_hits: 0,
            failed_count,
        }
    }

    async fn summarize_per_file(&self, index: usize, batch: &Batch, prior_context: &str) -> BatchSummary {
        let mut results: Vec<FileSummary> = Vec::with_capacity(batch.len());
        let mut remote_calls = 0;
        let mut cache_hits = 0;
        let mut failed_count = 0;

        for file in &batch.files {
            let hash = content_hash(&file.content);

            let (summary, origin) = match self.cache.lookup(&hash).await {
                Some(cached) => {
                    info!("Cache hit: {}", file.relative_path);
                    cache_hits += 1;
                    (cached, SummaryOrigin::Cached)
                }
                None => {
                    // 先前上下文 = 传入的上下文 + 本批次已完成的文件
                    let mut context = prior_context.trim().to_string();
                    for earlier in &results {
                        if !context.is_empty() {
                            context.push_str("\n\n");
                        }
                        context.push_str(&labeled(&earlier.name, &earlier.summary));
                    }

                    let prompt = prompts::format_file_summary_prompt(
                        &context,
                        &file.relative_path,
                        &file.submission_text(),
                    );

                    remote_calls += 1;
                    match self.summarizer.summarize(&prompt).await {
                        Ok(summary) => {
                            self.cache.store(&hash, &summary).await;
                            (summary, SummaryOrigin::Remote)
                        }
                        Err(e) => {
                            warn!("Failed to summarize {}: {}", file.relative_path, e);
                            failed_count += 1;
                            (failure_placeholder(&file.relative_path, &e), SummaryOrigin::Failed)
                        }
                    }
                }
            };

            results.push(FileSummary {
                relative_path: file.relative_path.clone(),
                name: file.name.clone(),
                summary,
                origin,
            });
        }

        let text = results
            .iter()
            .map(|r| labeled(&r.name, &r.summary))
            .collect::<Vec<_>>()
            .join("\n\n");

        BatchSummary {
            index,
            file_paths: file_paths(batch),
            token_count: batch.token_count,
            text,
            files: results,
            remote_calls,
            cache_hits,
            failed_count,
        }
    }
}

fn file_paths(batch: &Batch) -> Vec<String> {
    batch.files.iter().map(|f| f.relative_path.clone()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::MockSummarizer;
    use crate::services::doc_generator::types::SourceFile;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn source(rel: &str, content: &str) -> SourceFile {
        SourceFile::new(PathBuf::from(format!("/repo/{}", rel)), rel.to_string(), content.to_string())
    }

    fn batch(files: Vec<SourceFile>) -> Batch {
        let mut b = Batch::default();
        for f in files {
            b.push(f, 1);
        }
        b
    }

    #[tokio::test]
    async fn test_batch_mode_single_call() {
        let mut mock = MockSummarizer::new();
        mock.expect_summarize()
            .withf(|p: &str| p.contains("# a.py\ndef a():") && p.contains("# style.css\nbody {}"))
            .times(1)
            .returning(|_| Ok("batch summary".to_string()));

        let summarizer = BatchSummarizer::new(
            Arc::new(mock),
            Arc::new(SummaryCache::disabled()),
            SummaryMode::Batch,
        );
        let b = batch(vec![
            source("src/a.py", "import os\ndef a():\n    return os.name\n"),
            source("style.css", "body {}"),
        ]);

        let result = summarizer.summarize_batch(0, &b, "").await;
        assert_eq!(result.text, "batch summary");
        assert_eq!(result.remote_calls, 1);
        assert_eq!(result.failed_count, 0);
        assert_eq!(result.file_paths, vec!["src/a.py", "style.css"]);
        assert!(result.files.is_empty());
    }

    #[tokio::test]
    async fn test_batch_mode_failure_placeholder() {
        let mut mock = MockSummarizer::new();
        mock.expect_summarize().times(1).returning(|_| {
            Err(LlmError::ApiError {
                status: 502,
                message: "bad gateway".to_string(),
            })
        });

        let summarizer = BatchSummarizer::new(
            Arc::new(mock),
            Arc::new(SummaryCache::disabled()),
            SummaryMode::Batch,
        );
        let result = summarizer.summarize_batch(2, &batch(vec![source("a.css", "a{}")]), "").await;

        assert!(result.text.starts_with(SUMMARY_FAILED_MARKER));
        assert!(result.text.contains("batch 3"));
        assert!(result.text.contains("bad gateway"));
        assert_eq!(result.failed_count, 1);
    }

    #[tokio::test]
    async fn test_per_file_identical_content_one_call() {
        let dir = TempDir::new().unwrap();
        let mut mock = MockSummarizer::new();
        mock.expect_summarize()
            .times(1)
            .returning(|_| Ok("shared helper".to_string()));

        let summarizer = BatchSummarizer::new(
            Arc::new(mock),
            Arc::new(SummaryCache::new(dir.path())),
            SummaryMode::PerFile,
        );
        let b = batch(vec![
            source("a/util.js", "function util() {}"),
            source("b/copy.js", "function util() {}"),
        ]);

        let result = summarizer.summarize_batch(0, &b, "").await;
        assert_eq!(result.remote_calls, 1);
        assert_eq!(result.cache_hits, 1);
        assert_eq!(result.files[0].origin, SummaryOrigin::Remote);
        assert_eq!(result.files[1].origin, SummaryOrigin::Cached);
        assert_eq!(result.text, "### util.js\n\nshared helper\n\n### copy.js\n\nshared helper");
    }

    #[tokio::test]
    async fn test_per_file_passes_prior_context() {
        let mut mock = MockSummarizer::new();
        let mut seq = mockall::Sequence::new();
        mock.expect_summarize()
            .withf(|p: &str| p.contains("FILE: first.py") && p.contains("earlier batches"))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok("first summary".to_string()));
        mock.expect_summarize()
            .withf(|p: &str| {
                p.contains("FILE: second.py")
                    && p.contains("earlier batches")
                    && p.contains("### first.py\n\nfirst summary")
            })
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok("second summary".to_string()));

        let summarizer = BatchSummarizer::new(
            Arc::new(mock),
            Arc::new(SummaryCache::disabled()),
            SummaryMode::PerFile,
        );
        let b = batch(vec![source("first.py", "def f(): pass"), source("second.py", "def g(): pass")]);

        let result = summarizer.summarize_batch(0, &b, "earlier batches").await;
        assert_eq!(result.remote_calls, 2);
        assert!(result.text.ends_with("### second.py\n\nsecond summary"));
    }

    #[tokio::test]
    async fn test_per_file_failure_not_cached() {
        let dir = TempDir::new().unwrap();
        let cache = Arc::new(SummaryCache::new(dir.path()));

        let mut mock = MockSummarizer::new();
        mock.expect_summarize()
            .withf(|p: &str| p.contains("FILE: broken.css"))
            .times(1)
            .returning(|_| Err(LlmError::EmptyResponse("no choices returned".to_string())));
        mock.expect_summarize()
            .withf(|p: &str| p.contains("FILE: fine.css"))
            .times(1)
            .returning(|_| Ok("fine".to_string()));

        let summarizer = BatchSummarizer::new(Arc::new(mock), cache.clone(), SummaryMode::PerFile);
        let b = batch(vec![source("broken.css", "a{}"), source("fine.css", "b{}")]);

        let result = summarizer.summarize_batch(0, &b, "").await;
        assert_eq!(result.failed_count, 1);
        assert_eq!(result.files[0].origin, SummaryOrigin::Failed);
        assert!(result.files[0].summary.contains(SUMMARY_FAILED_MARKER));
        assert_eq!(result.files[1].summary, "fine");

        assert_eq!(cache.lookup(&content_hash("a{}")).await, None);
        assert_eq!(cache.lookup(&content_hash("b{}")).await.as_deref(), Some("fine"));
    }
}
