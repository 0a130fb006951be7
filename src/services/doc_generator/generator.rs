//! 报告生成器
//!
//! 把管线结果渲染为 Markdown 报告并保存到输出目录

use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::info;

use super::types::{BatchSummary, DocGenConfig, FileSummary, PipelineOutput, SummaryMode, SummaryOrigin};

/// 报告生成器
pub struct ReportWriter {
    /// 输出目录
    out_dir: PathBuf,
    /// 配置
    config: DocGenConfig,
}

impl ReportWriter {
    /// 创建新的报告生成器
    pub fn new(out_dir: PathBuf, config: DocGenConfig) -> Self {
        Self { out_dir, config }
    }

    /// 报告文件路径，例如 docs/DOCUMENTATION.md
    pub fn report_path(&self) -> PathBuf {
        self.out_dir.join(&self.config.report_name)
    }

    /// 概览文件路径，例如 docs/OVERVIEW.md
    pub fn overview_path(&self) -> PathBuf {
        self.out_dir.join(&self.config.overview_name)
    }

    /// 渲染报告
    ///
    /// 批次模式每个批次一节，逐文件模式每个文件一节。
    /// 缓存命中与远程结果渲染相同，热缓存重跑得到相同报告
    pub fn render_report(&self, output: &PipelineOutput) -> String {
        let mut doc = String::new();

        for batch in &output.batches {
            match output.mode {
                SummaryMode::Batch => push_section(&mut doc, &batch_identifier(batch), &batch.text),
                SummaryMode::PerFile => {
                    for file in &batch.files {
                        push_section(&mut doc, &file_identifier(file), &file.summary);
                    }
                }
            }
        }

        doc
    }

    /// 保存报告
    pub async fn save_report(&self, output: &PipelineOutput) -> Result<PathBuf, GeneratorError> {
        let path = self.report_path();
        self.save_document(&path, &self.render_report(output)).await?;
        info!("Documentation saved to {}", path.display());
        Ok(path)
    }

    /// 保存项目概览
    pub async fn save_overview(&self, overview: &str) -> Result<PathBuf, GeneratorError> {
        let path = self.overview_path();
        self.save_document(&path, &format!("{}\n", overview.trim_end())).await?;
        info!("Overview saved to {}", path.display());
        Ok(path)
    }

    /// 保存文档到文件（覆盖已有内容）
    async fn save_document(&self, path: &Path, content: &str) -> Result<(), GeneratorError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| GeneratorError::IoError(parent.to_path_buf(), e))?;
        }

        let mut file = fs::File::create(path)
            .await
            .map_err(|e| GeneratorError::IoError(path.to_path_buf(), e))?;
        file.write_all(content.as_bytes())
            .await
            .map_err(|e| GeneratorError::IoError(path.to_path_buf(), e))?;
        file.flush()
            .await
            .map_err(|e| GeneratorError::IoError(path.to_path_buf(), e))?;

        Ok(())
    }

    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }
}

fn push_section(doc: &mut String, identifier: &str, summary: &str) {
    doc.push_str(&format!("## {}\n\n{}\n\n---\n\n", identifier, summary.trim()));
}

/// 批次标识，例如 `Batch 2 (src/a.py, src/b.py) ~1200 tokens`
fn batch_identifier(batch: &BatchSummary) -> String {
    format!(
        "Batch {} ({}) ~{} tokens",
        batch.index + 1,
        batch.file_paths.join(", "),
        batch.token_count
    )
}

/// 文件标识，失败的文件额外标注
fn file_identifier(file: &FileSummary) -> String {
    match file.origin {
        SummaryOrigin::Failed => format!("{} (failed)", file.relative_path),
        SummaryOrigin::Cached | SummaryOrigin::Remote => file.relative_path.clone(),
    }
}

/// 生成器错误类型
#[derive(Debug, thiserror::Error)]
pub enum GeneratorError {
    #[error("IO错误 ({0}): {1}")]
    IoError(PathBuf, #[source] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::doc_generator::types::RunStats;
    use tempfile::TempDir;

    fn file(rel: &str, summary: &str) -> FileSummary {
        FileSummary {
            relative_path: rel.to_string(),
            name: rel.rsplit('/').next().unwrap_or(rel).to_string(),
            summary: summary.to_string(),
            origin: SummaryOrigin::Remote,
        }
    }

    fn batch(index: usize, files: Vec<FileSummary>, text: &str) -> BatchSummary {
        BatchSummary {
            index,
            file_paths: files.iter().map(|f| f.relative_path.clone()).collect(),
            token_count: 10,
            text: text.to_string(),
            files,
            remote_calls: 1,
            cache_hits: 0,
            failed_count: 0,
        }
    }

    fn output(mode: SummaryMode) -> PipelineOutput {
        PipelineOutput {
            mode,
            batches: vec![
                batch(0, vec![file("src/a.py", "loads config"), file("src/b.py", "runs jobs")], "first batch"),
                batch(1, vec![file("web/app.js", "renders ui\n")], "second batch"),
            ],
            overview: "the project".to_string(),
            stats: RunStats::default(),
        }
    }

    #[test]
    fn test_render_batch_mode() {
        let writer = ReportWriter::new(PathBuf::from("docs"), DocGenConfig::default());
        let report = writer.render_report(&output(SummaryMode::Batch));

        assert_eq!(
            report,
            "## Batch 1 (src/a.py, src/b.py) ~10 tokens\n\nfirst batch\n\n---\n\n\
             ## Batch 2 (web/app.js) ~10 tokens\n\nsecond batch\n\n---\n\n"
        );
    }

    #[test]
    fn test_render_per_file_mode() {
        let writer = ReportWriter::new(PathBuf::from("docs"), DocGenConfig::default());
        let report = writer.render_report(&output(SummaryMode::PerFile));

        assert!(report.starts_with("## src/a.py\n\nloads config\n\n---\n\n"));
        assert!(report.ends_with("## web/app.js\n\nrenders ui\n\n---\n\n"));
        assert_eq!(report.matches("\n---\n").count(), 3);
    }

    #[test]
    fn test_render_marks_failed_files_only() {
        let writer = ReportWriter::new(PathBuf::from("docs"), DocGenConfig::default());
        let mut out = output(SummaryMode::PerFile);
        out.batches[0].files[0].origin = SummaryOrigin::Cached;
        out.batches[0].files[1].origin = SummaryOrigin::Failed;
        out.batches[0].files[1].summary = "[summary failed] timeout".to_string();

        let report = writer.render_report(&out);
        assert!(report.starts_with("## src/a.py\n\nloads config\n"));
        assert!(report.contains("## src/b.py (failed)\n\n[summary failed] timeout\n"));
        assert!(report.contains("## web/app.js\n"));
    }

    #[test]
    fn test_paths() {
        let writer = ReportWriter::new(PathBuf::from("/out"), DocGenConfig::default());
        assert_eq!(writer.report_path(), PathBuf::from("/out/DOCUMENTATION.md"));
        assert_eq!(writer.overview_path(), PathBuf::from("/out/OVERVIEW.md"));
    }

    #[tokio::test]
    async fn test_save_creates_directory_and_overwrites() {
        let dir = TempDir::new().unwrap();
        let writer = ReportWriter::new(dir.path().join("nested/docs"), DocGenConfig::default());

        let path = writer.save_report(&output(SummaryMode::Batch)).await.unwrap();
        let first = std::fs::read_to_string(&path).unwrap();

        // 相同输入重复写入，结果一致
        writer.save_report(&output(SummaryMode::Batch)).await.unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), first);

        let overview = writer.save_overview("the project\n\n").await.unwrap();
        assert_eq!(std::fs::read_to_string(overview).unwrap(), "the project\n");
    }

    #[tokio::test]
    async fn test_save_fails_when_out_dir_is_a_file() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("docs");
        std::fs::write(&blocker, "").unwrap();

        let writer = ReportWriter::new(blocker, DocGenConfig::default());
        assert!(matches!(
            writer.save_report(&output(SummaryMode::Batch)).await,
            Err(GeneratorError::IoError(..))
        ));
    }
}
