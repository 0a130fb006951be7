//! 文档生成器类型定义
//!
//! 定义源文件、批次、总结结果、运行统计和管线配置等核心类型

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use super::extractor::extract_content;

/// 文件类型标签（由扩展名推导）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileKind {
    Python,
    JavaScript,
    TypeScript,
    Java,
    Html,
    Css,
    Other,
}

impl FileKind {
    /// 根据扩展名（不含点，大小写不敏感）推导类型
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "py" => Self::Python,
            "js" | "jsx" | "mjs" | "cjs" => Self::JavaScript,
            "ts" | "tsx" => Self::TypeScript,
            "java" => Self::Java,
            "html" | "htm" => Self::Html,
            "css" => Self::Css,
            _ => Self::Other,
        }
    }
}

/// 源文件：读取后不可变
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// 绝对路径（文件标识）
    pub path: PathBuf,
    /// 相对于扫描根目录的路径（使用 `/` 分隔）
    pub relative_path: String,
    /// 文件名
    pub name: String,
    /// 类型标签
    pub kind: FileKind,
    /// 原始文本
    pub content: String,
}

impl SourceFile {
    pub fn new(path: PathBuf, relative_path: String, content: String) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| relative_path.clone());
        let kind = path
            .extension()
            .and_then(|e| e.to_str())
            .map(FileKind::from_extension)
            .unwrap_or(FileKind::Other);

        Self {
            path,
            relative_path,
            name,
            kind,
            content,
        }
    }

    /// 实际提交给模型的文本
    pub fn submission_text(&self) -> Cow<'_, str> {
        extract_content(self.kind, &self.content)
    }
}

/// 批次：非空、有序的文件组，附带累计 token 估算
#[derive(Debug, Clone, Default)]
pub struct Batch {
    pub files: Vec<SourceFile>,
    pub token_count: usize,
}

impl Batch {
    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub(crate) fn push(&mut self, file: SourceFile, tokens: usize) {
        self.files.push(file);
        self.token_count += tokens;
    }
}

/// 批次总结模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SummaryMode {
    /// 整批拼接为一个 prompt，一次远程调用
    #[default]
    Batch,
    /// 逐文件总结，按内容哈希查缓存
    PerFile,
}

impl FromStr for SummaryMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "batch" => Ok(Self::Batch),
            "per-file" | "per_file" | "perfile" => Ok(Self::PerFile),
            other => Err(format!("unknown summary mode '{}' (expected batch or per-file)", other)),
        }
    }
}

impl fmt::Display for SummaryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Batch => write!(f, "batch"),
            Self::PerFile => write!(f, "per-file"),
        }
    }
}

/// 单个文件总结的来源
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummaryOrigin {
    /// 缓存命中，未发起远程调用
    Cached,
    /// 远程调用成功
    Remote,
    /// 远程调用失败，文本为占位符
    Failed,
}

/// 逐文件模式下的单文件结果
#[derive(Debug, Clone)]
pub struct FileSummary {
    pub relative_path: String,
    pub name: String,
    pub summary: String,
    pub origin: SummaryOrigin,
}

/// 单个批次的总结结果
#[derive(Debug, Clone)]
pub struct BatchSummary {
    /// 批次序号（从 0 开始），决定最终拼接顺序
    pub index: usize,
    /// 批次内文件的相对路径
    pub file_paths: Vec<String>,
    /// 批次 token 估算
    pub token_count: usize,
    /// 批次总结文本
    pub text: String,
    /// 逐文件结果（仅逐文件模式）
    pub files: Vec<FileSummary>,
    /// 远程调用次数
    pub remote_calls: usize,
    /// 缓存命中次数
    pub cache_hits: usize,
    /// 失败项数量
    pub failed_count: usize,
}

/// 单次运行统计
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunStats {
    pub total_files: usize,
    pub total_batches: usize,
    pub estimated_tokens: usize,
    pub cache_hits: usize,
    pub remote_calls: usize,
    pub failed_count: usize,
    /// 开始时间（Unix时间戳，毫秒）
    pub start_time: Option<i64>,
    /// 结束时间（Unix时间戳，毫秒）
    pub end_time: Option<i64>,
}

impl RunStats {
    /// 计算耗时（毫秒）
    pub fn elapsed_ms(&self) -> Option<i64> {
        match (self.start_time, self.end_time) {
            (Some(start), Some(end)) => Some(end - start),
            (Some(start), None) => Some(now_millis() - start),
            _ => None,
        }
    }

    /// 累加一个批次的计数
    pub fn absorb(&mut self, batch: &BatchSummary) {
        self.cache_hits += batch.cache_hits;
        self.remote_calls += batch.remote_calls;
        self.failed_count += batch.failed_count;
    }
}

impl fmt::Display for RunStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} files, {} batches, ~{} tokens, {} remote calls, {} cache hits, {} failed, {}ms",
            self.total_files,
            self.total_batches,
            self.estimated_tokens,
            self.remote_calls,
            self.cache_hits,
            self.failed_count,
            self.elapsed_ms().unwrap_or_default()
        )
    }
}

pub(crate) fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// 管线运行结果
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    /// 使用的总结模式
    pub mode: SummaryMode,
    /// 按批次顺序排列的总结
    pub batches: Vec<BatchSummary>,
    /// 最终项目概览
    pub overview: String,
    pub stats: RunStats,
}

/// 文档生成配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocGenConfig {
    /// 支持的文件扩展名（不含点）
    #[serde(default = "default_supported_extensions")]
    pub supported_extensions: Vec<String>,

    /// 忽略的路径片段（支持 glob）
    #[serde(default = "default_ignore_patterns")]
    pub ignore_patterns: Vec<String>,

    /// 单批次 token 上限
    #[serde(default = "default_max_tokens")]
    pub max_tokens: usize,

    /// token 估算：每个 token 对应的字符数
    #[serde(default = "default_chars_per_token")]
    pub chars_per_token: usize,

    /// 总结模式
    #[serde(default)]
    pub mode: SummaryMode,

    /// 是否启用总结缓存
    #[serde(default = "default_cache_enabled")]
    pub cache_enabled: bool,

    /// 缓存目录
    #[serde(default = "default_cache_dir")]
    pub cache_dir: PathBuf,

    /// 同时进行的批次数（None 表示全部同时启动）
    #[serde(default)]
    pub concurrency: Option<usize>,

    /// 报告文件名
    #[serde(default = "default_report_name")]
    pub report_name: String,

    /// 概览文件名
    #[serde(default = "default_overview_name")]
    pub overview_name: String,
}

fn default_supported_extensions() -> Vec<String> {
    ["py", "js", "ts", "java", "html", "css"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_ignore_patterns() -> Vec<String> {
    [
        "node_modules",
        "venv",
        ".venv",
        "__pycache__",
        ".git",
        "target",
        "dist",
        "build",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_max_tokens() -> usize {
    10_000
}

fn default_chars_per_token() -> usize {
    4
}

fn default_cache_enabled() -> bool {
    true
}

fn default_cache_dir() -> PathBuf {
    PathBuf::from(".devsage_cache")
}

fn default_report_name() -> String {
    "DOCUMENTATION.md".to_string()
}

fn default_overview_name() -> String {
    "OVERVIEW.md".to_string()
}

impl Default for DocGenConfig {
    fn default() -> Self {
        Self {
            supported_extensions: default_supported_extensions(),
            ignore_patterns: default_ignore_patterns(),
            max_tokens: default_max_tokens(),
            chars_per_token: default_chars_per_token(),
            mode: SummaryMode::default(),
            cache_enabled: default_cache_enabled(),
            cache_dir: default_cache_dir(),
            concurrency: None,
            report_name: default_report_name(),
            overview_name: default_overview_name(),
        }
    }
}
