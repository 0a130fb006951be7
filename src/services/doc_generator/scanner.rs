//! 目录扫描器
//!
//! 遍历源码目录，按路径排序收集支持的文件并读取内容

use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, warn};
use walkdir::{DirEntry, WalkDir};

use super::types::{DocGenConfig, SourceFile};

/// 目录扫描器
pub struct DirectoryScanner {
    config: DocGenConfig,
    /// 编译后的忽略模式（glob patterns），逐个路径片段匹配
    ignore_patterns: Vec<glob::Pattern>,
}

impl DirectoryScanner {
    /// 创建新的目录扫描器
    pub fn new(config: DocGenConfig) -> Self {
        let ignore_patterns = config
            .ignore_patterns
            .iter()
            .filter_map(|p| match glob::Pattern::new(p) {
                Ok(pattern) => Some(pattern),
                Err(e) => {
                    warn!("Invalid ignore pattern '{}': {}", p, e);
                    None
                }
            })
            .collect();

        Self {
            config,
            ignore_patterns,
        }
    }

    /// 扫描目录，返回排序后的候选文件路径
    pub fn scan(&self, root_path: &Path) -> Result<Vec<PathBuf>, ScanError> {
        if !root_path.exists() {
            return Err(ScanError::PathNotFound(root_path.to_path_buf()));
        }

        if !root_path.is_dir() {
            return Err(ScanError::NotADirectory(root_path.to_path_buf()));
        }

        info!("Starting directory scan: {}", root_path.display());

        let mut files = Vec::new();
        let walker = WalkDir::new(root_path)
            .sort_by_file_name()
            .into_iter()
            // 根目录本身不参与匹配
            .filter_entry(|e| e.depth() == 0 || !self.should_ignore(e));

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Failed to read directory entry: {}", e);
                    continue;
                }
            };

            if entry.file_type().is_file() && self.is_supported_file(entry.path()) {
                files.push(entry.into_path());
            }
        }

        info!("Scan completed: {} files", files.len());
        Ok(files)
    }

    /// 读取文件内容，无法读取的文件跳过，非 UTF-8 内容按有损方式解码
    pub async fn read_sources(&self, root_path: &Path, paths: Vec<PathBuf>) -> Vec<SourceFile> {
        let mut sources = Vec::with_capacity(paths.len());

        for path in paths {
            match fs::read(&path).await {
                Ok(bytes) => {
                    let content = String::from_utf8_lossy(&bytes).into_owned();
                    let absolute = std::path::absolute(&path).unwrap_or_else(|_| path.clone());
                    sources.push(SourceFile::new(absolute, relative_path(root_path, &path), content));
                }
                Err(e) => {
                    warn!("Skipping unreadable file {}: {}", path.display(), e);
                }
            }
        }

        sources
    }

    /// 检查是否应该忽略该目录项
    fn should_ignore(&self, entry: &DirEntry) -> bool {
        let name = entry.file_name().to_string_lossy();

        if self.ignore_patterns.iter().any(|p| p.matches(&name)) {
            debug!("Ignoring: {}", entry.path().display());
            return true;
        }

        false
    }

    /// 检查是否是支持的文件类型
    fn is_supported_file(&self, path: &Path) -> bool {
        match path.extension() {
            Some(ext) => {
                let ext_str = ext.to_string_lossy().to_lowercase();
                self.config
                    .supported_extensions
                    .iter()
                    .any(|s| s.trim_start_matches('.').eq_ignore_ascii_case(&ext_str))
            }
            None => false,
        }
    }
}

/// 相对路径，统一使用 `/` 分隔
fn relative_path(root_path: &Path, path: &Path) -> String {
    path.strip_prefix(root_path)
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/")
}

/// 扫描错误类型
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error("路径不存在: {0}")]
    PathNotFound(PathBuf),

    #[error("路径不是目录: {0}")]
    NotADirectory(PathBuf),
}
