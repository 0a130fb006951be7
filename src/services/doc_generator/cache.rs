//! 总结缓存
//!
//! 以文件内容的 SHA-256 为键，每个键一个 JSON 文件。
//! 缓存只是优化：任何读写失败都退化为未命中，不会中断管线。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, warn};

/// 缓存条目
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    /// 对应内容的总结
    pub summary: String,
    /// 写入时间
    pub created_at: DateTime<Utc>,
}

/// 计算内容哈希（缓存键只取决于内容，与路径无关）
pub fn content_hash(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// 总结缓存
#[derive(Debug, Clone)]
pub struct SummaryCache {
    dir: PathBuf,
    enabled: bool,
}

impl SummaryCache {
    /// 创建缓存，目录在第一次写入时才创建
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            enabled: true,
        }
    }

    /// 禁用的缓存：查询总是未命中，写入不做任何事
    pub fn disabled() -> Self {
        Self {
            dir: PathBuf::new(),
            enabled: false,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// 查询缓存
    pub async fn lookup(&self, hash: &str) -> Option<String> {
        if !self.enabled {
            return None;
        }

        match self.read_entry(hash).await {
            Ok(Some(entry)) => {
                debug!("Cache hit: {}", hash);
                Some(entry.summary)
            }
            Ok(None) => None,
            Err(e) => {
                warn!("Cache read failed, treating as miss: {}", e);
                None
            }
        }
    }

    /// 写入缓存，返回是否成功；相同键后写覆盖先写
    pub async fn store(&self, hash: &str, summary: &str) -> bool {
        if !self.enabled {
            return false;
        }

        match self.write_entry(hash, summary).await {
            Ok(()) => {
                debug!("Cache stored: {}", hash);
                true
            }
            Err(e) => {
                warn!("Cache write failed: {}", e);
                false
            }
        }
    }

    async fn read_entry(&self, hash: &str) -> Result<Option<CacheEntry>, CacheError> {
        let path = self.entry_path(hash)?;

        let content = match fs::read_to_string(&path).await {
            Ok(c) => c,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(CacheError::IoError(path, e)),
        };

        serde_json::from_str(&content)
            .map(Some)
            .map_err(|e| CacheError::ParseError(path, e.to_string()))
    }

    async fn write_entry(&self, hash: &str, summary: &str) -> Result<(), CacheError> {
        let path = self.entry_path(hash)?;

        fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| CacheError::IoError(self.dir.clone(), e))?;

        let entry = CacheEntry {
            summary: summary.to_string(),
            created_at: Utc::now(),
        };
        let content = serde_json::to_string_pretty(&entry)
            .map_err(|e| CacheError::ParseError(path.clone(), e.to_string()))?;

        // 先写临时文件再重命名，并发写同一个键时不会留下半个文件
        let tmp = self.dir.join(format!("{}.{}.tmp", hash, uuid::Uuid::new_v4()));
        fs::write(&tmp, content)
            .await
            .map_err(|e| CacheError::IoError(tmp.clone(), e))?;

        if let Err(e) = fs::rename(&tmp, &path).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(CacheError::IoError(path, e));
        }

        Ok(())
    }

    fn entry_path(&self, hash: &str) -> Result<PathBuf, CacheError> {
        if hash.is_empty() || !hash.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(CacheError::InvalidKey(hash.to_string()));
        }
        Ok(self.dir.join(format!("{}.json", hash)))
    }
}

/// 缓存错误类型（仅用于日志，不向外传播）
#[derive(Debug, thiserror::Error)]
enum CacheError {
    #[error("IO错误 ({0}): {1}")]
    IoError(PathBuf, #[source] std::io::Error),

    #[error("解析错误 ({0}): {1}")]
    ParseError(PathBuf, String),

    #[error("无效的缓存键: {0}")]
    InvalidKey(String),
}
