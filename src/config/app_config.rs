//! 应用配置管理
//!
//! 加载顺序：JSON 配置文件（可选） → 环境变量 → 命令行参数（由调用方覆盖）

use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::{AppError, AppResult};
use crate::services::doc_generator::DocGenConfig;

/// 默认配置文件名（位于当前工作目录）
pub const DEFAULT_CONFIG_FILE: &str = "devsage.json";

/// 应用配置结构体
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// LLM API 密钥（通常来自环境变量，不写入配置文件）
    #[serde(default, skip_serializing)]
    pub api_key: String,

    /// LLM API 基础 URL
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// 批次/文件总结使用的模型
    #[serde(default = "default_model")]
    pub model: String,

    /// 最终综合使用的模型
    #[serde(default = "default_synthesis_model")]
    pub synthesis_model: String,

    /// 温度参数 (0.0 - 2.0)
    #[serde(default = "default_temperature")]
    pub temperature: f64,

    /// 单次回复的最大 token 数（不设置则由服务端决定）
    #[serde(default)]
    pub max_output_tokens: Option<u32>,

    /// 批次总结请求超时（秒）
    #[serde(default = "default_batch_timeout")]
    pub batch_timeout_secs: u64,

    /// 最终综合请求超时（秒）
    #[serde(default = "default_synthesis_timeout")]
    pub synthesis_timeout_secs: u64,

    /// 文档生成管线配置
    #[serde(default)]
    pub docgen: DocGenConfig,
}

fn default_base_url() -> String {
    "https://api.openai.com".to_string()
}

fn default_model() -> String {
    "gpt-3.5-turbo".to_string()
}

fn default_synthesis_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_temperature() -> f64 {
    0.4
}

fn default_batch_timeout() -> u64 {
    120
}

fn default_synthesis_timeout() -> u64 {
    180
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_base_url(),
            model: default_model(),
            synthesis_model: default_synthesis_model(),
            temperature: default_temperature(),
            max_output_tokens: None,
            batch_timeout_secs: default_batch_timeout(),
            synthesis_timeout_secs: default_synthesis_timeout(),
            docgen: DocGenConfig::default(),
        }
    }
}

impl AppConfig {
    /// 从文件加载配置
    ///
    /// 显式指定的文件必须存在；未指定时尝试默认文件，不存在则使用默认值
    pub fn load(path: Option<&Path>) -> AppResult<Self> {
        let (path, required) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
        };

        let content = match fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) if e.kind() == ErrorKind::NotFound && !required => return Ok(Self::default()),
            Err(e) => {
                return Err(AppError::Config(format!("读取配置文件失败 ({}): {}", path.display(), e)));
            }
        };

        info!("Loaded config from {}", path.display());
        serde_json::from_str(&content)
            .map_err(|e| AppError::Config(format!("解析配置文件失败 ({}): {}", path.display(), e)))
    }

    /// 从进程环境覆盖配置
    pub fn apply_env(&mut self) {
        self.apply_env_with(|key| std::env::var(key).ok());
    }

    /// 使用给定的查找函数覆盖配置，空值忽略
    pub fn apply_env_with<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(key) = get("OPENAI_API_KEY") {
            self.api_key = key;
        }
        if let Some(url) = get("OPENAI_BASE_URL") {
            self.base_url = url;
        }
        if let Some(model) = get("DEVSAGE_MODEL") {
            self.model = model;
        }
        if let Some(model) = get("DEVSAGE_SYNTHESIS_MODEL") {
            self.synthesis_model = model;
        }
    }

    /// 校验配置，在任何工作开始之前调用
    pub fn validate(&self) -> AppResult<()> {
        if self.api_key.trim().is_empty() {
            return Err(AppError::Config("OPENAI_API_KEY not set in environment.".to_string()));
        }
        if self.docgen.max_tokens == 0 {
            return Err(AppError::Config("max_tokens must be a positive integer".to_string()));
        }
        if self.docgen.concurrency == Some(0) {
            return Err(AppError::Config("concurrency must be a positive integer".to_string()));
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(AppError::Config(format!("temperature out of range: {}", self.temperature)));
        }
        Ok(())
    }
}
