//! API 格式检测和端点构建

use serde::{Deserialize, Serialize};

/// API 格式枚举
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApiFormat {
    /// OpenAI Chat Completions API
    OpenAi,
    /// Anthropic Messages API
    Anthropic,
}

impl ApiFormat {
    /// 根据模型名称检测 API 格式
    ///
    /// 规则：模型名包含 "claude" 则使用 Anthropic 格式，否则使用 OpenAI 格式
    pub fn detect(model: &str) -> Self {
        if model.to_lowercase().contains("claude") {
            Self::Anthropic
        } else {
            Self::OpenAi
        }
    }

    /// 构建完整请求端点
    pub fn endpoint(&self, base_url: &str) -> String {
        let url = normalize_base_url(base_url);
        let suffix = match self {
            Self::OpenAi => "/chat/completions",
            Self::Anthropic => "/messages",
        };

        if url.ends_with(suffix) {
            url
        } else if url.ends_with("/v1") {
            format!("{}{}", url, suffix)
        } else {
            format!("{}/v1{}", url, suffix)
        }
    }
}

/// 规范化 base_url：去掉末尾斜杠，合并协议之后的重复斜杠
fn normalize_base_url(base_url: &str) -> String {
    let trimmed = base_url.trim().trim_end_matches('/');

    match trimmed.split_once("://") {
        Some((scheme, rest)) => {
            let mut path = rest.to_string();
            while path.contains("//") {
                path = path.replace("//", "/");
            }
            format!("{}://{}", scheme, path)
        }
        None => trimmed.to_string(),
    }
}
