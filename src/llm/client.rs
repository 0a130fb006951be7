//! 统一 LLM 客户端

use reqwest::Client;
use std::time::Duration;
use tracing::info;

use super::anthropic::complete_anthropic;
use super::format::ApiFormat;
use super::openai::complete_openai;
use super::types::{ChatMessage, ChatOptions, LlmError};

/// 统一 LLM 客户端
///
/// 支持 OpenAI 和 Anthropic API 格式，根据模型名称自动选择
pub struct LlmClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl LlmClient {
    /// 创建新的 LLM 客户端
    ///
    /// `timeout_secs` 为默认请求超时，单次请求可通过 [`ChatOptions::timeout`] 覆盖
    pub fn new(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        timeout_secs: u64,
    ) -> Result<Self, LlmError> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(LlmError::ConfigError("API Key is required".to_string()));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(30))
            .pool_max_idle_per_host(5)
            .build()
            .map_err(LlmError::HttpError)?;

        Ok(Self {
            client,
            api_key,
            base_url: base_url.into(),
        })
    }

    /// 发送一次请求并返回完整文本（自动检测 API 格式）
    pub async fn complete(
        &self,
        messages: &[ChatMessage],
        model: &str,
        options: &ChatOptions,
    ) -> Result<String, LlmError> {
        let api_format = ApiFormat::detect(model);
        info!("LLM request: model={}, api_format={:?}", model, api_format);

        match api_format {
            ApiFormat::OpenAi => {
                complete_openai(&self.client, &self.api_key, &self.base_url, messages, model, options)
                    .await
            }
            ApiFormat::Anthropic => {
                complete_anthropic(&self.client, &self.api_key, &self.base_url, messages, model, options)
                    .await
            }
        }
    }
}
