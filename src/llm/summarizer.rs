//! 远程总结接口
//!
//! 管线只依赖 [`Summarizer`]：一次 prompt 进，一段文本出。
//! 生产环境由 [`ModelSummarizer`] 调用真实模型，测试中使用 mockall 生成的 mock。

use async_trait::async_trait;
use std::sync::Arc;

#[cfg(test)]
use mockall::automock;

use super::client::LlmClient;
use super::types::{ChatMessage, ChatOptions, LlmError};

/// 远程总结调用
#[cfg_attr(test, automock)]
#[async_trait]
pub trait Summarizer: Send + Sync {
    /// 提交 prompt 并返回模型生成的文本
    ///
    /// 传输错误与非 2xx 状态必须以 `Err` 返回，不能返回空文本
    async fn summarize(&self, prompt: &str) -> Result<String, LlmError>;
}

/// 绑定到某个模型的总结器
pub struct ModelSummarizer {
    client: Arc<LlmClient>,
    model: String,
    options: ChatOptions,
}

impl ModelSummarizer {
    pub fn new(client: Arc<LlmClient>, model: impl Into<String>, options: ChatOptions) -> Self {
        Self {
            client,
            model: model.into(),
            options,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl Summarizer for ModelSummarizer {
    async fn summarize(&self, prompt: &str) -> Result<String, LlmError> {
        let messages = [ChatMessage::user(prompt)];
        self.client.complete(&messages, &self.model, &self.options).await
    }
}
