//! LLM 模块
//!
//! 提供统一的 LLM 客户端，支持 OpenAI 和 Anthropic API 格式，
//! 以及管线使用的 [`Summarizer`] 抽象。

mod anthropic;
mod client;
mod format;
mod openai;
mod summarizer;
mod types;

pub use client::LlmClient;
#[cfg(test)]
pub use summarizer::MockSummarizer;
pub use summarizer::{ModelSummarizer, Summarizer};
pub use types::*;
