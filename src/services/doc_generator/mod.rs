//! 文档生成器模块
//!
//! 把源码目录按 token 上限分批，交给 LLM 总结，再综合为项目概览
//!
//! # 功能
//!
//! - 扫描源码目录，按路径排序收集支持的文件
//! - 提取内容：Python/JS/TS 只保留声明行
//! - 贪心打包：每批估算 token 不超过上限
//! - 并发总结所有批次，按批次序号还原顺序
//! - 逐文件模式：按内容哈希缓存总结，重复运行不再调用模型
//! - 生成 Markdown 报告和项目概览
//!
//! # 使用示例
//!
//! ```ignore
//! use std::sync::Arc;
//! use devsage_rs::llm::{ChatOptions, LlmClient, ModelSummarizer};
//! use devsage_rs::services::doc_generator::{DocGenConfig, DocGenService, ReportWriter};
//!
//! let client = Arc::new(LlmClient::new(api_key, "https://api.openai.com", 120)?);
//! let summarizer = Arc::new(ModelSummarizer::new(client.clone(), "gpt-3.5-turbo", ChatOptions::default()));
//! let synthesizer = Arc::new(ModelSummarizer::new(client, "gpt-4o-mini", ChatOptions::default()));
//!
//! let config = DocGenConfig::default();
//! let service = DocGenService::new(config.clone(), summarizer, synthesizer);
//! let output = service.generate(Path::new("./my_project")).await?;
//!
//! ReportWriter::new("docs".into(), config).save_report(&output).await?;
//! println!("{}", output.overview);
//! ```

mod cache;
pub mod extractor;
mod generator;
pub mod packer;
mod processor;
pub mod prompts;
mod scanner;
mod summarizer;
pub mod tokens;
pub mod types;

pub use generator::{GeneratorError, ReportWriter};
pub use processor::{DocGenService, ProcessorError};
pub use types::{DocGenConfig, SummaryMode};
