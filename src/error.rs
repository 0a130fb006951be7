//! 统一错误处理模块
//!
//! 定义应用级错误类型，各模块的错误通过 `From` 自动转换。

use thiserror::Error;

use crate::llm::LlmError;
use crate::services::doc_generator::{GeneratorError, ProcessorError};

/// 应用错误枚举
#[derive(Error, Debug)]
pub enum AppError {
    /// 配置相关错误
    #[error("配置错误: {0}")]
    Config(String),

    /// LLM 客户端错误
    #[error("LLM 错误: {0}")]
    Llm(#[from] LlmError),

    /// 管线执行错误
    #[error("管线错误: {0}")]
    Pipeline(#[from] ProcessorError),

    /// 报告写入错误
    #[error("报告错误: {0}")]
    Report(#[from] GeneratorError),
}

/// 便捷类型别名
pub type AppResult<T> = Result<T, AppError>;
