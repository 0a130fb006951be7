//! 批次打包
//!
//! 单趟贪心：依次追加文件，下一个文件会让累计估算超过上限时开启新批次。
//! 文件是最小单位，单个超限文件独占一个批次。

use tracing::debug;

use super::tokens::TokenEstimator;
use super::types::{Batch, SourceFile};

/// 批次打包器
pub struct BatchPacker {
    ceiling: usize,
    estimator: TokenEstimator,
}

impl BatchPacker {
    pub fn new(ceiling: usize, estimator: TokenEstimator) -> Self {
        Self { ceiling, estimator }
    }

    /// 按输入顺序把文件划分为若干批次
    pub fn pack(&self, files: Vec<SourceFile>) -> Vec<Batch> {
        let mut batches = Vec::new();
        let mut current = Batch::default();

        for file in files {
            let tokens = self.estimator.estimate(&file.submission_text());

            if !current.is_empty() && current.token_count + tokens > self.ceiling {
                batches.push(std::mem::take(&mut current));
            }
            if tokens > self.ceiling {
                debug!(
                    "File {} alone exceeds the token ceiling ({} > {})",
                    file.relative_path, tokens, self.ceiling
                );
            }
            current.push(file, tokens);
        }

        if !current.is_empty() {
            batches.push(current);
        }

        batches
    }
}
