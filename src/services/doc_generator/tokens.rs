//! Token 估算
//!
//! 按字符数近似：每 `chars_per_token` 个字符记 1 个 token，向上取整。

/// Token 估算器
#[derive(Debug, Clone, Copy)]
pub struct TokenEstimator {
    chars_per_token: usize,
}

impl TokenEstimator {
    pub fn new(chars_per_token: usize) -> Self {
        Self {
            chars_per_token: chars_per_token.max(1),
        }
    }

    /// 估算文本的 token 数
    pub fn estimate(&self, text: &str) -> usize {
        text.chars().count().div_ceil(self.chars_per_token)
    }
}

impl Default for TokenEstimator {
    fn default() -> Self {
        Self::new(4)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_estimate() {
        let est = TokenEstimator::default();
        assert_eq!(est.estimate(""), 0);
        assert_eq!(est.estimate("abc"), 1);
        assert_eq!(est.estimate("abcd"), 1);
        assert_eq!(est.estimate("abcde"), 2);
        assert_eq!(est.estimate(&"x".repeat(16_000)), 4_000);
    }

    #[test]
    fn test_counts_chars_not_bytes() {
        let est = TokenEstimator::new(1);
        assert_eq!(est.estimate("文档"), 2);
    }

    #[test]
    fn test_concatenation_is_bounded_by_parts() {
        let est = TokenEstimator::default();
        let a = "def load(self):";
        let b = "class Loader:";
        let joined = format!("{}{}", a, b);
        assert!(est.estimate(&joined) <= est.estimate(a) + est.estimate(b));
    }

    #[test]
    fn test_zero_ratio_is_clamped() {
        assert_eq!(TokenEstimator::new(0).estimate("abc"), 3);
    }
}
