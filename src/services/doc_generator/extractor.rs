//! 内容提取
//!
//! 对结构化源码只保留声明行（函数、类、类型），其余类型原样返回。

use once_cell::sync::Lazy;
use regex::Regex;
use std::borrow::Cow;

use super::types::FileKind;

// 预编译正则表达式
static RE_PY_DECL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*(?:async\s+)?(?:def|class)\s+\w+").unwrap());

static RE_JS_DECL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^\s*(?:export\s+)?(?:default\s+)?(?:(?:async\s+)?function\*?\s+\w+|(?:abstract\s+)?class\s+\w+|interface\s+\w+|type\s+\w+\s*=)",
    )
    .unwrap()
});

static RE_JS_ARROW: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(?:export\s+)?(?:const|let|var)\s+\w+\s*=\s*(?:async\s+)?(?:\([^)]*\)|\w+)\s*=>").unwrap()
});

/// 返回要提交总结的文本
pub fn extract_content(kind: FileKind, text: &str) -> Cow<'_, str> {
    match kind {
        FileKind::Python => Cow::Owned(keep_lines(text, |line| RE_PY_DECL.is_match(line))),
        FileKind::JavaScript | FileKind::TypeScript => Cow::Owned(keep_lines(text, |line| {
            RE_JS_DECL.is_match(line) || RE_JS_ARROW.is_match(line)
        })),
        _ => Cow::Borrowed(text),
    }
}

fn keep_lines(text: &str, keep: impl Fn(&str) -> bool) -> String {
    text.lines().filter(|line| keep(line)).collect::<Vec<_>>().join("\n")
}
