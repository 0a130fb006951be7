//! LLM Prompt 模板
//!
//! 定义批次总结、单文件总结和最终综合的 Prompt 模板

/// 批次总结 Prompt
pub const BATCH_SUMMARY_PROMPT: &str = r#"You are analyzing one part of a larger software system.

Previously summarized parts:
{prior_summaries}

Now, summarize this new batch of code files.
- Focus on what this batch contributes to the system.
- Do NOT repeat what was already described.
- Group related files by functionality.
- Emphasize newly introduced roles or logic.

Batch content:
{batch_content}"#;

/// 单文件总结 Prompt
pub const FILE_SUMMARY_PROMPT: &str = r#"You are an AI assistant documenting a codebase. Explain the following file clearly and concisely.

Previously summarized files:
{prior_summaries}

Focus on:
- The overall purpose
- Key functions and classes
- Structure and logic
- Do NOT repeat what was already described

FILE: {file_path}

---

{file_content}"#;

/// 项目综合 Prompt
pub const SYNTHESIS_PROMPT: &str = r#"You are a senior developer writing documentation for a project composed of the following parts.

Below are summaries of each code section. Based on this, write:
- A high-level description of what the entire project does
- An overview of how the main components interact
- Any design patterns, architectural choices, or key libraries
- Keep it concise, clear, and structured like a README overview

{section_summaries}"#;

/// 没有先前上下文时的占位
const NO_PRIOR: &str = "(none)";

fn prior_or_none(prior: &str) -> &str {
    if prior.trim().is_empty() {
        NO_PRIOR
    } else {
        prior
    }
}

/// 单趟渲染模板：只替换模板自身中的 `{name}`，替换进来的值不再参与匹配
fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len() + vars.iter().map(|(_, v)| v.len()).sum::<usize>());
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let tail = &rest[start + 1..];

        let hit = vars.iter().find_map(|(name, value)| {
            tail.strip_prefix(*name)
                .and_then(|t| t.strip_prefix('}'))
                .map(|after| (*value, after))
        });

        match hit {
            Some((value, after)) => {
                out.push_str(value);
                rest = after;
            }
            None => {
                out.push('{');
                rest = tail;
            }
        }
    }

    out.push_str(rest);
    out
}

/// 格式化批次总结 Prompt
///
/// `files` 为 (文件名, 提交文本) 对，每个文件以 `# 文件名` 开头
pub fn format_batch_summary_prompt<'a>(
    prior_summaries: &str,
    files: impl IntoIterator<Item = (&'a str, &'a str)>,
) -> String {
    let batch_content = files
        .into_iter()
        .map(|(name, text)| format!("# {}\n{}", name, text))
        .collect::<Vec<_>>()
        .join("\n\n");

    render(
        BATCH_SUMMARY_PROMPT,
        &[
            ("prior_summaries", prior_or_none(prior_summaries)),
            ("batch_content", &batch_content),
        ],
    )
}

/// 格式化单文件总结 Prompt
pub fn format_file_summary_prompt(prior_summaries: &str, file_path: &str, file_content: &str) -> String {
    render(
        FILE_SUMMARY_PROMPT,
        &[
            ("prior_summaries", prior_or_none(prior_summaries)),
            ("file_path", file_path),
            ("file_content", file_content),
        ],
    )
}

/// 格式化项目综合 Prompt
pub fn format_synthesis_prompt(section_summaries: &str) -> String {
    render(SYNTHESIS_PROMPT, &[("section_summaries", section_summaries)])
}
