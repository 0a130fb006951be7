//! Anthropic Messages API 实现

use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error};

use super::format::ApiFormat;
use super::types::{truncate_body, ChatMessage, ChatOptions, LlmError};

/// Anthropic 请求载荷
#[derive(Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    messages: Vec<&'a ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
}

#[derive(Deserialize, Debug)]
struct AnthropicResponse {
    #[serde(default)]
    content: Vec<AnthropicBlock>,
}

#[derive(Deserialize, Debug)]
struct AnthropicBlock {
    #[serde(rename = "type")]
    block_type: String,
    #[serde(default)]
    text: Option<String>,
}

/// 调用 Anthropic API，拼接所有 text 块
pub async fn complete_anthropic(
    client: &Client,
    api_key: &str,
    base_url: &str,
    messages: &[ChatMessage],
    model: &str,
    options: &ChatOptions,
) -> Result<String, LlmError> {
    let endpoint = ApiFormat::Anthropic.endpoint(base_url);

    // 系统消息单独放在 system 字段
    let system = messages
        .iter()
        .find(|m| m.role == "system")
        .map(|m| m.content.as_str());
    let payload = AnthropicRequest {
        model,
        messages: messages.iter().filter(|m| m.role != "system").collect(),
        system,
        max_tokens: options.max_tokens.unwrap_or(4096),
        temperature: options.temperature,
    };

    let mut request = client
        .post(&endpoint)
        .header("x-api-key", api_key)
        .header("anthropic-version", "2023-06-01")
        .json(&payload);

    if let Some(secs) = options.timeout {
        request = request.timeout(Duration::from_secs(secs));
    }

    debug!("Anthropic API request: endpoint={}, model={}", endpoint, model);

    let response = request.send().await?;
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        error!("Anthropic API error: status={}, body={}", status.as_u16(), truncate_body(&body));
        return Err(LlmError::ApiError {
            status: status.as_u16(),
            message: body,
        });
    }

    parse_anthropic_response(&body)
}

fn parse_anthropic_response(body: &str) -> Result<String, LlmError> {
    let parsed: AnthropicResponse = serde_json::from_str(body)?;
    let text: String = parsed
        .content
        .into_iter()
        .filter(|b| b.block_type == "text")
        .filter_map(|b| b.text)
        .collect();

    if text.trim().is_empty() {
        return Err(LlmError::EmptyResponse("no text blocks returned".to_string()));
    }
    Ok(text.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_anthropic_response() {
        let body = r#"{"content":[{"type":"text","text":"part one, "},{"type":"text","text":"part two"}]}"#;
        assert_eq!(parse_anthropic_response(body).unwrap(), "part one, part two");
    }

    #[test]
    fn test_parse_anthropic_no_text() {
        let body = r#"{"content":[{"type":"tool_use"}]}"#;
        assert!(matches!(
            parse_anthropic_response(body),
            Err(LlmError::EmptyResponse(_))
        ));
    }
}
