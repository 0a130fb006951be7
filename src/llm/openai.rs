//! OpenAI Chat Completions API 实现

use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error};

use super::format::ApiFormat;
use super::types::{truncate_body, ChatMessage, ChatOptions, LlmError};

/// OpenAI 请求载荷
#[derive(Serialize)]
struct OpenAiRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Deserialize, Debug)]
struct OpenAiResponse {
    #[serde(default)]
    choices: Vec<OpenAiChoice>,
}

#[derive(Deserialize, Debug)]
struct OpenAiChoice {
    message: OpenAiMessage,
}

#[derive(Deserialize, Debug)]
struct OpenAiMessage {
    content: Option<String>,
}

/// 调用 OpenAI API，返回第一个 choice 的文本
pub async fn complete_openai(
    client: &Client,
    api_key: &str,
    base_url: &str,
    messages: &[ChatMessage],
    model: &str,
    options: &ChatOptions,
) -> Result<String, LlmError> {
    let endpoint = ApiFormat::OpenAi.endpoint(base_url);
    let payload = OpenAiRequest {
        model,
        messages,
        temperature: options.temperature,
        max_tokens: options.max_tokens,
    };

    let mut request = client
        .post(&endpoint)
        .header("Authorization", format!("Bearer {}", api_key))
        .json(&payload);

    if let Some(secs) = options.timeout {
        request = request.timeout(Duration::from_secs(secs));
    }

    debug!("OpenAI API request: endpoint={}, model={}", endpoint, model);

    let response = request.send().await?;
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        error!("OpenAI API error: status={}, body={}", status.as_u16(), truncate_body(&body));
        return Err(LlmError::ApiError {
            status: status.as_u16(),
            message: body,
        });
    }

    parse_openai_response(&body)
}

fn parse_openai_response(body: &str) -> Result<String, LlmError> {
    let parsed: OpenAiResponse = serde_json::from_str(body)?;
    parsed
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| LlmError::EmptyResponse("no content in choices".to_string()))
}
