// src/aihub/chat.rs

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::HubError;
use crate::transport::{HttpRequest, HttpTransport};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: "system".into(), content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: "user".into(), content: content.into() }
    }
}

/// OpenAI 兼容的 `/chat/completions` 请求体，未设置的采样参数不会序列化。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frequency_penalty: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub presence_penalty: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

pub fn completions_url(base_url: &str) -> String {
    format!("{base_url}/chat/completions")
}

/// 发起一次 chat completion 请求，返回原始响应 JSON
pub async fn create_chat_completion(
    transport: &dyn HttpTransport,
    base_url: &str,
    api_key: &str,
    body: &ChatCompletionRequest,
    timeout: Option<Duration>,
) -> Result<Value, HubError> {
    let body = serde_json::to_value(body).map_err(|e| HubError::Encode(e.to_string()))?;
    let mut request = HttpRequest::post(completions_url(base_url))
        .bearer_auth(api_key)
        .header("Content-Type", "application/json")
        .json(body);
    if let Some(timeout) = timeout {
        request = request.timeout(timeout);
    }

    transport.request(request).await
}

/// 提取 `choices[0].message.content`，缺失时返回空串
pub fn message_content(response: &Value) -> String {
    response["choices"][0]["message"]["content"]
        .as_str()
        .unwrap_or_default()
        .to_string()
}
