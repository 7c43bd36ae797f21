//! AI Hub 上游调用的错误类型。
//!
//! `Transport` 与 `Status` 属于传输层失败，`Encode` 表示请求体无法序列化，
//! `Decode` 表示响应体不是预期的 JSON 结构。

use thiserror::Error;

#[derive(Error, Debug)]
pub enum HubError {
    #[error("AI Hub request error: {0}")]
    Transport(String),

    #[error("AI Hub responded with status={status} body={body}")]
    Status { status: u16, body: String },

    #[error("AI Hub request encode error: {0}")]
    Encode(String),

    #[error("AI Hub response decode error: {0}")]
    Decode(String),
}

impl HubError {
    /// 网络错误、429 与 5xx 可以重试，其余 4xx 与编解码错误不重试。
    pub fn is_retryable(&self) -> bool {
        match self {
            HubError::Transport(_) => true,
            HubError::Status { status, .. } => *status == 429 || *status >= 500,
            HubError::Encode(_) | HubError::Decode(_) => false,
        }
    }
}
