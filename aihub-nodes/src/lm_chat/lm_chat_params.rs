use serde::Deserialize;

use crate::aihub::aihub_params::{check_range, ResourceLocator, MAX_TOKENS_LIMIT};
use crate::node_type::NodeError;

pub const DEFAULT_TEMPERATURE: f64 = 0.7;
pub const DEFAULT_TIMEOUT_MS: u64 = 60_000;
pub const DEFAULT_MAX_RETRIES: u32 = 2;

/// 聊天模型节点的选项。只有 temperature / timeout / maxRetries 有默认值，
/// 其余采样参数未设置时不会转发给模型。
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatModelOptions {
    #[serde(default)]
    pub temperature: Option<f64>,
    #[serde(default)]
    pub max_tokens: Option<i64>,
    #[serde(default)]
    pub top_p: Option<f64>,
    #[serde(default)]
    pub frequency_penalty: Option<f64>,
    #[serde(default)]
    pub presence_penalty: Option<f64>,
    /// 毫秒
    #[serde(default)]
    pub timeout: Option<u64>,
    #[serde(default)]
    pub max_retries: Option<u32>,
}

/// 聊天模型节点只把 -1 视为不限制，0 会原样转发给模型
pub fn resolve_model_max_tokens(max_tokens: Option<i64>) -> Result<Option<u32>, NodeError> {
    match max_tokens {
        None | Some(-1) => Ok(None),
        Some(n) if (0..=MAX_TOKENS_LIMIT).contains(&n) => Ok(Some(n as u32)),
        Some(n) => Err(NodeError::InvalidConfig(format!(
            "maxTokens must be -1 or between 0 and {MAX_TOKENS_LIMIT}, got {n}"
        ))),
    }
}

impl ChatModelOptions {
    pub fn validate(&self) -> Result<(), NodeError> {
        check_range("temperature", self.temperature, 0.0, 2.0)?;
        check_range("topP", self.top_p, 0.0, 1.0)?;
        check_range("frequencyPenalty", self.frequency_penalty, -2.0, 2.0)?;
        check_range("presencePenalty", self.presence_penalty, -2.0, 2.0)?;
        resolve_model_max_tokens(self.max_tokens)?;
        if self.timeout == Some(0) {
            return Err(NodeError::InvalidConfig("timeout must be greater than 0".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LmChatParams {
    #[serde(default)]
    pub model: ResourceLocator,

    #[serde(default)]
    pub options: ChatModelOptions,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_options() {
        let params: LmChatParams = serde_json::from_value(json!({
            "model": {"mode": "id", "value": "gpt-4o"},
            "options": {"timeout": 1000, "maxRetries": 0, "maxTokens": -1}
        }))
        .unwrap();
        assert_eq!(params.model.model_name(), "gpt-4o");
        assert_eq!(params.options.timeout, Some(1000));
        assert_eq!(params.options.max_retries, Some(0));
        assert!(params.options.validate().is_ok());
    }

    #[test]
    fn test_model_max_tokens_sentinel() {
        assert_eq!(resolve_model_max_tokens(None).unwrap(), None);
        assert_eq!(resolve_model_max_tokens(Some(-1)).unwrap(), None);
        assert_eq!(resolve_model_max_tokens(Some(0)).unwrap(), Some(0));
        assert_eq!(resolve_model_max_tokens(Some(128_000)).unwrap(), Some(128_000));
        assert!(resolve_model_max_tokens(Some(-2)).is_err());
        assert!(resolve_model_max_tokens(Some(128_001)).is_err());
    }

    #[test]
    fn test_zero_timeout_is_invalid() {
        let options = ChatModelOptions { timeout: Some(0), ..Default::default() };
        assert!(matches!(options.validate(), Err(NodeError::InvalidConfig(_))));
    }
}
