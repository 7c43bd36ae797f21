use serde::Deserialize;
use crate::node_type::NodeError;

/// 未选择模型时使用的默认模型
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// maxTokens 的上限；-1 表示不限制
pub const MAX_TOKENS_LIMIT: i64 = 128_000;

/// model 参数：既可以是从列表选出的 `{ mode, value }`，也可以直接是字符串
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ResourceLocator {
    Id(String),
    Locator {
        #[serde(default)]
        mode: Option<String>,
        #[serde(default)]
        value: String,
    },
}

impl Default for ResourceLocator {
    fn default() -> Self {
        ResourceLocator::Locator { mode: Some("list".into()), value: String::new() }
    }
}

impl ResourceLocator {
    /// 取出模型名，空值时回落到默认模型
    pub fn model_name(&self) -> String {
        let value = match self {
            ResourceLocator::Id(value) => value,
            ResourceLocator::Locator { value, .. } => value,
        };
        if value.is_empty() {
            DEFAULT_MODEL.to_string()
        } else {
            value.clone()
        }
    }
}

/// -1 与 0 表示不限制；其余取值必须在 1..=128000 之间
pub fn resolve_max_tokens(max_tokens: Option<i64>) -> Result<Option<u32>, NodeError> {
    match max_tokens {
        None | Some(-1) | Some(0) => Ok(None),
        Some(n) if (1..=MAX_TOKENS_LIMIT).contains(&n) => Ok(Some(n as u32)),
        Some(n) => Err(NodeError::InvalidConfig(format!(
            "maxTokens must be -1 or between 1 and {MAX_TOKENS_LIMIT}, got {n}"
        ))),
    }
}

pub(crate) fn check_range(name: &str, value: Option<f64>, min: f64, max: f64) -> Result<(), NodeError> {
    match value {
        Some(v) if !(min..=max).contains(&v) => Err(NodeError::InvalidConfig(format!(
            "{name} must be between {min} and {max}, got {v}"
        ))),
        _ => Ok(()),
    }
}

/// "Message a Model" 的采样选项
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatOptions {
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
}

impl ChatOptions {
    pub fn validate(&self) -> Result<(), NodeError> {
        check_range("temperature", self.temperature, 0.0, 2.0)?;
        check_range("topP", self.top_p, 0.0, 1.0)?;
        check_range("frequencyPenalty", self.frequency_penalty, -2.0, 2.0)?;
        check_range("presencePenalty", self.presence_penalty, -2.0, 2.0)?;
        resolve_max_tokens(self.max_tokens)?;
        Ok(())
    }
}

/// AI Hub chat node parameters
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiHubChatParams {
    #[serde(default = "default_resource")]
    pub resource: String,

    #[serde(default = "default_operation")]
    pub operation: String,

    #[serde(default)]
    pub model: ResourceLocator,

    #[serde(default)]
    pub content: String,

    #[serde(default)]
    pub options: ChatOptions,
}

fn default_resource() -> String {
    "chat".to_string()
}

fn default_operation() -> String {
    "message".to_string()
}

impl AiHubChatParams {
    pub fn is_message_operation(&self) -> bool {
        self.resource == "chat" && self.operation == "message"
    }

    /// Validate required parameters
    pub fn validate(&self) -> Result<(), NodeError> {
        if self.content.trim().is_empty() {
            return Err(NodeError::InvalidConfig("Message content cannot be empty".into()));
        }
        self.options.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_resource_locator_forms() {
        let list: ResourceLocator = serde_json::from_value(json!({"mode": "list", "value": "gpt-4o"})).unwrap();
        assert_eq!(list.model_name(), "gpt-4o");

        let bare: ResourceLocator = serde_json::from_value(json!("claude-3-opus")).unwrap();
        assert_eq!(bare.model_name(), "claude-3-opus");

        let empty: ResourceLocator = serde_json::from_value(json!({"mode": "id", "value": ""})).unwrap();
        assert_eq!(empty.model_name(), DEFAULT_MODEL);

        assert_eq!(ResourceLocator::default().model_name(), DEFAULT_MODEL);
    }

    #[test]
    fn test_max_tokens_sentinel() {
        assert_eq!(resolve_max_tokens(None).unwrap(), None);
        assert_eq!(resolve_max_tokens(Some(-1)).unwrap(), None);
        assert_eq!(resolve_max_tokens(Some(0)).unwrap(), None);
        assert_eq!(resolve_max_tokens(Some(256)).unwrap(), Some(256));
        assert_eq!(resolve_max_tokens(Some(128_000)).unwrap(), Some(128_000));
        assert!(resolve_max_tokens(Some(-5)).is_err());
        assert!(resolve_max_tokens(Some(128_001)).is_err());
    }

    #[test]
    fn test_params_defaults() {
        let params: AiHubChatParams = serde_json::from_value(json!({"content": "hi"})).unwrap();
        assert!(params.is_message_operation());
        assert_eq!(params.model.model_name(), DEFAULT_MODEL);
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_params_validation() {
        let params: AiHubChatParams = serde_json::from_value(json!({"content": "   "})).unwrap();
        match params.validate() {
            Err(NodeError::InvalidConfig(msg)) => assert!(msg.contains("cannot be empty")),
            _ => panic!("Expected InvalidConfig"),
        }

        let params: AiHubChatParams = serde_json::from_value(json!({
            "content": "hi",
            "options": {"temperature": 2.5}
        }))
        .unwrap();
        match params.validate() {
            Err(NodeError::InvalidConfig(msg)) => assert!(msg.contains("temperature")),
            _ => panic!("Expected InvalidConfig"),
        }
    }
}
