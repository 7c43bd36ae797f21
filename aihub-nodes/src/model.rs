//! model.rs
//!
//! 语言模型节点交给编排节点 (chain / agent) 的聊天模型抽象。
//! 节点只负责计算配置，具体的模型客户端由 `ChatModelFactory` 构造。

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::aihub::chat::ChatMessage;
use crate::error::HubError;
use crate::node_type::NodeError;

/// 构造聊天模型所需的全部配置
#[derive(Clone, PartialEq)]
pub struct ChatModelConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub temperature: f64,
    /// None 表示不限制
    pub max_tokens: Option<u32>,
    pub top_p: Option<f64>,
    pub frequency_penalty: Option<f64>,
    pub presence_penalty: Option<f64>,
    pub timeout: Duration,
    pub max_retries: u32,
    /// AI Hub 不支持 Responses API，始终为 false
    pub use_responses_api: bool,
}

impl std::fmt::Debug for ChatModelConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatModelConfig")
            .field("api_key", &"***")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("top_p", &self.top_p)
            .field("frequency_penalty", &self.frequency_penalty)
            .field("presence_penalty", &self.presence_penalty)
            .field("timeout", &self.timeout)
            .field("max_retries", &self.max_retries)
            .field("use_responses_api", &self.use_responses_api)
            .finish()
    }
}

/// 一次调用的结果：assistant 文本 + 原始响应
#[derive(Debug, Clone, PartialEq)]
pub struct ChatCompletion {
    pub content: String,
    pub raw: Value,
}

#[async_trait]
pub trait ChatModel: Send + Sync {
    fn config(&self) -> &ChatModelConfig;

    async fn invoke(&self, messages: &[ChatMessage]) -> Result<ChatCompletion, HubError>;
}

/// 模型调用生命周期回调
///
/// `handle_llm_start` 返回本次运行的序号，调用方在 end/error 时原样带回。
pub trait LlmCallback: Send + Sync {
    fn handle_llm_start(&self, prompts: &[String]) -> usize;
    fn handle_llm_end(&self, run_index: usize, output: &Value);
    fn handle_llm_error(&self, run_index: usize, error: &HubError);
}

pub trait ChatModelFactory: Send + Sync {
    fn make_chat_model(
        &self,
        config: ChatModelConfig,
        callbacks: Vec<Arc<dyn LlmCallback>>,
    ) -> Result<Arc<dyn ChatModel>, NodeError>;
}
