//! 默认的聊天模型实现：通过 AI Hub 的 `/chat/completions` 调用，
//! 每次尝试使用配置的超时，可重试错误按指数退避重试 `max_retries` 次。

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::aihub::chat::{create_chat_completion, message_content, ChatCompletionRequest, ChatMessage};
use crate::error::HubError;
use crate::model::{ChatCompletion, ChatModel, ChatModelConfig, ChatModelFactory, LlmCallback};
use crate::node_type::NodeError;
use crate::transport::HttpTransport;

const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(500);
const MAX_RETRY_DELAY: Duration = Duration::from_secs(8);

/// 第 `attempt` 次重试前的等待时间：`base * 2^attempt`，封顶 `MAX_RETRY_DELAY`
fn backoff_delay(base: Duration, attempt: u32) -> Duration {
    2u32.checked_pow(attempt)
        .and_then(|factor| base.checked_mul(factor))
        .map_or(MAX_RETRY_DELAY, |delay| delay.min(MAX_RETRY_DELAY))
}

pub struct AiHubChatModel {
    config: ChatModelConfig,
    transport: Arc<dyn HttpTransport>,
    callbacks: Vec<Arc<dyn LlmCallback>>,
    retry_delay: Duration,
}

impl AiHubChatModel {
    pub fn new(
        config: ChatModelConfig,
        transport: Arc<dyn HttpTransport>,
        callbacks: Vec<Arc<dyn LlmCallback>>,
    ) -> Self {
        Self {
            config,
            transport,
            callbacks,
            retry_delay: DEFAULT_RETRY_DELAY,
        }
    }

    pub fn with_retry_delay(mut self, retry_delay: Duration) -> Self {
        self.retry_delay = retry_delay;
        self
    }

    fn build_request(&self, messages: &[ChatMessage]) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: self.config.model.clone(),
            messages: messages.to_vec(),
            temperature: self.config.temperature,
            top_p: self.config.top_p,
            frequency_penalty: self.config.frequency_penalty,
            presence_penalty: self.config.presence_penalty,
            max_tokens: self.config.max_tokens,
        }
    }

    async fn complete_with_retries(
        &self,
        body: &ChatCompletionRequest,
    ) -> Result<ChatCompletion, HubError> {
        let mut attempt = 0;
        loop {
            let result = create_chat_completion(
                self.transport.as_ref(),
                &self.config.base_url,
                &self.config.api_key,
                body,
                Some(self.config.timeout),
            )
            .await;

            match result {
                Ok(raw) => {
                    return Ok(ChatCompletion {
                        content: message_content(&raw),
                        raw,
                    })
                }
                Err(e) if e.is_retryable() && attempt < self.config.max_retries => {
                    let delay = backoff_delay(self.retry_delay, attempt);
                    warn!(
                        "{} attempt {} failed: {}; retrying in {:?}",
                        self.config.model,
                        attempt + 1,
                        e,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[async_trait]
impl ChatModel for AiHubChatModel {
    fn config(&self) -> &ChatModelConfig {
        &self.config
    }

    async fn invoke(&self, messages: &[ChatMessage]) -> Result<ChatCompletion, HubError> {
        let prompt = messages
            .iter()
            .map(|m| format!("{}: {}", m.role, m.content))
            .collect::<Vec<_>>()
            .join("\n");
        let runs: Vec<usize> = self
            .callbacks
            .iter()
            .map(|callback| callback.handle_llm_start(std::slice::from_ref(&prompt)))
            .collect();

        debug!("Invoking {} at {}", self.config.model, self.config.base_url);
        let body = self.build_request(messages);
        let result = self.complete_with_retries(&body).await;

        for (callback, run_index) in self.callbacks.iter().zip(runs) {
            match &result {
                Ok(completion) => callback.handle_llm_end(run_index, &completion.raw),
                Err(e) => callback.handle_llm_error(run_index, e),
            }
        }
        result
    }
}

/// 默认工厂：所有模型共用同一个 transport
pub struct AiHubChatModelFactory {
    transport: Arc<dyn HttpTransport>,
    retry_delay: Duration,
}

impl AiHubChatModelFactory {
    pub fn new(transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            transport,
            retry_delay: DEFAULT_RETRY_DELAY,
        }
    }

    pub fn with_retry_delay(mut self, retry_delay: Duration) -> Self {
        self.retry_delay = retry_delay;
        self
    }
}

impl ChatModelFactory for AiHubChatModelFactory {
    fn make_chat_model(
        &self,
        config: ChatModelConfig,
        callbacks: Vec<Arc<dyn LlmCallback>>,
    ) -> Result<Arc<dyn ChatModel>, NodeError> {
        if config.use_responses_api {
            return Err(NodeError::InvalidConfig(
                "AI Hub does not support the Responses API".into(),
            ));
        }
        let model = AiHubChatModel::new(config, self.transport.clone(), callbacks)
            .with_retry_delay(self.retry_delay);
        Ok(Arc::new(model))
    }
}
