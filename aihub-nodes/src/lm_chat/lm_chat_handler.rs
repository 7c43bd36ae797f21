// src/lm_chat/lm_chat_handler.rs

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use tracing::info;

use crate::catalog::{search_models, SEARCH_MODELS_METHOD};
use crate::credentials::{AiHubCredentials, CREDENTIAL_NAME};
use crate::lm_chat::chat_model::AiHubChatModelFactory;
use crate::lm_chat::lm_chat_params::{
    resolve_model_max_tokens, LmChatParams, DEFAULT_MAX_RETRIES, DEFAULT_TEMPERATURE,
    DEFAULT_TIMEOUT_MS,
};
use crate::lm_chat::tracing_callback::{ConnectionDataSink, ConnectionType, ExecutionTracingCallback};
use crate::model::{ChatModelConfig, ChatModelFactory, LlmCallback};
use crate::node_type::{
    ListSearchResult, NodeDescription, NodeError, NodeExecutionContext, NodeOutput, NodeProperty,
    NodeType, SupplyData,
};
use crate::transport::{HttpTransport, ReqwestTransport};

pub const NODE_NAME: &str = "lmChatZeaburAiHub";

/// 语言模型子节点：自身不执行，只为 chain / agent 提供一个配置好的聊天模型。
pub struct LmChatAiHubHandler {
    transport: Arc<dyn HttpTransport>,
    factory: Arc<dyn ChatModelFactory>,
    sink: Option<Arc<dyn ConnectionDataSink>>,
}

impl LmChatAiHubHandler {
    pub fn new() -> Self {
        let transport: Arc<dyn HttpTransport> = Arc::new(ReqwestTransport::new());
        let factory = Arc::new(AiHubChatModelFactory::new(transport.clone()));
        Self::with_parts(transport, factory)
    }

    pub fn with_parts(transport: Arc<dyn HttpTransport>, factory: Arc<dyn ChatModelFactory>) -> Self {
        Self {
            transport,
            factory,
            sink: None,
        }
    }

    /// 设置后，每个提供出去的模型都会把调用记录到这个 sink
    pub fn with_data_sink(mut self, sink: Arc<dyn ConnectionDataSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn build_config(ctx: &NodeExecutionContext) -> Result<ChatModelConfig, NodeError> {
        let credentials = AiHubCredentials::from_value(&ctx.credentials)?;
        let params: LmChatParams = serde_json::from_value(ctx.parameters.clone())
            .map_err(|e| NodeError::InvalidConfig(format!("Parameter parsing error: {e}")))?;
        let options = &params.options;
        options.validate()?;

        Ok(ChatModelConfig {
            model: params.model.model_name(),
            base_url: credentials.base_url().to_string(),
            api_key: credentials.api_key,
            temperature: options.temperature.unwrap_or(DEFAULT_TEMPERATURE),
            max_tokens: resolve_model_max_tokens(options.max_tokens)?,
            top_p: options.top_p,
            frequency_penalty: options.frequency_penalty,
            presence_penalty: options.presence_penalty,
            timeout: Duration::from_millis(options.timeout.unwrap_or(DEFAULT_TIMEOUT_MS)),
            max_retries: options.max_retries.unwrap_or(DEFAULT_MAX_RETRIES),
            use_responses_api: false,
        })
    }
}

impl Default for LmChatAiHubHandler {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NodeType for LmChatAiHubHandler {
    fn name(&self) -> &str {
        NODE_NAME
    }

    fn display_name(&self) -> &str {
        "Zeabur AI Hub Chat Model"
    }

    fn description(&self) -> Option<NodeDescription> {
        Some(NodeDescription {
            name: NODE_NAME.to_string(),
            display_name: self.display_name().to_string(),
            description: "Chat with AI models via Zeabur AI Hub".to_string(),
            credentials: vec![CREDENTIAL_NAME.to_string()],
            outputs: vec![ConnectionType::AiLanguageModel.as_str().to_string()],
            properties: vec![
                NodeProperty::new("model", "Model", "resourceLocator")
                    .required()
                    .with_default(json!({"mode": "list", "value": ""}))
                    .with_description("The model to use for generating completions")
                    .with_search_list_method(SEARCH_MODELS_METHOD),
                NodeProperty::new("options", "Options", "collection")
                    .with_default(json!({}))
                    .with_description("Additional options to configure the model"),
            ],
        })
    }

    async fn execute(&self, _ctx: &NodeExecutionContext) -> Result<NodeOutput, NodeError> {
        Err(NodeError::InvalidConfig(format!(
            "'{}' must be connected to an AI chain or an AI agent",
            self.display_name()
        )))
    }

    async fn supply_data(&self, ctx: &NodeExecutionContext) -> Result<SupplyData, NodeError> {
        let config = Self::build_config(ctx)?;
        info!("Supplying chat model '{}' from {}", config.model, config.base_url);

        let callbacks: Vec<Arc<dyn LlmCallback>> = match &self.sink {
            Some(sink) => vec![Arc::new(ExecutionTracingCallback::new(sink.clone()))],
            None => Vec::new(),
        };
        let model = self.factory.make_chat_model(config, callbacks)?;
        Ok(SupplyData { response: model })
    }

    async fn search_list(
        &self,
        method: &str,
        ctx: &NodeExecutionContext,
        filter: Option<&str>,
    ) -> Result<ListSearchResult, NodeError> {
        if method != SEARCH_MODELS_METHOD {
            return Err(NodeError::InvalidConfig(format!("Unknown list search method '{method}'")));
        }
        let credentials = AiHubCredentials::from_value(&ctx.credentials)?;
        Ok(search_models(self.transport.as_ref(), &credentials, filter).await?)
    }
}
