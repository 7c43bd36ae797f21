// src/aihub/aihub_handler.rs

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::{error, info, warn};

use crate::aihub::aihub_params::{resolve_max_tokens, AiHubChatParams};
use crate::aihub::chat::{create_chat_completion, message_content, ChatCompletionRequest, ChatMessage};
use crate::catalog::{search_models, SEARCH_MODELS_METHOD};
use crate::credentials::{AiHubCredentials, CREDENTIAL_NAME};
use crate::node_type::{
    ListSearchResult, NodeDescription, NodeError, NodeExecutionContext, NodeOutput, NodeProperty,
    NodeType,
};
use crate::transport::{HttpTransport, ReqwestTransport};

pub const NODE_NAME: &str = "zeaburAiHub";

/// AiHubChatHandler 实现 "Message a Model" 操作：
/// 对每个输入 item 调用一次 `/chat/completions`，
/// 输出 assistant 消息 (`message`) 以及完整的原始响应。
pub struct AiHubChatHandler {
    transport: Arc<dyn HttpTransport>,
}

impl AiHubChatHandler {
    pub fn new() -> Self {
        Self::with_transport(Arc::new(ReqwestTransport::new()))
    }

    pub fn with_transport(transport: Arc<dyn HttpTransport>) -> Self {
        Self { transport }
    }

    fn build_request(params: &AiHubChatParams) -> Result<ChatCompletionRequest, NodeError> {
        let options = &params.options;
        Ok(ChatCompletionRequest {
            model: params.model.model_name(),
            messages: vec![ChatMessage::user(params.content.clone())],
            temperature: options.temperature.unwrap_or(0.7),
            top_p: Some(options.top_p.unwrap_or(1.0)),
            frequency_penalty: Some(options.frequency_penalty.unwrap_or(0.0)),
            presence_penalty: Some(options.presence_penalty.unwrap_or(0.0)),
            max_tokens: resolve_max_tokens(options.max_tokens)?,
        })
    }

    async fn message_item(
        &self,
        credentials: &AiHubCredentials,
        body: &ChatCompletionRequest,
    ) -> Result<Value, NodeError> {
        let response = create_chat_completion(
            self.transport.as_ref(),
            credentials.base_url(),
            &credentials.api_key,
            body,
            None,
        )
        .await?;
        let message = message_content(&response);

        // 原始响应字段优先，`message` 只在响应中不存在同名字段时补上
        let mut json = match response {
            Value::Object(map) => map,
            other => {
                let mut map = serde_json::Map::new();
                map.insert("response".into(), other);
                map
            }
        };
        json.entry("message").or_insert(Value::String(message));
        Ok(Value::Object(json))
    }
}

impl Default for AiHubChatHandler {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NodeType for AiHubChatHandler {
    fn name(&self) -> &str {
        NODE_NAME
    }

    fn display_name(&self) -> &str {
        "Zeabur AI Hub"
    }

    fn description(&self) -> Option<NodeDescription> {
        Some(NodeDescription {
            name: NODE_NAME.to_string(),
            display_name: self.display_name().to_string(),
            description: "Consume Zeabur AI Hub API".to_string(),
            credentials: vec![CREDENTIAL_NAME.to_string()],
            outputs: vec!["main".to_string()],
            properties: vec![
                NodeProperty::new("resource", "Resource", "options").with_default(json!("chat")),
                NodeProperty::new("operation", "Operation", "options")
                    .with_default(json!("message"))
                    .with_description("Chat with a model"),
                NodeProperty::new("model", "Model", "resourceLocator")
                    .required()
                    .with_default(json!({"mode": "list", "value": ""}))
                    .with_description("The model to use for generating completions")
                    .with_search_list_method(SEARCH_MODELS_METHOD),
                NodeProperty::new("content", "Message", "string")
                    .required()
                    .with_default(json!(""))
                    .with_description("The message to send to the model"),
                NodeProperty::new("options", "Options", "collection")
                    .with_default(json!({}))
                    .with_description("Additional options to configure the model"),
            ],
        })
    }

    async fn execute(
        &self,
        ctx: &NodeExecutionContext
    ) -> Result<NodeOutput, NodeError> {
        // 1) 解析参数；不支持的 resource/operation 组合直接返回空输出
        let params: AiHubChatParams = serde_json::from_value(ctx.parameters.clone())
            .map_err(|e| NodeError::InvalidConfig(format!("Parameter parsing error: {e}")))?;
        if !params.is_message_operation() {
            warn!(
                "Unsupported resource/operation '{}/{}', nothing to execute",
                params.resource, params.operation
            );
            return Ok(NodeOutput { data: json!([]) });
        }

        let item_count = ctx.items().len();
        let mut return_data = Vec::with_capacity(item_count);

        // 2) 逐个 item 发起请求
        for index in 0..item_count {
            let result = async {
                params.validate()?;
                let credentials = AiHubCredentials::from_value(&ctx.credentials)?;
                let body = Self::build_request(&params)?;
                self.message_item(&credentials, &body).await
            }
            .await;

            match result {
                Ok(json) => return_data.push(json!({
                    "json": json,
                    "pairedItem": { "item": index }
                })),
                Err(e) if ctx.continue_on_fail => {
                    warn!("{} item {} failed, continuing: {}", NODE_NAME, index, e);
                    return_data.push(json!({
                        "json": { "error": e.to_string() },
                        "pairedItem": { "item": index }
                    }));
                }
                Err(e) => {
                    error!("{} item {} failed: {}", NODE_NAME, index, e);
                    return Err(e);
                }
            }
        }

        info!("{} processed {} item(s)", NODE_NAME, return_data.len());
        Ok(NodeOutput { data: Value::Array(return_data) })
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
