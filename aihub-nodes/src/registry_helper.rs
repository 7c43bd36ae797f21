// aihub-nodes/src/registry_helper.rs

use crate::registry::NodeRegistry;
use crate::aihub::aihub_handler::AiHubChatHandler;
use crate::lm_chat::lm_chat_handler::LmChatAiHubHandler;
use crate::transport::{HttpTransport, ReqwestTransport};
use std::sync::Arc;

/// 一次性注册所有 AI Hub 节点，两个节点共用一个 HTTP transport。
pub fn register_all_nodes(registry: &mut NodeRegistry) {
    register_all_nodes_with_transport(registry, Arc::new(ReqwestTransport::new()));
}

/// 与 `register_all_nodes` 相同，但使用调用方提供的 transport
pub fn register_all_nodes_with_transport(registry: &mut NodeRegistry, transport: Arc<dyn HttpTransport>) {
    let factory = Arc::new(crate::lm_chat::chat_model::AiHubChatModelFactory::new(transport.clone()));
    registry.register(Arc::new(AiHubChatHandler::with_transport(transport.clone())));
    registry.register(Arc::new(LmChatAiHubHandler::with_parts(transport, factory)));
}
