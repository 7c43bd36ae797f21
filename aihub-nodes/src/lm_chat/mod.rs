// src/lm_chat/mod.rs

pub mod chat_model;
pub mod lm_chat_handler;
pub mod lm_chat_params;
pub mod tracing_callback;

use crate::registry::NodeRegistry;
use std::sync::Arc;

/// 供 lib.rs 或宿主调用，以注册 AI Hub 聊天模型节点
pub fn register_node(registry: &mut NodeRegistry) {
    registry.register(Arc::new(lm_chat_handler::LmChatAiHubHandler::new()));
}
