// src/aihub/mod.rs

pub mod aihub_params;
pub mod aihub_handler;
pub mod chat;

use crate::registry::NodeRegistry;
use std::sync::Arc;

/// 供 lib.rs 或宿主调用，以注册 AI Hub chat 节点
pub fn register_node(registry: &mut NodeRegistry) {
    registry.register(Arc::new(aihub_handler::AiHubChatHandler::new()));
}
