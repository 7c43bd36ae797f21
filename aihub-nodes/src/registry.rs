//! registry.rs
//!
//! 提供一个 `NodeRegistry` 结构，用于维护 (name -> Arc<dyn NodeType>)。
//! 通常在启动时一次性注册所有节点，后续按节点名检索即可。

use std::collections::HashMap;
use std::sync::Arc;
use crate::node_type::{NodeDescription, NodeType};

/// 一个简单的节点注册表，内含 (name -> Arc<dyn NodeType>)。
#[derive(Default)]
pub struct NodeRegistry {
    handlers: HashMap<String, Arc<dyn NodeType>>,
}

impl NodeRegistry {
    /// 创建一个空的注册表
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new()
        }
    }

    /// 注册一个节点，以 `node.name()` 作为映射的 key
    pub fn register(&mut self, node: Arc<dyn NodeType>) {
        self.handlers.insert(node.name().to_owned(), node);
    }

    /// 按名称获取节点实现
    pub fn get(&self, name: &str) -> Option<Arc<dyn NodeType>> {
        self.handlers.get(name).cloned()
    }

    /// 返回目前已注册的节点名称列表 (按名称排序)
    pub fn list_nodes(&self) -> Vec<String> {
        let mut names: Vec<String> = self.handlers.keys().cloned().collect();
        names.sort();
        names
    }

    /// 所有提供了描述的节点的 UI 元数据
    pub fn descriptions(&self) -> Vec<NodeDescription> {
        self.list_nodes()
            .iter()
            .filter_map(|name| self.handlers.get(name).and_then(|node| node.description()))
            .collect()
    }
}
