//! node_type.rs
//!
//! 定义所有节点共同遵循的核心接口(`NodeType`)，以及执行过程中使用的上下文、输出、错误类型。

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::error::HubError;
use crate::model::ChatModel;

/// 节点执行时的上下文信息：
/// - `parameters`: JSON 格式的用户配置 (从前端或脚本注入)；
/// - `input_data`: 上游节点产生的数据，可为Null或任意JSON；
/// - `credentials`: 节点声明的凭据，由宿主解密后注入；
/// - `continue_on_fail`: 单个 item 失败时是否继续处理剩余 item。
#[derive(Debug, Default)]
pub struct NodeExecutionContext {
    pub parameters: Value,
    pub input_data: Value,
    pub credentials: Value,
    pub continue_on_fail: bool,
}

impl NodeExecutionContext {
    pub fn new(parameters: Value, credentials: Value) -> Self {
        Self {
            parameters,
            input_data: Value::Null,
            credentials,
            continue_on_fail: false,
        }
    }

    pub fn with_input_data(mut self, input_data: Value) -> Self {
        self.input_data = input_data;
        self
    }

    pub fn continue_on_fail(mut self) -> Self {
        self.continue_on_fail = true;
        self
    }

    /// 把 `input_data` 展开为 item 列表：数组按元素展开（空数组没有 item），
    /// 未提供输入时视为单个空 item，其他值视为单个 item。
    pub fn items(&self) -> Vec<Value> {
        match &self.input_data {
            Value::Array(items) => items.clone(),
            other => vec![other.clone()],
        }
    }
}

/// 节点执行返回值：`data`字段中承载核心输出数据，
/// 下游节点可对其进行二次解析或使用。
#[derive(Debug)]
pub struct NodeOutput {
    pub data: Value,
}

/// 节点执行过程中可能发生的错误类型：
/// - `InvalidConfig`: 参数不合法或缺失；
/// - `ExecutionFailed`: 运行时故障 (网络、IO等)。
#[derive(Error, Debug)]
pub enum NodeError {
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Execution failed: {0}")]
    ExecutionFailed(String),
}

impl From<HubError> for NodeError {
    fn from(err: HubError) -> Self {
        NodeError::ExecutionFailed(err.to_string())
    }
}

/// 描述一个节点在UI上的元数据，如属性、显示名称等。
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeDescription {
    pub name: String,
    pub display_name: String,
    pub description: String,
    /// 节点需要的凭据名称，例如 "zeaburAIHubApi"
    pub credentials: Vec<String>,
    /// 输出连接类型，普通节点为 "main"
    pub outputs: Vec<String>,
    pub properties: Vec<NodeProperty>,
}

/// 表示单个可配置属性的信息，如 "model", "content" 等。
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeProperty {
    pub name: String,
    pub display_name: String,
    #[serde(rename = "type")]
    pub type_: String,
    pub required: bool,
    pub default: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// resourceLocator 类型属性在列表模式下调用的搜索方法
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_list_method: Option<String>,
}

impl NodeProperty {
    pub fn new(name: &str, display_name: &str, type_: &str) -> Self {
        Self {
            name: name.to_string(),
            display_name: display_name.to_string(),
            type_: type_.to_string(),
            required: false,
            default: Value::Null,
            description: None,
            search_list_method: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_default(mut self, default: Value) -> Self {
        self.default = default;
        self
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    pub fn with_search_list_method(mut self, method: &str) -> Self {
        self.search_list_method = Some(method.to_string());
        self
    }
}

/// 列表搜索的单个条目，`name` 用于显示，`value` 为实际取值。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListSearchItem {
    pub name: String,
    pub value: String,
}

/// 列表搜索结果，供 resourceLocator 的 "From List" 模式渲染。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListSearchResult {
    pub results: Vec<ListSearchItem>,
}

impl ListSearchResult {
    pub fn values(&self) -> Vec<&str> {
        self.results.iter().map(|item| item.value.as_str()).collect()
    }
}

/// 子节点 (例如语言模型节点) 提供给上游编排节点的数据。
pub struct SupplyData {
    pub response: Arc<dyn ChatModel>,
}

/// 所有节点必须实现的核心 Trait：`NodeType`。
#[async_trait]
pub trait NodeType: Send + Sync {
    /// 节点的内在标识 (比如 "zeaburAiHub")，用于注册与检索。
    fn name(&self) -> &str;

    /// UI要显示的节点名称 (比如 "Zeabur AI Hub")。
    fn display_name(&self) -> &str;

    /// 可选：提供节点属性描述，用于动态生成前端配置界面。默认返回 None。
    fn description(&self) -> Option<NodeDescription> {
        None
    }

    /// 异步执行节点逻辑:
    ///  - 解析/验证parameters
    ///  - 实际执行操作 (HTTP, AI等)
    ///  - 返回 NodeOutput 或 NodeError
    async fn execute(&self, ctx: &NodeExecutionContext) -> Result<NodeOutput, NodeError>;

    /// 可选：resourceLocator 列表模式的搜索方法，`method` 对应属性上声明的方法名。
    async fn search_list(
        &self,
        method: &str,
        _ctx: &NodeExecutionContext,
        _filter: Option<&str>,
    ) -> Result<ListSearchResult, NodeError> {
        Err(NodeError::InvalidConfig(format!(
            "Node '{}' has no list search method '{}'",
            self.name(),
            method
        )))
    }

    /// 可选：子节点向编排节点提供数据 (例如一个聊天模型句柄)。
    async fn supply_data(&self, _ctx: &NodeExecutionContext) -> Result<SupplyData, NodeError> {
        Err(NodeError::InvalidConfig(format!(
            "Node '{}' does not supply data",
            self.name()
        )))
    }
}
