//! 把模型调用的输入/输出回报给宿主，宿主据此在 UI 上展示执行状态。

use std::sync::Arc;

use serde_json::{json, Value};
use tracing::trace;

use crate::error::HubError;
use crate::model::LlmCallback;

/// 子节点连接类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectionType {
    AiLanguageModel,
}

impl ConnectionType {
    pub fn as_str(self) -> &'static str {
        match self {
            ConnectionType::AiLanguageModel => "ai_languageModel",
        }
    }
}

/// 宿主提供的执行数据记录能力
pub trait ConnectionDataSink: Send + Sync {
    /// 记录一次输入，返回本次运行的序号
    fn add_input_data(&self, connection: ConnectionType, data: Value) -> usize;

    fn add_output_data(&self, connection: ConnectionType, run_index: usize, data: Value);
}

/// 运行序号由 `handle_llm_start` 返回并由调用方带回，
/// 同一个模型句柄上并发的调用各自记录到自己的运行下。
pub struct ExecutionTracingCallback {
    sink: Arc<dyn ConnectionDataSink>,
    connection: ConnectionType,
}

impl ExecutionTracingCallback {
    pub fn new(sink: Arc<dyn ConnectionDataSink>) -> Self {
        Self {
            sink,
            connection: ConnectionType::AiLanguageModel,
        }
    }
}

impl LlmCallback for ExecutionTracingCallback {
    fn handle_llm_start(&self, prompts: &[String]) -> usize {
        let index = self
            .sink
            .add_input_data(self.connection, json!([[{ "json": { "messages": prompts } }]]));
        trace!("LLM run {} started on {}", index, self.connection.as_str());
        index
    }

    fn handle_llm_end(&self, run_index: usize, output: &Value) {
        self.sink.add_output_data(
            self.connection,
            run_index,
            json!([[{ "json": { "response": output } }]]),
        );
    }

    fn handle_llm_error(&self, run_index: usize, error: &HubError) {
        self.sink.add_output_data(
            self.connection,
            run_index,
            json!([[{ "json": { "error": error.to_string() } }]]),
        );
    }
}
