//! 通过注册表驱动两个 AI Hub 节点：列表搜索 -> 发送消息 -> 提供聊天模型。

use std::sync::Arc;

use aihub_nodes::aihub::chat::ChatMessage;
use aihub_nodes::credentials::{HND1_BASE_URL, SFO1_BASE_URL};
use aihub_nodes::registry_helper::register_all_nodes_with_transport;
use aihub_nodes::transport::{HttpRequest, HttpTransport, ReqwestTransport};
use aihub_nodes::{HubError, NodeExecutionContext, NodeRegistry};
use async_trait::async_trait;
use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct MockHubTransport {
    server_uri: String,
    inner: ReqwestTransport,
}

#[async_trait]
impl HttpTransport for MockHubTransport {
    async fn request(&self, mut request: HttpRequest) -> Result<Value, HubError> {
        request.url = request
            .url
            .replace(HND1_BASE_URL, &format!("{}/hnd1/v1", self.server_uri))
            .replace(SFO1_BASE_URL, &format!("{}/sfo1/v1", self.server_uri));
        self.inner.request(request).await
    }
}

async fn registry_for(server: &MockServer) -> NodeRegistry {
    let mut registry = NodeRegistry::new();
    let transport = Arc::new(MockHubTransport {
        server_uri: server.uri(),
        inner: ReqwestTransport::new(),
    });
    register_all_nodes_with_transport(&mut registry, transport);
    registry
}

#[tokio::test]
async fn test_search_then_message_then_supply() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/sfo1/v1/models"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "object": "list",
            "data": [
                {"id": "gemini-1.5-flash", "object": "model", "created": 1, "owned_by": "google"},
                {"id": "gpt-4o", "object": "model", "created": 2, "owned_by": "openai"},
                {"id": "zz-custom", "object": "model", "created": 3, "owned_by": "zeabur"},
                {"id": "gpt-4o-mini", "object": "model", "created": 4, "owned_by": "openai"}
            ]
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/sfo1/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "chatcmpl-flow",
            "choices": [{"message": {"role": "assistant", "content": "42"}}]
        })))
        .expect(2)
        .mount(&server)
        .await;

    let registry = registry_for(&server).await;
    let credentials = json!({"apiKey": "sk-flow", "region": "sfo1"});

    // 1) 列表搜索
    let chat_node = registry.get("zeaburAiHub").expect("chat node registered");
    let search_ctx = NodeExecutionContext::new(Value::Null, credentials.clone());
    let models = chat_node.search_list("searchModels", &search_ctx, Some("")).await.unwrap();
    assert_eq!(models.values(), vec!["gpt-4o", "gpt-4o-mini", "gemini-1.5-flash", "zz-custom"]);

    // 2) 用第一个模型发送消息
    let ctx = NodeExecutionContext::new(
        json!({
            "resource": "chat",
            "operation": "message",
            "model": {"mode": "list", "value": models.results[0].value},
            "content": "What is the answer?"
        }),
        credentials.clone(),
    );
    let output = chat_node.execute(&ctx).await.unwrap();
    assert_eq!(output.data[0]["json"]["message"], json!("42"));
    assert_eq!(output.data[0]["json"]["id"], json!("chatcmpl-flow"));

    // 3) 语言模型节点提供模型并调用一次
    let lm_node = registry.get("lmChatZeaburAiHub").expect("lm node registered");
    let lm_ctx = NodeExecutionContext::new(json!({"model": "gpt-4o-mini"}), credentials);
    let supplied = lm_node.supply_data(&lm_ctx).await.unwrap();
    assert_eq!(supplied.response.config().base_url, SFO1_BASE_URL);
    let completion = supplied.response.invoke(&[ChatMessage::user("again")]).await.unwrap();
    assert_eq!(completion.content, "42");
}

#[tokio::test]
async fn test_search_models_filter_scenario() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/hnd1/v1/models"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "object": "list",
            "data": [{"id": "gpt-4o-mini"}, {"id": "gpt-4o"}]
        })))
        .mount(&server)
        .await;

    let registry = registry_for(&server).await;
    let lm_node = registry.get("lmChatZeaburAiHub").unwrap();
    let ctx = NodeExecutionContext::new(Value::Null, json!({"apiKey": "sk-flow", "region": "unknown"}));

    let result = lm_node.search_list("searchModels", &ctx, Some("mini")).await.unwrap();
    assert_eq!(
        serde_json::to_value(&result).unwrap(),
        json!({"results": [{"name": "gpt-4o-mini", "value": "gpt-4o-mini"}]})
    );
}

#[tokio::test]
async fn test_missing_data_field_is_empty_result() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/hnd1/v1/models"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"object": "list"})))
        .mount(&server)
        .await;

    let registry = registry_for(&server).await;
    let chat_node = registry.get("zeaburAiHub").unwrap();
    let ctx = NodeExecutionContext::new(Value::Null, json!({"apiKey": "sk-flow"}));

    let result = chat_node.search_list("searchModels", &ctx, None).await.unwrap();
    assert!(result.results.is_empty());
}
