//! catalog.rs
//!
//! 模型目录解析：拉取 `GET {baseURL}/models`，按关键字过滤，再按常用模型优先级排序。
//! 两个 AI Hub 节点的 `searchModels` 共用这里的实现。

use std::cmp::Ordering;

use serde::Deserialize;
use tracing::debug;

use crate::credentials::AiHubCredentials;
use crate::error::HubError;
use crate::node_type::{ListSearchItem, ListSearchResult};
use crate::transport::{HttpRequest, HttpTransport};

/// 列表搜索方法名，与 model 属性上声明的一致
pub const SEARCH_MODELS_METHOD: &str = "searchModels";

/// 常用模型，越靠前排序越靠前。只影响顺序，不影响是否出现在结果中。
pub const PRIORITY_MODELS: [&str; 10] = [
    "gpt-4o",
    "gpt-4o-mini",
    "gpt-4-turbo",
    "gpt-4",
    "gpt-3.5-turbo",
    "claude-3-5-sonnet",
    "claude-3-opus",
    "claude-3-haiku",
    "gemini-1.5-pro",
    "gemini-1.5-flash",
];

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ModelDescriptor {
    pub id: String,
    #[serde(default)]
    pub object: String,
    #[serde(default)]
    pub created: i64,
    #[serde(default)]
    pub owned_by: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogResponse {
    #[serde(default)]
    pub object: String,
    /// 缺省或为 null 时视为空目录
    #[serde(default)]
    pub data: Option<Vec<ModelDescriptor>>,
}

impl CatalogResponse {
    pub fn into_models(self) -> Vec<ModelDescriptor> {
        self.data.unwrap_or_default()
    }
}

/// 第一个作为子串出现在 `id` 中的优先级条目的下标
pub fn priority_rank(id: &str) -> Option<usize> {
    PRIORITY_MODELS.iter().position(|m| id.contains(m))
}

/// 有优先级的排在无优先级的前面；都有则比较下标；都没有则按 id 字典序。
pub fn compare_models(a: &ModelDescriptor, b: &ModelDescriptor) -> Ordering {
    match (priority_rank(&a.id), priority_rank(&b.id)) {
        (Some(ra), Some(rb)) => ra.cmp(&rb),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.id.cmp(&b.id),
    }
}

/// 过滤并排序。`filter` 为空时不过滤；匹配不区分大小写。
pub fn rank_models(models: Vec<ModelDescriptor>, filter: Option<&str>) -> Vec<ModelDescriptor> {
    let mut models = match filter {
        Some(f) if !f.is_empty() => {
            let needle = f.to_lowercase();
            models
                .into_iter()
                .filter(|m| m.id.to_lowercase().contains(&needle))
                .collect()
        }
        _ => models,
    };
    // sort_by 是稳定排序，同优先级的模型保持上游顺序
    models.sort_by(compare_models);
    models
}

pub fn to_search_result(models: &[ModelDescriptor]) -> ListSearchResult {
    ListSearchResult {
        results: models
            .iter()
            .map(|m| ListSearchItem {
                name: m.id.clone(),
                value: m.id.clone(),
            })
            .collect(),
    }
}

/// 拉取模型目录。单次请求，不重试，不设置额外超时。
pub async fn fetch_catalog(
    transport: &dyn HttpTransport,
    credentials: &AiHubCredentials,
) -> Result<Vec<ModelDescriptor>, HubError> {
    let request = credentials
        .authenticate(HttpRequest::get(format!("{}/models", credentials.base_url())))
        .header("Accept", "application/json");

    let body = transport.request(request).await?;
    let catalog: CatalogResponse =
        serde_json::from_value(body).map_err(|e| HubError::Decode(e.to_string()))?;
    Ok(catalog.into_models())
}

/// `searchModels` 的实现：拉取、过滤、排序，并转换为列表搜索结果。
pub async fn search_models(
    transport: &dyn HttpTransport,
    credentials: &AiHubCredentials,
    filter: Option<&str>,
) -> Result<ListSearchResult, HubError> {
    let models = fetch_catalog(transport, credentials).await?;
    let total = models.len();
    let ranked = rank_models(models, filter);
    debug!(
        "AI Hub catalog ({}): {} models, {} after filter {:?}",
        credentials.region.as_str(),
        total,
        ranked.len(),
        filter
    );
    Ok(to_search_result(&ranked))
}
