//! credentials.rs
//!
//! Zeabur AI Hub 凭据：API key + 区域。区域决定所有请求的 base URL。

use std::env;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::HubError;
use crate::node_type::{NodeError, NodeProperty};
use crate::transport::{HttpRequest, HttpTransport};

/// 凭据类型名称，节点通过它声明依赖
pub const CREDENTIAL_NAME: &str = "zeaburAIHubApi";

pub const HND1_BASE_URL: &str = "https://hnd1.aihub.zeabur.ai/v1";
pub const SFO1_BASE_URL: &str = "https://sfo1.aihub.zeabur.ai/v1";

pub const API_KEY_ENV: &str = "ZEABUR_AI_HUB_API_KEY";
pub const REGION_ENV: &str = "ZEABUR_AI_HUB_REGION";

/// AI Hub 部署区域。除 "sfo1" 外的任何取值 (包括缺省、空串、未知值) 都回落到 hnd1。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Region {
    #[default]
    Hnd1,
    Sfo1,
}

impl Region {
    pub fn base_url(self) -> &'static str {
        match self {
            Region::Hnd1 => HND1_BASE_URL,
            Region::Sfo1 => SFO1_BASE_URL,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Region::Hnd1 => "hnd1",
            Region::Sfo1 => "sfo1",
        }
    }
}

impl From<&str> for Region {
    fn from(value: &str) -> Self {
        if value == "sfo1" {
            Region::Sfo1
        } else {
            Region::Hnd1
        }
    }
}

impl From<String> for Region {
    fn from(value: String) -> Self {
        Region::from(value.as_str())
    }
}

impl From<Region> for String {
    fn from(region: Region) -> Self {
        region.as_str().to_string()
    }
}

/// 按区域字符串选择 base URL
pub fn base_url(region: &str) -> &'static str {
    Region::from(region).base_url()
}

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiHubCredentials {
    pub api_key: String,
    #[serde(default, deserialize_with = "deserialize_region")]
    pub region: Region,
}

// region 为 null 时同样回落到默认区域
fn deserialize_region<'de, D>(deserializer: D) -> Result<Region, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(value.map(Region::from).unwrap_or_default())
}

impl std::fmt::Debug for AiHubCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AiHubCredentials")
            .field("api_key", &"***")
            .field("region", &self.region)
            .finish()
    }
}

impl AiHubCredentials {
    pub fn new(api_key: impl Into<String>, region: Region) -> Self {
        Self {
            api_key: api_key.into(),
            region,
        }
    }

    /// 从执行上下文中的凭据 JSON 解析
    pub fn from_value(value: &Value) -> Result<Self, NodeError> {
        let creds: AiHubCredentials = serde_json::from_value(value.clone()).map_err(|e| {
            NodeError::InvalidConfig(format!("Credentials '{CREDENTIAL_NAME}' parse error: {e}"))
        })?;
        creds.validate()?;
        Ok(creds)
    }

    /// 从环境变量读取 (调用方可先执行 `dotenv().ok()` 加载 .env)
    pub fn from_env() -> Result<Self, NodeError> {
        let api_key = env::var(API_KEY_ENV)
            .map_err(|_| NodeError::InvalidConfig(format!("{API_KEY_ENV} is not set")))?;
        let region = env::var(REGION_ENV)
            .map(Region::from)
            .unwrap_or_default();
        let creds = Self::new(api_key, region);
        creds.validate()?;
        Ok(creds)
    }

    pub fn validate(&self) -> Result<(), NodeError> {
        if self.api_key.trim().is_empty() {
            return Err(NodeError::InvalidConfig("AI Hub API key cannot be empty".into()));
        }
        Ok(())
    }

    pub fn base_url(&self) -> &'static str {
        self.region.base_url()
    }

    /// 为发往 AI Hub 的请求附加 `Authorization: Bearer <apiKey>`
    pub fn authenticate(&self, request: HttpRequest) -> HttpRequest {
        request.bearer_auth(&self.api_key)
    }

    /// 执行凭据测试：`GET {baseURL}/models` 返回 2xx 即视为有效
    pub async fn test(&self, transport: &dyn HttpTransport) -> Result<(), HubError> {
        let request = self.authenticate(HttpRequest::get(format!("{}/models", self.base_url())));
        transport.request(request).await?;
        Ok(())
    }

    pub fn to_value(&self) -> Value {
        json!({
            "apiKey": self.api_key,
            "region": self.region.as_str(),
        })
    }
}

/// 凭据类型在 UI 上的定义
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialDescription {
    pub name: String,
    pub display_name: String,
    pub documentation_url: String,
    pub properties: Vec<NodeProperty>,
    /// 可选项取值及显示名称，(value, name)
    pub region_options: Vec<(String, String)>,
    /// 宿主据此为请求注入鉴权头，与 `AiHubCredentials::authenticate` 一致
    pub authenticate: Value,
}

pub fn credential_description() -> CredentialDescription {
    CredentialDescription {
        name: CREDENTIAL_NAME.to_string(),
        display_name: "Zeabur AI Hub API".to_string(),
        documentation_url: "https://zeabur.com/docs/ai-hub".to_string(),
        properties: vec![
            NodeProperty::new("apiKey", "API Key", "password")
                .required()
                .with_default(json!(""))
                .with_description("The API Key generated in Zeabur AI Hub"),
            NodeProperty::new("region", "Region", "options")
                .with_default(json!(Region::Hnd1.as_str()))
                .with_description("The region endpoint for Zeabur AI Hub"),
        ],
        region_options: vec![
            ("hnd1".to_string(), "HND1 - Tokyo, Japan".to_string()),
            ("sfo1".to_string(), "SFO1 - San Francisco, USA".to_string()),
        ],
        authenticate: json!({
            "type": "generic",
            "properties": {
                "headers": {
                    "Authorization": "=Bearer {{$credentials?.apiKey}}"
                }
            }
        }),
    }
}
