//! 测试辅助：把 AI Hub 的区域 URL 改写到 wiremock server 上。

use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;
use wiremock::MockServer;

use crate::credentials::{HND1_BASE_URL, SFO1_BASE_URL};
use crate::error::HubError;
use crate::transport::{HttpRequest, HttpTransport, ReqwestTransport};

/// hnd1 -> `{server}/hnd1/v1`, sfo1 -> `{server}/sfo1/v1`，并记录原始 URL
pub struct RegionRewriteTransport {
    server_uri: String,
    inner: ReqwestTransport,
    pub seen_urls: Mutex<Vec<String>>,
}

impl RegionRewriteTransport {
    pub fn new(server: &MockServer) -> Self {
        Self {
            server_uri: server.uri(),
            inner: ReqwestTransport::new(),
            seen_urls: Mutex::new(Vec::new()),
        }
    }

    pub fn seen_urls(&self) -> Vec<String> {
        self.seen_urls.lock().unwrap().clone()
    }
}

#[async_trait]
impl HttpTransport for RegionRewriteTransport {
    async fn request(&self, mut request: HttpRequest) -> Result<Value, HubError> {
        self.seen_urls.lock().unwrap().push(request.url.clone());
        request.url = request
            .url
            .replace(HND1_BASE_URL, &format!("{}/hnd1/v1", self.server_uri))
            .replace(SFO1_BASE_URL, &format!("{}/sfo1/v1", self.server_uri));
        self.inner.request(request).await
    }
}
