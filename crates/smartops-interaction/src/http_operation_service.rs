//! [`OperationService`] over the backend's REST API.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use smartops_core::config::DEFAULT_API_BASE_URL;
use smartops_core::operation::{
    AnalyzeRequest, AnalyzeResponse, ExecutionRequest, ExecutionResponse, OperationLogEntry,
    OperationService,
};
use smartops_core::{Result, SmartOpsError};
use std::time::Duration;

/// HTTP client for `{base}/operations/...`.
#[derive(Debug, Clone)]
pub struct HttpOperationService {
    client: Client,
    base_url: String,
}

impl HttpOperationService {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Builds a client whose requests give up after `timeout`.
    ///
    /// Without a timeout a request that never resolves keeps the console busy
    /// until the connection drops.
    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| SmartOpsError::config(format!("failed to build HTTP client: {err}")))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/operations/{}", self.base_url, path)
    }

    async fn send(&self, request: RequestBuilder, what: &str) -> Result<Response> {
        let response = request
            .send()
            .await
            .map_err(|err| SmartOpsError::transport(format!("{what} request failed: {err}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "failed to read error body".to_string());
            return Err(map_http_error(status, body));
        }
        Ok(response)
    }

    async fn read_json<T: DeserializeOwned>(response: Response, what: &str) -> Result<T> {
        let body = response
            .text()
            .await
            .map_err(|err| SmartOpsError::transport(format!("{what} body unreadable: {err}")))?;
        serde_json::from_str(&body).map_err(|err| {
            SmartOpsError::deserialization(format!("failed to parse {what} response: {err}"))
        })
    }
}

impl Default for HttpOperationService {
    fn default() -> Self {
        Self::new(DEFAULT_API_BASE_URL)
    }
}

#[async_trait]
impl OperationService for HttpOperationService {
    async fn analyze(&self, request: &AnalyzeRequest) -> Result<AnalyzeResponse> {
        tracing::debug!(
            history = request.history.len(),
            "POST {}",
            self.url("analyze")
        );
        let response = self
            .send(self.client.post(self.url("analyze")).json(request), "analyze")
            .await?;
        Self::read_json(response, "analyze").await
    }

    async fn execute_confirmed(&self, request: &ExecutionRequest) -> Result<ExecutionResponse> {
        tracing::debug!(intent = %request.intent, "POST {}", self.url("execute-confirmed"));
        let response = self
            .send(
                self.client.post(self.url("execute-confirmed")).json(request),
                "execute",
            )
            .await?;
        let body = response
            .text()
            .await
            .map_err(|err| SmartOpsError::transport(format!("execute body unreadable: {err}")))?;
        Ok(ExecutionResponse::from_body(&body))
    }

    async fn history(&self) -> Result<Vec<OperationLogEntry>> {
        let response = self
            .send(self.client.get(self.url("history")), "history")
            .await?;
        Self::read_json(response, "history").await
    }

    async fn delete(&self, id: i64) -> Result<()> {
        self.send(self.client.delete(self.url(&id.to_string())), "delete")
            .await?;
        Ok(())
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    detail: serde_json::Value,
}

/// FastAPI-style errors carry `{"detail": ...}`; anything else is kept verbatim.
fn map_http_error(status: StatusCode, body: String) -> SmartOpsError {
    let detail = match serde_json::from_str::<ErrorBody>(&body) {
        Ok(ErrorBody {
            detail: serde_json::Value::String(text),
        }) => text,
        Ok(ErrorBody { detail }) => detail.to_string(),
        Err(_) => body,
    };
    SmartOpsError::http(status.as_u16(), detail)
}
