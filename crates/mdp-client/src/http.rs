//! HTTP implementation of [`MdpClient`] over reqwest.

use std::time::Duration;

use async_trait::async_trait;
use mdp_types::{
    ActionType, ApiErrorBody, CreateFunctionRequest, ExecutionLog, FunctionDefinition, LinkType,
    ObjectType, SearchRequest, SearchResponse, UpdateFunctionRequest,
};
use reqwest::{Method, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;

use crate::{ClientError, MdpClient, Result};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Clone)]
pub struct HttpClient {
    base_url: Url,
    http: reqwest::Client,
}

impl HttpClient {
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self> {
        // Url::join drops the last segment unless the base ends with '/'
        let normalized = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{}/", base_url)
        };
        let base_url =
            Url::parse(&normalized).map_err(|e| ClientError::InvalidUrl(format!("{base_url}: {e}")))?;
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { base_url, http })
    }

    fn url(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| ClientError::InvalidUrl(format!("{path}: {e}")))
    }

    async fn request<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<Response> {
        let url = self.url(path)?;
        tracing::debug!(%method, %url, "mdp request");

        let mut builder = self.http.request(method, url);
        if let Some(body) = body {
            builder = builder.json(body);
        }
        let response = builder.send().await?;
        check_status(response).await
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self.request::<()>(Method::GET, path, None).await?;
        decode(response).await
    }

    async fn send<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let response = self.request(method, path, Some(body)).await?;
        decode(response).await
    }

    async fn delete(&self, path: &str) -> Result<()> {
        self.request::<()>(Method::DELETE, path, None).await?;
        Ok(())
    }
}

/// Map non-2xx responses to [`ClientError::Api`], extracting `detail` when the
/// body is a JSON error object.
async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    let detail = serde_json::from_str::<ApiErrorBody>(&text)
        .ok()
        .and_then(|body| body.message());

    tracing::warn!(status = status.as_u16(), detail = ?detail, "mdp request failed");
    Err(ClientError::Api {
        status: status.as_u16(),
        detail,
    })
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
    let bytes = response.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}

#[async_trait]
impl MdpClient for HttpClient {
    async fn list_functions(&self) -> Result<Vec<FunctionDefinition>> {
        self.get("meta/functions").await
    }

    async fn create_function(&self, req: CreateFunctionRequest) -> Result<FunctionDefinition> {
        self.send(Method::POST, "meta/functions", &req).await
    }

    async fn update_function(
        &self,
        id: &str,
        req: UpdateFunctionRequest,
    ) -> Result<FunctionDefinition> {
        self.send(Method::PUT, &format!("meta/functions/{id}"), &req)
            .await
    }

    async fn delete_function(&self, id: &str) -> Result<()> {
        self.delete(&format!("meta/functions/{id}")).await
    }

    async fn list_object_types(&self) -> Result<Vec<ObjectType>> {
        self.get("meta/object-types").await
    }

    async fn delete_object_type(&self, id: &str) -> Result<()> {
        self.delete(&format!("meta/object-types/{id}")).await
    }

    async fn list_link_types(&self) -> Result<Vec<LinkType>> {
        self.get("meta/link-types").await
    }

    async fn delete_link_type(&self, id: &str) -> Result<()> {
        self.delete(&format!("meta/link-types/{id}")).await
    }

    async fn list_action_types(&self) -> Result<Vec<ActionType>> {
        self.get("meta/action-types").await
    }

    async fn delete_action_type(&self, id: &str) -> Result<()> {
        self.delete(&format!("meta/action-types/{id}")).await
    }

    async fn search(&self, req: SearchRequest) -> Result<SearchResponse> {
        self.send(Method::POST, "search/query", &req).await
    }

    async fn list_execution_logs(&self) -> Result<Vec<ExecutionLog>> {
        self.get("execute/logs").await
    }
}
