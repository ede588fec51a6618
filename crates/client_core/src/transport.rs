//! HTTP access to the indexing/chat backend.

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::{de::DeserializeOwned, Serialize};
use shared::{
    error::ApiErrorBody,
    protocol::{
        ChatRequest, ChatResponse, HealthResponse, IndexRequest, IndexResponse, CHAT_PATH,
        HEALTH_PATH, INDEX_PATH,
    },
};
use tracing::debug;

use crate::error::BackendError;

#[async_trait]
pub trait BackendApi: Send + Sync {
    async fn index(&self, request: IndexRequest) -> Result<IndexResponse, BackendError>;
    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, BackendError>;
    async fn health(&self) -> Result<HealthResponse, BackendError>;
}

pub struct HttpBackend {
    http: Client,
    api_base: String,
}

impl HttpBackend {
    pub fn new(api_base: impl Into<String>) -> Self {
        Self::with_client(Client::new(), api_base)
    }

    pub fn with_client(http: Client, api_base: impl Into<String>) -> Self {
        let api_base = api_base.into().trim_end_matches('/').to_string();
        Self { http, api_base }
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.api_base)
    }

    async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, BackendError>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        let url = self.endpoint(path);
        debug!(%url, "backend: POST");
        let response = self.http.post(url).json(body).send().await?;
        read_json(response).await
    }
}

#[async_trait]
impl BackendApi for HttpBackend {
    async fn index(&self, request: IndexRequest) -> Result<IndexResponse, BackendError> {
        self.post_json(INDEX_PATH, &request).await
    }

    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, BackendError> {
        self.post_json(CHAT_PATH, &request).await
    }

    async fn health(&self) -> Result<HealthResponse, BackendError> {
        let url = self.endpoint(HEALTH_PATH);
        debug!(%url, "backend: GET");
        let response = self.http.get(url).send().await?;
        read_json(response).await
    }
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, BackendError> {
    let status = response.status();
    let body = response.bytes().await?;

    if !status.is_success() {
        let detail = serde_json::from_slice::<ApiErrorBody>(&body)
            .ok()
            .and_then(|body| body.detail_message());
        return Err(BackendError::Rejected {
            status: status.as_u16(),
            detail,
        });
    }

    serde_json::from_slice(&body).map_err(|err| BackendError::Decode(err.to_string()))
}
