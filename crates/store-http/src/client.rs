//! Hosted Content Store Client
//!
//! Implements [`DocumentStore`] on top of a query/mutate content API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use scenewright_core::config::StoreConfig;
use scenewright_core::{
    Document, DocumentFields, DocumentId, DocumentStore, DocumentSummary, StoreError, StoreResult,
};

use crate::wire::{self, DocResponse, MutateResponse, QueryResponse, LIST_QUERY};

/// HTTP store errors
#[derive(Debug, thiserror::Error)]
pub enum HttpStoreError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("Invalid response: {0}")]
    InvalidResponse(#[from] serde_json::Error),
    #[error("Missing document in response: {0}")]
    MissingDocument(String),
    #[error("Empty mutation result")]
    EmptyResult,
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl From<HttpStoreError> for StoreError {
    fn from(err: HttpStoreError) -> Self {
        match err {
            HttpStoreError::Network(e) => StoreError::Transport(e.to_string()),
            HttpStoreError::Status { status, body } => StoreError::Rejected {
                status,
                message: body,
            },
            HttpStoreError::InvalidResponse(e) => StoreError::Decode(e.to_string()),
            HttpStoreError::MissingDocument(id) => StoreError::NotFound(DocumentId::from(id)),
            HttpStoreError::EmptyResult => StoreError::Decode("empty mutation result".into()),
            HttpStoreError::InvalidConfig(msg) => StoreError::Transport(msg),
        }
    }
}

/// Document store backed by a hosted content API
pub struct HttpDocumentStore {
    client: Client,
    base_url: String,
    dataset: String,
    document_type: String,
    token: Option<String>,
}

impl HttpDocumentStore {
    /// Build a client from the `[store]` section of the config
    pub fn from_config(config: &StoreConfig) -> Result<Self, HttpStoreError> {
        let base_url = match &config.base_url {
            Some(url) if !url.is_empty() => url.trim_end_matches('/').to_string(),
            _ if config.project_id.is_empty() => {
                return Err(HttpStoreError::InvalidConfig("project_id is empty".into()))
            }
            _ => format!(
                "https://{}.api.sanity.io/v{}",
                config.project_id, config.api_version
            ),
        };

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url,
            dataset: config.dataset.clone(),
            document_type: config.document_type.clone(),
            token: config.token.clone().filter(|t| !t.is_empty()),
        })
    }

    /// Root URL requests are issued against
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, kind: &str) -> String {
        format!("{}/data/{}/{}", self.base_url, kind, self.dataset)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn read<T: DeserializeOwned>(response: Response) -> Result<T, HttpStoreError> {
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(HttpStoreError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(serde_json::from_str(&body)?)
    }

    async fn mutate(&self, body: &Value, return_documents: bool) -> Result<MutateResponse, HttpStoreError> {
        let mut request = self.client.post(self.endpoint("mutate")).json(body);
        if return_documents {
            request = request.query(&[("returnDocuments", "true")]);
        }
        let response = self.authorize(request).send().await?;
        Self::read(response).await
    }

    async fn fetch_list(&self) -> Result<Vec<DocumentSummary>, HttpStoreError> {
        let type_param = serde_json::to_string(&self.document_type)?;
        let request = self
            .client
            .get(self.endpoint("query"))
            .query(&[("query", LIST_QUERY), ("$type", type_param.as_str())]);
        let response: QueryResponse = Self::read(self.authorize(request).send().await?).await?;
        Ok(response.result.into_iter().map(Into::into).collect())
    }

    async fn fetch_document(&self, id: &DocumentId) -> Result<Document, HttpStoreError> {
        let url = format!("{}/{}", self.endpoint("doc"), id);
        let response: DocResponse = Self::read(self.authorize(self.client.get(url)).send().await?).await?;
        response
            .documents
            .into_iter()
            .next()
            .map(Into::into)
            .ok_or_else(|| HttpStoreError::MissingDocument(id.to_string()))
    }

    async fn create(&self, title: &str, content: &str) -> Result<Document, HttpStoreError> {
        let body = wire::create_mutation(&self.document_type, title, content);
        let response = self.mutate(&body, true).await?;
        let result = response
            .results
            .into_iter()
            .next()
            .ok_or(HttpStoreError::EmptyResult)?;
        Ok(match result.document {
            Some(document) => document.into(),
            None => Document::new(result.id, title, content),
        })
    }
}

#[async_trait]
impl DocumentStore for HttpDocumentStore {
    async fn list_summaries(&self) -> StoreResult<Vec<DocumentSummary>> {
        debug!("GET scene list from {}", self.base_url);
        Ok(self.fetch_list().await?)
    }

    async fn get_document(&self, id: &DocumentId) -> StoreResult<Document> {
        debug!("GET document {}", id);
        Ok(self.fetch_document(id).await?)
    }

    async fn create_document(&self, title: &str, content: &str) -> StoreResult<Document> {
        Ok(self.create(title, content).await?)
    }

    async fn patch_document(&self, id: &DocumentId, fields: &DocumentFields) -> StoreResult<()> {
        let body = wire::patch_mutation(id, fields);
        self.mutate(&body, false).await.map_err(|e| {
            warn!("patch {} failed: {}", id, e);
            StoreError::from(e)
        })?;
        Ok(())
    }

    async fn delete_document(&self, id: &DocumentId) -> StoreResult<()> {
        let body = wire::delete_mutation(id);
        self.mutate(&body, false).await?;
        Ok(())
    }
}
