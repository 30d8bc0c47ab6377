use crate::core::config::Config;
use crate::core::error::{Error, Result};
use crate::search::model::{
    error_detail, parse_collection_message, parse_search_response, CollectionMessage,
    SearchRequest, SnippetResult,
};
use async_trait::async_trait;
use reqwest::{Client, Response, Url};
use std::time::Instant;
use tracing::{debug, info};

/// Anything that can answer a search against a named collection
#[async_trait]
pub trait SearchBackend: Send + Sync + 'static {
    async fn search(&self, collection: &str, request: &SearchRequest)
        -> Result<Vec<SnippetResult>>;
}

/// Build `{base}/collections/{collection}[/{action}]`.
///
/// The collection name is pushed as a single percent-encoded path segment, so
/// names containing `/` or spaces cannot escape their segment.
pub fn collection_url(base: &Url, collection: &str, action: Option<&str>) -> Result<Url> {
    let mut url = base.clone();
    {
        let mut segments = url
            .path_segments_mut()
            .map_err(|_| Error::Config(format!("Base URL cannot have a path: {}", base)))?;
        segments.pop_if_empty().push("collections").push(collection);
        if let Some(action) = action {
            segments.push(action);
        }
    }
    Ok(url)
}

/// Search service reached over HTTP
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: Url,
}

impl HttpBackend {
    /// Create a client for the service configured in `config`
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("codesearch/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
        })
    }

    /// Create an empty collection
    pub async fn create_collection(&self, name: &str) -> Result<CollectionMessage> {
        let url = collection_url(&self.base_url, name, None)?;
        info!(collection = name, "creating collection");
        let response = self.client.post(url).send().await?;
        parse_collection_message(&success_body(response).await?)
    }

    /// Drop a collection and everything indexed in it
    pub async fn delete_collection(&self, name: &str) -> Result<CollectionMessage> {
        let url = collection_url(&self.base_url, name, None)?;
        info!(collection = name, "deleting collection");
        let response = self.client.delete(url).send().await?;
        parse_collection_message(&success_body(response).await?)
    }

    /// Ask the service to index the directory at `path` (a path on the
    /// service's host) into an existing collection
    pub async fn init_collection(&self, name: &str, path: &str) -> Result<CollectionMessage> {
        let url = collection_url(&self.base_url, name, Some("init"))?;
        info!(collection = name, path, "populating collection");
        let response = self
            .client
            .post(url)
            .json(&serde_json::json!({ "path": path }))
            .send()
            .await?;
        parse_collection_message(&success_body(response).await?)
    }
}

#[async_trait]
impl SearchBackend for HttpBackend {
    async fn search(
        &self,
        collection: &str,
        request: &SearchRequest,
    ) -> Result<Vec<SnippetResult>> {
        let url = collection_url(&self.base_url, collection, Some("search"))?;
        let started = Instant::now();
        debug!(%url, query = %request.query, "sending search request");

        let response = self.client.post(url).json(request).send().await?;
        let results = parse_search_response(&success_body(response).await?)?;

        debug!(
            results = results.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "search response received"
        );
        Ok(results)
    }
}

/// Read the body of a response, turning non-2xx statuses into errors
async fn success_body(response: Response) -> Result<String> {
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        return Err(Error::Status {
            status: status.as_u16(),
            detail: error_detail(&body),
        });
    }

    Ok(body)
}
