//! # GitBook Content API
//!
//! `ContentApi` over the GitBook v1 REST API: page lookup, search and the "ask" endpoint.
//! Every request carries the bearer key; any non-200 status is a failure and nothing is
//! retried.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode, Url};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::domain::config::DocsConfig;
use crate::domain::errors::ResolveError;
use crate::domain::traits::ContentApi;
use crate::domain::types::{Answer, ContentObject, SearchResults};
use crate::infrastructure::http::http_client;

#[derive(Debug, Deserialize)]
struct AskResponse {
    answer: Option<Answer>,
}

pub struct GitBookClient {
    http: Client,
    base_url: String,
    space_id: String,
    api_key: String,
}

impl GitBookClient {
    pub fn new(config: &DocsConfig, api_key: String) -> Self {
        let mut base_url = config.api_url.clone();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        Self {
            http: http_client(),
            base_url,
            space_id: config.space_id.clone(),
            api_key,
        }
    }

    /// `<base>spaces/<space>/<segments..>`, each segment percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ResolveError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| ResolveError::Network(format!("invalid api_url: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| ResolveError::Network("api_url cannot be a base".to_string()))?
            .pop_if_empty()
            .push("spaces")
            .push(&self.space_id)
            .extend(segments);
        Ok(url)
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        what: &str,
    ) -> Result<T, ResolveError> {
        let response = request.bearer_auth(&self.api_key).send().await?;
        let status = response.status();
        tracing::debug!(
            "GitBook {} -> {} (ratelimit remaining: {:?})",
            what,
            status,
            response.headers().get("X-Ratelimit-Remaining")
        );
        match status {
            StatusCode::OK => Ok(response.json().await?),
            StatusCode::NOT_FOUND => Err(ResolveError::NotFound(what.to_string())),
            status => Err(ResolveError::Network(format!("HTTP {} for {}", status, what))),
        }
    }
}

#[async_trait]
impl ContentApi for GitBookClient {
    async fn lookup(&self, id: &str) -> Result<ContentObject, ResolveError> {
        let request = self.http.get(self.endpoint(&["content", "page", id])?);
        self.send(request, &format!("page {}", id)).await
    }

    async fn search(&self, query: &str) -> Result<SearchResults, ResolveError> {
        let request = self
            .http
            .get(self.endpoint(&["search"])?)
            .query(&[("query", query)]);
        self.send(request, "search").await
    }

    async fn ask(&self, question: &str) -> Result<Answer, ResolveError> {
        let request = self
            .http
            .post(self.endpoint(&["search", "ask"])?)
            .json(&serde_json::json!({ "query": question }));
        let response: AskResponse = self.send(request, "ask").await?;
        response
            .answer
            .ok_or_else(|| ResolveError::NotFound("answer".to_string()))
    }
}
