//! # Reddit Feed Source
//!
//! `FeedSource` over the Reddit API using application-only OAuth (client credentials).
//! The access token is cached until shortly before it expires; a 401 on the listing
//! drops it so the next poll authenticates again.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

use crate::domain::config::FeedConfig;
use crate::domain::errors::FeedError;
use crate::domain::traits::FeedSource;
use crate::domain::types::FeedItem;
use crate::infrastructure::http::http_client;

const AUTH_HOST: &str = "https://www.reddit.com";
const API_HOST: &str = "https://oauth.reddit.com";
/// Tokens are refreshed this long before Reddit would reject them
const EXPIRY_MARGIN: Duration = Duration::from_secs(60);

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: u64,
}

fn default_expires_in() -> u64 {
    3600
}

#[derive(Debug, Deserialize)]
struct Listing {
    data: ListingData,
}

#[derive(Debug, Deserialize)]
struct ListingData {
    #[serde(default)]
    children: Vec<Child>,
}

#[derive(Debug, Deserialize)]
struct Child {
    data: Submission,
}

#[derive(Debug, Deserialize)]
struct Submission {
    id: String,
    #[serde(default)]
    title: String,
    permalink: String,
    #[serde(default)]
    is_self: bool,
    #[serde(default)]
    selftext: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    author: String,
}

impl From<Submission> for FeedItem {
    fn from(s: Submission) -> Self {
        FeedItem {
            id: s.id,
            title: s.title,
            permalink: s.permalink,
            is_self: s.is_self,
            body: s.selftext,
            url: s.url,
            author: s.author,
        }
    }
}

struct Token {
    value: String,
    expires_at: Instant,
}

pub struct RedditClient {
    http: Client,
    auth_host: String,
    api_host: String,
    client_id: String,
    client_secret: String,
    user_agent: String,
    token: Mutex<Option<Token>>,
}

impl RedditClient {
    pub fn new(config: &FeedConfig, client_id: String, client_secret: String) -> Self {
        Self::with_hosts(config, client_id, client_secret, AUTH_HOST, API_HOST)
    }

    pub fn with_hosts(
        config: &FeedConfig,
        client_id: String,
        client_secret: String,
        auth_host: &str,
        api_host: &str,
    ) -> Self {
        Self {
            http: http_client(),
            auth_host: auth_host.trim_end_matches('/').to_string(),
            api_host: api_host.trim_end_matches('/').to_string(),
            client_id,
            client_secret,
            user_agent: config.user_agent.clone(),
            token: Mutex::new(None),
        }
    }

    async fn access_token(&self) -> Result<String, FeedError> {
        let mut guard = self.token.lock().await;
        if let Some(token) = guard.as_ref()
            && token.expires_at > Instant::now()
        {
            return Ok(token.value.clone());
        }

        tracing::debug!("Requesting Reddit access token");
        let response = self
            .http
            .post(format!("{}/api/v1/access_token", self.auth_host))
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .header("User-Agent", &self.user_agent)
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::Auth(format!("token request returned {}", status)));
        }
        let token: TokenResponse = response.json().await?;
        let lifetime = Duration::from_secs(token.expires_in).saturating_sub(EXPIRY_MARGIN);
        *guard = Some(Token {
            value: token.access_token.clone(),
            expires_at: Instant::now() + lifetime,
        });
        Ok(token.access_token)
    }
}

#[async_trait]
impl FeedSource for RedditClient {
    async fn list_new(&self, subject: &str, limit: usize) -> Result<Vec<FeedItem>, FeedError> {
        let token = self.access_token().await?;
        let response = self
            .http
            .get(format!("{}/r/{}/new", self.api_host, subject))
            .query(&[("limit", limit.to_string()), ("raw_json", "1".to_string())])
            .bearer_auth(token)
            .header("User-Agent", &self.user_agent)
            .send()
            .await?;

        match response.status() {
            StatusCode::OK => {}
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                self.token.lock().await.take();
                return Err(FeedError::Auth(format!(
                    "listing returned {}",
                    response.status()
                )));
            }
            status => return Err(FeedError::Network(format!("listing returned {}", status))),
        }

        let body = response.text().await?;
        let listing: Listing =
            serde_json::from_str(&body).map_err(|e| FeedError::Decode(e.to_string()))?;
        Ok(listing
            .data
            .children
            .into_iter()
            .map(|child| child.data.into())
            .collect())
    }
}
