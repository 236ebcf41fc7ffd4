//! # Command Registry Client
//!
//! Fetches the curated `{name: reply}` table from the command registry.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::collections::HashMap;

use crate::domain::traits::CommandSource;
use crate::infrastructure::http::http_client;

pub struct RegistryClient {
    http: Client,
    url: String,
}

impl RegistryClient {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            http: http_client(),
            url: url.into(),
        }
    }
}

#[async_trait]
impl CommandSource for RegistryClient {
    async fn fetch_commands(&self) -> Result<HashMap<String, String>> {
        tracing::debug!("Fetching registry commands from {}", self.url);
        self.http
            .get(&self.url)
            .send()
            .await
            .context("Registry request failed")?
            .error_for_status()
            .context("Registry returned an error status")?
            .json()
            .await
            .context("Registry payload is not a name/reply map")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fetch_commands() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/commands.json")
            .with_status(200)
            .with_body(r#"{ "push": "Use &push", "view": "Use &view" }"#)
            .create_async()
            .await;

        let registry = RegistryClient::new(format!("{}/commands.json", server.url()));
        let commands = registry.fetch_commands().await.unwrap();
        assert_eq!(commands.len(), 2);
        assert_eq!(commands["push"], "Use &push");
    }

    #[tokio::test]
    async fn test_error_status() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/commands.json")
            .with_status(500)
            .create_async()
            .await;

        let registry = RegistryClient::new(format!("{}/commands.json", server.url()));
        assert!(registry.fetch_commands().await.is_err());
    }
}
