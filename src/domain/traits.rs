//! # Domain Traits
//!
//! Abstract interfaces for the collaborators of the core (Chat, Config store, Docs API,
//! Feed source, Command resolvers). Allows for pluggable implementations in the
//! Infrastructure layer and in-memory fakes in tests.

use async_trait::async_trait;
use std::collections::HashMap;

use crate::domain::errors::{FeedError, ResolveError};
use crate::domain::types::{Answer, Card, ContentObject, FeedItem, SearchResults};

/// Abstract interface for a Chat Provider (e.g., Matrix, Console)
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Send a markdown message to the room
    async fn send_message(&self, content: &str) -> Result<String, String>;

    /// Replace the content of a message sent earlier
    async fn edit_message(&self, _message_id: &str, _content: &str) -> Result<(), String> {
        Err("editing is not supported by this chat".to_string())
    }

    /// Send a notification (not tracked)
    async fn send_notification(&self, content: &str) -> Result<(), String> {
        self.send_message(content).await.map(|_| ())
    }

    /// Send an embed-like card
    async fn send_card(&self, card: &Card) -> Result<String, String> {
        self.send_message(&card.to_markdown()).await
    }

    /// Set typing status
    async fn typing(&self, _active: bool) -> Result<(), String> {
        Ok(())
    }

    /// Get the current room ID
    fn room_id(&self) -> String;
}

/// Flat key/value configuration store that survives restarts.
#[async_trait]
pub trait ConfigStore: Send + Sync {
    async fn get(&self, key: &str) -> Option<String>;

    async fn set(&self, key: &str, value: &str) -> anyhow::Result<()>;

    async fn has(&self, key: &str) -> bool {
        self.get(key).await.is_some()
    }
}

/// Documentation content API.
#[async_trait]
pub trait ContentApi: Send + Sync {
    /// Look a page up by its opaque id
    async fn lookup(&self, id: &str) -> Result<ContentObject, ResolveError>;

    async fn search(&self, query: &str) -> Result<SearchResults, ResolveError>;

    async fn ask(&self, question: &str) -> Result<Answer, ResolveError>;
}

/// Discussion feed, newest item first.
#[async_trait]
pub trait FeedSource: Send + Sync {
    async fn list_new(&self, subject: &str, limit: usize) -> Result<Vec<FeedItem>, FeedError>;
}

/// Remote source of curated command replies.
#[async_trait]
pub trait CommandSource: Send + Sync {
    async fn fetch_commands(&self) -> anyhow::Result<HashMap<String, String>>;
}

/// Outcome of offering a command to a resolver.
#[derive(Debug)]
pub enum Claim {
    /// Not this resolver's command
    Declined,
    Handled,
    /// Claimed, but the handler failed. The match is still final.
    Failed(anyhow::Error),
}

/// A parsed command invocation: lower-cased name plus the raw argument string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Invocation {
    pub name: String,
    pub args: String,
    pub sender: String,
    /// Root event of the thread the command was sent in
    pub thread: Option<String>,
}

/// Anything able to claim and handle a named command.
#[async_trait]
pub trait CommandResolver: Send + Sync {
    fn name(&self) -> &'static str;

    async fn try_handle(&self, invocation: &Invocation, chat: &dyn ChatProvider) -> Claim;

    /// Command names this resolver currently owns (for help listings)
    async fn command_names(&self) -> Vec<String>;
}
