//! # Domain Errors
//!
//! Typed failures at the boundaries to the external services.
//! Callers above these boundaries turn them into "no answer" sentinels.

use thiserror::Error;

/// Failure while turning a documentation reference into a URL.
///
/// `Clone` because every waiter on a shared in-flight lookup receives the same outcome.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ResolveError {
    #[error("content API request failed: {0}")]
    Network(String),
    #[error("content not found: {0}")]
    NotFound(String),
}

/// Failure while reading the discussion feed.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("feed request failed: {0}")]
    Network(String),
    #[error("feed authentication failed: {0}")]
    Auth(String),
    #[error("unexpected feed payload: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for ResolveError {
    fn from(e: reqwest::Error) -> Self {
        ResolveError::Network(e.to_string())
    }
}

impl From<reqwest::Error> for FeedError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            FeedError::Decode(e.to_string())
        } else {
            FeedError::Network(e.to_string())
        }
    }
}
