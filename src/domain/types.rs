//! # Domain Types
//!
//! Common data structures used across the application logic: feed items, documentation
//! references and payloads, rendered cards, and inbound command messages.

use serde::{Deserialize, Serialize};

/// One submission from the discussion feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedItem {
    pub id: String,
    pub title: String,
    pub permalink: String,
    pub is_self: bool,
    /// Self text for self posts
    #[serde(default)]
    pub body: String,
    /// Link target for link posts
    #[serde(default)]
    pub url: String,
    pub author: String,
}

/// A page reference as returned by the docs answer API.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ContentRef {
    #[serde(rename = "page")]
    pub id: String,
    #[serde(default)]
    pub sections: Vec<String>,
}

impl ContentRef {
    pub fn new(id: impl Into<String>, sections: Vec<String>) -> Self {
        Self {
            id: id.into(),
            sections,
        }
    }

    /// Only a single section candidate narrows the reference down to an anchor.
    pub fn selector(&self) -> &str {
        match self.sections.as_slice() {
            [only] => only,
            _ => "",
        }
    }

    /// Cache address: `<page id>|<selector>`
    pub fn composite_key(&self) -> String {
        format!("{}|{}", self.id, self.selector())
    }
}

/// Page object returned by the content lookup.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContentObject {
    pub path: String,
    #[serde(default)]
    pub document: ContentDocument,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContentDocument {
    #[serde(default)]
    pub nodes: Vec<ContentNode>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContentNode {
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub meta: Option<NodeMeta>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NodeMeta {
    pub id: String,
}

impl ContentObject {
    /// Fragment for a section selector, or an empty string when no anchor applies.
    pub fn anchor_for(&self, selector: &str) -> String {
        if selector.is_empty() || selector.contains("initial") {
            return String::new();
        }
        self.document
            .nodes
            .iter()
            .find(|n| n.key.as_deref() == Some(selector))
            .and_then(|n| n.meta.as_ref())
            .map(|meta| format!("#{}", meta.id))
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchResults {
    #[serde(default)]
    pub items: Vec<SearchItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchItem {
    pub title: String,
    pub path: String,
}

/// Generated answer with the pages it was built from.
#[derive(Debug, Clone, Deserialize)]
pub struct Answer {
    pub text: String,
    #[serde(default)]
    pub pages: Vec<ContentRef>,
}

/// Embed-like message: a title with link, one named field, an optional thumbnail.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Card {
    pub title: String,
    pub url: Option<String>,
    pub field_name: String,
    pub field_value: String,
    pub thumbnail: Option<String>,
}

impl Card {
    pub fn to_markdown(&self) -> String {
        let mut out = match &self.url {
            Some(url) => format!("**[{}]({})**\n", self.title, url),
            None => format!("**{}**\n", self.title),
        };
        out.push_str(&format!("**{}**\n{}", self.field_name, self.field_value));
        if let Some(thumb) = &self.thumbnail {
            out.push_str(&format!("\n{}", thumb));
        }
        out
    }
}

/// A chat message as seen by the command gate.
#[derive(Debug, Clone)]
pub struct InboundMessage {
    pub event_id: String,
    pub sender: String,
    pub channel: String,
    pub body: String,
    /// Root event when the message was posted inside a thread
    pub thread_root: Option<String>,
}
