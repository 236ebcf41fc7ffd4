//! # Auto Threads
//!
//! Support channels where every top-level post gets its own thread. The bot answers the
//! post inside a new thread with a title line and the configured welcome text; moderators
//! can later retitle or close the thread, which edits that first message.
//! Thread records live in the config store under `thread:<root event id>`.

use anyhow::{Context, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, LazyLock};

use crate::domain::config::CommandsConfig;
use crate::domain::traits::{ChatProvider, ConfigStore};
use crate::domain::types::InboundMessage;

pub const USER_MENTION: &str = "<USERMENTION>";
const TITLE_FALLBACK_CHARS: usize = 40;

/// Up to 14 leading words, each followed by whitespace
static TITLE_WORDS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:\w+\s){1,14}").expect("valid regex"));

/// Title for a new thread: the first 14 words, else the first 40 characters.
pub fn thread_title(body: &str) -> String {
    match TITLE_WORDS.find(body) {
        Some(m) => m.as_str().trim_end().to_string(),
        None => body.chars().take(TITLE_FALLBACK_CHARS).collect(),
    }
}

pub fn mention(user_id: &str) -> String {
    format!("[{0}](https://matrix.to/#/{0})", user_id)
}

pub fn welcome_text(template: &str, author: &str) -> String {
    template.replace(USER_MENTION, &mention(author))
}

/// A thread the bot opened.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThreadRecord {
    pub title: String,
    pub author: String,
    /// The bot's first message in the thread, edited on retitle and close
    pub header_event: String,
    pub welcome: String,
    #[serde(default)]
    pub closed: bool,
}

impl ThreadRecord {
    pub fn header(&self) -> String {
        let marker = if self.closed { "🔒" } else { "🧵" };
        format!("**{} {}**\n\n{}", marker, self.title, self.welcome)
    }
}

/// Result of a moderator action on a thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThreadChange {
    /// Not a thread this bot opened
    Unknown,
    /// Nothing to do, e.g. closing a closed thread
    Unchanged,
    Updated,
}

pub struct ThreadRegistry {
    store: Arc<dyn ConfigStore>,
}

impl ThreadRegistry {
    pub fn new(store: Arc<dyn ConfigStore>) -> Self {
        Self { store }
    }

    fn key(root: &str) -> String {
        format!("thread:{}", root)
    }

    pub async fn get(&self, root: &str) -> Option<ThreadRecord> {
        let raw = self.store.get(&Self::key(root)).await?;
        match serde_json::from_str(&raw) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!("Ignoring unreadable thread record for {}: {}", root, e);
                None
            }
        }
    }

    pub async fn save(&self, root: &str, record: &ThreadRecord) -> Result<()> {
        let raw = serde_json::to_string(record)?;
        self.store
            .set(&Self::key(root), &raw)
            .await
            .with_context(|| format!("Failed to store thread {}", root))
    }

    pub async fn rename(&self, root: &str, title: &str, chat: &dyn ChatProvider) -> Result<ThreadChange> {
        let Some(mut record) = self.get(root).await else {
            return Ok(ThreadChange::Unknown);
        };
        if record.title == title {
            return Ok(ThreadChange::Unchanged);
        }
        record.title = title.to_string();
        self.update(root, &record, chat).await?;
        Ok(ThreadChange::Updated)
    }

    pub async fn close(&self, root: &str, chat: &dyn ChatProvider) -> Result<ThreadChange> {
        let Some(mut record) = self.get(root).await else {
            return Ok(ThreadChange::Unknown);
        };
        if record.closed {
            return Ok(ThreadChange::Unchanged);
        }
        record.closed = true;
        self.update(root, &record, chat).await?;
        Ok(ThreadChange::Updated)
    }

    async fn update(&self, root: &str, record: &ThreadRecord, chat: &dyn ChatProvider) -> Result<()> {
        self.save(root, record).await?;
        chat.edit_message(&record.header_event, &record.header())
            .await
            .map_err(|e| anyhow::anyhow!("Failed to edit thread header: {}", e))
    }
}

/// Decides which posts open a thread and opens it.
pub struct AutoThreader {
    channels: Vec<String>,
    welcome: Option<String>,
    own_user_id: String,
    bot_accounts: Vec<String>,
    threads: Arc<ThreadRegistry>,
}

impl AutoThreader {
    pub fn new(config: &CommandsConfig, own_user_id: String, threads: Arc<ThreadRegistry>) -> Self {
        Self {
            channels: config.auto_thread_channels.clone(),
            welcome: config.auto_thread_welcome.clone(),
            own_user_id,
            bot_accounts: config.bot_accounts.clone(),
            threads,
        }
    }

    /// Top-level posts by people in an auto-thread channel, when a welcome text is set.
    pub fn should_open(&self, message: &InboundMessage) -> bool {
        self.welcome.is_some()
            && message.thread_root.is_none()
            && message.sender != self.own_user_id
            && !self.bot_accounts.iter().any(|b| b == &message.sender)
            && self.channels.iter().any(|c| c == &message.channel)
    }

    /// Posts the header into `thread` (a chat bound to the new thread) and records it.
    pub async fn open(&self, message: &InboundMessage, thread: &dyn ChatProvider) -> Result<ThreadRecord> {
        let template = self
            .welcome
            .as_deref()
            .context("No welcome text configured for auto threads")?;
        let mut record = ThreadRecord {
            title: thread_title(&message.body),
            author: message.sender.clone(),
            header_event: String::new(),
            welcome: welcome_text(template, &message.sender),
            closed: false,
        };
        record.header_event = thread
            .send_message(&record.header())
            .await
            .map_err(|e| anyhow::anyhow!("Failed to open thread: {}", e))?;
        self.threads.save(&message.event_id, &record).await?;
        tracing::info!(
            "Opened thread '{}' for {} in {}",
            record.title,
            message.sender,
            message.channel
        );
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::state::JsonStateStore;
    use crate::application::testing::RecordingChat;

    async fn registry(dir: &tempfile::TempDir) -> Arc<ThreadRegistry> {
        let store = JsonStateStore::load(dir.path().join("state.json")).await;
        Arc::new(ThreadRegistry::new(Arc::new(store)))
    }

    fn config() -> CommandsConfig {
        CommandsConfig {
            auto_thread_channels: vec!["!support:x".into()],
            auto_thread_welcome: Some("Welcome <USERMENTION>! Describe your setup.".into()),
            bot_accounts: vec!["@otherbot:x".into()],
            ..Default::default()
        }
    }

    fn post(sender: &str, channel: &str, body: &str) -> InboundMessage {
        InboundMessage {
            event_id: "$root".into(),
            sender: sender.into(),
            channel: channel.into(),
            body: body.into(),
            thread_root: None,
        }
    }

    #[test]
    fn test_title_takes_leading_words() {
        assert_eq!(thread_title("My camera is black in OBS"), "My camera is black in");
        let long = "a b c d e f g h i j k l m n o p q";
        assert_eq!(thread_title(long), "a b c d e f g h i j k l m n");
    }

    #[test]
    fn test_title_falls_back_to_characters() {
        assert_eq!(thread_title("help"), "help");
        let url = format!("https://vdo.ninja/?{}", "x".repeat(60));
        assert_eq!(thread_title(&url).chars().count(), 40);
    }

    #[test]
    fn test_welcome_mentions_author() {
        assert_eq!(
            welcome_text("Hi <USERMENTION>!", "@u:x"),
            "Hi [@u:x](https://matrix.to/#/@u:x)!"
        );
    }

    #[tokio::test]
    async fn test_should_open() {
        let dir = tempfile::tempdir().unwrap();
        let threader = AutoThreader::new(&config(), "@ninja:x".into(), registry(&dir).await);

        assert!(threader.should_open(&post("@u:x", "!support:x", "it broke")));
        assert!(!threader.should_open(&post("@u:x", "!general:x", "it broke")));
        assert!(!threader.should_open(&post("@ninja:x", "!support:x", "hi")));
        assert!(!threader.should_open(&post("@otherbot:x", "!support:x", "hi")));

        let mut reply = post("@u:x", "!support:x", "more detail");
        reply.thread_root = Some("$root".into());
        assert!(!threader.should_open(&reply));

        let silent = AutoThreader::new(
            &CommandsConfig {
                auto_thread_welcome: None,
                ..config()
            },
            "@ninja:x".into(),
            registry(&dir).await,
        );
        assert!(!silent.should_open(&post("@u:x", "!support:x", "it broke")));
    }

    #[tokio::test]
    async fn test_open_posts_header_and_records_thread() {
        let dir = tempfile::tempdir().unwrap();
        let threads = registry(&dir).await;
        let threader = AutoThreader::new(&config(), "@ninja:x".into(), threads.clone());
        let chat = RecordingChat::default();

        let record = threader
            .open(&post("@u:x", "!support:x", "Audio is out of sync "), &chat)
            .await
            .unwrap();

        assert_eq!(record.title, "Audio is out of sync");
        assert_eq!(
            chat.messages().await,
            vec!["**🧵 Audio is out of sync**\n\nWelcome [@u:x](https://matrix.to/#/@u:x)! Describe your setup."]
        );
        assert_eq!(threads.get("$root").await, Some(record));
    }

    #[tokio::test]
    async fn test_rename_and_close_edit_header() {
        let dir = tempfile::tempdir().unwrap();
        let threads = registry(&dir).await;
        let threader = AutoThreader::new(&config(), "@ninja:x".into(), threads.clone());
        let chat = RecordingChat::default();
        let record = threader
            .open(&post("@u:x", "!support:x", "no video "), &chat)
            .await
            .unwrap();

        assert_eq!(
            threads.rename("$root", "Black screen on iOS", &chat).await.unwrap(),
            ThreadChange::Updated
        );
        assert_eq!(threads.close("$root", &chat).await.unwrap(), ThreadChange::Updated);
        assert_eq!(threads.close("$root", &chat).await.unwrap(), ThreadChange::Unchanged);
        assert_eq!(
            threads.close("$elsewhere", &chat).await.unwrap(),
            ThreadChange::Unknown
        );

        let edits = chat.edits().await;
        assert_eq!(edits.len(), 2);
        assert!(edits.iter().all(|(id, _)| id == &record.header_event));
        assert!(edits[0].1.starts_with("**🧵 Black screen on iOS**"));
        assert!(edits[1].1.starts_with("**🔒 Black screen on iOS**"));
        assert!(threads.get("$root").await.unwrap().closed);
    }
}
