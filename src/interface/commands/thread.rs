//! # Thread Commands
//!
//! `title` and `close`: moderator-only management of support threads opened by the bot.

use anyhow::Result;

use crate::application::auto_thread::{ThreadChange, ThreadRegistry};
use crate::domain::traits::{ChatProvider, Invocation};
use crate::strings::{logs, messages};

pub async fn handle_title(
    threads: &ThreadRegistry,
    is_moderator: bool,
    invocation: &Invocation,
    chat: &dyn ChatProvider,
) -> Result<()> {
    if !is_moderator {
        tracing::info!("{}", logs::permission_denied(&invocation.sender, &invocation.name));
        return Ok(());
    }
    let Some(root) = invocation.thread.as_deref() else {
        return notify(chat, messages::TITLE_NOT_THREAD).await;
    };
    let title = invocation.args.trim();
    if title.is_empty() {
        return notify(chat, messages::TITLE_USAGE).await;
    }

    if threads.get(root).await.is_none() {
        return notify(chat, messages::THREAD_NOT_MANAGED).await;
    }

    send(chat, &messages::title_changing(title)).await?;
    if threads.rename(root, title, chat).await? == ThreadChange::Updated {
        tracing::info!("{} renamed thread {} to '{}'", invocation.sender, root, title);
    }
    Ok(())
}

pub async fn handle_close(
    threads: &ThreadRegistry,
    is_moderator: bool,
    invocation: &Invocation,
    chat: &dyn ChatProvider,
) -> Result<()> {
    if !is_moderator {
        tracing::info!("{}", logs::permission_denied(&invocation.sender, &invocation.name));
        return Ok(());
    }
    let Some(root) = invocation.thread.as_deref() else {
        return notify(chat, messages::CLOSE_NOT_THREAD).await;
    };

    match threads.get(root).await {
        None => return notify(chat, messages::THREAD_NOT_MANAGED).await,
        Some(record) if record.closed => {
            return notify(chat, messages::THREAD_ALREADY_CLOSED).await;
        }
        Some(_) => {}
    }
    send(chat, messages::THREAD_CLOSING).await?;
    threads.close(root, chat).await?;
    tracing::info!("{} closed thread {}", invocation.sender, root);
    Ok(())
}

async fn send(chat: &dyn ChatProvider, text: &str) -> Result<()> {
    chat.send_message(text)
        .await
        .map(|_| ())
        .map_err(|e| anyhow::anyhow!(e))
}

async fn notify(chat: &dyn ChatProvider, text: &str) -> Result<()> {
    chat.send_notification(text)
        .await
        .map(|_| ())
        .map_err(|e| anyhow::anyhow!(e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::auto_thread::ThreadRecord;
    use crate::application::state::JsonStateStore;
    use crate::application::testing::RecordingChat;
    use std::sync::Arc;

    fn invocation(name: &str, args: &str, thread: Option<&str>) -> Invocation {
        Invocation {
            name: name.into(),
            args: args.into(),
            sender: "@mod:x".into(),
            thread: thread.map(String::from),
        }
    }

    async fn threads(dir: &tempfile::TempDir) -> ThreadRegistry {
        let store = JsonStateStore::load(dir.path().join("state.json")).await;
        let threads = ThreadRegistry::new(Arc::new(store));
        threads
            .save(
                "$root",
                &ThreadRecord {
                    title: "OBS crashes".into(),
                    author: "@u:x".into(),
                    header_event: "$header".into(),
                    welcome: "Hi".into(),
                    closed: false,
                },
            )
            .await
            .unwrap();
        threads
    }

    #[tokio::test]
    async fn test_title_outside_thread() {
        let dir = tempfile::tempdir().unwrap();
        let threads = threads(&dir).await;
        let chat = RecordingChat::default();

        handle_title(&threads, true, &invocation("title", "New", None), &chat)
            .await
            .unwrap();
        assert_eq!(chat.messages().await, vec![messages::TITLE_NOT_THREAD]);
        assert!(chat.edits().await.is_empty());
    }

    #[tokio::test]
    async fn test_title_renames_thread() {
        let dir = tempfile::tempdir().unwrap();
        let threads = threads(&dir).await;
        let chat = RecordingChat::default();

        handle_title(
            &threads,
            true,
            &invocation("title", " OBS crashes on start ", Some("$root")),
            &chat,
        )
        .await
        .unwrap();

        assert_eq!(
            chat.messages().await,
            vec!["Changing title to 'OBS crashes on start'"]
        );
        let edits = chat.edits().await;
        assert_eq!(edits.len(), 1);
        assert_eq!(edits[0].0, "$header");
        assert!(edits[0].1.starts_with("**🧵 OBS crashes on start**"));
        assert_eq!(
            threads.get("$root").await.unwrap().title,
            "OBS crashes on start"
        );
    }

    #[tokio::test]
    async fn test_title_needs_text_and_moderator() {
        let dir = tempfile::tempdir().unwrap();
        let threads = threads(&dir).await;
        let chat = RecordingChat::default();

        handle_title(&threads, true, &invocation("title", "  ", Some("$root")), &chat)
            .await
            .unwrap();
        handle_title(&threads, false, &invocation("title", "X", Some("$root")), &chat)
            .await
            .unwrap();

        assert_eq!(chat.messages().await, vec![messages::TITLE_USAGE]);
        assert_eq!(threads.get("$root").await.unwrap().title, "OBS crashes");
    }

    #[tokio::test]
    async fn test_close_archives_once() {
        let dir = tempfile::tempdir().unwrap();
        let threads = threads(&dir).await;
        let chat = RecordingChat::default();

        handle_close(&threads, true, &invocation("close", "", Some("$root")), &chat)
            .await
            .unwrap();
        handle_close(&threads, true, &invocation("close", "", Some("$root")), &chat)
            .await
            .unwrap();

        assert_eq!(
            chat.messages().await,
            vec![messages::THREAD_CLOSING, messages::THREAD_ALREADY_CLOSED]
        );
        assert_eq!(chat.edits().await.len(), 1);
        assert!(threads.get("$root").await.unwrap().closed);
    }

    #[tokio::test]
    async fn test_close_outside_or_foreign_thread() {
        let dir = tempfile::tempdir().unwrap();
        let threads = threads(&dir).await;
        let chat = RecordingChat::default();

        handle_close(&threads, true, &invocation("close", "", None), &chat)
            .await
            .unwrap();
        handle_close(&threads, true, &invocation("close", "", Some("$other")), &chat)
            .await
            .unwrap();

        assert_eq!(
            chat.messages().await,
            vec![messages::CLOSE_NOT_THREAD, messages::THREAD_NOT_MANAGED]
        );
        assert!(chat.edits().await.is_empty());
    }
}
