//! # Admin Commands
//!
//! `add`/`addcom` and `delete`/`delcom`: moderator-only editing of the dynamic table.

use anyhow::Result;

use crate::application::dynamic_commands::DynamicCommands;
use crate::application::parsing::split_args;
use crate::application::registry_commands::RegistryCommands;
use crate::domain::traits::{ChatProvider, Invocation};
use crate::strings::{logs, messages};

pub async fn handle_add(
    dynamic: &DynamicCommands,
    is_moderator: bool,
    invocation: &Invocation,
    chat: &dyn ChatProvider,
) -> Result<()> {
    if !is_moderator {
        tracing::info!("{}", logs::permission_denied(&invocation.sender, &invocation.name));
        return Ok(());
    }

    let args = split_args(&invocation.args);
    let (name, reply) = match args.as_slice() {
        [name, reply, rest @ ..] => {
            if !rest.is_empty() {
                notify(chat, messages::ADD_QUOTE_HINT).await?;
            }
            (name.to_lowercase(), reply.clone())
        }
        _ => {
            notify(chat, messages::ADD_USAGE).await?;
            return Ok(());
        }
    };

    if !dynamic.add(&name, &reply).await? {
        notify(chat, &messages::command_exists(&name)).await?;
        return Ok(());
    }
    tracing::info!("{} added dynamic command '{}'", invocation.sender, name);
    send(
        chat,
        &format!(
            "{}\n{}",
            messages::command_added(&name, &reply),
            messages::ADD_TEMP_NOTICE
        ),
    )
    .await
}

pub async fn handle_delete(
    dynamic: &DynamicCommands,
    registry: &RegistryCommands,
    is_moderator: bool,
    invocation: &Invocation,
    chat: &dyn ChatProvider,
) -> Result<()> {
    if !is_moderator {
        tracing::info!("{}", logs::permission_denied(&invocation.sender, &invocation.name));
        return Ok(());
    }

    let args = split_args(&invocation.args);
    let Some(name) = args.first().map(|n| n.to_lowercase()) else {
        notify(chat, messages::DELETE_USAGE).await?;
        return Ok(());
    };

    if dynamic.remove(&name).await? {
        tracing::info!("{} deleted dynamic command '{}'", invocation.sender, name);
        return send(chat, &messages::command_deleted(&name)).await;
    }
    if registry.contains(&name) {
        return notify(chat, &messages::registry_command_readonly(&name)).await;
    }
    notify(chat, &messages::not_dynamic_command(&name)).await
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
    use crate::application::testing::RecordingChat;
    use std::collections::HashMap;

    fn invocation(name: &str, args: &str) -> Invocation {
        Invocation {
            name: name.into(),
            args: args.into(),
            sender: "@mod:x".into(),
            thread: None,
        }
    }

    async fn table(dir: &tempfile::TempDir) -> DynamicCommands {
        DynamicCommands::load(dir.path().join("commands.json"))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_add_requires_moderator() {
        let dir = tempfile::tempdir().unwrap();
        let dynamic = table(&dir).await;
        let chat = RecordingChat::default();

        handle_add(&dynamic, false, &invocation("add", "hi hello"), &chat)
            .await
            .unwrap();
        assert!(!dynamic.contains("hi").await);
        assert!(chat.messages().await.is_empty());
    }

    #[tokio::test]
    async fn test_add_and_duplicate() {
        let dir = tempfile::tempdir().unwrap();
        let dynamic = table(&dir).await;
        let chat = RecordingChat::default();

        handle_add(&dynamic, true, &invocation("add", r#"Hi "hello there""#), &chat)
            .await
            .unwrap();
        handle_add(&dynamic, true, &invocation("add", "hi again"), &chat)
            .await
            .unwrap();

        assert_eq!(dynamic.get("hi").await.as_deref(), Some("hello there"));
        let sent = chat.messages().await;
        assert_eq!(sent.len(), 2);
        assert!(sent[0].starts_with("Command 'hi' with reply 'hello there' has been added"));
        assert!(sent[1].contains("already exists"));
    }

    #[tokio::test]
    async fn test_add_unquoted_reply_keeps_first_word() {
        let dir = tempfile::tempdir().unwrap();
        let dynamic = table(&dir).await;
        let chat = RecordingChat::default();

        handle_add(&dynamic, true, &invocation("add", "hi hello there"), &chat)
            .await
            .unwrap();
        assert_eq!(dynamic.get("hi").await.as_deref(), Some("hello"));
        let sent = chat.messages().await;
        assert_eq!(sent[0], messages::ADD_QUOTE_HINT);
        assert!(sent[1].starts_with("Command 'hi' with reply 'hello' has been added"));
    }

    #[tokio::test]
    async fn test_delete_registry_command() {
        let dir = tempfile::tempdir().unwrap();
        let dynamic = table(&dir).await;
        let registry = RegistryCommands::new(HashMap::from([(
            "push".to_string(),
            "Use &push".to_string(),
        )]));
        let chat = RecordingChat::default();

        handle_delete(&dynamic, &registry, true, &invocation("delete", "push"), &chat)
            .await
            .unwrap();
        handle_delete(&dynamic, &registry, true, &invocation("delete", "nope"), &chat)
            .await
            .unwrap();

        assert_eq!(
            chat.messages().await,
            vec![
                messages::registry_command_readonly("push"),
                messages::not_dynamic_command("nope"),
            ]
        );
    }

    #[tokio::test]
    async fn test_send_failure_propagates() {
        let dir = tempfile::tempdir().unwrap();
        let dynamic = table(&dir).await;
        let chat = RecordingChat::failing();

        let result = handle_add(&dynamic, true, &invocation("add", "hi hello"), &chat).await;
        assert!(result.is_err());
        assert!(dynamic.contains("hi").await);
    }
}
