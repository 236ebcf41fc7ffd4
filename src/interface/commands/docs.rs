//! # Docs Commands
//!
//! `ask` and `searchdocs`/`docs`.

use anyhow::Result;

use crate::application::docs::{DocsService, format_answer, format_search};
use crate::domain::traits::ChatProvider;
use crate::strings::messages;

pub async fn handle_ask(
    docs: Option<&DocsService>,
    question: &str,
    chat: &dyn ChatProvider,
) -> Result<()> {
    let Some(docs) = docs else {
        return reply(chat, messages::DOCS_DISABLED).await;
    };
    if question.trim().is_empty() {
        return reply(chat, messages::ASK_USAGE).await;
    }
    let _ = chat.typing(true).await;
    let answer = docs.ask(question).await;
    let _ = chat.typing(false).await;

    match answer {
        Some(answer) => reply(chat, &format_answer(&answer)).await,
        None => reply(chat, messages::ASK_FAILED).await,
    }
}

pub async fn handle_search(
    docs: Option<&DocsService>,
    query: &str,
    chat: &dyn ChatProvider,
) -> Result<()> {
    let Some(docs) = docs else {
        return reply(chat, messages::DOCS_DISABLED).await;
    };
    if query.trim().is_empty() {
        return reply(chat, messages::SEARCH_USAGE).await;
    }
    match docs.search(query).await {
        Some(results) => reply(chat, &format_search(&results)).await,
        None => reply(chat, messages::SEARCH_FAILED).await,
    }
}

async fn reply(chat: &dyn ChatProvider, text: &str) -> Result<()> {
    chat.send_message(text)
        .await
        .map(|_| ())
        .map_err(|e| anyhow::anyhow!(e))
}
