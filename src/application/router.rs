//! # Command Router
//!
//! Routes incoming chat messages to whoever owns the command.
//! Messages pass a gate first (prefix, not from a bot, not a top-level post in an
//! auto-thread channel; those open support threads instead), then
//! the resolver chain is tried in order: dynamic table, registry table. The first resolver
//! that claims the name ends the search, even if its handler then fails. Names no resolver
//! claims go to the native command processor.

use std::sync::Arc;

use crate::application::parsing::parse_invocation;
use crate::domain::config::CommandsConfig;
use crate::domain::traits::{ChatProvider, Claim, CommandResolver, Invocation};
use crate::domain::types::InboundMessage;

/// How a message was routed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    /// Not a command for us (gate rejected it)
    Ignored,
    /// Claimed by the named resolver in the chain
    Resolved(&'static str),
    /// No resolver claimed it; handed to the native processor
    FellThrough,
}

impl Dispatch {
    pub fn handled(&self) -> bool {
        matches!(self, Dispatch::Resolved(_))
    }
}

pub struct CommandRouter {
    prefix: String,
    own_user_id: String,
    bot_accounts: Vec<String>,
    auto_thread_channels: Vec<String>,
    chain: Vec<Arc<dyn CommandResolver>>,
    native: Arc<dyn CommandResolver>,
}

impl CommandRouter {
    pub fn new(
        config: &CommandsConfig,
        own_user_id: String,
        chain: Vec<Arc<dyn CommandResolver>>,
        native: Arc<dyn CommandResolver>,
    ) -> Self {
        Self {
            prefix: config.prefix.clone(),
            own_user_id,
            bot_accounts: config.bot_accounts.clone(),
            auto_thread_channels: config.auto_thread_channels.clone(),
            chain,
            native,
        }
    }

    pub async fn route(&self, chat: &dyn ChatProvider, message: &InboundMessage) -> Dispatch {
        let Some(invocation) = self.gate(message) else {
            return Dispatch::Ignored;
        };
        tracing::info!(
            "Router dispatching cmd='{}' args='{}' sender='{}'",
            invocation.name,
            invocation.args,
            invocation.sender
        );

        for resolver in &self.chain {
            match resolver.try_handle(&invocation, chat).await {
                Claim::Declined => continue,
                Claim::Handled => return Dispatch::Resolved(resolver.name()),
                Claim::Failed(e) => {
                    report_failure(chat, &invocation, resolver.name(), &e).await;
                    return Dispatch::Resolved(resolver.name());
                }
            }
        }

        tracing::debug!("Command not found by custom handlers, trying native commands");
        match self.native.try_handle(&invocation, chat).await {
            Claim::Handled => {}
            Claim::Declined => tracing::info!(
                "user '{}' tried to run '{}' which is unknown/invalid",
                invocation.sender,
                message.body
            ),
            Claim::Failed(e) => report_failure(chat, &invocation, self.native.name(), &e).await,
        }
        Dispatch::FellThrough
    }

    fn gate(&self, message: &InboundMessage) -> Option<Invocation> {
        let top_level_in_auto_thread = message.thread_root.is_none()
            && self.auto_thread_channels.iter().any(|c| c == &message.channel);
        if message.sender == self.own_user_id
            || self.bot_accounts.iter().any(|b| b == &message.sender)
            || top_level_in_auto_thread
        {
            return None;
        }
        let mut invocation = parse_invocation(&self.prefix, &message.body, &message.sender)?;
        invocation.thread = message.thread_root.clone();
        Some(invocation)
    }
}

async fn report_failure(
    chat: &dyn ChatProvider,
    invocation: &Invocation,
    resolver: &str,
    error: &anyhow::Error,
) {
    tracing::error!(
        "Command '{}' failed in {} resolver: {:#}",
        invocation.name,
        resolver,
        error
    );
    if let Err(e) = chat.send_notification(&error.to_string()).await {
        tracing::error!("Failed to report command failure: {}", e);
    }
}
