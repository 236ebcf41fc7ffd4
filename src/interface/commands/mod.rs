//! # Native Commands
//!
//! The bot's own commands, reached only when neither the dynamic table nor the registry
//! claimed the name. Each handler lives in its own module; this one maps names and aliases
//! onto them.

pub mod admin;
pub mod docs;
pub mod help;
pub mod thread;

use async_trait::async_trait;
use std::sync::Arc;

use crate::application::auto_thread::ThreadRegistry;
use crate::application::docs::DocsService;
use crate::application::dynamic_commands::DynamicCommands;
use crate::application::registry_commands::RegistryCommands;
use crate::domain::traits::{ChatProvider, Claim, CommandResolver, Invocation};

const NAMES: &[&str] = &[
    "add",
    "addcom",
    "delete",
    "delcom",
    "ask",
    "searchdocs",
    "docs",
    "help",
    "commands",
    "title",
    "close",
];

pub struct NativeCommands {
    dynamic: Arc<DynamicCommands>,
    registry: Arc<RegistryCommands>,
    docs: Option<Arc<DocsService>>,
    threads: Arc<ThreadRegistry>,
    moderators: Vec<String>,
}

impl NativeCommands {
    pub fn new(
        dynamic: Arc<DynamicCommands>,
        registry: Arc<RegistryCommands>,
        docs: Option<Arc<DocsService>>,
        threads: Arc<ThreadRegistry>,
        moderators: Vec<String>,
    ) -> Self {
        Self {
            dynamic,
            registry,
            docs,
            threads,
            moderators,
        }
    }

    fn is_moderator(&self, sender: &str) -> bool {
        self.moderators
            .iter()
            .any(|m| m.eq_ignore_ascii_case(sender))
    }
}

#[async_trait]
impl CommandResolver for NativeCommands {
    fn name(&self) -> &'static str {
        "native"
    }

    async fn try_handle(&self, invocation: &Invocation, chat: &dyn ChatProvider) -> Claim {
        let result = match invocation.name.as_str() {
            "add" | "addcom" => {
                admin::handle_add(
                    &self.dynamic,
                    self.is_moderator(&invocation.sender),
                    invocation,
                    chat,
                )
                .await
            }
            "delete" | "delcom" => {
                admin::handle_delete(
                    &self.dynamic,
                    &self.registry,
                    self.is_moderator(&invocation.sender),
                    invocation,
                    chat,
                )
                .await
            }
            "ask" => docs::handle_ask(self.docs.as_deref(), &invocation.args, chat).await,
            "searchdocs" | "docs" => {
                docs::handle_search(self.docs.as_deref(), &invocation.args, chat).await
            }
            "help" | "commands" => {
                help::handle_help(self.dynamic.as_ref(), self.registry.as_ref(), chat).await
            }
            "title" => {
                thread::handle_title(
                    &self.threads,
                    self.is_moderator(&invocation.sender),
                    invocation,
                    chat,
                )
                .await
            }
            "close" => {
                thread::handle_close(
                    &self.threads,
                    self.is_moderator(&invocation.sender),
                    invocation,
                    chat,
                )
                .await
            }
            _ => return Claim::Declined,
        };
        match result {
            Ok(()) => Claim::Handled,
            Err(e) => Claim::Failed(e),
        }
    }

    async fn command_names(&self) -> Vec<String> {
        NAMES.iter().map(|n| n.to_string()).collect()
    }
}
