//! # Application Layer
//!
//! Contains the core logic of the bot: the documentation resolution cache and resolver,
//! the checkpointed feed poller, support threads, the command tables and the ordered
//! command router.

pub mod auto_thread;
pub mod cache;
pub mod docs;
pub mod dynamic_commands;
pub mod feed;
pub mod feed_formatter;
pub mod parsing;
pub mod registry_commands;
pub mod resolver;
pub mod router;
pub mod state;
#[cfg(test)]
pub mod testing;
