//! # Domain Layer
//!
//! Core definitions, types, and traits that describe the bot's domain: feed items,
//! documentation references, commands, and the collaborators they flow through.
//! Independent of any specific chat network or HTTP API.

pub mod clock;
pub mod config;
pub mod errors;
pub mod paths;
pub mod traits;
pub mod types;
