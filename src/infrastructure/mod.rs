//! # Infrastructure Layer
//!
//! Adapters for the external services: the Matrix homeserver, the documentation content
//! API, the discussion feed and the command registry.

pub mod gitbook;
pub mod http;
pub mod matrix;
pub mod reddit;
pub mod registry;
