//! Shared domain types for careerpath.
//!
//! Chat sessions and messages, prompt units, users and profiles, global
//! configuration, and the error enums shared across the workspace.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror.

pub mod chat;
pub mod config;
pub mod error;
pub mod llm;
pub mod user;
