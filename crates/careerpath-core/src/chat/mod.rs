//! Chat sessions, messages, and the send-message orchestration.
//!
//! This module defines the `ChatRepository` trait that the infrastructure
//! layer implements, plus the `ChatService` that drives a conversation.

pub mod repository;
pub mod service;
pub mod title;
