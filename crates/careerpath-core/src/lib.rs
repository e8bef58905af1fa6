//! Business logic and repository trait definitions for careerpath.
//!
//! This crate defines the "ports" (repository traits) that the infrastructure
//! layer implements. It depends only on `careerpath-types` -- never on
//! `careerpath-infra` or any database/IO crate.

pub mod account;
pub mod chat;
pub mod context;
pub mod llm;

#[cfg(test)]
mod test_support;
