//! Accounts, bearer tokens, and career profiles.

pub mod credentials;
pub mod repository;
pub mod service;
