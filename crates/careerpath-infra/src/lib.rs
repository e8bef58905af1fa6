//! Infrastructure layer for careerpath.
//!
//! Contains implementations of the ports defined in `careerpath-core`:
//! SQLite storage, Argon2/SHA-256 credential hashing, the OpenAI-compatible
//! completion client, and config/data-directory loading.

pub mod config;
pub mod crypto;
pub mod data_dir;
pub mod llm;
pub mod sqlite;
