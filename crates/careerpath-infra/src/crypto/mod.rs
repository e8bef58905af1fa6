//! Cryptographic operations for careerpath.
//!
//! - `password`: Argon2id password hashing and SHA-256 bearer-token hashing

pub mod password;
