//! Context window assembly for completion calls.
//!
//! - `prompt`: the counselor persona and the user-profile system prompt
//! - `window`: budgeted selection of trailing history

pub mod prompt;
pub mod window;

pub use window::{build_context_window, estimate_tokens, ContextWindow, SUMMARY_NOTICE};
