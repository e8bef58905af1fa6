//! LLM provider abstractions for careerpath.
//!
//! - `provider`: the `LlmProvider` trait (RPITIT)
//! - `box_provider`: `BoxLlmProvider` for runtime provider selection

pub mod box_provider;
pub mod provider;
