//! LLM integration for README synthesis
//!
//! A trait-based seam between the context-assembly core and the chat
//! completion backends. Both supported providers speak the OpenAI-compatible
//! chat completions API; only authentication and endpoints differ.

mod client;
mod providers;

pub use client::{complete_with_retry, LlmClient};
pub use providers::{create_client, OllamaClient, ZhipuClient};
