//! Multi-backend LLM abstraction layer
//!
//! Backends implement the [`ChatBackend`] trait and are composed via
//! [`ModelGateway`], which tries each configured backend once in order.

pub mod anthropic;
pub mod gateway;
pub mod openai;
pub mod types;

pub use anthropic::AnthropicBackend;
pub use gateway::ModelGateway;
pub use openai::OpenAiBackend;
pub use types::{ChatBackend, ChatMessage, ChatRole, CompletionOptions};
