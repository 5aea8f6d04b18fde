//! contrast-core - report comparison over LLM chat-completion backends
//!
//! This crate provides:
//! - A backend abstraction with OpenAI and Anthropic implementations
//! - A model gateway that tries configured backends in order (one hop)
//! - Fixed prompt templates for the three pipeline stages
//! - JSON extraction with a brace-scanning fallback for metrics replies
//! - The comparison engine that sequences the three model calls

pub mod backends;
pub mod engine;
pub mod extract;
pub mod prompts;
pub mod types;

// Re-export main types for convenience
pub use backends::{
    AnthropicBackend, ChatBackend, ChatMessage, ChatRole, CompletionOptions, ModelGateway,
    OpenAiBackend,
};
pub use engine::ComparisonEngine;
pub use extract::{MetricsOutcome, decode_metrics};
pub use types::{
    ComparisonRequest, ComparisonResult, DatapointCheck, DatapointValue, DimensionScores,
    HardMetrics, ModuleEntry, ScorePair, ValidationStatus, WordCount,
};
