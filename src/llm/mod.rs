//! LLM integration for tuiforge.
//!
//! This module provides the generator-call boundary for every pipeline
//! stage: a provider trait over chat-completion requests, a client for
//! OpenAI-compatible endpoints, and token streaming for the stages that
//! advance a progress signal per fragment.
//!
//! ```ignore
//! use tuiforge::llm::{GenerationRequest, LlmProvider, Message, OpenAiCompatClient};
//!
//! let client = OpenAiCompatClient::from_env()?;
//! let request = GenerationRequest::new(
//!     "",
//!     vec![
//!         Message::system("You are a TUI designer."),
//!         Message::user("Design a process monitor."),
//!     ],
//! );
//! let response = client.generate(request).await?;
//! ```
//!
//! Streaming returns a lazy, finite sequence of text fragments consumed in
//! order by a single consumer; concatenating the fragments reconstructs the
//! full completion:
//!
//! ```ignore
//! use futures::StreamExt;
//!
//! let mut tokens = client.generate_stream(request).await?;
//! let mut text = String::new();
//! while let Some(fragment) = tokens.next().await {
//!     text.push_str(&fragment?);
//! }
//! ```

pub mod client;
pub mod stream;

pub use client::{
    Choice, GenerationRequest, GenerationResponse, LlmProvider, Message, OpenAiCompatClient,
    PredictionHint, Usage, MAX_COMPLETION_TOKENS,
};
pub use stream::TokenStream;
