//! # quorum-llm
//!
//! Model provider trait and the resilient chat client.
//!
//! - [`provider::ModelProvider`]: unified completion + streaming interface
//!   over any chat-completions backend
//! - [`client::ChatClient`]: bounded retry with exponential backoff,
//!   post-call cooldown, and cooperative cancellation
//! - [`sse`]: shared Server-Sent Events line parser
//! - [`openrouter::OpenRouterProvider`]: HTTP backend speaking the
//!   OpenAI-compatible chat-completions format
//! - [`types`]: chat messages, tool calls with typed argument validation

#![deny(unsafe_code)]

pub mod client;
pub mod error;
pub mod openrouter;
pub mod provider;
pub mod sse;
pub mod types;

pub use client::{ChatClient, ClientConfig};
pub use error::ChatError;
pub use provider::{ChatResult, ModelProvider, TokenStream};
