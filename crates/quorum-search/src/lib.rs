//! # quorum-search
//!
//! Web search collaborator used during final synthesis.
//!
//! The [`SearchProvider`] trait never fails: transport and API errors are
//! returned as data inside [`types::SearchResponse`], so a broken search
//! degrades the narrative instead of aborting the session.

#![deny(unsafe_code)]

pub mod tavily;
pub mod types;

pub use tavily::TavilyClient;
pub use types::{SearchDepth, SearchHit, SearchQuery, SearchResponse};

use async_trait::async_trait;

/// A web search backend.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Execute a search. Never fails — errors are captured in the
    /// response's `error` field.
    async fn search(&self, query: &SearchQuery) -> SearchResponse;
}
