//! Chat-completion client for the ad advisor.
//!
//! The advisor talks to the completion API only through the
//! [`CompletionProvider`] trait, so tests can substitute a canned provider.
//! [`OpenAiCompatibleClient`] is the production implementation for any
//! OpenAI-compatible `/chat/completions` endpoint.

pub mod client;
pub mod config;
pub mod provider;
pub mod types;

pub use client::OpenAiCompatibleClient;
pub use config::CompletionConfig;
pub use provider::{CompletionError, CompletionProvider, CompletionRequest};
