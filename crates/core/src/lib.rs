//! Domain logic for the ad strategy assistant.
//!
//! Everything in this crate is free of I/O: the database, HTTP, and
//! completion-provider layers build on these types and functions.

pub mod billing;
pub mod conversation;
pub mod creative;
pub mod error;
pub mod media;
pub mod metrics;
pub mod parser;
pub mod phase;
pub mod prompt;
pub mod selection;
pub mod session_key;
pub mod types;
