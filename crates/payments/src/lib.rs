//! Payments provider integration: customers, subscription checkout, and
//! webhook event types.
//!
//! Signature verification of webhook payloads lives in
//! `adsage_core::billing`; this crate only performs HTTP and models the
//! provider's JSON.

pub mod client;
pub mod config;
pub mod webhook;

pub use client::{CheckoutSession, Customer, PaymentsClient, PaymentsError};
pub use config::PaymentsConfig;
pub use webhook::{EventKind, SubscriptionObject, WebhookEvent};
