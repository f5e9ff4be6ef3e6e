//! Ad advisor service.
//!
//! The [`AnalysisAdvisor`] ties the core prompt/parser logic to the
//! completion provider and the repositories, providing a single entry point
//! for running conversation turns and selection toggles.

pub mod orchestrator;

pub use orchestrator::{load_owned_session, AnalysisAdvisor, ToggleOutcome, TurnOutcome};
