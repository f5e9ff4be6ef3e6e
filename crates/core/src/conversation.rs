//! Conversation transcript types.
//!
//! A session's transcript is an ordered, append-only list of
//! [`ConversationEntry`] values. Assistant entries produced during the
//! initial phase carry the [`Variation`]s extracted from the completion.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::DbId;

/// Author of a conversation entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// One candidate ad-copy rewrite extracted from a completion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variation {
    /// `variation_<n>` until persisted, then the recommendation id.
    pub id: String,
    /// Set once the variation has been stored as a recommendation row.
    #[serde(default)]
    pub recommendation_id: Option<DbId>,
    /// Correlates this in-memory variation with its stored row.
    pub correlation_key: Uuid,
    #[serde(default)]
    pub headline: String,
    #[serde(default)]
    pub primary_text: String,
    #[serde(default)]
    pub call_to_action: String,
    #[serde(default)]
    pub targeting: String,
    #[serde(default)]
    pub budget_recommendation: String,
    pub score: f64,
    #[serde(default)]
    pub raw_text: String,
}

impl Variation {
    /// Synthetic identifier for the `ordinal`-th variation of a completion.
    pub fn synthetic_id(ordinal: u32) -> String {
        format!("variation_{ordinal}")
    }

    /// Replace the synthetic identifier with the stored recommendation id.
    pub fn hydrate(&mut self, recommendation_id: DbId) {
        self.recommendation_id = Some(recommendation_id);
        self.id = recommendation_id.to_string();
    }
}

/// One message in a session transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationEntry {
    pub role: Role,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variations: Option<Vec<Variation>>,
}

impl ConversationEntry {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            variations: None,
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            variations: None,
        }
    }

    /// Assistant entry with variations attached. An empty list attaches nothing.
    pub fn assistant_with_variations(content: impl Into<String>, variations: Vec<Variation>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            variations: (!variations.is_empty()).then_some(variations),
        }
    }

    pub fn has_variations(&self) -> bool {
        self.role == Role::Assistant && self.variations.as_ref().is_some_and(|v| !v.is_empty())
    }
}

/// Whether any assistant entry in the history carries variations.
pub fn has_variations(history: &[ConversationEntry]) -> bool {
    history.iter().any(ConversationEntry::has_variations)
}

/// Synthetic user message sent when the first variation of a session is selected.
pub fn selection_prompt(variation_label: &str) -> String {
    format!("I've selected variation {variation_label}. Are these the ads you like the most?")
}

/// Text appended to the analysis when variations are presented for selection.
pub const VARIATIONS_FOOTER: &str =
    "Here are your AI-generated ad variations. Please select the ones you'd like to test:";
