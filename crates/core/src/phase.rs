//! Conversation phase state machine.
//!
//! The phase is derived from the persisted transcript, never taken from the
//! client:
//!
//! - `initial` while no assistant entry carries variations
//! - `follow_up` once variations exist
//! - `performance_review` only when a request explicitly asks for it, and
//!   only after variations exist
//!
//! Transcripts are append-only, so a session can never move back to
//! `initial` once it has left it.

use serde::{Deserialize, Serialize};

use crate::conversation::{has_variations, ConversationEntry};
use crate::error::CoreError;

/// Stage of a conversation, selecting the prompt template and what gets persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Initial,
    FollowUp,
    PerformanceReview,
}

impl Phase {
    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Initial => "initial",
            Phase::FollowUp => "follow_up",
            Phase::PerformanceReview => "performance_review",
        }
    }

    /// Only the initial phase parses the completion and stores recommendations.
    pub fn persists_recommendations(self) -> bool {
        self == Phase::Initial
    }

    /// Token budget for the completion request in this phase.
    pub fn max_tokens(self, initial_budget: u32) -> Option<u32> {
        match self {
            Phase::Initial => Some(initial_budget),
            Phase::FollowUp | Phase::PerformanceReview => None,
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Phase the session is currently in, ignoring explicit review requests.
pub fn current_phase(history: &[ConversationEntry]) -> Phase {
    if has_variations(history) {
        Phase::FollowUp
    } else {
        Phase::Initial
    }
}

/// Resolve the phase for the next turn.
///
/// `review_requested` is the only client input; a review before any
/// variations exist is rejected.
pub fn resolve_phase(
    history: &[ConversationEntry],
    review_requested: bool,
) -> Result<Phase, CoreError> {
    match (current_phase(history), review_requested) {
        (Phase::Initial, true) => Err(CoreError::Validation(
            "A performance review needs ad variations; send an initial analysis first".into(),
        )),
        (Phase::Initial, false) => Ok(Phase::Initial),
        (_, true) => Ok(Phase::PerformanceReview),
        (_, false) => Ok(Phase::FollowUp),
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;
    use crate::conversation::Variation;

    fn with_variations() -> Vec<ConversationEntry> {
        vec![
            ConversationEntry::user("analyse my ad"),
            ConversationEntry::assistant_with_variations(
                "analysis",
                vec![Variation {
                    id: "variation_1".into(),
                    recommendation_id: Some(1),
                    correlation_key: Uuid::new_v4(),
                    headline: "H".into(),
                    primary_text: String::new(),
                    call_to_action: String::new(),
                    targeting: String::new(),
                    budget_recommendation: String::new(),
                    score: 0.8,
                    raw_text: String::new(),
                }],
            ),
        ]
    }

    #[test]
    fn empty_history_is_initial() {
        assert_eq!(resolve_phase(&[], false).unwrap(), Phase::Initial);
    }

    #[test]
    fn assistant_reply_without_variations_stays_initial() {
        let history = vec![
            ConversationEntry::user("hi"),
            ConversationEntry::assistant("no variations this time"),
        ];
        assert_eq!(current_phase(&history), Phase::Initial);
    }

    #[test]
    fn variations_move_session_to_follow_up() {
        assert_eq!(resolve_phase(&with_variations(), false).unwrap(), Phase::FollowUp);
    }

    #[test]
    fn follow_up_is_sticky_as_history_grows() {
        let mut history = with_variations();
        for i in 0..5 {
            history.push(ConversationEntry::user(format!("question {i}")));
            history.push(ConversationEntry::assistant("answer"));
        }
        assert_eq!(current_phase(&history), Phase::FollowUp);
    }

    #[test]
    fn review_requires_explicit_request_and_variations() {
        assert_eq!(
            resolve_phase(&with_variations(), true).unwrap(),
            Phase::PerformanceReview
        );
        assert!(resolve_phase(&[], true).is_err());
    }

    #[test]
    fn only_initial_has_token_budget_and_persists() {
        assert_eq!(Phase::Initial.max_tokens(2000), Some(2000));
        assert_eq!(Phase::FollowUp.max_tokens(2000), None);
        assert!(Phase::Initial.persists_recommendations());
        assert!(!Phase::PerformanceReview.persists_recommendations());
    }

    #[test]
    fn names_match_serde() {
        for phase in [Phase::Initial, Phase::FollowUp, Phase::PerformanceReview] {
            assert_eq!(
                serde_json::to_value(phase).unwrap(),
                serde_json::Value::from(phase.as_str())
            );
        }
        assert_eq!(
            serde_json::to_string(&Phase::FollowUp).unwrap(),
            "\"follow_up\""
        );
    }
}
