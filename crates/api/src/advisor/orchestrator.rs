//! Conversation turn orchestration.
//!
//! Coordinates transcript appends, prompt building, the completion call,
//! response parsing and persistence. Held in
//! [`AppState`](crate::state::AppState) as an `Arc<AnalysisAdvisor>`.

use std::sync::Arc;

use serde::Serialize;
use sqlx::PgPool;

use adsage_core::conversation::{selection_prompt, ConversationEntry, Variation, VARIATIONS_FOOTER};
use adsage_core::creative::validate_creative;
use adsage_core::error::CoreError;
use adsage_core::metrics::PerformanceLine;
use adsage_core::parser::{aggregate_score, parse_completion};
use adsage_core::phase::{current_phase, resolve_phase, Phase};
use adsage_core::prompt::{build_prompt, OutputFormat, PromptInput};
use adsage_core::selection::{plan_toggle, ToggleAction};
use adsage_core::types::DbId;
use adsage_db::models::analysis::{CreateAnalysis, RecordInitialAnalysis};
use adsage_db::models::analysis_session::AnalysisSession;
use adsage_db::models::selection::Selection;
use adsage_db::repositories::{
    AdRepo, AdResultRepo, AnalysisRepo, AnalysisSessionRepo, RecommendationRepo, SelectionRepo,
};
use adsage_llm::{CompletionConfig, CompletionProvider, CompletionRequest};

use crate::error::{AppError, AppResult};

/// Result of one conversation turn.
#[derive(Debug, Clone, Serialize)]
pub struct TurnOutcome {
    /// Phase this turn ran in.
    pub phase: Phase,
    /// Phase the next plain message will run in.
    pub next_phase: Phase,
    /// Analysis text (initial) or the full reply (follow-up, review).
    pub analysis: String,
    /// Variations with persisted recommendation ids. Empty after the initial turn.
    pub variations: Vec<Variation>,
    /// Mean variation score, when there are variations.
    pub score: Option<f64>,
}

/// Result of toggling a recommendation's selection.
#[derive(Debug, Clone, Serialize)]
pub struct ToggleOutcome {
    pub recommendation_id: DbId,
    /// Whether the recommendation is selected after the toggle.
    pub selected: bool,
    /// The selection row, unless the toggle removed it.
    pub selection: Option<Selection>,
    /// Follow-up turn run for the first selection of a session.
    pub follow_up: Option<TurnOutcome>,
}

/// Runs conversation turns for analysis sessions.
///
/// One turn:
/// 1. Require a configured, valid creative on the session.
/// 2. Resolve the phase from the stored transcript.
/// 3. Append the user entry.
/// 4. Build the prompt from the full transcript.
/// 5. Request a completion.
/// 6. Persist the outcome for the phase and append the assistant entry.
pub struct AnalysisAdvisor {
    pool: PgPool,
    completions: Arc<dyn CompletionProvider>,
    initial_max_tokens: u32,
    structured_output: bool,
}

impl AnalysisAdvisor {
    pub fn new(
        pool: PgPool,
        completions: Arc<dyn CompletionProvider>,
        config: &CompletionConfig,
    ) -> Self {
        Self {
            pool,
            completions,
            initial_max_tokens: config.initial_max_tokens,
            structured_output: config.structured_output,
        }
    }

    /// Run one turn of the conversation for `session`.
    ///
    /// `review_requested` asks for a performance review instead of a plain
    /// follow-up; it is rejected before variations exist.
    pub async fn run_turn(
        &self,
        user_id: DbId,
        session: &AnalysisSession,
        content: &str,
        review_requested: bool,
    ) -> AppResult<TurnOutcome> {
        let content = content.trim();
        if content.is_empty() {
            return Err(CoreError::Validation("Message content must not be empty".into()).into());
        }

        // 1. The creative is checked before anything is written or sent.
        let creative = session
            .creative()
            .filter(|c| c.is_configured())
            .ok_or_else(|| {
                CoreError::Validation("Configure the ad creative before starting an analysis".into())
            })?;
        validate_creative(creative)?;

        // 2. Phase comes from the stored transcript only.
        let phase = resolve_phase(session.history(), review_requested)?;

        // 3. Append the user entry.
        let session = AnalysisSessionRepo::append_entries(
            &self.pool,
            session.id,
            &[ConversationEntry::user(content)],
        )
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Session",
            id: session.id,
        })?;

        // 4. Build the prompt.
        let performance = if phase == Phase::PerformanceReview {
            AdResultRepo::latest_for_session(&self.pool, session.id)
                .await?
                .into_iter()
                .map(|r| PerformanceLine {
                    metrics: r.metrics(),
                    headline: r.headline,
                })
                .collect()
        } else {
            Vec::new()
        };

        let format = if phase == Phase::Initial && self.structured_output {
            OutputFormat::Structured
        } else {
            OutputFormat::Markers
        };

        let prompt = build_prompt(
            &PromptInput {
                company_description: &session.company_description,
                creative,
                history: session.history(),
                phase,
                performance: &performance,
            },
            format,
        );

        // 5. Request the completion.
        let request = CompletionRequest {
            system: prompt.system,
            user: prompt.user,
            max_tokens: phase.max_tokens(self.initial_max_tokens),
            structured: format == OutputFormat::Structured,
        };
        let raw = self.completions.complete(&request).await.inspect_err(|e| {
            tracing::error!(session_id = session.id, phase = %phase, error = %e, "Completion failed");
        })?;

        // 6. Persist.
        let outcome = if phase.persists_recommendations() {
            self.record_initial(user_id, &session, &raw).await?
        } else {
            self.record_reply(&session, phase, raw).await?
        };

        tracing::info!(
            session_id = session.id,
            phase = %outcome.phase,
            next_phase = %outcome.next_phase,
            variations = outcome.variations.len(),
            "Turn completed",
        );

        Ok(outcome)
    }

    /// Toggle a recommendation's selection within a session.
    ///
    /// The first selection a user makes in a session triggers a follow-up
    /// turn asking whether these are the ads they like most. A failure of
    /// that turn is logged and does not undo the selection.
    pub async fn toggle_selection(
        &self,
        user_id: DbId,
        session: &AnalysisSession,
        recommendation_id: DbId,
    ) -> AppResult<ToggleOutcome> {
        let recommendation =
            RecommendationRepo::find_in_session(&self.pool, recommendation_id, session.id)
                .await?
                .ok_or(CoreError::NotFound {
                    entity: "Recommendation",
                    id: recommendation_id,
                })?;

        let existing = SelectionRepo::find(&self.pool, user_id, recommendation.id).await?;
        let prior_selections = SelectionRepo::count_for_session(&self.pool, user_id, session.id).await?;

        let action = plan_toggle(existing.as_ref().map(Selection::snapshot).as_ref());
        let selection = match (action, existing) {
            (ToggleAction::Insert(status), _) => {
                Some(SelectionRepo::insert(&self.pool, user_id, recommendation.id, status).await?)
            }
            (ToggleAction::Delete, Some(row)) => {
                SelectionRepo::delete(&self.pool, row.id).await?;
                None
            }
            (ToggleAction::Deselect, Some(row)) => SelectionRepo::deselect(&self.pool, row.id).await?,
            (ToggleAction::Reselect, Some(row)) => SelectionRepo::reselect(&self.pool, row.id).await?,
            (_, None) => {
                return Err(AppError::InternalError(format!(
                    "Toggle planned {action:?} without a selection row"
                )))
            }
        };

        tracing::info!(
            user_id,
            session_id = session.id,
            recommendation_id,
            action = ?action,
            "Selection toggled",
        );

        let follow_up = if action.selects() && prior_selections == 0 {
            let message = selection_prompt(&recommendation.ordinal.to_string());
            match self.run_turn(user_id, session, &message, false).await {
                Ok(outcome) => Some(outcome),
                Err(e) => {
                    tracing::warn!(session_id = session.id, error = %e, "First-selection follow-up failed");
                    None
                }
            }
        } else {
            None
        };

        Ok(ToggleOutcome {
            recommendation_id,
            selected: action.selects(),
            selection,
            follow_up,
        })
    }

    // -----------------------------------------------------------------------
    // Persistence per phase
    // -----------------------------------------------------------------------

    async fn record_initial(
        &self,
        user_id: DbId,
        session: &AnalysisSession,
        raw: &str,
    ) -> AppResult<TurnOutcome> {
        let parsed = parse_completion(raw);
        let score = aggregate_score(&parsed.variations);

        if parsed.variations.is_empty() {
            tracing::warn!(session_id = session.id, "Completion contained no variations");
        }

        let entry_content = if parsed.variations.is_empty() {
            parsed.cleaned.clone()
        } else {
            format!("{}\n\n{VARIATIONS_FOOTER}", parsed.analysis)
        };

        let creative = session.creative().ok_or_else(|| {
            AppError::InternalError(format!("Session {} lost its creative", session.id))
        })?;

        let record = AnalysisRepo::record_initial(
            &self.pool,
            RecordInitialAnalysis {
                user_id,
                session_id: session.id,
                creative,
                analysis: &parsed.analysis,
                score,
                variations: parsed.variations,
                entry_content,
            },
        )
        .await?;

        Ok(TurnOutcome {
            phase: Phase::Initial,
            next_phase: current_phase(record.session.history()),
            analysis: parsed.analysis,
            variations: record.variations,
            score,
        })
    }

    async fn record_reply(
        &self,
        session: &AnalysisSession,
        phase: Phase,
        raw: String,
    ) -> AppResult<TurnOutcome> {
        if let Some(ad) = AdRepo::latest_for_session(&self.pool, session.id).await? {
            AnalysisRepo::create(
                &self.pool,
                &CreateAnalysis {
                    ad_id: ad.id,
                    analysis: &raw,
                    score: None,
                    phase,
                    recommendations: &[],
                },
            )
            .await?;
        }

        let updated = AnalysisSessionRepo::append_entries(
            &self.pool,
            session.id,
            &[ConversationEntry::assistant(raw.clone())],
        )
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Session",
            id: session.id,
        })?;

        Ok(TurnOutcome {
            phase,
            next_phase: current_phase(updated.history()),
            analysis: raw,
            variations: Vec::new(),
            score: None,
        })
    }
}

/// Load a session by key (or numeric id) and check that `user_id` owns it.
///
/// Sessions of other users are reported as missing.
pub async fn load_owned_session(
    pool: &PgPool,
    user_id: DbId,
    key: &str,
) -> AppResult<AnalysisSession> {
    match AnalysisSessionRepo::find_by_key_or_id(pool, key).await? {
        Some(session) if session.user_id == user_id => Ok(session),
        _ => Err(CoreError::NotFoundByKey {
            entity: "Session",
            key: key.to_string(),
        }
        .into()),
    }
}
