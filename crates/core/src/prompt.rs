//! Prompt construction for each conversation phase.
//!
//! Every request carries the complete context: company description, every
//! creative field, and the full transcript. Nothing is truncated.

use crate::conversation::ConversationEntry;
use crate::creative::Creative;
use crate::metrics::PerformanceLine;
use crate::parser::{variation_marker, ANALYSIS_MARKER};
use crate::phase::Phase;

/// How the model is asked to shape an initial-phase answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Section markers and labelled lines.
    Markers,
    /// A JSON object matching the structured output schema.
    Structured,
}

/// Everything a prompt is built from.
#[derive(Debug, Clone, Copy)]
pub struct PromptInput<'a> {
    pub company_description: &'a str,
    pub creative: &'a Creative,
    pub history: &'a [ConversationEntry],
    pub phase: Phase,
    /// Recorded results; only listed in performance reviews.
    pub performance: &'a [PerformanceLine],
}

/// System and user message pair for one completion request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub system: String,
    pub user: String,
}

const CONSULTANT_ROLE: &str = "You are an expert Facebook advertising consultant. \
You specialize in analyzing ad creatives and providing actionable recommendations \
for optimization. Keep your responses focused, actionable, and professional.";

const INITIAL_TASK: &str = "Analyze the submitted ad creative and generate 2-3 improved \
variations with detailed targeting recommendations. Focus ONLY on the submitted ad \
creative; do not ask for additional information.";

const FOLLOW_UP_TASK: &str = "You are continuing a conversation about an ad creative you \
have already analyzed and rewritten. Answer the user's latest message in plain prose. \
Do not produce new variations or section markers.";

const REVIEW_TASK: &str = "The user has run some of your recommended variations and is \
sharing results. Review the performance, explain what worked and what did not, and \
suggest concrete next steps in plain prose. Do not produce new variations or section \
markers.";

/// Build the prompt for one turn.
pub fn build_prompt(input: &PromptInput<'_>, format: OutputFormat) -> Prompt {
    let system = match input.phase {
        Phase::Initial => format!(
            "{CONSULTANT_ROLE}\n\n{INITIAL_TASK}\n\n{}",
            output_instructions(format)
        ),
        Phase::FollowUp => format!("{CONSULTANT_ROLE}\n\n{FOLLOW_UP_TASK}"),
        Phase::PerformanceReview => format!("{CONSULTANT_ROLE}\n\n{REVIEW_TASK}"),
    };

    let mut user = String::new();
    user.push_str(match input.phase {
        Phase::Initial => "Please analyze this Facebook ad creative and provide 2-3 improved variations.\n\n",
        Phase::FollowUp => "Please continue our discussion of this Facebook ad creative.\n\n",
        Phase::PerformanceReview => "Please review how this Facebook ad creative and its variations performed.\n\n",
    });

    user.push_str("Company Description: ");
    user.push_str(non_empty_or(input.company_description, "Not provided"));
    user.push_str("\n\nAd Creative:\n");
    user.push_str(&render_creative(input.creative));

    if input.phase == Phase::PerformanceReview {
        user.push_str("\nRecorded Results:\n");
        if input.performance.is_empty() {
            user.push_str("- No results recorded yet\n");
        }
        for line in input.performance {
            user.push_str("- ");
            user.push_str(&line.describe());
            user.push('\n');
        }
    }

    user.push_str("\nConversation History:\n");
    user.push_str(&render_history(input.history));

    Prompt { system, user }
}

fn output_instructions(format: OutputFormat) -> String {
    match format {
        OutputFormat::Markers => format!(
            "Format your answer exactly like this, with each label on its own line:\n\n\
             {ANALYSIS_MARKER}\n\
             <your analysis of the current creative>\n\n\
             {first}\n\
             Headline: <improved headline>\n\
             Primary Text: <improved ad copy>\n\
             Call to Action: <CTA button text>\n\
             Targeting: <audience targeting suggestions>\n\
             Budget: <suggested daily budget range>\n\
             AI Score: <expected performance between 0 and 1>\n\n\
             {second}\n\
             ...",
            first = variation_marker(1),
            second = variation_marker(2),
        ),
        OutputFormat::Structured => "Respond with a single JSON object with an `analysis` string \
             and a `variations` array. Each variation has `headline`, `primary_text`, \
             `call_to_action`, `targeting`, `budget_recommendation` strings and an `ai_score` \
             number between 0 and 1 estimating expected performance."
            .to_string(),
    }
}

fn non_empty_or<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    if value.trim().is_empty() {
        fallback
    } else {
        value
    }
}

fn render_creative(creative: &Creative) -> String {
    let mut out = format!(
        "- Headline: {}\n\
         - Primary Text: {}\n\
         - Call to Action: {}\n\
         - Media: {}\n\
         - Objective: {}\n\
         - Budget: {}\n\
         - Age Range: {}-{}\n\
         - Gender: {}\n\
         - Detailed Targeting: {}\n",
        creative.headline,
        creative.primary_text,
        creative.call_to_action,
        if creative.has_media() { "Image/Video uploaded" } else { "No media" },
        creative.objective,
        creative.budget_label(),
        creative.age_min,
        creative.age_max,
        creative.gender,
        non_empty_or(&creative.detailed_targeting, "None"),
    );
    if !creative.destination.is_empty() {
        out.push_str(&format!("- Destination: {}\n", creative.destination.join(", ")));
    }
    if !creative.app_install_type.is_empty() {
        out.push_str(&format!(
            "- App Install Type: {}\n",
            creative.app_install_type.join(", ")
        ));
    }
    out
}

/// Transcript as `role: content` lines, oldest first.
fn render_history(history: &[ConversationEntry]) -> String {
    if history.is_empty() {
        return "(no previous messages)\n".to_string();
    }
    let mut out = String::new();
    for entry in history {
        out.push_str(entry.role.as_str());
        out.push_str(": ");
        out.push_str(&entry.content);
        out.push('\n');
    }
    out
}
