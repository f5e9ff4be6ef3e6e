//! Completion response parsing.
//!
//! Turns the raw text of an initial-phase completion into an analysis string
//! and an ordered list of [`Variation`]s. Two input shapes are accepted:
//!
//! 1. A JSON document matching [`structured_output_schema`], produced when the
//!    completion API honours a schema-constrained response format. Extraction
//!    is plain deserialization.
//! 2. Free-form text using section markers (`=== ANALYSIS ===`,
//!    `=== VARIATION <n> ===`) and labelled lines (`Headline: ...`).
//!
//! Parsing never fails. Missing labels become empty strings, a missing or
//! unparsable score becomes [`DEFAULT_SCORE`], and text without any markers
//! yields zero variations.

use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;
use uuid::Uuid;

use crate::conversation::Variation;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Score assigned when a variation has no usable `AI Score` line.
pub const DEFAULT_SCORE: f64 = 0.75;

/// Header line that opens the analysis section.
pub const ANALYSIS_MARKER: &str = "=== ANALYSIS ===";

/// Matches either section marker on a line of its own.
static MARKER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?mi)^[ \t]*===[ \t]*(?:(ANALYSIS)|VARIATION[ \t]+(\d+))[ \t]*===[ \t]*\r?$")
        .expect("valid regex")
});

/// First number in a score line, with an optional `%` or `/ <denominator>` suffix.
static SCORE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(-?\d+(?:\.\d+)?)[ \t]*(%|/[ \t]*(\d+(?:\.\d+)?))?").expect("valid regex")
});

/// Build a regex matching `<label>: <rest of line>`, tolerating list bullets
/// and markdown bold around the label.
fn label_regex(label: &str) -> Regex {
    Regex::new(&format!(
        r"(?mi)^[ \t]*(?:[-*•][ \t]*)?(?:\*\*)?(?:{label})(?:\*\*)?[ \t]*:(?:\*\*)?[ \t]*(.*?)[ \t]*\r?$"
    ))
    .expect("valid regex")
}

static HEADLINE_RE: LazyLock<Regex> = LazyLock::new(|| label_regex("Headline"));
static PRIMARY_TEXT_RE: LazyLock<Regex> = LazyLock::new(|| label_regex(r"Primary[ \t]+Text"));
static CTA_RE: LazyLock<Regex> =
    LazyLock::new(|| label_regex(r"Call[ \t-]+to[ \t-]+Action|CTA"));
static TARGETING_RE: LazyLock<Regex> =
    LazyLock::new(|| label_regex(r"Targeting(?:[ \t]+Recommendations?)?"));
static BUDGET_RE: LazyLock<Regex> =
    LazyLock::new(|| label_regex(r"Budget(?:[ \t]+Recommendations?)?"));
static SCORE_LABEL_RE: LazyLock<Regex> = LazyLock::new(|| label_regex(r"AI[ \t]+Score"));

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// Result of parsing one completion.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedCompletion {
    /// Body of the first analysis section.
    pub analysis: String,
    /// Variations in order of appearance.
    pub variations: Vec<Variation>,
    /// Display text with repeated analysis sections removed.
    pub cleaned: String,
}

/// Arithmetic mean of the variation scores, or `None` when there are none.
pub fn aggregate_score(variations: &[Variation]) -> Option<f64> {
    if variations.is_empty() {
        return None;
    }
    let total: f64 = variations.iter().map(|v| v.score).sum();
    Some(total / variations.len() as f64)
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

/// Parse a raw initial-phase completion.
pub fn parse_completion(raw: &str) -> ParsedCompletion {
    match parse_structured(raw) {
        Some(parsed) => parsed,
        None => parse_marked(raw),
    }
}

// ---------------------------------------------------------------------------
// Structured (JSON) path
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct StructuredCompletion {
    #[serde(default)]
    analysis: String,
    #[serde(default)]
    variations: Vec<StructuredVariation>,
}

#[derive(Debug, Deserialize)]
struct StructuredVariation {
    #[serde(default)]
    headline: String,
    #[serde(default)]
    primary_text: String,
    #[serde(default)]
    call_to_action: String,
    #[serde(default)]
    targeting: String,
    #[serde(default)]
    budget_recommendation: String,
    #[serde(default)]
    ai_score: Option<f64>,
}

/// JSON schema sent with schema-constrained completion requests.
pub fn structured_output_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "object",
        "additionalProperties": false,
        "required": ["analysis", "variations"],
        "properties": {
            "analysis": { "type": "string" },
            "variations": {
                "type": "array",
                "items": {
                    "type": "object",
                    "additionalProperties": false,
                    "required": [
                        "headline", "primary_text", "call_to_action",
                        "targeting", "budget_recommendation", "ai_score"
                    ],
                    "properties": {
                        "headline": { "type": "string" },
                        "primary_text": { "type": "string" },
                        "call_to_action": { "type": "string" },
                        "targeting": { "type": "string" },
                        "budget_recommendation": { "type": "string" },
                        "ai_score": { "type": "number" }
                    }
                }
            }
        }
    })
}

/// Strip a surrounding markdown code fence, if any.
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

fn parse_structured(raw: &str) -> Option<ParsedCompletion> {
    let body = strip_code_fence(raw);
    if !body.starts_with('{') {
        return None;
    }
    let structured: StructuredCompletion = serde_json::from_str(body).ok()?;

    let variations: Vec<Variation> = structured
        .variations
        .into_iter()
        .enumerate()
        .map(|(idx, v)| {
            let ordinal = idx as u32 + 1;
            let score = v.ai_score.map_or(DEFAULT_SCORE, normalize_score);
            let mut variation = Variation {
                id: Variation::synthetic_id(ordinal),
                recommendation_id: None,
                correlation_key: Uuid::new_v4(),
                headline: v.headline.trim().to_string(),
                primary_text: v.primary_text.trim().to_string(),
                call_to_action: v.call_to_action.trim().to_string(),
                targeting: v.targeting.trim().to_string(),
                budget_recommendation: v.budget_recommendation.trim().to_string(),
                score,
                raw_text: String::new(),
            };
            variation.raw_text = render_variation(ordinal, &variation);
            variation
        })
        .collect();

    let analysis = structured.analysis.trim().to_string();
    let cleaned = render_completion(&analysis, &variations);
    Some(ParsedCompletion {
        analysis,
        variations,
        cleaned,
    })
}

// ---------------------------------------------------------------------------
// Marker path
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
enum SectionKind {
    Analysis,
    Variation(Option<u32>),
}

struct Section<'a> {
    kind: SectionKind,
    header: &'a str,
    body: &'a str,
}

/// Split the text at every marker line. Returns the preamble and the sections
/// in textual order; each section runs to the next marker or the end.
fn split_sections(raw: &str) -> (&str, Vec<Section<'_>>) {
    let markers: Vec<(SectionKind, usize, usize)> = MARKER_RE
        .captures_iter(raw)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let kind = if caps.get(1).is_some() {
                SectionKind::Analysis
            } else {
                SectionKind::Variation(caps.get(2).and_then(|n| n.as_str().parse().ok()))
            };
            Some((kind, whole.start(), whole.end()))
        })
        .collect();

    let preamble_end = markers.first().map_or(raw.len(), |(_, start, _)| *start);
    let sections = markers
        .iter()
        .enumerate()
        .map(|(idx, (kind, start, end))| {
            let body_end = markers.get(idx + 1).map_or(raw.len(), |(_, next, _)| *next);
            Section {
                kind: *kind,
                header: &raw[*start..*end],
                body: &raw[*end..body_end],
            }
        })
        .collect();

    (&raw[..preamble_end], sections)
}

fn parse_marked(raw: &str) -> ParsedCompletion {
    let (preamble, sections) = split_sections(raw);

    let mut analysis: Option<String> = None;
    let mut variations = Vec::new();
    let mut cleaned = String::from(preamble);

    for section in &sections {
        match section.kind {
            SectionKind::Analysis => {
                if analysis.is_some() {
                    continue;
                }
                analysis = Some(section.body.trim().to_string());
            }
            SectionKind::Variation(number) => {
                let ordinal = number.unwrap_or(variations.len() as u32 + 1);
                variations.push(extract_variation(ordinal, section.body));
            }
        }
        cleaned.push_str(section.header);
        cleaned.push_str(section.body);
    }

    let analysis = analysis.unwrap_or_else(|| preamble.trim().to_string());

    ParsedCompletion {
        analysis,
        variations,
        cleaned: cleaned.trim().to_string(),
    }
}

/// First value for a label within a block, or an empty string.
fn extract_field(re: &Regex, block: &str) -> String {
    re.captures(block)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_default()
}

fn extract_variation(ordinal: u32, block: &str) -> Variation {
    let score_text = extract_field(&SCORE_LABEL_RE, block);
    Variation {
        id: Variation::synthetic_id(ordinal),
        recommendation_id: None,
        correlation_key: Uuid::new_v4(),
        headline: extract_field(&HEADLINE_RE, block),
        primary_text: extract_field(&PRIMARY_TEXT_RE, block),
        call_to_action: extract_field(&CTA_RE, block),
        targeting: extract_field(&TARGETING_RE, block),
        budget_recommendation: extract_field(&BUDGET_RE, block),
        score: parse_score(&score_text),
        raw_text: block.trim().to_string(),
    }
}

/// Parse an `AI Score` value into [0, 1].
///
/// Accepts `0.82`, `82%`, `8.2/10`, bare `8.2` (out of ten) and bare `82`
/// (a percentage).
/// Anything without a number yields [`DEFAULT_SCORE`].
pub fn parse_score(text: &str) -> f64 {
    let Some(caps) = SCORE_RE.captures(text) else {
        return DEFAULT_SCORE;
    };
    let Some(value) = caps.get(1).and_then(|m| m.as_str().parse::<f64>().ok()) else {
        return DEFAULT_SCORE;
    };

    if let Some(denominator) = caps.get(3).and_then(|m| m.as_str().parse::<f64>().ok()) {
        if denominator > 0.0 {
            return normalize_score(value / denominator);
        }
        return DEFAULT_SCORE;
    }
    if caps.get(2).is_some() {
        return normalize_score(value / 100.0);
    }
    normalize_score(value)
}

/// Map a raw score into [0, 1]. Values in (1, 10] are read as out of ten
/// and values in (10, 100] as percentages.
pub fn normalize_score(value: f64) -> f64 {
    if !value.is_finite() {
        return DEFAULT_SCORE;
    }
    let scaled = if value > 1.0 && value <= 10.0 {
        value / 10.0
    } else if value > 10.0 && value <= 100.0 {
        value / 100.0
    } else {
        value
    };
    scaled.clamp(0.0, 1.0)
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

/// Header line for the `ordinal`-th variation.
pub fn variation_marker(ordinal: u32) -> String {
    format!("=== VARIATION {ordinal} ===")
}

fn single_line(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn render_variation(ordinal: u32, variation: &Variation) -> String {
    format!(
        "{marker}\n\
         Headline: {headline}\n\
         Primary Text: {primary_text}\n\
         Call to Action: {cta}\n\
         Targeting: {targeting}\n\
         Budget: {budget}\n\
         AI Score: {score}",
        marker = variation_marker(ordinal),
        headline = single_line(&variation.headline),
        primary_text = single_line(&variation.primary_text),
        cta = single_line(&variation.call_to_action),
        targeting = single_line(&variation.targeting),
        budget = single_line(&variation.budget_recommendation),
        score = variation.score,
    )
}

/// Render an analysis and its variations in the marker format the initial
/// prompt asks the model to produce.
pub fn render_completion(analysis: &str, variations: &[Variation]) -> String {
    let mut out = format!("{ANALYSIS_MARKER}\n{}", analysis.trim());
    for (idx, variation) in variations.iter().enumerate() {
        out.push_str("\n\n");
        out.push_str(&render_variation(idx as u32 + 1, variation));
    }
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
