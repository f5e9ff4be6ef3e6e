//! Ad creative definition and validation.
//!
//! A [`Creative`] is the structured description of one advertisement as the
//! user configured it. It is snapshotted onto the session and supplied
//! wholesale on every completion request.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Objective used when the client leaves it blank.
pub const DEFAULT_OBJECTIVE: &str = "TRAFFIC";

/// Gender targeting used when the client leaves it blank.
pub const DEFAULT_GENDER: &str = "all";

/// Youngest age the ad platforms accept for targeting.
pub const MIN_TARGET_AGE: u8 = 13;

/// Oldest bucket the ad platforms expose ("65+").
pub const MAX_TARGET_AGE: u8 = 65;

/// Accepted gender targeting values.
pub const VALID_GENDERS: &[&str] = &["all", "men", "women"];

/// Maximum length of the headline in characters.
pub const MAX_HEADLINE_LENGTH: usize = 255;

/// Maximum length of the primary text in characters.
pub const MAX_PRIMARY_TEXT_LENGTH: usize = 5_000;

fn default_objective() -> String {
    DEFAULT_OBJECTIVE.to_string()
}

fn default_gender() -> String {
    DEFAULT_GENDER.to_string()
}

fn default_age_min() -> u8 {
    18
}

fn default_age_max() -> u8 {
    MAX_TARGET_AGE
}

// ---------------------------------------------------------------------------
// Creative
// ---------------------------------------------------------------------------

/// One advertising creative plus its delivery settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Creative {
    #[serde(default)]
    pub headline: String,
    #[serde(default)]
    pub primary_text: String,
    #[serde(default)]
    pub call_to_action: String,
    #[serde(default = "default_objective")]
    pub objective: String,
    #[serde(default)]
    pub budget_amount: Option<f64>,
    #[serde(default = "default_age_min")]
    pub age_min: u8,
    #[serde(default = "default_age_max")]
    pub age_max: u8,
    #[serde(default = "default_gender")]
    pub gender: String,
    #[serde(default)]
    pub detailed_targeting: String,
    #[serde(default)]
    pub media_url: Option<String>,
    #[serde(default)]
    pub destination: Vec<String>,
    #[serde(default)]
    pub app_install_type: Vec<String>,
}

impl Default for Creative {
    fn default() -> Self {
        Self {
            headline: String::new(),
            primary_text: String::new(),
            call_to_action: String::new(),
            objective: default_objective(),
            budget_amount: None,
            age_min: default_age_min(),
            age_max: default_age_max(),
            gender: default_gender(),
            detailed_targeting: String::new(),
            media_url: None,
            destination: Vec::new(),
            app_install_type: Vec::new(),
        }
    }
}

impl Creative {
    /// Whether the user has configured anything worth analysing yet.
    pub fn is_configured(&self) -> bool {
        !self.headline.trim().is_empty()
            || !self.primary_text.trim().is_empty()
            || self.has_media()
    }

    pub fn has_media(&self) -> bool {
        self.media_url
            .as_deref()
            .is_some_and(|url| !url.trim().is_empty())
    }

    /// Human-readable budget for prompts.
    pub fn budget_label(&self) -> String {
        match self.budget_amount {
            Some(amount) => format!("{amount:.2}"),
            None => "Not specified".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validate a creative before it is saved or sent to the completion API.
///
/// Headline, primary text, and call to action are required. Runs before any
/// network call so the caller gets a specific message.
pub fn validate_creative(creative: &Creative) -> Result<(), CoreError> {
    let mut missing = Vec::new();
    if creative.headline.trim().is_empty() {
        missing.push("headline");
    }
    if creative.primary_text.trim().is_empty() {
        missing.push("primary_text");
    }
    if creative.call_to_action.trim().is_empty() {
        missing.push("call_to_action");
    }
    if !missing.is_empty() {
        return Err(CoreError::Validation(format!(
            "Missing required creative fields: {}",
            missing.join(", ")
        )));
    }

    if creative.headline.chars().count() > MAX_HEADLINE_LENGTH {
        return Err(CoreError::Validation(format!(
            "Headline exceeds maximum length of {MAX_HEADLINE_LENGTH} characters"
        )));
    }
    if creative.primary_text.chars().count() > MAX_PRIMARY_TEXT_LENGTH {
        return Err(CoreError::Validation(format!(
            "Primary text exceeds maximum length of {MAX_PRIMARY_TEXT_LENGTH} characters"
        )));
    }

    validate_age_range(creative.age_min, creative.age_max)?;

    if !VALID_GENDERS.contains(&creative.gender.as_str()) {
        return Err(CoreError::Validation(format!(
            "Invalid gender '{}'. Must be one of: {:?}",
            creative.gender, VALID_GENDERS
        )));
    }

    if let Some(amount) = creative.budget_amount {
        if !amount.is_finite() || amount < 0.0 {
            return Err(CoreError::Validation(format!(
                "Budget must be a non-negative amount (got {amount})"
            )));
        }
    }

    Ok(())
}

/// Validate the targeting age range.
pub fn validate_age_range(age_min: u8, age_max: u8) -> Result<(), CoreError> {
    if age_min < MIN_TARGET_AGE || age_max > MAX_TARGET_AGE {
        return Err(CoreError::Validation(format!(
            "Age range must be within {MIN_TARGET_AGE}-{MAX_TARGET_AGE} (got {age_min}-{age_max})"
        )));
    }
    if age_min > age_max {
        return Err(CoreError::Validation(format!(
            "Minimum age {age_min} is greater than maximum age {age_max}"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> Creative {
        Creative {
            headline: "Get 20% Off".into(),
            primary_text: "Limited time".into(),
            call_to_action: "SHOP_NOW".into(),
            objective: "SALES".into(),
            ..Creative::default()
        }
    }

    #[test]
    fn valid_creative_passes() {
        assert!(validate_creative(&valid()).is_ok());
    }

    #[test]
    fn missing_fields_are_listed() {
        let creative = Creative {
            headline: "  ".into(),
            call_to_action: String::new(),
            ..valid()
        };
        let err = validate_creative(&creative).unwrap_err().to_string();
        assert!(err.contains("headline"));
        assert!(err.contains("call_to_action"));
        assert!(!err.contains("primary_text"));
    }

    #[test]
    fn inverted_age_range_is_rejected() {
        let creative = Creative {
            age_min: 40,
            age_max: 30,
            ..valid()
        };
        assert!(validate_creative(&creative).is_err());
    }

    #[test]
    fn age_outside_platform_bounds_is_rejected() {
        assert!(validate_age_range(12, 30).is_err());
        assert!(validate_age_range(18, 70).is_err());
        assert!(validate_age_range(13, 65).is_ok());
    }

    #[test]
    fn negative_budget_is_rejected() {
        let creative = Creative {
            budget_amount: Some(-5.0),
            ..valid()
        };
        assert!(validate_creative(&creative).is_err());
    }

    #[test]
    fn unknown_gender_is_rejected() {
        let creative = Creative {
            gender: "everyone".into(),
            ..valid()
        };
        assert!(validate_creative(&creative).is_err());
    }

    #[test]
    fn defaults_apply_when_deserializing_sparse_json() {
        let creative: Creative =
            serde_json::from_str(r#"{"headline":"Hi"}"#).expect("sparse creative parses");
        assert_eq!(creative.objective, DEFAULT_OBJECTIVE);
        assert_eq!(creative.age_min, 18);
        assert_eq!(creative.age_max, 65);
        assert_eq!(creative.gender, "all");
        assert!(creative.destination.is_empty());
    }

    #[test]
    fn configured_when_any_content_present() {
        assert!(!Creative::default().is_configured());
        let media_only = Creative {
            media_url: Some("https://cdn.example.com/a.png".into()),
            ..Creative::default()
        };
        assert!(media_only.is_configured());
        assert!(valid().is_configured());
    }
}
