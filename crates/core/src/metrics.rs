//! Ad performance results.
//!
//! Users record delivery numbers for the variations they ran. Missing rates
//! are derived from the raw counts where the denominator allows it.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Raw and derived performance numbers for one recommendation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PerformanceInput {
    #[serde(default)]
    pub impressions: Option<i64>,
    #[serde(default)]
    pub clicks: Option<i64>,
    #[serde(default)]
    pub spend: Option<f64>,
    #[serde(default)]
    pub conversions: Option<i64>,
    /// Percentage of clicks that converted.
    #[serde(default)]
    pub conversion_rate: Option<f64>,
    /// Click-through rate as a percentage.
    #[serde(default)]
    pub ctr: Option<f64>,
    /// Cost per click.
    #[serde(default)]
    pub cpc: Option<f64>,
    /// Cost per thousand impressions.
    #[serde(default)]
    pub cpm: Option<f64>,
}

/// Reject negative counts and non-finite or negative amounts.
pub fn validate_performance(input: &PerformanceInput) -> Result<(), CoreError> {
    let counts = [
        ("impressions", input.impressions),
        ("clicks", input.clicks),
        ("conversions", input.conversions),
    ];
    for (name, value) in counts {
        if let Some(v) = value {
            if v < 0 {
                return Err(CoreError::Validation(format!(
                    "{name} must be non-negative (got {v})"
                )));
            }
        }
    }

    let amounts = [
        ("spend", input.spend),
        ("conversion_rate", input.conversion_rate),
        ("ctr", input.ctr),
        ("cpc", input.cpc),
        ("cpm", input.cpm),
    ];
    for (name, value) in amounts {
        if let Some(v) = value {
            if !v.is_finite() || v < 0.0 {
                return Err(CoreError::Validation(format!(
                    "{name} must be a non-negative number (got {v})"
                )));
            }
        }
    }

    if let (Some(impressions), Some(clicks)) = (input.impressions, input.clicks) {
        if clicks > impressions {
            return Err(CoreError::Validation(format!(
                "clicks ({clicks}) cannot exceed impressions ({impressions})"
            )));
        }
    }

    Ok(())
}

/// Fill in rates the caller left out. Supplied values are never overwritten.
pub fn derive_rates(mut input: PerformanceInput) -> PerformanceInput {
    let impressions = input.impressions.filter(|n| *n > 0).map(|n| n as f64);
    let clicks = input.clicks.filter(|n| *n > 0).map(|n| n as f64);

    if input.ctr.is_none() {
        if let (Some(c), Some(i)) = (input.clicks, impressions) {
            input.ctr = Some(c as f64 / i * 100.0);
        }
    }
    if input.cpc.is_none() {
        if let (Some(s), Some(c)) = (input.spend, clicks) {
            input.cpc = Some(s / c);
        }
    }
    if input.cpm.is_none() {
        if let (Some(s), Some(i)) = (input.spend, impressions) {
            input.cpm = Some(s / i * 1000.0);
        }
    }
    if input.conversion_rate.is_none() {
        if let (Some(conv), Some(c)) = (input.conversions, clicks) {
            input.conversion_rate = Some(conv as f64 / c * 100.0);
        }
    }
    input
}

/// Recorded results for one variation, as listed in review prompts.
#[derive(Debug, Clone, PartialEq)]
pub struct PerformanceLine {
    pub headline: String,
    pub metrics: PerformanceInput,
}

impl PerformanceLine {
    /// One-line summary, omitting unknown values.
    pub fn describe(&self) -> String {
        let m = &self.metrics;
        let mut parts = Vec::new();
        if let Some(v) = m.impressions {
            parts.push(format!("impressions {v}"));
        }
        if let Some(v) = m.clicks {
            parts.push(format!("clicks {v}"));
        }
        if let Some(v) = m.spend {
            parts.push(format!("spend ${v:.2}"));
        }
        if let Some(v) = m.conversions {
            parts.push(format!("conversions {v}"));
        }
        if let Some(v) = m.ctr {
            parts.push(format!("CTR {v:.2}%"));
        }
        if let Some(v) = m.cpc {
            parts.push(format!("CPC ${v:.2}"));
        }
        if let Some(v) = m.cpm {
            parts.push(format!("CPM ${v:.2}"));
        }
        if let Some(v) = m.conversion_rate {
            parts.push(format!("conversion rate {v:.2}%"));
        }
        if parts.is_empty() {
            return format!("\"{}\": no results recorded", self.headline);
        }
        format!("\"{}\": {}", self.headline, parts.join(", "))
    }
}
