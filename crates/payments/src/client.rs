//! REST client for the payments provider.
//!
//! Requests are form-encoded with bracketed keys for nested fields
//! (`line_items[0][price_data][currency]=usd`), authenticated with the
//! secret key as a bearer token.

use std::time::Duration;

use serde::Deserialize;

use adsage_core::billing::{plan_display_name, CURRENCY};
use adsage_core::types::DbId;

use crate::config::PaymentsConfig;

/// A customer record at the provider.
#[derive(Debug, Clone, Deserialize)]
pub struct Customer {
    pub id: String,
}

/// A hosted checkout session.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutSession {
    pub id: String,
    #[serde(default)]
    pub url: Option<String>,
}

/// Errors from the payments API layer.
#[derive(Debug, thiserror::Error)]
pub enum PaymentsError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The provider returned a non-2xx status code.
    #[error("Payments API error ({status}): {body}")]
    Api { status: u16, body: String },
}

/// HTTP client for the payments provider.
pub struct PaymentsClient {
    client: reqwest::Client,
    config: PaymentsConfig,
}

impl PaymentsClient {
    pub fn new(config: PaymentsConfig) -> Result<Self, PaymentsError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &PaymentsConfig {
        &self.config
    }

    /// Create a customer tagged with the local user id.
    pub async fn create_customer(
        &self,
        email: Option<&str>,
        name: Option<&str>,
        user_id: DbId,
    ) -> Result<Customer, PaymentsError> {
        let mut form: Vec<(String, String)> =
            vec![("metadata[user_id]".into(), user_id.to_string())];
        if let Some(email) = email {
            form.push(("email".into(), email.to_string()));
        }
        if let Some(name) = name {
            form.push(("name".into(), name.to_string()));
        }
        self.post_form("customers", &form).await
    }

    /// Create a monthly subscription checkout for one plan.
    ///
    /// The plan id is copied into the subscription metadata so webhook
    /// events can recover it when the price carries no lookup key.
    pub async fn create_checkout_session(
        &self,
        customer_id: &str,
        plan_id: &str,
        unit_amount_cents: i64,
        user_id: DbId,
    ) -> Result<CheckoutSession, PaymentsError> {
        let form: Vec<(String, String)> = vec![
            ("customer".into(), customer_id.to_string()),
            ("mode".into(), "subscription".into()),
            ("payment_method_types[0]".into(), "card".into()),
            ("line_items[0][quantity]".into(), "1".into()),
            ("line_items[0][price_data][currency]".into(), CURRENCY.into()),
            (
                "line_items[0][price_data][unit_amount]".into(),
                unit_amount_cents.to_string(),
            ),
            (
                "line_items[0][price_data][recurring][interval]".into(),
                "month".into(),
            ),
            (
                "line_items[0][price_data][product_data][name]".into(),
                plan_display_name(plan_id),
            ),
            ("success_url".into(), self.config.success_url()),
            ("cancel_url".into(), self.config.cancel_url()),
            ("metadata[plan_id]".into(), plan_id.to_string()),
            ("metadata[user_id]".into(), user_id.to_string()),
            (
                "subscription_data[metadata][plan_id]".into(),
                plan_id.to_string(),
            ),
        ];
        self.post_form("checkout/sessions", &form).await
    }

    // ---- private helpers ----

    async fn post_form<T: serde::de::DeserializeOwned>(
        &self,
        endpoint: &str,
        form: &[(String, String)],
    ) -> Result<T, PaymentsError> {
        let response = self
            .client
            .post(format!("{}/{endpoint}", self.config.api_url))
            .bearer_auth(&self.config.secret_key)
            .form(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(PaymentsError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response.json::<T>().await?)
    }
}
