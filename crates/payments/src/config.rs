use adsage_core::billing::DEFAULT_SIGNATURE_TOLERANCE_SECS;

/// Payments provider configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct PaymentsConfig {
    /// Base URL of the provider API (default: `https://api.stripe.com/v1`).
    pub api_url: String,
    /// Secret API key sent as a bearer token.
    pub secret_key: String,
    /// Shared secret for webhook signatures.
    pub webhook_secret: String,
    /// Accepted clock skew for signed webhook timestamps.
    pub signature_tolerance_secs: i64,
    /// Public URL of the web app; checkout redirects land here.
    pub app_url: String,
    /// Per-request timeout in seconds (default: `30`).
    pub timeout_secs: u64,
}

impl PaymentsConfig {
    /// Load configuration from environment variables.
    ///
    /// | Env Var                             | Default                     |
    /// |-------------------------------------|-----------------------------|
    /// | `PAYMENTS_API_URL`                  | `https://api.stripe.com/v1` |
    /// | `PAYMENTS_SECRET_KEY`               | required                    |
    /// | `PAYMENTS_WEBHOOK_SECRET`           | required                    |
    /// | `PAYMENTS_SIGNATURE_TOLERANCE_SECS` | `300`                       |
    /// | `PAYMENTS_TIMEOUT_SECS`             | `30`                        |
    /// | `APP_URL`                           | `http://localhost:5173`     |
    pub fn from_env() -> Self {
        let api_url = std::env::var("PAYMENTS_API_URL")
            .unwrap_or_else(|_| "https://api.stripe.com/v1".into())
            .trim_end_matches('/')
            .to_string();

        let secret_key =
            std::env::var("PAYMENTS_SECRET_KEY").expect("PAYMENTS_SECRET_KEY must be set");

        let webhook_secret =
            std::env::var("PAYMENTS_WEBHOOK_SECRET").expect("PAYMENTS_WEBHOOK_SECRET must be set");

        let signature_tolerance_secs: i64 = std::env::var("PAYMENTS_SIGNATURE_TOLERANCE_SECS")
            .unwrap_or_else(|_| DEFAULT_SIGNATURE_TOLERANCE_SECS.to_string())
            .parse()
            .expect("PAYMENTS_SIGNATURE_TOLERANCE_SECS must be a valid i64");

        let timeout_secs: u64 = std::env::var("PAYMENTS_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("PAYMENTS_TIMEOUT_SECS must be a valid u64");

        let app_url = std::env::var("APP_URL")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .trim_end_matches('/')
            .to_string();

        Self {
            api_url,
            secret_key,
            webhook_secret,
            signature_tolerance_secs,
            app_url,
            timeout_secs,
        }
    }

    /// Where checkout sends the user after paying.
    pub fn success_url(&self) -> String {
        format!("{}/dashboard?success=true", self.app_url)
    }

    /// Where checkout sends the user after backing out.
    pub fn cancel_url(&self) -> String {
        format!("{}/pricing?canceled=true", self.app_url)
    }
}
