use std::sync::Arc;

use adsage_payments::PaymentsClient;

use crate::advisor::AnalysisAdvisor;
use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: adsage_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Runs conversation turns against the completion provider.
    pub advisor: Arc<AnalysisAdvisor>,
    /// Payments provider client (customers, checkout).
    pub payments: Arc<PaymentsClient>,
}
