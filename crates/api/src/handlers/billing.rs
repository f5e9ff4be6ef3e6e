//! Handlers for subscription billing: checkout, current plan, and the
//! payments provider's webhook.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;
use adsage_core::billing::{validate_plan, verify_signature};
use adsage_core::error::CoreError;
use adsage_db::models::subscription::{Subscription, UpsertSubscription};
use adsage_db::repositories::{SubscriptionRepo, UserRepo};
use adsage_payments::{EventKind, SubscriptionObject, WebhookEvent};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Header carrying the webhook signature (`t=<unix>,v1=<hex>`).
pub const SIGNATURE_HEADER: &str = "stripe-signature";

#[derive(Debug, Deserialize)]
pub struct CheckoutRequest {
    pub plan_id: String,
}

#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    pub session_id: String,
    pub url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SubscriptionView {
    pub plan_id: String,
    pub subscription: Option<Subscription>,
}

// ---------------------------------------------------------------------------
// Checkout
// ---------------------------------------------------------------------------

/// POST /api/v1/billing/checkout
///
/// Creates a provider customer on first use, then a monthly subscription
/// checkout for the requested plan.
pub async fn create_checkout(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CheckoutRequest>,
) -> AppResult<impl IntoResponse> {
    let unit_amount = validate_plan(&input.plan_id)?;

    let user = UserRepo::find_by_id(&state.pool, auth.user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: auth.user_id,
        }))?;

    let customer_id = match user.payments_customer_id {
        Some(id) => id,
        None => {
            let customer = state
                .payments
                .create_customer(user.email.as_deref(), user.name.as_deref(), user.id)
                .await?;
            UserRepo::set_customer_id(&state.pool, user.id, &customer.id).await?;
            tracing::info!(user_id = user.id, customer_id = %customer.id, "Payments customer created");
            customer.id
        }
    };

    let checkout = state
        .payments
        .create_checkout_session(&customer_id, &input.plan_id, unit_amount, user.id)
        .await?;

    tracing::info!(
        user_id = user.id,
        plan_id = %input.plan_id,
        checkout_id = %checkout.id,
        "Checkout session created",
    );

    Ok(Json(DataResponse {
        data: CheckoutResponse {
            session_id: checkout.id,
            url: checkout.url,
        },
    }))
}

/// GET /api/v1/billing/subscription
pub async fn get_subscription(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let user = UserRepo::find_by_id(&state.pool, auth.user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: auth.user_id,
        }))?;
    let subscription = SubscriptionRepo::find_latest_for_user(&state.pool, user.id).await?;

    Ok(Json(DataResponse {
        data: SubscriptionView {
            plan_id: user.plan_id,
            subscription,
        },
    }))
}

// ---------------------------------------------------------------------------
// Webhook
// ---------------------------------------------------------------------------

/// POST /api/v1/billing/webhook
///
/// Public endpoint authenticated by the payload signature. Events for
/// unknown customers and event types the backend does not handle are
/// acknowledged so the provider stops retrying them.
pub async fn webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<impl IntoResponse> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::BadRequest("No signature".into()))?;

    let payments = &state.config.payments;
    verify_signature(
        &body,
        signature,
        &payments.webhook_secret,
        payments.signature_tolerance_secs,
        chrono::Utc::now().timestamp(),
    )
    .map_err(|e| {
        tracing::warn!(error = %e, "Webhook signature rejected");
        AppError::BadRequest(format!("Invalid signature: {e}"))
    })?;

    let event: WebhookEvent = serde_json::from_slice(&body)
        .map_err(|e| AppError::BadRequest(format!("Invalid event payload: {e}")))?;
    let event_id = event.id.clone();
    let kind = event
        .kind()
        .map_err(|e| AppError::BadRequest(format!("Invalid event object: {e}")))?;

    match kind {
        EventKind::SubscriptionUpserted(subscription) => {
            upsert_subscription(&state, &event_id, &subscription).await?;
        }
        EventKind::SubscriptionDeleted(subscription) => {
            cancel_subscription(&state, &event_id, &subscription).await?;
        }
        EventKind::Other(event_type) => {
            tracing::info!(event_id = %event_id, event_type = %event_type, "Ignoring webhook event");
        }
    }

    Ok((StatusCode::OK, Json(json!({ "received": true }))))
}

async fn upsert_subscription(
    state: &AppState,
    event_id: &str,
    subscription: &SubscriptionObject,
) -> AppResult<()> {
    let Some(user) = UserRepo::find_by_customer_id(&state.pool, &subscription.customer).await?
    else {
        tracing::warn!(
            event_id,
            customer_id = %subscription.customer,
            "Webhook for unknown customer",
        );
        return Ok(());
    };

    let plan_id = subscription.plan_lookup_key();
    SubscriptionRepo::upsert_and_set_plan(
        &state.pool,
        &UpsertSubscription {
            user_id: user.id,
            payments_subscription_id: &subscription.id,
            plan_id: &plan_id,
            status: &subscription.status,
            current_period_start: subscription.period_start(),
            current_period_end: subscription.period_end(),
        },
    )
    .await?;

    tracing::info!(
        event_id,
        user_id = user.id,
        plan_id = %plan_id,
        status = %subscription.status,
        "Subscription updated",
    );
    Ok(())
}

async fn cancel_subscription(
    state: &AppState,
    event_id: &str,
    subscription: &SubscriptionObject,
) -> AppResult<()> {
    let Some(user) = UserRepo::find_by_customer_id(&state.pool, &subscription.customer).await?
    else {
        tracing::warn!(
            event_id,
            customer_id = %subscription.customer,
            "Webhook for unknown customer",
        );
        return Ok(());
    };

    let known = SubscriptionRepo::cancel_and_reset_plan(&state.pool, user.id, &subscription.id).await?;
    tracing::info!(
        event_id,
        user_id = user.id,
        subscription_id = %subscription.id,
        known,
        "Subscription canceled",
    );
    Ok(())
}
