//! Webhook event payloads.

use chrono::{DateTime, TimeZone, Utc};
use serde::Deserialize;

use adsage_core::billing::FREE_PLAN;

/// Envelope of every webhook delivery.
#[derive(Debug, Deserialize)]
pub struct WebhookEvent {
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: EventData,
}

#[derive(Debug, Deserialize)]
pub struct EventData {
    pub object: serde_json::Value,
}

/// Events the backend reacts to.
#[derive(Debug)]
pub enum EventKind {
    SubscriptionUpserted(SubscriptionObject),
    SubscriptionDeleted(SubscriptionObject),
    Other(String),
}

impl WebhookEvent {
    /// Classify the event and decode its object where it matters.
    pub fn kind(self) -> Result<EventKind, serde_json::Error> {
        match self.event_type.as_str() {
            "customer.subscription.created" | "customer.subscription.updated" => {
                Ok(EventKind::SubscriptionUpserted(serde_json::from_value(self.data.object)?))
            }
            "customer.subscription.deleted" => {
                Ok(EventKind::SubscriptionDeleted(serde_json::from_value(self.data.object)?))
            }
            _ => Ok(EventKind::Other(self.event_type)),
        }
    }
}

/// The subscription object carried by `customer.subscription.*` events.
#[derive(Debug, Clone, Deserialize)]
pub struct SubscriptionObject {
    pub id: String,
    pub customer: String,
    pub status: String,
    #[serde(default)]
    pub current_period_start: Option<i64>,
    #[serde(default)]
    pub current_period_end: Option<i64>,
    #[serde(default)]
    pub items: SubscriptionItems,
    #[serde(default)]
    pub metadata: std::collections::HashMap<String, String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubscriptionItems {
    #[serde(default)]
    pub data: Vec<SubscriptionItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubscriptionItem {
    pub price: Price,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Price {
    #[serde(default)]
    pub lookup_key: Option<String>,
}

impl SubscriptionObject {
    /// Plan of the subscription: the first item's price lookup key, then the
    /// `plan_id` metadata set at checkout, then the free plan.
    pub fn plan_lookup_key(&self) -> String {
        self.items
            .data
            .first()
            .and_then(|item| item.price.lookup_key.clone())
            .filter(|key| !key.is_empty())
            .or_else(|| self.metadata.get("plan_id").cloned())
            .unwrap_or_else(|| FREE_PLAN.to_string())
    }

    pub fn period_start(&self) -> Option<DateTime<Utc>> {
        self.current_period_start
            .and_then(|secs| Utc.timestamp_opt(secs, 0).single())
    }

    pub fn period_end(&self) -> Option<DateTime<Utc>> {
        self.current_period_end
            .and_then(|secs| Utc.timestamp_opt(secs, 0).single())
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn event(event_type: &str, object: serde_json::Value) -> WebhookEvent {
        serde_json::from_value(serde_json::json!({
            "id": "evt_1",
            "type": event_type,
            "data": { "object": object }
        }))
        .unwrap()
    }

    fn subscription(lookup_key: serde_json::Value) -> serde_json::Value {
        serde_json::json!({
            "id": "sub_1",
            "customer": "cus_1",
            "status": "active",
            "current_period_start": 1_700_000_000,
            "current_period_end": 1_702_592_000,
            "items": { "data": [ { "price": { "lookup_key": lookup_key } } ] }
        })
    }

    #[test]
    fn created_and_updated_are_upserts() {
        for t in ["customer.subscription.created", "customer.subscription.updated"] {
            let kind = event(t, subscription("pro".into())).kind().unwrap();
            assert_matches!(kind, EventKind::SubscriptionUpserted(sub) if sub.plan_lookup_key() == "pro");
        }
    }

    #[test]
    fn deleted_is_recognised() {
        let kind = event("customer.subscription.deleted", subscription("pro".into()))
            .kind()
            .unwrap();
        assert_matches!(kind, EventKind::SubscriptionDeleted(sub) if sub.id == "sub_1");
    }

    #[test]
    fn other_events_pass_through() {
        let kind = event("invoice.paid", serde_json::json!({})).kind().unwrap();
        assert_matches!(kind, EventKind::Other(t) if t == "invoice.paid");
    }

    #[test]
    fn missing_lookup_key_falls_back_to_metadata_then_free() {
        let kind = event(
            "customer.subscription.updated",
            subscription(serde_json::Value::Null),
        )
        .kind()
        .unwrap();
        let EventKind::SubscriptionUpserted(mut sub) = kind else {
            panic!("expected upsert");
        };
        assert_eq!(sub.plan_lookup_key(), "free");

        sub.metadata.insert("plan_id".into(), "builder".into());
        assert_eq!(sub.plan_lookup_key(), "builder");
    }

    #[test]
    fn periods_are_converted_from_unix_seconds() {
        let EventKind::SubscriptionUpserted(sub) =
            event("customer.subscription.created", subscription("starter".into()))
                .kind()
                .unwrap()
        else {
            panic!("expected upsert");
        };
        assert_eq!(sub.period_start().unwrap().timestamp(), 1_700_000_000);
        assert!(sub.period_end().unwrap() > sub.period_start().unwrap());
    }
}
