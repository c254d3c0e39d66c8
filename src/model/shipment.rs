//! Shipment record, its lifecycle events, and the commands that mutate it.
//!
//! The shipment owns its event list. `status` is always derived from the
//! last event; nothing else is allowed to set it directly.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle checkpoint vocabulary. Wire form is snake_case
/// ("picked_up", "in_transit", ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventStatus {
    Pending,
    PickedUp,
    InTransit,
    OutForDelivery,
    Failed,
    Delivered,
}

impl EventStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventStatus::Pending => "pending",
            EventStatus::PickedUp => "picked_up",
            EventStatus::InTransit => "in_transit",
            EventStatus::OutForDelivery => "out_for_delivery",
            EventStatus::Failed => "failed",
            EventStatus::Delivered => "delivered",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "pending" => EventStatus::Pending,
            "picked_up" => EventStatus::PickedUp,
            "in_transit" => EventStatus::InTransit,
            "out_for_delivery" => EventStatus::OutForDelivery,
            "failed" => EventStatus::Failed,
            "delivered" => EventStatus::Delivered,
            _ => return None,
        })
    }

    /// All statuses, in lifecycle order. Used by the analytics
    /// distribution so every bucket appears even when empty.
    pub fn all() -> [EventStatus; 6] {
        [
            EventStatus::Pending,
            EventStatus::PickedUp,
            EventStatus::InTransit,
            EventStatus::OutForDelivery,
            EventStatus::Failed,
            EventStatus::Delivered,
        ]
    }
}

impl std::fmt::Display for EventStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceType {
    #[default]
    Standard,
    Express,
    Overnight,
}

impl ServiceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceType::Standard => "standard",
            ServiceType::Express => "express",
            ServiceType::Overnight => "overnight",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "standard" => ServiceType::Standard,
            "express" => ServiceType::Express,
            "overnight" => ServiceType::Overnight,
            _ => return None,
        })
    }

    /// Promised delivery window used when the caller does not supply an
    /// estimate.
    pub fn delivery_days(&self) -> i64 {
        match self {
            ServiceType::Standard => 3,
            ServiceType::Express => 2,
            ServiceType::Overnight => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Dimensions {
    pub length: f64,
    pub width: f64,
    pub height: f64,
}

/// A timestamped status checkpoint. Belongs to exactly one shipment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub status: EventStatus,
    pub location: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shipment {
    pub id: String,
    pub tracking_number: String,
    pub sender_name: String,
    pub sender_phone: Option<String>,
    pub sender_address: String,
    pub receiver_name: String,
    pub receiver_phone: Option<String>,
    pub receiver_address: String,
    pub package_details: String,
    pub weight: f64,
    pub dimensions: Dimensions,
    pub service_type: ServiceType,
    pub cost: f64,
    /// Always equals `events.last().status`; see the lifecycle service.
    pub status: EventStatus,
    pub pickup_date: Option<DateTime<Utc>>,
    pub estimated_delivery: Option<DateTime<Utc>>,
    pub actual_delivery: Option<DateTime<Utc>>,
    pub route: Option<String>,
    pub hub_id: Option<String>,
    pub events: Vec<Event>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create command. A non-empty `events` list is taken as a pre-supplied
/// history (bulk seeding); otherwise a single pending event is synthesized.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewShipment {
    pub sender_name: String,
    #[serde(default)]
    pub sender_phone: Option<String>,
    pub sender_address: String,
    pub receiver_name: String,
    #[serde(default)]
    pub receiver_phone: Option<String>,
    pub receiver_address: String,
    pub package_details: String,
    pub weight: f64,
    pub dimensions: Dimensions,
    #[serde(default)]
    pub service_type: ServiceType,
    pub cost: f64,
    #[serde(default)]
    pub pickup_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub estimated_delivery: Option<DateTime<Utc>>,
    #[serde(default)]
    pub actual_delivery: Option<DateTime<Utc>>,
    #[serde(default)]
    pub route: Option<String>,
    #[serde(default)]
    pub hub_id: Option<String>,
    #[serde(default)]
    pub events: Vec<Event>,
}

/// Partial update command. Fields are enumerated; unknown keys are
/// rejected rather than silently dropped. `status` is the low-level
/// escape hatch: it is applied by appending an override event so the
/// status/events invariant keeps holding.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ShipmentUpdate {
    pub sender_name: Option<String>,
    pub sender_phone: Option<String>,
    pub sender_address: Option<String>,
    pub receiver_name: Option<String>,
    pub receiver_phone: Option<String>,
    pub receiver_address: Option<String>,
    pub package_details: Option<String>,
    pub weight: Option<f64>,
    pub dimensions: Option<Dimensions>,
    pub service_type: Option<ServiceType>,
    pub cost: Option<f64>,
    pub status: Option<EventStatus>,
    pub pickup_date: Option<DateTime<Utc>>,
    pub estimated_delivery: Option<DateTime<Utc>>,
    pub actual_delivery: Option<DateTime<Utc>>,
    pub route: Option<String>,
    pub hub_id: Option<String>,
}

impl ShipmentUpdate {
    pub fn is_empty(&self) -> bool {
        self.sender_name.is_none()
            && self.sender_phone.is_none()
            && self.sender_address.is_none()
            && self.receiver_name.is_none()
            && self.receiver_phone.is_none()
            && self.receiver_address.is_none()
            && self.package_details.is_none()
            && self.weight.is_none()
            && self.dimensions.is_none()
            && self.service_type.is_none()
            && self.cost.is_none()
            && self.status.is_none()
            && self.pickup_date.is_none()
            && self.estimated_delivery.is_none()
            && self.actual_delivery.is_none()
            && self.route.is_none()
            && self.hub_id.is_none()
    }
}

/// Append-event command for `POST /api/shipments/{id}/events`.
/// Location/description default from the status when omitted.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewEvent {
    pub status: EventStatus,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_status_wire_names_round_trip() {
        for status in EventStatus::all() {
            assert_eq!(EventStatus::parse(status.as_str()), Some(status));
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{}\"", status.as_str()));
        }
    }

    #[test]
    fn shipment_update_rejects_unknown_fields() {
        let err = serde_json::from_str::<ShipmentUpdate>(r#"{"trackingNumber": "BC1"}"#);
        assert!(err.is_err());
    }

    #[test]
    fn service_type_defaults_to_standard() {
        assert_eq!(ServiceType::default(), ServiceType::Standard);
        assert_eq!(ServiceType::Standard.delivery_days(), 3);
        assert_eq!(ServiceType::Overnight.delivery_days(), 1);
    }
}
