//! Shipment lifecycle rules. Everything here is a pure transformation so
//! both store backends apply the exact same semantics under their own
//! locking/transaction boundaries.
//!
//! Single source of truth: `status` is derived from the last event. The
//! only way to move it is to append an event; a `status` field in an
//! update command is translated into an override event here.

use crate::error::AppError;
use crate::ids;
use crate::model::{Event, EventStatus, NewEvent, NewShipment, Shipment, ShipmentUpdate};
use chrono::{DateTime, Duration, Utc};

pub fn default_location(status: EventStatus) -> &'static str {
    match status {
        EventStatus::Pending => "Origin Hub",
        EventStatus::PickedUp | EventStatus::InTransit => "Transit Hub",
        EventStatus::OutForDelivery | EventStatus::Failed => "Local Delivery Hub",
        EventStatus::Delivered => "Destination",
    }
}

pub fn default_description(status: EventStatus) -> &'static str {
    match status {
        EventStatus::Pending => "Shipment created and pending pickup",
        EventStatus::PickedUp => "Package picked up from sender",
        EventStatus::InTransit => "Package in transit",
        EventStatus::OutForDelivery => "Package out for delivery to recipient",
        EventStatus::Failed => "Delivery attempt failed",
        EventStatus::Delivered => "Package successfully delivered to recipient",
    }
}

/// The single seed event every shipment starts with when no history is
/// supplied.
pub fn seed_event(now: DateTime<Utc>) -> Event {
    Event {
        id: ids::event_id(),
        timestamp: now,
        status: EventStatus::Pending,
        location: default_location(EventStatus::Pending).into(),
        description: default_description(EventStatus::Pending).into(),
    }
}

/// Construct a full shipment record from a validated create command.
/// A caller-supplied non-empty event list is taken as-is and `status`
/// derives from its last element; otherwise one pending event is seeded.
pub fn build_shipment(input: NewShipment, now: DateTime<Utc>) -> Shipment {
    let events = if input.events.is_empty() {
        vec![seed_event(now)]
    } else {
        input.events
    };
    // events is non-empty from here on; the invariant holds for the life
    // of the record.
    let last = &events[events.len() - 1];
    let status = last.status;
    let actual_delivery = input.actual_delivery.or(if status == EventStatus::Delivered {
        Some(last.timestamp)
    } else {
        None
    });
    let estimated_delivery = input
        .estimated_delivery
        .unwrap_or(now + Duration::days(input.service_type.delivery_days()));

    Shipment {
        id: ids::shipment_id(),
        tracking_number: ids::tracking_number(),
        sender_name: input.sender_name,
        sender_phone: input.sender_phone,
        sender_address: input.sender_address,
        receiver_name: input.receiver_name,
        receiver_phone: input.receiver_phone,
        receiver_address: input.receiver_address,
        package_details: input.package_details,
        weight: input.weight,
        dimensions: input.dimensions,
        service_type: input.service_type,
        cost: input.cost,
        status,
        pickup_date: input.pickup_date,
        estimated_delivery: Some(estimated_delivery),
        actual_delivery,
        route: input.route,
        hub_id: input.hub_id,
        events,
        created_at: now,
        updated_at: now,
    }
}

/// Materialize an append command into a concrete event. Timestamp
/// defaults to now but never moves behind the shipment's last event.
pub fn resolve_event(shipment: &Shipment, input: NewEvent, now: DateTime<Utc>) -> Event {
    let floor = shipment.events.last().map(|e| e.timestamp).unwrap_or(now);
    let timestamp = input.timestamp.unwrap_or(now).max(floor);
    Event {
        id: ids::event_id(),
        timestamp,
        status: input.status,
        location: input.location.unwrap_or_else(|| default_location(input.status).into()),
        description: input
            .description
            .unwrap_or_else(|| default_description(input.status).into()),
    }
}

/// Append an event and recompute the derived fields atomically (callers
/// hold the store lock or transaction).
pub fn apply_event(shipment: &mut Shipment, event: Event, now: DateTime<Utc>) -> Result<(), AppError> {
    if let Some(last) = shipment.events.last() {
        if event.timestamp < last.timestamp {
            return Err(AppError::Validation(
                "event timestamp must not precede the last recorded event".into(),
            ));
        }
    }
    shipment.status = event.status;
    if event.status == EventStatus::Delivered {
        shipment.actual_delivery = Some(event.timestamp);
    }
    shipment.events.push(event);
    shipment.updated_at = now;
    Ok(())
}

/// Apply a partial update. Provided fields overwrite; `status` goes
/// through the event path so the status/events invariant keeps holding.
pub fn apply_update(
    shipment: &mut Shipment,
    update: ShipmentUpdate,
    now: DateTime<Utc>,
) -> Result<(), AppError> {
    if let Some(v) = update.sender_name {
        shipment.sender_name = v;
    }
    if let Some(v) = update.sender_phone {
        shipment.sender_phone = Some(v);
    }
    if let Some(v) = update.sender_address {
        shipment.sender_address = v;
    }
    if let Some(v) = update.receiver_name {
        shipment.receiver_name = v;
    }
    if let Some(v) = update.receiver_phone {
        shipment.receiver_phone = Some(v);
    }
    if let Some(v) = update.receiver_address {
        shipment.receiver_address = v;
    }
    if let Some(v) = update.package_details {
        shipment.package_details = v;
    }
    if let Some(v) = update.weight {
        shipment.weight = v;
    }
    if let Some(v) = update.dimensions {
        shipment.dimensions = v;
    }
    if let Some(v) = update.service_type {
        shipment.service_type = v;
    }
    if let Some(v) = update.cost {
        shipment.cost = v;
    }
    if let Some(v) = update.pickup_date {
        shipment.pickup_date = Some(v);
    }
    if let Some(v) = update.estimated_delivery {
        shipment.estimated_delivery = Some(v);
    }
    if let Some(v) = update.actual_delivery {
        shipment.actual_delivery = Some(v);
    }
    if let Some(v) = update.route {
        shipment.route = Some(v);
    }
    if let Some(v) = update.hub_id {
        shipment.hub_id = Some(v);
    }
    if let Some(status) = update.status {
        if status != shipment.status {
            let event = resolve_event(
                shipment,
                NewEvent {
                    status,
                    location: Some("Status update".into()),
                    description: Some(format!("Status manually set to {}", status)),
                    timestamp: None,
                },
                now,
            );
            apply_event(shipment, event, now)?;
        }
    }
    shipment.updated_at = now;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Dimensions, ServiceType};

    fn input() -> NewShipment {
        NewShipment {
            sender_name: "Fashion Hub".into(),
            sender_phone: Some("+91-11-98765433".into()),
            sender_address: "Delhi, Delhi".into(),
            receiver_name: "Style Store".into(),
            receiver_phone: None,
            receiver_address: "Mumbai, Maharashtra".into(),
            package_details: "Textiles - Standard packaging".into(),
            weight: 1.8,
            dimensions: Dimensions { length: 40.0, width: 30.0, height: 15.0 },
            service_type: ServiceType::Express,
            cost: 420.0,
            pickup_date: None,
            estimated_delivery: None,
            actual_delivery: None,
            route: None,
            hub_id: None,
            events: Vec::new(),
        }
    }

    fn history(now: DateTime<Utc>) -> Vec<Event> {
        [EventStatus::Pending, EventStatus::PickedUp, EventStatus::Delivered]
            .into_iter()
            .enumerate()
            .map(|(i, status)| Event {
                id: format!("EV{}", i),
                timestamp: now + Duration::hours(i as i64 * 6),
                status,
                location: default_location(status).into(),
                description: default_description(status).into(),
            })
            .collect()
    }

    #[test]
    fn create_seeds_single_pending_event() {
        let now = Utc::now();
        let s = build_shipment(input(), now);
        assert_eq!(s.events.len(), 1);
        assert_eq!(s.status, EventStatus::Pending);
        assert_eq!(s.status, s.events.last().unwrap().status);
        assert!(s.tracking_number.starts_with("BC"));
        assert_eq!(s.estimated_delivery, Some(now + Duration::days(2)));
    }

    #[test]
    fn create_with_history_derives_status_from_last_event() {
        let now = Utc::now();
        let mut cmd = input();
        cmd.events = history(now - Duration::days(3));
        let s = build_shipment(cmd, now);
        assert_eq!(s.events.len(), 3);
        assert_eq!(s.status, EventStatus::Delivered);
        // actual delivery falls out of the delivered event
        assert_eq!(s.actual_delivery, Some(s.events.last().unwrap().timestamp));
    }

    #[test]
    fn append_event_recomputes_status() {
        let now = Utc::now();
        let mut s = build_shipment(input(), now);
        let event = resolve_event(
            &s,
            NewEvent {
                status: EventStatus::PickedUp,
                location: None,
                description: None,
                timestamp: None,
            },
            now + Duration::hours(4),
        );
        apply_event(&mut s, event, now + Duration::hours(4)).unwrap();
        assert_eq!(s.status, EventStatus::PickedUp);
        assert_eq!(s.events.len(), 2);
    }

    #[test]
    fn append_event_rejects_backdated_timestamp() {
        let now = Utc::now();
        let mut s = build_shipment(input(), now);
        let event = Event {
            id: "EVX".into(),
            timestamp: now - Duration::hours(1),
            status: EventStatus::PickedUp,
            location: "Transit Hub".into(),
            description: "picked up".into(),
        };
        assert!(apply_event(&mut s, event, now).is_err());
        assert_eq!(s.status, EventStatus::Pending);
        assert_eq!(s.events.len(), 1);
    }

    #[test]
    fn status_update_appends_override_event() {
        let now = Utc::now();
        let mut s = build_shipment(input(), now);
        let update = ShipmentUpdate {
            status: Some(EventStatus::Delivered),
            ..ShipmentUpdate::default()
        };
        apply_update(&mut s, update, now + Duration::hours(1)).unwrap();
        assert_eq!(s.status, EventStatus::Delivered);
        assert_eq!(s.events.len(), 2);
        assert_eq!(s.status, s.events.last().unwrap().status);
        assert!(s.actual_delivery.is_some());
        assert!(s.updated_at > s.created_at);
    }

    #[test]
    fn redundant_status_update_appends_nothing() {
        let now = Utc::now();
        let mut s = build_shipment(input(), now);
        let update = ShipmentUpdate {
            status: Some(EventStatus::Pending),
            ..ShipmentUpdate::default()
        };
        apply_update(&mut s, update, now + Duration::hours(1)).unwrap();
        assert_eq!(s.events.len(), 1);
    }
}
