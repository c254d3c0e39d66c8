//! Request validation. All checks are against typed commands; type and
//! enum errors are already rejected at deserialization.

use crate::error::AppError;
use crate::model::{Dimensions, Event, NewHub, NewRoute, NewShipment, NewUser};

fn require_non_empty(field: &str, value: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{} is required", field)));
    }
    Ok(())
}

fn require_positive(field: &str, value: f64) -> Result<(), AppError> {
    if !(value > 0.0) {
        return Err(AppError::Validation(format!("{} must be positive", field)));
    }
    Ok(())
}

fn validate_dimensions(d: &Dimensions) -> Result<(), AppError> {
    require_positive("dimensions.length", d.length)?;
    require_positive("dimensions.width", d.width)?;
    require_positive("dimensions.height", d.height)
}

/// Pre-supplied histories must be in timestamp order; the stored list is
/// append-only afterwards.
pub fn validate_event_order(events: &[Event]) -> Result<(), AppError> {
    for pair in events.windows(2) {
        if pair[1].timestamp < pair[0].timestamp {
            return Err(AppError::Validation(
                "events must be in non-decreasing timestamp order".into(),
            ));
        }
    }
    Ok(())
}

pub fn validate_new_shipment(input: &NewShipment) -> Result<(), AppError> {
    require_non_empty("senderName", &input.sender_name)?;
    require_non_empty("senderAddress", &input.sender_address)?;
    require_non_empty("receiverName", &input.receiver_name)?;
    require_non_empty("receiverAddress", &input.receiver_address)?;
    require_non_empty("packageDetails", &input.package_details)?;
    require_positive("weight", input.weight)?;
    require_positive("cost", input.cost)?;
    validate_dimensions(&input.dimensions)?;
    validate_event_order(&input.events)
}

pub fn validate_new_hub(input: &NewHub) -> Result<(), AppError> {
    require_non_empty("name", &input.name)?;
    require_non_empty("code", &input.code)?;
    require_non_empty("address", &input.address)?;
    require_non_empty("city", &input.city)?;
    require_non_empty("state", &input.state)?;
    require_non_empty("pincode", &input.pincode)?;
    require_non_empty("phone", &input.phone)?;
    require_non_empty("manager", &input.manager)?;
    if input.capacity <= 0 {
        return Err(AppError::Validation("capacity must be positive".into()));
    }
    Ok(())
}

pub fn validate_new_route(input: &NewRoute) -> Result<(), AppError> {
    require_non_empty("name", &input.name)?;
    require_non_empty("assignedTo", &input.assigned_to)?;
    require_non_empty("hubId", &input.hub_id)?;
    if let Some(d) = input.estimated_distance {
        require_positive("estimatedDistance", d)?;
    }
    Ok(())
}

pub fn validate_new_user(input: &NewUser) -> Result<(), AppError> {
    require_non_empty("name", &input.name)?;
    require_non_empty("email", &input.email)?;
    if !input.email.contains('@') || input.email.len() < 3 {
        return Err(AppError::Validation("email must be a valid email".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{EventStatus, ServiceType};
    use chrono::{Duration, Utc};

    fn shipment_input() -> NewShipment {
        NewShipment {
            sender_name: "Tech Solutions Pvt Ltd".into(),
            sender_phone: None,
            sender_address: "Mumbai, Maharashtra".into(),
            receiver_name: "Global Electronics".into(),
            receiver_phone: None,
            receiver_address: "Bangalore, Karnataka".into(),
            package_details: "Electronics - Fragile packaging".into(),
            weight: 3.2,
            dimensions: Dimensions { length: 30.0, width: 20.0, height: 10.0 },
            service_type: ServiceType::Standard,
            cost: 2500.0,
            pickup_date: None,
            estimated_delivery: None,
            actual_delivery: None,
            route: None,
            hub_id: None,
            events: Vec::new(),
        }
    }

    #[test]
    fn accepts_well_formed_input() {
        assert!(validate_new_shipment(&shipment_input()).is_ok());
    }

    #[test]
    fn rejects_non_positive_weight() {
        let mut input = shipment_input();
        input.weight = 0.0;
        assert!(matches!(validate_new_shipment(&input), Err(AppError::Validation(_))));
        input.weight = -1.5;
        assert!(matches!(validate_new_shipment(&input), Err(AppError::Validation(_))));
    }

    #[test]
    fn rejects_blank_required_fields() {
        let mut input = shipment_input();
        input.receiver_address = "   ".into();
        assert!(matches!(validate_new_shipment(&input), Err(AppError::Validation(_))));
    }

    #[test]
    fn rejects_out_of_order_events() {
        let now = Utc::now();
        let mut input = shipment_input();
        input.events = vec![
            Event {
                id: "EV1".into(),
                timestamp: now,
                status: EventStatus::Pending,
                location: "Origin Hub".into(),
                description: "created".into(),
            },
            Event {
                id: "EV2".into(),
                timestamp: now - Duration::hours(1),
                status: EventStatus::PickedUp,
                location: "Mumbai Central Hub".into(),
                description: "picked up".into(),
            },
        ];
        assert!(matches!(validate_new_shipment(&input), Err(AppError::Validation(_))));
    }
}
