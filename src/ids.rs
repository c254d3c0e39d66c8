//! Identifier synthesis. Internal ids carry an entity prefix plus a UUID
//! fragment; tracking numbers are the externally shown "BC" + 8 digits.

use rand::Rng;

fn fragment() -> String {
    let hex = uuid::Uuid::new_v4().simple().to_string();
    hex[..10].to_uppercase()
}

pub fn shipment_id() -> String {
    format!("SH{}", fragment())
}

pub fn hub_id() -> String {
    format!("HUB{}", fragment())
}

pub fn route_id() -> String {
    format!("RT{}", fragment())
}

pub fn user_id() -> String {
    format!("USR{}", fragment())
}

pub fn event_id() -> String {
    format!("EV{}", fragment())
}

/// Tracking numbers are short and digit-only so they survive phone and
/// label printing. Collisions are possible and handled by the stores.
pub fn tracking_number() -> String {
    let mut rng = rand::thread_rng();
    let digits: String = (0..8).map(|_| char::from(b'0' + rng.gen_range(0..10u8))).collect();
    format!("BC{}", digits)
}
