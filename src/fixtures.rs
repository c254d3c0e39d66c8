//! Synthetic shipment generation for demos and load seeding. Each record
//! is drawn from a weighted journey template and gets a realistic event
//! timeline plus a tariff-style cost. All journeys end delivered; the
//! troubled templates differ in how long and bumpy the road is.

use crate::model::{Dimensions, Event, EventStatus, NewShipment, ServiceType};
use crate::service::lifecycle;
use crate::ids;
use chrono::{DateTime, Duration, Utc};
use rand::distributions::WeightedIndex;
use rand::prelude::*;

/// A journey shape: the status sequence a shipment walks through.
/// Repeated statuses model dwell (extra pendings before pickup, a
/// shipment sitting at successive transit hubs, re-attempted delivery
/// runs). Every journey eventually delivers.
pub struct Template {
    pub name: &'static str,
    pub weight: f64,
    pub statuses: &'static [EventStatus],
}

use EventStatus::*;

pub const TEMPLATES: &[Template] = &[
    Template {
        name: "smooth",
        weight: 0.60,
        statuses: &[Pending, PickedUp, InTransit, OutForDelivery, Delivered],
    },
    Template {
        name: "delayed_pickup",
        weight: 0.12,
        statuses: &[Pending, Pending, Pending, PickedUp, InTransit, OutForDelivery, Delivered],
    },
    Template {
        name: "hub_bottleneck",
        weight: 0.10,
        statuses: &[Pending, PickedUp, InTransit, InTransit, InTransit, OutForDelivery, Delivered],
    },
    Template {
        name: "delivery_issues",
        weight: 0.08,
        statuses: &[
            Pending, PickedUp, InTransit, OutForDelivery, OutForDelivery, OutForDelivery,
            Delivered,
        ],
    },
    Template {
        name: "failed_attempt",
        weight: 0.06,
        statuses: &[Pending, PickedUp, InTransit, OutForDelivery, Failed, OutForDelivery, Delivered],
    },
    Template {
        name: "multiple_failures",
        weight: 0.03,
        statuses: &[
            Pending, PickedUp, InTransit, OutForDelivery, Failed, OutForDelivery, Failed,
            OutForDelivery, Delivered,
        ],
    },
    Template {
        name: "stuck_in_transit",
        weight: 0.01,
        statuses: &[
            Pending, PickedUp, InTransit, InTransit, InTransit, InTransit, OutForDelivery,
            Delivered,
        ],
    },
];

const COMPANIES: &[&str] = &[
    "Tech Solutions Pvt Ltd",
    "Global Electronics",
    "Fashion Hub",
    "Style Store",
    "Mumbai Traders Co.",
    "Delhi Electronics Hub",
    "Book Palace",
    "Knowledge Center",
    "Spice Garden Exports",
    "Wellness Pharma",
    "Craftwood Furniture",
    "Sunrise Textiles",
];

const CITIES: &[(&str, &str)] = &[
    ("Mumbai", "Maharashtra"),
    ("Delhi", "Delhi"),
    ("Bangalore", "Karnataka"),
    ("Chennai", "Tamil Nadu"),
    ("Kolkata", "West Bengal"),
    ("Hyderabad", "Telangana"),
    ("Pune", "Maharashtra"),
    ("Ahmedabad", "Gujarat"),
    ("Jaipur", "Rajasthan"),
    ("Lucknow", "Uttar Pradesh"),
];

/// Contents, packaging, weight range in kg, and max footprint in cm.
struct PackageClass {
    contents: &'static str,
    packaging: &'static str,
    weight_kg: (f64, f64),
    max_dims_cm: (f64, f64, f64),
}

const PACKAGE_CLASSES: &[PackageClass] = &[
    PackageClass { contents: "Electronics", packaging: "Fragile packaging", weight_kg: (0.5, 15.0), max_dims_cm: (80.0, 60.0, 50.0) },
    PackageClass { contents: "Textiles", packaging: "Standard packaging", weight_kg: (0.5, 20.0), max_dims_cm: (60.0, 45.0, 40.0) },
    PackageClass { contents: "Documents", packaging: "Envelope", weight_kg: (0.1, 2.0), max_dims_cm: (35.0, 25.0, 5.0) },
    PackageClass { contents: "Pharmaceuticals", packaging: "Temperature controlled", weight_kg: (0.2, 10.0), max_dims_cm: (50.0, 40.0, 40.0) },
    PackageClass { contents: "Furniture", packaging: "Heavy goods crate", weight_kg: (8.0, 60.0), max_dims_cm: (200.0, 120.0, 100.0) },
    PackageClass { contents: "Books", packaging: "Standard packaging", weight_kg: (0.3, 12.0), max_dims_cm: (45.0, 35.0, 30.0) },
    PackageClass { contents: "Spices", packaging: "Sealed containers", weight_kg: (0.2, 25.0), max_dims_cm: (60.0, 40.0, 40.0) },
];

/// How long a shipment typically sits in a status, in hours.
fn dwell_hours(status: EventStatus) -> (f64, f64) {
    match status {
        Pending => (2.0, 24.0),
        PickedUp => (4.0, 12.0),
        InTransit => (6.0, 48.0),
        OutForDelivery => (2.0, 24.0),
        Failed => (8.0, 72.0),
        Delivered => (1.0, 6.0),
    }
}

/// Faster tiers move through every stage quicker.
fn tier_multiplier(service: ServiceType) -> f64 {
    match service {
        ServiceType::Standard => 1.0,
        ServiceType::Express => 0.6,
        ServiceType::Overnight => 0.3,
    }
}

fn base_charge(service: ServiceType) -> f64 {
    match service {
        ServiceType::Standard => 25.0,
        ServiceType::Express => 45.0,
        ServiceType::Overnight => 80.0,
    }
}

fn distance_rate(service: ServiceType) -> f64 {
    match service {
        ServiceType::Standard => 1.2,
        ServiceType::Express => 1.8,
        ServiceType::Overnight => 2.5,
    }
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Tariff: base + weight and distance components, then fuel surcharge
/// and tax.
pub fn estimate_cost(service: ServiceType, weight_kg: f64, distance_km: f64) -> f64 {
    let subtotal = base_charge(service) + weight_kg * 8.5 + distance_km * distance_rate(service);
    let with_fuel = subtotal * 1.12;
    round2(with_fuel * 1.18)
}

fn sample_template<R: Rng>(rng: &mut R) -> &'static Template {
    // Weights are fixed and nonzero, so the distribution always builds.
    match WeightedIndex::new(TEMPLATES.iter().map(|t| t.weight)) {
        Ok(dist) => &TEMPLATES[dist.sample(rng)],
        Err(_) => &TEMPLATES[0],
    }
}

fn sample_service<R: Rng>(rng: &mut R) -> ServiceType {
    match rng.gen_range(0..10) {
        0..=5 => ServiceType::Standard,
        6..=8 => ServiceType::Express,
        _ => ServiceType::Overnight,
    }
}

/// Event timeline for a template, starting at `start`. Dwell in each
/// status is sampled from its range, scaled by the service tier, with a
/// plus or minus thirty percent jitter and a half-hour floor.
fn build_events<R: Rng>(
    rng: &mut R,
    template: &Template,
    service: ServiceType,
    start: DateTime<Utc>,
) -> Vec<Event> {
    let mut events = Vec::with_capacity(template.statuses.len());
    let mut at = start;
    for (i, &status) in template.statuses.iter().enumerate() {
        if i > 0 {
            let prev = template.statuses[i - 1];
            let (lo, hi) = dwell_hours(prev);
            let base = rng.gen_range(lo..=hi) * tier_multiplier(service);
            let jitter = rng.gen_range(0.7..=1.3);
            let hours = (base * jitter).max(0.5);
            at += Duration::seconds((hours * 3600.0) as i64);
        }
        events.push(Event {
            id: ids::event_id(),
            timestamp: at,
            status,
            location: lifecycle::default_location(status).into(),
            description: lifecycle::default_description(status).into(),
        });
    }
    events
}

/// One synthetic create command, with its history pre-built so the final
/// status falls out of the template.
pub fn generate_shipment<R: Rng>(rng: &mut R, now: DateTime<Utc>) -> NewShipment {
    let template = sample_template(rng);
    let service = sample_service(rng);

    let origin = CITIES[rng.gen_range(0..CITIES.len())];
    let mut dest = CITIES[rng.gen_range(0..CITIES.len())];
    while dest.0 == origin.0 {
        dest = CITIES[rng.gen_range(0..CITIES.len())];
    }
    let distance_km = rng.gen_range(150.0..2200.0_f64).round();
    let class = &PACKAGE_CLASSES[rng.gen_range(0..PACKAGE_CLASSES.len())];
    let weight = round2(rng.gen_range(class.weight_kg.0..=class.weight_kg.1));
    let (max_l, max_w, max_h) = class.max_dims_cm;

    let start = now - Duration::hours(rng.gen_range(1..24 * 14));
    let events = build_events(rng, template, service, start);
    let pickup_date = events
        .iter()
        .find(|e| e.status == PickedUp)
        .map(|e| e.timestamp);

    NewShipment {
        sender_name: COMPANIES[rng.gen_range(0..COMPANIES.len())].into(),
        sender_phone: Some(format!("+91-{}-{:08}", rng.gen_range(11..100), rng.gen_range(0..100_000_000))),
        sender_address: format!("{}, {}", origin.0, origin.1),
        receiver_name: COMPANIES[rng.gen_range(0..COMPANIES.len())].into(),
        receiver_phone: Some(format!("+91-{}-{:08}", rng.gen_range(11..100), rng.gen_range(0..100_000_000))),
        receiver_address: format!("{}, {}", dest.0, dest.1),
        package_details: format!("{} - {}", class.contents, class.packaging),
        weight,
        dimensions: Dimensions {
            length: round2(rng.gen_range(max_l * 0.2..=max_l)),
            width: round2(rng.gen_range(max_w * 0.2..=max_w)),
            height: round2(rng.gen_range(max_h * 0.2..=max_h)),
        },
        service_type: service,
        cost: estimate_cost(service, weight, distance_km),
        pickup_date,
        estimated_delivery: None,
        actual_delivery: None,
        route: Some(format!("{} to {}", origin.0, dest.0)),
        hub_id: None,
        events,
    }
}

/// Batch generation for the seeding binary.
pub fn generate_batch<R: Rng>(rng: &mut R, count: usize, now: DateTime<Utc>) -> Vec<NewShipment> {
    (0..count).map(|_| generate_shipment(rng, now)).collect()
}
