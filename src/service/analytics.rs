//! Dashboard aggregation. A read-only projection over the current store
//! contents, recomputed in full on every request; no aggregate state is
//! persisted. O(N * window) over low thousands of records.

use crate::model::{EventStatus, Shipment};
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::collections::HashMap;

pub const TREND_WINDOW_DAYS: i64 = 7;

/// Dashboard display colors, keyed by status.
fn status_color(status: EventStatus) -> &'static str {
    match status {
        EventStatus::Pending => "#f59e0b",
        EventStatus::PickedUp => "#6366f1",
        EventStatus::InTransit => "#3b82f6",
        EventStatus::OutForDelivery => "#8b5cf6",
        EventStatus::Failed => "#ef4444",
        EventStatus::Delivered => "#10b981",
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TrendPoint {
    pub date: String,
    pub count: u64,
    pub delivered: u64,
    pub pending: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct RevenuePoint {
    pub date: String,
    pub revenue: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusSlice {
    pub status: EventStatus,
    pub count: u64,
    pub color: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct RouteCount {
    pub route: String,
    pub count: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardSummary {
    pub total_shipments: u64,
    pub total_hubs: u64,
    pub pending_shipments: u64,
    pub in_transit_shipments: u64,
    pub delivered_shipments: u64,
    pub failed_shipments: u64,
    pub total_revenue: f64,
    pub average_delivery_time: Option<f64>,
    pub top_routes: Vec<RouteCount>,
    pub status_distribution: Vec<StatusSlice>,
    pub shipment_trend: Vec<TrendPoint>,
    pub revenue_trend: Vec<RevenuePoint>,
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Full dashboard summary over a snapshot of the shipment collection.
pub fn summarize(shipments: &[Shipment], total_hubs: u64, now: DateTime<Utc>) -> DashboardSummary {
    let mut counts: HashMap<EventStatus, u64> = HashMap::new();
    let mut total_revenue = 0.0;
    for s in shipments {
        *counts.entry(s.status).or_insert(0) += 1;
        total_revenue += s.cost;
    }

    let status_distribution: Vec<StatusSlice> = EventStatus::all()
        .into_iter()
        .map(|status| StatusSlice {
            status,
            count: counts.get(&status).copied().unwrap_or(0),
            color: status_color(status),
        })
        .collect();

    let (shipment_trend, revenue_trend) = trend(shipments, TREND_WINDOW_DAYS, now);

    DashboardSummary {
        total_shipments: shipments.len() as u64,
        total_hubs,
        pending_shipments: counts.get(&EventStatus::Pending).copied().unwrap_or(0),
        in_transit_shipments: counts.get(&EventStatus::InTransit).copied().unwrap_or(0),
        delivered_shipments: counts.get(&EventStatus::Delivered).copied().unwrap_or(0),
        failed_shipments: counts.get(&EventStatus::Failed).copied().unwrap_or(0),
        total_revenue: round2(total_revenue),
        average_delivery_time: average_delivery_days(shipments),
        top_routes: top_routes(shipments, 5),
        status_distribution,
        shipment_trend,
        revenue_trend,
    }
}

/// Mean days between pickup and actual delivery over delivered shipments
/// carrying both timestamps; None when there are none.
fn average_delivery_days(shipments: &[Shipment]) -> Option<f64> {
    let mut total_days = 0i64;
    let mut count = 0u64;
    for s in shipments {
        if s.status != EventStatus::Delivered {
            continue;
        }
        if let (Some(pickup), Some(delivery)) = (s.pickup_date, s.actual_delivery) {
            total_days += (delivery - pickup).num_days();
            count += 1;
        }
    }
    if count == 0 {
        None
    } else {
        Some(total_days as f64 / count as f64)
    }
}

fn top_routes(shipments: &[Shipment], limit: usize) -> Vec<RouteCount> {
    let mut counts: HashMap<&str, u64> = HashMap::new();
    for s in shipments {
        if let Some(route) = s.route.as_deref() {
            *counts.entry(route).or_insert(0) += 1;
        }
    }
    let mut routes: Vec<RouteCount> = counts
        .into_iter()
        .map(|(route, count)| RouteCount { route: route.to_string(), count })
        .collect();
    routes.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.route.cmp(&b.route)));
    routes.truncate(limit);
    routes
}

/// Per-day buckets for the trailing window, oldest to newest. Bucketing
/// matches on the calendar-date prefix of the RFC 3339 creation
/// timestamp; no timezone normalization is applied.
pub fn trend(
    shipments: &[Shipment],
    window_days: i64,
    now: DateTime<Utc>,
) -> (Vec<TrendPoint>, Vec<RevenuePoint>) {
    let mut shipment_trend = Vec::with_capacity(window_days as usize);
    let mut revenue_trend = Vec::with_capacity(window_days as usize);
    for offset in (0..window_days).rev() {
        let day = (now - Duration::days(offset)).format("%Y-%m-%d").to_string();
        let mut count = 0u64;
        let mut delivered = 0u64;
        let mut pending = 0u64;
        let mut revenue = 0.0;
        for s in shipments {
            if !s.created_at.to_rfc3339().starts_with(&day) {
                continue;
            }
            count += 1;
            match s.status {
                EventStatus::Delivered => delivered += 1,
                EventStatus::Pending => pending += 1,
                _ => {}
            }
            revenue += s.cost;
        }
        shipment_trend.push(TrendPoint { date: day.clone(), count, delivered, pending });
        revenue_trend.push(RevenuePoint { date: day, revenue: round2(revenue) });
    }
    (shipment_trend, revenue_trend)
}
