//! Route: a planned path anchored at a hub, with the shipments assigned
//! to it. Hub/shipment links are soft string ids.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteStatus {
    #[default]
    Planned,
    InProgress,
    Completed,
    Cancelled,
}

impl RouteStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RouteStatus::Planned => "planned",
            RouteStatus::InProgress => "in_progress",
            RouteStatus::Completed => "completed",
            RouteStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "planned" => RouteStatus::Planned,
            "in_progress" => RouteStatus::InProgress,
            "completed" => RouteStatus::Completed,
            "cancelled" => RouteStatus::Cancelled,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Route {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub assigned_to: String,
    pub hub_id: String,
    pub shipment_ids: Vec<String>,
    pub estimated_distance: Option<f64>,
    pub estimated_time: Option<String>,
    pub status: RouteStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRoute {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub assigned_to: String,
    pub hub_id: String,
    #[serde(default)]
    pub shipment_ids: Vec<String>,
    #[serde(default)]
    pub estimated_distance: Option<f64>,
    #[serde(default)]
    pub estimated_time: Option<String>,
    #[serde(default)]
    pub status: RouteStatus,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RouteUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub assigned_to: Option<String>,
    pub hub_id: Option<String>,
    pub shipment_ids: Option<Vec<String>>,
    pub estimated_distance: Option<f64>,
    pub estimated_time: Option<String>,
    pub status: Option<RouteStatus>,
}
