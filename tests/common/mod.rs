//! Shared plumbing for API tests: an app wired to the in-memory backend
//! plus request/response helpers.

#![allow(dead_code)]

use axum::body::Body;
use axum::http::Request;
use axum::response::Response;
use axum::Router;
use bluecart::{api_routes, common_routes, AppState, Stores};
use serde_json::Value;
use tower::ServiceExt;

pub fn app() -> Router {
    let state = AppState { stores: Stores::memory() };
    Router::new().merge(common_routes()).nest("/api", api_routes(state))
}

pub async fn send(app: &Router, method: &str, uri: &str) -> Response {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.clone().oneshot(request).await.expect("request failed")
}

pub async fn send_json(app: &Router, method: &str, uri: &str, body: Value) -> Response {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.clone().oneshot(request).await.expect("request failed")
}

pub async fn read_json(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("failed to read body");
    serde_json::from_slice(&bytes).expect("body should be valid JSON")
}

pub fn shipment_payload(cost: f64) -> Value {
    serde_json::json!({
        "senderName": "Tech Solutions Pvt Ltd",
        "senderAddress": "Mumbai, Maharashtra",
        "receiverName": "Global Electronics",
        "receiverAddress": "Bangalore, Karnataka",
        "packageDetails": "Electronics - Fragile packaging",
        "weight": 3.2,
        "dimensions": { "length": 30.0, "width": 20.0, "height": 10.0 },
        "serviceType": "standard",
        "cost": cost
    })
}

pub fn hub_payload(code: &str) -> Value {
    serde_json::json!({
        "name": "Mumbai Central Hub",
        "code": code,
        "address": "Andheri East, Mumbai",
        "city": "Mumbai",
        "state": "Maharashtra",
        "pincode": "400001",
        "phone": "+91-22-12345678",
        "manager": "Asha Verma",
        "capacity": 500
    })
}
