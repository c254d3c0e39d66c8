//! Shipment API tests: creation, tracking lookup, lifecycle updates,
//! event appends, pagination, and validation failures.

mod common;

use axum::http::StatusCode;
use common::{app, read_json, send, send_json, shipment_payload};

#[tokio::test]
async fn create_returns_tracking_number_and_seed_event() {
    let app = app();
    let response = send_json(&app, "POST", "/api/shipments", shipment_payload(2500.0)).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = read_json(response).await;
    assert!(body["id"].as_str().unwrap().starts_with("SH"));
    let tracking = body["trackingNumber"].as_str().unwrap();
    assert!(tracking.starts_with("BC"));
    assert_eq!(tracking.len(), 10);
    assert_eq!(body["status"], "pending");
    assert_eq!(body["events"].as_array().unwrap().len(), 1);
    assert_eq!(body["events"][0]["status"], "pending");
    assert!(body["estimatedDelivery"].is_string());
}

#[tokio::test]
async fn get_accepts_id_or_tracking_number() {
    let app = app();
    let created = read_json(send_json(&app, "POST", "/api/shipments", shipment_payload(100.0)).await).await;
    let id = created["id"].as_str().unwrap();
    let tracking = created["trackingNumber"].as_str().unwrap();

    let by_id = send(&app, "GET", &format!("/api/shipments/{}", id)).await;
    assert_eq!(by_id.status(), StatusCode::OK);

    let by_tracking = send(&app, "GET", &format!("/api/shipments/{}", tracking)).await;
    assert_eq!(by_tracking.status(), StatusCode::OK);
    let body = read_json(by_tracking).await;
    assert_eq!(body["id"], *id);
}

#[tokio::test]
async fn unknown_shipment_is_not_found() {
    let app = app();
    let response = send(&app, "GET", "/api/shipments/SHDOESNOTEXIST").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = read_json(response).await;
    assert_eq!(body["error"]["code"], "not_found");
    assert!(body["error"]["message"].is_string());
}

#[tokio::test]
async fn status_update_travels_through_event_history() {
    let app = app();
    let created = read_json(send_json(&app, "POST", "/api/shipments", shipment_payload(100.0)).await).await;
    let id = created["id"].as_str().unwrap();

    let response = send_json(
        &app,
        "PUT",
        &format!("/api/shipments/{}", id),
        serde_json::json!({ "status": "delivered" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = read_json(response).await;
    assert_eq!(body["status"], "delivered");
    let events = body["events"].as_array().unwrap();
    assert_eq!(events.len(), 2);
    assert_eq!(events.last().unwrap()["status"], "delivered");
    assert!(body["actualDelivery"].is_string());
    assert!(body["updatedAt"].as_str().unwrap() >= body["createdAt"].as_str().unwrap());
}

#[tokio::test]
async fn append_event_recomputes_status() {
    let app = app();
    let created = read_json(send_json(&app, "POST", "/api/shipments", shipment_payload(100.0)).await).await;
    let id = created["id"].as_str().unwrap();

    let response = send_json(
        &app,
        "POST",
        &format!("/api/shipments/{}/events", id),
        serde_json::json!({ "status": "picked_up", "location": "Mumbai Central Hub" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = read_json(response).await;
    assert_eq!(body["status"], "picked_up");
    let events = body["events"].as_array().unwrap();
    assert_eq!(events.len(), 2);
    assert_eq!(events.last().unwrap()["location"], "Mumbai Central Hub");
}

#[tokio::test]
async fn delete_then_lookup_is_not_found() {
    let app = app();
    let created = read_json(send_json(&app, "POST", "/api/shipments", shipment_payload(100.0)).await).await;
    let id = created["id"].as_str().unwrap();

    let response = send(&app, "DELETE", &format!("/api/shipments/{}", id)).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = send(&app, "GET", &format!("/api/shipments/{}", id)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn list_pages_and_reports_pre_pagination_total() {
    let app = app();
    for i in 0..5 {
        let response =
            send_json(&app, "POST", "/api/shipments", shipment_payload(100.0 + i as f64)).await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let response = send(&app, "GET", "/api/shipments?skip=1&limit=2").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["total"], 5);
    assert_eq!(body["skip"], 1);
    assert_eq!(body["limit"], 2);
    assert_eq!(body["shipments"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn list_filters_by_status() {
    let app = app();
    for _ in 0..3 {
        send_json(&app, "POST", "/api/shipments", shipment_payload(100.0)).await;
    }
    let created = read_json(send_json(&app, "POST", "/api/shipments", shipment_payload(100.0)).await).await;
    let id = created["id"].as_str().unwrap();
    send_json(
        &app,
        "PUT",
        &format!("/api/shipments/{}", id),
        serde_json::json!({ "status": "delivered" }),
    )
    .await;

    let response = send(&app, "GET", "/api/shipments?status=delivered").await;
    let body = read_json(response).await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["shipments"][0]["id"], *id);
}

#[tokio::test]
async fn invalid_payload_is_unprocessable() {
    let app = app();
    let mut payload = shipment_payload(100.0);
    payload["weight"] = serde_json::json!(0.0);
    let response = send_json(&app, "POST", "/api/shipments", payload).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = read_json(response).await;
    assert_eq!(body["error"]["code"], "validation_error");
}

#[tokio::test]
async fn update_with_unknown_field_is_rejected() {
    let app = app();
    let created = read_json(send_json(&app, "POST", "/api/shipments", shipment_payload(100.0)).await).await;
    let id = created["id"].as_str().unwrap();

    let response = send_json(
        &app,
        "PUT",
        &format!("/api/shipments/{}", id),
        serde_json::json!({ "trackingNumber": "BC00000000" }),
    )
    .await;
    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn empty_update_is_bad_request() {
    let app = app();
    let created = read_json(send_json(&app, "POST", "/api/shipments", shipment_payload(100.0)).await).await;
    let id = created["id"].as_str().unwrap();

    let response = send_json(
        &app,
        "PUT",
        &format!("/api/shipments/{}", id),
        serde_json::json!({}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn health_endpoints_respond() {
    let app = app();
    let response = send(&app, "GET", "/health").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["status"], "healthy");
    assert!(body["timestamp"].is_string());

    let response = send(&app, "GET", "/").await;
    assert_eq!(response.status(), StatusCode::OK);
}
