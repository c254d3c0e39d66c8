//! Hub, route, and user endpoint tests, including the login flow and
//! credential hiding.

mod common;

use axum::http::StatusCode;
use common::{app, hub_payload, read_json, send, send_json};

fn user_payload(email: &str) -> serde_json::Value {
    serde_json::json!({
        "name": "Asha Verma",
        "email": email,
        "role": "manager",
        "password": "s3cret-pass"
    })
}

#[tokio::test]
async fn hub_crud_round_trip() {
    let app = app();
    let created = read_json(send_json(&app, "POST", "/api/hubs", hub_payload("BOM1")).await).await;
    let id = created["id"].as_str().unwrap();
    assert!(id.starts_with("HUB"));
    assert_eq!(created["status"], "active");
    assert_eq!(created["currentLoad"], 0);

    let response = send_json(
        &app,
        "PUT",
        &format!("/api/hubs/{}", id),
        serde_json::json!({ "currentLoad": 120, "status": "maintenance" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let updated = read_json(response).await;
    assert_eq!(updated["currentLoad"], 120);
    assert_eq!(updated["status"], "maintenance");

    let response = send(&app, "DELETE", &format!("/api/hubs/{}", id)).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let response = send(&app, "GET", &format!("/api/hubs/{}", id)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn hub_without_capacity_is_rejected() {
    let app = app();
    let mut payload = hub_payload("BOM1");
    payload["capacity"] = serde_json::json!(0);
    let response = send_json(&app, "POST", "/api/hubs", payload).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn route_creation_links_hub_and_assignee() {
    let app = app();
    let hub = read_json(send_json(&app, "POST", "/api/hubs", hub_payload("BOM1")).await).await;
    let hub_id = hub["id"].as_str().unwrap();

    let response = send_json(
        &app,
        "POST",
        "/api/routes",
        serde_json::json!({
            "name": "Mumbai to Delhi",
            "assignedTo": "driver-7",
            "hubId": hub_id,
            "estimatedDistance": 1400.0,
            "estimatedTime": "2 days"
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let route = read_json(response).await;
    assert!(route["id"].as_str().unwrap().starts_with("RT"));
    assert_eq!(route["status"], "planned");
    assert_eq!(route["hubId"], *hub_id);
    assert_eq!(route["shipmentIds"].as_array().unwrap().len(), 0);

    let listed = read_json(send(&app, "GET", "/api/routes").await).await;
    assert_eq!(listed["total"], 1);
}

#[tokio::test]
async fn user_response_never_carries_the_credential() {
    let app = app();
    let response = send_json(&app, "POST", "/api/users", user_payload("asha@bluecart.example")).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let user = read_json(response).await;
    assert!(user["id"].as_str().unwrap().starts_with("USR"));
    assert_eq!(user["role"], "manager");
    assert!(user.get("password").is_none());
    assert!(user.get("passwordHash").is_none());

    let listed = read_json(send(&app, "GET", "/api/users").await).await;
    assert!(listed["users"][0].get("passwordHash").is_none());
}

#[tokio::test]
async fn invalid_email_is_rejected() {
    let app = app();
    let response = send_json(&app, "POST", "/api/users", user_payload("not-an-email")).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn login_accepts_the_right_password_only() {
    let app = app();
    send_json(&app, "POST", "/api/users", user_payload("asha@bluecart.example")).await;

    let ok = send_json(
        &app,
        "POST",
        "/api/auth/login",
        serde_json::json!({ "email": "asha@bluecart.example", "password": "s3cret-pass" }),
    )
    .await;
    assert_eq!(ok.status(), StatusCode::OK);
    let user = read_json(ok).await;
    assert_eq!(user["email"], "asha@bluecart.example");

    let wrong = send_json(
        &app,
        "POST",
        "/api/auth/login",
        serde_json::json!({ "email": "asha@bluecart.example", "password": "wrong" }),
    )
    .await;
    assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);

    let unknown = send_json(
        &app,
        "POST",
        "/api/auth/login",
        serde_json::json!({ "email": "nobody@bluecart.example", "password": "s3cret-pass" }),
    )
    .await;
    // Unknown account and bad password are indistinguishable.
    assert_eq!(unknown.status(), StatusCode::UNAUTHORIZED);
    let body = read_json(unknown).await;
    assert_eq!(body["error"]["code"], "unauthorized");
}

#[tokio::test]
async fn password_change_takes_effect_on_next_login() {
    let app = app();
    let user = read_json(send_json(&app, "POST", "/api/users", user_payload("asha@bluecart.example")).await).await;
    let id = user["id"].as_str().unwrap();

    let response = send_json(
        &app,
        "PUT",
        &format!("/api/users/{}", id),
        serde_json::json!({ "password": "rotated-pass" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let old = send_json(
        &app,
        "POST",
        "/api/auth/login",
        serde_json::json!({ "email": "asha@bluecart.example", "password": "s3cret-pass" }),
    )
    .await;
    assert_eq!(old.status(), StatusCode::UNAUTHORIZED);

    let new = send_json(
        &app,
        "POST",
        "/api/auth/login",
        serde_json::json!({ "email": "asha@bluecart.example", "password": "rotated-pass" }),
    )
    .await;
    assert_eq!(new.status(), StatusCode::OK);
}
