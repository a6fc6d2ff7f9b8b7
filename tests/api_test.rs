mod common;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use serde_json::json;

use common::{ids, spawn_app};
use purifier_backend::notify::NotificationKind;

#[tokio::test]
async fn health_check_responds() {
    let app = spawn_app().await;
    let (status, _) = app.send(Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn api_requires_a_current_token() {
    let app = spawn_app().await;

    let (status, body) = app.send(Method::GET, "/api/customers", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "401 Unauthorized");

    let (status, _) = app.send(Method::GET, "/api/customers", Some("not-a-jwt"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (_, token) = app.login_as("9000011111").await;
    let (status, _) = app.send(Method::GET, "/api/customers", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);

    // The cookie carries the same bearer value.
    let request = Request::builder()
        .uri("/api/customers")
        .header(header::COOKIE, format!("authorization=Bearer%20{}", token))
        .body(Body::empty())
        .expect("request");
    let (status, _) = app.dispatch(request).await;
    assert_eq!(status, StatusCode::OK);

    // Logging in again replaces the stored token.
    let (status, login) = app
        .send(Method::POST, "/auth/login", None, Some(json!({ "contactNumber": "9000011111" })))
        .await;
    assert_eq!(status, StatusCode::OK);
    let fresh = login["token"].as_str().expect("token").to_string();
    let (status, _) = app.send(Method::GET, "/api/customers", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app.send(Method::POST, "/auth/logout", Some(&fresh), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = app.send(Method::GET, "/api/customers", Some(&fresh), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn duplicate_registration_conflicts() {
    let app = spawn_app().await;
    app.login_as("9000022222").await;

    let (status, body) = app
        .send(
            Method::POST,
            "/auth/register",
            None,
            Some(json!({ "fullName": "Copy", "contactNumber": "9000022222", "address": "x" })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["message"].as_str().expect("message").contains("contact number"));
}

#[tokio::test]
async fn customer_creation_generates_linked_services() {
    let app = spawn_app().await;
    let (tech_id, token) = app.login_as("9000033333").await;

    let customer = app.create_customer(&token, 4).await;
    let services = ids(&customer["services"]);
    assert_eq!(services.len(), 3);
    assert_eq!(customer["status"], "ACTIVE");
    assert_eq!(customer["technicianId"], tech_id.as_str());

    let (status, all) = app.send(Method::GET, "/api/services?month=all", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    let listed: Vec<(i64, String)> = all
        .as_array()
        .expect("array")
        .iter()
        .map(|s| {
            (
                s["serviceNumber"].as_i64().expect("number"),
                s["scheduledDate"].as_str().expect("date").to_string(),
            )
        })
        .collect();
    assert_eq!(
        listed,
        vec![
            (1, "2024-01-01".to_string()),
            (2, "2024-05-01".to_string()),
            (3, "2024-09-01".to_string()),
        ]
    );

    let sent = app.notifier.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].kind, NotificationKind::NewCustomer);
}

#[tokio::test]
async fn invalid_bodies_and_queries_are_bad_requests() {
    let app = spawn_app().await;
    let (_, token) = app.login_as("9000044444").await;

    let (status, body) = app
        .send(
            Method::POST,
            "/api/customers",
            Some(&token),
            Some(json!({
                "fullName": "X",
                "contactNumber": "1",
                "address": "Y",
                "category": "PLATINUM",
                "numberOfServices": 2,
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "400 Bad Request");

    let (status, _) = app
        .send(
            Method::POST,
            "/api/customers",
            Some(&token),
            Some(json!({
                "fullName": "X",
                "contactNumber": "1",
                "address": "Y",
                "serviceGenerationType": "MANUAL",
                "serviceDates": [],
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app.send(Method::GET, "/api/customers", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);

    for uri in ["/api/customers?status=FOO", "/api/services?month=someday", "/api/tasks?status=DONE"] {
        let (status, body) = app.send(Method::GET, uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
        assert_eq!(body["error"], "400 Bad Request", "{}", uri);
        assert!(body["message"].is_string(), "{}", uri);
    }
}

#[tokio::test]
async fn technician_list_is_paginated() {
    let app = spawn_app().await;
    let (_, token) = app.login_as("9000077771").await;
    app.login_as("9000077772").await;
    app.login_as("9000077773").await;

    let (status, body) = app
        .send(Method::GET, "/api/technicians?limit=2&search=90000777", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["technicians"].as_array().map(Vec::len), Some(2));
    assert_eq!(body["pagination"]["totalItems"], 3);
    assert_eq!(body["pagination"]["totalPages"], 2);
    assert_eq!(body["pagination"]["hasNextPage"], true);
    assert!(body["technicians"][0].get("authToken").is_none());

    let (status, _) = app.send(Method::GET, "/api/technicians?page=0", Some(&token), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app.send(Method::GET, "/api/technicians", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn completing_a_service_twice_conflicts() {
    let app = spawn_app().await;
    let (_, token) = app.login_as("9000055555").await;
    let customer = app.create_customer(&token, 12).await;
    let service_id = ids(&customer["services"])[0].clone();
    let uri = format!("/api/services/{}/complete", service_id);

    let (status, done) = app
        .send(
            Method::POST,
            &uri,
            Some(&token),
            Some(json!({ "partsUsed": [{ "partName": "carbon filter" }] })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(done["status"], "COMPLETED");
    assert_eq!(done["partsUsed"][0]["quantity"], 1);

    let (status, _) = app
        .send(Method::POST, &uri, Some(&token), Some(json!({ "partsUsed": [] })))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, after) = app
        .send(Method::GET, &format!("/api/services/{}", service_id), Some(&token), None)
        .await;
    assert_eq!(after["partsUsed"], done["partsUsed"]);
    assert_eq!(after["completedDate"], done["completedDate"]);
}

#[tokio::test]
async fn bill_total_ignores_client_value() {
    let app = spawn_app().await;
    let (_, token) = app.login_as("9000066666").await;
    let customer = app.create_customer(&token, 1).await;
    let customer_id = customer["id"].as_str().expect("id");

    let (status, bill) = app
        .send(
            Method::POST,
            "/api/bills",
            Some(&token),
            Some(json!({
                "customerId": customer_id,
                "items": [
                    { "description": "RO membrane", "amount": 1800.0 },
                    { "description": "Labour", "amount": 200.0 },
                ],
                "total": 5.0,
                "paymentMethod": "UPI",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(bill["total"], 2000.0);
    assert_eq!(bill["status"], "PENDING");
    assert_eq!(bill["paymentMethod"], "UPI");

    let bill_id = bill["id"].as_str().expect("id");
    let (status, paid) = app
        .send(
            Method::PATCH,
            &format!("/api/bills/{}", bill_id),
            Some(&token),
            Some(json!({ "status": "PAID" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(paid["status"], "PAID");

    let (_, for_customer) = app
        .send(Method::GET, &format!("/api/customers/{}/bills", customer_id), Some(&token), None)
        .await;
    assert_eq!(for_customer.as_array().expect("array").len(), 1);

    let (_, paid_only) = app.send(Method::GET, "/api/bills?status=PAID", Some(&token), None).await;
    assert_eq!(paid_only.as_array().expect("array").len(), 1);
}

#[tokio::test]
async fn other_technicians_cannot_see_records() {
    let app = spawn_app().await;
    let (_, owner) = app.login_as("9000077777").await;
    let (_, stranger) = app.login_as("9000088888").await;
    let customer = app.create_customer(&owner, 2).await;
    let customer_id = customer["id"].as_str().expect("id");

    let (status, body) = app
        .send(Method::GET, &format!("/api/customers/{}", customer_id), Some(&stranger), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Customer not found");

    let (status, _) = app
        .send(
            Method::POST,
            "/api/bills",
            Some(&stranger),
            Some(json!({ "customerId": customer_id, "items": [{ "description": "x", "amount": 1.0 }] })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn customer_delete_hides_customer_and_services() {
    let app = spawn_app().await;
    let (_, token) = app.login_as("9000099999").await;
    let customer = app.create_customer(&token, 2).await;
    let customer_id = customer["id"].as_str().expect("id");

    let (status, _) = app
        .send(Method::DELETE, &format!("/api/customers/{}", customer_id), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app
        .send(Method::GET, &format!("/api/customers/{}", customer_id), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (_, services) = app.send(Method::GET, "/api/services?month=all", Some(&token), None).await;
    assert!(services.as_array().expect("array").is_empty());
}

#[tokio::test]
async fn complaints_and_reminders_round_trip() {
    let app = spawn_app().await;
    let (_, token) = app.login_as("9000012345").await;
    let customer = app.create_customer(&token, 1).await;
    let customer_id = customer["id"].as_str().expect("id");

    let (status, complaint) = app
        .send(
            Method::POST,
            "/api/complaints",
            Some(&token),
            Some(json!({ "customerId": customer_id, "text": "Tap is leaking" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(complaint["status"], "OPEN");

    let (status, closed) = app
        .send(
            Method::PATCH,
            &format!("/api/complaints/{}/status", complaint["id"].as_str().expect("id")),
            Some(&token),
            Some(json!({ "status": "CLOSED" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(closed["status"], "CLOSED");

    let reminders_uri = format!("/api/customers/{}/reminders", customer_id);
    let (status, reminders) = app
        .send(
            Method::POST,
            &reminders_uri,
            Some(&token),
            Some(json!({ "type": "TEXT", "message": "Call first", "date": "2024-03-01T09:00:00Z" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(reminders[0]["entityType"], "CUSTOMER");

    let (_, listed) = app
        .send(Method::GET, &format!("/api/reminders/customer/{}", customer_id), Some(&token), None)
        .await;
    assert_eq!(listed.as_array().expect("array").len(), 1);

    let (status, _) = app
        .send(Method::DELETE, &format!("{}/3", reminders_uri), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, left) = app
        .send(Method::DELETE, &format!("{}/0", reminders_uri), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(left.as_array().expect("array").is_empty());

    let (status, _) = app
        .send(Method::GET, &format!("/api/reminders/invoice/{}", customer_id), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn dashboard_summarises_caller_data() {
    let app = spawn_app().await;
    let (_, token) = app.login_as("9000054321").await;
    let customer = app.create_customer(&token, 6).await;
    let first = ids(&customer["services"])[0].clone();
    app.send(
        Method::POST,
        &format!("/api/services/{}/complete", first),
        Some(&token),
        Some(json!({})),
    )
    .await;

    let (status, summary) = app.send(Method::GET, "/api/dashboard", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["totalCustomers"], 1);
    assert_eq!(summary["activeCustomers"], 1);
    assert_eq!(summary["pendingServices"], 1);
    assert_eq!(summary["completionRate"], 50);
    assert_eq!(summary["servicesByArea"][0]["area"], "East");
    assert_eq!(summary["servicesByArea"][0]["count"], 2);
}
