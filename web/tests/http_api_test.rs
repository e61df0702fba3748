//! HTTP API tests.
//!
//! Drives the full axum router over real HTTP on an ephemeral port, backed
//! by the in-memory stores and a manual clock.
//!
//! Run with: `cargo test -p turnstile-web --test http_api_test`

#![allow(clippy::unwrap_used)]

use serde_json::{json, Value};
use std::sync::Arc;
use turnstile_core::{EventId, HoldPolicy, ReservationManager, TicketType};
use turnstile_testing::{test_clock, InMemoryHoldStore, InMemoryInventoryStore, ManualClock};
use turnstile_web::{build_router, AppState};
use uuid::Uuid;

struct TestServer {
    base_url: String,
    client: reqwest::Client,
    clock: ManualClock,
    event_id: EventId,
}

/// Spawn the router on an ephemeral port with `capacity` "General" tickets.
async fn spawn_server(capacity: u32) -> TestServer {
    let clock = test_clock();
    let holds = InMemoryHoldStore::new(Arc::new(clock.clone()));
    let inventory = InMemoryInventoryStore::new();
    let event_id = EventId::new();
    inventory.insert_ticket_type(event_id, TicketType::new("General", capacity));

    let manager = Arc::new(ReservationManager::new(
        Arc::new(holds),
        Arc::new(inventory),
        Arc::new(clock.clone()),
        HoldPolicy::default(),
    ));
    let app = build_router(AppState::new(manager));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    TestServer {
        base_url: format!("http://{addr}"),
        client: reqwest::Client::new(),
        clock,
        event_id,
    }
}

impl TestServer {
    fn hold_body(&self, quantity: u32, owner: &str) -> Value {
        json!({
            "event_id": self.event_id.as_uuid(),
            "ticket_type": "General",
            "quantity": quantity,
            "owner_id": owner,
        })
    }

    async fn place_hold(&self, quantity: u32, owner: &str) -> reqwest::Response {
        self.client
            .post(format!("{}/api/holds", self.base_url))
            .json(&self.hold_body(quantity, owner))
            .send()
            .await
            .unwrap()
    }

    async fn commit(&self, hold_id: &str) -> reqwest::Response {
        self.client
            .post(format!("{}/api/holds/{hold_id}/commit", self.base_url))
            .send()
            .await
            .unwrap()
    }

    async fn availability(&self) -> Value {
        self.client
            .get(format!(
                "{}/api/events/{}/ticket-types/General/availability",
                self.base_url, self.event_id
            ))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap()
    }
}

#[tokio::test]
async fn health_probes_answer() {
    let server = spawn_server(1).await;
    for path in ["/health", "/ready"] {
        let response = server
            .client
            .get(format!("{}{path}", server.base_url))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 200);
    }
}

#[tokio::test]
async fn reserve_returns_created_with_receipt() {
    let server = spawn_server(10).await;

    let response = server.place_hold(2, "alice").await;
    assert_eq!(response.status(), 201);

    let body: Value = response.json().await.unwrap();
    assert!(body["hold_id"].as_str().unwrap().parse::<Uuid>().is_ok());
    assert_eq!(body["ttl_seconds"], 900);
    assert!(body["expires_at"].is_string());
}

#[tokio::test]
async fn double_submit_returns_the_same_hold() {
    let server = spawn_server(10).await;

    let first: Value = server.place_hold(2, "alice").await.json().await.unwrap();
    let second: Value = server.place_hold(2, "alice").await.json().await.unwrap();
    assert_eq!(first["hold_id"], second["hold_id"]);

    // The re-used hold still counts once against availability.
    let view = server.availability().await;
    assert_eq!(view["held"], 2);
    assert_eq!(view["available"], 8);
}

#[tokio::test]
async fn oversell_attempt_is_conflict() {
    let server = spawn_server(10).await;

    assert_eq!(server.place_hold(10, "alice").await.status(), 201);

    let response = server.place_hold(1, "bob").await;
    assert_eq!(response.status(), 409);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["code"], "OUT_OF_STOCK");
}

#[tokio::test]
async fn commit_flow_decrements_durably_and_replay_fails() {
    let server = spawn_server(10).await;

    let receipt: Value = server.place_hold(10, "alice").await.json().await.unwrap();
    let hold_id = receipt["hold_id"].as_str().unwrap().to_string();

    let response = server.commit(&hold_id).await;
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["committed"], true);

    // Replayed confirmation must not be mistaken for success.
    let replay = server.commit(&hold_id).await;
    assert_eq!(replay.status(), 409);
    let body: Value = replay.json().await.unwrap();
    assert_eq!(body["code"], "HOLD_NOT_FOUND");

    // Capacity is now truly exhausted.
    let view = server.availability().await;
    assert_eq!(view["committed"], 10);
    assert_eq!(view["available"], 0);
    assert_eq!(server.place_hold(1, "bob").await.status(), 409);
}

#[tokio::test]
async fn ttl_endpoint_reports_and_never_404s() {
    let server = spawn_server(10).await;

    let receipt: Value = server.place_hold(1, "alice").await.json().await.unwrap();
    let hold_id = receipt["hold_id"].as_str().unwrap().to_string();

    let url = format!("{}/api/holds/{hold_id}/ttl", server.base_url);
    let body: Value = server
        .client
        .get(url.as_str())
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["ttl_seconds"], 900);

    server.clock.advance_secs(1000);
    let response = server.client.get(url.as_str()).send().await.unwrap();
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["ttl_seconds"], 0);

    // A hold that never existed answers the same way.
    let unknown = format!("{}/api/holds/{}/ttl", server.base_url, Uuid::new_v4());
    let response = server.client.get(unknown.as_str()).send().await.unwrap();
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["ttl_seconds"], 0);
}

#[tokio::test]
async fn expiry_frees_capacity_over_http() {
    let server = spawn_server(5).await;

    let response = server
        .client
        .post(format!("{}/api/holds", server.base_url))
        .json(&json!({
            "event_id": server.event_id.as_uuid(),
            "ticket_type": "General",
            "quantity": 5,
            "owner_id": "alice",
            "ttl_seconds": 1,
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 201);
    assert_eq!(server.place_hold(5, "bob").await.status(), 409);

    server.clock.advance_secs(2);
    assert_eq!(server.place_hold(5, "bob").await.status(), 201);
}

#[tokio::test]
async fn cancel_releases_and_second_delete_is_404() {
    let server = spawn_server(5).await;

    let receipt: Value = server.place_hold(5, "alice").await.json().await.unwrap();
    let hold_id = receipt["hold_id"].as_str().unwrap().to_string();
    let url = format!("{}/api/holds/{hold_id}", server.base_url);

    let response = server.client.delete(url.as_str()).send().await.unwrap();
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], true);

    // Already gone: non-fatal 404.
    let response = server.client.delete(url.as_str()).send().await.unwrap();
    assert_eq!(response.status(), 404);

    // The capacity is free again.
    assert_eq!(server.place_hold(5, "bob").await.status(), 201);
}

#[tokio::test]
async fn unknown_ticket_type_is_404() {
    let server = spawn_server(5).await;

    let response = server
        .client
        .post(format!("{}/api/holds", server.base_url))
        .json(&json!({
            "event_id": server.event_id.as_uuid(),
            "ticket_type": "Backstage",
            "quantity": 1,
            "owner_id": "alice",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 404);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn zero_quantity_is_rejected() {
    let server = spawn_server(5).await;
    let response = server.place_hold(0, "alice").await;
    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["code"], "BAD_REQUEST");
}
