// SPDX-License-Identifier: Apache-2.0

use pawhaven_model::PetDraft;
use pawhaven_server::{build_router, AppState, ServerConfig};
use pawhaven_store::{MemoryPetStore, PetStore};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

fn draft(name: &str, breed: &str, size: &str) -> PetDraft {
    PetDraft {
        name: name.to_string(),
        breed: breed.to_string(),
        age: "3".to_string(),
        gender: "Male".to_string(),
        size: size.to_string(),
        temperament: "Friendly".to_string(),
        status: None,
        photos: vec!["https://cdn.example/a.jpg".to_string()],
        video_url: None,
    }
}

async fn seeded_store() -> Arc<MemoryPetStore> {
    let store = Arc::new(MemoryPetStore::new());
    store.create(&draft("Buddy", "Labrador", "Large")).await.expect("seed pet1");
    store.create(&draft("Luna", "Beagle", "Small")).await.expect("seed pet2");
    store
}

async fn spawn_server(state: AppState) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind listener");
    let addr = listener.local_addr().expect("local addr");
    let app = build_router(state);
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve app");
    });
    addr
}

async fn admin_server() -> SocketAddr {
    let store = seeded_store().await;
    let config = ServerConfig {
        admin_tokens: vec!["sekret".to_string()],
        ..ServerConfig::default()
    };
    spawn_server(AppState::new(store, None, config)).await
}

async fn raw_request(addr: SocketAddr, request: &str) -> String {
    let mut stream = tokio::net::TcpStream::connect(addr)
        .await
        .expect("connect server");
    stream
        .write_all(request.as_bytes())
        .await
        .expect("write request");
    let mut response = String::new();
    stream
        .read_to_string(&mut response)
        .await
        .expect("read response");
    response
}

async fn get(addr: SocketAddr, path: &str) -> String {
    let request =
        format!("GET {path} HTTP/1.1\r\nHost: {addr}\r\nConnection: close\r\n\r\n");
    raw_request(addr, &request).await
}

async fn send_json(addr: SocketAddr, method: &str, path: &str, extra_headers: &str, body: &str) -> String {
    let request = format!(
        "{method} {path} HTTP/1.1\r\nHost: {addr}\r\nContent-Type: application/json\r\nContent-Length: {}\r\n{extra_headers}Connection: close\r\n\r\n{body}",
        body.len()
    );
    raw_request(addr, &request).await
}

const ADMIN_HEADER: &str = "x-admin-token: sekret\r\n";

#[tokio::test]
async fn list_returns_every_seeded_pet() {
    let addr = admin_server().await;
    let response = get(addr, "/api/pets").await;
    assert!(response.starts_with("HTTP/1.1 200 OK\r\n"));
    assert!(response.contains("\"petId\":\"pet1\""));
    assert!(response.contains("\"petId\":\"pet2\""));
    assert!(response.contains("\"name\":\"Buddy\""));
}

#[tokio::test]
async fn filter_narrows_and_bad_sort_is_rejected() {
    let addr = admin_server().await;
    let matching = send_json(addr, "POST", "/api/pets/filter", "", r#"{"sizes":["Small"]}"#).await;
    assert!(matching.starts_with("HTTP/1.1 200 OK\r\n"));
    assert!(matching.contains("\"petId\":\"pet2\""));
    assert!(!matching.contains("\"petId\":\"pet1\""));

    let sorted = send_json(
        addr,
        "POST",
        "/api/pets/filter",
        "",
        r#"{"sort":"name-descending"}"#,
    )
    .await;
    assert!(sorted.starts_with("HTTP/1.1 200 OK\r\n"));
    let luna = sorted.find("\"name\":\"Luna\"").expect("Luna present");
    let buddy = sorted.find("\"name\":\"Buddy\"").expect("Buddy present");
    assert!(luna < buddy, "descending name order puts Luna first");

    let rejected = send_json(
        addr,
        "POST",
        "/api/pets/filter",
        "",
        r#"{"sort":"alphabetical"}"#,
    )
    .await;
    assert!(rejected.starts_with("HTTP/1.1 400 Bad Request\r\n"));
    assert!(rejected.contains("\"message\":\"Invalid sort directive\""));
}

#[tokio::test]
async fn detail_serves_the_record_or_the_not_found_envelope() {
    let addr = admin_server().await;
    let found = get(addr, "/api/pets/pet1").await;
    assert!(found.starts_with("HTTP/1.1 200 OK\r\n"));
    assert!(found.contains("\"breed\":\"Labrador\""));

    let missing = get(addr, "/api/pets/pet999").await;
    assert!(missing.starts_with("HTTP/1.1 404 Not Found\r\n"));
    assert!(missing.contains("{\"message\":\"Pet not found\"}"));

    let junk_id = get(addr, "/api/pets/not%20an%20id").await;
    assert!(junk_id.starts_with("HTTP/1.1 404 Not Found\r\n"));
}

#[tokio::test]
async fn similar_shares_breed_or_size_and_requires_the_subject() {
    let addr = admin_server().await;
    let similar = get(addr, "/api/pets/pet1/similar").await;
    assert!(similar.starts_with("HTTP/1.1 200 OK\r\n"));
    // pet2 shares neither Labrador nor Large with pet1.
    assert!(similar.contains("\r\n\r\n[]") || similar.ends_with("[]"));

    let missing = get(addr, "/api/pets/pet999/similar").await;
    assert!(missing.starts_with("HTTP/1.1 404 Not Found\r\n"));
}

#[tokio::test]
async fn admin_mutations_require_the_token() {
    let addr = admin_server().await;
    let body = r#"{"name":"Rex","breed":"Poodle","age":"2","gender":"Male","size":"Medium","temperament":"Shy"}"#;
    let denied = send_json(addr, "POST", "/api/pets", "", body).await;
    assert!(denied.starts_with("HTTP/1.1 401 Unauthorized\r\n"));
    assert!(denied.contains("\"message\":\"Admin token required\""));

    let created = send_json(addr, "POST", "/api/pets", ADMIN_HEADER, body).await;
    assert!(created.starts_with("HTTP/1.1 201 Created\r\n"));
    assert!(created.contains("\"petId\":\"pet3\""));
    assert!(created.contains("\"status\":\"available\""));
}

#[tokio::test]
async fn create_reports_every_missing_field() {
    let addr = admin_server().await;
    let invalid = send_json(addr, "POST", "/api/pets", ADMIN_HEADER, "{}").await;
    assert!(invalid.starts_with("HTTP/1.1 400 Bad Request\r\n"));
    assert!(invalid.contains("\"message\":\"Invalid pet data\""));
    assert!(invalid.contains("\"field\":\"name\""));
    assert!(invalid.contains("\"message\":\"Name is required\""));
    assert!(invalid.contains("\"field\":\"temperament\""));
}

#[tokio::test]
async fn update_applies_the_patch_and_the_list_reflects_it() {
    let addr = admin_server().await;
    let updated = send_json(
        addr,
        "PUT",
        "/api/pets/pet2",
        ADMIN_HEADER,
        r#"{"status":"adopted"}"#,
    )
    .await;
    assert!(updated.starts_with("HTTP/1.1 200 OK\r\n"));
    assert!(updated.contains("\"status\":\"adopted\""));
    assert!(updated.contains("\"name\":\"Luna\""));

    let list = get(addr, "/api/pets").await;
    assert!(list.contains("\"status\":\"adopted\""));

    let missing = send_json(
        addr,
        "PUT",
        "/api/pets/pet999",
        ADMIN_HEADER,
        r#"{"status":"adopted"}"#,
    )
    .await;
    assert!(missing.starts_with("HTTP/1.1 404 Not Found\r\n"));
}

#[tokio::test]
async fn delete_is_idempotent_on_the_wire() {
    let addr = admin_server().await;
    let request = format!(
        "DELETE /api/pets/pet1 HTTP/1.1\r\nHost: {addr}\r\n{ADMIN_HEADER}Connection: close\r\n\r\n"
    );
    let first = raw_request(addr, &request).await;
    assert!(first.starts_with("HTTP/1.1 204 No Content\r\n"));

    let second = raw_request(addr, &request).await;
    assert!(second.starts_with("HTTP/1.1 404 Not Found\r\n"));

    let list = get(addr, "/api/pets").await;
    assert!(!list.contains("\"petId\":\"pet1\""));
}

#[tokio::test]
async fn stats_counts_by_status_behind_the_gate() {
    let addr = admin_server().await;
    let denied = get(addr, "/api/admin/stats").await;
    assert!(denied.starts_with("HTTP/1.1 401 Unauthorized\r\n"));

    let request = format!(
        "GET /api/admin/stats HTTP/1.1\r\nHost: {addr}\r\n{ADMIN_HEADER}Connection: close\r\n\r\n"
    );
    let stats = raw_request(addr, &request).await;
    assert!(stats.starts_with("HTTP/1.1 200 OK\r\n"));
    assert!(stats.contains("\"total\":2"));
    assert!(stats.contains("\"available\":2"));
    assert!(stats.contains("\"adopted\":0"));
}

#[tokio::test]
async fn request_ids_are_echoed_or_generated() {
    let addr = admin_server().await;
    let request = format!(
        "GET /api/pets HTTP/1.1\r\nHost: {addr}\r\nx-request-id: trace-abc-123\r\nConnection: close\r\n\r\n"
    );
    let echoed = raw_request(addr, &request).await;
    assert!(echoed.contains("x-request-id: trace-abc-123\r\n"));

    let generated = get(addr, "/healthz").await;
    assert!(generated.contains("x-request-id: req-"));
}

#[tokio::test]
async fn operational_routes_answer() {
    let addr = admin_server().await;
    let health = get(addr, "/healthz").await;
    assert!(health.starts_with("HTTP/1.1 200 OK\r\n"));

    let ready = get(addr, "/readyz").await;
    assert!(ready.starts_with("HTTP/1.1 200 OK\r\n"));

    let version = get(addr, "/version").await;
    assert!(version.starts_with("HTTP/1.1 200 OK\r\n"));
    assert!(version.contains("\"name\":\"pawhaven-server\""));

    let openapi = get(addr, "/openapi.json").await;
    assert!(openapi.starts_with("HTTP/1.1 200 OK\r\n"));
    assert!(openapi.contains("\"/api/pets/filter\""));

    let metrics = get(addr, "/metrics").await;
    assert!(metrics.starts_with("HTTP/1.1 200 OK\r\n"));
    assert!(metrics.contains("pawhaven_requests_total"));
    assert!(metrics.contains("pawhaven_listing_cache_invalidations_total"));
}
