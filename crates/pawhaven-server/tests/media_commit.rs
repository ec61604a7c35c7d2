// SPDX-License-Identifier: Apache-2.0

use pawhaven_media::{FakeMediaHost, LocalDirHost, MediaHost};
use pawhaven_model::{PetDraft, PetRecord};
use pawhaven_server::{build_router, AppState, ServerConfig};
use pawhaven_store::{MemoryPetStore, PetStore};
use std::net::SocketAddr;
use std::sync::atomic::Ordering;
use std::sync::Arc;

fn draft_with_media() -> PetDraft {
    PetDraft {
        name: "Buddy".to_string(),
        breed: "Labrador".to_string(),
        age: "3".to_string(),
        gender: "Male".to_string(),
        size: "Large".to_string(),
        temperament: "Friendly".to_string(),
        status: None,
        photos: vec![
            "https://cdn.example/a.jpg".to_string(),
            "https://cdn.example/b.jpg".to_string(),
        ],
        video_url: Some("https://cdn.example/v.mp4".to_string()),
    }
}

async fn spawn_with_host(
    host: Arc<dyn MediaHost>,
) -> (SocketAddr, Arc<MemoryPetStore>, PetRecord) {
    let store = Arc::new(MemoryPetStore::new());
    let seeded = store.create(&draft_with_media()).await.expect("seed pet");
    let config = ServerConfig {
        admin_tokens: vec!["sekret".to_string()],
        ..ServerConfig::default()
    };
    let state = AppState::new(store.clone(), Some(host), config);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind listener");
    let addr = listener.local_addr().expect("local addr");
    let app = build_router(state);
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve app");
    });
    (addr, store, seeded)
}

fn photo_part(name: &str) -> reqwest::multipart::Part {
    reqwest::multipart::Part::bytes(vec![1, 2, 3])
        .file_name(name.to_string())
        .mime_str("image/jpeg")
        .expect("mime")
}

#[tokio::test]
async fn commit_keeps_retained_urls_then_appends_uploads() {
    let host = Arc::new(FakeMediaHost::default());
    let (addr, store, seeded) = spawn_with_host(host.clone()).await;

    // Drop a.jpg, keep b.jpg, add one new file.
    let form = reqwest::multipart::Form::new()
        .text("retain", "https://cdn.example/b.jpg")
        .part("photo", photo_part("new.jpg"));
    let response = reqwest::Client::new()
        .post(format!("http://{addr}/api/pets/{}/media", seeded.id))
        .header("x-admin-token", "sekret")
        .multipart(form)
        .send()
        .await
        .expect("commit request");
    assert_eq!(response.status().as_u16(), 200);
    let updated: PetRecord = response.json().await.expect("updated record");
    assert_eq!(
        updated.photos,
        vec![
            "https://cdn.example/b.jpg".to_string(),
            "https://media.invalid/u1/new.jpg".to_string(),
        ]
    );
    assert_eq!(updated.video_url.as_deref(), Some("https://cdn.example/v.mp4"));
    assert_eq!(host.upload_calls.load(Ordering::Relaxed), 1);

    let stored = store.get_by_id(&seeded.id).await.expect("stored record");
    assert_eq!(stored.photos, updated.photos);
}

#[tokio::test]
async fn failed_upload_aborts_the_commit_with_502() {
    let host = Arc::new(FakeMediaHost::default());
    host.fail_all();
    let (addr, store, seeded) = spawn_with_host(host.clone()).await;

    let form = reqwest::multipart::Form::new()
        .text("retain", "https://cdn.example/a.jpg")
        .part("photo", photo_part("new.jpg"));
    let response = reqwest::Client::new()
        .post(format!("http://{addr}/api/pets/{}/media", seeded.id))
        .header("x-admin-token", "sekret")
        .multipart(form)
        .send()
        .await
        .expect("commit request");
    assert_eq!(response.status().as_u16(), 502);
    let body: serde_json::Value = response.json().await.expect("error body");
    assert_eq!(body["message"], "Failed to upload media");

    // Nothing was written: the record still holds both original photos.
    let stored = store.get_by_id(&seeded.id).await.expect("stored record");
    assert_eq!(stored.photos, seeded.photos);
}

#[tokio::test]
async fn clear_video_drops_the_stored_url_without_uploads() {
    let host = Arc::new(FakeMediaHost::default());
    let (addr, _store, seeded) = spawn_with_host(host.clone()).await;

    let form = reqwest::multipart::Form::new()
        .text("retain", "https://cdn.example/a.jpg")
        .text("retain", "https://cdn.example/b.jpg")
        .text("clearVideo", "1");
    let response = reqwest::Client::new()
        .post(format!("http://{addr}/api/pets/{}/media", seeded.id))
        .header("x-admin-token", "sekret")
        .multipart(form)
        .send()
        .await
        .expect("commit request");
    assert_eq!(response.status().as_u16(), 200);
    let updated: PetRecord = response.json().await.expect("updated record");
    assert_eq!(updated.video_url, None);
    assert_eq!(updated.photos, seeded.photos);
    assert_eq!(host.upload_calls.load(Ordering::Relaxed), 0);
}

#[tokio::test]
async fn replacing_the_video_uploads_after_photos() {
    let host = Arc::new(FakeMediaHost::default());
    let (addr, _store, seeded) = spawn_with_host(host.clone()).await;

    let video = reqwest::multipart::Part::bytes(vec![9, 9])
        .file_name("clip.mp4")
        .mime_str("video/mp4")
        .expect("mime");
    let form = reqwest::multipart::Form::new()
        .text("retain", "https://cdn.example/a.jpg")
        .text("retain", "https://cdn.example/b.jpg")
        .part("photo", photo_part("extra.jpg"))
        .part("video", video);
    let response = reqwest::Client::new()
        .post(format!("http://{addr}/api/pets/{}/media", seeded.id))
        .header("x-admin-token", "sekret")
        .multipart(form)
        .send()
        .await
        .expect("commit request");
    assert_eq!(response.status().as_u16(), 200);
    let updated: PetRecord = response.json().await.expect("updated record");
    assert_eq!(updated.photos.len(), 3);
    assert_eq!(updated.photos[2], "https://media.invalid/u1/extra.jpg");
    assert_eq!(
        updated.video_url.as_deref(),
        Some("https://media.invalid/u2/clip.mp4")
    );
}

#[tokio::test]
async fn local_dir_host_serves_a_full_commit() {
    let dir = tempfile::tempdir().expect("tempdir");
    let host = Arc::new(LocalDirHost::new(
        dir.path().to_path_buf(),
        "http://media.test/files".to_string(),
    ));
    let (addr, store, seeded) = spawn_with_host(host).await;

    let form = reqwest::multipart::Form::new()
        .text("retain", "https://cdn.example/a.jpg")
        .part("photo", photo_part("porch cat.jpg"));
    let response = reqwest::Client::new()
        .post(format!("http://{addr}/api/pets/{}/media", seeded.id))
        .header("x-admin-token", "sekret")
        .multipart(form)
        .send()
        .await
        .expect("commit request");
    assert_eq!(response.status().as_u16(), 200);
    let updated: PetRecord = response.json().await.expect("updated record");
    assert_eq!(
        updated.photos,
        vec![
            "https://cdn.example/a.jpg".to_string(),
            "http://media.test/files/1-porch-cat.jpg".to_string(),
        ]
    );

    let written = tokio::fs::read(dir.path().join("1-porch-cat.jpg"))
        .await
        .expect("uploaded bytes on disk");
    assert_eq!(written, vec![1, 2, 3]);

    let stored = store.get_by_id(&seeded.id).await.expect("stored record");
    assert_eq!(stored.photos, updated.photos);
}

#[tokio::test]
async fn commit_requires_the_admin_token_and_an_existing_pet() {
    let host = Arc::new(FakeMediaHost::default());
    let (addr, _store, seeded) = spawn_with_host(host).await;

    let denied = reqwest::Client::new()
        .post(format!("http://{addr}/api/pets/{}/media", seeded.id))
        .multipart(reqwest::multipart::Form::new().text("retain", "https://cdn.example/a.jpg"))
        .send()
        .await
        .expect("denied request");
    assert_eq!(denied.status().as_u16(), 401);

    let missing = reqwest::Client::new()
        .post(format!("http://{addr}/api/pets/pet999/media"))
        .header("x-admin-token", "sekret")
        .multipart(reqwest::multipart::Form::new().text("retain", "https://cdn.example/a.jpg"))
        .send()
        .await
        .expect("missing request");
    assert_eq!(missing.status().as_u16(), 404);
    let body: serde_json::Value = missing.json().await.expect("error body");
    assert_eq!(body["message"], "Pet not found");
}
