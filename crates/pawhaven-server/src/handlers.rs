// SPDX-License-Identifier: Apache-2.0

use crate::catalog::CommitError;
use crate::AppState;
use axum::extract::{Multipart, Path, State};
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use pawhaven_api::{openapi_v1_spec, ApiError, FilterRequest, StatsResponse};
use pawhaven_media::{MediaFile, MediaSession};
use pawhaven_model::{PetDraft, PetId, PetPatch};
use pawhaven_store::StoreError;
use serde_json::json;
use std::sync::atomic::Ordering;
use std::time::Instant;
use tracing::error;

pub(crate) fn make_request_id(state: &AppState) -> String {
    let id = state.request_id_seed.fetch_add(1, Ordering::Relaxed);
    format!("req-{id:016x}")
}

pub(crate) fn propagated_request_id(headers: &HeaderMap, state: &AppState) -> String {
    if let Some(raw) = headers.get("x-request-id").and_then(|v| v.to_str().ok()) {
        let trimmed = raw.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }
    make_request_id(state)
}

pub(crate) fn with_request_id(mut response: Response, request_id: &str) -> Response {
    if let Ok(v) = HeaderValue::from_str(request_id) {
        response.headers_mut().insert("x-request-id", v);
    }
    response
}

fn api_error_response(status: StatusCode, err: &ApiError) -> Response {
    (status, Json(err)).into_response()
}

fn admin_granted(state: &AppState, headers: &HeaderMap) -> bool {
    if state.config.admin_tokens.is_empty() {
        return true;
    }
    headers
        .get("x-admin-token")
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .is_some_and(|token| state.config.admin_tokens.iter().any(|t| t == token))
}

/// Maps a store failure to the wire envelope; `failure` is the operation's
/// 500-level message.
fn store_error_parts(
    state: &AppState,
    request_id: &str,
    err: &StoreError,
    failure: ApiError,
) -> (StatusCode, ApiError) {
    match err {
        StoreError::NotFound => (StatusCode::NOT_FOUND, ApiError::not_found()),
        StoreError::Validation(v) => (StatusCode::BAD_REQUEST, ApiError::invalid_pet_data(v)),
        StoreError::Unavailable(detail) => {
            state.metrics.record_store_failure();
            error!(request_id, "store operation failed: {detail}");
            (StatusCode::INTERNAL_SERVER_ERROR, failure)
        }
    }
}

async fn finish(
    state: &AppState,
    route: &str,
    request_id: &str,
    started: Instant,
    response: Response,
) -> Response {
    state
        .metrics
        .observe_request(route, response.status(), started.elapsed())
        .await;
    with_request_id(response, request_id)
}

pub(crate) async fn healthz_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> impl IntoResponse {
    let started = Instant::now();
    let request_id = propagated_request_id(&headers, &state);
    let resp = (StatusCode::OK, "ok").into_response();
    finish(&state, "/healthz", &request_id, started, resp).await
}

/// Readiness is one successful store probe through the catalog.
pub(crate) async fn readyz_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> impl IntoResponse {
    let started = Instant::now();
    let request_id = propagated_request_id(&headers, &state);
    let resp = match state.catalog.list().await {
        Ok(_) => (StatusCode::OK, "ready").into_response(),
        Err(e) => {
            error!(request_id, "readiness probe failed: {e}");
            (StatusCode::SERVICE_UNAVAILABLE, "store unreachable").into_response()
        }
    };
    finish(&state, "/readyz", &request_id, started, resp).await
}

pub(crate) async fn version_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> impl IntoResponse {
    let started = Instant::now();
    let request_id = propagated_request_id(&headers, &state);
    let payload = json!({
        "name": crate::CRATE_NAME,
        "version": env!("CARGO_PKG_VERSION"),
        "commit": option_env!("PAWHAVEN_BUILD_HASH").unwrap_or("dev"),
        "config_schema_version": crate::config::CONFIG_SCHEMA_VERSION,
    });
    let resp = Json(payload).into_response();
    finish(&state, "/version", &request_id, started, resp).await
}

pub(crate) async fn openapi_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> impl IntoResponse {
    let started = Instant::now();
    let request_id = propagated_request_id(&headers, &state);
    let resp = Json(openapi_v1_spec()).into_response();
    finish(&state, "/openapi.json", &request_id, started, resp).await
}

pub(crate) async fn metrics_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> impl IntoResponse {
    let started = Instant::now();
    let request_id = propagated_request_id(&headers, &state);
    let body = state.metrics.render(&state.cache.stats).await;
    let mut resp = (StatusCode::OK, body).into_response();
    resp.headers_mut().insert(
        "content-type",
        HeaderValue::from_static("text/plain; version=0.0.4"),
    );
    finish(&state, "/metrics", &request_id, started, resp).await
}

pub(crate) async fn list_pets_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> impl IntoResponse {
    let started = Instant::now();
    let request_id = propagated_request_id(&headers, &state);
    let resp = match state.catalog.list().await {
        Ok(pets) => Json(pets).into_response(),
        Err(e) => {
            let (status, err) =
                store_error_parts(&state, &request_id, &e, ApiError::fetch_pets_failed());
            api_error_response(status, &err)
        }
    };
    finish(&state, "/api/pets", &request_id, started, resp).await
}

pub(crate) async fn filter_pets_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<FilterRequest>,
) -> impl IntoResponse {
    let started = Instant::now();
    let request_id = propagated_request_id(&headers, &state);
    let resp = match request.into_parts() {
        Err(err) => api_error_response(StatusCode::BAD_REQUEST, &err),
        Ok((criteria, sort)) => match state.catalog.filter(&criteria, sort).await {
            Ok(pets) => Json(pets).into_response(),
            Err(e) => {
                let (status, err) =
                    store_error_parts(&state, &request_id, &e, ApiError::fetch_pets_failed());
                api_error_response(status, &err)
            }
        },
    };
    finish(&state, "/api/pets/filter", &request_id, started, resp).await
}

pub(crate) async fn get_pet_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> impl IntoResponse {
    let started = Instant::now();
    let request_id = propagated_request_id(&headers, &state);
    let resp = match PetId::parse(&id) {
        // An id the store could never have assigned is simply absent.
        Err(_) => api_error_response(StatusCode::NOT_FOUND, &ApiError::not_found()),
        Ok(id) => match state.catalog.get(&id).await {
            Ok(pet) => Json(pet).into_response(),
            Err(e) => {
                let (status, err) =
                    store_error_parts(&state, &request_id, &e, ApiError::fetch_pet_failed());
                api_error_response(status, &err)
            }
        },
    };
    finish(&state, "/api/pets/{id}", &request_id, started, resp).await
}

pub(crate) async fn similar_pets_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> impl IntoResponse {
    let started = Instant::now();
    let request_id = propagated_request_id(&headers, &state);
    let resp = match PetId::parse(&id) {
        Err(_) => api_error_response(StatusCode::NOT_FOUND, &ApiError::not_found()),
        Ok(id) => match state.catalog.similar(&id).await {
            Ok(pets) => Json(pets).into_response(),
            Err(e) => {
                let (status, err) =
                    store_error_parts(&state, &request_id, &e, ApiError::fetch_pet_failed());
                api_error_response(status, &err)
            }
        },
    };
    finish(&state, "/api/pets/{id}/similar", &request_id, started, resp).await
}

pub(crate) async fn create_pet_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(draft): Json<PetDraft>,
) -> impl IntoResponse {
    let started = Instant::now();
    let request_id = propagated_request_id(&headers, &state);
    let resp = if !admin_granted(&state, &headers) {
        api_error_response(StatusCode::UNAUTHORIZED, &ApiError::unauthorized())
    } else {
        match state.catalog.create(&draft).await {
            Ok(pet) => (StatusCode::CREATED, Json(pet)).into_response(),
            Err(e) => {
                let (status, err) =
                    store_error_parts(&state, &request_id, &e, ApiError::create_pet_failed());
                api_error_response(status, &err)
            }
        }
    };
    finish(&state, "/api/pets", &request_id, started, resp).await
}

pub(crate) async fn update_pet_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(patch): Json<PetPatch>,
) -> impl IntoResponse {
    let started = Instant::now();
    let request_id = propagated_request_id(&headers, &state);
    let resp = if !admin_granted(&state, &headers) {
        api_error_response(StatusCode::UNAUTHORIZED, &ApiError::unauthorized())
    } else {
        match PetId::parse(&id) {
            Err(_) => api_error_response(StatusCode::NOT_FOUND, &ApiError::not_found()),
            Ok(id) => match state.catalog.update(&id, &patch).await {
                Ok(pet) => Json(pet).into_response(),
                Err(e) => {
                    let (status, err) =
                        store_error_parts(&state, &request_id, &e, ApiError::update_pet_failed());
                    api_error_response(status, &err)
                }
            },
        }
    };
    finish(&state, "/api/pets/{id}", &request_id, started, resp).await
}

pub(crate) async fn delete_pet_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> impl IntoResponse {
    let started = Instant::now();
    let request_id = propagated_request_id(&headers, &state);
    let resp = if !admin_granted(&state, &headers) {
        api_error_response(StatusCode::UNAUTHORIZED, &ApiError::unauthorized())
    } else {
        match PetId::parse(&id) {
            Err(_) => api_error_response(StatusCode::NOT_FOUND, &ApiError::not_found()),
            Ok(id) => match state.catalog.delete(&id).await {
                Ok(true) => StatusCode::NO_CONTENT.into_response(),
                Ok(false) => api_error_response(StatusCode::NOT_FOUND, &ApiError::not_found()),
                Err(e) => {
                    let (status, err) =
                        store_error_parts(&state, &request_id, &e, ApiError::delete_pet_failed());
                    api_error_response(status, &err)
                }
            },
        }
    };
    finish(&state, "/api/pets/{id}", &request_id, started, resp).await
}

/// Edit-session parts collected from one multipart body. Collecting before
/// applying lets `retain` semantics work regardless of part order.
#[derive(Default)]
struct MediaCommitParts {
    retain: Vec<String>,
    photos: Vec<MediaFile>,
    video: Option<MediaFile>,
    clear_video: bool,
}

async fn read_commit_parts(multipart: &mut Multipart) -> Result<MediaCommitParts, ApiError> {
    let mut parts = MediaCommitParts::default();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::message_only(format!("Invalid media payload: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "retain" => {
                let url = field
                    .text()
                    .await
                    .map_err(|e| ApiError::message_only(format!("Invalid media payload: {e}")))?;
                parts.retain.push(url);
            }
            "photo" | "video" => {
                let file_name = field.file_name().unwrap_or("upload").to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::message_only(format!("Invalid media payload: {e}")))?;
                let file = MediaFile::new(file_name, content_type, bytes.to_vec());
                if name == "photo" {
                    parts.photos.push(file);
                } else {
                    parts.video = Some(file);
                }
            }
            "clearVideo" => parts.clear_video = true,
            _ => {}
        }
    }
    Ok(parts)
}

pub(crate) async fn commit_media_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> impl IntoResponse {
    let started = Instant::now();
    let request_id = propagated_request_id(&headers, &state);
    let resp = if admin_granted(&state, &headers) {
        commit_media_response(&state, &request_id, &id, &mut multipart).await
    } else {
        api_error_response(StatusCode::UNAUTHORIZED, &ApiError::unauthorized())
    };
    finish(&state, "/api/pets/{id}/media", &request_id, started, resp).await
}

async fn commit_media_response(
    state: &AppState,
    request_id: &str,
    raw_id: &str,
    multipart: &mut Multipart,
) -> Response {
    let id = match PetId::parse(raw_id) {
        Ok(id) => id,
        Err(_) => return api_error_response(StatusCode::NOT_FOUND, &ApiError::not_found()),
    };
    let record = match state.catalog.get(&id).await {
        Ok(record) => record,
        Err(e) => {
            let (status, err) =
                store_error_parts(state, request_id, &e, ApiError::fetch_pet_failed());
            return api_error_response(status, &err);
        }
    };
    let parts = match read_commit_parts(multipart).await {
        Ok(parts) => parts,
        Err(err) => return api_error_response(StatusCode::BAD_REQUEST, &err),
    };

    let mut session = MediaSession::for_record(&record);
    for url in &record.photos {
        if !parts.retain.iter().any(|r| r == url) {
            session.remove_photo(url);
        }
    }
    for file in parts.photos {
        session.add_photo(file);
    }
    if parts.clear_video {
        session.clear_video();
    }
    if let Some(video) = parts.video {
        session.replace_video(video);
    }

    match state.catalog.commit_media(&id, session).await {
        Ok(updated) => Json(updated).into_response(),
        Err(CommitError::Upload(e)) => {
            state.metrics.record_upload_failure();
            error!(request_id, "media commit upload failed: {e}");
            api_error_response(StatusCode::BAD_GATEWAY, &ApiError::upload_failed())
        }
        Err(CommitError::MediaDisabled) => {
            state.metrics.record_upload_failure();
            error!(request_id, "media commit rejected: no media host configured");
            api_error_response(StatusCode::BAD_GATEWAY, &ApiError::upload_failed())
        }
        Err(CommitError::Store(e)) => {
            let (status, err) =
                store_error_parts(state, request_id, &e, ApiError::update_pet_failed());
            api_error_response(status, &err)
        }
    }
}

pub(crate) async fn admin_stats_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> impl IntoResponse {
    let started = Instant::now();
    let request_id = propagated_request_id(&headers, &state);
    let resp = if !admin_granted(&state, &headers) {
        api_error_response(StatusCode::UNAUTHORIZED, &ApiError::unauthorized())
    } else {
        match state.catalog.list().await {
            Ok(pets) => Json(StatsResponse::tally(&pets)).into_response(),
            Err(e) => {
                let (status, err) =
                    store_error_parts(&state, &request_id, &e, ApiError::fetch_pets_failed());
                api_error_response(status, &err)
            }
        }
    };
    finish(&state, "/api/admin/stats", &request_id, started, resp).await
}
