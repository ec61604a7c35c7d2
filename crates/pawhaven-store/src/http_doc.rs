// SPDX-License-Identifier: Apache-2.0

use crate::{PetStore, StoreError};
use async_trait::async_trait;
use pawhaven_model::{PetDraft, PetId, PetPatch, PetRecord, ValidationError};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use std::net::IpAddr;
use std::time::Duration;
use tracing::instrument;

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: usize,
    pub base_backoff_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 4,
            base_backoff_ms: 120,
        }
    }
}

/// Backend for a remote JSON document service holding one document per pet
/// under `{base}/pets/{id}`. Reads are retried with linear backoff; mutations
/// go out once and surface `Unavailable` on any failure. The remote service
/// assigns ids and creation timestamps. Patches are merged locally over a
/// fresh read and written back whole, so update semantics match the
/// in-memory backend exactly.
pub struct HttpDocStore {
    base_url: String,
    auth_bearer: Option<String>,
    retry: RetryPolicy,
    allow_private_hosts: bool,
}

impl HttpDocStore {
    #[must_use]
    pub fn new(
        base_url: String,
        auth_bearer: Option<String>,
        retry: RetryPolicy,
        allow_private_hosts: bool,
    ) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            auth_bearer: auth_bearer.filter(|t| !t.is_empty()),
            retry,
            allow_private_hosts,
        }
    }

    fn collection_url(&self) -> String {
        format!("{}/pets", self.base_url)
    }

    fn document_url(&self, id: &PetId) -> String {
        format!("{}/pets/{}", self.base_url, id.as_str())
    }

    fn client(&self) -> reqwest::Client {
        reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .unwrap_or_else(|_| reqwest::Client::new())
    }

    fn validate_url(&self, url: &str) -> Result<(), StoreError> {
        let parsed = reqwest::Url::parse(url)
            .map_err(|e| StoreError::Unavailable(format!("invalid store url: {e}")))?;
        let host = parsed
            .host_str()
            .ok_or_else(|| StoreError::Unavailable("store url missing host".to_string()))?
            .to_ascii_lowercase();
        if !self.allow_private_hosts && (host == "localhost" || host.ends_with(".localhost")) {
            return Err(StoreError::Unavailable(
                "blocked store host: localhost".to_string(),
            ));
        }
        if let Ok(ip) = host.parse::<IpAddr>() {
            let private = match ip {
                IpAddr::V4(v4) => {
                    v4.is_private() || v4.is_loopback() || v4.is_link_local() || v4.is_broadcast()
                }
                IpAddr::V6(v6) => v6.is_loopback() || v6.is_unspecified() || v6.is_unique_local(),
            };
            if private && !self.allow_private_hosts {
                return Err(StoreError::Unavailable(
                    "blocked private store host".to_string(),
                ));
            }
        }
        Ok(())
    }

    fn auth_headers(&self) -> Result<HeaderMap, StoreError> {
        let mut headers = HeaderMap::new();
        if let Some(token) = &self.auth_bearer {
            let value = HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|e| StoreError::Unavailable(format!("invalid auth header: {e}")))?;
            headers.insert(AUTHORIZATION, value);
        }
        Ok(headers)
    }

    /// GET with linear backoff. A 404 maps to `NotFound` immediately and is
    /// never retried; other non-success statuses and transport failures are
    /// retried up to the policy limit.
    #[instrument(name = "store_doc_get_with_retry", skip(self))]
    async fn get_with_retry(&self, url: &str) -> Result<Vec<u8>, StoreError> {
        self.validate_url(url)?;
        let client = self.client();
        let headers = self.auth_headers()?;
        let mut attempt = 0;
        loop {
            attempt += 1;
            let req = client.get(url).headers(headers.clone());
            match req.send().await {
                Ok(resp) if resp.status().as_u16() == 404 => return Err(StoreError::NotFound),
                Ok(resp) if resp.status().is_success() => {
                    return resp
                        .bytes()
                        .await
                        .map(|b| b.to_vec())
                        .map_err(|e| StoreError::Unavailable(format!("read body failed: {e}")));
                }
                Ok(resp) => {
                    if attempt >= self.retry.max_attempts {
                        return Err(StoreError::Unavailable(format!(
                            "document fetch failed status={} url={url}",
                            resp.status()
                        )));
                    }
                }
                Err(e) => {
                    if attempt >= self.retry.max_attempts {
                        return Err(StoreError::Unavailable(format!(
                            "document fetch failed url={url}: {e}"
                        )));
                    }
                }
            }
            tokio::time::sleep(Duration::from_millis(
                self.retry.base_backoff_ms.saturating_mul(attempt as u64),
            ))
            .await;
        }
    }

    #[instrument(name = "store_doc_write", skip(self, body))]
    async fn write_record(
        &self,
        method: reqwest::Method,
        url: &str,
        body: &serde_json::Value,
    ) -> Result<PetRecord, StoreError> {
        self.validate_url(url)?;
        let client = self.client();
        let headers = self.auth_headers()?;
        let resp = client
            .request(method, url)
            .headers(headers)
            .json(body)
            .send()
            .await
            .map_err(|e| StoreError::Unavailable(format!("document write failed url={url}: {e}")))?;
        let status = resp.status();
        if status.as_u16() == 404 {
            return Err(StoreError::NotFound);
        }
        if status.as_u16() == 400 {
            let detail = resp
                .bytes()
                .await
                .ok()
                .and_then(|b| serde_json::from_slice::<serde_json::Value>(&b).ok())
                .and_then(|v| v.get("message").and_then(|m| m.as_str().map(ToString::to_string)))
                .unwrap_or_else(|| "rejected by document service".to_string());
            return Err(StoreError::Validation(ValidationError::single(
                "body", detail,
            )));
        }
        if !status.is_success() {
            return Err(StoreError::Unavailable(format!(
                "document write failed status={status} url={url}"
            )));
        }
        let bytes = resp
            .bytes()
            .await
            .map_err(|e| StoreError::Unavailable(format!("read body failed: {e}")))?;
        serde_json::from_slice(&bytes)
            .map_err(|e| StoreError::Unavailable(format!("pet document parse failed: {e}")))
    }
}

#[async_trait]
impl PetStore for HttpDocStore {
    fn backend_tag(&self) -> &'static str {
        "http_doc"
    }

    async fn get_all(&self) -> Result<Vec<PetRecord>, StoreError> {
        let bytes = match self.get_with_retry(&self.collection_url()).await {
            Ok(bytes) => bytes,
            Err(StoreError::NotFound) => {
                return Err(StoreError::Unavailable(
                    "pet collection missing at store url".to_string(),
                ))
            }
            Err(e) => return Err(e),
        };
        serde_json::from_slice(&bytes)
            .map_err(|e| StoreError::Unavailable(format!("pet collection parse failed: {e}")))
    }

    async fn get_by_id(&self, id: &PetId) -> Result<PetRecord, StoreError> {
        let bytes = self.get_with_retry(&self.document_url(id)).await?;
        serde_json::from_slice(&bytes)
            .map_err(|e| StoreError::Unavailable(format!("pet document parse failed: {e}")))
    }

    async fn create(&self, draft: &PetDraft) -> Result<PetRecord, StoreError> {
        draft.validate()?;
        let body = serde_json::to_value(draft)
            .map_err(|e| StoreError::Unavailable(format!("draft serialize failed: {e}")))?;
        self.write_record(reqwest::Method::POST, &self.collection_url(), &body)
            .await
    }

    async fn update(&self, id: &PetId, patch: &PetPatch) -> Result<PetRecord, StoreError> {
        let existing = self.get_by_id(id).await?;
        let merged = patch.apply_to(&existing)?;
        let body = serde_json::to_value(&merged)
            .map_err(|e| StoreError::Unavailable(format!("record serialize failed: {e}")))?;
        self.write_record(reqwest::Method::PUT, &self.document_url(id), &body)
            .await
    }

    async fn delete(&self, id: &PetId) -> Result<bool, StoreError> {
        let url = self.document_url(id);
        self.validate_url(&url)?;
        let client = self.client();
        let headers = self.auth_headers()?;
        let resp = client
            .delete(&url)
            .headers(headers)
            .send()
            .await
            .map_err(|e| StoreError::Unavailable(format!("document delete failed url={url}: {e}")))?;
        match resp.status().as_u16() {
            200 | 204 => Ok(true),
            404 => Ok(false),
            s => Err(StoreError::Unavailable(format!(
                "document delete failed status={s} url={url}"
            ))),
        }
    }
}
