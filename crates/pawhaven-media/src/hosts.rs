// SPDX-License-Identifier: Apache-2.0

use crate::{MediaFile, MediaHost, UploadError};
use async_trait::async_trait;
use std::net::IpAddr;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::instrument;

/// Unsigned-upload CDN ingest. One POST per file, no retries; a failed
/// upload fails the surrounding edit session instead.
pub struct CdnUploader {
    endpoint: String,
    upload_preset: String,
    allow_private_hosts: bool,
}

impl CdnUploader {
    #[must_use]
    pub fn new(endpoint: String, upload_preset: String, allow_private_hosts: bool) -> Self {
        Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            upload_preset,
            allow_private_hosts,
        }
    }

    fn client(&self) -> reqwest::Client {
        reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .unwrap_or_else(|_| reqwest::Client::new())
    }

    fn validate_url(&self, url: &str) -> Result<(), UploadError> {
        let parsed =
            reqwest::Url::parse(url).map_err(|e| UploadError(format!("invalid cdn url: {e}")))?;
        let host = parsed
            .host_str()
            .ok_or_else(|| UploadError("cdn url missing host".to_string()))?
            .to_ascii_lowercase();
        if !self.allow_private_hosts && (host == "localhost" || host.ends_with(".localhost")) {
            return Err(UploadError("blocked cdn host: localhost".to_string()));
        }
        if let Ok(ip) = host.parse::<IpAddr>() {
            let private = match ip {
                IpAddr::V4(v4) => {
                    v4.is_private() || v4.is_loopback() || v4.is_link_local() || v4.is_broadcast()
                }
                IpAddr::V6(v6) => v6.is_loopback() || v6.is_unspecified() || v6.is_unique_local(),
            };
            if private && !self.allow_private_hosts {
                return Err(UploadError("blocked private cdn host".to_string()));
            }
        }
        Ok(())
    }
}

#[async_trait]
impl MediaHost for CdnUploader {
    fn host_tag(&self) -> &'static str {
        "cdn"
    }

    #[instrument(name = "media_cdn_upload", skip(self, file))]
    async fn upload(&self, file: &MediaFile) -> Result<String, UploadError> {
        self.validate_url(&self.endpoint)?;
        let part = reqwest::multipart::Part::bytes(file.bytes.clone())
            .file_name(file.file_name.clone())
            .mime_str(&file.content_type)
            .map_err(|e| {
                UploadError(format!("invalid content type {}: {e}", file.content_type))
            })?;
        let form = reqwest::multipart::Form::new()
            .text("upload_preset", self.upload_preset.clone())
            .part("file", part);
        let resp = self
            .client()
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(|e| UploadError(format!("cdn request failed: {e}")))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(UploadError(format!("cdn rejected upload status={status}")));
        }
        let body: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| UploadError(format!("cdn response parse failed: {e}")))?;
        body.get("secure_url")
            .and_then(serde_json::Value::as_str)
            .map(ToString::to_string)
            .ok_or_else(|| UploadError("cdn response missing secure_url".to_string()))
    }
}

/// Filesystem host for single-node deployments: files land under `root` and
/// are served from `public_base` by whatever fronts the directory.
pub struct LocalDirHost {
    root: PathBuf,
    public_base: String,
    seq: AtomicU64,
}

impl LocalDirHost {
    #[must_use]
    pub fn new(root: PathBuf, public_base: String) -> Self {
        Self {
            root,
            public_base: public_base.trim_end_matches('/').to_string(),
            seq: AtomicU64::new(1),
        }
    }

    fn sanitized(name: &str) -> String {
        let cleaned: String = name
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                    c
                } else {
                    '-'
                }
            })
            .collect();
        // Leading dot sequences would escape or hide the file.
        let trimmed = cleaned.trim_matches(|c: char| c == '-' || c == '.');
        if trimmed.is_empty() {
            "file".to_string()
        } else {
            trimmed.chars().take(80).collect()
        }
    }
}

#[async_trait]
impl MediaHost for LocalDirHost {
    fn host_tag(&self) -> &'static str {
        "localdir"
    }

    #[instrument(name = "media_local_upload", skip(self, file))]
    async fn upload(&self, file: &MediaFile) -> Result<String, UploadError> {
        let n = self.seq.fetch_add(1, Ordering::SeqCst);
        let name = format!("{n}-{}", Self::sanitized(&file.file_name));
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|e| UploadError(format!("media dir create failed: {e}")))?;
        tokio::fs::write(self.root.join(&name), &file.bytes)
            .await
            .map_err(|e| UploadError(format!("media write failed: {e}")))?;
        Ok(format!("{}/{name}", self.public_base))
    }
}
