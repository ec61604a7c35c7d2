// SPDX-License-Identifier: Apache-2.0

use crate::{MediaFile, MediaHost, UploadError};
use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::Mutex;

/// Test host used across the workspace. Counts calls, records what it was
/// asked to host, and can be armed to fail from a given call on.
pub struct FakeMediaHost {
    pub uploads: Mutex<Vec<String>>,
    pub upload_calls: AtomicU64,
    fail_from: AtomicU64,
}

impl Default for FakeMediaHost {
    fn default() -> Self {
        Self {
            uploads: Mutex::new(Vec::new()),
            upload_calls: AtomicU64::new(0),
            fail_from: AtomicU64::new(0),
        }
    }
}

impl FakeMediaHost {
    /// Every upload from here on fails.
    pub fn fail_all(&self) {
        self.fail_from.store(1, Ordering::Relaxed);
    }

    /// Uploads succeed until `call`, then fail (1-based, counted across the
    /// host's lifetime).
    pub fn fail_from(&self, call: u64) {
        self.fail_from.store(call, Ordering::Relaxed);
    }
}

#[async_trait]
impl MediaHost for FakeMediaHost {
    fn host_tag(&self) -> &'static str {
        "fake"
    }

    async fn upload(&self, file: &MediaFile) -> Result<String, UploadError> {
        let n = self.upload_calls.fetch_add(1, Ordering::Relaxed) + 1;
        let armed = self.fail_from.load(Ordering::Relaxed);
        if armed != 0 && n >= armed {
            return Err(UploadError(format!("fake host armed to fail call {n}")));
        }
        let url = format!("https://media.invalid/u{n}/{}", file.file_name);
        self.uploads.lock().await.push(url.clone());
        Ok(url)
    }
}
