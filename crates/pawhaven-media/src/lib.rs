#![forbid(unsafe_code)]
//! Media hosting for pet listings.
//!
//! Browsers hold selected files as local previews; nothing here ever stores
//! one. A [`MediaSession`] collects the edits made to a listing's gallery and
//! [`MediaSession::resolve`] uploads every new file through a [`MediaHost`]
//! before any hosted url is handed to the caller. One failed upload fails the
//! whole session, so a listing never ends up half-updated.

mod fake_host;
mod hosts;
mod session;

use async_trait::async_trait;
use std::fmt::{Display, Formatter};

pub use fake_host::FakeMediaHost;
pub use hosts::{CdnUploader, LocalDirHost};
pub use session::{MediaSession, ResolvedMedia, VideoEdit, VideoOutcome};

pub const CRATE_NAME: &str = "pawhaven-media";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadError(pub String);

impl Display for UploadError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "upload failed: {}", self.0)
    }
}

impl std::error::Error for UploadError {}

/// One file received from a client, still unhosted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl MediaFile {
    #[must_use]
    pub fn new(file_name: impl Into<String>, content_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }
}

/// Something that turns a raw file into a durable public url.
#[async_trait]
pub trait MediaHost: Send + Sync + 'static {
    fn host_tag(&self) -> &'static str {
        "unknown"
    }

    async fn upload(&self, file: &MediaFile) -> Result<String, UploadError>;
}
