// SPDX-License-Identifier: Apache-2.0

use crate::{MediaFile, MediaHost, UploadError};
use pawhaven_model::PetRecord;
use std::collections::BTreeSet;

/// What should happen to the listing's video when the session commits.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum VideoEdit {
    #[default]
    Keep,
    Clear,
    Replace(MediaFile),
}

/// Accumulates one round of gallery edits before anything is persisted.
///
/// Already-hosted photos can only be kept or dropped, never injected: the
/// retained set is always a subset of what the record held when the session
/// opened, so client-supplied text can never smuggle a new url into storage.
/// New files stay local until [`MediaSession::resolve`] uploads them all.
#[derive(Debug, Default)]
pub struct MediaSession {
    persisted: Vec<String>,
    removed: BTreeSet<String>,
    pending: Vec<MediaFile>,
    video: VideoEdit,
}

/// The hosted outcome of a session: every url in `photos` is durable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedMedia {
    pub photos: Vec<String>,
    pub video: VideoOutcome,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VideoOutcome {
    Unchanged,
    Cleared,
    Hosted(String),
}

impl MediaSession {
    /// Session for a brand-new listing; nothing is persisted yet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Session over an existing listing's gallery.
    #[must_use]
    pub fn for_record(record: &PetRecord) -> Self {
        Self {
            persisted: record.photos.clone(),
            ..Self::default()
        }
    }

    /// Marks a hosted photo for removal. Unknown urls are ignored.
    pub fn remove_photo(&mut self, url: &str) {
        if self.persisted.iter().any(|p| p == url) {
            self.removed.insert(url.to_string());
        }
    }

    /// Queues a new file; it is uploaded only when the session resolves.
    pub fn add_photo(&mut self, file: MediaFile) {
        self.pending.push(file);
    }

    pub fn replace_video(&mut self, file: MediaFile) {
        self.video = VideoEdit::Replace(file);
    }

    pub fn clear_video(&mut self) {
        self.video = VideoEdit::Clear;
    }

    /// Hosted photos that survive the session, in their original order.
    #[must_use]
    pub fn retained(&self) -> Vec<String> {
        self.persisted
            .iter()
            .filter(|p| !self.removed.contains(*p))
            .cloned()
            .collect()
    }

    #[must_use]
    pub fn pending_uploads(&self) -> usize {
        let video = match self.video {
            VideoEdit::Replace(_) => 1,
            VideoEdit::Keep | VideoEdit::Clear => 0,
        };
        self.pending.len() + video
    }

    /// Uploads every queued file and assembles the final gallery: retained
    /// photos first in their original order, then new uploads in the order
    /// they were added, then the video. The first failed upload aborts the
    /// whole session so the caller never writes a partial gallery.
    pub async fn resolve(self, host: &dyn MediaHost) -> Result<ResolvedMedia, UploadError> {
        let mut photos = self.retained();
        for file in &self.pending {
            photos.push(host.upload(file).await?);
        }
        let video = match self.video {
            VideoEdit::Keep => VideoOutcome::Unchanged,
            VideoEdit::Clear => VideoOutcome::Cleared,
            VideoEdit::Replace(file) => VideoOutcome::Hosted(host.upload(&file).await?),
        };
        Ok(ResolvedMedia { photos, video })
    }
}
