// SPDX-License-Identifier: Apache-2.0

use crate::cache::{ListingCache, PETS_COLLECTION};
use async_trait::async_trait;
use pawhaven_media::{MediaFile, MediaHost, MediaSession, UploadError, VideoOutcome};
use pawhaven_model::{PetDraft, PetId, PetPatch, PetRecord};
use pawhaven_query::{filter_pets, similar_pets, sort_pets, FilterCriteria, SortOrder};
use pawhaven_store::{PetStore, StoreError};
use std::fmt::{Display, Formatter};
use std::sync::Arc;
use tracing::warn;

/// Failure surface of a media-commit: the upload step or the store write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitError {
    Upload(UploadError),
    Store(StoreError),
    /// New files were submitted but no media host is configured.
    MediaDisabled,
}

impl Display for CommitError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Upload(err) => write!(f, "{err}"),
            Self::Store(err) => write!(f, "{err}"),
            Self::MediaDisabled => f.write_str("no media host configured"),
        }
    }
}

impl std::error::Error for CommitError {}

impl From<UploadError> for CommitError {
    fn from(err: UploadError) -> Self {
        Self::Upload(err)
    }
}

impl From<StoreError> for CommitError {
    fn from(err: StoreError) -> Self {
        Self::Store(err)
    }
}

/// Stand-in host for retain-only commits when no real host is wired in.
/// [`PetCatalog::commit_media`] guarantees it is never asked to upload.
struct NoMediaHost;

#[async_trait]
impl MediaHost for NoMediaHost {
    fn host_tag(&self) -> &'static str {
        "none"
    }

    async fn upload(&self, _file: &MediaFile) -> Result<String, UploadError> {
        Err(UploadError("no media host configured".to_string()))
    }
}

/// The catalog service: one store, one listing cache, optionally one media
/// host. Reads go through the cache; every successful mutation invalidates
/// the all-pets snapshot so list views track the authoritative store.
pub struct PetCatalog {
    store: Arc<dyn PetStore>,
    media: Option<Arc<dyn MediaHost>>,
    cache: Arc<ListingCache>,
    similar_limit: usize,
}

impl PetCatalog {
    #[must_use]
    pub fn new(
        store: Arc<dyn PetStore>,
        media: Option<Arc<dyn MediaHost>>,
        cache: Arc<ListingCache>,
        similar_limit: usize,
    ) -> Self {
        Self {
            store,
            media,
            cache,
            similar_limit,
        }
    }

    pub async fn list(&self) -> Result<Vec<PetRecord>, StoreError> {
        if let Some(cached) = self.cache.get(PETS_COLLECTION).await {
            return Ok(cached);
        }
        let pets = self.store.get_all().await?;
        self.cache.put(PETS_COLLECTION, pets.clone()).await;
        Ok(pets)
    }

    pub async fn get(&self, id: &PetId) -> Result<PetRecord, StoreError> {
        self.store.get_by_id(id).await
    }

    /// Evaluates the criteria over the cached collection and applies the
    /// optional display order.
    pub async fn filter(
        &self,
        criteria: &FilterCriteria,
        sort: Option<SortOrder>,
    ) -> Result<Vec<PetRecord>, StoreError> {
        let pets = self.list().await?;
        let mut out = filter_pets(&pets, criteria);
        if let Some(order) = sort {
            sort_pets(&mut out, order);
        }
        Ok(out)
    }

    /// Companion list for a detail view. The subject must exist; a failing
    /// collection read is a secondary fetch and degrades to an empty list.
    pub async fn similar(&self, id: &PetId) -> Result<Vec<PetRecord>, StoreError> {
        let subject = self.store.get_by_id(id).await?;
        let pets = match self.list().await {
            Ok(pets) => pets,
            Err(e) => {
                warn!("similar-pets collection read failed, degrading to empty: {e}");
                Vec::new()
            }
        };
        Ok(similar_pets(&pets, &subject, self.similar_limit))
    }

    pub async fn create(&self, draft: &PetDraft) -> Result<PetRecord, StoreError> {
        let created = self.store.create(draft).await?;
        self.cache.invalidate(PETS_COLLECTION).await;
        Ok(created)
    }

    pub async fn update(&self, id: &PetId, patch: &PetPatch) -> Result<PetRecord, StoreError> {
        let updated = self.store.update(id, patch).await?;
        self.cache.invalidate(PETS_COLLECTION).await;
        Ok(updated)
    }

    pub async fn delete(&self, id: &PetId) -> Result<bool, StoreError> {
        let removed = self.store.delete(id).await?;
        if removed {
            self.cache.invalidate(PETS_COLLECTION).await;
        }
        Ok(removed)
    }

    /// Commits an edit session: uploads first, store write second. A failed
    /// upload aborts before anything is written, so the record never holds a
    /// half-updated gallery.
    pub async fn commit_media(
        &self,
        id: &PetId,
        session: MediaSession,
    ) -> Result<PetRecord, CommitError> {
        let resolved = match &self.media {
            Some(host) => session.resolve(host.as_ref()).await?,
            None if session.pending_uploads() > 0 => return Err(CommitError::MediaDisabled),
            None => session.resolve(&NoMediaHost).await?,
        };
        let video_url = match resolved.video {
            VideoOutcome::Unchanged => None,
            VideoOutcome::Cleared => Some(String::new()),
            VideoOutcome::Hosted(url) => Some(url),
        };
        let patch = PetPatch {
            photos: Some(resolved.photos),
            video_url,
            ..PetPatch::default()
        };
        let updated = self.store.update(id, &patch).await?;
        self.cache.invalidate(PETS_COLLECTION).await;
        Ok(updated)
    }
}
