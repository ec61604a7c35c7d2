// SPDX-License-Identifier: Apache-2.0

use crate::{unix_millis, PetStore, StoreError};
use async_trait::async_trait;
use pawhaven_model::{PetDraft, PetId, PetPatch, PetRecord};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::Mutex;

/// Default in-process backend. Records live in a vec so the collection keeps
/// creation order; ids are `pet1`, `pet2`, ... and continue after the highest
/// seeded `pet{n}` when constructed through [`MemoryPetStore::with_pets`].
pub struct MemoryPetStore {
    pets: Mutex<Vec<PetRecord>>,
    next_id: AtomicU64,
}

impl MemoryPetStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            pets: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(1),
        }
    }

    #[must_use]
    pub fn with_pets(pets: Vec<PetRecord>) -> Self {
        let next = pets
            .iter()
            .filter_map(|p| p.id.as_str().strip_prefix("pet"))
            .filter_map(|n| n.parse::<u64>().ok())
            .max()
            .map_or(1, |n| n.saturating_add(1));
        Self {
            pets: Mutex::new(pets),
            next_id: AtomicU64::new(next),
        }
    }
}

impl Default for MemoryPetStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PetStore for MemoryPetStore {
    fn backend_tag(&self) -> &'static str {
        "memory"
    }

    async fn get_all(&self) -> Result<Vec<PetRecord>, StoreError> {
        Ok(self.pets.lock().await.clone())
    }

    async fn get_by_id(&self, id: &PetId) -> Result<PetRecord, StoreError> {
        self.pets
            .lock()
            .await
            .iter()
            .find(|p| &p.id == id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn create(&self, draft: &PetDraft) -> Result<PetRecord, StoreError> {
        let fields = draft.validate()?;
        let seq = self.next_id.fetch_add(1, Ordering::SeqCst);
        let id = PetId::parse(&format!("pet{seq}"))
            .map_err(|e| StoreError::Unavailable(format!("assigned id rejected: {e}")))?;
        let record = PetRecord {
            id,
            name: fields.name,
            breed: fields.breed,
            age: fields.age,
            gender: fields.gender,
            size: fields.size,
            temperament: fields.temperament,
            status: fields.status,
            photos: fields.photos,
            video_url: fields.video_url,
            created_at_ms: unix_millis(),
        };
        self.pets.lock().await.push(record.clone());
        Ok(record)
    }

    async fn update(&self, id: &PetId, patch: &PetPatch) -> Result<PetRecord, StoreError> {
        let mut pets = self.pets.lock().await;
        let slot = pets
            .iter_mut()
            .find(|p| &p.id == id)
            .ok_or(StoreError::NotFound)?;
        let merged = patch.apply_to(slot)?;
        *slot = merged.clone();
        Ok(merged)
    }

    async fn delete(&self, id: &PetId) -> Result<bool, StoreError> {
        let mut pets = self.pets.lock().await;
        let before = pets.len();
        pets.retain(|p| &p.id != id);
        Ok(pets.len() != before)
    }
}
