#![forbid(unsafe_code)]
//! Pet listing persistence behind one async trait.
//!
//! Two backends ship here: [`MemoryPetStore`], the default in-process map,
//! and [`HttpDocStore`], which keeps the same contract against a remote JSON
//! document service. Both assign ids and creation timestamps on create and
//! both run the model-layer validation, so callers see identical behavior
//! whichever backend is wired in.

mod error;
mod http_doc;
mod memory;

use async_trait::async_trait;
use pawhaven_model::{PetDraft, PetId, PetPatch, PetRecord};

pub use error::StoreError;
pub use http_doc::{HttpDocStore, RetryPolicy};
pub use memory::MemoryPetStore;

pub const CRATE_NAME: &str = "pawhaven-store";

/// Storage contract for pet listings. Collection order is creation order.
#[async_trait]
pub trait PetStore: Send + Sync + 'static {
    fn backend_tag(&self) -> &'static str {
        "unknown"
    }

    async fn get_all(&self) -> Result<Vec<PetRecord>, StoreError>;
    async fn get_by_id(&self, id: &PetId) -> Result<PetRecord, StoreError>;
    async fn create(&self, draft: &PetDraft) -> Result<PetRecord, StoreError>;
    async fn update(&self, id: &PetId, patch: &PetPatch) -> Result<PetRecord, StoreError>;
    /// Returns whether a record was removed. Absent ids are not an error.
    async fn delete(&self, id: &PetId) -> Result<bool, StoreError>;
}

/// Milliseconds since the unix epoch, zero if the clock sits before it.
#[must_use]
pub fn unix_millis() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
}
