#![forbid(unsafe_code)]
//! Pet record model SSOT: identifiers, enumerations, record shape, and the
//! validation rules applied before anything reaches a store.

mod draft;
mod record;

pub use draft::{FieldError, PetDraft, PetFields, PetPatch, ValidationError};
pub use record::{
    validate_media_url, AdoptionStatus, Gender, ParseError, PetId, PetRecord, Size, AGE_MAX_LEN,
    BREED_MAX_LEN, MEDIA_URL_MAX_LEN, NAME_MAX_LEN, PET_ID_MAX_LEN, TEMPERAMENT_MAX_LEN,
};

pub const CRATE_NAME: &str = "pawhaven-model";
