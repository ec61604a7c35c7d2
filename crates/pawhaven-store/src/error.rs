// SPDX-License-Identifier: Apache-2.0

use pawhaven_model::ValidationError;
use std::fmt::{Display, Formatter};

/// Failure surface shared by every `PetStore` backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// No pet exists under the requested id.
    NotFound,
    /// Submitted fields failed validation; carries per-field detail.
    Validation(ValidationError),
    /// The backend could not complete the operation.
    Unavailable(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound => f.write_str("pet not found"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::Unavailable(detail) => write!(f, "store unavailable: {detail}"),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<ValidationError> for StoreError {
    fn from(err: ValidationError) -> Self {
        Self::Validation(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_carries_field_detail() {
        let err = StoreError::from(ValidationError::single("name", "Name is required"));
        assert_eq!(err.to_string(), "invalid pet data: name: Name is required");
        assert_eq!(StoreError::NotFound.to_string(), "pet not found");
        assert_eq!(
            StoreError::Unavailable("boom".to_string()).to_string(),
            "store unavailable: boom"
        );
    }
}
