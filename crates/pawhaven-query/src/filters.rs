// SPDX-License-Identifier: Apache-2.0

use pawhaven_model::PetRecord;
use serde::{Deserialize, Serialize};

/// Sentinel breed value meaning "no breed constraint". The public breed
/// dropdown submits it verbatim, so the evaluator must treat it as absent.
pub const ALL_BREEDS: &str = "All Breeds";

/// Ephemeral predicate bundle narrowing a pet list. Absent or empty fields
/// impose no constraint. Set members stay plain strings on purpose: an
/// unrecognized value matches nothing instead of failing deserialization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterCriteria {
    pub pet_id: Option<String>,
    pub breed: Option<String>,
    pub age: Option<String>,
    pub sizes: Vec<String>,
    pub genders: Vec<String>,
    pub statuses: Vec<String>,
}

impl FilterCriteria {
    /// True when no predicate constrains the result: the "show all" state,
    /// distinct from "no matches".
    #[must_use]
    pub fn is_unconstrained(&self) -> bool {
        present(&self.pet_id).is_none()
            && breed_constraint(&self.breed).is_none()
            && present(&self.age).is_none()
            && self.sizes.is_empty()
            && self.genders.is_empty()
            && self.statuses.is_empty()
    }

    #[must_use]
    pub fn matches(&self, pet: &PetRecord) -> bool {
        if let Some(id) = present(&self.pet_id) {
            if pet.id.as_str() != id {
                return false;
            }
        }
        if let Some(breed) = breed_constraint(&self.breed) {
            if pet.breed != breed {
                return false;
            }
        }
        if !self.sizes.is_empty() && !self.sizes.iter().any(|s| s == pet.size.as_str()) {
            return false;
        }
        if !self.genders.is_empty() && !self.genders.iter().any(|g| g == pet.gender.as_str()) {
            return false;
        }
        if !self.statuses.is_empty() && !self.statuses.iter().any(|s| s == pet.status.as_str()) {
            return false;
        }
        if let Some(age) = present(&self.age) {
            if pet.age != age {
                return false;
            }
        }
        true
    }
}

/// Keeps the records satisfying every non-empty predicate, preserving the
/// input collection's relative order. Never errors: unknown predicate values
/// simply match nothing.
#[must_use]
pub fn filter_pets(pets: &[PetRecord], criteria: &FilterCriteria) -> Vec<PetRecord> {
    if criteria.is_unconstrained() {
        return pets.to_vec();
    }
    pets.iter()
        .filter(|pet| criteria.matches(pet))
        .cloned()
        .collect()
}

/// Presence check treats whitespace-only values as absent, but comparisons
/// use the raw criterion text so matching stays exact.
fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

fn breed_constraint(breed: &Option<String>) -> Option<&str> {
    present(breed).filter(|b| *b != ALL_BREEDS)
}
