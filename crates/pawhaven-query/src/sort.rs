// SPDX-License-Identifier: Apache-2.0

use pawhaven_model::{ParseError, PetRecord};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Display-only ordering directive, independent of filtering. `Newest` and
/// `Oldest` use the store-assigned creation timestamp with a name tiebreak.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[non_exhaustive]
pub enum SortOrder {
    Newest,
    Oldest,
    NameAscending,
    NameDescending,
}

impl SortOrder {
    pub fn parse(raw: &str) -> Result<Self, ParseError> {
        match raw {
            "newest" => Ok(Self::Newest),
            "oldest" => Ok(Self::Oldest),
            "name-ascending" => Ok(Self::NameAscending),
            "name-descending" => Ok(Self::NameDescending),
            _ => Err(ParseError::InvalidFormat(
                "sort must be one of 'newest', 'oldest', 'name-ascending', 'name-descending'",
            )),
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Newest => "newest",
            Self::Oldest => "oldest",
            Self::NameAscending => "name-ascending",
            Self::NameDescending => "name-descending",
        }
    }
}

/// Stable in-place sort. Name comparisons are case-insensitive with the raw
/// name and then the id as deterministic tiebreaks.
pub fn sort_pets(pets: &mut [PetRecord], order: SortOrder) {
    match order {
        SortOrder::Newest => pets.sort_by(|a, b| {
            b.created_at_ms
                .cmp(&a.created_at_ms)
                .then_with(|| name_cmp(a, b))
        }),
        SortOrder::Oldest => pets.sort_by(|a, b| {
            a.created_at_ms
                .cmp(&b.created_at_ms)
                .then_with(|| name_cmp(a, b))
        }),
        SortOrder::NameAscending => pets.sort_by(name_cmp),
        SortOrder::NameDescending => pets.sort_by(|a, b| name_cmp(b, a)),
    }
}

fn name_cmp(a: &PetRecord, b: &PetRecord) -> Ordering {
    a.name
        .to_lowercase()
        .cmp(&b.name.to_lowercase())
        .then_with(|| a.name.cmp(&b.name))
        .then_with(|| a.id.as_str().cmp(b.id.as_str()))
}

/// Detail-page companion list: different id, same breed or same size, in
/// collection order, truncated to `limit`.
#[must_use]
pub fn similar_pets(pets: &[PetRecord], subject: &PetRecord, limit: usize) -> Vec<PetRecord> {
    pets.iter()
        .filter(|p| p.id != subject.id && (p.breed == subject.breed || p.size == subject.size))
        .take(limit)
        .cloned()
        .collect()
}
