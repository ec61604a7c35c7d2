// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

pub const PET_ID_MAX_LEN: usize = 64;
pub const NAME_MAX_LEN: usize = 120;
pub const BREED_MAX_LEN: usize = 120;
pub const AGE_MAX_LEN: usize = 8;
pub const TEMPERAMENT_MAX_LEN: usize = 400;
pub const MEDIA_URL_MAX_LEN: usize = 2048;

#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ParseError {
    Empty(&'static str),
    TooLong(&'static str, usize),
    InvalidFormat(&'static str),
}

impl Display for ParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty(name) => write!(f, "{name} must not be empty"),
            Self::TooLong(name, max) => write!(f, "{name} exceeds max length {max}"),
            Self::InvalidFormat(msg) => f.write_str(msg),
        }
    }
}

impl std::error::Error for ParseError {}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
#[serde(transparent)]
#[non_exhaustive]
pub struct PetId(String);

impl PetId {
    pub fn parse(input: &str) -> Result<Self, ParseError> {
        let s = input.trim();
        if s.is_empty() {
            return Err(ParseError::Empty("pet id"));
        }
        if s.len() > PET_ID_MAX_LEN {
            return Err(ParseError::TooLong("pet id", PET_ID_MAX_LEN));
        }
        if !s
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(ParseError::InvalidFormat("pet id must match [A-Za-z0-9_-]+"));
        }
        Ok(Self(s.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl Display for PetId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
#[non_exhaustive]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub fn parse(raw: &str) -> Result<Self, ParseError> {
        match raw {
            "Male" => Ok(Self::Male),
            "Female" => Ok(Self::Female),
            _ => Err(ParseError::InvalidFormat(
                "gender must be one of 'Male', 'Female'",
            )),
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Male => "Male",
            Self::Female => "Female",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
#[non_exhaustive]
pub enum Size {
    Small,
    Medium,
    Large,
}

impl Size {
    pub fn parse(raw: &str) -> Result<Self, ParseError> {
        match raw {
            "Small" => Ok(Self::Small),
            "Medium" => Ok(Self::Medium),
            "Large" => Ok(Self::Large),
            _ => Err(ParseError::InvalidFormat(
                "size must be one of 'Small', 'Medium', 'Large'",
            )),
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Small => "Small",
            Self::Medium => "Medium",
            Self::Large => "Large",
        }
    }
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord,
)]
#[serde(rename_all = "lowercase")]
#[non_exhaustive]
pub enum AdoptionStatus {
    #[default]
    Available,
    Adopted,
    Pending,
}

impl AdoptionStatus {
    pub fn parse(raw: &str) -> Result<Self, ParseError> {
        match raw {
            "available" => Ok(Self::Available),
            "adopted" => Ok(Self::Adopted),
            "pending" => Ok(Self::Pending),
            _ => Err(ParseError::InvalidFormat(
                "status must be one of 'available', 'adopted', 'pending'",
            )),
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Adopted => "adopted",
            Self::Pending => "pending",
        }
    }
}

/// Media URLs attached to a record must be durable references. Blob and data
/// URLs are in-memory preview handles and never survive an edit session.
pub fn validate_media_url(field: &'static str, url: &str) -> Result<(), ParseError> {
    let s = url.trim();
    if s.is_empty() {
        return Err(ParseError::Empty(field));
    }
    if s.len() > MEDIA_URL_MAX_LEN {
        return Err(ParseError::TooLong(field, MEDIA_URL_MAX_LEN));
    }
    let lower = s.to_ascii_lowercase();
    if lower.starts_with("blob:") || lower.starts_with("data:") {
        return Err(ParseError::InvalidFormat(
            "media url must be a hosted url, not a local preview reference",
        ));
    }
    Ok(())
}

/// The adoptable-animal entity. `id` and `created_at_ms` are assigned by the
/// store at creation and immutable afterwards; `photos` keeps insertion order
/// and its first element is the cover image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PetRecord {
    #[serde(rename = "petId")]
    pub id: PetId,
    pub name: String,
    pub breed: String,
    pub age: String,
    pub gender: Gender,
    pub size: Size,
    pub temperament: String,
    pub status: AdoptionStatus,
    #[serde(default)]
    pub photos: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
    #[serde(default)]
    pub created_at_ms: u64,
}

impl PetRecord {
    #[must_use]
    pub fn cover_photo(&self) -> Option<&str> {
        self.photos.first().map(String::as_str)
    }
}
