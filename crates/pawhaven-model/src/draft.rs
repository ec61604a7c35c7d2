// SPDX-License-Identifier: Apache-2.0

use crate::record::{
    validate_media_url, AdoptionStatus, Gender, PetRecord, Size, AGE_MAX_LEN, BREED_MAX_LEN,
    NAME_MAX_LEN, TEMPERAMENT_MAX_LEN,
};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

/// Aggregate of every per-field problem found in a draft or patch. All fields
/// are checked before reporting so a caller can surface them inline at once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub errors: Vec<FieldError>,
}

impl ValidationError {
    #[must_use]
    pub fn single(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            errors: vec![FieldError {
                field,
                message: message.into(),
            }],
        }
    }
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid pet data")?;
        for (i, e) in self.errors.iter().enumerate() {
            let sep = if i == 0 { ": " } else { "; " };
            write!(f, "{sep}{}: {}", e.field, e.message)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

/// Create input: everything but the store-assigned `petId`/`createdAtMs`.
/// Fields arrive as plain text so validation can report per-field errors
/// instead of failing at deserialization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PetDraft {
    pub name: String,
    pub breed: String,
    pub age: String,
    pub gender: String,
    pub size: String,
    pub temperament: String,
    pub status: Option<String>,
    pub photos: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
}

/// A draft that passed validation: trimmed text, parsed enumerations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PetFields {
    pub name: String,
    pub breed: String,
    pub age: String,
    pub gender: Gender,
    pub size: Size,
    pub temperament: String,
    pub status: AdoptionStatus,
    pub photos: Vec<String>,
    pub video_url: Option<String>,
}

impl PetDraft {
    pub fn validate(&self) -> Result<PetFields, ValidationError> {
        let mut errors = Vec::new();

        let name = required_text(&mut errors, "name", "Name", &self.name, NAME_MAX_LEN);
        let breed = required_text(&mut errors, "breed", "Breed", &self.breed, BREED_MAX_LEN);
        let age = required_age(&mut errors, &self.age);
        let gender = required_parsed(&mut errors, "gender", "Gender", &self.gender, Gender::parse);
        let size = required_parsed(&mut errors, "size", "Size", &self.size, Size::parse);
        let temperament = required_text(
            &mut errors,
            "temperament",
            "Temperament",
            &self.temperament,
            TEMPERAMENT_MAX_LEN,
        );
        let status = match self.status.as_deref().map(str::trim) {
            None | Some("") => Some(AdoptionStatus::default()),
            Some(raw) => match AdoptionStatus::parse(raw) {
                Ok(status) => Some(status),
                Err(e) => {
                    errors.push(FieldError {
                        field: "status",
                        message: e.to_string(),
                    });
                    None
                }
            },
        };
        let photos = validated_photos(&mut errors, &self.photos);
        let video_url = validated_video_url(&mut errors, self.video_url.as_deref());

        if !errors.is_empty() {
            return Err(ValidationError { errors });
        }
        Ok(PetFields {
            name: name.unwrap_or_default(),
            breed: breed.unwrap_or_default(),
            age: age.unwrap_or_default(),
            gender: gender.unwrap_or(Gender::Male),
            size: size.unwrap_or(Size::Small),
            temperament: temperament.unwrap_or_default(),
            status: status.unwrap_or_default(),
            photos: photos.unwrap_or_default(),
            video_url: video_url.unwrap_or_default(),
        })
    }
}

/// Partial update: only supplied fields are validated and applied; `petId`
/// and `createdAtMs` are immutable and have no patch slots. Supplying an
/// empty `videoUrl` clears the stored one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PetPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub breed: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperament: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photos: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
}

impl PetPatch {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Checks every supplied field without applying anything.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut errors = Vec::new();
        if let Some(v) = &self.name {
            required_text(&mut errors, "name", "Name", v, NAME_MAX_LEN);
        }
        if let Some(v) = &self.breed {
            required_text(&mut errors, "breed", "Breed", v, BREED_MAX_LEN);
        }
        if let Some(v) = &self.age {
            required_age(&mut errors, v);
        }
        if let Some(v) = &self.gender {
            required_parsed(&mut errors, "gender", "Gender", v, Gender::parse);
        }
        if let Some(v) = &self.size {
            required_parsed(&mut errors, "size", "Size", v, Size::parse);
        }
        if let Some(v) = &self.temperament {
            required_text(&mut errors, "temperament", "Temperament", v, TEMPERAMENT_MAX_LEN);
        }
        if let Some(v) = &self.status {
            required_parsed(&mut errors, "status", "Status", v, AdoptionStatus::parse);
        }
        if let Some(photos) = &self.photos {
            validated_photos(&mut errors, photos);
        }
        if let Some(v) = &self.video_url {
            validated_video_url(&mut errors, Some(v));
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { errors })
        }
    }

    /// Merges the supplied fields over an existing record, validating as it
    /// goes. The photo list is fully replaced when present; absent fields
    /// stay untouched.
    pub fn apply_to(&self, existing: &PetRecord) -> Result<PetRecord, ValidationError> {
        let mut errors = Vec::new();
        let mut merged = existing.clone();
        if let Some(v) = &self.name {
            if let Some(name) = required_text(&mut errors, "name", "Name", v, NAME_MAX_LEN) {
                merged.name = name;
            }
        }
        if let Some(v) = &self.breed {
            if let Some(breed) = required_text(&mut errors, "breed", "Breed", v, BREED_MAX_LEN) {
                merged.breed = breed;
            }
        }
        if let Some(v) = &self.age {
            if let Some(age) = required_age(&mut errors, v) {
                merged.age = age;
            }
        }
        if let Some(v) = &self.gender {
            if let Some(gender) = required_parsed(&mut errors, "gender", "Gender", v, Gender::parse)
            {
                merged.gender = gender;
            }
        }
        if let Some(v) = &self.size {
            if let Some(size) = required_parsed(&mut errors, "size", "Size", v, Size::parse) {
                merged.size = size;
            }
        }
        if let Some(v) = &self.temperament {
            if let Some(temperament) =
                required_text(&mut errors, "temperament", "Temperament", v, TEMPERAMENT_MAX_LEN)
            {
                merged.temperament = temperament;
            }
        }
        if let Some(v) = &self.status {
            if let Some(status) =
                required_parsed(&mut errors, "status", "Status", v, AdoptionStatus::parse)
            {
                merged.status = status;
            }
        }
        if let Some(photos) = &self.photos {
            if let Some(photos) = validated_photos(&mut errors, photos) {
                merged.photos = photos;
            }
        }
        if let Some(v) = &self.video_url {
            if let Some(video_url) = validated_video_url(&mut errors, Some(v)) {
                merged.video_url = video_url;
            }
        }
        if errors.is_empty() {
            Ok(merged)
        } else {
            Err(ValidationError { errors })
        }
    }
}

fn required_text(
    errors: &mut Vec<FieldError>,
    field: &'static str,
    label: &str,
    value: &str,
    max: usize,
) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        errors.push(FieldError {
            field,
            message: format!("{label} is required"),
        });
        return None;
    }
    if trimmed.len() > max {
        errors.push(FieldError {
            field,
            message: format!("{label} exceeds max length {max}"),
        });
        return None;
    }
    Some(trimmed.to_string())
}

fn required_age(errors: &mut Vec<FieldError>, value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        errors.push(FieldError {
            field: "age",
            message: "Age is required".to_string(),
        });
        return None;
    }
    if trimmed.len() > AGE_MAX_LEN || !trimmed.chars().all(|c| c.is_ascii_digit()) {
        errors.push(FieldError {
            field: "age",
            message: "Age must be a non-negative whole number".to_string(),
        });
        return None;
    }
    Some(trimmed.to_string())
}

fn required_parsed<T>(
    errors: &mut Vec<FieldError>,
    field: &'static str,
    label: &str,
    value: &str,
    parse: impl Fn(&str) -> Result<T, crate::record::ParseError>,
) -> Option<T> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        errors.push(FieldError {
            field,
            message: format!("{label} is required"),
        });
        return None;
    }
    match parse(trimmed) {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            errors.push(FieldError {
                field,
                message: e.to_string(),
            });
            None
        }
    }
}

fn validated_photos(errors: &mut Vec<FieldError>, photos: &[String]) -> Option<Vec<String>> {
    let mut out = Vec::with_capacity(photos.len());
    for url in photos {
        if let Err(e) = validate_media_url("photos", url) {
            errors.push(FieldError {
                field: "photos",
                message: e.to_string(),
            });
            return None;
        }
        out.push(url.trim().to_string());
    }
    Some(out)
}

fn validated_video_url(
    errors: &mut Vec<FieldError>,
    video_url: Option<&str>,
) -> Option<Option<String>> {
    match video_url.map(str::trim) {
        None | Some("") => Some(None),
        Some(url) => match validate_media_url("videoUrl", url) {
            Ok(()) => Some(Some(url.to_string())),
            Err(e) => {
                errors.push(FieldError {
                    field: "videoUrl",
                    message: e.to_string(),
                });
                None
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::PetId;

    fn draft() -> PetDraft {
        PetDraft {
            name: "Buddy".to_string(),
            breed: "Labrador".to_string(),
            age: "5".to_string(),
            gender: "Male".to_string(),
            size: "Large".to_string(),
            temperament: "Friendly".to_string(),
            status: Some("available".to_string()),
            photos: vec!["https://cdn.example/a.jpg".to_string()],
            video_url: None,
        }
    }

    fn record() -> PetRecord {
        let fields = draft().validate().unwrap();
        PetRecord {
            id: PetId::parse("pet1").unwrap(),
            name: fields.name,
            breed: fields.breed,
            age: fields.age,
            gender: fields.gender,
            size: fields.size,
            temperament: fields.temperament,
            status: fields.status,
            photos: fields.photos,
            video_url: fields.video_url,
            created_at_ms: 1,
        }
    }

    #[test]
    fn valid_draft_produces_typed_fields() {
        let fields = draft().validate().unwrap();
        assert_eq!(fields.gender, Gender::Male);
        assert_eq!(fields.size, Size::Large);
        assert_eq!(fields.status, AdoptionStatus::Available);
    }

    #[test]
    fn missing_required_fields_are_all_reported() {
        let empty = PetDraft::default();
        let err = empty.validate().unwrap_err();
        let fields: Vec<&str> = err.errors.iter().map(|e| e.field).collect();
        assert!(fields.contains(&"name"));
        assert!(fields.contains(&"breed"));
        assert!(fields.contains(&"age"));
        assert!(fields.contains(&"gender"));
        assert!(fields.contains(&"size"));
        assert!(fields.contains(&"temperament"));
        let name_error = err.errors.iter().find(|e| e.field == "name").unwrap();
        assert_eq!(name_error.message, "Name is required");
    }

    #[test]
    fn status_defaults_to_available_when_absent() {
        let mut d = draft();
        d.status = None;
        assert_eq!(d.validate().unwrap().status, AdoptionStatus::Available);
        d.status = Some("retired".to_string());
        assert!(d.validate().is_err());
    }

    #[test]
    fn age_is_text_but_must_be_a_whole_number() {
        let mut d = draft();
        d.age = "05".to_string();
        assert_eq!(d.validate().unwrap().age, "05");
        d.age = "five".to_string();
        let err = d.validate().unwrap_err();
        assert_eq!(err.errors[0].field, "age");
    }

    #[test]
    fn preview_references_never_validate() {
        let mut d = draft();
        d.photos.push("blob:http://localhost/preview".to_string());
        let err = d.validate().unwrap_err();
        assert_eq!(err.errors[0].field, "photos");
    }

    #[test]
    fn patch_applies_only_supplied_fields() {
        let existing = record();
        let patch = PetPatch {
            status: Some("adopted".to_string()),
            ..PetPatch::default()
        };
        let merged = patch.apply_to(&existing).unwrap();
        assert_eq!(merged.status, AdoptionStatus::Adopted);
        assert_eq!(merged.name, existing.name);
        assert_eq!(merged.photos, existing.photos);
        assert_eq!(merged.id, existing.id);
    }

    #[test]
    fn patch_replaces_the_photo_list_wholesale() {
        let existing = record();
        let patch = PetPatch {
            photos: Some(vec!["https://cdn.example/b.jpg".to_string()]),
            ..PetPatch::default()
        };
        let merged = patch.apply_to(&existing).unwrap();
        assert_eq!(merged.photos, vec!["https://cdn.example/b.jpg".to_string()]);
    }

    #[test]
    fn patch_rejects_invalid_values_without_merging() {
        let existing = record();
        let patch = PetPatch {
            name: Some("   ".to_string()),
            ..PetPatch::default()
        };
        let err = patch.apply_to(&existing).unwrap_err();
        assert_eq!(err.errors[0].field, "name");
        assert_eq!(err.errors[0].message, "Name is required");
    }

    #[test]
    fn empty_video_url_clears_the_stored_one() {
        let mut existing = record();
        existing.video_url = Some("https://cdn.example/v.mp4".to_string());
        let patch = PetPatch {
            video_url: Some(String::new()),
            ..PetPatch::default()
        };
        let merged = patch.apply_to(&existing).unwrap();
        assert_eq!(merged.video_url, None);
    }

    #[test]
    fn wire_names_are_camel_case() {
        let patch: PetPatch = serde_json::from_str(r#"{"videoUrl":"https://x/y.mp4"}"#).unwrap();
        assert_eq!(patch.video_url.as_deref(), Some("https://x/y.mp4"));
        let draft: PetDraft = serde_json::from_str(r#"{"name":"Rex"}"#).unwrap();
        assert_eq!(draft.name, "Rex");
    }
}
