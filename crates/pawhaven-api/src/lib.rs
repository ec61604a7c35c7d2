#![forbid(unsafe_code)]

use pawhaven_model::{AdoptionStatus, PetRecord, ValidationError};
use pawhaven_query::{FilterCriteria, SortOrder};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

pub const CRATE_NAME: &str = "pawhaven-api";

/// One entry of the validation `errors` array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldIssue {
    pub field: String,
    pub message: String,
}

/// The error envelope every non-2xx JSON response carries. `errors` is
/// present only for validation failures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<FieldIssue>,
}

impl ApiError {
    #[must_use]
    pub fn message_only(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            errors: Vec::new(),
        }
    }

    #[must_use]
    pub fn not_found() -> Self {
        Self::message_only("Pet not found")
    }

    #[must_use]
    pub fn unauthorized() -> Self {
        Self::message_only("Admin token required")
    }

    #[must_use]
    pub fn fetch_pets_failed() -> Self {
        Self::message_only("Failed to fetch pets")
    }

    #[must_use]
    pub fn fetch_pet_failed() -> Self {
        Self::message_only("Failed to fetch pet")
    }

    #[must_use]
    pub fn create_pet_failed() -> Self {
        Self::message_only("Failed to create pet")
    }

    #[must_use]
    pub fn update_pet_failed() -> Self {
        Self::message_only("Failed to update pet")
    }

    #[must_use]
    pub fn delete_pet_failed() -> Self {
        Self::message_only("Failed to delete pet")
    }

    #[must_use]
    pub fn upload_failed() -> Self {
        Self::message_only("Failed to upload media")
    }

    #[must_use]
    pub fn invalid_pet_data(err: &ValidationError) -> Self {
        Self {
            message: "Invalid pet data".to_string(),
            errors: err
                .errors
                .iter()
                .map(|e| FieldIssue {
                    field: e.field.to_string(),
                    message: e.message.clone(),
                })
                .collect(),
        }
    }

    #[must_use]
    pub fn invalid_sort(detail: impl Into<String>) -> Self {
        Self {
            message: "Invalid sort directive".to_string(),
            errors: vec![FieldIssue {
                field: "sort".to_string(),
                message: detail.into(),
            }],
        }
    }
}

/// Body of `POST /api/pets/filter`: criteria fields at the top level plus an
/// optional display order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterRequest {
    #[serde(flatten)]
    pub criteria: FilterCriteria,
    pub sort: Option<String>,
}

impl FilterRequest {
    /// Splits the request into typed parts. A blank `sort` means unsorted;
    /// an unrecognized directive is the only way this can fail.
    pub fn into_parts(self) -> Result<(FilterCriteria, Option<SortOrder>), ApiError> {
        let sort = match self.sort.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => match SortOrder::parse(raw) {
                Ok(order) => Some(order),
                Err(e) => return Err(ApiError::invalid_sort(e.to_string())),
            },
        };
        Ok((self.criteria, sort))
    }
}

/// Admin dashboard counts over the whole collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsResponse {
    pub total: usize,
    pub available: usize,
    pub adopted: usize,
    pub pending: usize,
}

impl StatsResponse {
    #[must_use]
    pub fn tally(pets: &[PetRecord]) -> Self {
        Self {
            total: pets.len(),
            available: pets
                .iter()
                .filter(|p| p.status == AdoptionStatus::Available)
                .count(),
            adopted: pets
                .iter()
                .filter(|p| p.status == AdoptionStatus::Adopted)
                .count(),
            pending: pets
                .iter()
                .filter(|p| p.status == AdoptionStatus::Pending)
                .count(),
        }
    }
}

#[must_use]
pub fn openapi_v1_spec() -> Value {
    json!({
      "openapi": "3.0.3",
      "info": {
        "title": "pawhaven API",
        "version": "v1"
      },
      "paths": {
        "/healthz": {"get": {"responses": {"200": {"description": "ok"}}}},
        "/readyz": {"get": {"responses": {"200": {"description": "ready"}, "503": {"description": "not ready"}}}},
        "/version": {"get": {"responses": {"200": {"description": "build info"}}}},
        "/metrics": {"get": {"responses": {"200": {"description": "plain-text counters"}}}},
        "/openapi.json": {"get": {"responses": {"200": {"description": "this document"}}}},
        "/api/pets": {
          "get": {
            "responses": {
              "200": {"description": "every pet"},
              "500": {"description": "store unavailable", "content": {"application/json": {"schema": {"$ref": "#/components/schemas/ApiError"}}}}
            }
          },
          "post": {
            "responses": {
              "201": {"description": "created pet"},
              "400": {"description": "invalid pet data", "content": {"application/json": {"schema": {"$ref": "#/components/schemas/ApiError"}}}},
              "401": {"description": "admin token required", "content": {"application/json": {"schema": {"$ref": "#/components/schemas/ApiError"}}}},
              "500": {"description": "store unavailable", "content": {"application/json": {"schema": {"$ref": "#/components/schemas/ApiError"}}}}
            }
          }
        },
        "/api/pets/filter": {
          "post": {
            "responses": {
              "200": {"description": "matching pets, optionally sorted"},
              "400": {"description": "invalid sort directive", "content": {"application/json": {"schema": {"$ref": "#/components/schemas/ApiError"}}}},
              "500": {"description": "store unavailable", "content": {"application/json": {"schema": {"$ref": "#/components/schemas/ApiError"}}}}
            }
          }
        },
        "/api/pets/{id}": {
          "get": {
            "parameters": [{"name": "id", "in": "path", "required": true, "schema": {"type": "string"}}],
            "responses": {
              "200": {"description": "one pet"},
              "404": {"description": "pet not found", "content": {"application/json": {"schema": {"$ref": "#/components/schemas/ApiError"}}}}
            }
          },
          "put": {
            "parameters": [{"name": "id", "in": "path", "required": true, "schema": {"type": "string"}}],
            "responses": {
              "200": {"description": "updated pet"},
              "400": {"description": "invalid pet data", "content": {"application/json": {"schema": {"$ref": "#/components/schemas/ApiError"}}}},
              "401": {"description": "admin token required", "content": {"application/json": {"schema": {"$ref": "#/components/schemas/ApiError"}}}},
              "404": {"description": "pet not found", "content": {"application/json": {"schema": {"$ref": "#/components/schemas/ApiError"}}}},
              "500": {"description": "store unavailable", "content": {"application/json": {"schema": {"$ref": "#/components/schemas/ApiError"}}}}
            }
          },
          "delete": {
            "parameters": [{"name": "id", "in": "path", "required": true, "schema": {"type": "string"}}],
            "responses": {
              "204": {"description": "deleted"},
              "401": {"description": "admin token required", "content": {"application/json": {"schema": {"$ref": "#/components/schemas/ApiError"}}}},
              "404": {"description": "pet not found", "content": {"application/json": {"schema": {"$ref": "#/components/schemas/ApiError"}}}}
            }
          }
        },
        "/api/pets/{id}/similar": {
          "get": {
            "parameters": [{"name": "id", "in": "path", "required": true, "schema": {"type": "string"}}],
            "responses": {
              "200": {"description": "up to four pets sharing breed or size"},
              "404": {"description": "pet not found", "content": {"application/json": {"schema": {"$ref": "#/components/schemas/ApiError"}}}}
            }
          }
        },
        "/api/pets/{id}/media": {
          "post": {
            "parameters": [{"name": "id", "in": "path", "required": true, "schema": {"type": "string"}}],
            "requestBody": {"content": {"multipart/form-data": {"schema": {"$ref": "#/components/schemas/MediaCommit"}}}},
            "responses": {
              "200": {"description": "pet with the committed gallery"},
              "400": {"description": "invalid pet data", "content": {"application/json": {"schema": {"$ref": "#/components/schemas/ApiError"}}}},
              "401": {"description": "admin token required", "content": {"application/json": {"schema": {"$ref": "#/components/schemas/ApiError"}}}},
              "404": {"description": "pet not found", "content": {"application/json": {"schema": {"$ref": "#/components/schemas/ApiError"}}}},
              "502": {"description": "media upload failed", "content": {"application/json": {"schema": {"$ref": "#/components/schemas/ApiError"}}}}
            }
          }
        },
        "/api/admin/stats": {
          "get": {
            "responses": {
              "200": {"description": "listing counts by status"},
              "401": {"description": "admin token required", "content": {"application/json": {"schema": {"$ref": "#/components/schemas/ApiError"}}}}
            }
          }
        }
      },
      "components": {
        "schemas": {
          "FieldIssue": {
            "type": "object",
            "required": ["field", "message"],
            "properties": {
              "field": {"type": "string"},
              "message": {"type": "string"}
            }
          },
          "ApiError": {
            "type": "object",
            "required": ["message"],
            "properties": {
              "message": {"type": "string"},
              "errors": {"type": "array", "items": {"$ref": "#/components/schemas/FieldIssue"}}
            }
          },
          "Pet": {
            "type": "object",
            "required": ["petId", "name", "breed", "age", "gender", "size", "temperament", "status", "photos", "createdAtMs"],
            "properties": {
              "petId": {"type": "string"},
              "name": {"type": "string"},
              "breed": {"type": "string"},
              "age": {"type": "string", "description": "non-negative integer as text"},
              "gender": {"type": "string", "enum": ["Male", "Female"]},
              "size": {"type": "string", "enum": ["Small", "Medium", "Large"]},
              "temperament": {"type": "string"},
              "status": {"type": "string", "enum": ["available", "adopted", "pending"]},
              "photos": {"type": "array", "items": {"type": "string"}},
              "videoUrl": {"type": "string"},
              "createdAtMs": {"type": "integer", "format": "int64"}
            }
          },
          "MediaCommit": {
            "type": "object",
            "properties": {
              "retain": {"type": "array", "items": {"type": "string"}, "description": "hosted urls to keep, repeated text parts"},
              "photo": {"type": "array", "items": {"type": "string", "format": "binary"}, "description": "new files, repeated parts, upload order preserved"},
              "video": {"type": "string", "format": "binary"},
              "clearVideo": {"type": "string", "description": "any truthy value drops the stored video"}
            }
          }
        }
      }
    })
}
