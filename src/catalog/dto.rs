use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::catalog::repo::{CatalogEntry, EntryKind, EntryPatch};
use crate::error::ApiError;
use crate::patch::double_option;

fn default_serving_size() -> f64 {
    100.0
}

fn default_serving_unit() -> String {
    "g".into()
}

#[derive(Debug, Deserialize)]
pub struct CreateEntryRequest {
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub calories: f64,
    #[serde(default)]
    pub carbs: f64,
    #[serde(default)]
    pub protein: f64,
    #[serde(default)]
    pub fat: f64,
    #[serde(default = "default_serving_size")]
    pub serving_size: f64,
    #[serde(default = "default_serving_unit")]
    pub serving_unit: String,
    pub instructions: Option<String>,
    #[serde(default)]
    pub is_public: bool,
}

impl CreateEntryRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.name.trim().is_empty() {
            return Err(ApiError::Validation("Name must not be empty".into()));
        }
        check_nutrient("calories", self.calories)?;
        check_nutrient("carbs", self.carbs)?;
        check_nutrient("protein", self.protein)?;
        check_nutrient("fat", self.fat)?;
        if !self.serving_size.is_finite() || self.serving_size <= 0.0 {
            return Err(ApiError::Validation("serving_size must be positive".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateEntryRequest {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    pub calories: Option<f64>,
    pub carbs: Option<f64>,
    pub protein: Option<f64>,
    pub fat: Option<f64>,
    pub serving_size: Option<f64>,
    pub serving_unit: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub instructions: Option<Option<String>>,
    pub is_public: Option<bool>,
}

impl UpdateEntryRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        if let Some(name) = &self.name {
            if name.trim().is_empty() {
                return Err(ApiError::Validation("Name must not be empty".into()));
            }
        }
        for (field, value) in [
            ("calories", self.calories),
            ("carbs", self.carbs),
            ("protein", self.protein),
            ("fat", self.fat),
        ] {
            if let Some(v) = value {
                check_nutrient(field, v)?;
            }
        }
        if let Some(s) = self.serving_size {
            if !s.is_finite() || s <= 0.0 {
                return Err(ApiError::Validation("serving_size must be positive".into()));
            }
        }
        Ok(())
    }

    pub fn into_patch(self) -> EntryPatch {
        EntryPatch {
            name: self.name,
            description: self.description,
            calories: self.calories,
            carbs: self.carbs,
            protein: self.protein,
            fat: self.fat,
            serving_size: self.serving_size,
            serving_unit: self.serving_unit,
            instructions: self.instructions,
            is_public: self.is_public,
        }
    }
}

fn check_nutrient(field: &str, value: f64) -> Result<(), ApiError> {
    if !value.is_finite() || value < 0.0 {
        return Err(ApiError::Validation(format!(
            "{field} must be a non-negative number"
        )));
    }
    Ok(())
}

#[derive(Debug, Serialize)]
pub struct EntryResponse {
    pub id: Uuid,
    pub kind: EntryKind,
    pub name: String,
    pub description: Option<String>,
    pub calories: f64,
    pub carbs: f64,
    pub protein: f64,
    pub fat: f64,
    pub serving_size: f64,
    pub serving_unit: String,
    pub instructions: Option<String>,
    pub is_public: bool,
    pub owner_id: Option<Uuid>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<CatalogEntry> for EntryResponse {
    fn from(e: CatalogEntry) -> Self {
        Self {
            id: e.id,
            kind: e.kind,
            name: e.name,
            description: e.description,
            calories: e.calories,
            carbs: e.carbs,
            protein: e.protein,
            fat: e.fat,
            serving_size: e.serving_size,
            serving_unit: e.serving_unit,
            instructions: e.instructions,
            is_public: e.is_public,
            owner_id: e.owner_id,
            created_at: e.created_at,
            updated_at: e.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_request() -> CreateEntryRequest {
        serde_json::from_str(r#"{"name": "Oatmeal", "calories": 380, "carbs": 68}"#).unwrap()
    }

    #[test]
    fn defaults_apply_to_missing_fields() {
        let req = base_request();
        assert_eq!(req.protein, 0.0);
        assert_eq!(req.serving_size, 100.0);
        assert_eq!(req.serving_unit, "g");
        assert!(!req.is_public);
        assert!(req.validate().is_ok());
    }

    #[test]
    fn rejects_negative_nutrients() {
        let req: CreateEntryRequest =
            serde_json::from_str(r#"{"name": "Bad", "calories": -1}"#).unwrap();
        assert!(req.validate().is_err());
    }

    #[test]
    fn rejects_non_positive_serving_size() {
        let req: CreateEntryRequest =
            serde_json::from_str(r#"{"name": "Bad", "serving_size": 0}"#).unwrap();
        assert!(req.validate().is_err());
    }

    #[test]
    fn rejects_blank_name() {
        let req: CreateEntryRequest = serde_json::from_str(r#"{"name": "  "}"#).unwrap();
        assert!(req.validate().is_err());
    }
}
