use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::ApiError;
use crate::glucose::repo::GlucoseReading;
use crate::patch::double_option;

fn check_value(value: f64) -> Result<(), ApiError> {
    if !value.is_finite() || value < 0.0 {
        return Err(ApiError::Validation(
            "value must be a non-negative number".into(),
        ));
    }
    Ok(())
}

#[derive(Debug, Deserialize)]
pub struct CreateReadingRequest {
    pub value: f64,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub measured_at: Option<OffsetDateTime>,
    pub notes: Option<String>,
    pub meal_id: Option<Uuid>,
}

impl CreateReadingRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        check_value(self.value)
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateReadingRequest {
    pub value: Option<f64>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub measured_at: Option<OffsetDateTime>,
    #[serde(default, deserialize_with = "double_option")]
    pub notes: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub meal_id: Option<Option<Uuid>>,
}

impl UpdateReadingRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        if let Some(value) = self.value {
            check_value(value)?;
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct ReadingResponse {
    pub id: Uuid,
    pub value: f64,
    #[serde(with = "time::serde::rfc3339")]
    pub measured_at: OffsetDateTime,
    pub notes: Option<String>,
    pub meal_id: Option<Uuid>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<GlucoseReading> for ReadingResponse {
    fn from(r: GlucoseReading) -> Self {
        Self {
            id: r.id,
            value: r.value,
            measured_at: r.measured_at,
            notes: r.notes,
            meal_id: r.meal_id,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

/// Optional inclusive date filters for the list endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct RangeQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_negative_and_non_finite_values() {
        let req: CreateReadingRequest = serde_json::from_str(r#"{"value": -5}"#).unwrap();
        assert!(req.validate().is_err());

        let req = CreateReadingRequest {
            value: f64::INFINITY,
            measured_at: None,
            notes: None,
            meal_id: None,
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn accepts_plain_reading() {
        let req: CreateReadingRequest = serde_json::from_str(r#"{"value": 104.0}"#).unwrap();
        assert!(req.validate().is_ok());
        assert!(req.meal_id.is_none());
    }

    #[test]
    fn clearing_meal_association_is_distinct_from_absence() {
        let req: UpdateReadingRequest = serde_json::from_str(r#"{"meal_id": null}"#).unwrap();
        assert_eq!(req.meal_id, Some(None));
        let req: UpdateReadingRequest = serde_json::from_str("{}").unwrap();
        assert!(req.meal_id.is_none());
    }
}
