use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::ApiError;
use crate::meals::repo::{totals, Meal, MealItemRow};
use crate::nutrition::Nutrients;
use crate::patch::double_option;

#[derive(Debug, Deserialize)]
pub struct CreateMealItemRequest {
    pub entry_id: Uuid,
    pub quantity: f64,
}

impl CreateMealItemRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        if !self.quantity.is_finite() || self.quantity <= 0.0 {
            return Err(ApiError::Validation("quantity must be positive".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateMealRequest {
    pub name: String,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub eaten_at: Option<OffsetDateTime>,
    pub notes: Option<String>,
    #[serde(default)]
    pub items: Vec<CreateMealItemRequest>,
}

impl CreateMealRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.name.trim().is_empty() {
            return Err(ApiError::Validation("Name must not be empty".into()));
        }
        for item in &self.items {
            item.validate()?;
        }
        Ok(())
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateMealRequest {
    pub name: Option<String>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub eaten_at: Option<OffsetDateTime>,
    #[serde(default, deserialize_with = "double_option")]
    pub notes: Option<Option<String>>,
}

impl UpdateMealRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        if let Some(name) = &self.name {
            if name.trim().is_empty() {
                return Err(ApiError::Validation("Name must not be empty".into()));
            }
        }
        Ok(())
    }
}

/// Body of `POST /meals/from-recipe/:id`; the meal defaults to one serving
/// of the recipe, eaten now.
#[derive(Debug, Default, Deserialize)]
pub struct MealFromRecipeRequest {
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub eaten_at: Option<OffsetDateTime>,
}

#[derive(Debug, Serialize)]
pub struct MealItemResponse {
    pub id: Uuid,
    pub entry_id: Option<Uuid>,
    pub entry_name: Option<String>,
    pub quantity: f64,
    pub serving_unit: Option<String>,
    pub nutrients: Nutrients,
}

impl From<&MealItemRow> for MealItemResponse {
    fn from(row: &MealItemRow) -> Self {
        Self {
            id: row.id,
            entry_id: row.entry_id,
            entry_name: row.entry_name.clone(),
            quantity: row.quantity,
            serving_unit: row.serving_unit.clone(),
            nutrients: row.nutrients(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MealResponse {
    pub id: Uuid,
    pub name: String,
    #[serde(with = "time::serde::rfc3339")]
    pub eaten_at: OffsetDateTime,
    pub notes: Option<String>,
    pub totals: Nutrients,
    pub items: Vec<MealItemResponse>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl MealResponse {
    /// Projects a meal and its joined item rows into the wire shape, with
    /// totals computed on the fly.
    pub fn assemble(meal: Meal, items: &[MealItemRow]) -> Self {
        Self {
            id: meal.id,
            name: meal.name,
            eaten_at: meal.eaten_at,
            notes: meal.notes,
            totals: totals(items),
            items: items.iter().map(MealItemResponse::from).collect(),
            created_at: meal.created_at,
            updated_at: meal.updated_at,
        }
    }
}

/// Optional inclusive date filters for list endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct RangeQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_positive_quantity() {
        let item: CreateMealItemRequest = serde_json::from_str(
            r#"{"entry_id": "7f2a1b9a-9f1e-4f3a-8d35-5a5c8c6f3a10", "quantity": 0}"#,
        )
        .unwrap();
        assert!(item.validate().is_err());
    }

    #[test]
    fn accepts_meal_without_items() {
        let req: CreateMealRequest = serde_json::from_str(r#"{"name": "Breakfast"}"#).unwrap();
        assert!(req.validate().is_ok());
        assert!(req.items.is_empty());
        assert!(req.eaten_at.is_none());
    }

    #[test]
    fn parses_rfc3339_timestamps() {
        let req: CreateMealRequest =
            serde_json::from_str(r#"{"name": "Lunch", "eaten_at": "2023-05-01T12:30:00Z"}"#)
                .unwrap();
        let ts = req.eaten_at.unwrap();
        assert_eq!(ts.date(), time::macros::date!(2023 - 05 - 01));
    }
}
