use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::patch::double_option;
use crate::users::repo::User;

/// Full profile returned to the account owner.
#[derive(Debug, Serialize)]
pub struct UserProfile {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub height: Option<f64>,
    pub weight: Option<f64>,
    pub age: Option<i32>,
    pub gender: Option<String>,
    pub goal_calories: Option<f64>,
    pub goal_carbs: Option<f64>,
    pub goal_protein: Option<f64>,
    pub goal_fat: Option<f64>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<User> for UserProfile {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            email: u.email,
            name: u.name,
            height: u.height,
            weight: u.weight,
            age: u.age,
            gender: u.gender,
            goal_calories: u.goal_calories,
            goal_carbs: u.goal_carbs,
            goal_protein: u.goal_protein,
            goal_fat: u.goal_fat,
            created_at: u.created_at,
            updated_at: u.updated_at,
        }
    }
}

/// Partial profile update: absent fields stay untouched, explicit `null`
/// clears nullable fields.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateUserRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub name: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub height: Option<Option<f64>>,
    #[serde(default, deserialize_with = "double_option")]
    pub weight: Option<Option<f64>>,
    #[serde(default, deserialize_with = "double_option")]
    pub age: Option<Option<i32>>,
    #[serde(default, deserialize_with = "double_option")]
    pub gender: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub goal_calories: Option<Option<f64>>,
    #[serde(default, deserialize_with = "double_option")]
    pub goal_carbs: Option<Option<f64>>,
    #[serde(default, deserialize_with = "double_option")]
    pub goal_protein: Option<Option<f64>>,
    #[serde(default, deserialize_with = "double_option")]
    pub goal_fat: Option<Option<f64>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_and_null_fields_are_distinguished() {
        let req: UpdateUserRequest =
            serde_json::from_str(r#"{"weight": 82.5, "goal_calories": null}"#).unwrap();
        assert_eq!(req.weight, Some(Some(82.5)));
        assert_eq!(req.goal_calories, Some(None));
        assert!(req.height.is_none());
        assert!(req.email.is_none());
    }
}
