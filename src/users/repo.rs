use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

/// User record in the database. `password_hash` is NULL for accounts created
/// through an external identity provider.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub password_hash: Option<String>,
    pub name: Option<String>,
    pub height: Option<f64>,
    pub weight: Option<f64>,
    pub age: Option<i32>,
    pub gender: Option<String>,
    pub goal_calories: Option<f64>,
    pub goal_carbs: Option<f64>,
    pub goal_protein: Option<f64>,
    pub goal_fat: Option<f64>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Default)]
pub struct NewUser {
    pub email: String,
    pub password_hash: Option<String>,
    pub name: Option<String>,
    pub height: Option<f64>,
    pub weight: Option<f64>,
    pub age: Option<i32>,
    pub gender: Option<String>,
}

/// Partial profile update. Outer `None` leaves the column unchanged; for
/// nullable columns the inner `None` clears it.
#[derive(Debug, Default)]
pub struct UserPatch {
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub name: Option<Option<String>>,
    pub height: Option<Option<f64>>,
    pub weight: Option<Option<f64>>,
    pub age: Option<Option<i32>>,
    pub gender: Option<Option<String>>,
    pub goal_calories: Option<Option<f64>>,
    pub goal_carbs: Option<Option<f64>>,
    pub goal_protein: Option<Option<f64>>,
    pub goal_fat: Option<Option<f64>>,
}

const COLUMNS: &str = "id, email, password_hash, name, height, weight, age, gender, \
     goal_calories, goal_carbs, goal_protein, goal_fat, created_at, updated_at";

impl User {
    pub async fn find_by_email(db: &PgPool, email: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    pub async fn find_by_id(db: &PgPool, id: Uuid) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!("SELECT {COLUMNS} FROM users WHERE id = $1"))
            .bind(id)
            .fetch_optional(db)
            .await?;
        Ok(user)
    }

    pub async fn create(db: &PgPool, new: &NewUser) -> anyhow::Result<User> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (email, password_hash, name, height, weight, age, gender)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {COLUMNS}
            "#
        ))
        .bind(&new.email)
        .bind(&new.password_hash)
        .bind(&new.name)
        .bind(new.height)
        .bind(new.weight)
        .bind(new.age)
        .bind(&new.gender)
        .fetch_one(db)
        .await?;
        Ok(user)
    }

    /// Applies a partial update; only columns present in the patch change.
    pub async fn update(db: &PgPool, id: Uuid, patch: &UserPatch) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users SET
                email = COALESCE($2, email),
                password_hash = COALESCE($3, password_hash),
                name = CASE WHEN $4 THEN $5 ELSE name END,
                height = CASE WHEN $6 THEN $7 ELSE height END,
                weight = CASE WHEN $8 THEN $9 ELSE weight END,
                age = CASE WHEN $10 THEN $11 ELSE age END,
                gender = CASE WHEN $12 THEN $13 ELSE gender END,
                goal_calories = CASE WHEN $14 THEN $15 ELSE goal_calories END,
                goal_carbs = CASE WHEN $16 THEN $17 ELSE goal_carbs END,
                goal_protein = CASE WHEN $18 THEN $19 ELSE goal_protein END,
                goal_fat = CASE WHEN $20 THEN $21 ELSE goal_fat END,
                updated_at = now()
            WHERE id = $1
            RETURNING {COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&patch.email)
        .bind(&patch.password_hash)
        .bind(patch.name.is_some())
        .bind(patch.name.clone().flatten())
        .bind(patch.height.is_some())
        .bind(patch.height.flatten())
        .bind(patch.weight.is_some())
        .bind(patch.weight.flatten())
        .bind(patch.age.is_some())
        .bind(patch.age.flatten())
        .bind(patch.gender.is_some())
        .bind(patch.gender.clone().flatten())
        .bind(patch.goal_calories.is_some())
        .bind(patch.goal_calories.flatten())
        .bind(patch.goal_carbs.is_some())
        .bind(patch.goal_carbs.flatten())
        .bind(patch.goal_protein.is_some())
        .bind(patch.goal_protein.flatten())
        .bind(patch.goal_fat.is_some())
        .bind(patch.goal_fat.flatten())
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    /// Removes the account. The database cascades to meals, meal items,
    /// glucose readings and owned catalog entries.
    pub async fn delete(db: &PgPool, id: Uuid) -> anyhow::Result<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
