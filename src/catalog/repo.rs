use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

/// Discriminates the two catalog entry families. Foods may be global
/// (no owner); recipes always belong to a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "entry_kind", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Food,
    Recipe,
}

impl EntryKind {
    pub fn noun(self) -> &'static str {
        match self {
            EntryKind::Food => "Food",
            EntryKind::Recipe => "Recipe",
        }
    }
}

/// Reusable nutrient-per-serving definition (food or recipe).
#[derive(Debug, Clone, FromRow)]
pub struct CatalogEntry {
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
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

#[derive(Debug)]
pub struct NewEntry {
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
}

#[derive(Debug, Default)]
pub struct EntryPatch {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub calories: Option<f64>,
    pub carbs: Option<f64>,
    pub protein: Option<f64>,
    pub fat: Option<f64>,
    pub serving_size: Option<f64>,
    pub serving_unit: Option<String>,
    pub instructions: Option<Option<String>>,
    pub is_public: Option<bool>,
}

const COLUMNS: &str = "id, kind, name, description, calories, carbs, protein, fat, \
     serving_size, serving_unit, instructions, is_public, owner_id, created_at, updated_at";

// An entry is visible to a user if they own it, it is global, or it is public.
const VISIBLE: &str = "(owner_id = $1 OR owner_id IS NULL OR is_public)";

impl CatalogEntry {
    pub async fn list_visible(
        db: &PgPool,
        user_id: Uuid,
        kind: EntryKind,
    ) -> anyhow::Result<Vec<CatalogEntry>> {
        let rows = sqlx::query_as::<_, CatalogEntry>(&format!(
            "SELECT {COLUMNS} FROM catalog_entries WHERE kind = $2 AND {VISIBLE} ORDER BY name"
        ))
        .bind(user_id)
        .bind(kind)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    pub async fn find_visible(
        db: &PgPool,
        user_id: Uuid,
        id: Uuid,
    ) -> anyhow::Result<Option<CatalogEntry>> {
        let row = sqlx::query_as::<_, CatalogEntry>(&format!(
            "SELECT {COLUMNS} FROM catalog_entries WHERE id = $2 AND {VISIBLE}"
        ))
        .bind(user_id)
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(row)
    }

    pub async fn find_visible_kind(
        db: &PgPool,
        user_id: Uuid,
        id: Uuid,
        kind: EntryKind,
    ) -> anyhow::Result<Option<CatalogEntry>> {
        let row = sqlx::query_as::<_, CatalogEntry>(&format!(
            "SELECT {COLUMNS} FROM catalog_entries WHERE id = $2 AND kind = $3 AND {VISIBLE}"
        ))
        .bind(user_id)
        .bind(id)
        .bind(kind)
        .fetch_optional(db)
        .await?;
        Ok(row)
    }

    pub async fn search_visible(
        db: &PgPool,
        user_id: Uuid,
        kind: EntryKind,
        query: &str,
    ) -> anyhow::Result<Vec<CatalogEntry>> {
        let rows = sqlx::query_as::<_, CatalogEntry>(&format!(
            "SELECT {COLUMNS} FROM catalog_entries \
             WHERE kind = $2 AND {VISIBLE} AND name ILIKE '%' || $3 || '%' ORDER BY name"
        ))
        .bind(user_id)
        .bind(kind)
        .bind(query)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    pub async fn create(db: &PgPool, new: &NewEntry) -> anyhow::Result<CatalogEntry> {
        let row = sqlx::query_as::<_, CatalogEntry>(&format!(
            r#"
            INSERT INTO catalog_entries
                (kind, name, description, calories, carbs, protein, fat,
                 serving_size, serving_unit, instructions, is_public, owner_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING {COLUMNS}
            "#
        ))
        .bind(new.kind)
        .bind(&new.name)
        .bind(&new.description)
        .bind(new.calories)
        .bind(new.carbs)
        .bind(new.protein)
        .bind(new.fat)
        .bind(new.serving_size)
        .bind(&new.serving_unit)
        .bind(&new.instructions)
        .bind(new.is_public)
        .bind(new.owner_id)
        .fetch_one(db)
        .await?;
        Ok(row)
    }

    /// Partial update, restricted to entries the user owns.
    pub async fn update(
        db: &PgPool,
        owner_id: Uuid,
        id: Uuid,
        kind: EntryKind,
        patch: &EntryPatch,
    ) -> anyhow::Result<Option<CatalogEntry>> {
        let row = sqlx::query_as::<_, CatalogEntry>(&format!(
            r#"
            UPDATE catalog_entries SET
                name = COALESCE($4, name),
                description = CASE WHEN $5 THEN $6 ELSE description END,
                calories = COALESCE($7, calories),
                carbs = COALESCE($8, carbs),
                protein = COALESCE($9, protein),
                fat = COALESCE($10, fat),
                serving_size = COALESCE($11, serving_size),
                serving_unit = COALESCE($12, serving_unit),
                instructions = CASE WHEN $13 THEN $14 ELSE instructions END,
                is_public = COALESCE($15, is_public),
                updated_at = now()
            WHERE id = $2 AND kind = $3 AND owner_id = $1
            RETURNING {COLUMNS}
            "#
        ))
        .bind(owner_id)
        .bind(id)
        .bind(kind)
        .bind(&patch.name)
        .bind(patch.description.is_some())
        .bind(patch.description.clone().flatten())
        .bind(patch.calories)
        .bind(patch.carbs)
        .bind(patch.protein)
        .bind(patch.fat)
        .bind(patch.serving_size)
        .bind(&patch.serving_unit)
        .bind(patch.instructions.is_some())
        .bind(patch.instructions.clone().flatten())
        .bind(patch.is_public)
        .fetch_optional(db)
        .await?;
        Ok(row)
    }

    /// Deletes an owned entry. Meal items referencing it are kept with their
    /// entry reference set to NULL by the database.
    pub async fn delete(
        db: &PgPool,
        owner_id: Uuid,
        id: Uuid,
        kind: EntryKind,
    ) -> anyhow::Result<bool> {
        let result =
            sqlx::query("DELETE FROM catalog_entries WHERE id = $2 AND kind = $3 AND owner_id = $1")
                .bind(owner_id)
                .bind(id)
                .bind(kind)
                .execute(db)
                .await?;
        Ok(result.rows_affected() > 0)
    }
}
