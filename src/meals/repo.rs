use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::nutrition::Nutrients;

#[derive(Debug, Clone, FromRow)]
pub struct Meal {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub eaten_at: OffsetDateTime,
    pub notes: Option<String>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// Meal item joined with the per-serving profile of its catalog entry.
/// The entry columns are NULL when the entry has been deleted; such an item
/// contributes zero nutrients instead of failing the read.
#[derive(Debug, Clone, FromRow)]
pub struct MealItemRow {
    pub id: Uuid,
    pub meal_id: Uuid,
    pub entry_id: Option<Uuid>,
    pub quantity: f64,
    pub position: i32,
    pub entry_name: Option<String>,
    pub calories: Option<f64>,
    pub carbs: Option<f64>,
    pub protein: Option<f64>,
    pub fat: Option<f64>,
    pub serving_size: Option<f64>,
    pub serving_unit: Option<String>,
}

impl MealItemRow {
    /// Scaled contribution of this item to its meal.
    pub fn nutrients(&self) -> Nutrients {
        match (
            self.calories,
            self.carbs,
            self.protein,
            self.fat,
            self.serving_size,
        ) {
            (Some(calories), Some(carbs), Some(protein), Some(fat), Some(serving_size)) => {
                Nutrients {
                    calories,
                    carbs,
                    protein,
                    fat,
                }
                .scale(self.quantity, serving_size)
            }
            _ => Nutrients::ZERO,
        }
    }
}

/// Per-meal totals: the element-wise sum of every item's contribution.
/// Always recomputed from current catalog data, never stored.
pub fn totals(items: &[MealItemRow]) -> Nutrients {
    items.iter().map(MealItemRow::nutrients).sum()
}

#[derive(Debug)]
pub struct NewMeal {
    pub name: String,
    pub eaten_at: Option<OffsetDateTime>,
    pub notes: Option<String>,
    pub items: Vec<NewMealItem>,
}

#[derive(Debug)]
pub struct NewMealItem {
    pub entry_id: Uuid,
    pub quantity: f64,
}

#[derive(Debug, Default)]
pub struct MealPatch {
    pub name: Option<String>,
    pub eaten_at: Option<OffsetDateTime>,
    pub notes: Option<Option<String>>,
}

const MEAL_COLUMNS: &str = "id, user_id, name, eaten_at, notes, created_at, updated_at";

const ITEM_COLUMNS: &str = "i.id, i.meal_id, i.entry_id, i.quantity, i.position, \
     e.name AS entry_name, e.calories, e.carbs, e.protein, e.fat, e.serving_size, e.serving_unit";

impl Meal {
    /// Inserts the meal and its items in one transaction.
    pub async fn create(db: &PgPool, user_id: Uuid, new: &NewMeal) -> anyhow::Result<Meal> {
        let mut tx = db.begin().await?;

        let meal = sqlx::query_as::<_, Meal>(&format!(
            r#"
            INSERT INTO meals (user_id, name, eaten_at, notes)
            VALUES ($1, $2, COALESCE($3, now()), $4)
            RETURNING {MEAL_COLUMNS}
            "#
        ))
        .bind(user_id)
        .bind(&new.name)
        .bind(new.eaten_at)
        .bind(&new.notes)
        .fetch_one(&mut *tx)
        .await?;

        for (position, item) in new.items.iter().enumerate() {
            sqlx::query(
                "INSERT INTO meal_items (meal_id, entry_id, quantity, position) \
                 VALUES ($1, $2, $3, $4)",
            )
            .bind(meal.id)
            .bind(item.entry_id)
            .bind(item.quantity)
            .bind(position as i32)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(meal)
    }

    pub async fn find(db: &PgPool, user_id: Uuid, id: Uuid) -> anyhow::Result<Option<Meal>> {
        let meal = sqlx::query_as::<_, Meal>(&format!(
            "SELECT {MEAL_COLUMNS} FROM meals WHERE id = $1 AND user_id = $2"
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(db)
        .await?;
        Ok(meal)
    }

    /// Meals for a user, newest first, optionally bounded on either side
    /// (inclusive).
    pub async fn list_in_range(
        db: &PgPool,
        user_id: Uuid,
        start: Option<OffsetDateTime>,
        end: Option<OffsetDateTime>,
    ) -> anyhow::Result<Vec<Meal>> {
        let rows = sqlx::query_as::<_, Meal>(&format!(
            r#"
            SELECT {MEAL_COLUMNS} FROM meals
            WHERE user_id = $1
              AND ($2::timestamptz IS NULL OR eaten_at >= $2)
              AND ($3::timestamptz IS NULL OR eaten_at <= $3)
            ORDER BY eaten_at DESC
            "#
        ))
        .bind(user_id)
        .bind(start)
        .bind(end)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    pub async fn search(db: &PgPool, user_id: Uuid, query: &str) -> anyhow::Result<Vec<Meal>> {
        let rows = sqlx::query_as::<_, Meal>(&format!(
            "SELECT {MEAL_COLUMNS} FROM meals \
             WHERE user_id = $1 AND name ILIKE '%' || $2 || '%' ORDER BY eaten_at DESC"
        ))
        .bind(user_id)
        .bind(query)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    pub async fn update(
        db: &PgPool,
        user_id: Uuid,
        id: Uuid,
        patch: &MealPatch,
    ) -> anyhow::Result<Option<Meal>> {
        let meal = sqlx::query_as::<_, Meal>(&format!(
            r#"
            UPDATE meals SET
                name = COALESCE($3, name),
                eaten_at = COALESCE($4, eaten_at),
                notes = CASE WHEN $5 THEN $6 ELSE notes END,
                updated_at = now()
            WHERE id = $1 AND user_id = $2
            RETURNING {MEAL_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(user_id)
        .bind(&patch.name)
        .bind(patch.eaten_at)
        .bind(patch.notes.is_some())
        .bind(patch.notes.clone().flatten())
        .fetch_optional(db)
        .await?;
        Ok(meal)
    }

    /// Deletes the meal; the database cascades to its items.
    pub async fn delete(db: &PgPool, user_id: Uuid, id: Uuid) -> anyhow::Result<bool> {
        let result = sqlx::query("DELETE FROM meals WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(db)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Items for a set of meals, joined with their catalog entries, in
    /// insertion order per meal.
    pub async fn items(db: &PgPool, meal_ids: &[Uuid]) -> anyhow::Result<Vec<MealItemRow>> {
        if meal_ids.is_empty() {
            return Ok(Vec::new());
        }
        let rows = sqlx::query_as::<_, MealItemRow>(&format!(
            r#"
            SELECT {ITEM_COLUMNS}
            FROM meal_items i
            LEFT JOIN catalog_entries e ON e.id = i.entry_id
            WHERE i.meal_id = ANY($1)
            ORDER BY i.meal_id, i.position, i.created_at
            "#
        ))
        .bind(meal_ids.to_vec())
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    pub async fn add_item(
        db: &PgPool,
        meal_id: Uuid,
        entry_id: Uuid,
        quantity: f64,
    ) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO meal_items (meal_id, entry_id, quantity, position)
            VALUES ($1, $2, $3,
                    (SELECT COALESCE(MAX(position) + 1, 0) FROM meal_items WHERE meal_id = $1))
            "#,
        )
        .bind(meal_id)
        .bind(entry_id)
        .bind(quantity)
        .execute(db)
        .await?;
        Ok(())
    }

    pub async fn remove_item(db: &PgPool, meal_id: Uuid, item_id: Uuid) -> anyhow::Result<bool> {
        let result = sqlx::query("DELETE FROM meal_items WHERE id = $1 AND meal_id = $2")
            .bind(item_id)
            .bind(meal_id)
            .execute(db)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(quantity: f64, per_serving: Option<(f64, f64, f64, f64, f64)>) -> MealItemRow {
        let (calories, carbs, protein, fat, serving_size) = match per_serving {
            Some(p) => (Some(p.0), Some(p.1), Some(p.2), Some(p.3), Some(p.4)),
            None => (None, None, None, None, None),
        };
        MealItemRow {
            id: Uuid::new_v4(),
            meal_id: Uuid::new_v4(),
            entry_id: per_serving.map(|_| Uuid::new_v4()),
            quantity,
            position: 0,
            entry_name: None,
            calories,
            carbs,
            protein,
            fat,
            serving_size,
            serving_unit: None,
        }
    }

    #[test]
    fn meal_with_no_items_totals_zero() {
        assert_eq!(totals(&[]), Nutrients::ZERO);
    }

    #[test]
    fn half_serving_scales_the_profile() {
        let rows = [item(50.0, Some((200.0, 20.0, 5.0, 8.0, 100.0)))];
        let t = totals(&rows);
        assert_eq!(t.calories, 100.0);
        assert_eq!(t.carbs, 10.0);
        assert_eq!(t.protein, 2.5);
        assert_eq!(t.fat, 4.0);
    }

    #[test]
    fn totals_are_additive_over_item_partitions() {
        let a = item(50.0, Some((200.0, 20.0, 5.0, 8.0, 100.0)));
        let b = item(30.0, Some((90.0, 3.0, 9.0, 5.0, 30.0)));
        let together = totals(&[a.clone(), b.clone()]);
        let separate = totals(&[a]) + totals(&[b]);
        assert_eq!(together, separate);
    }

    #[test]
    fn dangling_entry_contributes_zero_without_failing() {
        let rows = [
            item(50.0, Some((200.0, 20.0, 5.0, 8.0, 100.0))),
            item(75.0, None),
        ];
        let t = totals(&rows);
        assert_eq!(t.calories, 100.0);
        assert_eq!(t.carbs, 10.0);
    }
}
