use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

/// Blood glucose measurement in mg/dL, optionally tied to a meal.
#[derive(Debug, Clone, FromRow)]
pub struct GlucoseReading {
    pub id: Uuid,
    pub user_id: Uuid,
    pub value: f64,
    pub measured_at: OffsetDateTime,
    pub notes: Option<String>,
    pub meal_id: Option<Uuid>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

#[derive(Debug)]
pub struct NewReading {
    pub value: f64,
    pub measured_at: Option<OffsetDateTime>,
    pub notes: Option<String>,
    pub meal_id: Option<Uuid>,
}

#[derive(Debug, Default)]
pub struct ReadingPatch {
    pub value: Option<f64>,
    pub measured_at: Option<OffsetDateTime>,
    pub notes: Option<Option<String>>,
    pub meal_id: Option<Option<Uuid>>,
}

const COLUMNS: &str = "id, user_id, value, measured_at, notes, meal_id, created_at, updated_at";

impl GlucoseReading {
    pub async fn create(
        db: &PgPool,
        user_id: Uuid,
        new: &NewReading,
    ) -> anyhow::Result<GlucoseReading> {
        let reading = sqlx::query_as::<_, GlucoseReading>(&format!(
            r#"
            INSERT INTO glucose_readings (user_id, value, measured_at, notes, meal_id)
            VALUES ($1, $2, COALESCE($3, now()), $4, $5)
            RETURNING {COLUMNS}
            "#
        ))
        .bind(user_id)
        .bind(new.value)
        .bind(new.measured_at)
        .bind(&new.notes)
        .bind(new.meal_id)
        .fetch_one(db)
        .await?;
        Ok(reading)
    }

    /// Readings for a user, newest first, optionally bounded on either side
    /// (inclusive).
    pub async fn list_in_range(
        db: &PgPool,
        user_id: Uuid,
        start: Option<OffsetDateTime>,
        end: Option<OffsetDateTime>,
    ) -> anyhow::Result<Vec<GlucoseReading>> {
        let rows = sqlx::query_as::<_, GlucoseReading>(&format!(
            r#"
            SELECT {COLUMNS} FROM glucose_readings
            WHERE user_id = $1
              AND ($2::timestamptz IS NULL OR measured_at >= $2)
              AND ($3::timestamptz IS NULL OR measured_at <= $3)
            ORDER BY measured_at DESC
            "#
        ))
        .bind(user_id)
        .bind(start)
        .bind(end)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    pub async fn update(
        db: &PgPool,
        user_id: Uuid,
        id: Uuid,
        patch: &ReadingPatch,
    ) -> anyhow::Result<Option<GlucoseReading>> {
        let reading = sqlx::query_as::<_, GlucoseReading>(&format!(
            r#"
            UPDATE glucose_readings SET
                value = COALESCE($3, value),
                measured_at = COALESCE($4, measured_at),
                notes = CASE WHEN $5 THEN $6 ELSE notes END,
                meal_id = CASE WHEN $7 THEN $8 ELSE meal_id END,
                updated_at = now()
            WHERE id = $1 AND user_id = $2
            RETURNING {COLUMNS}
            "#
        ))
        .bind(id)
        .bind(user_id)
        .bind(patch.value)
        .bind(patch.measured_at)
        .bind(patch.notes.is_some())
        .bind(patch.notes.clone().flatten())
        .bind(patch.meal_id.is_some())
        .bind(patch.meal_id.flatten())
        .fetch_optional(db)
        .await?;
        Ok(reading)
    }

    pub async fn delete(db: &PgPool, user_id: Uuid, id: Uuid) -> anyhow::Result<bool> {
        let result = sqlx::query("DELETE FROM glucose_readings WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(db)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
