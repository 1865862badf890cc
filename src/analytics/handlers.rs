use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use time::OffsetDateTime;
use tracing::instrument;
use uuid::Uuid;

use crate::analytics::dto::{DailySummary, MonthlySummary, WeeklySummary};
use crate::analytics::engine::{
    self, month_bounds, week_window, MealRecord, ReadingRecord,
};
use crate::auth::AuthUser;
use crate::dates::{day_bounds, parse_date, today_utc};
use crate::error::ApiError;
use crate::glucose::repo::GlucoseReading;
use crate::meals::repo::Meal;
use crate::state::AppState;

pub fn analytics_routes() -> Router<AppState> {
    Router::new()
        .route("/analytics/daily", get(daily))
        .route("/analytics/weekly", get(weekly))
        .route("/analytics/monthly", get(monthly))
}

#[derive(Debug, Deserialize)]
pub struct DailyQuery {
    pub date: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct WeeklyQuery {
    pub end_date: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct MonthlyQuery {
    pub year: Option<i32>,
    pub month: Option<u8>,
}

/// Loads the caller's meals and readings inside the window and reduces them
/// to the records the engine consumes. Meal totals are recomputed from
/// current catalog data on every call.
async fn fetch_records(
    state: &AppState,
    user_id: Uuid,
    start: OffsetDateTime,
    end: OffsetDateTime,
) -> Result<(Vec<MealRecord>, Vec<ReadingRecord>), ApiError> {
    let meals = Meal::list_in_range(&state.db, user_id, Some(start), Some(end)).await?;
    let ids: Vec<Uuid> = meals.iter().map(|m| m.id).collect();
    let items = Meal::items(&state.db, &ids).await?;

    let meal_records = meals
        .iter()
        .map(|m| MealRecord {
            date: m.eaten_at.date(),
            totals: items
                .iter()
                .filter(|i| i.meal_id == m.id)
                .map(|i| i.nutrients())
                .sum(),
        })
        .collect();

    let readings = GlucoseReading::list_in_range(&state.db, user_id, Some(start), Some(end)).await?;
    let reading_records = readings
        .iter()
        .map(|r| ReadingRecord {
            date: r.measured_at.date(),
            value: r.value,
        })
        .collect();

    Ok((meal_records, reading_records))
}

#[instrument(skip(state))]
pub async fn daily(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(query): Query<DailyQuery>,
) -> Result<Json<DailySummary>, ApiError> {
    let date = match query.date.as_deref() {
        Some(s) => parse_date(s)?,
        None => today_utc(),
    };
    let (start, end) = day_bounds(date);
    let (meals, readings) = fetch_records(&state, user_id, start, end).await?;
    Ok(Json(engine::daily_summary(date, &meals, &readings)))
}

#[instrument(skip(state))]
pub async fn weekly(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(query): Query<WeeklyQuery>,
) -> Result<Json<WeeklySummary>, ApiError> {
    let end_date = match query.end_date.as_deref() {
        Some(s) => parse_date(s)?,
        None => today_utc(),
    };
    let (start_date, end_date) = week_window(end_date);
    let start = day_bounds(start_date).0;
    let end = day_bounds(end_date).1;
    let (meals, readings) = fetch_records(&state, user_id, start, end).await?;
    Ok(Json(engine::weekly_summary(
        start_date, end_date, &meals, &readings,
    )))
}

#[instrument(skip(state))]
pub async fn monthly(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(query): Query<MonthlyQuery>,
) -> Result<Json<MonthlySummary>, ApiError> {
    let today = today_utc();
    let year = query.year.unwrap_or_else(|| today.year());
    let month = query.month.unwrap_or_else(|| u8::from(today.month()));

    let (first, last) = month_bounds(year, month)?;
    let start = day_bounds(first).0;
    let end = day_bounds(last).1;
    let (meals, readings) = fetch_records(&state, user_id, start, end).await?;
    Ok(Json(engine::monthly_summary(year, month, &meals, &readings)))
}
