use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::dates::{day_bounds, parse_date};
use crate::error::ApiError;
use crate::glucose::dto::{
    CreateReadingRequest, RangeQuery, ReadingResponse, UpdateReadingRequest,
};
use crate::glucose::repo::{GlucoseReading, NewReading, ReadingPatch};
use crate::meals::repo::Meal;
use crate::state::AppState;

pub fn glucose_routes() -> Router<AppState> {
    Router::new()
        .route("/glucose", get(list_readings).post(create_reading))
        .route(
            "/glucose/:id",
            axum::routing::put(update_reading).delete(delete_reading),
        )
}

/// A reading may be tied to a meal, but only to one the caller owns.
async fn check_meal(state: &AppState, user_id: Uuid, meal_id: Uuid) -> Result<(), ApiError> {
    Meal::find(&state.db, user_id, meal_id)
        .await?
        .ok_or(ApiError::NotFound("Meal"))?;
    Ok(())
}

#[instrument(skip(state))]
pub async fn list_readings(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(range): Query<RangeQuery>,
) -> Result<Json<Vec<ReadingResponse>>, ApiError> {
    let start = range
        .start_date
        .as_deref()
        .map(parse_date)
        .transpose()?
        .map(|d| day_bounds(d).0);
    let end = range
        .end_date
        .as_deref()
        .map(parse_date)
        .transpose()?
        .map(|d| day_bounds(d).1);

    let readings = GlucoseReading::list_in_range(&state.db, user_id, start, end).await?;
    Ok(Json(readings.into_iter().map(ReadingResponse::from).collect()))
}

#[instrument(skip(state, payload))]
pub async fn create_reading(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<CreateReadingRequest>,
) -> Result<(StatusCode, Json<ReadingResponse>), ApiError> {
    payload.validate()?;
    if let Some(meal_id) = payload.meal_id {
        check_meal(&state, user_id, meal_id).await?;
    }

    let reading = GlucoseReading::create(
        &state.db,
        user_id,
        &NewReading {
            value: payload.value,
            measured_at: payload.measured_at,
            notes: payload.notes,
            meal_id: payload.meal_id,
        },
    )
    .await?;

    info!(reading_id = %reading.id, user_id = %user_id, "glucose reading logged");
    Ok((StatusCode::CREATED, Json(reading.into())))
}

#[instrument(skip(state, payload))]
pub async fn update_reading(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateReadingRequest>,
) -> Result<Json<ReadingResponse>, ApiError> {
    payload.validate()?;
    if let Some(Some(meal_id)) = payload.meal_id {
        check_meal(&state, user_id, meal_id).await?;
    }

    let patch = ReadingPatch {
        value: payload.value,
        measured_at: payload.measured_at,
        notes: payload.notes,
        meal_id: payload.meal_id,
    };
    let reading = GlucoseReading::update(&state.db, user_id, id, &patch)
        .await?
        .ok_or(ApiError::NotFound("Reading"))?;
    Ok(Json(reading.into()))
}

#[instrument(skip(state))]
pub async fn delete_reading(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    if !GlucoseReading::delete(&state.db, user_id, id).await? {
        return Err(ApiError::NotFound("Reading"));
    }
    info!(reading_id = %id, user_id = %user_id, "glucose reading deleted");
    Ok(StatusCode::NO_CONTENT)
}
