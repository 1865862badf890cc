use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::catalog::dto::{CreateEntryRequest, EntryResponse, UpdateEntryRequest};
use crate::catalog::repo::{CatalogEntry, EntryKind, NewEntry};
use crate::error::ApiError;
use crate::state::AppState;

pub fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/foods", get(list_foods).post(create_food))
        .route(
            "/foods/:id",
            get(get_food).put(update_food).delete(delete_food),
        )
        .route("/recipes", get(list_recipes).post(create_recipe))
        .route(
            "/recipes/:id",
            get(get_recipe).put(update_recipe).delete(delete_recipe),
        )
}

// Foods and recipes share one store; each route family just pins the kind.

async fn list_entries(
    state: &AppState,
    user_id: Uuid,
    kind: EntryKind,
) -> Result<Json<Vec<EntryResponse>>, ApiError> {
    let entries = CatalogEntry::list_visible(&state.db, user_id, kind).await?;
    Ok(Json(entries.into_iter().map(EntryResponse::from).collect()))
}

async fn get_entry(
    state: &AppState,
    user_id: Uuid,
    id: Uuid,
    kind: EntryKind,
) -> Result<Json<EntryResponse>, ApiError> {
    let entry = CatalogEntry::find_visible_kind(&state.db, user_id, id, kind)
        .await?
        .ok_or(ApiError::NotFound(kind.noun()))?;
    Ok(Json(entry.into()))
}

async fn create_entry(
    state: &AppState,
    user_id: Uuid,
    kind: EntryKind,
    payload: CreateEntryRequest,
) -> Result<(StatusCode, Json<EntryResponse>), ApiError> {
    payload.validate()?;
    let entry = CatalogEntry::create(
        &state.db,
        &NewEntry {
            kind,
            name: payload.name,
            description: payload.description,
            calories: payload.calories,
            carbs: payload.carbs,
            protein: payload.protein,
            fat: payload.fat,
            serving_size: payload.serving_size,
            serving_unit: payload.serving_unit,
            instructions: payload.instructions,
            is_public: payload.is_public,
            owner_id: Some(user_id),
        },
    )
    .await?;
    info!(entry_id = %entry.id, kind = ?kind, user_id = %user_id, "catalog entry created");
    Ok((StatusCode::CREATED, Json(entry.into())))
}

async fn update_entry(
    state: &AppState,
    user_id: Uuid,
    id: Uuid,
    kind: EntryKind,
    payload: UpdateEntryRequest,
) -> Result<Json<EntryResponse>, ApiError> {
    payload.validate()?;
    let entry = CatalogEntry::update(&state.db, user_id, id, kind, &payload.into_patch())
        .await?
        .ok_or(ApiError::NotFound(kind.noun()))?;
    Ok(Json(entry.into()))
}

async fn delete_entry(
    state: &AppState,
    user_id: Uuid,
    id: Uuid,
    kind: EntryKind,
) -> Result<StatusCode, ApiError> {
    if !CatalogEntry::delete(&state.db, user_id, id, kind).await? {
        return Err(ApiError::NotFound(kind.noun()));
    }
    info!(entry_id = %id, kind = ?kind, user_id = %user_id, "catalog entry deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state))]
pub async fn list_foods(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Vec<EntryResponse>>, ApiError> {
    list_entries(&state, user_id, EntryKind::Food).await
}

#[instrument(skip(state))]
pub async fn get_food(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<EntryResponse>, ApiError> {
    get_entry(&state, user_id, id, EntryKind::Food).await
}

#[instrument(skip(state, payload))]
pub async fn create_food(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<CreateEntryRequest>,
) -> Result<(StatusCode, Json<EntryResponse>), ApiError> {
    create_entry(&state, user_id, EntryKind::Food, payload).await
}

#[instrument(skip(state, payload))]
pub async fn update_food(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateEntryRequest>,
) -> Result<Json<EntryResponse>, ApiError> {
    update_entry(&state, user_id, id, EntryKind::Food, payload).await
}

#[instrument(skip(state))]
pub async fn delete_food(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    delete_entry(&state, user_id, id, EntryKind::Food).await
}

#[instrument(skip(state))]
pub async fn list_recipes(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Vec<EntryResponse>>, ApiError> {
    list_entries(&state, user_id, EntryKind::Recipe).await
}

#[instrument(skip(state))]
pub async fn get_recipe(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<EntryResponse>, ApiError> {
    get_entry(&state, user_id, id, EntryKind::Recipe).await
}

#[instrument(skip(state, payload))]
pub async fn create_recipe(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<CreateEntryRequest>,
) -> Result<(StatusCode, Json<EntryResponse>), ApiError> {
    create_entry(&state, user_id, EntryKind::Recipe, payload).await
}

#[instrument(skip(state, payload))]
pub async fn update_recipe(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateEntryRequest>,
) -> Result<Json<EntryResponse>, ApiError> {
    update_entry(&state, user_id, id, EntryKind::Recipe, payload).await
}

#[instrument(skip(state))]
pub async fn delete_recipe(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    delete_entry(&state, user_id, id, EntryKind::Recipe).await
}
