use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::catalog::repo::{CatalogEntry, EntryKind};
use crate::dates::{day_bounds, parse_date};
use crate::error::ApiError;
use crate::meals::dto::{
    CreateMealItemRequest, CreateMealRequest, MealFromRecipeRequest, MealResponse, RangeQuery,
    UpdateMealRequest,
};
use crate::meals::repo::{Meal, MealPatch, NewMeal, NewMealItem};
use crate::state::AppState;

pub fn meal_routes() -> Router<AppState> {
    Router::new()
        .route("/meals", get(list_meals).post(create_meal))
        .route(
            "/meals/:id",
            get(get_meal).put(update_meal).delete(delete_meal),
        )
        .route("/meals/:id/items", post(add_item))
        .route("/meals/:id/items/:item_id", axum::routing::delete(remove_item))
        .route("/meals/from-recipe/:recipe_id", post(meal_from_recipe))
}

#[instrument(skip(state))]
pub async fn list_meals(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(range): Query<RangeQuery>,
) -> Result<Json<Vec<MealResponse>>, ApiError> {
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

    let meals = Meal::list_in_range(&state.db, user_id, start, end).await?;
    let ids: Vec<Uuid> = meals.iter().map(|m| m.id).collect();
    let items = Meal::items(&state.db, &ids).await?;

    let responses = meals
        .into_iter()
        .map(|meal| {
            let own: Vec<_> = items
                .iter()
                .filter(|i| i.meal_id == meal.id)
                .cloned()
                .collect();
            MealResponse::assemble(meal, &own)
        })
        .collect();
    Ok(Json(responses))
}

async fn load_meal_response(
    state: &AppState,
    user_id: Uuid,
    meal_id: Uuid,
) -> Result<MealResponse, ApiError> {
    let meal = Meal::find(&state.db, user_id, meal_id)
        .await?
        .ok_or(ApiError::NotFound("Meal"))?;
    let items = Meal::items(&state.db, &[meal.id]).await?;
    Ok(MealResponse::assemble(meal, &items))
}

#[instrument(skip(state))]
pub async fn get_meal(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<MealResponse>, ApiError> {
    Ok(Json(load_meal_response(&state, user_id, id).await?))
}

/// Checks that every referenced catalog entry exists and is visible to the
/// caller before anything is written.
async fn check_entries(
    state: &AppState,
    user_id: Uuid,
    items: &[CreateMealItemRequest],
) -> Result<(), ApiError> {
    for item in items {
        CatalogEntry::find_visible(&state.db, user_id, item.entry_id)
            .await?
            .ok_or(ApiError::NotFound("Catalog entry"))?;
    }
    Ok(())
}

#[instrument(skip(state, payload))]
pub async fn create_meal(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<CreateMealRequest>,
) -> Result<(StatusCode, Json<MealResponse>), ApiError> {
    payload.validate()?;
    check_entries(&state, user_id, &payload.items).await?;

    let meal = Meal::create(
        &state.db,
        user_id,
        &NewMeal {
            name: payload.name,
            eaten_at: payload.eaten_at,
            notes: payload.notes,
            items: payload
                .items
                .iter()
                .map(|i| NewMealItem {
                    entry_id: i.entry_id,
                    quantity: i.quantity,
                })
                .collect(),
        },
    )
    .await?;

    info!(meal_id = %meal.id, user_id = %user_id, "meal created");
    let items = Meal::items(&state.db, &[meal.id]).await?;
    Ok((
        StatusCode::CREATED,
        Json(MealResponse::assemble(meal, &items)),
    ))
}

#[instrument(skip(state, payload))]
pub async fn update_meal(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateMealRequest>,
) -> Result<Json<MealResponse>, ApiError> {
    payload.validate()?;
    let patch = MealPatch {
        name: payload.name,
        eaten_at: payload.eaten_at,
        notes: payload.notes,
    };
    let meal = Meal::update(&state.db, user_id, id, &patch)
        .await?
        .ok_or(ApiError::NotFound("Meal"))?;
    let items = Meal::items(&state.db, &[meal.id]).await?;
    Ok(Json(MealResponse::assemble(meal, &items)))
}

#[instrument(skip(state))]
pub async fn delete_meal(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    if !Meal::delete(&state.db, user_id, id).await? {
        return Err(ApiError::NotFound("Meal"));
    }
    info!(meal_id = %id, user_id = %user_id, "meal deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state, payload))]
pub async fn add_item(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<CreateMealItemRequest>,
) -> Result<Json<MealResponse>, ApiError> {
    payload.validate()?;
    Meal::find(&state.db, user_id, id)
        .await?
        .ok_or(ApiError::NotFound("Meal"))?;
    CatalogEntry::find_visible(&state.db, user_id, payload.entry_id)
        .await?
        .ok_or(ApiError::NotFound("Catalog entry"))?;

    Meal::add_item(&state.db, id, payload.entry_id, payload.quantity).await?;
    Ok(Json(load_meal_response(&state, user_id, id).await?))
}

#[instrument(skip(state))]
pub async fn remove_item(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path((id, item_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<MealResponse>, ApiError> {
    Meal::find(&state.db, user_id, id)
        .await?
        .ok_or(ApiError::NotFound("Meal"))?;
    if !Meal::remove_item(&state.db, id, item_id).await? {
        return Err(ApiError::NotFound("Meal item"));
    }
    Ok(Json(load_meal_response(&state, user_id, id).await?))
}

/// Logs one serving of a recipe as a new meal.
#[instrument(skip(state, payload))]
pub async fn meal_from_recipe(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(recipe_id): Path<Uuid>,
    payload: Option<Json<MealFromRecipeRequest>>,
) -> Result<(StatusCode, Json<MealResponse>), ApiError> {
    let recipe = CatalogEntry::find_visible_kind(&state.db, user_id, recipe_id, EntryKind::Recipe)
        .await?
        .ok_or(ApiError::NotFound("Recipe"))?;

    let eaten_at = payload.and_then(|Json(p)| p.eaten_at);
    let meal = Meal::create(
        &state.db,
        user_id,
        &NewMeal {
            name: recipe.name.clone(),
            eaten_at,
            notes: None,
            // one serving, expressed as an absolute amount
            items: vec![NewMealItem {
                entry_id: recipe.id,
                quantity: recipe.serving_size,
            }],
        },
    )
    .await?;

    info!(meal_id = %meal.id, recipe_id = %recipe.id, user_id = %user_id, "meal created from recipe");
    let items = Meal::items(&state.db, &[meal.id]).await?;
    Ok((
        StatusCode::CREATED,
        Json(MealResponse::assemble(meal, &items)),
    ))
}
