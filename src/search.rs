use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tracing::instrument;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::catalog::dto::EntryResponse;
use crate::catalog::repo::{CatalogEntry, EntryKind};
use crate::error::ApiError;
use crate::meals::repo::Meal;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/search", get(search))
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MealHit {
    pub id: Uuid,
    pub name: String,
    #[serde(with = "time::serde::rfc3339")]
    pub eaten_at: OffsetDateTime,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SearchResults {
    pub foods: Vec<EntryResponse>,
    pub recipes: Vec<EntryResponse>,
    pub meals: Vec<MealHit>,
}

/// Case-insensitive substring search over the caller's visible catalog
/// entries and their own meals.
#[instrument(skip(state))]
pub async fn search(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(query): Query<SearchQuery>,
) -> Result<Json<SearchResults>, ApiError> {
    let q = query
        .q
        .as_deref()
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .ok_or_else(|| ApiError::Validation("Query parameter 'q' is required".into()))?;

    let foods = CatalogEntry::search_visible(&state.db, user_id, EntryKind::Food, q).await?;
    let recipes = CatalogEntry::search_visible(&state.db, user_id, EntryKind::Recipe, q).await?;
    let meals = Meal::search(&state.db, user_id, q).await?;

    Ok(Json(SearchResults {
        foods: foods.into_iter().map(EntryResponse::from).collect(),
        recipes: recipes.into_iter().map(EntryResponse::from).collect(),
        meals: meals
            .into_iter()
            .map(|m| MealHit {
                id: m.id,
                name: m.name,
                eaten_at: m.eaten_at,
                notes: m.notes,
            })
            .collect(),
    }))
}
