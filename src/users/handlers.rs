use axum::{
    extract::State,
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::auth::handlers::is_valid_email;
use crate::auth::password::hash_password;
use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::state::AppState;
use crate::users::dto::{UpdateUserRequest, UserProfile};
use crate::users::repo::{User, UserPatch};

pub fn user_routes() -> Router<AppState> {
    Router::new().route("/user", get(get_user).put(update_user).delete(delete_user))
}

#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<UserProfile>, ApiError> {
    let user = User::find_by_id(&state.db, user_id)
        .await?
        .ok_or(ApiError::NotFound("User"))?;
    Ok(Json(user.into()))
}

#[instrument(skip(state, payload))]
pub async fn update_user(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(mut payload): Json<UpdateUserRequest>,
) -> Result<Json<UserProfile>, ApiError> {
    if let Some(email) = payload.email.as_mut() {
        *email = email.trim().to_lowercase();
        if !is_valid_email(email) {
            warn!(email = %email, "invalid email");
            return Err(ApiError::Validation("Invalid email".into()));
        }
        match User::find_by_email(&state.db, email).await? {
            Some(existing) if existing.id != user_id => {
                return Err(ApiError::Conflict("Email already registered".into()));
            }
            _ => {}
        }
    }

    let password_hash = match payload.password.as_deref() {
        Some(p) if p.len() < 8 => {
            return Err(ApiError::Validation("Password too short".into()));
        }
        Some(p) => Some(hash_password(p)?),
        None => None,
    };

    let patch = UserPatch {
        email: payload.email,
        password_hash,
        name: payload.name,
        height: payload.height,
        weight: payload.weight,
        age: payload.age,
        gender: payload.gender,
        goal_calories: payload.goal_calories,
        goal_carbs: payload.goal_carbs,
        goal_protein: payload.goal_protein,
        goal_fat: payload.goal_fat,
    };

    let user = User::update(&state.db, user_id, &patch)
        .await?
        .ok_or(ApiError::NotFound("User"))?;
    info!(user_id = %user_id, "profile updated");
    Ok(Json(user.into()))
}

#[instrument(skip(state))]
pub async fn delete_user(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<StatusCode, ApiError> {
    if !User::delete(&state.db, user_id).await? {
        return Err(ApiError::NotFound("User"));
    }
    info!(user_id = %user_id, "account deleted");
    Ok(StatusCode::NO_CONTENT)
}
