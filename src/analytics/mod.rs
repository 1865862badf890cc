use axum::Router;

use crate::state::AppState;

mod dto;
pub mod engine;
pub mod handlers;

pub fn router() -> Router<AppState> {
    handlers::analytics_routes()
}
