mod dto;
pub mod extractors;
pub mod handlers;
pub mod password;
pub mod tokens;

use crate::state::AppState;
use axum::Router;

pub fn router() -> Router<AppState> {
    Router::new().merge(handlers::auth_routes())
}
