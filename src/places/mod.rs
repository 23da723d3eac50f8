pub mod dto;
pub mod geo;
pub mod handlers;
mod repo;
pub mod repo_types;

use crate::state::AppState;
use axum::Router;

pub use repo::find_visible;

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(handlers::browse_routes())
        .merge(handlers::owned_routes())
}
