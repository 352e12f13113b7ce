use axum::routing::{get, patch};
use axum::Router;

use crate::handlers::inspection;
use crate::state::AppState;

/// Routes mounted at `/inspections`.
///
/// ```text
/// GET    /       -> list
/// POST   /       -> create
/// PATCH  /{id}   -> update
/// DELETE /{id}   -> delete
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(inspection::list).post(inspection::create))
        .route("/{id}", patch(inspection::update).delete(inspection::delete))
}
