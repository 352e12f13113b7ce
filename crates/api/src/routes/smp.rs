use axum::routing::{get, patch, post};
use axum::Router;

use crate::handlers::smp;
use crate::state::AppState;

/// Routes mounted at `/smp`.
///
/// ```text
/// POST   /       -> create
/// GET    /list   -> lookup
/// PATCH  /{id}   -> update
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(smp::create))
        .route("/list", get(smp::lookup))
        .route("/{id}", patch(smp::update))
}
