use axum::routing::get;
use axum::Router;

use crate::handlers::authority;
use crate::state::AppState;

/// Routes mounted at `/authority`.
///
/// ```text
/// GET    /   -> list
/// POST   /   -> create
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(authority::list).post(authority::create))
}
