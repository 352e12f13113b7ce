pub mod authority;
pub mod health;
pub mod inspection;
pub mod smp;

use axum::Router;

use crate::state::AppState;

/// Build the `/api` route tree.
///
/// ```text
/// /inspections             list (GET), create (POST)
/// /inspections/{id}        update (PATCH), delete (DELETE)
///
/// /smp                     create (POST)
/// /smp/list                lookup (GET)
/// /smp/{id}                rename (PATCH)
///
/// /authority               list (GET), create (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/inspections", inspection::router())
        .nest("/smp", smp::router())
        .nest("/authority", authority::router())
}
