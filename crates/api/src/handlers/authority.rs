//! Handlers for the `/authority` resource.

use axum::extract::State;
use axum::http::StatusCode;
use smp_core::error::CoreError;
use smp_core::reference::{AuthorityInput, FIELD_NAME_AUTHORITY, MSG_AUTHORITY_NAME_TAKEN};
use smp_db::models::control_authority::ControlAuthority;
use smp_db::repositories::ControlAuthorityRepo;

use crate::error::AppResult;
use crate::response::{DataResponse, ListAllResponse};
use crate::state::AppState;
use crate::wire::{Wire, WireJson};

/// GET /api/authority
pub async fn list(State(state): State<AppState>) -> AppResult<Wire<ListAllResponse<ControlAuthority>>> {
    let list = ControlAuthorityRepo::list(&state.pool).await?;
    Ok(Wire(ListAllResponse {
        success: true,
        list,
    }))
}

/// POST /api/authority
pub async fn create(
    State(state): State<AppState>,
    WireJson(input): WireJson<AuthorityInput>,
) -> AppResult<(StatusCode, Wire<DataResponse<ControlAuthority>>)> {
    let name = input.normalize()?;
    if ControlAuthorityRepo::name_taken(&state.pool, &name, None).await? {
        return Err(CoreError::conflict(FIELD_NAME_AUTHORITY, MSG_AUTHORITY_NAME_TAKEN).into());
    }

    let authority = ControlAuthorityRepo::create(&state.pool, &name).await?;
    tracing::info!(authority_id = authority.id, "Control authority created");

    Ok((StatusCode::CREATED, Wire(DataResponse::new(authority))))
}
