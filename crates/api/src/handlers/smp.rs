//! Handlers for the `/smp` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use smp_core::error::CoreError;
use smp_core::pagination::LookupPage;
use smp_core::reference::{SmpEntityInput, FIELD_NAME_SMP, MSG_SMP_NAME_TAKEN};
use smp_core::types::DbId;
use smp_db::models::smp_entity::SmpEntity;
use smp_db::repositories::SmpEntityRepo;

use crate::error::{AppError, AppResult};
use crate::query::LookupParams;
use crate::response::DataResponse;
use crate::state::AppState;
use crate::wire::{Wire, WireJson};

/// GET /api/smp/list
pub async fn lookup(
    State(state): State<AppState>,
    Query(params): Query<LookupParams>,
) -> AppResult<Wire<LookupPage<SmpEntity>>> {
    let page = SmpEntityRepo::lookup(&state.pool, params.search.as_deref(), params.page()).await?;
    Ok(Wire(page))
}

/// POST /api/smp
pub async fn create(
    State(state): State<AppState>,
    WireJson(input): WireJson<SmpEntityInput>,
) -> AppResult<(StatusCode, Wire<DataResponse<SmpEntity>>)> {
    let name = input.normalize()?;
    if SmpEntityRepo::name_taken(&state.pool, &name, None).await? {
        return Err(CoreError::conflict(FIELD_NAME_SMP, MSG_SMP_NAME_TAKEN).into());
    }

    let entity = SmpEntityRepo::create(&state.pool, &name).await?;
    tracing::info!(smp_id = entity.id, "SMP entity created");

    Ok((StatusCode::CREATED, Wire(DataResponse::new(entity))))
}

/// PATCH /api/smp/{id}
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    WireJson(input): WireJson<SmpEntityInput>,
) -> AppResult<Wire<DataResponse<SmpEntity>>> {
    SmpEntityRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;

    let name = input.normalize()?;
    if SmpEntityRepo::name_taken(&state.pool, &name, Some(id)).await? {
        return Err(CoreError::conflict(FIELD_NAME_SMP, MSG_SMP_NAME_TAKEN).into());
    }

    let entity = SmpEntityRepo::update(&state.pool, id, &name)
        .await?
        .ok_or_else(|| not_found(id))?;
    tracing::info!(smp_id = id, "SMP entity renamed");

    Ok(Wire(DataResponse::new(entity)))
}

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "SmpEntity",
        id,
    })
}
