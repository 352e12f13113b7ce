//! Handlers for the `/inspections` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use smp_core::error::{CoreError, FieldErrors};
use smp_core::inspection::{
    InspectionInput, FIELD_AUTHORITY, FIELD_SMP, MSG_AUTHORITY_MISSING, MSG_SMP_MISSING,
};
use smp_core::types::DbId;
use smp_db::models::inspection::InspectionRecord;
use smp_db::repositories::{ControlAuthorityRepo, InspectionRepo, SmpEntityRepo};
use smp_db::DbPool;

use crate::error::{AppError, AppResult};
use crate::query::InspectionListParams;
use crate::response::{DataResponse, DeletedResponse, ListResponse, MessageResponse};
use crate::state::AppState;
use crate::wire::{Wire, WireJson};

/// GET /api/inspections
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<InspectionListParams>,
) -> AppResult<Wire<ListResponse<InspectionRecord>>> {
    let query = params.into_query()?;
    let page = InspectionRepo::search(&state.pool, &query).await?;

    tracing::debug!(
        term = query.term(),
        page = page.meta.page,
        total = page.meta.total,
        "Inspections listed"
    );

    Ok(Wire(ListResponse {
        success: true,
        data: page.items,
        pagination: page.meta,
    }))
}

/// POST /api/inspections
pub async fn create(
    State(state): State<AppState>,
    WireJson(input): WireJson<InspectionInput>,
) -> AppResult<(StatusCode, Wire<DataResponse<InspectionRecord>>)> {
    let new = input.validate_new()?;
    ensure_references(&state.pool, Some(new.smp_id), Some(new.authority_id)).await?;

    let record = InspectionRepo::create(&state.pool, &new).await?;
    tracing::info!(
        inspection_id = record.id,
        smp_id = record.smp_id,
        authority_id = record.authority_id,
        "Inspection created"
    );

    Ok((StatusCode::CREATED, Wire(DataResponse::new(record))))
}

/// PATCH /api/inspections/{id}
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    WireJson(input): WireJson<InspectionInput>,
) -> AppResult<Wire<MessageResponse<InspectionRecord>>> {
    let current = InspectionRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;

    let patch = input.into_patch()?;
    if patch.is_empty() {
        return Err(AppError::BadRequest("No fields to update".into()));
    }
    ensure_references(&state.pool, patch.smp_id, patch.authority_id).await?;

    let schedule = patch.apply(&current.schedule())?;
    let record = InspectionRepo::update(&state.pool, id, &schedule)
        .await?
        .ok_or_else(|| not_found(id))?;
    tracing::info!(inspection_id = id, "Inspection updated");

    Ok(Wire(MessageResponse {
        success: true,
        message: "Inspection updated",
        data: record,
    }))
}

/// DELETE /api/inspections/{id}
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Wire<DeletedResponse>> {
    if !InspectionRepo::delete(&state.pool, id).await? {
        return Err(not_found(id));
    }
    tracing::info!(inspection_id = id, "Inspection deleted");

    Ok(Wire(DeletedResponse {
        success: true,
        deleted_id: id,
    }))
}

/// Check that referenced rows exist before writing. Missing references are
/// reported per field, entity first.
async fn ensure_references(
    pool: &DbPool,
    smp_id: Option<DbId>,
    authority_id: Option<DbId>,
) -> AppResult<()> {
    let mut errors = FieldErrors::default();

    if let Some(id) = smp_id {
        if !SmpEntityRepo::exists(pool, id).await? {
            errors.insert(FIELD_SMP, MSG_SMP_MISSING);
        }
    }
    if let Some(id) = authority_id {
        if !ControlAuthorityRepo::exists(pool, id).await? {
            errors.insert(FIELD_AUTHORITY, MSG_AUTHORITY_MISSING);
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(CoreError::Validation(errors).into())
    }
}

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Inspection",
        id,
    })
}
