//! Shared response envelope types for API handlers.
//!
//! Envelopes serialize with internal (`camelCase`) keys and are sent through
//! [`Wire`](crate::wire::Wire), which rewrites them into wire form.

use serde::Serialize;
use smp_core::pagination::PageMeta;
use smp_core::types::DbId;

/// `{ success, data }`.
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub success: bool,
    pub data: T,
}

impl<T: Serialize> DataResponse<T> {
    pub fn new(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// `{ success, message, data }`, used by updates.
#[derive(Debug, Serialize)]
pub struct MessageResponse<T: Serialize> {
    pub success: bool,
    pub message: &'static str,
    pub data: T,
}

/// `{ success, data: [...], pagination }`.
#[derive(Debug, Serialize)]
pub struct ListResponse<T: Serialize> {
    pub success: bool,
    pub data: Vec<T>,
    pub pagination: PageMeta,
}

/// `{ success, deletedId }`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletedResponse {
    pub success: bool,
    pub deleted_id: DbId,
}

/// `{ success, list }`, the unpaginated authority list.
#[derive(Debug, Serialize)]
pub struct ListAllResponse<T: Serialize> {
    pub success: bool,
    pub list: Vec<T>,
}
