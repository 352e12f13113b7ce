//! Control authority model.

use serde::{Deserialize, Serialize};
use smp_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A row from the `control_authorities` table.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ControlAuthority {
    pub id: DbId,
    pub name_authority: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
