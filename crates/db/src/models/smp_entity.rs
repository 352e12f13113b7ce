//! SMP entity model.

use serde::{Deserialize, Serialize};
use smp_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A row from the `smp_entities` table.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SmpEntity {
    pub id: DbId,
    pub name_smp: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
