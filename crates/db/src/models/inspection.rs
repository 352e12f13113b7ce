//! Inspection model.

use serde::{Deserialize, Serialize};
use smp_core::inspection::Schedule;
use smp_core::query::PlanRow;
use smp_core::types::{Date, DbId, Timestamp};
use sqlx::FromRow;

/// An inspection joined with its entity and authority names.
///
/// `smp_name` and `authority_name` come from left joins and are `None` when
/// the referenced row is gone; they are never stored on the inspection.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InspectionRecord {
    pub id: DbId,
    pub smp_id: DbId,
    pub authority_id: DbId,
    pub planned_start_date: Date,
    pub planned_end_date: Date,
    pub planned_duration: i32,
    pub smp_name: Option<String>,
    pub authority_name: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl InspectionRecord {
    /// The writable columns, as the base for a partial update.
    pub fn schedule(&self) -> Schedule {
        Schedule {
            smp_id: self.smp_id,
            authority_id: self.authority_id,
            planned_start_date: self.planned_start_date,
            planned_end_date: self.planned_end_date,
            planned_duration: self.planned_duration,
        }
    }
}

impl PlanRow for InspectionRecord {
    fn id(&self) -> DbId {
        self.id
    }

    fn smp_id(&self) -> DbId {
        self.smp_id
    }

    fn authority_id(&self) -> DbId {
        self.authority_id
    }

    fn planned_start_date(&self) -> Date {
        self.planned_start_date
    }

    fn planned_end_date(&self) -> Date {
        self.planned_end_date
    }

    fn smp_name(&self) -> Option<&str> {
        self.smp_name.as_deref()
    }

    fn authority_name(&self) -> Option<&str> {
        self.authority_name.as_deref()
    }
}
