//! Response shapes as seen by the client, in internal key-space.
//!
//! Every body is passed through [`smp_core::case::decode`] before it reaches
//! these types.

use serde::Deserialize;
use smp_core::inspection::FIELD_ORDER;
use smp_core::pagination::PageMeta;
use smp_core::types::{Date, DbId, Timestamp, DATE_FORMAT};

/// One row of the inspection list.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
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
    /// Planned period as shown in the table, `"2025-01-01 - 2025-01-05"`.
    pub fn date_range(&self) -> String {
        format!(
            "{} - {}",
            self.planned_start_date.format(DATE_FORMAT),
            self.planned_end_date.format(DATE_FORMAT)
        )
    }
}

/// Entity choice in the lookup dropdown.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SmpOption {
    pub id: DbId,
    pub name_smp: String,
}

/// Authority choice in the form selector.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorityOption {
    pub id: DbId,
    pub name_authority: String,
}

/// `GET /inspections`.
#[derive(Debug, Clone, Deserialize)]
pub struct InspectionList {
    pub data: Vec<InspectionRecord>,
    pub pagination: PageMeta,
}

/// `{ success, data }` and `{ success, message, data }`.
#[derive(Debug, Clone, Deserialize)]
pub struct DataEnvelope<T> {
    pub data: T,
}

/// `GET /authority`.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthorityList {
    pub list: Vec<AuthorityOption>,
}

/// `DELETE /inspections/{id}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deleted {
    pub deleted_id: DbId,
}

/// Error envelope of a non-2xx response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorEnvelope {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub errors: Option<serde_json::Map<String, serde_json::Value>>,
}

impl ErrorEnvelope {
    /// The most specific message available.
    ///
    /// Inspection fields are tried in form order, then any other field (such
    /// as a reference name), then the top-level message.
    pub fn message(&self) -> Option<String> {
        self.errors
            .as_ref()
            .and_then(|fields| {
                FIELD_ORDER
                    .iter()
                    .filter_map(|field| fields.get(*field))
                    .chain(fields.values())
                    .find_map(|v| v.as_str().map(str::to_string))
            })
            .or_else(|| self.error.clone())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use smp_core::case;

    use super::*;

    fn wire_row() -> serde_json::Value {
        json!({
            "id": 7,
            "smp_id": 1,
            "authority_id": 2,
            "planned_start_date": "2025-01-01",
            "planned_end_date": "2025-01-05",
            "planned_duration": 4,
            "smp_name": "Ромашка ООО",
            "authority_name": null,
            "created_at": "2025-02-25T12:00:00Z",
            "updated_at": "2025-02-25T12:00:00Z"
        })
    }

    #[test]
    fn decoded_row_deserializes() {
        let record: InspectionRecord = serde_json::from_value(case::decode(wire_row())).unwrap();
        assert_eq!(record.smp_name.as_deref(), Some("Ромашка ООО"));
        assert_eq!(record.authority_name, None);
        assert_eq!(record.date_range(), "2025-01-01 - 2025-01-05");
    }

    #[test]
    fn error_envelope_prefers_field_message() {
        let envelope: ErrorEnvelope = serde_json::from_value(case::decode(json!({
            "success": false,
            "error": "Validation failed",
            "errors": { "planned_end_date": "End date cannot be earlier than start date" }
        })))
        .unwrap();
        assert_eq!(
            envelope.message().as_deref(),
            Some("End date cannot be earlier than start date")
        );

        let bare: ErrorEnvelope = serde_json::from_value(json!({ "error": "Inspection with id 3 not found" })).unwrap();
        assert_eq!(bare.message().as_deref(), Some("Inspection with id 3 not found"));
    }

    #[test]
    fn error_envelope_reports_fields_in_form_order() {
        let envelope: ErrorEnvelope = serde_json::from_value(case::decode(json!({
            "errors": {
                "authority_id": "Select a control authority",
                "smp_id": "Select an SMP entity"
            }
        })))
        .unwrap();
        assert_eq!(envelope.message().as_deref(), Some("Select an SMP entity"));

        let other: ErrorEnvelope =
            serde_json::from_value(case::decode(json!({ "errors": { "name_smp": "Name is taken" } }))).unwrap();
        assert_eq!(other.message().as_deref(), Some("Name is taken"));
    }
}
