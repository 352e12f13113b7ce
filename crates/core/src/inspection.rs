//! Inspection write rules: required fields, date order, duration bounds.
//!
//! Request bodies arrive as [`InspectionInput`] (every field optional and
//! text-tolerant). Creation goes through [`InspectionInput::validate_new`];
//! partial updates go through [`InspectionInput::into_patch`] followed by
//! [`InspectionPatch::apply`] against the stored [`Schedule`].
//!
//! Whether the referenced entity and authority exist is a database question
//! and is checked by the caller before any write.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, FieldErrors};
use crate::lenient;
use crate::types::{Date, DbId, DATE_FORMAT};

/// Shortest accepted inspection, in days.
pub const MIN_DURATION_DAYS: i32 = 1;

/// Longest accepted inspection, in days.
pub const MAX_DURATION_DAYS: i32 = 365;

pub const FIELD_SMP: &str = "smpId";
pub const FIELD_AUTHORITY: &str = "authorityId";
pub const FIELD_START: &str = "plannedStartDate";
pub const FIELD_END: &str = "plannedEndDate";
pub const FIELD_DURATION: &str = "plannedDuration";

/// Create-time check order; also the order field errors are reported in.
pub const FIELD_ORDER: [&str; 5] = [FIELD_SMP, FIELD_START, FIELD_END, FIELD_AUTHORITY, FIELD_DURATION];

pub const MSG_SMP_REQUIRED: &str = "Select an SMP entity";
pub const MSG_AUTHORITY_REQUIRED: &str = "Select a control authority";
pub const MSG_START_REQUIRED: &str = "Specify the start date";
pub const MSG_END_REQUIRED: &str = "Specify the end date";
pub const MSG_DURATION_REQUIRED: &str = "Specify the duration";
pub const MSG_BAD_ID: &str = "Must be a positive integer id";
pub const MSG_BAD_DATE: &str = "Invalid date format, expected YYYY-MM-DD";
pub const MSG_END_BEFORE_START: &str = "End date cannot be earlier than start date";
pub const MSG_DURATION_NOT_NUMBER: &str = "Duration must be a whole number of days";
pub const MSG_DURATION_RANGE: &str = "Duration must be between 1 and 365 days";
pub const MSG_RANGE_TOO_LONG: &str = "Inspection cannot span more than 365 days";
pub const MSG_SMP_MISSING: &str = "SMP entity not found";
pub const MSG_AUTHORITY_MISSING: &str = "Control authority not found";

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// Raw inspection fields as submitted by a create or update request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InspectionInput {
    #[serde(
        default,
        deserialize_with = "lenient::opt_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub smp_id: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient::opt_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub authority_id: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient::opt_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub planned_start_date: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient::opt_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub planned_end_date: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient::opt_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub planned_duration: Option<String>,
}

/// A fully validated inspection ready to insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewInspection {
    pub smp_id: DbId,
    pub authority_id: DbId,
    pub planned_start_date: Date,
    pub planned_end_date: Date,
    pub planned_duration: i32,
}

/// The stored, writable columns of an inspection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schedule {
    pub smp_id: DbId,
    pub authority_id: DbId,
    pub planned_start_date: Date,
    pub planned_end_date: Date,
    pub planned_duration: i32,
}

/// Parsed partial update. `None` fields keep their stored value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InspectionPatch {
    pub smp_id: Option<DbId>,
    pub authority_id: Option<DbId>,
    pub planned_start_date: Option<Date>,
    pub planned_end_date: Option<Date>,
    pub planned_duration: Option<i32>,
}

impl InspectionInput {
    /// Validate a create request.
    ///
    /// Fields are checked in [`FIELD_ORDER`]. Every failing field reports its
    /// first message. An omitted duration is derived from the date range, and
    /// a range too long to derive one is an end-date error.
    pub fn validate_new(&self) -> Result<NewInspection, CoreError> {
        let mut errors = FieldErrors::default();

        let smp_id = required(&mut errors, FIELD_SMP, &self.smp_id, MSG_SMP_REQUIRED, parse_id);
        let start = required(&mut errors, FIELD_START, &self.planned_start_date, MSG_START_REQUIRED, parse_date);
        let end = required(&mut errors, FIELD_END, &self.planned_end_date, MSG_END_REQUIRED, parse_date);

        if let (Some(start), Some(end)) = (start, end) {
            if end < start {
                errors.insert(FIELD_END, MSG_END_BEFORE_START);
            } else if self.planned_duration.is_none() {
                if let Err(message) = derive_duration(start, end) {
                    errors.insert(FIELD_END, message);
                }
            }
        }

        let authority_id = required(
            &mut errors,
            FIELD_AUTHORITY,
            &self.authority_id,
            MSG_AUTHORITY_REQUIRED,
            parse_id,
        );
        let duration = optional(&mut errors, FIELD_DURATION, &self.planned_duration, parse_duration);

        if !errors.is_empty() {
            return Err(CoreError::Validation(errors));
        }

        match (smp_id, authority_id, start, end) {
            (Some(smp_id), Some(authority_id), Some(start), Some(end)) => {
                let planned_duration = match duration {
                    Some(days) => days,
                    None => derive_duration(start, end).map_err(|m| CoreError::invalid(FIELD_END, m))?,
                };
                Ok(NewInspection {
                    smp_id,
                    authority_id,
                    planned_start_date: start,
                    planned_end_date: end,
                    planned_duration,
                })
            }
            _ => Err(CoreError::Internal("inspection fields missing after validation".into())),
        }
    }

    /// Parse the fields present in an update request.
    ///
    /// Absent fields stay `None`; present fields must be well-formed.
    pub fn into_patch(&self) -> Result<InspectionPatch, CoreError> {
        let mut errors = FieldErrors::default();

        let patch = InspectionPatch {
            smp_id: optional(&mut errors, FIELD_SMP, &self.smp_id, parse_id),
            planned_start_date: optional(&mut errors, FIELD_START, &self.planned_start_date, parse_date),
            planned_end_date: optional(&mut errors, FIELD_END, &self.planned_end_date, parse_date),
            authority_id: optional(&mut errors, FIELD_AUTHORITY, &self.authority_id, parse_id),
            planned_duration: optional(&mut errors, FIELD_DURATION, &self.planned_duration, parse_duration),
        };

        if errors.is_empty() {
            Ok(patch)
        } else {
            Err(CoreError::Validation(errors))
        }
    }
}

impl InspectionPatch {
    /// `true` when the request named no writable field.
    pub fn is_empty(&self) -> bool {
        *self == InspectionPatch::default()
    }

    /// Merge the patch over `current` and validate the effective values.
    ///
    /// The end date must not precede the effective start date. When either
    /// date changes and no duration is supplied, the duration is recomputed
    /// from the effective range, which must then fit [`MAX_DURATION_DAYS`].
    pub fn apply(&self, current: &Schedule) -> Result<Schedule, CoreError> {
        let start = self.planned_start_date.unwrap_or(current.planned_start_date);
        let end = self.planned_end_date.unwrap_or(current.planned_end_date);

        if end < start {
            return Err(CoreError::invalid(FIELD_END, MSG_END_BEFORE_START));
        }

        let dates_changed = start != current.planned_start_date || end != current.planned_end_date;
        let duration = match self.planned_duration {
            Some(days) => days,
            None if dates_changed => {
                derive_duration(start, end).map_err(|m| CoreError::invalid(FIELD_END, m))?
            }
            None => current.planned_duration,
        };

        Ok(Schedule {
            smp_id: self.smp_id.unwrap_or(current.smp_id),
            authority_id: self.authority_id.unwrap_or(current.authority_id),
            planned_start_date: start,
            planned_end_date: end,
            planned_duration: duration,
        })
    }
}

// ---------------------------------------------------------------------------
// Rules
// ---------------------------------------------------------------------------

/// Whole days between `start` and `end`, at least [`MIN_DURATION_DAYS`].
///
/// A range longer than [`MAX_DURATION_DAYS`] is rejected, not shortened.
pub fn derive_duration(start: Date, end: Date) -> Result<i32, &'static str> {
    let days = (end - start).num_days().max(i64::from(MIN_DURATION_DAYS));
    i32::try_from(days)
        .ok()
        .filter(|days| *days <= MAX_DURATION_DAYS)
        .ok_or(MSG_RANGE_TOO_LONG)
}

/// Check an explicit duration against the accepted bounds.
pub fn validate_duration(days: i64) -> Result<i32, &'static str> {
    if (i64::from(MIN_DURATION_DAYS)..=i64::from(MAX_DURATION_DAYS)).contains(&days) {
        Ok(days as i32)
    } else {
        Err(MSG_DURATION_RANGE)
    }
}

fn parse_id(raw: &str) -> Result<DbId, &'static str> {
    match raw.parse::<DbId>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(MSG_BAD_ID),
    }
}

fn parse_date(raw: &str) -> Result<Date, &'static str> {
    Date::parse_from_str(raw, DATE_FORMAT).map_err(|_| MSG_BAD_DATE)
}

fn parse_duration(raw: &str) -> Result<i32, &'static str> {
    let days = raw.parse::<i64>().map_err(|_| MSG_DURATION_NOT_NUMBER)?;
    validate_duration(days)
}

fn required<T>(
    errors: &mut FieldErrors,
    field: &str,
    raw: &Option<String>,
    missing: &str,
    parse: fn(&str) -> Result<T, &'static str>,
) -> Option<T> {
    match raw {
        None => {
            errors.insert(field, missing);
            None
        }
        Some(_) => optional(errors, field, raw, parse),
    }
}

fn optional<T>(
    errors: &mut FieldErrors,
    field: &str,
    raw: &Option<String>,
    parse: fn(&str) -> Result<T, &'static str>,
) -> Option<T> {
    let raw = raw.as_deref()?;
    match parse(raw) {
        Ok(value) => Some(value),
        Err(message) => {
            errors.insert(field, message);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn date(s: &str) -> Date {
        Date::parse_from_str(s, DATE_FORMAT).unwrap()
    }

    fn input(smp: &str, authority: &str, start: &str, end: &str, duration: &str) -> InspectionInput {
        let opt = |s: &str| (!s.is_empty()).then(|| s.to_string());
        InspectionInput {
            smp_id: opt(smp),
            authority_id: opt(authority),
            planned_start_date: opt(start),
            planned_end_date: opt(end),
            planned_duration: opt(duration),
        }
    }

    fn stored() -> Schedule {
        Schedule {
            smp_id: 1,
            authority_id: 2,
            planned_start_date: date("2025-03-01"),
            planned_end_date: date("2025-03-10"),
            planned_duration: 9,
        }
    }

    #[test]
    fn omitted_duration_is_derived_from_dates() {
        let new = input("1", "2", "2025-01-01", "2025-01-05", "")
            .validate_new()
            .unwrap();
        assert_eq!(new.planned_duration, 4);
    }

    #[test]
    fn same_day_inspection_lasts_one_day() {
        assert_eq!(derive_duration(date("2025-01-01"), date("2025-01-01")), Ok(1));
    }

    #[test]
    fn derived_duration_is_not_shortened() {
        assert_eq!(derive_duration(date("2025-01-01"), date("2026-01-01")), Ok(365));
        assert_eq!(
            derive_duration(date("2025-01-01"), date("2026-06-01")),
            Err(MSG_RANGE_TOO_LONG)
        );
    }

    #[test]
    fn long_range_without_duration_is_rejected_on_create() {
        let err = input("1", "2", "2025-01-01", "2026-06-01", "")
            .validate_new()
            .unwrap_err();
        let fields = err.field_errors().unwrap();
        assert_eq!(fields.get(FIELD_END), Some(MSG_RANGE_TOO_LONG));
        assert_eq!(fields.len(), 1);

        let new = input("1", "2", "2025-01-01", "2026-06-01", "30")
            .validate_new()
            .unwrap();
        assert_eq!(new.planned_duration, 30);
    }

    #[test]
    fn long_range_without_duration_is_rejected_on_update() {
        let patch = input("", "", "", "2026-06-01", "").into_patch().unwrap();
        let err = patch.apply(&stored()).unwrap_err();
        assert_eq!(err.field_errors().unwrap().get(FIELD_END), Some(MSG_RANGE_TOO_LONG));

        let patch = input("", "", "", "2026-06-01", "200").into_patch().unwrap();
        assert_eq!(patch.apply(&stored()).unwrap().planned_duration, 200);
    }

    #[test]
    fn missing_fields_are_reported_in_check_order() {
        let err = InspectionInput::default().validate_new().unwrap_err();
        let order: Vec<&str> = err.field_errors().unwrap().iter().map(|(field, _)| field).collect();
        assert_eq!(order, [FIELD_SMP, FIELD_START, FIELD_END, FIELD_AUTHORITY]);
    }

    #[test]
    fn explicit_duration_is_kept_when_in_bounds() {
        let new = input("1", "2", "2025-01-01", "2025-01-05", "10")
            .validate_new()
            .unwrap();
        assert_eq!(new.planned_duration, 10);
    }

    #[test]
    fn explicit_duration_out_of_bounds_is_rejected() {
        for raw in ["0", "366", "-3"] {
            let err = input("1", "2", "2025-01-01", "2025-01-05", raw)
                .validate_new()
                .unwrap_err();
            let fields = err.field_errors().unwrap();
            assert_eq!(fields.get(FIELD_DURATION), Some(MSG_DURATION_RANGE), "{raw}");
        }

        let err = input("1", "2", "2025-01-01", "2025-01-05", "five")
            .validate_new()
            .unwrap_err();
        assert_eq!(
            err.field_errors().unwrap().get(FIELD_DURATION),
            Some(MSG_DURATION_NOT_NUMBER)
        );
    }

    #[test]
    fn missing_fields_are_all_reported() {
        let err = InspectionInput::default().validate_new().unwrap_err();
        let fields = err.field_errors().unwrap();
        assert_eq!(fields.get(FIELD_SMP), Some(MSG_SMP_REQUIRED));
        assert_eq!(fields.get(FIELD_START), Some(MSG_START_REQUIRED));
        assert_eq!(fields.get(FIELD_END), Some(MSG_END_REQUIRED));
        assert_eq!(fields.get(FIELD_AUTHORITY), Some(MSG_AUTHORITY_REQUIRED));
        assert_eq!(fields.get(FIELD_DURATION), None);
    }

    #[test]
    fn malformed_values_are_field_scoped() {
        let err = input("abc", "2", "01.01.2025", "2025-01-05", "")
            .validate_new()
            .unwrap_err();
        let fields = err.field_errors().unwrap();
        assert_eq!(fields.get(FIELD_SMP), Some(MSG_BAD_ID));
        assert_eq!(fields.get(FIELD_START), Some(MSG_BAD_DATE));
        assert_eq!(fields.len(), 2);
    }

    #[test]
    fn end_before_start_is_rejected_on_create() {
        let err = input("1", "2", "2025-01-05", "2025-01-01", "")
            .validate_new()
            .unwrap_err();
        assert_eq!(err.field_errors().unwrap().get(FIELD_END), Some(MSG_END_BEFORE_START));
    }

    #[test]
    fn update_moving_end_before_effective_start_fails() {
        let patch = input("", "", "", "2025-02-01", "").into_patch().unwrap();
        let err = patch.apply(&stored()).unwrap_err();
        assert_matches!(err, CoreError::Validation(_));
        assert_eq!(err.field_errors().unwrap().get(FIELD_END), Some(MSG_END_BEFORE_START));
    }

    #[test]
    fn update_with_dates_recomputes_duration() {
        let patch = input("", "", "2025-03-05", "", "").into_patch().unwrap();
        let merged = patch.apply(&stored()).unwrap();
        assert_eq!(merged.planned_start_date, date("2025-03-05"));
        assert_eq!(merged.planned_end_date, date("2025-03-10"));
        assert_eq!(merged.planned_duration, 5);
    }

    #[test]
    fn update_without_dates_keeps_duration() {
        let patch = input("7", "", "", "", "").into_patch().unwrap();
        let merged = patch.apply(&stored()).unwrap();
        assert_eq!(merged.smp_id, 7);
        assert_eq!(merged.planned_duration, 9);
    }

    #[test]
    fn update_with_explicit_duration_wins() {
        let patch = input("", "", "2025-03-05", "", "30").into_patch().unwrap();
        assert_eq!(patch.apply(&stored()).unwrap().planned_duration, 30);
    }

    #[test]
    fn empty_patch_is_detected() {
        assert!(InspectionInput::default().into_patch().unwrap().is_empty());
        assert!(!input("", "3", "", "", "").into_patch().unwrap().is_empty());
    }

    #[test]
    fn input_accepts_numbers_and_strings() {
        let raw: InspectionInput = serde_json::from_value(serde_json::json!({
            "smpId": 1,
            "authorityId": "2",
            "plannedStartDate": "2025-01-01",
            "plannedEndDate": "2025-01-05",
            "plannedDuration": ""
        }))
        .unwrap();
        assert_eq!(raw.smp_id.as_deref(), Some("1"));
        assert_eq!(raw.planned_duration, None);
        assert!(raw.validate_new().is_ok());
    }
}
