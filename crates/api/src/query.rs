//! Query-string parameter types for API handlers.
//!
//! All values arrive as optional text. Empty strings and `0` ids mean "no
//! filter"; malformed ids and dates are field-scoped validation errors;
//! malformed page values fall back to their defaults.

use serde::Deserialize;
use smp_core::error::CoreError;
use smp_core::inspection::{FIELD_AUTHORITY, FIELD_SMP};
use smp_core::pagination::DEFAULT_PER_PAGE;
use smp_core::query::{parse_filter_date, parse_filter_id, InspectionQuery};

/// `GET /inspections?page&per_page&search&smp_id&authority_id&date_from&date_to`.
#[derive(Debug, Default, Deserialize)]
pub struct InspectionListParams {
    pub page: Option<String>,
    pub per_page: Option<String>,
    pub search: Option<String>,
    pub smp_id: Option<String>,
    pub authority_id: Option<String>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
}

impl InspectionListParams {
    /// Build the search query. Page bounds are clamped, never rejected.
    pub fn into_query(self) -> Result<InspectionQuery, CoreError> {
        let smp_id = parse_filter_id(FIELD_SMP, self.smp_id.as_deref())?;
        let authority_id = parse_filter_id(FIELD_AUTHORITY, self.authority_id.as_deref())?;
        let date_from = parse_filter_date("dateFrom", self.date_from.as_deref())?;
        let date_to = parse_filter_date("dateTo", self.date_to.as_deref())?;

        Ok(InspectionQuery::new(
            parse_number(self.page.as_deref(), 1),
            parse_number(self.per_page.as_deref(), DEFAULT_PER_PAGE),
        )
        .with_term(self.search.as_deref())
        .with_smp(smp_id)
        .with_authority(authority_id)
        .with_dates(date_from, date_to))
    }
}

/// `GET /smp/list?search&page`.
#[derive(Debug, Default, Deserialize)]
pub struct LookupParams {
    pub search: Option<String>,
    pub page: Option<String>,
}

impl LookupParams {
    pub fn page(&self) -> i64 {
        parse_number(self.page.as_deref(), 1)
    }
}

fn parse_number(raw: Option<&str>, default: i64) -> i64 {
    raw.map(str::trim)
        .and_then(|s| s.parse::<i64>().ok())
        .unwrap_or(default)
}
