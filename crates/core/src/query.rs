//! Inspection search queries and the query plans built from them.
//!
//! [`InspectionQuery`] is the immutable search intent (term, structured
//! filters, page bounds). [`QueryPlan::build`] turns it into an ordered list of
//! predicates over the inspection view joined with entity and authority names.
//! Building is pure: the same query always yields the same plan, and nothing
//! carries over from one build to the next.

use std::cmp::Ordering;

use crate::error::CoreError;
use crate::pagination::PageRequest;
use crate::types::{Date, DbId, DATE_FORMAT};

// ---------------------------------------------------------------------------
// Query
// ---------------------------------------------------------------------------

/// A single search intent.
///
/// Construct with [`InspectionQuery::new`] and the `with_*` builders; a new
/// value is made for every change rather than mutating a shared one.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InspectionQuery {
    term: Option<String>,
    smp_id: Option<DbId>,
    authority_id: Option<DbId>,
    date_from: Option<Date>,
    date_to: Option<Date>,
    page: PageRequest,
}

impl InspectionQuery {
    pub fn new(page: i64, per_page: i64) -> Self {
        Self {
            page: PageRequest::new(page, per_page),
            ..Self::default()
        }
    }

    /// Set the free-text term. Whitespace-only terms count as no term.
    pub fn with_term(mut self, term: Option<&str>) -> Self {
        self.term = term
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string);
        self
    }

    /// Filter by entity id. `None` and non-positive ids are not a filter.
    pub fn with_smp(mut self, smp_id: Option<DbId>) -> Self {
        self.smp_id = smp_id.filter(|id| *id > 0);
        self
    }

    /// Filter by authority id. `None` and non-positive ids are not a filter.
    pub fn with_authority(mut self, authority_id: Option<DbId>) -> Self {
        self.authority_id = authority_id.filter(|id| *id > 0);
        self
    }

    pub fn with_dates(mut self, date_from: Option<Date>, date_to: Option<Date>) -> Self {
        self.date_from = date_from;
        self.date_to = date_to;
        self
    }

    pub fn at_page(mut self, page: i64, per_page: i64) -> Self {
        self.page = PageRequest::new(page, per_page);
        self
    }

    pub fn term(&self) -> Option<&str> {
        self.term.as_deref()
    }

    pub fn smp_id(&self) -> Option<DbId> {
        self.smp_id
    }

    pub fn authority_id(&self) -> Option<DbId> {
        self.authority_id
    }

    pub fn date_from(&self) -> Option<Date> {
        self.date_from
    }

    pub fn date_to(&self) -> Option<Date> {
        self.date_to
    }

    pub fn page(&self) -> PageRequest {
        self.page
    }

    /// Whether two candidates would issue the same request.
    ///
    /// Compares `(term, page, per_page)` by value, which are the fields the
    /// search coordinator changes.
    pub fn same_request(&self, other: &InspectionQuery) -> bool {
        self.term == other.term && self.page == other.page
    }

    /// Wire query-string pairs (`GET /inspections?...`), omitting absent filters.
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("page", self.page.page().to_string()),
            ("per_page", self.page.per_page().to_string()),
        ];
        if let Some(term) = &self.term {
            params.push(("search", term.clone()));
        }
        if let Some(id) = self.smp_id {
            params.push(("smp_id", id.to_string()));
        }
        if let Some(id) = self.authority_id {
            params.push(("authority_id", id.to_string()));
        }
        if let Some(date) = self.date_from {
            params.push(("date_from", date.format(DATE_FORMAT).to_string()));
        }
        if let Some(date) = self.date_to {
            params.push(("date_to", date.format(DATE_FORMAT).to_string()));
        }
        params
    }
}

// ---------------------------------------------------------------------------
// Filter parsing
// ---------------------------------------------------------------------------

/// Parse an optional id filter. Empty text and `0` are treated as absent.
pub fn parse_filter_id(field: &str, raw: Option<&str>) -> Result<Option<DbId>, CoreError> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };
    match raw.parse::<DbId>() {
        Ok(0) => Ok(None),
        Ok(id) if id > 0 => Ok(Some(id)),
        _ => Err(CoreError::invalid(field, "Must be a positive integer id")),
    }
}

/// Parse an optional `YYYY-MM-DD` date filter. Empty text is treated as absent.
pub fn parse_filter_date(field: &str, raw: Option<&str>) -> Result<Option<Date>, CoreError> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };
    Date::parse_from_str(raw, DATE_FORMAT)
        .map(Some)
        .map_err(|_| CoreError::invalid(field, "Invalid date format, expected YYYY-MM-DD"))
}

// ---------------------------------------------------------------------------
// Plan
// ---------------------------------------------------------------------------

/// One conjunct of a query plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// Case-insensitive substring of the entity name OR the authority name.
    NameContains(String),
    SmpIs(DbId),
    AuthorityIs(DbId),
    /// Inspection start date on or after the bound.
    StartsOnOrAfter(Date),
    /// Inspection end date on or before the bound.
    EndsOnOrBefore(Date),
}

/// Result ordering keys, applied in sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    StartDateDesc,
    IdDesc,
}

/// Newest planned start first; ties fall back to the most recently inserted.
pub const ORDERING: &[SortKey] = &[SortKey::StartDateDesc, SortKey::IdDesc];

/// Filtered, ordered, not-yet-paginated view of the inspection register.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryPlan {
    predicates: Vec<Predicate>,
}

impl QueryPlan {
    /// Build the plan for `query`. Predicates appear in a fixed order: term,
    /// entity, authority, start bound, end bound.
    pub fn build(query: &InspectionQuery) -> Self {
        let mut predicates = Vec::new();

        if let Some(term) = query.term() {
            predicates.push(Predicate::NameContains(term.to_string()));
        }
        if let Some(id) = query.smp_id() {
            predicates.push(Predicate::SmpIs(id));
        }
        if let Some(id) = query.authority_id() {
            predicates.push(Predicate::AuthorityIs(id));
        }
        if let Some(date) = query.date_from() {
            predicates.push(Predicate::StartsOnOrAfter(date));
        }
        if let Some(date) = query.date_to() {
            predicates.push(Predicate::EndsOnOrBefore(date));
        }

        Self { predicates }
    }

    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    pub fn ordering(&self) -> &'static [SortKey] {
        ORDERING
    }

    /// Evaluate the plan's predicates against one joined row.
    pub fn matches(&self, row: &impl PlanRow) -> bool {
        self.predicates.iter().all(|p| p.matches(row))
    }

    /// Compare two rows by the plan's ordering.
    pub fn compare(&self, a: &impl PlanRow, b: &impl PlanRow) -> Ordering {
        for key in self.ordering() {
            let ord = match key {
                SortKey::StartDateDesc => b.planned_start_date().cmp(&a.planned_start_date()),
                SortKey::IdDesc => b.id().cmp(&a.id()),
            };
            if ord != Ordering::Equal {
                return ord;
            }
        }
        Ordering::Equal
    }
}

impl Predicate {
    pub fn matches(&self, row: &impl PlanRow) -> bool {
        match self {
            Predicate::NameContains(term) => {
                let needle = term.to_lowercase();
                [row.smp_name(), row.authority_name()]
                    .into_iter()
                    .flatten()
                    .any(|name| name.to_lowercase().contains(&needle))
            }
            Predicate::SmpIs(id) => row.smp_id() == *id,
            Predicate::AuthorityIs(id) => row.authority_id() == *id,
            Predicate::StartsOnOrAfter(date) => row.planned_start_date() >= *date,
            Predicate::EndsOnOrBefore(date) => row.planned_end_date() <= *date,
        }
    }
}

/// The columns of the joined inspection view a plan reads.
pub trait PlanRow {
    fn id(&self) -> DbId;
    fn smp_id(&self) -> DbId;
    fn authority_id(&self) -> DbId;
    fn planned_start_date(&self) -> Date;
    fn planned_end_date(&self) -> Date;
    /// `None` when the left join found no entity.
    fn smp_name(&self) -> Option<&str>;
    /// `None` when the left join found no authority.
    fn authority_name(&self) -> Option<&str>;
}

/// `LIKE`/`ILIKE` pattern matching `term` anywhere, with wildcards escaped.
pub fn contains_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}
