//! Search coordinator for the inspection list.
//!
//! A plain state machine: the driver feeds it intents, timer expiries and
//! fetch results, and carries out the [`Effect`] it returns. Nothing here
//! sleeps or performs I/O, so every transition is testable with synthetic
//! instants.
//!
//! ```text
//!            intent                 deadline (new query)
//!   Idle ───────────► Debouncing ───────────────────────► InFlight
//!                      ▲    │ deadline (same query)          │
//!                      │    └──► previous settled phase      │ result
//!                      │                                     ▼
//!                      └──────── intent ─────────── Delivered / Errored
//! ```
//!
//! Every dispatch takes the next sequence number; a result is applied only
//! when it carries the latest one.

use std::time::Duration;

use smp_core::pagination::{PageMeta, PageResult};
use smp_core::query::InspectionQuery;
use tokio::time::Instant;

use crate::error::ClientError;
use crate::model::{InspectionRecord, SmpOption};

/// Where the coordinator is in its cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    /// Nothing dispatched yet.
    #[default]
    Idle,
    /// A candidate is waiting for the quiet window to expire.
    Debouncing,
    /// The latest query is on the wire.
    InFlight,
    /// The latest query's rows are on screen.
    Delivered,
    /// The latest query failed; the previous rows stay on screen.
    Errored,
}

/// A user-driven change to the search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchIntent {
    /// Text typed into the search box.
    Term(String),
    /// An entity picked from the suggestion list; searches by its name.
    SelectEntity(SmpOption),
    /// Drop the term and go back to page 1.
    ClearFilters,
    GoToPage(i64),
    NextPage,
    PrevPage,
    ChangePageSize(i64),
    /// Reload the current query now, e.g. after a create, edit or delete.
    Refresh,
}

impl SearchIntent {
    fn is_navigation(&self) -> bool {
        matches!(
            self,
            SearchIntent::GoToPage(_) | SearchIntent::NextPage | SearchIntent::PrevPage
        )
    }
}

/// What the driver must do after a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    None,
    /// (Re)arm the single debounce timer.
    ArmTimer(Instant),
    /// Send `query` tagged with `seq`, abandoning any earlier request.
    Dispatch { seq: u64, query: InspectionQuery },
}

/// Snapshot published to the screen.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SearchView {
    pub phase: Phase,
    pub rows: Vec<InspectionRecord>,
    pub pagination: PageMeta,
    /// Short message after a failed search; cleared by the next success.
    pub error: Option<String>,
    /// Entities appearing in the current rows, offered as search suggestions.
    pub suggestions: Vec<SmpOption>,
    /// The term the next (or current) query searches for.
    pub term: Option<String>,
}

impl SearchView {
    pub fn loading(&self) -> bool {
        self.phase == Phase::InFlight
    }
}

#[derive(Debug)]
pub struct SearchCoordinator {
    debounce: Duration,
    candidate: InspectionQuery,
    deadline: Option<Instant>,
    /// Last dispatched query, the baseline for suppressing repeats. Cleared
    /// after a failure so the same query can be retried.
    dispatched: Option<InspectionQuery>,
    seq: u64,
    awaiting: bool,
    /// Result for the latest sequence that arrived while a new candidate was
    /// debouncing; applied if that candidate turns out to be a repeat.
    parked: Option<Result<PageResult<InspectionRecord>, String>>,
    view: SearchView,
}

impl SearchCoordinator {
    pub fn new(debounce: Duration, per_page: i64) -> Self {
        let candidate = InspectionQuery::new(1, per_page);
        let view = SearchView {
            pagination: PageMeta::for_request(0, candidate.page()),
            ..SearchView::default()
        };
        Self {
            debounce,
            candidate,
            deadline: None,
            dispatched: None,
            seq: 0,
            awaiting: false,
            parked: None,
            view,
        }
    }

    pub fn view(&self) -> &SearchView {
        &self.view
    }

    pub fn phase(&self) -> Phase {
        self.view.phase
    }

    pub fn candidate(&self) -> &InspectionQuery {
        &self.candidate
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Sequence number of the most recent dispatch.
    pub fn latest_seq(&self) -> u64 {
        self.seq
    }

    /// Initial load: dispatch the default query without waiting.
    pub fn start(&mut self) -> Effect {
        self.dispatch()
    }

    /// Apply a user intent.
    ///
    /// Out-of-range navigation is ignored. Everything except navigation
    /// resets the page to 1.
    pub fn on_intent(&mut self, now: Instant, intent: SearchIntent) -> Effect {
        let navigation = intent.is_navigation();
        let current = self.candidate.page();
        let page_count = self.view.pagination.page_count;
        let per_page = current.per_page();

        let next = match &intent {
            SearchIntent::Refresh => {
                self.deadline = None;
                return self.dispatch();
            }
            SearchIntent::Term(text) => self.candidate.clone().with_term(Some(text)),
            SearchIntent::SelectEntity(option) => {
                self.candidate.clone().with_term(Some(&option.name_smp))
            }
            SearchIntent::ClearFilters => self.candidate.clone().with_term(None),
            SearchIntent::GoToPage(page) => {
                if *page < 1 || *page > page_count {
                    return Effect::None;
                }
                self.candidate.clone().at_page(*page, per_page)
            }
            SearchIntent::NextPage => {
                if current.page() >= page_count {
                    return Effect::None;
                }
                self.candidate.clone().at_page(current.page() + 1, per_page)
            }
            SearchIntent::PrevPage => {
                if current.page() <= 1 {
                    return Effect::None;
                }
                self.candidate.clone().at_page(current.page() - 1, per_page)
            }
            SearchIntent::ChangePageSize(size) => self.candidate.clone().at_page(1, *size),
        };

        self.candidate = if navigation {
            next
        } else {
            let per_page = next.page().per_page();
            next.at_page(1, per_page)
        };
        self.view.term = self.candidate.term().map(str::to_string);

        let deadline = now + self.debounce;
        self.deadline = Some(deadline);
        self.view.phase = Phase::Debouncing;
        Effect::ArmTimer(deadline)
    }

    /// The quiet window expired at `now`.
    pub fn on_deadline(&mut self, now: Instant) -> Effect {
        match self.deadline {
            Some(deadline) if now >= deadline => self.deadline = None,
            _ => return Effect::None,
        }

        let repeat = self
            .dispatched
            .as_ref()
            .is_some_and(|last| last.same_request(&self.candidate));
        if !repeat {
            return self.dispatch();
        }

        tracing::debug!(seq = self.seq, "Search suppressed, query unchanged");
        if let Some(result) = self.parked.take() {
            self.apply(result);
        } else if self.awaiting {
            self.view.phase = Phase::InFlight;
        } else {
            self.view.phase = self.settled_phase();
        }
        Effect::None
    }

    /// A fetch tagged `seq` finished. Returns whether it changed the view.
    pub fn on_result(
        &mut self,
        seq: u64,
        result: Result<PageResult<InspectionRecord>, ClientError>,
    ) -> bool {
        if seq != self.seq {
            tracing::debug!(seq, latest = self.seq, "Dropping stale search result");
            return false;
        }
        self.awaiting = false;

        let result = result.map_err(|e| {
            tracing::warn!(seq, error = %e, "Search failed");
            e.short_message()
        });

        if self.view.phase == Phase::Debouncing {
            self.parked = Some(result);
            return false;
        }
        self.apply(result);
        true
    }

    fn dispatch(&mut self) -> Effect {
        self.seq += 1;
        self.awaiting = true;
        self.parked = None;
        self.dispatched = Some(self.candidate.clone());
        self.view.phase = Phase::InFlight;

        tracing::debug!(
            seq = self.seq,
            term = self.candidate.term().unwrap_or(""),
            page = self.candidate.page().page(),
            per_page = self.candidate.page().per_page(),
            "Dispatching search",
        );
        Effect::Dispatch {
            seq: self.seq,
            query: self.candidate.clone(),
        }
    }

    fn apply(&mut self, result: Result<PageResult<InspectionRecord>, String>) {
        match result {
            Ok(page) => {
                self.view.suggestions = suggestions(&page.items);
                self.view.rows = page.items;
                self.view.pagination = page.meta;
                self.view.error = None;
                self.view.phase = Phase::Delivered;
            }
            Err(message) => {
                self.view.error = Some(message);
                self.view.phase = Phase::Errored;
                self.dispatched = None;
            }
        }
    }

    fn settled_phase(&self) -> Phase {
        if self.view.error.is_some() {
            Phase::Errored
        } else if self.seq > 0 {
            Phase::Delivered
        } else {
            Phase::Idle
        }
    }
}

/// Distinct entities among `rows`, in row order.
fn suggestions(rows: &[InspectionRecord]) -> Vec<SmpOption> {
    let mut out: Vec<SmpOption> = Vec::new();
    for row in rows {
        let Some(name) = &row.smp_name else { continue };
        if out.iter().any(|o| o.id == row.smp_id) {
            continue;
        }
        out.push(SmpOption {
            id: row.smp_id,
            name_smp: name.clone(),
        });
    }
    out
}

#[cfg(test)]
pub(crate) mod tests {
    use assert_matches::assert_matches;
    use chrono::{NaiveDate, TimeZone, Utc};
    use smp_core::pagination::PageRequest;

    use super::*;

    const DEBOUNCE: Duration = Duration::from_millis(300);

    pub(crate) fn record(id: i64, smp_id: i64, smp_name: &str) -> InspectionRecord {
        let at = Utc.with_ymd_and_hms(2025, 2, 25, 12, 0, 0).unwrap();
        InspectionRecord {
            id,
            smp_id,
            authority_id: 1,
            planned_start_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            planned_end_date: NaiveDate::from_ymd_opt(2025, 1, 5).unwrap(),
            planned_duration: 4,
            smp_name: Some(smp_name.to_string()),
            authority_name: Some("ФНС России".to_string()),
            created_at: at,
            updated_at: at,
        }
    }

    pub(crate) fn page_of(rows: Vec<InspectionRecord>, total: i64, page: i64, per_page: i64) -> PageResult<InspectionRecord> {
        PageResult::new(rows, total, PageRequest::new(page, per_page))
    }

    fn dispatched_seq(effect: Effect) -> u64 {
        match effect {
            Effect::Dispatch { seq, .. } => seq,
            other => panic!("expected dispatch, got {other:?}"),
        }
    }

    /// Coordinator after the initial load delivered `total` rows.
    fn loaded(total: i64) -> (SearchCoordinator, Instant) {
        let mut c = SearchCoordinator::new(DEBOUNCE, 10);
        let seq = dispatched_seq(c.start());
        assert!(c.on_result(seq, Ok(page_of(vec![record(1, 1, "Ромашка ООО")], total, 1, 10))));
        (c, Instant::now())
    }

    #[test]
    fn start_dispatches_immediately() {
        let mut c = SearchCoordinator::new(DEBOUNCE, 10);
        assert_matches!(c.start(), Effect::Dispatch { seq: 1, .. });
        assert_eq!(c.phase(), Phase::InFlight);
        assert!(c.view().loading());
    }

    #[test]
    fn typing_restarts_the_window() {
        let (mut c, t0) = loaded(1);
        assert_eq!(c.on_intent(t0, SearchIntent::Term("ро".into())), Effect::ArmTimer(t0 + DEBOUNCE));

        let t1 = t0 + Duration::from_millis(200);
        assert_eq!(c.on_intent(t1, SearchIntent::Term("ром".into())), Effect::ArmTimer(t1 + DEBOUNCE));

        // The first deadline no longer fires.
        assert_eq!(c.on_deadline(t0 + DEBOUNCE), Effect::None);
        assert_eq!(c.phase(), Phase::Debouncing);

        let effect = c.on_deadline(t1 + DEBOUNCE);
        assert_matches!(effect, Effect::Dispatch { seq: 2, ref query } if query.term() == Some("ром"));
    }

    #[test]
    fn identical_candidate_is_suppressed() {
        let (mut c, t0) = loaded(1);
        c.on_intent(t0, SearchIntent::Term("ромашка".into()));
        assert_matches!(c.on_deadline(t0 + DEBOUNCE), Effect::Dispatch { seq: 2, .. });
        assert!(c.on_result(2, Ok(page_of(vec![], 0, 1, 10))));

        let t1 = t0 + Duration::from_secs(2);
        c.on_intent(t1, SearchIntent::Term(" ромашка ".into()));
        assert_eq!(c.on_deadline(t1 + DEBOUNCE), Effect::None);
        assert_eq!(c.latest_seq(), 2);
        assert_eq!(c.phase(), Phase::Delivered);
    }

    #[test]
    fn stale_result_is_dropped() {
        let (mut c, t0) = loaded(1);
        c.on_intent(t0, SearchIntent::Term("a".into()));
        let a = dispatched_seq(c.on_deadline(t0 + DEBOUNCE));

        let t1 = t0 + Duration::from_secs(1);
        c.on_intent(t1, SearchIntent::Term("b".into()));
        let b = dispatched_seq(c.on_deadline(t1 + DEBOUNCE));

        assert!(c.on_result(b, Ok(page_of(vec![record(2, 2, "B")], 1, 1, 10))));
        assert!(!c.on_result(a, Ok(page_of(vec![record(3, 3, "A")], 1, 1, 10))));
        assert_eq!(c.view().rows[0].smp_name.as_deref(), Some("B"));
    }

    #[test]
    fn result_arriving_during_a_repeat_debounce_is_kept() {
        let (mut c, t0) = loaded(1);
        c.on_intent(t0, SearchIntent::Term("лют".into()));
        let seq = dispatched_seq(c.on_deadline(t0 + DEBOUNCE));

        // User types and deletes a character while the request is out.
        let t1 = t0 + Duration::from_millis(400);
        c.on_intent(t1, SearchIntent::Term("лютик".into()));
        c.on_intent(t1, SearchIntent::Term("лют".into()));
        assert!(!c.on_result(seq, Ok(page_of(vec![record(4, 2, "Лютик АО")], 1, 1, 10))));

        assert_eq!(c.on_deadline(t1 + DEBOUNCE), Effect::None);
        assert_eq!(c.phase(), Phase::Delivered);
        assert_eq!(c.view().rows.len(), 1);
    }

    #[test]
    fn failure_keeps_rows_and_allows_retry() {
        let (mut c, t0) = loaded(1);
        c.on_intent(t0, SearchIntent::Term("x".into()));
        let seq = dispatched_seq(c.on_deadline(t0 + DEBOUNCE));

        let err = ClientError::Api {
            status: 500,
            message: "An internal error occurred".into(),
        };
        assert!(c.on_result(seq, Err(err)));
        assert_eq!(c.phase(), Phase::Errored);
        assert_eq!(c.view().error.as_deref(), Some("An internal error occurred"));
        assert_eq!(c.view().rows.len(), 1);

        let t1 = t0 + Duration::from_secs(1);
        c.on_intent(t1, SearchIntent::Term("x".into()));
        assert_matches!(c.on_deadline(t1 + DEBOUNCE), Effect::Dispatch { .. });
    }

    #[test]
    fn navigation_is_bounded_by_page_count() {
        let (mut c, t0) = loaded(23);
        assert_eq!(c.view().pagination.page_count, 3);

        assert_eq!(c.on_intent(t0, SearchIntent::PrevPage), Effect::None);
        assert_eq!(c.on_intent(t0, SearchIntent::GoToPage(4)), Effect::None);
        assert_eq!(c.on_intent(t0, SearchIntent::GoToPage(0)), Effect::None);

        assert_matches!(c.on_intent(t0, SearchIntent::GoToPage(3)), Effect::ArmTimer(_));
        assert_eq!(c.candidate().page().page(), 3);
        assert_eq!(c.on_intent(t0, SearchIntent::NextPage), Effect::None);

        c.on_intent(t0, SearchIntent::PrevPage);
        assert_eq!(c.candidate().page().page(), 2);
    }

    #[test]
    fn non_navigation_changes_reset_the_page() {
        let (mut c, t0) = loaded(50);
        c.on_intent(t0, SearchIntent::GoToPage(4));

        c.on_intent(t0, SearchIntent::ChangePageSize(25));
        assert_eq!(c.candidate().page(), PageRequest::new(1, 25));

        c.on_intent(t0, SearchIntent::GoToPage(2));
        c.on_intent(t0, SearchIntent::Term("ром".into()));
        assert_eq!(c.candidate().page().page(), 1);

        c.on_intent(t0, SearchIntent::GoToPage(2));
        c.on_intent(t0, SearchIntent::ClearFilters);
        assert_eq!(c.candidate().page().page(), 1);
        assert_eq!(c.candidate().term(), None);
    }

    #[test]
    fn selecting_an_entity_searches_by_its_name() {
        let (mut c, t0) = loaded(1);
        let option = c.view().suggestions[0].clone();
        assert_eq!(option.name_smp, "Ромашка ООО");

        c.on_intent(t0, SearchIntent::SelectEntity(option));
        assert_eq!(c.view().term.as_deref(), Some("Ромашка ООО"));
        assert_matches!(
            c.on_deadline(t0 + DEBOUNCE),
            Effect::Dispatch { ref query, .. } if query.term() == Some("Ромашка ООО")
        );
    }

    #[test]
    fn refresh_bypasses_debounce_and_dedup() {
        let (mut c, t0) = loaded(1);
        assert_matches!(c.on_intent(t0, SearchIntent::Refresh), Effect::Dispatch { seq: 2, .. });
        assert_eq!(c.deadline(), None);
    }

    #[test]
    fn suggestions_are_distinct_by_entity() {
        let rows = vec![record(1, 1, "A"), record(2, 2, "B"), record(3, 1, "A")];
        let ids: Vec<i64> = suggestions(&rows).iter().map(|o| o.id).collect();
        assert_eq!(ids, vec![1, 2]);
    }
}
