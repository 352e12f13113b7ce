//! Entity lookup for the inspection form's autocomplete.
//!
//! Same shape as the search coordinator but simpler: a longer quiet window,
//! a minimum term length below which the list is cleared without a request,
//! and repeats suppressed against the last term that left the window.

use std::time::Duration;

use smp_core::pagination::LookupPage;
use tokio::time::Instant;

use crate::error::ClientError;
use crate::model::SmpOption;

/// What the driver must do after a lookup transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupEffect {
    None,
    ArmTimer(Instant),
    Dispatch { seq: u64, term: String },
}

#[derive(Debug)]
pub struct LookupCoordinator {
    debounce: Duration,
    min_chars: usize,
    pending: Option<String>,
    deadline: Option<Instant>,
    /// Last term that survived the quiet window, short or not.
    settled: Option<String>,
    seq: u64,
    items: Vec<SmpOption>,
    has_more: bool,
}

impl LookupCoordinator {
    pub fn new(debounce: Duration, min_chars: usize) -> Self {
        Self {
            debounce,
            min_chars,
            pending: None,
            deadline: None,
            settled: None,
            seq: 0,
            items: Vec::new(),
            has_more: false,
        }
    }

    pub fn items(&self) -> &[SmpOption] {
        &self.items
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn on_input(&mut self, now: Instant, text: &str) -> LookupEffect {
        self.pending = Some(text.trim().to_string());
        let deadline = now + self.debounce;
        self.deadline = Some(deadline);
        LookupEffect::ArmTimer(deadline)
    }

    pub fn on_deadline(&mut self, now: Instant) -> LookupEffect {
        match self.deadline {
            Some(deadline) if now >= deadline => self.deadline = None,
            _ => return LookupEffect::None,
        }
        let Some(term) = self.pending.take() else {
            return LookupEffect::None;
        };
        if self.settled.as_deref() == Some(term.as_str()) {
            return LookupEffect::None;
        }
        self.settled = Some(term.clone());

        // Short terms still take a sequence number so an outstanding longer
        // lookup cannot repopulate the list.
        self.seq += 1;
        if term.chars().count() < self.min_chars {
            self.clear();
            return LookupEffect::None;
        }

        tracing::debug!(seq = self.seq, term = %term, "Dispatching entity lookup");
        LookupEffect::Dispatch {
            seq: self.seq,
            term,
        }
    }

    /// Returns whether the result was applied.
    pub fn on_result(&mut self, seq: u64, result: Result<LookupPage<SmpOption>, ClientError>) -> bool {
        if seq != self.seq {
            tracing::debug!(seq, latest = self.seq, "Dropping stale lookup result");
            return false;
        }
        match result {
            Ok(page) => {
                self.has_more = page.has_more;
                self.items = page.items;
            }
            Err(e) => {
                tracing::warn!(seq, error = %e, "Entity lookup failed");
                self.clear();
            }
        }
        true
    }

    /// Show exactly one option, e.g. the stored entity when an edit form opens.
    pub fn preset(&mut self, option: SmpOption) {
        self.items = vec![option];
        self.has_more = false;
    }

    /// Forget the list and any pending term; used when the form resets.
    pub fn reset(&mut self) {
        self.pending = None;
        self.deadline = None;
        self.settled = None;
        self.seq += 1;
        self.clear();
    }

    fn clear(&mut self) {
        self.items.clear();
        self.has_more = false;
    }
}
