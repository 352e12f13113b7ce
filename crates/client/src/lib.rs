//! Client side of the SMP inspection registry.
//!
//! The search screen is modelled without any UI toolkit: user intents go in
//! through [`driver::SearchHandle`], and the current view comes out of a
//! `watch` channel. Debouncing, de-duplication and stale-response fencing
//! live in [`coordinator`] and [`lookup`] as plain state machines driven by a
//! single task.

pub mod backend;
pub mod config;
pub mod coordinator;
pub mod driver;
pub mod error;
pub mod form;
pub mod lookup;
pub mod modal;
pub mod model;
