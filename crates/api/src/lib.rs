//! HTTP server for the SMP inspection registry.
//!
//! Exposes config, state, error handling, wire adapters and routes so the
//! binary entrypoint and the integration tests build the same application.

pub mod config;
pub mod error;
pub mod handlers;
pub mod query;
pub mod response;
pub mod router;
pub mod routes;
pub mod state;
pub mod wire;
