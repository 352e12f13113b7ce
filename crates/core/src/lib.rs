//! Domain logic for the SMP inspection registry.
//!
//! Nothing in this crate performs I/O. The database, HTTP server and client
//! crates all build on these types so that the search pipeline (query plan,
//! pagination arithmetic, key-case transcoding) has exactly one definition.

pub mod case;
pub mod error;
pub mod inspection;
pub mod lenient;
pub mod pagination;
pub mod query;
pub mod reference;
pub mod types;
