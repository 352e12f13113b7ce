//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument.

pub mod control_authority_repo;
pub mod inspection_repo;
pub mod smp_entity_repo;

pub use control_authority_repo::ControlAuthorityRepo;
pub use inspection_repo::InspectionRepo;
pub use smp_entity_repo::SmpEntityRepo;
