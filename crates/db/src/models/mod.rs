//! Row models returned by the repositories.

pub mod control_authority;
pub mod inspection;
pub mod smp_entity;
