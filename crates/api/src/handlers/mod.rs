pub mod authority;
pub mod inspection;
pub mod smp;
