//! Name rules for the reference records inspections point at.
//!
//! SMP entities and control authorities are each a single unique name.
//! Names are trimmed before every check and stored trimmed; comparison is
//! case-sensitive. Uniqueness itself is enforced by the repository.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::{CoreError, FieldErrors};

pub const MIN_NAME_LEN: u64 = 3;
pub const MAX_NAME_LEN: u64 = 500;

pub const FIELD_NAME_SMP: &str = "nameSmp";
pub const FIELD_NAME_AUTHORITY: &str = "nameAuthority";

pub const MSG_SMP_NAME_TAKEN: &str = "An SMP entity with this name already exists";
pub const MSG_AUTHORITY_NAME_TAKEN: &str = "A control authority with this name already exists";

/// Body of `POST /smp` and `PATCH /smp/{id}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SmpEntityInput {
    #[serde(default)]
    #[validate(length(
        min = 3,
        max = 500,
        message = "SMP entity name must be between 3 and 500 characters"
    ))]
    pub name_smp: String,
}

/// Body of `POST /authority`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AuthorityInput {
    #[serde(default)]
    #[validate(length(
        min = 3,
        max = 500,
        message = "Control authority name must be between 3 and 500 characters"
    ))]
    pub name_authority: String,
}

impl SmpEntityInput {
    /// Trim and validate; returns the name to store.
    pub fn normalize(self) -> Result<String, CoreError> {
        let input = Self {
            name_smp: self.name_smp.trim().to_string(),
        };
        check(&input, FIELD_NAME_SMP, &input.name_smp, "SMP entity name is required")?;
        Ok(input.name_smp)
    }
}

impl AuthorityInput {
    /// Trim and validate; returns the name to store.
    pub fn normalize(self) -> Result<String, CoreError> {
        let input = Self {
            name_authority: self.name_authority.trim().to_string(),
        };
        check(
            &input,
            FIELD_NAME_AUTHORITY,
            &input.name_authority,
            "Control authority name is required",
        )?;
        Ok(input.name_authority)
    }
}

fn check(input: &impl Validate, field: &str, name: &str, required: &str) -> Result<(), CoreError> {
    if name.is_empty() {
        return Err(CoreError::invalid(field, required));
    }
    input
        .validate()
        .map_err(|errors| CoreError::Validation(FieldErrors::from(errors)))
}
