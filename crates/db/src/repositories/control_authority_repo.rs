//! Repository for the `control_authorities` table.

use smp_core::types::DbId;
use sqlx::PgPool;

use crate::models::control_authority::ControlAuthority;

const COLUMNS: &str = "id, name_authority, created_at, updated_at";

/// Provides list and write operations for control authorities.
pub struct ControlAuthorityRepo;

impl ControlAuthorityRepo {
    /// All authorities ordered by name.
    pub async fn list(pool: &PgPool) -> Result<Vec<ControlAuthority>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM control_authorities ORDER BY name_authority ASC, id ASC");
        sqlx::query_as::<_, ControlAuthority>(&query)
            .fetch_all(pool)
            .await
    }

    pub async fn exists(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM control_authorities WHERE id = $1)")
            .bind(id)
            .fetch_one(pool)
            .await
    }

    /// Whether another authority already uses `name`, ignoring `exclude_id`.
    pub async fn name_taken(
        pool: &PgPool,
        name: &str,
        exclude_id: Option<DbId>,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT EXISTS(
                SELECT 1 FROM control_authorities
                WHERE name_authority = $1 AND ($2::BIGINT IS NULL OR id <> $2)
             )",
        )
        .bind(name)
        .bind(exclude_id)
        .fetch_one(pool)
        .await
    }

    /// Insert a new authority, returning the created row.
    pub async fn create(pool: &PgPool, name: &str) -> Result<ControlAuthority, sqlx::Error> {
        let query = format!(
            "INSERT INTO control_authorities (name_authority) VALUES ($1) RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ControlAuthority>(&query)
            .bind(name)
            .fetch_one(pool)
            .await
    }
}
