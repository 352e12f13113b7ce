//! Repository for the `smp_entities` table.

use smp_core::pagination::{LookupPage, LOOKUP_PAGE_SIZE};
use smp_core::query::contains_pattern;
use smp_core::types::DbId;
use sqlx::PgPool;

use crate::models::smp_entity::SmpEntity;

const COLUMNS: &str = "id, name_smp, created_at, updated_at";

/// Provides lookup and write operations for SMP entities.
pub struct SmpEntityRepo;

impl SmpEntityRepo {
    /// One page of entities whose name contains `term`, ordered by name.
    ///
    /// The page size is fixed at [`LOOKUP_PAGE_SIZE`]; `page` is clamped to 1.
    pub async fn lookup(
        pool: &PgPool,
        term: Option<&str>,
        page: i64,
    ) -> Result<LookupPage<SmpEntity>, sqlx::Error> {
        let page = page.max(1);
        let pattern = term
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(contains_pattern);

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM smp_entities WHERE ($1::TEXT IS NULL OR name_smp ILIKE $1)",
        )
        .bind(&pattern)
        .fetch_one(pool)
        .await?;

        let query = format!(
            "SELECT {COLUMNS} FROM smp_entities
             WHERE ($1::TEXT IS NULL OR name_smp ILIKE $1)
             ORDER BY name_smp ASC, id ASC
             LIMIT $2 OFFSET $3"
        );
        let items = sqlx::query_as::<_, SmpEntity>(&query)
            .bind(&pattern)
            .bind(LOOKUP_PAGE_SIZE)
            .bind((page - 1).saturating_mul(LOOKUP_PAGE_SIZE))
            .fetch_all(pool)
            .await?;

        Ok(LookupPage::new(items, total, page))
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<SmpEntity>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM smp_entities WHERE id = $1");
        sqlx::query_as::<_, SmpEntity>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Whether an entity with `id` exists.
    pub async fn exists(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM smp_entities WHERE id = $1)")
            .bind(id)
            .fetch_one(pool)
            .await
    }

    /// Whether another entity already uses `name`, ignoring `exclude_id`.
    pub async fn name_taken(
        pool: &PgPool,
        name: &str,
        exclude_id: Option<DbId>,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT EXISTS(
                SELECT 1 FROM smp_entities
                WHERE name_smp = $1 AND ($2::BIGINT IS NULL OR id <> $2)
             )",
        )
        .bind(name)
        .bind(exclude_id)
        .fetch_one(pool)
        .await
    }

    /// Insert a new entity, returning the created row.
    pub async fn create(pool: &PgPool, name: &str) -> Result<SmpEntity, sqlx::Error> {
        let query = format!("INSERT INTO smp_entities (name_smp) VALUES ($1) RETURNING {COLUMNS}");
        sqlx::query_as::<_, SmpEntity>(&query)
            .bind(name)
            .fetch_one(pool)
            .await
    }

    /// Rename an entity. Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        name: &str,
    ) -> Result<Option<SmpEntity>, sqlx::Error> {
        let query = format!(
            "UPDATE smp_entities SET name_smp = $2, updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, SmpEntity>(&query)
            .bind(id)
            .bind(name)
            .fetch_optional(pool)
            .await
    }
}
