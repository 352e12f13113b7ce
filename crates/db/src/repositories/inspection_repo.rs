//! Repository for the `register_of_inspections` table.
//!
//! Reads always go through the joined view (inspection LEFT JOIN entity LEFT
//! JOIN authority) so every returned record carries current names.

use smp_core::inspection::{NewInspection, Schedule};
use smp_core::pagination::{PageRequest, PageResult};
use smp_core::query::{contains_pattern, InspectionQuery, Predicate, QueryPlan, SortKey};
use smp_core::types::DbId;
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::models::inspection::InspectionRecord;

/// Projection of the joined view.
const COLUMNS: &str = "r.id, r.smp_id, r.authority_id, r.planned_start_date, \
    r.planned_end_date, r.planned_duration, \
    s.name_smp AS smp_name, a.name_authority AS authority_name, \
    r.created_at, r.updated_at";

/// Source of the joined view; the alias `r` is the inspection row.
const JOINS: &str = "LEFT JOIN smp_entities s ON s.id = r.smp_id \
    LEFT JOIN control_authorities a ON a.id = r.authority_id";

/// Provides search and CRUD operations for inspections.
pub struct InspectionRepo;

impl InspectionRepo {
    /// Run `query`: count the filtered view, then fetch one ordered page.
    ///
    /// The count and the page share the same predicates.
    pub async fn search(
        pool: &PgPool,
        query: &InspectionQuery,
    ) -> Result<PageResult<InspectionRecord>, sqlx::Error> {
        let plan = QueryPlan::build(query);
        let page = query.page();

        let mut count = count_query(&plan);
        let total = count.build_query_scalar::<i64>().fetch_one(pool).await?;

        let mut select = page_query(&plan, page);
        tracing::debug!(sql = select.sql(), total, "Inspection search");
        let items = select
            .build_query_as::<InspectionRecord>()
            .fetch_all(pool)
            .await?;

        Ok(PageResult::new(items, total, page))
    }

    /// Find one inspection with its joined names.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<InspectionRecord>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM register_of_inspections r {JOINS} WHERE r.id = $1");
        sqlx::query_as::<_, InspectionRecord>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Insert an inspection, returning it re-read with joined names.
    pub async fn create(
        pool: &PgPool,
        input: &NewInspection,
    ) -> Result<InspectionRecord, sqlx::Error> {
        let query = format!(
            "WITH r AS (
                INSERT INTO register_of_inspections
                    (smp_id, authority_id, planned_start_date, planned_end_date, planned_duration)
                VALUES ($1, $2, $3, $4, $5)
                RETURNING *
             )
             SELECT {COLUMNS} FROM r {JOINS}"
        );
        sqlx::query_as::<_, InspectionRecord>(&query)
            .bind(input.smp_id)
            .bind(input.authority_id)
            .bind(input.planned_start_date)
            .bind(input.planned_end_date)
            .bind(input.planned_duration)
            .fetch_one(pool)
            .await
    }

    /// Write the merged schedule and bump `updated_at`.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        schedule: &Schedule,
    ) -> Result<Option<InspectionRecord>, sqlx::Error> {
        let query = format!(
            "WITH r AS (
                UPDATE register_of_inspections SET
                    smp_id = $2,
                    authority_id = $3,
                    planned_start_date = $4,
                    planned_end_date = $5,
                    planned_duration = $6,
                    updated_at = NOW()
                WHERE id = $1
                RETURNING *
             )
             SELECT {COLUMNS} FROM r {JOINS}"
        );
        sqlx::query_as::<_, InspectionRecord>(&query)
            .bind(id)
            .bind(schedule.smp_id)
            .bind(schedule.authority_id)
            .bind(schedule.planned_start_date)
            .bind(schedule.planned_end_date)
            .bind(schedule.planned_duration)
            .fetch_optional(pool)
            .await
    }

    /// Permanently delete an inspection. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM register_of_inspections WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

// ---------------------------------------------------------------------------
// SQL rendering
// ---------------------------------------------------------------------------

/// `SELECT COUNT(*)` over the filtered view, without ordering or limits.
pub fn count_query(plan: &QueryPlan) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new(format!(
        "SELECT COUNT(*) FROM register_of_inspections r {JOINS}"
    ));
    push_predicates(&mut builder, plan);
    builder
}

/// One ordered page of the filtered view.
pub fn page_query(plan: &QueryPlan, page: PageRequest) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new(format!(
        "SELECT {COLUMNS} FROM register_of_inspections r {JOINS}"
    ));
    push_predicates(&mut builder, plan);
    push_ordering(&mut builder, plan);
    builder
        .push(" LIMIT ")
        .push_bind(page.per_page())
        .push(" OFFSET ")
        .push_bind(page.offset());
    builder
}

fn push_predicates(builder: &mut QueryBuilder<'static, Postgres>, plan: &QueryPlan) {
    for (i, predicate) in plan.predicates().iter().enumerate() {
        builder.push(if i == 0 { " WHERE " } else { " AND " });
        match predicate {
            Predicate::NameContains(term) => {
                let pattern = contains_pattern(term);
                builder
                    .push("(s.name_smp ILIKE ")
                    .push_bind(pattern.clone())
                    .push(" OR a.name_authority ILIKE ")
                    .push_bind(pattern)
                    .push(")");
            }
            Predicate::SmpIs(id) => {
                builder.push("r.smp_id = ").push_bind(*id);
            }
            Predicate::AuthorityIs(id) => {
                builder.push("r.authority_id = ").push_bind(*id);
            }
            Predicate::StartsOnOrAfter(date) => {
                builder.push("r.planned_start_date >= ").push_bind(*date);
            }
            Predicate::EndsOnOrBefore(date) => {
                builder.push("r.planned_end_date <= ").push_bind(*date);
            }
        }
    }
}

fn push_ordering(builder: &mut QueryBuilder<'static, Postgres>, plan: &QueryPlan) {
    builder.push(" ORDER BY ");
    for (i, key) in plan.ordering().iter().enumerate() {
        if i > 0 {
            builder.push(", ");
        }
        builder.push(match key {
            SortKey::StartDateDesc => "r.planned_start_date DESC",
            SortKey::IdDesc => "r.id DESC",
        });
    }
}

#[cfg(test)]
mod tests {
    use smp_core::types::{Date, DATE_FORMAT};

    use super::*;

    fn filtered_plan() -> QueryPlan {
        let from = Date::parse_from_str("2025-01-01", DATE_FORMAT).unwrap();
        QueryPlan::build(
            &InspectionQuery::new(2, 10)
                .with_term(Some("ромашка"))
                .with_smp(Some(3))
                .with_dates(Some(from), None),
        )
    }

    fn where_clause(sql: &str) -> &str {
        let start = sql.find(" WHERE ").expect("where clause");
        let end = sql.find(" ORDER BY ").unwrap_or(sql.len());
        &sql[start..end]
    }

    #[test]
    fn count_and_page_share_predicates() {
        let plan = filtered_plan();
        let count = count_query(&plan);
        let page = page_query(&plan, PageRequest::new(2, 10));
        assert_eq!(where_clause(count.sql()), where_clause(page.sql()));
    }

    #[test]
    fn count_has_no_ordering_or_limit() {
        let count = count_query(&filtered_plan());
        assert!(!count.sql().contains("ORDER BY"));
        assert!(!count.sql().contains("LIMIT"));
    }

    #[test]
    fn term_searches_both_names() {
        let sql = count_query(&filtered_plan()).into_sql();
        assert!(sql.contains("(s.name_smp ILIKE $1 OR a.name_authority ILIKE $2)"));
        assert!(sql.contains("r.smp_id = $3"));
        assert!(sql.contains("r.planned_start_date >= $4"));
    }

    #[test]
    fn page_orders_by_start_then_id() {
        let page = page_query(&QueryPlan::build(&InspectionQuery::default()), PageRequest::default());
        assert!(page
            .sql()
            .ends_with("ORDER BY r.planned_start_date DESC, r.id DESC LIMIT $1 OFFSET $2"));
        assert!(!page.sql().contains(" WHERE "));
    }
}
