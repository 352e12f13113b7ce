//! Integration tests for SMP entity and control authority repositories.

use smp_core::pagination::LOOKUP_PAGE_SIZE;
use smp_db::repositories::{ControlAuthorityRepo, SmpEntityRepo};
use sqlx::PgPool;

#[sqlx::test(migrations = "./migrations")]
async fn bootstrap_applies_schema(pool: PgPool) {
    smp_db::health_check(&pool).await.unwrap();

    for table in ["smp_entities", "control_authorities", "register_of_inspections"] {
        let count: (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(&pool)
            .await
            .unwrap_or_else(|e| panic!("{table} query failed: {e}"));
        assert_eq!(count.0, 0, "{table} should start empty");
    }
}

#[sqlx::test(migrations = "./migrations")]
async fn lookup_pages_by_fixed_size(pool: PgPool) {
    for i in 0..(LOOKUP_PAGE_SIZE + 5) {
        SmpEntityRepo::create(&pool, &format!("Entity {i:03}")).await.unwrap();
    }
    SmpEntityRepo::create(&pool, "Ромашка ООО").await.unwrap();

    let first = SmpEntityRepo::lookup(&pool, Some("entity"), 1).await.unwrap();
    assert_eq!(first.items.len() as i64, LOOKUP_PAGE_SIZE);
    assert_eq!(first.total, LOOKUP_PAGE_SIZE + 5);
    assert!(first.has_more);
    assert_eq!(first.items[0].name_smp, "Entity 000");

    let second = SmpEntityRepo::lookup(&pool, Some("entity"), 2).await.unwrap();
    assert_eq!(second.items.len(), 5);
    assert!(!second.has_more);

    let all = SmpEntityRepo::lookup(&pool, None, 0).await.unwrap();
    assert_eq!(all.page, 1);
    assert_eq!(all.total, LOOKUP_PAGE_SIZE + 6);
}

#[sqlx::test(migrations = "./migrations")]
async fn lookup_matches_cyrillic_case_insensitively(pool: PgPool) {
    SmpEntityRepo::create(&pool, "Ромашка ООО").await.unwrap();
    SmpEntityRepo::create(&pool, "Лютик АО").await.unwrap();

    let page = SmpEntityRepo::lookup(&pool, Some("РОМАШ"), 1).await.unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].name_smp, "Ромашка ООО");
}

#[sqlx::test(migrations = "./migrations")]
async fn name_taken_excludes_own_id(pool: PgPool) {
    let entity = SmpEntityRepo::create(&pool, "Ромашка ООО").await.unwrap();

    assert!(SmpEntityRepo::name_taken(&pool, "Ромашка ООО", None).await.unwrap());
    assert!(!SmpEntityRepo::name_taken(&pool, "Ромашка ООО", Some(entity.id)).await.unwrap());
    assert!(!SmpEntityRepo::name_taken(&pool, "ромашка ооо", None).await.unwrap());
}

#[sqlx::test(migrations = "./migrations")]
async fn duplicate_names_violate_unique_constraint(pool: PgPool) {
    ControlAuthorityRepo::create(&pool, "ФНС России").await.unwrap();
    let err = ControlAuthorityRepo::create(&pool, "ФНС России").await.unwrap_err();

    let db_err = err.as_database_error().expect("database error");
    assert_eq!(db_err.code().as_deref(), Some("23505"));
    assert_eq!(db_err.constraint(), Some("uq_control_authorities_name_authority"));
}

#[sqlx::test(migrations = "./migrations")]
async fn authorities_list_by_name(pool: PgPool) {
    ControlAuthorityRepo::create(&pool, "Роспотребнадзор").await.unwrap();
    ControlAuthorityRepo::create(&pool, "МЧС России").await.unwrap();
    ControlAuthorityRepo::create(&pool, "ФНС России").await.unwrap();

    let names: Vec<String> = ControlAuthorityRepo::list(&pool)
        .await
        .unwrap()
        .into_iter()
        .map(|a| a.name_authority)
        .collect();
    assert_eq!(names, vec!["МЧС России", "Роспотребнадзор", "ФНС России"]);
}

#[sqlx::test(migrations = "./migrations")]
async fn rename_and_existence(pool: PgPool) {
    let entity = SmpEntityRepo::create(&pool, "Лютик АО").await.unwrap();
    assert!(SmpEntityRepo::exists(&pool, entity.id).await.unwrap());
    assert!(!SmpEntityRepo::exists(&pool, entity.id + 1000).await.unwrap());

    let renamed = SmpEntityRepo::update(&pool, entity.id, "Лютик ПАО")
        .await
        .unwrap()
        .expect("row exists");
    assert_eq!(renamed.name_smp, "Лютик ПАО");
    assert!(SmpEntityRepo::update(&pool, entity.id + 1000, "Кто-то")
        .await
        .unwrap()
        .is_none());
}
