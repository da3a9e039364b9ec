use sqlx::PgPool;

/// Every `id` primary key is a UUID.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_all_ids_are_uuid(pool: PgPool) {
    let rows: Vec<(String, String)> = sqlx::query_as(
        "SELECT table_name, data_type
         FROM information_schema.columns
         WHERE column_name = 'id'
           AND table_schema = 'public'
           AND table_name != '_sqlx_migrations'
         ORDER BY table_name",
    )
    .fetch_all(&pool)
    .await
    .unwrap();

    assert!(!rows.is_empty());
    for (table, data_type) in &rows {
        assert_eq!(data_type, "uuid", "Table {table}.id should be uuid, got {data_type}");
    }
}

/// Every timestamp column is timestamptz.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_timestamps_have_time_zone(pool: PgPool) {
    let rows: Vec<(String, String, String)> = sqlx::query_as(
        "SELECT table_name, column_name, data_type
         FROM information_schema.columns
         WHERE table_schema = 'public'
           AND table_name != '_sqlx_migrations'
           AND (column_name LIKE '%\\_at' OR column_name = 'locked_until')
         ORDER BY table_name, column_name",
    )
    .fetch_all(&pool)
    .await
    .unwrap();

    for (table, column, data_type) in &rows {
        assert_eq!(
            data_type, "timestamp with time zone",
            "{table}.{column} should be timestamptz, got {data_type}"
        );
    }
}

/// Named unique constraints are what the API maps to 409 responses.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_unique_constraints_use_uq_prefix(pool: PgPool) {
    let names: Vec<(String,)> = sqlx::query_as(
        "SELECT indexname FROM pg_indexes
         WHERE schemaname = 'public' AND indexdef LIKE 'CREATE UNIQUE INDEX%'
           AND indexname NOT LIKE '%_pkey'
           AND tablename != '_sqlx_migrations'",
    )
    .fetch_all(&pool)
    .await
    .unwrap();

    for (name,) in &names {
        assert!(name.starts_with("uq_"), "Unique index {name} should start with uq_");
    }
}
