//! Profiles an in-memory SQLite database end to end.

use fieldscout_core::field::{ColumnType, FieldGroup};
use fieldscout_core::pipeline::{analyze_table, AnalyzeOptions};
use fieldscout_core::recommend::ChartSuggestion;
use fieldscout_core::source::relational::ColumnProfiler;
use fieldscout_core::source::sqlite::SqliteProfiler;
use fieldscout_core::FieldScoutError;
use fieldscout_testutil::{sqlite_pool, ORDERS_FIXTURE};

#[tokio::test]
async fn test_profile_orders_table() {
    let pool = sqlite_pool(ORDERS_FIXTURE).await;
    let profiler = SqliteProfiler::new(pool);

    let profile = profiler.profile_table("orders").await.unwrap();
    assert_eq!(profile.row_count, 6);

    let names: Vec<&str> = profile.columns.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(
        names,
        vec!["id", "store_id", "region", "amount", "quantity", "placed_at"]
    );

    let col = |name: &str| profile.columns.iter().find(|c| c.name == name).unwrap();

    assert_eq!(col("id").distinct, 6);
    assert!(col("store_id").foreign_key);
    assert!(!col("region").foreign_key);
    assert_eq!(col("region").column_type, ColumnType::String);
    assert_eq!(col("placed_at").column_type, ColumnType::Date);

    // NUMERIC columns are refined from their data
    assert_eq!(col("amount").column_type, ColumnType::Number);
    assert_eq!(col("quantity").column_type, ColumnType::Integer);

    assert_eq!((col("amount").valid, col("amount").distinct), (5, 4));
    assert_eq!((col("region").valid, col("region").distinct), (5, 3));
    for column in &profile.columns {
        assert_eq!(column.count, 6);
        column.validate().unwrap();
    }
}

#[tokio::test]
async fn test_analyze_orders_with_foreign_key_dimensions() {
    let pool = sqlite_pool(ORDERS_FIXTURE).await;
    let profiler = SqliteProfiler::new(pool).concurrency(2);

    let analysis = analyze_table(&profiler, "orders", &AnalyzeOptions::default())
        .await
        .unwrap();

    let fields: Vec<(&str, FieldGroup)> = analysis
        .fields
        .iter()
        .map(|f| (f.name.as_str(), f.group))
        .collect();
    assert_eq!(
        fields,
        vec![
            ("store_id", FieldGroup::Dimension),
            ("placed_at", FieldGroup::Measure),
            ("amount", FieldGroup::Measure),
            ("region", FieldGroup::Measure),
            ("quantity", FieldGroup::Measure),
        ]
    );

    let kinds: Vec<(&str, &str)> = analysis
        .charts
        .iter()
        .map(|c| (c.kind(), c.field()))
        .collect();
    assert_eq!(
        kinds,
        vec![
            ("stat", "placed_at"),
            ("stat", "amount"),
            ("stat", "region"),
            ("stat", "quantity"),
            ("filter", "store_id"),
            ("line", "store_id"),
        ]
    );
    assert_eq!(
        analysis.charts.last(),
        Some(&ChartSuggestion::Line {
            field: "store_id".to_string(),
            value_fields: vec![
                "placed_at".to_string(),
                "amount".to_string(),
                "region".to_string(),
                "quantity".to_string(),
            ],
        })
    );
}

#[tokio::test]
async fn test_fully_unique_table_yields_nothing() {
    let pool = sqlite_pool(ORDERS_FIXTURE).await;
    let profiler = SqliteProfiler::new(pool);

    let analysis = analyze_table(&profiler, "stores", &AnalyzeOptions::default())
        .await
        .unwrap();
    assert!(analysis.fields.is_empty());
    assert!(analysis.charts.is_empty());
}

#[tokio::test]
async fn test_empty_table_columns_are_dropped() {
    let pool = sqlite_pool("CREATE TABLE empty_sales (region TEXT, amount REAL)").await;
    let profiler = SqliteProfiler::new(pool);

    let profile = profiler.profile_table("empty_sales").await.unwrap();
    assert_eq!(profile.row_count, 0);
    assert!(profile.columns.iter().all(|c| c.count == 0 && c.valid == 0));

    let analysis = analyze_table(&profiler, "empty_sales", &AnalyzeOptions::default())
        .await
        .unwrap();
    assert!(analysis.fields.is_empty());
}

#[tokio::test]
async fn test_unknown_table() {
    let pool = sqlite_pool(ORDERS_FIXTURE).await;
    let profiler = SqliteProfiler::new(pool);

    let err = profiler.profile_table("invoices").await.unwrap_err();
    assert!(matches!(
        err,
        FieldScoutError::TableNotFound { ref table, .. } if table == "invoices"
    ));
}

#[tokio::test]
async fn test_hostile_table_name_is_not_interpolated() {
    let pool = sqlite_pool(ORDERS_FIXTURE).await;
    let profiler = SqliteProfiler::new(pool.clone());

    let err = profiler
        .profile_table("orders; DROP TABLE stores")
        .await
        .unwrap_err();
    assert!(matches!(err, FieldScoutError::TableNotFound { .. }));

    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM stores")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 3);
}

#[tokio::test]
async fn test_quoted_identifiers() {
    let pool = sqlite_pool(
        r#"CREATE TABLE "odd table" ("weird ""col""" TEXT, "select" INTEGER);
           INSERT INTO "odd table" VALUES ('a', 1), ('a', 2), (NULL, 2)"#,
    )
    .await;
    let profiler = SqliteProfiler::new(pool);

    let profile = profiler.profile_table("odd table").await.unwrap();
    assert_eq!(profile.columns[0].name, "weird \"col\"");
    assert_eq!((profile.columns[0].valid, profile.columns[0].distinct), (2, 1));
    assert_eq!((profile.columns[1].valid, profile.columns[1].distinct), (3, 2));
}
