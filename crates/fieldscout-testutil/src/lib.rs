use fieldscout_core::field::*;
use sqlx::sqlite::SqlitePool;

/// Column stats shaped like a vehicle rental export.
///
/// `rental_id` is a fully unique identifier and is expected to be filtered.
pub fn vehicles_stats() -> Vec<RawColumnStat> {
    vec![
        RawColumnStat::new("rental_id", ColumnType::Integer).with_counts(1200, 1200, 1200),
        RawColumnStat::new("pick_up_date", ColumnType::Date).with_counts(1200, 1200, 92),
        RawColumnStat::new("store", ColumnType::String).with_counts(1200, 1200, 14),
        RawColumnStat::new("vehicle_class", ColumnType::String).with_counts(1200, 1187, 9),
        RawColumnStat::new("price", ColumnType::Number).with_counts(1200, 1200, 640),
        RawColumnStat::new("days", ColumnType::Integer).with_counts(1200, 1200, 21),
        RawColumnStat::new("discount", ColumnType::Number).with_counts(1200, 310, 12),
    ]
}

/// Dimension names for [`vehicles_stats`].
pub fn vehicles_dimensions() -> Vec<String> {
    ["pick_up_date", "store", "vehicle_class"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

/// Column stats shaped like a daily COVID-19 case report by region.
pub fn covid_stats() -> Vec<RawColumnStat> {
    vec![
        RawColumnStat::new("ID", ColumnType::Integer).with_counts(5000, 5000, 5000),
        RawColumnStat::new("Updated", ColumnType::Date).with_counts(5000, 5000, 120),
        RawColumnStat::new("Confirmed", ColumnType::Integer).with_counts(5000, 4980, 3100),
        RawColumnStat::new("ConfirmedChange", ColumnType::Integer).with_counts(5000, 4700, 900),
        RawColumnStat::new("Deaths", ColumnType::Integer).with_counts(5000, 4200, 700),
        RawColumnStat::new("Latitude", ColumnType::Number).with_counts(5000, 4990, 410),
        RawColumnStat::new("Longitude", ColumnType::Number).with_counts(5000, 4990, 410),
        RawColumnStat::new("ISO2", ColumnType::String).with_counts(5000, 4990, 190),
        RawColumnStat::new("Country_Region", ColumnType::String).with_counts(5000, 5000, 210),
        RawColumnStat::new("AdminRegion1", ColumnType::String).with_counts(5000, 3800, 320),
        RawColumnStat::new("AdminRegion2", ColumnType::String).with_counts(5000, 1900, 1400),
    ]
}

/// Dimension names for [`covid_stats`].
pub fn covid_dimensions() -> Vec<String> {
    ["Updated", "Country_Region", "AdminRegion1", "AdminRegion2"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

/// CSV text for a small vehicle rental file.
pub const VEHICLES_CSV: &str = "\
rental_id,pick_up_date,store,vehicle_class,price,days
1,2020-01-03,North,compact,120.50,3
2,2020-01-03,North,suv,310.00,5
3,2020-01-04,South,compact,80.25,2
4,2020-01-05,South,,95.75,2
5,2020-01-05,East,van,410.00,7
6,2020-01-06,North,compact,120.50,3
";

/// Create an in-memory SQLite database and run each `;`-separated statement.
pub async fn sqlite_pool(fixture_sql: &str) -> SqlitePool {
    let pool = sqlx::sqlite::SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("open in-memory sqlite");

    sqlx::query("PRAGMA foreign_keys = ON")
        .execute(&pool)
        .await
        .expect("enable foreign keys");

    for statement in fixture_sql.split(';') {
        let statement = statement.trim();
        if statement.is_empty() {
            continue;
        }
        sqlx::query(statement)
            .execute(&pool)
            .await
            .unwrap_or_else(|e| panic!("fixture statement failed: {}\n{}", e, statement));
    }

    pool
}

/// A store/orders schema: `orders.store_id` is a foreign key, `orders.amount`
/// is NUMERIC with fractional values and `orders.quantity` is NUMERIC with
/// whole values only.
pub const ORDERS_FIXTURE: &str = r#"
CREATE TABLE stores (
    id INTEGER PRIMARY KEY,
    name VARCHAR(40) NOT NULL
);
CREATE TABLE orders (
    id INTEGER PRIMARY KEY,
    store_id INTEGER REFERENCES stores(id),
    region VARCHAR(20),
    amount NUMERIC,
    quantity NUMERIC,
    placed_at TIMESTAMP
);
INSERT INTO stores (id, name) VALUES (1, 'North'), (2, 'South'), (3, 'East');
INSERT INTO orders (id, store_id, region, amount, quantity, placed_at) VALUES
    (1, 1, 'north', 10.5, 1, '2020-01-01 10:00:00'),
    (2, 1, 'north', 20, 2, '2020-01-01 11:00:00'),
    (3, 2, 'south', 7.25, 2, '2020-01-02 09:30:00'),
    (4, 2, NULL, 7.25, 4, '2020-01-02 12:00:00'),
    (5, 3, 'east', NULL, 1, NULL),
    (6, NULL, 'east', 3, NULL, '2020-01-03 08:15:00')
"#;
