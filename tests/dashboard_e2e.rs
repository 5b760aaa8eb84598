//! End-to-end tests against a seeded temporary warehouse.
//!
//! These exercise the whole chain: adapter → preparation → filter →
//! aggregation, plus the CLI binary in both human and robot modes.

use std::path::PathBuf;

use chrono::NaiveDate;
use rusqlite::Connection;
use tempfile::TempDir;

use sales_dashboard::aggregate;
use sales_dashboard::filter::{self, DateRange, DimensionFilters, FilterOptions, Selection};
use sales_dashboard::pipeline::{build_gold_table, EnrichedSale};
use sales_dashboard::warehouse::load_gold_tables;

const REF_YEAR: i32 = 2025;

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

/// Seed a small but representative warehouse:
/// - two customers (one Brazilian woman born 1990, one US man born 1960)
/// - two products (a road bike and a helmet, the helmet's line is "n/a")
/// - five sales, including a dangling product key and a malformed quantity
fn seed_warehouse(dir: &TempDir) -> PathBuf {
    let path = dir.path().join("warehouse.db");
    let conn = Connection::open(&path).unwrap();
    conn.execute_batch(
        "CREATE TABLE gold_dim_customers (
             customer_key INTEGER, gender TEXT, country TEXT, birthdate TEXT);
         CREATE TABLE gold_dim_products (
             product_key INTEGER, product_number TEXT, product_name TEXT,
             product_cost TEXT, category TEXT, subcategory TEXT, product_line TEXT);
         CREATE TABLE gold_fact_sales (
             order_number TEXT, customer_key INTEGER, product_key INTEGER,
             order_date TEXT, quantity TEXT, unit_price TEXT, sales_amount TEXT);

         INSERT INTO gold_dim_customers VALUES
             (1, 'F', 'Brazil', '1990-05-20'),
             (2, 'M', 'United States', '1960-02-11');
         INSERT INTO gold_dim_products VALUES
             (10, 'BK-R01', 'Road Bike', '250', 'Bikes', 'Road Bikes', 'Road'),
             (20, 'HL-U01', 'Sport Helmet', '12', 'Accessories', 'Helmets', 'n/a');

         -- SO1: clean row, Brazil, road bike
         INSERT INTO gold_fact_sales VALUES
             ('SO1', 1, 10, '2024-01-15', '2', '400', '800');
         -- SO2: clean row, US, road bike, later month
         INSERT INTO gold_fact_sales VALUES
             ('SO2', 2, 10, '2024-03-02', '1', '400', '400');
         -- SO3: malformed quantity, must coerce to 0, not drop
         INSERT INTO gold_fact_sales VALUES
             ('SO3', 1, 10, '2024-03-20', 'abc', '400', '0');
         -- SO4: dangling product key, dropped by cleaning
         INSERT INTO gold_fact_sales VALUES
             ('SO4', 1, 999, '2024-02-01', '1', '50', '50');
         -- SO5: helmet, product_line sentinel 'n/a', dropped by cleaning
         INSERT INTO gold_fact_sales VALUES
             ('SO5', 2, 20, '2024-02-10', '3', '25', '75');",
    )
    .unwrap();
    path
}

fn cleaned_table(dir: &TempDir) -> Vec<EnrichedSale> {
    let raw = load_gold_tables(&seed_warehouse(dir)).unwrap();
    build_gold_table(&raw, REF_YEAR)
}

#[test]
fn pipeline_cleans_to_expected_rows() {
    let dir = tempfile::tempdir().unwrap();
    let table = cleaned_table(&dir);

    // SO4 (dangling key) and SO5 (n/a sentinel) are gone; SO3 survives.
    let orders: Vec<&str> = table
        .iter()
        .filter_map(|r| r.order_number.as_deref())
        .collect();
    assert_eq!(orders, ["SO1", "SO2", "SO3"]);

    let so3 = table
        .iter()
        .find(|r| r.order_number.as_deref() == Some("SO3"))
        .unwrap();
    assert_eq!(so3.quantity, 0.0);
    assert_eq!(so3.total_profit, 0.0);
}

#[test]
fn enriched_rows_satisfy_profit_identity() {
    let dir = tempfile::tempdir().unwrap();
    for row in cleaned_table(&dir) {
        assert_eq!(
            row.total_profit,
            (row.unit_price - row.product_cost) * row.quantity
        );
        assert!(row.gender.is_some());
        assert!(row.country.is_some());
        assert!(row.product_name.is_some());
        assert_ne!(row.product_line.as_deref(), Some("n/a"));
    }
}

#[test]
fn default_filters_are_identity_over_cleaned_table() {
    let dir = tempfile::tempdir().unwrap();
    let table = cleaned_table(&dir);
    let options = FilterOptions::from_table(&table);
    let range = DateRange::resolve(None, None, &options).unwrap();
    let got = filter::apply(&table, &DimensionFilters::default(), &range);
    assert_eq!(got.len(), table.len());
}

#[test]
fn country_filter_narrows_kpis() {
    let dir = tempfile::tempdir().unwrap();
    let table = cleaned_table(&dir);
    let options = FilterOptions::from_table(&table);
    let range = DateRange::resolve(None, None, &options).unwrap();
    let dims = DimensionFilters {
        country: Selection::Value("Brazil".into()),
        ..Default::default()
    };
    let filtered = filter::apply(&table, &dims, &range);
    // SO1 and SO3 are Brazilian.
    assert_eq!(filtered.len(), 2);

    let k = aggregate::kpis(filtered.iter().copied());
    assert_eq!(k.total_sales, 800.0);
    assert_eq!(k.unique_customers, 1);
    assert_eq!(k.unique_orders, 2);
}

#[test]
fn date_range_is_inclusive_of_both_ends() {
    let dir = tempfile::tempdir().unwrap();
    let table = cleaned_table(&dir);
    let range = DateRange::new(d(2024, 1, 15), d(2024, 3, 2)).unwrap();
    let got = filter::apply(&table, &DimensionFilters::default(), &range);
    let orders: Vec<&str> = got.iter().filter_map(|r| r.order_number.as_deref()).collect();
    assert_eq!(orders, ["SO1", "SO2"]);
}

#[test]
fn line_series_ignores_filters() {
    // The per-line time series is computed from the pre-filter table; a
    // country filter that empties the US rows must not change it.
    let dir = tempfile::tempdir().unwrap();
    let table = cleaned_table(&dir);

    let unfiltered = aggregate::product_line_series(table.iter());

    let options = FilterOptions::from_table(&table);
    let range = DateRange::resolve(None, None, &options).unwrap();
    let dims = DimensionFilters {
        country: Selection::Value("Brazil".into()),
        ..Default::default()
    };
    let filtered = filter::apply(&table, &dims, &range);
    assert!(filtered.len() < table.len());

    // What the dashboard renders for this view is the unfiltered reduction.
    let rendered = aggregate::product_line_series(table.iter());
    assert_eq!(rendered, unfiltered);
    // Both months of 'Road' are present even though March's SO2 is US-only.
    assert_eq!(rendered.len(), 2);
    assert_eq!(rendered[0].month, d(2024, 1, 1));
    assert_eq!(rendered[1].month, d(2024, 3, 1));
}

#[test]
fn age_groups_reflect_reference_year() {
    let dir = tempfile::tempdir().unwrap();
    let table = cleaned_table(&dir);
    // Born 1990 → ~34.6 against 2025-01-01 → band "26-35";
    // born 1960 → ~64.9 → band "51-65".
    let brazil = table
        .iter()
        .find(|r| r.country.as_deref() == Some("Brazil"))
        .unwrap();
    assert_eq!(brazil.age_group.map(|g| g.label()), Some("26-35"));
    let us = table
        .iter()
        .find(|r| r.country.as_deref() == Some("United States"))
        .unwrap();
    assert_eq!(us.age_group.map(|g| g.label()), Some("51-65"));
}

// ---------------------------------------------------------------------------
// CLI end-to-end
// ---------------------------------------------------------------------------

mod cli {
    use super::*;
    use assert_cmd::Command;
    use predicates::prelude::*;

    fn cmd(db: &std::path::Path) -> Command {
        let mut c = Command::cargo_bin("salesdash").unwrap();
        c.env("SALES_WAREHOUSE_DB", db);
        c
    }

    #[test]
    fn json_output_contains_all_views() {
        let dir = tempfile::tempdir().unwrap();
        let db = seed_warehouse(&dir);
        let out = cmd(&db).arg("--json").output().unwrap();
        assert!(out.status.success());
        let doc: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
        for view in [
            "kpis",
            "monthly_totals",
            "top_products_by_profit",
            "profit_by_country",
            "sales_by_category",
            "age_group_counts",
            "top_items_by_quantity",
            "product_line_series",
            "preview",
        ] {
            assert!(doc.get(view).is_some(), "missing view {view}");
        }
        assert_eq!(doc["kpis"]["unique_orders"], 3);
    }

    #[test]
    fn reversed_date_range_halts_with_validation_error() {
        let dir = tempfile::tempdir().unwrap();
        let db = seed_warehouse(&dir);
        cmd(&db)
            .args(["--start-date", "2024-03-01", "--end-date", "2024-01-01"])
            .assert()
            .code(3)
            .stderr(predicate::str::contains("invalid date range"));
    }

    #[test]
    fn empty_result_halts_with_warning_code() {
        let dir = tempfile::tempdir().unwrap();
        let db = seed_warehouse(&dir);
        cmd(&db)
            .args(["--country", "Atlantis"])
            .assert()
            .code(4)
            .stderr(predicate::str::contains("no rows match"));
    }

    #[test]
    fn missing_warehouse_is_a_connection_failure() {
        let dir = tempfile::tempdir().unwrap();
        cmd(&dir.path().join("absent.db"))
            .assert()
            .code(2)
            .stderr(predicate::str::contains("could not load warehouse data"));
    }

    #[test]
    fn robot_error_payload_is_json() {
        let dir = tempfile::tempdir().unwrap();
        let db = seed_warehouse(&dir);
        let out = cmd(&db)
            .args(["--json", "--country", "Atlantis"])
            .output()
            .unwrap();
        assert_eq!(out.status.code(), Some(4));
        let doc: serde_json::Value = serde_json::from_slice(&out.stderr).unwrap();
        assert_eq!(doc["error"]["kind"], "empty_result");
        assert_eq!(doc["error"]["retryable"], true);
    }

    #[test]
    fn list_filters_enumerates_sorted_values() {
        let dir = tempfile::tempdir().unwrap();
        let db = seed_warehouse(&dir);
        let out = cmd(&db).args(["--list-filters", "--json"]).output().unwrap();
        assert!(out.status.success());
        let doc: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
        assert_eq!(doc["countries"], serde_json::json!(["Brazil", "United States"]));
        assert_eq!(doc["min_order_date"], "2024-01-15");
        assert_eq!(doc["max_order_date"], "2024-03-20");
    }
}
