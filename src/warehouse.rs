//! Data source adapter for the gold-layer warehouse.
//!
//! Opens a read-only connection, drains the three fixed views, and releases
//! the connection before returning; the handle never outlives one load,
//! success or failure. Query failures propagate as
//! [`DashboardError::Connection`]; there are no retries.
//!
//! Cells are read leniently: NULL and blobs become missing, numbers are
//! carried as their text form, so all coercion policy lives in the
//! preparation pipeline rather than being split across layers.

use std::path::{Path, PathBuf};

use rusqlite::types::ValueRef;
use rusqlite::{Connection, OpenFlags, Row};
use tracing::info;

use crate::error::{DashboardError, Result};
use crate::pipeline::types::{RawCustomer, RawProduct, RawSale, RawTables};

/// Environment override for the warehouse location.
pub const WAREHOUSE_ENV: &str = "SALES_WAREHOUSE_DB";

const CUSTOMERS_SQL: &str =
    "SELECT customer_key, gender, country, birthdate FROM gold_dim_customers";
const PRODUCTS_SQL: &str = "SELECT product_key, product_number, product_name, product_cost, \
     category, subcategory, product_line FROM gold_dim_products";
const SALES_SQL: &str = "SELECT order_number, customer_key, product_key, order_date, \
     quantity, unit_price, sales_amount FROM gold_fact_sales";

/// Resolve the warehouse path: `SALES_WAREHOUSE_DB` wins, else a fixed
/// default under the platform data directory.
pub fn resolve_warehouse_path() -> PathBuf {
    if let Ok(path) = std::env::var(WAREHOUSE_ENV) {
        if !path.trim().is_empty() {
            return PathBuf::from(path);
        }
    }
    directories::ProjectDirs::from("", "", "salesdash")
        .map(|dirs| dirs.data_dir().join("warehouse.db"))
        .unwrap_or_else(|| PathBuf::from("warehouse.db"))
}

/// Read a cell as lenient text: NULL/blob → missing, numbers stringified.
fn text_cell(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<String>> {
    Ok(match row.get_ref(idx)? {
        ValueRef::Null | ValueRef::Blob(_) => None,
        ValueRef::Integer(i) => Some(i.to_string()),
        ValueRef::Real(f) => Some(f.to_string()),
        ValueRef::Text(t) => Some(String::from_utf8_lossy(t).into_owned()),
    })
}

/// Read a cell as a join key. Anything that does not carry an integer value
/// becomes missing and will never match a join.
fn key_cell(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<i64>> {
    Ok(match row.get_ref(idx)? {
        ValueRef::Integer(i) => Some(i),
        ValueRef::Real(f) => Some(f as i64),
        ValueRef::Text(t) => std::str::from_utf8(t)
            .ok()
            .and_then(|s| s.trim().parse::<i64>().ok()),
        ValueRef::Null | ValueRef::Blob(_) => None,
    })
}

fn query_all<T, F>(conn: &Connection, sql: &str, map: F) -> Result<Vec<T>>
where
    F: Fn(&Row<'_>) -> rusqlite::Result<T>,
{
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map([], map)?;
    rows.collect::<rusqlite::Result<Vec<T>>>()
        .map_err(DashboardError::from)
}

/// Execute the three fixed reads and return the raw tables.
///
/// The connection is scoped to this call: it is dropped on every exit path.
pub fn load_gold_tables(path: &Path) -> Result<RawTables> {
    let conn = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY)
        .map_err(|e| DashboardError::Connection(format!("{}: {e}", path.display())))?;

    let customers = query_all(&conn, CUSTOMERS_SQL, |row| {
        Ok(RawCustomer {
            customer_key: key_cell(row, 0)?,
            gender: text_cell(row, 1)?,
            country: text_cell(row, 2)?,
            birthdate: text_cell(row, 3)?,
        })
    })?;

    let products = query_all(&conn, PRODUCTS_SQL, |row| {
        Ok(RawProduct {
            product_key: key_cell(row, 0)?,
            product_number: text_cell(row, 1)?,
            product_name: text_cell(row, 2)?,
            product_cost: text_cell(row, 3)?,
            category: text_cell(row, 4)?,
            subcategory: text_cell(row, 5)?,
            product_line: text_cell(row, 6)?,
        })
    })?;

    let sales = query_all(&conn, SALES_SQL, |row| {
        Ok(RawSale {
            order_number: text_cell(row, 0)?,
            customer_key: key_cell(row, 1)?,
            product_key: key_cell(row, 2)?,
            order_date: text_cell(row, 3)?,
            quantity: text_cell(row, 4)?,
            unit_price: text_cell(row, 5)?,
            sales_amount: text_cell(row, 6)?,
        })
    })?;

    info!(
        customers = customers.len(),
        products = products.len(),
        sales = sales.len(),
        "gold layer loaded"
    );

    Ok(RawTables {
        customers,
        products,
        sales,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
