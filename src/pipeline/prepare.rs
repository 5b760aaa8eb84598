//! The data preparation pipeline: coercion, joins, derived columns,
//! cleaning.
//!
//! Step order matters and is fixed:
//!   1. date coercion (failures become missing, never errors)
//!   2. left-join sales → products on product_key
//!   3. left-join → customers on customer_key
//!   4. numeric coercion with a zero fallback (a malformed price or
//!      quantity means "no financial effect", not "unknown")
//!   5. unit_profit / total_profit
//!   6. order_month (month truncation)
//!   7. age + age_group against Jan 1 of the reference year
//!   8. cleaning: "n/a" sentinel check, then missing-value check, over the
//!      critical columns
//!
//! Left-join misses survive the join steps untouched and are only removed
//! by cleaning, because product_name / customer attributes are critical
//! columns. That is the referential-integrity fallback: a dangling key
//! yields an invalid row, not a defaulted one.

use std::collections::HashMap;

use tracing::debug;

use super::bucketing::{age_in_years, month_start, parse_date};
use super::types::{AgeGroup, EnrichedSale, RawCustomer, RawProduct, RawTables};

/// Ad-hoc missingness convention found in the raw data. Matched exactly
/// and case-sensitively; "N/A" is ordinary data.
const NA_SENTINEL: &str = "n/a";

/// Coerce a text cell to f64. Missing and malformed cells both collapse to
/// zero. Deliberate policy, see module docs.
fn coerce_numeric(cell: Option<&String>) -> f64 {
    cell.and_then(|s| s.trim().parse::<f64>().ok()).unwrap_or(0.0)
}

/// Build the cleaned, denormalized gold table from the three raw tables.
///
/// `reference_year` anchors the age computation (Jan 1 of that year);
/// callers pass the current UTC year, which makes age groups drift across
/// calendar years for the same birthdate, a warehouse behavior we keep.
pub fn build_gold_table(raw: &RawTables, reference_year: i32) -> Vec<EnrichedSale> {
    // Join indexes. A duplicate key keeps the last occurrence, consistent
    // with the views' unique-key contract.
    let products: HashMap<i64, &RawProduct> = raw
        .products
        .iter()
        .filter_map(|p| p.product_key.map(|k| (k, p)))
        .collect();
    let customers: HashMap<i64, &RawCustomer> = raw
        .customers
        .iter()
        .filter_map(|c| c.customer_key.map(|k| (k, c)))
        .collect();

    let mut rows: Vec<EnrichedSale> = raw
        .sales
        .iter()
        .map(|sale| {
            let product = sale.product_key.and_then(|k| products.get(&k).copied());
            let customer = sale.customer_key.and_then(|k| customers.get(&k).copied());

            let order_date = sale.order_date.as_deref().and_then(parse_date);
            let birthdate = customer
                .and_then(|c| c.birthdate.as_deref())
                .and_then(parse_date);

            let product_cost = coerce_numeric(product.and_then(|p| p.product_cost.as_ref()));
            let unit_price = coerce_numeric(sale.unit_price.as_ref());
            let quantity = coerce_numeric(sale.quantity.as_ref());
            let sales_amount = coerce_numeric(sale.sales_amount.as_ref());

            let unit_profit = unit_price - product_cost;
            let total_profit = unit_profit * quantity;

            let order_month = order_date.map(month_start);
            let age = birthdate.and_then(|b| age_in_years(b, reference_year));
            let age_group = age.and_then(AgeGroup::from_age);

            EnrichedSale {
                order_number: sale.order_number.clone(),
                customer_key: sale.customer_key,
                product_key: sale.product_key,
                order_date,
                quantity,
                unit_price,
                sales_amount,
                product_number: product.and_then(|p| p.product_number.clone()),
                product_name: product.and_then(|p| p.product_name.clone()),
                product_cost,
                category: product.and_then(|p| p.category.clone()),
                subcategory: product.and_then(|p| p.subcategory.clone()),
                product_line: product.and_then(|p| p.product_line.clone()),
                gender: customer.and_then(|c| c.gender.clone()),
                country: customer.and_then(|c| c.country.clone()),
                birthdate,
                unit_profit,
                total_profit,
                order_month,
                age,
                age_group,
            }
        })
        .collect();

    let joined = rows.len();
    rows.retain(|row| !hits_na_sentinel(row) && !missing_critical(row));
    debug!(
        joined,
        cleaned = rows.len(),
        dropped = joined - rows.len(),
        "gold table prepared"
    );
    rows
}

/// Text-valued critical columns, in their documented order.
fn critical_text_columns(row: &EnrichedSale) -> [&Option<String>; 5] {
    [
        &row.gender,
        &row.country,
        &row.category,
        &row.product_line,
        &row.product_name,
    ]
}

/// Sentinel pre-filter: any critical text column literally equal to "n/a"
/// (case-sensitive, exact). Checked before, and independently of, the
/// missing-value check.
pub(crate) fn hits_na_sentinel(row: &EnrichedSale) -> bool {
    critical_text_columns(row)
        .iter()
        .any(|col| matches!(col, Some(v) if v == NA_SENTINEL))
}

/// Missing-value check over the critical columns, age_group included.
pub(crate) fn missing_critical(row: &EnrichedSale) -> bool {
    critical_text_columns(row).iter().any(|col| col.is_none()) || row.age_group.is_none()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
