//! Aggregation layer: KPIs, group-bys, top-N rankings, fixed-order
//! breakdowns.
//!
//! Every function reduces an iterator of enriched rows, so the same code
//! serves the filtered subset and (for the per-line time series only) the
//! pre-filter cleaned table. Group keys that are missing (reachable only
//! for `order_month`, since cleaning guarantees the categoricals) are
//! skipped, matching group-by-drop-null semantics upstream.

use std::collections::{BTreeMap, HashSet};

use chrono::NaiveDate;
use itertools::Itertools;
use serde::Serialize;

use crate::pipeline::types::{AgeGroup, EnrichedSale};

const TOP_N: usize = 10;

// ---------------------------------------------------------------------------
// Output rows (one struct per view)
// ---------------------------------------------------------------------------

/// The four scalar KPIs shown at the top of the dashboard.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Kpis {
    pub total_sales: f64,
    pub total_profit: f64,
    pub unique_customers: usize,
    pub unique_orders: usize,
}

/// Sales and profit totals for one calendar month.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyPoint {
    pub month: NaiveDate,
    pub total_sales: f64,
    pub total_profit: f64,
}

/// One (month, product line) point of the per-line time series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineSeriesPoint {
    pub month: NaiveDate,
    pub product_line: String,
    pub sales_amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductProfit {
    pub product_number: String,
    pub product_name: String,
    pub total_profit: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemQuantity {
    pub product_name: String,
    pub category: String,
    pub quantity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountryProfit {
    pub country: String,
    pub total_profit: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategorySales {
    pub category: String,
    pub subcategory: String,
    pub sales_amount: f64,
}

/// Row count per age band, in the fixed band order (never by count).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgeGroupCount {
    pub age_group: AgeGroup,
    pub count: u64,
}

// ---------------------------------------------------------------------------
// Reductions
// ---------------------------------------------------------------------------

/// KPIs: summed amounts plus unique-count reductions.
pub fn kpis<'a>(rows: impl IntoIterator<Item = &'a EnrichedSale>) -> Kpis {
    let mut out = Kpis::default();
    let mut customers: HashSet<i64> = HashSet::new();
    let mut orders: HashSet<&str> = HashSet::new();
    for row in rows {
        out.total_sales += row.sales_amount;
        out.total_profit += row.total_profit;
        if let Some(key) = row.customer_key {
            customers.insert(key);
        }
        if let Some(order) = row.order_number.as_deref() {
            orders.insert(order);
        }
    }
    out.unique_customers = customers.len();
    out.unique_orders = orders.len();
    out
}

/// Sales and profit by order month, ascending.
pub fn monthly_totals<'a>(rows: impl IntoIterator<Item = &'a EnrichedSale>) -> Vec<MonthlyPoint> {
    let mut by_month: BTreeMap<NaiveDate, (f64, f64)> = BTreeMap::new();
    for row in rows {
        let Some(month) = row.order_month else {
            continue;
        };
        let entry = by_month.entry(month).or_default();
        entry.0 += row.sales_amount;
        entry.1 += row.total_profit;
    }
    by_month
        .into_iter()
        .map(|(month, (total_sales, total_profit))| MonthlyPoint {
            month,
            total_sales,
            total_profit,
        })
        .collect()
}

/// Sales by (order month, product line), ascending by month then line.
///
/// Callers feed this the pre-filter cleaned table, not the filtered
/// subset: the one view that ignores user filters (kept as-is, see
/// DESIGN.md).
pub fn product_line_series<'a>(
    rows: impl IntoIterator<Item = &'a EnrichedSale>,
) -> Vec<LineSeriesPoint> {
    let mut by_key: BTreeMap<(NaiveDate, String), f64> = BTreeMap::new();
    for row in rows {
        let (Some(month), Some(line)) = (row.order_month, row.product_line.as_deref()) else {
            continue;
        };
        *by_key.entry((month, line.to_string())).or_default() += row.sales_amount;
    }
    by_key
        .into_iter()
        .map(|((month, product_line), sales_amount)| LineSeriesPoint {
            month,
            product_line,
            sales_amount,
        })
        .collect()
}

/// Top 10 products by summed profit, descending.
pub fn top_products_by_profit<'a>(
    rows: impl IntoIterator<Item = &'a EnrichedSale>,
) -> Vec<ProductProfit> {
    let mut by_product: BTreeMap<(String, String), f64> = BTreeMap::new();
    for row in rows {
        let (Some(number), Some(name)) = (row.product_number.as_deref(), row.product_name.as_deref())
        else {
            continue;
        };
        *by_product
            .entry((number.to_string(), name.to_string()))
            .or_default() += row.total_profit;
    }
    by_product
        .into_iter()
        .map(|((product_number, product_name), total_profit)| ProductProfit {
            product_number,
            product_name,
            total_profit,
        })
        .sorted_by(|a, b| b.total_profit.total_cmp(&a.total_profit))
        .take(TOP_N)
        .collect()
}

/// Top 10 items by summed quantity, descending.
pub fn top_items_by_quantity<'a>(
    rows: impl IntoIterator<Item = &'a EnrichedSale>,
) -> Vec<ItemQuantity> {
    let mut by_item: BTreeMap<(String, String), f64> = BTreeMap::new();
    for row in rows {
        let (Some(name), Some(category)) = (row.product_name.as_deref(), row.category.as_deref())
        else {
            continue;
        };
        *by_item
            .entry((name.to_string(), category.to_string()))
            .or_default() += row.quantity;
    }
    by_item
        .into_iter()
        .map(|((product_name, category), quantity)| ItemQuantity {
            product_name,
            category,
            quantity,
        })
        .sorted_by(|a, b| b.quantity.total_cmp(&a.quantity))
        .take(TOP_N)
        .collect()
}

/// Total profit per country, descending by profit (chart order).
pub fn profit_by_country<'a>(
    rows: impl IntoIterator<Item = &'a EnrichedSale>,
) -> Vec<CountryProfit> {
    let mut by_country: BTreeMap<String, f64> = BTreeMap::new();
    for row in rows {
        let Some(country) = row.country.as_deref() else {
            continue;
        };
        *by_country.entry(country.to_string()).or_default() += row.total_profit;
    }
    by_country
        .into_iter()
        .map(|(country, total_profit)| CountryProfit {
            country,
            total_profit,
        })
        .sorted_by(|a, b| b.total_profit.total_cmp(&a.total_profit))
        .collect()
}

/// Sales by (category, subcategory) for the hierarchical view, sorted
/// lexically by the pair.
pub fn sales_by_category<'a>(
    rows: impl IntoIterator<Item = &'a EnrichedSale>,
) -> Vec<CategorySales> {
    let mut by_pair: BTreeMap<(String, String), f64> = BTreeMap::new();
    for row in rows {
        let (Some(category), Some(subcategory)) =
            (row.category.as_deref(), row.subcategory.as_deref())
        else {
            continue;
        };
        *by_pair
            .entry((category.to_string(), subcategory.to_string()))
            .or_default() += row.sales_amount;
    }
    by_pair
        .into_iter()
        .map(|((category, subcategory), sales_amount)| CategorySales {
            category,
            subcategory,
            sales_amount,
        })
        .collect()
}

/// Row counts per age band in the fixed band order, zero counts included.
pub fn age_group_counts<'a>(
    rows: impl IntoIterator<Item = &'a EnrichedSale>,
) -> Vec<AgeGroupCount> {
    let mut counts: BTreeMap<AgeGroup, u64> = BTreeMap::new();
    for row in rows {
        if let Some(group) = row.age_group {
            *counts.entry(group).or_default() += 1;
        }
    }
    AgeGroup::ALL
        .iter()
        .map(|&age_group| AgeGroupCount {
            age_group,
            count: counts.get(&age_group).copied().unwrap_or(0),
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
