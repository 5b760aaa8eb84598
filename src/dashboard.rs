//! Per-interaction orchestration: memoized table → filter options →
//! validation → filter → aggregation → rendering surface.
//!
//! One call is one user interaction. Any error stops processing for that
//! interaction (no partial dashboard) and surfaces to the caller; nothing
//! here retries.

use std::path::PathBuf;

use chrono::{Datelike, NaiveDate, Utc};
use tracing::{debug, info};

use crate::aggregate;
use crate::error::{DashboardError, Result};
use crate::filter::{self, DateRange, DimensionFilters, FilterOptions};
use crate::pipeline::{build_gold_table, SESSION_CACHE};
use crate::render::{ChartKind, ChartSpec, Surface};
use crate::warehouse;

/// Rows shown in the raw-data preview under the charts.
const PREVIEW_ROWS: usize = 100;

/// One dashboard interaction's worth of user input.
#[derive(Debug, Clone)]
pub struct DashboardRequest {
    pub db_path: PathBuf,
    pub dims: DimensionFilters,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    /// Cache-bust: re-read the warehouse before this interaction.
    pub refresh: bool,
}

/// Chart specs in dashboard order.
const MONTHLY_PROFIT: ChartSpec = ChartSpec {
    id: "monthly_totals",
    title: "Profit by Month",
    kind: ChartKind::Line,
    x: "month",
    y: "total_profit",
    color: None,
};
const TOP_PRODUCTS: ChartSpec = ChartSpec {
    id: "top_products_by_profit",
    title: "Most Profitable Products",
    kind: ChartKind::HorizontalBar,
    x: "total_profit",
    y: "product_name",
    color: Some("total_profit"),
};
const COUNTRY_PROFIT: ChartSpec = ChartSpec {
    id: "profit_by_country",
    title: "Total Profit by Country",
    kind: ChartKind::Bar,
    x: "country",
    y: "total_profit",
    color: Some("total_profit"),
};
const CATEGORY_SALES: ChartSpec = ChartSpec {
    id: "sales_by_category",
    title: "Sales by Category and Subcategory",
    kind: ChartKind::Treemap,
    x: "category",
    y: "sales_amount",
    color: Some("sales_amount"),
};
const AGE_GROUPS: ChartSpec = ChartSpec {
    id: "age_group_counts",
    title: "Customers by Age Group",
    kind: ChartKind::Bar,
    x: "age_group",
    y: "count",
    color: None,
};
const TOP_ITEMS: ChartSpec = ChartSpec {
    id: "top_items_by_quantity",
    title: "Top Products by Quantity Sold",
    kind: ChartKind::HorizontalBar,
    x: "quantity",
    y: "product_name",
    color: Some("quantity"),
};
const LINE_SERIES: ChartSpec = ChartSpec {
    id: "product_line_series",
    title: "Monthly Sales by Product Line",
    kind: ChartKind::Line,
    x: "month",
    y: "sales_amount",
    color: Some("product_line"),
};

/// Enumerate the selector options (distinct values + date bounds) for the
/// current warehouse contents.
pub fn filter_options(req: &DashboardRequest) -> Result<FilterOptions> {
    if req.refresh {
        SESSION_CACHE.invalidate();
    }
    let table = SESSION_CACHE.get_or_build(|| {
        let raw = warehouse::load_gold_tables(&req.db_path)?;
        Ok(build_gold_table(&raw, Utc::now().year()))
    })?;
    Ok(FilterOptions::from_table(&table))
}

/// Run one full interaction against `surface`.
pub fn run_interaction(req: &DashboardRequest, surface: &mut dyn Surface) -> anyhow::Result<()> {
    if req.refresh {
        SESSION_CACHE.invalidate();
    }
    let table = SESSION_CACHE.get_or_build(|| {
        let raw = warehouse::load_gold_tables(&req.db_path)?;
        Ok(build_gold_table(&raw, Utc::now().year()))
    })?;

    let options = FilterOptions::from_table(&table);
    let range = DateRange::resolve(req.start_date, req.end_date, &options)?;

    let filtered = filter::apply(&table, &req.dims, &range);
    if filtered.is_empty() {
        return Err(DashboardError::EmptyResult.into());
    }
    debug!(
        total = table.len(),
        filtered = filtered.len(),
        "filters applied"
    );

    surface.kpis(&aggregate::kpis(filtered.iter().copied()))?;
    surface.chart(
        &MONTHLY_PROFIT,
        serde_json::to_value(aggregate::monthly_totals(filtered.iter().copied()))?,
    )?;
    surface.chart(
        &TOP_PRODUCTS,
        serde_json::to_value(aggregate::top_products_by_profit(filtered.iter().copied()))?,
    )?;
    surface.chart(
        &COUNTRY_PROFIT,
        serde_json::to_value(aggregate::profit_by_country(filtered.iter().copied()))?,
    )?;
    surface.chart(
        &CATEGORY_SALES,
        serde_json::to_value(aggregate::sales_by_category(filtered.iter().copied()))?,
    )?;
    surface.chart(
        &AGE_GROUPS,
        serde_json::to_value(aggregate::age_group_counts(filtered.iter().copied()))?,
    )?;
    surface.chart(
        &TOP_ITEMS,
        serde_json::to_value(aggregate::top_items_by_quantity(filtered.iter().copied()))?,
    )?;
    // Per-line series comes from the pre-filter cleaned table, the one
    // view that ignores user filters (kept as-is, see DESIGN.md).
    surface.chart(
        &LINE_SERIES,
        serde_json::to_value(aggregate::product_line_series(table.iter()))?,
    )?;

    let preview: Vec<_> = filtered.iter().copied().take(PREVIEW_ROWS).collect();
    surface.preview(&preview)?;
    surface.finish()?;

    info!("dashboard rendered");
    Ok(())
}
