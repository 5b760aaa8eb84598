//! Command-line interface: one invocation is one dashboard interaction.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::Parser;

use crate::dashboard::DashboardRequest;
use crate::filter::{DimensionFilters, Selection};
use crate::warehouse;

/// Read-only analytical dashboard over the gold-layer sales warehouse.
#[derive(Debug, Parser)]
#[command(name = "salesdash", version, about, long_about = None)]
pub struct Cli {
    /// Warehouse database path (defaults to the platform data dir).
    #[arg(long, env = warehouse::WAREHOUSE_ENV, value_name = "PATH")]
    pub db: Option<PathBuf>,

    /// Customer gender filter ("all" for no filtering).
    #[arg(long, value_name = "VALUE")]
    pub gender: Option<String>,

    /// Customer country filter.
    #[arg(long, value_name = "VALUE")]
    pub country: Option<String>,

    /// Product category filter.
    #[arg(long, value_name = "VALUE")]
    pub category: Option<String>,

    /// Product line filter.
    #[arg(long = "product-line", value_name = "VALUE")]
    pub product_line: Option<String>,

    /// Start of the order-date range (YYYY-MM-DD); defaults to the earliest
    /// observed order date.
    #[arg(long = "start-date", value_name = "DATE")]
    pub start_date: Option<NaiveDate>,

    /// End of the order-date range (YYYY-MM-DD); defaults to the latest
    /// observed order date.
    #[arg(long = "end-date", value_name = "DATE")]
    pub end_date: Option<NaiveDate>,

    /// Emit a single JSON document instead of human output.
    #[arg(long)]
    pub json: bool,

    /// Bust the session cache and re-read the warehouse.
    #[arg(long)]
    pub refresh: bool,

    /// Print the available filter values and date bounds, then exit.
    #[arg(long = "list-filters")]
    pub list_filters: bool,
}

impl Cli {
    pub fn request(&self) -> DashboardRequest {
        DashboardRequest {
            db_path: self
                .db
                .clone()
                .unwrap_or_else(warehouse::resolve_warehouse_path),
            dims: DimensionFilters {
                gender: Selection::parse(self.gender.as_deref()),
                country: Selection::parse(self.country.as_deref()),
                category: Selection::parse(self.category.as_deref()),
                product_line: Selection::parse(self.product_line.as_deref()),
            },
            start_date: self.start_date,
            end_date: self.end_date,
            refresh: self.refresh,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_filters_and_dates() {
        let cli = Cli::parse_from([
            "salesdash",
            "--country",
            "Brazil",
            "--gender",
            "all",
            "--start-date",
            "2024-01-01",
            "--end-date",
            "2024-06-30",
        ]);
        let req = cli.request();
        assert_eq!(req.dims.country, Selection::Value("Brazil".into()));
        assert_eq!(req.dims.gender, Selection::All);
        assert_eq!(
            req.start_date,
            NaiveDate::from_ymd_opt(2024, 1, 1)
        );
        assert_eq!(req.end_date, NaiveDate::from_ymd_opt(2024, 6, 30));
    }

    #[test]
    fn defaults_are_wildcards() {
        let cli = Cli::parse_from(["salesdash"]);
        let req = cli.request();
        assert_eq!(req.dims.gender, Selection::All);
        assert_eq!(req.dims.product_line, Selection::All);
        assert!(!req.refresh);
    }
}
