//! Filter engine: categorical selections plus an inclusive date range over
//! the cleaned gold table.
//!
//! Selections are exact string equality against values that actually occur
//! in the table; the wildcard is [`Selection::All`]. A start date after the
//! end date is a user input error and refuses to compute; it is never an
//! empty result.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::Serialize;

use crate::error::{DashboardError, Result};
use crate::pipeline::types::EnrichedSale;

// ---------------------------------------------------------------------------
// Selections
// ---------------------------------------------------------------------------

/// One categorical filter: wildcard or an exact value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Selection {
    #[default]
    All,
    Value(String),
}

impl Selection {
    /// Parse a CLI/UI value. Absent or the "all" wildcard sentinel means no
    /// filtering on this dimension.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            None => Self::All,
            Some(s) if s.eq_ignore_ascii_case("all") => Self::All,
            Some(s) => Self::Value(s.to_string()),
        }
    }

    fn matches(&self, cell: Option<&str>) -> bool {
        match self {
            Self::All => true,
            Self::Value(v) => cell == Some(v.as_str()),
        }
    }
}

/// The four categorical dimension filters.
#[derive(Debug, Clone, Default)]
pub struct DimensionFilters {
    pub gender: Selection,
    pub country: Selection,
    pub category: Selection,
    pub product_line: Selection,
}

// ---------------------------------------------------------------------------
// Date range
// ---------------------------------------------------------------------------

/// Inclusive [start, end] calendar-date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Validates start <= end; a reversed range is a
    /// [`DashboardError::InvalidDateRange`].
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(DashboardError::InvalidDateRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// Resolve user-supplied bounds against the observed defaults, then
    /// validate. A table with no order dates at all falls back to the full
    /// representable range (rows without order_date never match anyway).
    pub fn resolve(
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
        options: &FilterOptions,
    ) -> Result<Self> {
        let start = start
            .or(options.min_order_date)
            .unwrap_or(NaiveDate::MIN);
        let end = end.or(options.max_order_date).unwrap_or(NaiveDate::MAX);
        Self::new(start, end)
    }

    fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

// ---------------------------------------------------------------------------
// Filter option enumeration (what the UI selectors show)
// ---------------------------------------------------------------------------

/// Distinct values per dimension (sorted lexically) and the observed
/// order-date bounds, the defaults for the two date pickers.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FilterOptions {
    pub genders: Vec<String>,
    pub countries: Vec<String>,
    pub categories: Vec<String>,
    pub product_lines: Vec<String>,
    pub min_order_date: Option<NaiveDate>,
    pub max_order_date: Option<NaiveDate>,
}

impl FilterOptions {
    pub fn from_table(rows: &[EnrichedSale]) -> Self {
        fn distinct<'a>(
            rows: &'a [EnrichedSale],
            get: impl Fn(&'a EnrichedSale) -> Option<&'a str>,
        ) -> Vec<String> {
            rows.iter()
                .filter_map(&get)
                .map(str::to_string)
                .collect::<BTreeSet<_>>()
                .into_iter()
                .collect()
        }

        let dates = rows.iter().filter_map(|r| r.order_date);
        Self {
            genders: distinct(rows, |r| r.gender.as_deref()),
            countries: distinct(rows, |r| r.country.as_deref()),
            categories: distinct(rows, |r| r.category.as_deref()),
            product_lines: distinct(rows, |r| r.product_line.as_deref()),
            min_order_date: dates.clone().min(),
            max_order_date: dates.max(),
        }
    }
}

// ---------------------------------------------------------------------------
// Application
// ---------------------------------------------------------------------------

/// Return the subset matching every active selection and the date range.
/// Rows with a missing order_date never fall inside any range, mirroring
/// the source's not-a-time comparison semantics.
pub fn apply<'a>(
    rows: &'a [EnrichedSale],
    dims: &DimensionFilters,
    range: &DateRange,
) -> Vec<&'a EnrichedSale> {
    rows.iter()
        .filter(|r| dims.gender.matches(r.gender.as_deref()))
        .filter(|r| dims.country.matches(r.country.as_deref()))
        .filter(|r| dims.category.matches(r.category.as_deref()))
        .filter(|r| dims.product_line.matches(r.product_line.as_deref()))
        .filter(|r| r.order_date.is_some_and(|d| range.contains(d)))
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
