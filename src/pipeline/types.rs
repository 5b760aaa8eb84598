//! Record types for the data preparation pipeline.
//!
//! Raw records mirror the warehouse views cell-for-cell: every non-key cell
//! is carried as lenient text so that coercion (and its fallback policy)
//! happens in exactly one place, `prepare.rs`. The enriched record is the
//! denormalized row every chart consumes.

use chrono::NaiveDate;
use serde::Serialize;

// ---------------------------------------------------------------------------
// Raw records (one struct per warehouse view)
// ---------------------------------------------------------------------------

/// A row of `gold_dim_customers`, as read.
#[derive(Debug, Clone, Default)]
pub struct RawCustomer {
    pub customer_key: Option<i64>,
    pub gender: Option<String>,
    pub country: Option<String>,
    pub birthdate: Option<String>,
}

/// A row of `gold_dim_products`, as read.
#[derive(Debug, Clone, Default)]
pub struct RawProduct {
    pub product_key: Option<i64>,
    pub product_number: Option<String>,
    pub product_name: Option<String>,
    pub product_cost: Option<String>,
    pub category: Option<String>,
    pub subcategory: Option<String>,
    pub product_line: Option<String>,
}

/// A row of `gold_fact_sales`, as read. One record per transaction line.
#[derive(Debug, Clone, Default)]
pub struct RawSale {
    pub order_number: Option<String>,
    pub customer_key: Option<i64>,
    pub product_key: Option<i64>,
    pub order_date: Option<String>,
    pub quantity: Option<String>,
    pub unit_price: Option<String>,
    pub sales_amount: Option<String>,
}

/// The three raw tables, exactly as the adapter returned them.
#[derive(Debug, Clone, Default)]
pub struct RawTables {
    pub customers: Vec<RawCustomer>,
    pub products: Vec<RawProduct>,
    pub sales: Vec<RawSale>,
}

// ---------------------------------------------------------------------------
// AgeGroup
// ---------------------------------------------------------------------------

/// Fixed, ordered age bands. Right-open intervals over [0, 100); ages
/// outside that range (or missing birthdates) get no group at all.
///
/// The display labels are the warehouse's historical ones and do not line
/// up with the interval edges (18.5 falls in the band labelled "19-25").
/// They are load-bearing for downstream consumers, so they stay verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum AgeGroup {
    #[serde(rename = "0-18")]
    Under18,
    #[serde(rename = "19-25")]
    From18To25,
    #[serde(rename = "26-35")]
    From25To35,
    #[serde(rename = "36-50")]
    From35To50,
    #[serde(rename = "51-65")]
    From50To65,
    #[serde(rename = "65+")]
    From65To100,
}

impl AgeGroup {
    /// All groups in their fixed display order.
    pub const ALL: [AgeGroup; 6] = [
        Self::Under18,
        Self::From18To25,
        Self::From25To35,
        Self::From35To50,
        Self::From50To65,
        Self::From65To100,
    ];

    /// Bucket a (possibly fractional) age. Right-open intervals, so an age
    /// of exactly 18.0 lands in the second band.
    pub fn from_age(age: f64) -> Option<Self> {
        match age {
            a if (0.0..18.0).contains(&a) => Some(Self::Under18),
            a if (18.0..25.0).contains(&a) => Some(Self::From18To25),
            a if (25.0..35.0).contains(&a) => Some(Self::From25To35),
            a if (35.0..50.0).contains(&a) => Some(Self::From35To50),
            a if (50.0..65.0).contains(&a) => Some(Self::From50To65),
            a if (65.0..100.0).contains(&a) => Some(Self::From65To100),
            _ => None,
        }
    }

    /// Display label as stored/charted.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Under18 => "0-18",
            Self::From18To25 => "19-25",
            Self::From25To35 => "26-35",
            Self::From35To50 => "36-50",
            Self::From50To65 => "51-65",
            Self::From65To100 => "65+",
        }
    }
}

impl std::fmt::Display for AgeGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

// ---------------------------------------------------------------------------
// EnrichedSale
// ---------------------------------------------------------------------------

/// One denormalized sale line: the fact row, its joined product and
/// customer attributes, and the derived columns.
///
/// Joined attributes stay `Option` because left-join misses are legal until
/// the cleaning step; after cleaning, the critical columns (gender, country,
/// category, product_line, product_name, age_group) are guaranteed present.
#[derive(Debug, Clone, Serialize)]
pub struct EnrichedSale {
    pub order_number: Option<String>,
    pub customer_key: Option<i64>,
    pub product_key: Option<i64>,
    pub order_date: Option<NaiveDate>,
    pub quantity: f64,
    pub unit_price: f64,
    pub sales_amount: f64,

    // Joined product attributes.
    pub product_number: Option<String>,
    pub product_name: Option<String>,
    pub product_cost: f64,
    pub category: Option<String>,
    pub subcategory: Option<String>,
    pub product_line: Option<String>,

    // Joined customer attributes.
    pub gender: Option<String>,
    pub country: Option<String>,
    pub birthdate: Option<NaiveDate>,

    // Derived columns.
    pub unit_profit: f64,
    pub total_profit: f64,
    pub order_month: Option<NaiveDate>,
    pub age: Option<f64>,
    pub age_group: Option<AgeGroup>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
