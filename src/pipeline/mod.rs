//! Data preparation pipeline: raw warehouse tables in, cleaned and
//! memoized denormalized gold table out.

pub mod bucketing;
pub mod cache;
pub mod prepare;
pub mod types;

pub use cache::{GoldCache, SESSION_CACHE};
pub use prepare::build_gold_table;
pub use types::{AgeGroup, EnrichedSale, RawCustomer, RawProduct, RawSale, RawTables};
