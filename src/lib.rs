//! Read-only analytical dashboard over a gold-layer sales warehouse.
//!
//! Data flows one way: the warehouse adapter loads three raw tables, the
//! preparation pipeline joins/derives/cleans them into one denormalized
//! table (memoized per session), the filter engine narrows it per user
//! input, and the aggregation layer reduces the subset into the views a
//! rendering surface draws. Single-threaded, synchronous, one interaction
//! at a time.

pub mod aggregate;
pub mod cli;
pub mod dashboard;
pub mod error;
pub mod filter;
pub mod pipeline;
pub mod render;
pub mod warehouse;

pub use error::DashboardError;
