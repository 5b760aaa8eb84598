//! Session-lifetime memoization of the cleaned gold table.
//!
//! The table is expensive to build (warehouse round-trip + joins) and every
//! filter change re-reads it, so it is computed once per session and shared
//! as an immutable `Arc`. Invalidation is an explicit hook (`--refresh` in
//! the CLI) rather than implicit global state.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::info;

use super::types::EnrichedSale;
use crate::error::Result;

/// Memo cache for the cleaned table. There is one logical key (the pipeline
/// takes no parameters that vary within a session), so the cache is a
/// single slot.
pub struct GoldCache {
    slot: Mutex<Option<Arc<Vec<EnrichedSale>>>>,
}

impl GoldCache {
    pub const fn new() -> Self {
        Self {
            slot: Mutex::new(None),
        }
    }

    /// Return the memoized table, building it with `build` on first use.
    /// A failed build leaves the cache empty so the next interaction
    /// retries from scratch.
    pub fn get_or_build<F>(&self, build: F) -> Result<Arc<Vec<EnrichedSale>>>
    where
        F: FnOnce() -> Result<Vec<EnrichedSale>>,
    {
        let mut slot = self.slot.lock();
        if let Some(table) = slot.as_ref() {
            return Ok(Arc::clone(table));
        }
        let table = Arc::new(build()?);
        info!(rows = table.len(), "gold table memoized for session");
        *slot = Some(Arc::clone(&table));
        Ok(table)
    }

    /// Cache-bust hook: the next `get_or_build` re-reads the warehouse.
    pub fn invalidate(&self) {
        let mut slot = self.slot.lock();
        if slot.take().is_some() {
            info!("gold table cache invalidated");
        }
    }

    pub fn is_populated(&self) -> bool {
        self.slot.lock().is_some()
    }
}

impl Default for GoldCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Process-wide session cache.
pub static SESSION_CACHE: GoldCache = GoldCache::new();

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
