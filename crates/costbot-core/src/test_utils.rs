//! Fixture builders for the core unit tests
//!
//! Integration tests in the root `tests/` directory cannot see this module
//! and keep their own helpers in `tests/common/mod.rs`.

use crate::types::CostEntry;

/// Build billing entries from `(service, amount)` pairs
pub fn entries(pairs: &[(&str, f64)]) -> Vec<CostEntry> {
    pairs
        .iter()
        .map(|(service, amount)| CostEntry::new(*service, *amount))
        .collect()
}
