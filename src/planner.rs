//! Remaining-work computation.
//!
//! An order-preserving set difference: everything from the id list that is
//! neither already in the checkpoint nor a sentinel entry. The relative
//! order of the source list is kept so progress stays auditable against it.

use std::collections::HashSet;

/// Entries that are not real work: spreadsheet artifacts (`nan` from an
/// empty cell), blank rows, and the literal column label `КИ` that the
/// source lists carry in their first row.
const SENTINELS: &[&str] = &["КИ"];

pub fn is_sentinel(id: &str) -> bool {
    id.is_empty() || id.eq_ignore_ascii_case("nan") || SENTINELS.contains(&id)
}

/// Ids still to process: `all_ids` minus completed keys minus sentinels,
/// in the original order.
pub fn plan(all_ids: &[String], completed: &HashSet<String>) -> Vec<String> {
    all_ids
        .iter()
        .filter(|id| !is_sentinel(id) && !completed.contains(id.as_str()))
        .cloned()
        .collect()
}
