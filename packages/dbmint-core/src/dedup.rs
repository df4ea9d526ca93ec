//! Filtering imported rows against rows already present in a database.
//!
//! A freshly generated database may already hold rows (seed data from the
//! schema). Replaying identical rows from a data directory would violate
//! uniqueness constraints, so they are dropped before the merge.

use std::collections::HashMap;

use crate::dump::InsertRow;

/// Keeps the candidates that do not duplicate a baseline row.
///
/// A candidate is a duplicate when a baseline row has the same table, the
/// same number of values, and equal values after trimming both sides.
/// Surviving candidates keep their order.
pub fn filter_new(baseline: &[InsertRow], candidates: Vec<InsertRow>) -> Vec<InsertRow> {
    let mut index: HashMap<(&str, usize), Vec<&InsertRow>> = HashMap::new();
    for row in baseline {
        index
            .entry((row.table_name.as_str(), row.values.len()))
            .or_default()
            .push(row);
    }

    candidates
        .into_iter()
        .filter(|candidate| {
            let duplicate = index
                .get(&(candidate.table_name.as_str(), candidate.values.len()))
                .is_some_and(|rows| rows.iter().any(|base| same_values(base, candidate)));
            if duplicate {
                tracing::debug!(
                    "Dropping row of '{}' already present: {:?}",
                    candidate.table_name,
                    candidate.values
                );
            }
            !duplicate
        })
        .collect()
}

fn same_values(a: &InsertRow, b: &InsertRow) -> bool {
    a.values
        .iter()
        .zip(&b.values)
        .all(|(x, y)| x.trim() == y.trim())
}
