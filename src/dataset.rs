//! Embedded strength measurements
//!
//! Five sample treatments, three specimens each. `SA-C` is the control.

use crate::storage::StorageEngine;
use crate::Result;

/// Group labels in table order
pub const GROUP_LABELS: [&str; 5] = ["SA-FST", "SA-FPL", "SA-FPP", "SA-FSN", "SA-C"];

/// Observations per group
pub const OBSERVATIONS_PER_GROUP: usize = 3;

/// `(group, strength)` rows
pub const STRENGTH_OBSERVATIONS: [(&str, f64); 15] = [
    ("SA-FST", 53.2),
    ("SA-FST", 52.9),
    ("SA-FST", 53.5),
    ("SA-FPL", 48.2),
    ("SA-FPL", 48.1),
    ("SA-FPL", 48.4),
    ("SA-FPP", 45.1),
    ("SA-FPP", 45.4),
    ("SA-FPP", 44.9),
    ("SA-FSN", 47.1),
    ("SA-FSN", 46.8),
    ("SA-FSN", 47.0),
    ("SA-C", 50.2),
    ("SA-C", 50.0),
    ("SA-C", 49.9),
];

/// The embedded table as a single Arrow batch
///
/// # Errors
///
/// Returns error if the batch cannot be assembled
pub fn strength_table() -> Result<StorageEngine> {
    StorageEngine::from_observations(&STRENGTH_OBSERVATIONS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_five_groups_of_three() {
        let grouped = strength_table().unwrap().groups().unwrap();
        assert_eq!(grouped.len(), GROUP_LABELS.len());
        for (group, expected) in grouped.groups().iter().zip(GROUP_LABELS) {
            assert_eq!(group.label, expected);
            assert_eq!(group.values.len(), OBSERVATIONS_PER_GROUP);
        }
    }

    #[test]
    fn test_table_row_count() {
        assert_eq!(strength_table().unwrap().num_rows(), 15);
    }
}
