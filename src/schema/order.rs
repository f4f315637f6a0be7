//! Deterministic column ordering.

use std::cmp::Ordering;

use crate::domain::ColumnDescriptor;
use crate::schema::registry::ColumnRegistry;

/// Column group derived from the provider raw key prefix.
///
/// Variant order is the report order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ColumnGroup {
    Alliance,
    Party,
    Independent,
    Other,
}

impl ColumnGroup {
    pub fn of(raw_key: &str) -> Self {
        if raw_key.starts_with("ittifak") {
            ColumnGroup::Alliance
        } else if raw_key.starts_with("parti") {
            ColumnGroup::Party
        } else if raw_key.starts_with("bagimsiz") {
            ColumnGroup::Independent
        } else {
            ColumnGroup::Other
        }
    }
}

/// Total order: group, then rank, then display name.
///
/// Raw key is the last tie-break; within one registry display names are
/// unique so it only matters for ad-hoc descriptor lists.
pub fn compare_columns(a: &ColumnDescriptor, b: &ColumnDescriptor) -> Ordering {
    ColumnGroup::of(&a.raw_key)
        .cmp(&ColumnGroup::of(&b.raw_key))
        .then(a.order_rank.cmp(&b.order_rank))
        .then_with(|| a.display_name.cmp(&b.display_name))
        .then_with(|| a.raw_key.cmp(&b.raw_key))
}

/// The registry's columns in report order.
pub fn ordered_columns(registry: &ColumnRegistry) -> Vec<ColumnDescriptor> {
    let mut cols: Vec<ColumnDescriptor> = registry.descriptors().cloned().collect();
    cols.sort_by(compare_columns);
    cols
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::registry::Uniqueness;

    fn d(rank: i64, name: &str, raw: &str) -> ColumnDescriptor {
        ColumnDescriptor::new(rank, name, raw)
    }

    fn names(cols: &[ColumnDescriptor]) -> Vec<&str> {
        cols.iter().map(|c| c.display_name.as_str()).collect()
    }

    #[test]
    fn groups_sort_alliance_party_independent_other() {
        let reg = ColumnRegistry::from_descriptors(
            &[
                d(1, "SECMEN", "secmen_sayisi"),
                d(9, "BAG", "bagimsiz_1"),
                d(1, "PAR", "parti_1"),
                d(50, "ITT", "ittifak_1"),
            ],
            Uniqueness::Strict,
        )
        .unwrap();
        assert_eq!(names(&ordered_columns(&reg)), vec!["ITT", "PAR", "BAG", "SECMEN"]);
    }

    #[test]
    fn within_group_rank_then_name() {
        let reg = ColumnRegistry::from_descriptors(
            &[
                d(2, "B", "parti_b"),
                d(2, "A", "parti_a"),
                d(1, "Z", "parti_z"),
                d(9999, "EXTRA", "extra"),
                d(3, "OTHER", "other"),
            ],
            Uniqueness::Strict,
        )
        .unwrap();
        assert_eq!(names(&ordered_columns(&reg)), vec!["Z", "A", "B", "OTHER", "EXTRA"]);
    }

    #[test]
    fn ordering_ignores_insertion_order() {
        let descs = vec![
            d(1, "A", "parti_x"),
            d(1, "B", "ittifak_y"),
            d(2, "C", "bagimsiz_z"),
            d(1, "D", "misc"),
            d(1, "E", "parti_e"),
        ];
        let forward = ColumnRegistry::from_descriptors(&descs, Uniqueness::Strict).unwrap();
        let mut reversed_descs = descs.clone();
        reversed_descs.reverse();
        let reversed = ColumnRegistry::from_descriptors(&reversed_descs, Uniqueness::Strict).unwrap();

        let mut lazy = ColumnRegistry::new();
        for desc in [&descs[3], &descs[0], &descs[4], &descs[2], &descs[1]] {
            lazy.register_if_absent(desc.clone());
        }

        let expected = ordered_columns(&forward);
        assert_eq!(names(&expected), vec!["B", "A", "E", "C", "D"]);
        assert_eq!(ordered_columns(&reversed), expected);
        assert_eq!(ordered_columns(&lazy), expected);
    }

    #[test]
    fn prefix_match_is_on_raw_key_not_name() {
        assert_eq!(ColumnGroup::of("partiX"), ColumnGroup::Party);
        assert_eq!(ColumnGroup::of("ittifak"), ColumnGroup::Alliance);
        assert_eq!(ColumnGroup::of("x_parti"), ColumnGroup::Other);
        assert_eq!(ColumnGroup::of("Parti_1"), ColumnGroup::Other);
    }
}
