//! Re-keys provider records onto the canonical (display name) shape.

use crate::domain::{CanonicalRow, ColumnDescriptor, RawRecord};
use crate::schema::registry::{ColumnRegistry, ScopeLookup};

/// Map one raw record to display-name keys.
///
/// Raw keys the scope does not declare (including keys it declared hidden)
/// are registered as synthetic columns rather than dropped. Columns
/// registered here only affect headers written afterwards.
pub fn map_row(lookup: &ScopeLookup, registry: &mut ColumnRegistry, record: RawRecord) -> CanonicalRow {
    let mut row = CanonicalRow::with_capacity(record.len());
    for (raw_key, value) in record {
        let desc = match lookup.get(&raw_key) {
            Some(desc) => desc.clone(),
            None => ColumnDescriptor::synthetic(&raw_key),
        };
        if value.is_informative() {
            registry.mark_value_present(&desc.display_name);
        }
        let display_name = desc.display_name.clone();
        registry.register_if_absent(desc);
        row.insert(display_name, value);
    }
    row
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{SYNTHETIC_RANK, Scalar};
    use crate::schema::registry::Uniqueness;

    fn record(pairs: &[(&str, Scalar)]) -> RawRecord {
        pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }

    #[test]
    fn known_keys_are_renamed_to_display_names() {
        let lookup = ScopeLookup::build(
            &[ColumnDescriptor::new(1, "CHP", "parti_2")],
            Uniqueness::Strict,
        )
        .unwrap();
        let mut reg = ColumnRegistry::new();
        let row = map_row(&lookup, &mut reg, record(&[("parti_2", Scalar::Int(12))]));
        assert_eq!(row.get("CHP"), Some(&Scalar::Int(12)));
        assert!(row.get("parti_2").is_none());
        assert!(reg.has_value("CHP"));
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn unknown_key_is_synthesized_once() {
        let lookup = ScopeLookup::default();
        let mut reg = ColumnRegistry::new();

        let row = map_row(&lookup, &mut reg, record(&[("gecerli_oy_toplami", Scalar::Int(40))]));
        assert_eq!(row.get("GECERLI OY TOPLAMI"), Some(&Scalar::Int(40)));
        assert_eq!(reg.len(), 1);
        let desc = reg.get("GECERLI OY TOPLAMI").unwrap();
        assert_eq!(desc.order_rank, SYNTHETIC_RANK);
        assert_eq!(desc.raw_key, "gecerli_oy_toplami");

        map_row(&lookup, &mut reg, record(&[("gecerli_oy_toplami", Scalar::Int(3))]));
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn zero_and_empty_values_do_not_mark_column() {
        let lookup = ScopeLookup::default();
        let mut reg = ColumnRegistry::new();
        map_row(
            &lookup,
            &mut reg,
            record(&[
                ("a", Scalar::Int(0)),
                ("b", Scalar::Text(String::new())),
                ("c", Scalar::Null),
                ("d", Scalar::Text("0".into())),
            ]),
        );
        assert_eq!(reg.len(), 4);
        assert_eq!(reg.valued_len(), 0);

        map_row(&lookup, &mut reg, record(&[("a", Scalar::Int(2))]));
        assert!(reg.has_value("A"));
    }

    #[test]
    fn hidden_keys_are_kept_as_synthetic_columns() {
        let lookup = ScopeLookup::build(
            &[ColumnDescriptor::new(0, "GIZLI", "bagimsiz_9")],
            Uniqueness::Strict,
        )
        .unwrap();
        let mut reg = ColumnRegistry::new();
        let row = map_row(&lookup, &mut reg, record(&[("bagimsiz_9", Scalar::Int(4))]));
        assert_eq!(row.get("BAGIMSIZ 9"), Some(&Scalar::Int(4)));
        assert!(reg.get("GIZLI").is_none());
        assert_eq!(reg.get("BAGIMSIZ 9").unwrap().order_rank, SYNTHETIC_RANK);
        assert!(reg.has_value("BAGIMSIZ 9"));
    }
}
