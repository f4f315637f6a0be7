//! Column registry and per-scope raw-key lookups.
//!
//! Provider headers arrive per region and disagree with each other; the
//! registry is the reconciled, display-name keyed view of all of them.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::domain::ColumnDescriptor;
use crate::error::SchemaError;

/// How duplicate keys are treated while building a mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Uniqueness {
    /// A key may repeat only with an identical paired field.
    Strict,
    /// Last descriptor for a key wins; never fails.
    Union,
}

/// Insert `desc` under `key`, enforcing `mode`. `paired` picks the field that
/// must agree between two descriptors sharing the key.
fn insert_checked<M>(
    map: &mut M,
    key: &str,
    desc: &ColumnDescriptor,
    paired: fn(&ColumnDescriptor) -> &str,
    mode: Uniqueness,
) -> Result<(), SchemaError>
where
    M: KeyedDescriptors,
{
    if mode == Uniqueness::Strict {
        if let Some(existing) = map.lookup(key) {
            if paired(existing) != paired(desc) {
                return Err(SchemaError::Conflict {
                    key: key.to_string(),
                    existing: existing.clone(),
                    incoming: desc.clone(),
                });
            }
        }
    }
    map.put(key.to_string(), desc.clone());
    Ok(())
}

trait KeyedDescriptors {
    fn lookup(&self, key: &str) -> Option<&ColumnDescriptor>;
    fn put(&mut self, key: String, desc: ColumnDescriptor);
}

impl KeyedDescriptors for BTreeMap<String, ColumnDescriptor> {
    fn lookup(&self, key: &str) -> Option<&ColumnDescriptor> {
        self.get(key)
    }
    fn put(&mut self, key: String, desc: ColumnDescriptor) {
        self.insert(key, desc);
    }
}

impl KeyedDescriptors for HashMap<String, ColumnDescriptor> {
    fn lookup(&self, key: &str) -> Option<&ColumnDescriptor> {
        self.get(key)
    }
    fn put(&mut self, key: String, desc: ColumnDescriptor) {
        self.insert(key, desc);
    }
}

/// Reconciled columns for one (round, category) job.
///
/// Serialized as-is into the schema cache, so field names are part of the
/// cache format.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnRegistry {
    names: BTreeMap<String, ColumnDescriptor>,
    #[serde(rename = "hasValues", default)]
    has_values: BTreeSet<String>,
}

impl ColumnRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from one descriptor list.
    pub fn from_descriptors(descs: &[ColumnDescriptor], mode: Uniqueness) -> Result<Self, SchemaError> {
        let mut registry = Self::new();
        registry.merge(descs, mode)?;
        Ok(registry)
    }

    /// Extend the registry with `descs`, keyed by display name.
    ///
    /// Hidden descriptors are skipped. In strict mode a display name that is
    /// already mapped to a different raw key is a conflict.
    pub fn merge(&mut self, descs: &[ColumnDescriptor], mode: Uniqueness) -> Result<(), SchemaError> {
        for desc in descs.iter().filter(|d| !d.is_hidden()) {
            insert_checked(&mut self.names, &desc.display_name, desc, |d| &d.raw_key, mode)?;
        }
        Ok(())
    }

    /// Insert `desc` unless its display name is already known.
    ///
    /// Returns whether the descriptor was inserted.
    pub fn register_if_absent(&mut self, desc: ColumnDescriptor) -> bool {
        if desc.is_hidden() || self.names.contains_key(&desc.display_name) {
            return false;
        }
        self.names.insert(desc.display_name.clone(), desc);
        true
    }

    pub fn mark_value_present(&mut self, display_name: &str) {
        if !self.has_values.contains(display_name) {
            self.has_values.insert(display_name.to_string());
        }
    }

    pub fn has_value(&self, display_name: &str) -> bool {
        self.has_values.contains(display_name)
    }

    pub fn get(&self, display_name: &str) -> Option<&ColumnDescriptor> {
        self.names.get(display_name)
    }

    pub fn descriptors(&self) -> impl Iterator<Item = &ColumnDescriptor> {
        self.names.values()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn valued_len(&self) -> usize {
        self.has_values.len()
    }
}

/// Raw key -> descriptor lookup for one schema scope (one region, or the
/// shared abroad schema).
///
/// Hidden descriptors are left out, so their raw keys map like any other
/// undeclared key.
#[derive(Debug, Clone, Default)]
pub struct ScopeLookup {
    by_raw_key: HashMap<String, ColumnDescriptor>,
}

impl ScopeLookup {
    pub fn build(descs: &[ColumnDescriptor], mode: Uniqueness) -> Result<Self, SchemaError> {
        let mut lookup = Self::default();
        for desc in descs.iter().filter(|d| !d.is_hidden()) {
            insert_checked(&mut lookup.by_raw_key, &desc.raw_key, desc, |d| &d.display_name, mode)?;
        }
        Ok(lookup)
    }

    pub fn get(&self, raw_key: &str) -> Option<&ColumnDescriptor> {
        self.by_raw_key.get(raw_key)
    }

    pub fn len(&self) -> usize {
        self.by_raw_key.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_raw_key.is_empty()
    }
}
