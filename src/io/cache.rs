//! Schema cache: a JSON snapshot of a job's column registry.
//!
//! A usable cache lets a rerun skip the discovery pass. Anything unusable
//! (missing, unreadable, undecodable, or with no columns) is a miss; writes
//! are best effort.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::domain::Job;
use crate::error::CacheError;
use crate::schema::ColumnRegistry;

#[derive(Debug, Clone)]
pub struct SchemaCache {
    dir: Option<PathBuf>,
}

impl SchemaCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: Some(dir.into()) }
    }

    /// A cache that never hits and never writes.
    pub fn disabled() -> Self {
        Self { dir: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.dir.is_some()
    }

    /// Cache key for a job: distinct per category and round.
    pub fn key(job: Job) -> String {
        format!("__{}{}.cache", job.category.title(), job.round.id())
    }

    fn path(&self, key: &str) -> Option<PathBuf> {
        self.dir.as_ref().map(|dir| dir.join(key))
    }

    pub fn load(&self, key: &str) -> Option<ColumnRegistry> {
        let path = self.path(key)?;
        match read_registry(&path) {
            Ok(registry) if !registry.is_empty() => Some(registry),
            Ok(_) => {
                log::debug!("schema cache {} has no columns; ignoring", path.display());
                None
            }
            Err(reason) => {
                log::debug!("schema cache {} unusable: {reason}", path.display());
                None
            }
        }
    }

    pub fn save(&self, key: &str, registry: &ColumnRegistry) {
        let Some(path) = self.path(key) else {
            return;
        };
        if let Err(reason) = write_registry(&path, registry) {
            log::warn!("cannot write schema cache {}: {reason}", path.display());
        }
    }
}

fn read_registry(path: &Path) -> Result<ColumnRegistry, CacheError> {
    let file = File::open(path)?;
    Ok(serde_json::from_reader(BufReader::new(file))?)
}

fn write_registry(path: &Path, registry: &ColumnRegistry) -> Result<(), CacheError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer(&mut writer, registry)?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Category, ColumnDescriptor, Round};
    use crate::schema::Uniqueness;

    fn sample_registry() -> ColumnRegistry {
        let mut reg = ColumnRegistry::from_descriptors(
            &[
                ColumnDescriptor::new(1, "CUMHUR İTTİFAKI", "ittifak_1"),
                ColumnDescriptor::new(2, "CHP", "parti_2"),
            ],
            Uniqueness::Strict,
        )
        .unwrap();
        reg.register_if_absent(ColumnDescriptor::synthetic("secmen_sayisi"));
        reg.mark_value_present("CHP");
        reg
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let cache = SchemaCache::new(dir.path());
        let reg = sample_registry();

        cache.save("__t9.cache", &reg);
        let loaded = cache.load("__t9.cache").unwrap();

        assert_eq!(loaded, reg);
        assert!(loaded.has_value("CHP"));
        assert!(!loaded.has_value("SECMEN SAYISI"));
    }

    #[test]
    fn missing_truncated_or_empty_cache_is_a_miss() {
        let dir = tempfile::tempdir().unwrap();
        let cache = SchemaCache::new(dir.path());
        assert!(cache.load("__absent.cache").is_none());

        cache.save("__t.cache", &sample_registry());
        let path = dir.path().join("__t.cache");
        let full = fs::read(&path).unwrap();
        fs::write(&path, &full[..full.len() / 2]).unwrap();
        assert!(cache.load("__t.cache").is_none());

        fs::write(&path, r#"{"names":{},"hasValues":[]}"#).unwrap();
        assert!(cache.load("__t.cache").is_none());
    }

    #[test]
    fn cache_without_value_set_still_loads() {
        let dir = tempfile::tempdir().unwrap();
        let cache = SchemaCache::new(dir.path());
        fs::write(
            dir.path().join("__k.cache"),
            r#"{"names":{"CHP":{"sira_NO":2,"ad":"CHP","column_NAME":"parti_2"}}}"#,
        )
        .unwrap();
        let loaded = cache.load("__k.cache").unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded.valued_len(), 0);
    }

    #[test]
    fn disabled_cache_never_hits() {
        let cache = SchemaCache::disabled();
        cache.save("__x.cache", &sample_registry());
        assert!(cache.load("__x.cache").is_none());
        assert!(!cache.is_enabled());
    }

    #[test]
    fn save_to_unwritable_location_is_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        fs::write(&blocker, b"x").unwrap();
        // Parent "directory" is a regular file, so the write fails.
        let cache = SchemaCache::new(&blocker);
        cache.save("__x.cache", &sample_registry());
        assert!(cache.load("__x.cache").is_none());
    }

    #[test]
    fn keys_differ_per_category_and_round() {
        let a = SchemaCache::key(Job::new(Round::Presidential, Category::Domestic));
        let b = SchemaCache::key(Job::new(Round::Presidential, Category::Overseas));
        let c = SchemaCache::key(Job::new(Round::Parliamentary, Category::Domestic));
        assert_eq!(a, "__sandiklar8.cache");
        assert_ne!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn read_failures_are_typed() {
        let dir = tempfile::tempdir().unwrap();
        let missing = read_registry(&dir.path().join("__none.cache")).unwrap_err();
        assert!(matches!(missing, CacheError::Io(_)));

        let garbage = dir.path().join("__bad.cache");
        fs::write(&garbage, b"not json").unwrap();
        assert!(matches!(read_registry(&garbage).unwrap_err(), CacheError::Json(_)));

        let blocker = dir.path().join("file");
        fs::write(&blocker, b"x").unwrap();
        let err = write_registry(&blocker.join("__x.cache"), &sample_registry()).unwrap_err();
        assert!(matches!(err, CacheError::Io(_)));
    }
}
