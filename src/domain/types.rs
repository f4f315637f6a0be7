//! Shared domain types.
//!
//! These types are intentionally kept small and serializable so they can be:
//!
//! - decoded straight from provider JSON
//! - persisted in the schema cache
//! - passed between the fetch, mapping and writing stages without copies of
//!   provider-specific structs

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use clap::ValueEnum;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Which election a report covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Round {
    Presidential,
    Parliamentary,
}

impl Round {
    pub const ALL: [Round; 2] = [Round::Presidential, Round::Parliamentary];

    /// Provider election-type id (`secimTuru`).
    pub fn id(self) -> u32 {
        match self {
            Round::Presidential => 8,
            Round::Parliamentary => 9,
        }
    }

    /// Marker embedded in report file names.
    pub fn file_marker(self) -> &'static str {
        match self {
            Round::Presidential => "CB",
            Round::Parliamentary => "MV",
        }
    }
}

/// Result-source family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Ballot boxes in domestic electoral districts.
    Domestic,
    /// Ballot boxes at overseas diplomatic missions.
    Overseas,
    /// Ballot boxes at border customs posts.
    Customs,
    /// Ballot boxes inside prison facilities.
    Prison,
}

/// Where a category's column headers come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaScope {
    /// Every region declares its own header list (merged in union mode).
    PerRegion,
    /// One abroad header list covers every region (strict mode).
    Shared,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Domestic,
        Category::Overseas,
        Category::Customs,
        Category::Prison,
    ];

    /// Title token used for report and cache file names.
    pub fn title(self) -> &'static str {
        match self {
            Category::Domestic => "sandiklar",
            Category::Overseas => "disTemsSandiklar",
            Category::Customs => "gumrukSandiklar",
            Category::Prison => "cezaeviSandiklar",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Category::Domestic => "domestic",
            Category::Overseas => "overseas",
            Category::Customs => "customs",
            Category::Prison => "prison",
        }
    }

    pub fn schema_scope(self) -> SchemaScope {
        match self {
            Category::Domestic | Category::Prison => SchemaScope::PerRegion,
            Category::Overseas | Category::Customs => SchemaScope::Shared,
        }
    }

    /// Provider ballot-box type (`sandikTuru`).
    pub fn ballot_box_type(self) -> u32 {
        match self {
            Category::Domestic => 0,
            Category::Customs => 1,
            Category::Prison => 2,
            Category::Overseas => 3,
        }
    }

    /// Provider home/abroad flag (`yurtIciDisi`): 1 = home, 2 = abroad.
    pub fn home_abroad(self) -> u32 {
        match self {
            Category::Domestic | Category::Prison => 1,
            Category::Overseas | Category::Customs => 2,
        }
    }
}

/// One (round, category) export job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Job {
    pub round: Round,
    pub category: Category,
}

impl Job {
    pub fn new(round: Round, category: Category) -> Self {
        Self { round, category }
    }

    /// Every job for the given rounds and categories, round-major.
    pub fn matrix(rounds: &[Round], categories: &[Category]) -> Vec<Job> {
        let mut jobs = Vec::with_capacity(rounds.len() * categories.len());
        for &round in rounds {
            for &category in categories {
                jobs.push(Job::new(round, category));
            }
        }
        jobs
    }
}

impl fmt::Display for Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.category.display_name(), self.round.file_marker())
    }
}

/// Rank assigned to columns that no provider header declared.
pub const SYNTHETIC_RANK: i64 = 9999;

/// Metadata for one reportable column.
///
/// Field names on the wire follow the provider's header endpoint, and the
/// schema cache reuses the same shape.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    /// Provider priority within a column group. `0` marks a hidden column.
    #[serde(rename = "sira_NO")]
    pub order_rank: i64,
    /// Human label; the canonical key of a column.
    #[serde(rename = "ad")]
    pub display_name: String,
    /// Provider machine column name.
    #[serde(rename = "column_NAME")]
    pub raw_key: String,
}

impl ColumnDescriptor {
    pub fn new(order_rank: i64, display_name: impl Into<String>, raw_key: impl Into<String>) -> Self {
        Self {
            order_rank,
            display_name: display_name.into(),
            raw_key: raw_key.into(),
        }
    }

    /// Descriptor for a raw key no header declared: `oy_sayisi` -> `OY SAYISI`.
    pub fn synthetic(raw_key: &str) -> Self {
        Self {
            order_rank: SYNTHETIC_RANK,
            display_name: raw_key.replace('_', " ").to_uppercase(),
            raw_key: raw_key.to_string(),
        }
    }

    /// Hidden descriptors never enter the registry or a scope lookup.
    pub fn is_hidden(&self) -> bool {
        self.order_rank == 0
    }
}

/// A single scalar cell value as delivered by the provider.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl Scalar {
    /// Whether the value counts as informative for empty-column detection.
    pub fn is_informative(&self) -> bool {
        match self {
            Scalar::Null => false,
            other => {
                let rendered = other.to_string();
                !rendered.is_empty() && rendered != "0"
            }
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Null => Ok(()),
            Scalar::Bool(b) => write!(f, "{b}"),
            Scalar::Int(i) => write!(f, "{i}"),
            Scalar::Float(x) => write!(f, "{x}"),
            Scalar::Text(s) => f.write_str(s),
        }
    }
}

impl From<serde_json::Value> for Scalar {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value;
        match value {
            Value::Null => Scalar::Null,
            Value::Bool(b) => Scalar::Bool(b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Scalar::Int(i),
                // u64 above i64::MAX and real numbers both land here.
                None => Scalar::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            Value::String(s) => Scalar::Text(s),
            nested @ (Value::Array(_) | Value::Object(_)) => Scalar::Text(nested.to_string()),
        }
    }
}

impl<'de> Deserialize<'de> for Scalar {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        serde_json::Value::deserialize(deserializer).map(Scalar::from)
    }
}

/// One provider result record; field order is the provider's.
pub type RawRecord = IndexMap<String, Scalar>;

/// A record re-keyed by column display name.
pub type CanonicalRow = HashMap<String, Scalar>;

/// How floating-point cells are rendered in reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum FloatFormat {
    /// Render bare, like any other number (`12.5`; `12.0` becomes `12`).
    #[default]
    Plain,
    /// Render as a quoted string (`"12.5"`).
    Quoted,
    /// Drop the fractional part and render as a plain integer (`12`).
    Truncate,
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags, `.env` and defaults.
#[derive(Debug, Clone)]
pub struct ExportConfig {
    pub base_url: String,
    pub election_id: u64,
    pub rounds: Vec<Round>,
    pub categories: Vec<Category>,

    pub out_dir: PathBuf,
    /// `None` disables the schema cache.
    pub cache_dir: Option<PathBuf>,

    pub request_timeout: Duration,
    pub retry_delay: Duration,
    /// `None` retries forever.
    pub max_attempts: Option<u32>,
    pub insecure_tls: bool,

    pub float_format: FloatFormat,
    /// Write columns that never carried a value instead of dropping them.
    pub keep_empty_columns: bool,
}

impl ExportConfig {
    pub fn jobs(&self) -> Vec<Job> {
        Job::matrix(&self.rounds, &self.categories)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn synthetic_descriptor_uppercases_and_spaces() {
        let d = ColumnDescriptor::synthetic("gecersiz_oy_toplami");
        assert_eq!(d.order_rank, SYNTHETIC_RANK);
        assert_eq!(d.display_name, "GECERSIZ OY TOPLAMI");
        assert_eq!(d.raw_key, "gecersiz_oy_toplami");
    }

    #[test]
    fn descriptor_decodes_provider_field_names() {
        let d: ColumnDescriptor =
            serde_json::from_str(r#"{"sira_NO":3,"ad":"AK PARTİ","column_NAME":"parti_12","extra":1}"#).unwrap();
        assert_eq!(d, ColumnDescriptor::new(3, "AK PARTİ", "parti_12"));
        assert!(!d.is_hidden());
        assert!(ColumnDescriptor::new(0, "X", "x").is_hidden());
    }

    #[test]
    fn raw_record_keeps_provider_order_and_scalar_kinds() {
        let rec: RawRecord =
            serde_json::from_str(r#"{"z":1,"a":"txt","m":2.5,"b":true,"n":null,"o":[1,2]}"#).unwrap();
        let keys: Vec<&str> = rec.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["z", "a", "m", "b", "n", "o"]);
        assert_eq!(rec["z"], Scalar::Int(1));
        assert_eq!(rec["a"], Scalar::Text("txt".into()));
        assert_eq!(rec["m"], Scalar::Float(2.5));
        assert_eq!(rec["b"], Scalar::Bool(true));
        assert_eq!(rec["n"], Scalar::Null);
        assert_eq!(rec["o"], Scalar::Text("[1,2]".into()));
    }

    #[test]
    fn informative_values_exclude_zero_empty_and_null() {
        assert!(!Scalar::Int(0).is_informative());
        assert!(!Scalar::Float(0.0).is_informative());
        assert!(!Scalar::Text(String::new()).is_informative());
        assert!(!Scalar::Text("0".into()).is_informative());
        assert!(!Scalar::Null.is_informative());
        assert!(Scalar::Int(7).is_informative());
        assert!(Scalar::Bool(false).is_informative());
        assert!(Scalar::Text("x".into()).is_informative());
    }

    #[test]
    fn job_matrix_is_round_major() {
        let jobs = Job::matrix(&Round::ALL, &[Category::Domestic, Category::Prison]);
        assert_eq!(jobs.len(), 4);
        assert_eq!(jobs[0], Job::new(Round::Presidential, Category::Domestic));
        assert_eq!(jobs[3], Job::new(Round::Parliamentary, Category::Prison));
        assert_eq!(jobs[1].to_string(), "prison/CB");
    }
}
