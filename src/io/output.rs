//! Report file naming and creation.
//!
//! Timestamps never come from the host's local time zone: the run is pinned
//! to a fixed UTC offset through an injected `Clock`.

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use chrono::{DateTime, FixedOffset, Offset, Utc};

use crate::domain::Job;
use crate::error::AppError;

/// Offset used for report timestamps (Europe/Istanbul, no DST).
pub const REPORT_UTC_OFFSET_SECS: i32 = 3 * 60 * 60;

/// Source of "now" for file naming.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<FixedOffset>;
}

/// System UTC time shifted to a fixed offset.
#[derive(Debug, Clone, Copy)]
pub struct FixedOffsetClock {
    offset: FixedOffset,
}

impl FixedOffsetClock {
    pub fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }

    pub fn report_default() -> Self {
        Self::new(FixedOffset::east_opt(REPORT_UTC_OFFSET_SECS).unwrap_or(Utc.fix()))
    }
}

impl Clock for FixedOffsetClock {
    fn now(&self) -> DateTime<FixedOffset> {
        Utc::now().with_timezone(&self.offset)
    }
}

/// A clock frozen at one instant.
#[derive(Debug, Clone, Copy)]
pub struct FrozenClock(pub DateTime<FixedOffset>);

impl Clock for FrozenClock {
    fn now(&self) -> DateTime<FixedOffset> {
        self.0
    }
}

/// `sandiklarCB-14-05-2023-23-04.csv`
pub fn report_file_name(job: Job, at: DateTime<FixedOffset>) -> String {
    format!(
        "{}{}-{}.csv",
        job.category.title(),
        job.round.file_marker(),
        at.format("%d-%m-%Y-%H-%M")
    )
}

pub fn report_path(dir: &Path, job: Job, clock: &dyn Clock) -> PathBuf {
    dir.join(report_file_name(job, clock.now()))
}

pub fn create_report(path: &Path) -> Result<BufWriter<File>, AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create report '{}': {e}", path.display())))?;
    Ok(BufWriter::new(file))
}
