//! Per-job export pipeline shared by every (round, category) worker.
//!
//! One job runs strictly in sequence:
//!
//! enumerate regions -> discover schema (or load it from cache) ->
//! re-enumerate sub-units -> fetch, map and write rows
//!
//! The two passes never share row data; the export pass fetches everything
//! again. Headers are written only once the registry is final for the
//! discovery pass.

use std::io::Write;
use std::path::PathBuf;

use crate::data::{ApiClient, Fetch, Region};
use crate::domain::{Category, ColumnDescriptor, ExportConfig, FloatFormat, Job, Round, SchemaScope};
use crate::error::{AppError, SchemaError};
use crate::io::{Clock, SchemaCache, TableWriter, create_report, report_path};
use crate::schema::{ColumnGroup, ColumnRegistry, ScopeLookup, Uniqueness, map_row, ordered_columns};

/// Raw-key lookups for every region of a job.
#[derive(Debug, Clone)]
pub enum Scopes {
    /// One header list for all regions.
    Shared {
        headers: Vec<ColumnDescriptor>,
        lookup: ScopeLookup,
    },
    /// `headers[i]` / `lookups[i]` belong to region `i`.
    PerRegion {
        headers: Vec<Vec<ColumnDescriptor>>,
        lookups: Vec<ScopeLookup>,
    },
}

impl Scopes {
    pub fn lookup(&self, region_idx: usize) -> &ScopeLookup {
        match self {
            Scopes::Shared { lookup, .. } => lookup,
            Scopes::PerRegion { lookups, .. } => &lookups[region_idx],
        }
    }

    /// Registry built from declared headers alone: strict for a single
    /// shared scope, union across regions that are known to vary.
    pub fn seed_registry(&self) -> Result<ColumnRegistry, SchemaError> {
        match self {
            Scopes::Shared { headers, .. } => ColumnRegistry::from_descriptors(headers, Uniqueness::Strict),
            Scopes::PerRegion { headers, .. } => {
                let all: Vec<ColumnDescriptor> = headers.iter().flatten().cloned().collect();
                ColumnRegistry::from_descriptors(&all, Uniqueness::Union)
            }
        }
    }
}

/// Everything the export pass needs once the schema is settled.
#[derive(Debug, Clone)]
pub struct JobSchema {
    pub regions: Vec<Region>,
    pub scopes: Scopes,
    pub registry: ColumnRegistry,
    pub cache_hit: bool,
}

/// Rendering switches for the export pass.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReportOptions {
    pub float_format: FloatFormat,
    pub keep_empty_columns: bool,
}

impl From<&ExportConfig> for ReportOptions {
    fn from(config: &ExportConfig) -> Self {
        Self {
            float_format: config.float_format,
            keep_empty_columns: config.keep_empty_columns,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ExportSummary {
    pub job: Job,
    pub path: PathBuf,
    pub regions: usize,
    pub rows: usize,
    pub columns: usize,
    pub cache_hit: bool,
}

/// Whether independent-candidate columns are dropped from a job's report.
///
/// Parliamentary reports carry them only for overseas missions.
pub fn drops_independents(job: Job) -> bool {
    job.round == Round::Parliamentary && job.category != Category::Overseas
}

/// Column skip rule for a job's header.
pub fn skip_predicate(
    job: Job,
    registry: &ColumnRegistry,
    keep_empty_columns: bool,
) -> impl Fn(&ColumnDescriptor) -> bool + '_ {
    let drop_independents = drops_independents(job);
    move |col: &ColumnDescriptor| {
        (drop_independents && ColumnGroup::of(&col.raw_key) == ColumnGroup::Independent)
            || (!keep_empty_columns && !registry.has_value(&col.display_name))
    }
}

fn enumerate_scopes<F: Fetch>(api: &ApiClient<F>, job: Job, regions: &[Region]) -> Result<Scopes, AppError> {
    match job.category.schema_scope() {
        SchemaScope::Shared => {
            let headers = api.abroad_headers(job.round)?;
            let lookup = ScopeLookup::build(&headers, Uniqueness::Strict)?;
            Ok(Scopes::Shared { headers, lookup })
        }
        SchemaScope::PerRegion => {
            let mut headers = Vec::with_capacity(regions.len());
            let mut lookups = Vec::with_capacity(regions.len());
            for region in regions {
                let declared = api.region_headers(job, region)?;
                let lookup = ScopeLookup::build(&declared, Uniqueness::Strict)
                    .map_err(|e| AppError::from(e).context(format!("headers of {}", region.label())))?;
                headers.push(declared);
                lookups.push(lookup);
            }
            Ok(Scopes::PerRegion { headers, lookups })
        }
    }
}

fn discover<F: Fetch>(
    api: &ApiClient<F>,
    job: Job,
    regions: &[Region],
    scopes: &Scopes,
) -> Result<ColumnRegistry, AppError> {
    let mut registry = scopes.seed_registry()?;
    log::info!("[{job}] {} declared columns", registry.len());

    for (idx, region) in regions.iter().enumerate() {
        log::info!("[{job}] discovering ({}/{}) {}", idx + 1, regions.len(), region.label());
        let lookup = scopes.lookup(idx);
        for params in api.result_units(job, region)? {
            for record in api.ballot_box_results(&params)? {
                map_row(lookup, &mut registry, record);
            }
        }
    }

    log::info!(
        "[{job}] discovery done: {} columns, {} with values",
        registry.len(),
        registry.valued_len()
    );
    Ok(registry)
}

/// Enumerate regions and settle the job's column registry.
pub fn prepare_schema<F: Fetch>(api: &ApiClient<F>, job: Job, cache: &SchemaCache) -> Result<JobSchema, AppError> {
    let regions = api.regions(job)?;
    log::info!("[{job}] {} regions", regions.len());
    let scopes = enumerate_scopes(api, job, &regions)?;

    let key = SchemaCache::key(job);
    let (registry, cache_hit) = match cache.load(&key) {
        Some(registry) => {
            log::info!("[{job}] using cached schema ({} columns)", registry.len());
            (registry, true)
        }
        None => {
            let registry = discover(api, job, &regions, &scopes)?;
            cache.save(&key, &registry);
            (registry, false)
        }
    };

    Ok(JobSchema {
        regions,
        scopes,
        registry,
        cache_hit,
    })
}

/// Export pass: write the header, then every row in region order.
///
/// Returns the sink with `(rows, columns)` written.
pub fn write_report<F: Fetch, W: Write>(
    api: &ApiClient<F>,
    job: Job,
    schema: &mut JobSchema,
    options: ReportOptions,
    out: W,
) -> Result<(W, usize, usize), AppError> {
    let io_err = |e: std::io::Error| AppError::new(2, format!("Failed to write report for {job}: {e}"));

    let columns = ordered_columns(&schema.registry);
    let mut table = TableWriter::start(
        out,
        columns,
        options.float_format,
        skip_predicate(job, &schema.registry, options.keep_empty_columns),
    )
    .map_err(io_err)?;

    let total = schema.regions.len();
    for (idx, region) in schema.regions.iter().enumerate() {
        log::info!("[{job}] writing ({}/{total}) {}", idx + 1, region.label());
        let lookup = schema.scopes.lookup(idx);
        for params in api.result_units(job, region)? {
            for record in api.ballot_box_results(&params)? {
                let row = map_row(lookup, &mut schema.registry, record);
                table.write_row(&row).map_err(io_err)?;
            }
        }
    }

    let rows = table.rows_written();
    let columns = table.columns_written();
    let out = table.finish().map_err(io_err)?;
    Ok((out, rows, columns))
}

/// Run one job end to end, writing its report under `config.out_dir`.
pub fn run_job<F: Fetch>(
    api: &ApiClient<F>,
    job: Job,
    cache: &SchemaCache,
    config: &ExportConfig,
    clock: &dyn Clock,
) -> Result<ExportSummary, AppError> {
    let mut schema = prepare_schema(api, job, cache).map_err(|e| e.context(format!("{job}: schema pass")))?;

    let path = report_path(&config.out_dir, job, clock);
    log::info!("[{job}] creating {}", path.display());
    let file = create_report(&path)?;

    let (_, rows, columns) = write_report(api, job, &mut schema, ReportOptions::from(config), file)
        .map_err(|e| e.context(format!("{job}: export pass")))?;

    Ok(ExportSummary {
        job,
        path,
        regions: schema.regions.len(),
        rows,
        columns,
        cache_hit: schema.cache_hit,
    })
}
