//! Per-file bundling pipeline and batch orchestration.
//!
//! One INF file flows through: decode, extract, resolve version format,
//! hash payload, render metainfo, write the document beside the INF, then
//! hand every file in the INF's directory to `gcab`. Directory and MSI
//! inputs fan out to the same per-file pipeline; each file carries its own
//! outcome so one bad package never abandons the rest of a batch.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tempfile::TempDir;
use tracing::{error, info, warn};
use walkdir::WalkDir;

use crate::domain::{Result, SkipReason};
use crate::hash::hash_payload;
use crate::inf::extract_record;
use crate::metainfo::{self, MetainfoContext, BUILTIN_TEMPLATE};
use crate::tools::ToolContext;
use crate::encoding;
use crate::version_format;

/// Run-level settings shared by every processed file.
#[derive(Debug, Clone)]
pub struct BundleOptions {
    /// Where cabinet bundles are written. Created if absent.
    pub output_dir: PathBuf,
    /// Device-family identifier substituted into the metainfo document.
    pub model_name: String,
    /// Custom metainfo template; the built-in one is used when `None`.
    pub template: Option<PathBuf>,
}

/// Result of processing one INF file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    Bundled { cab: PathBuf },
    Skipped(SkipReason),
}

/// One row of the batch report.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FileReport {
    Bundled { inf: PathBuf, cab: PathBuf },
    Skipped { inf: PathBuf, skip: SkipReason },
    Failed { inf: PathBuf, error: String },
}

/// Aggregated outcomes of a multi-file run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchReport {
    pub files: Vec<FileReport>,
}

impl BatchReport {
    pub fn bundled(&self) -> usize {
        self.files
            .iter()
            .filter(|f| matches!(f, FileReport::Bundled { .. }))
            .count()
    }

    pub fn skipped(&self) -> usize {
        self.files
            .iter()
            .filter(|f| matches!(f, FileReport::Skipped { .. }))
            .count()
    }

    pub fn failed(&self) -> usize {
        self.files
            .iter()
            .filter(|f| matches!(f, FileReport::Failed { .. }))
            .count()
    }

    pub fn has_failures(&self) -> bool {
        self.failed() > 0
    }

    fn push_outcome(&mut self, inf: &Path, result: Result<FileOutcome>) {
        let report = match result {
            Ok(FileOutcome::Bundled { cab }) => FileReport::Bundled {
                inf: inf.to_path_buf(),
                cab,
            },
            Ok(FileOutcome::Skipped(skip)) => FileReport::Skipped {
                inf: inf.to_path_buf(),
                skip,
            },
            Err(err) => {
                error!(inf = %inf.display(), error = %err, "bundling failed");
                FileReport::Failed {
                    inf: inf.to_path_buf(),
                    error: err.to_string(),
                }
            }
        };
        self.files.push(report);
    }
}

/// Process a single driver-description file end to end.
pub fn process_inf(
    tools: &ToolContext,
    inf_path: &Path,
    opts: &BundleOptions,
) -> Result<FileOutcome> {
    let inf_name = inf_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let inf_dir = inf_path.parent().unwrap_or_else(|| Path::new("."));

    let text = encoding::read_to_string(inf_path)?;

    let record = match extract_record(&text) {
        Ok(record) => record,
        Err(missing) => {
            warn!(inf = %inf_path.display(), %missing, "skipping");
            return Ok(FileOutcome::Skipped(SkipReason::MissingFields {
                fields: missing.0,
            }));
        }
    };

    let Some(format) = version_format::resolve(record.firmware_version, &record.driver_version)
    else {
        let skip = SkipReason::NoVersionFormat {
            firmware_version: record.firmware_version,
            driver_version: record.driver_version.clone(),
        };
        warn!(inf = %inf_path.display(), %skip, "skipping");
        return Ok(FileOutcome::Skipped(skip));
    };

    let digests = hash_payload(&inf_dir.join(&record.firmware_file))?;

    let template = match &opts.template {
        Some(path) => metainfo::load_template(path)?,
        None => BUILTIN_TEMPLATE.to_string(),
    };
    let document = metainfo::render(
        &template,
        &MetainfoContext {
            record: &record,
            format,
            digests: &digests,
            inf_name: &inf_name,
            model_name: &opts.model_name,
        },
    )?;

    let metainfo_path = inf_dir.join(format!("{inf_name}.metainfo.xml"));
    fs::write(&metainfo_path, document)?;

    fs::create_dir_all(&opts.output_dir)?;
    let cab_path = opts
        .output_dir
        .join(format!("{inf_name}_{}.cab", record.firmware_version));

    let inputs = package_inputs(inf_dir)?;
    tools.create_cab(&cab_path, &inputs)?;

    info!(
        inf = %inf_path.display(),
        cab = %cab_path.display(),
        format = format.name(),
        "bundled"
    );
    Ok(FileOutcome::Bundled { cab: cab_path })
}

/// Every regular file in the INF's directory, sorted for a stable gcab
/// argument order.
fn package_inputs(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut inputs: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .collect();
    inputs.sort();
    Ok(inputs)
}

/// Recursively discover `*.inf` files under `dir`, sorted.
pub fn discover_infs(dir: &Path) -> Vec<PathBuf> {
    let mut found: Vec<PathBuf> = WalkDir::new(dir)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| {
            path.extension()
                .map(|ext| ext.eq_ignore_ascii_case("inf"))
                .unwrap_or(false)
        })
        .collect();
    found.sort();
    found
}

/// Process every INF under `dir`, aggregating per-file outcomes. A failed
/// file is recorded and the batch continues.
pub fn process_dir(tools: &ToolContext, dir: &Path, opts: &BundleOptions) -> BatchReport {
    let mut report = BatchReport::default();
    for inf_path in discover_infs(dir) {
        let result = process_inf(tools, &inf_path, opts);
        report.push_outcome(&inf_path, result);
    }
    report
}

/// Expand an MSI installer into a scoped temporary directory, then process
/// it as a directory batch. The extraction directory is removed on every
/// exit path when the `TempDir` guard drops.
pub fn process_msi(tools: &ToolContext, msi: &Path, opts: &BundleOptions) -> Result<BatchReport> {
    let tempdir = TempDir::new()?;
    info!(msi = %msi.display(), dest = %tempdir.path().display(), "expanding installer");
    tools.extract_msi(msi, tempdir.path())?;
    Ok(process_dir(tools, tempdir.path(), opts))
}
