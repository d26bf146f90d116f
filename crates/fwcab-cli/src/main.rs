//! fwcab - repackage Windows firmware driver packages as fwupd cabinets.
//!
//! Exactly one input selector is accepted per run:
//!
//! - `--inf`: process a single driver-description file
//! - `--dir`: recursively process all `*.inf` files under a directory
//! - `--msi`: expand an installer archive, then process its INFs

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgGroup, Parser};
use tracing::Level;

use fwcab_core::{BatchReport, BundleOptions, FileOutcome, FileReport, ToolContext};

#[derive(Parser)]
#[command(name = "fwcab")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Convert Windows INF firmware driver packages into fwupd cabinet bundles", long_about = None)]
#[command(group(ArgGroup::new("input").args(["inf", "dir", "msi"]).multiple(false)))]
struct Cli {
    /// Process a single driver-description (.inf) file
    #[arg(short, long)]
    inf: Option<PathBuf>,

    /// Recursively process all .inf files under a directory
    #[arg(short, long)]
    dir: Option<PathBuf>,

    /// Expand an MSI installer archive, then process its .inf files
    #[arg(short, long)]
    msi: Option<PathBuf>,

    /// Directory for generated .cab bundles (created if absent)
    #[arg(long, default_value = "output")]
    output_dir: PathBuf,

    /// Device-family name written into the metainfo document
    #[arg(long, default_value = "Surface Pro (2017)")]
    model: String,

    /// Custom metainfo template (built-in template used if omitted)
    #[arg(long)]
    template: Option<PathBuf>,

    /// Write a machine-readable batch report to this path
    #[arg(long)]
    report_json: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    fwcab_core::init_tracing(cli.json, level);

    let opts = BundleOptions {
        output_dir: cli.output_dir.clone(),
        model_name: cli.model.clone(),
        template: cli.template.clone(),
    };
    let tools = ToolContext::detect();

    let report = if let Some(inf) = &cli.inf {
        // Single-file mode: a hard failure aborts the run directly.
        let outcome = fwcab_core::process_inf(&tools, inf, &opts)
            .with_context(|| format!("failed to process {}", inf.display()))?;
        let mut report = BatchReport::default();
        report.files.push(match outcome {
            FileOutcome::Bundled { cab } => FileReport::Bundled {
                inf: inf.clone(),
                cab,
            },
            FileOutcome::Skipped(skip) => FileReport::Skipped {
                inf: inf.clone(),
                skip,
            },
        });
        report
    } else if let Some(dir) = &cli.dir {
        fwcab_core::process_dir(&tools, dir, &opts)
    } else if let Some(msi) = &cli.msi {
        fwcab_core::process_msi(&tools, msi, &opts)
            .with_context(|| format!("failed to process {}", msi.display()))?
    } else {
        println!("no input given: pass one of --inf, --dir or --msi");
        return Ok(());
    };

    print_report(&report);

    if let Some(path) = &cli.report_json {
        let json = serde_json::to_string_pretty(&report)?;
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
    }

    if report.has_failures() {
        anyhow::bail!(
            "{} of {} files failed",
            report.failed(),
            report.files.len()
        );
    }
    Ok(())
}

fn print_report(report: &BatchReport) {
    for file in &report.files {
        match file {
            FileReport::Bundled { inf, cab } => {
                println!("BUNDLED {} -> {}", inf.display(), cab.display());
            }
            FileReport::Skipped { inf, skip } => {
                println!("SKIP    {} ({skip})", inf.display());
            }
            FileReport::Failed { inf, error } => {
                println!("FAILED  {} ({error})", inf.display());
            }
        }
    }
    println!(
        "Summary: {} bundled, {} skipped, {} failed",
        report.bundled(),
        report.skipped(),
        report.failed()
    );
}
