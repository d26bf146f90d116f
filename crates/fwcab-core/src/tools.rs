//! External tool resolution and invocation.
//!
//! fwcab delegates archive work to two external programs: `gcab` writes the
//! cabinet bundle and `msiextract` expands MSI installers. Both are resolved
//! on `PATH` once per run; a missing tool is fatal and names the
//! executable.

use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::debug;

use crate::domain::{FwcabError, Result};

pub const GCAB: &str = "gcab";
pub const MSIEXTRACT: &str = "msiextract";

/// Resolved paths of the external tools, looked up once per run.
#[derive(Debug, Clone)]
pub struct ToolContext {
    pub gcab: Option<PathBuf>,
    pub msiextract: Option<PathBuf>,
}

impl ToolContext {
    /// Resolve both tools on `PATH`. Absence is not an error yet; it
    /// becomes one the first time the missing tool is needed.
    pub fn detect() -> Self {
        Self {
            gcab: which::which(GCAB).ok(),
            msiextract: which::which(MSIEXTRACT).ok(),
        }
    }

    fn require<'a>(tool: &'a Option<PathBuf>, name: &'static str) -> Result<&'a Path> {
        tool.as_deref().ok_or(FwcabError::ToolNotFound(name))
    }

    /// Compress `inputs` into a new cabinet archive at `output`.
    ///
    /// Invocation shape: `gcab -cn <output.cab> <input files...>`.
    pub fn create_cab(&self, output: &Path, inputs: &[PathBuf]) -> Result<()> {
        let gcab = Self::require(&self.gcab, GCAB)?;
        debug!(output = %output.display(), inputs = inputs.len(), "invoking gcab");

        let mut cmd = Command::new(gcab);
        cmd.arg("-cn").arg(output).args(inputs);
        run_checked(cmd, GCAB)
    }

    /// Expand an MSI installer archive into `dest`.
    ///
    /// Invocation shape: `msiextract -C <dest> <msi>`.
    pub fn extract_msi(&self, msi: &Path, dest: &Path) -> Result<()> {
        let msiextract = Self::require(&self.msiextract, MSIEXTRACT)?;
        debug!(msi = %msi.display(), dest = %dest.display(), "invoking msiextract");

        let mut cmd = Command::new(msiextract);
        cmd.arg("-C").arg(dest).arg(msi);
        run_checked(cmd, MSIEXTRACT)
    }
}

fn run_checked(mut cmd: Command, tool: &'static str) -> Result<()> {
    let output = cmd.output()?;
    if !output.status.success() {
        return Err(FwcabError::ToolFailed {
            tool,
            status: output.status.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }
    Ok(())
}
