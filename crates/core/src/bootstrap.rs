//! Copy-if-absent bootstrapping of wrapper files into included builds

use crate::error::{Error, Result};
use crate::wrapper::WRAPPER_FILES;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Files copied by one bootstrap run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BootstrapReport {
    pub copied: Vec<PathBuf>,
}

impl BootstrapReport {
    pub fn is_noop(&self) -> bool {
        self.copied.is_empty()
    }
}

/// Bootstrap step for one included build
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootstrapStep {
    pub task_name: String,
    pub source_dir: PathBuf,
    pub target_dir: PathBuf,
}

impl BootstrapStep {
    pub fn run(&self) -> Result<BootstrapReport> {
        debug!("Running {}", self.task_name);
        bootstrap_wrapper(&self.source_dir, &self.target_dir)
    }
}

/// Make sure `target_dir` has every wrapper file, copying missing ones from
/// `source_dir`. Existing files are never overwritten.
pub fn bootstrap_wrapper(source_dir: &Path, target_dir: &Path) -> Result<BootstrapReport> {
    let mut report = BootstrapReport::default();

    for file in WRAPPER_FILES {
        let target = target_dir.join(file);
        if target.exists() {
            continue;
        }

        let source = source_dir.join(file);
        if !source.is_file() {
            return Err(Error::MissingWrapperFile(source));
        }

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|e| bootstrap_error(parent, e))?;
        }
        fs::copy(&source, &target).map_err(|e| bootstrap_error(&target, e))?;

        info!("Bootstrapped {}", target.display());
        report.copied.push(target);
    }

    Ok(report)
}

fn bootstrap_error(path: &Path, source: io::Error) -> Error {
    Error::Bootstrap {
        path: path.to_path_buf(),
        source,
    }
}
