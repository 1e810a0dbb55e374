//! Build nodes of an inclusion tree

use crate::error::{Error, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// One build of the inclusion tree, as known to the current process
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildNode {
    /// Leaf directory name, which per-build task names are derived from
    pub name: String,
    pub root_dir: PathBuf,
    /// Direct includes. Left empty by discovery, which never looks past one level.
    pub included_builds: Vec<BuildNode>,
}

impl BuildNode {
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        let root_dir = root_dir.into();
        let name = leaf_name(&root_dir);
        Self {
            name,
            root_dir,
            included_builds: Vec::new(),
        }
    }

    pub fn with_included_builds(mut self, included_builds: Vec<BuildNode>) -> Self {
        self.included_builds = included_builds;
        self
    }

    /// Task that copies missing wrapper files into this build
    pub fn bootstrap_task_name(&self) -> String {
        format!("bootstrapWrapper{}", self.name)
    }

    /// Task that runs the wrapper update inside this build
    pub fn wrapper_task_name(&self) -> String {
        format!("wrapper{}", self.name)
    }
}

fn leaf_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Reject sibling builds whose leaf names collide, since their task names would too
pub fn ensure_unique_names(builds: &[BuildNode]) -> Result<()> {
    let mut seen: HashMap<&str, &Path> = HashMap::new();
    for build in builds {
        if let Some(first) = seen.insert(&build.name, &build.root_dir) {
            return Err(Error::AmbiguousBuildName {
                name: build.name.clone(),
                first: first.to_path_buf(),
                second: build.root_dir.clone(),
            });
        }
    }
    Ok(())
}
