use anyhow::{Context, Result};
use recursive_wrapper_core::wrapper::{missing_files, properties_path};
use recursive_wrapper_core::{BuildNode, DistributionType, WrapperProperties, walk_tree};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::display;
use crate::utils::resolve_project_dir;

/// Wrapper state of one build of the inclusion tree
#[derive(Debug, Clone, Serialize)]
pub struct BuildStatus {
    pub name: String,
    pub root_dir: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gradle_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distribution_type: Option<DistributionType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distribution_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distribution_sha256_sum: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub missing_files: Vec<&'static str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub included_builds: Vec<BuildStatus>,
}

impl BuildStatus {
    pub fn collect(node: &BuildNode) -> Self {
        let properties = match WrapperProperties::load(&properties_path(&node.root_dir)) {
            Ok(properties) => Some(properties),
            Err(e) => {
                debug!("No wrapper properties for {}: {}", node.name, e);
                None
            }
        };
        let distribution = properties.as_ref().and_then(|p| p.distribution());

        Self {
            name: node.name.clone(),
            root_dir: node.root_dir.clone(),
            gradle_version: distribution
                .as_ref()
                .map(|(version, _)| version.as_str().to_string()),
            distribution_type: distribution.map(|(_, distribution_type)| distribution_type),
            distribution_url: properties
                .as_ref()
                .and_then(|p| p.distribution_url().map(str::to_string)),
            distribution_sha256_sum: properties
                .as_ref()
                .and_then(|p| p.distribution_sha256_sum().map(str::to_string)),
            missing_files: missing_files(&node.root_dir),
            included_builds: node.included_builds.iter().map(Self::collect).collect(),
        }
    }
}

pub fn status_command(project_dir: Option<&Path>, json: bool) -> Result<()> {
    let project_dir = resolve_project_dir(project_dir)?;
    let tree = walk_tree(&project_dir).with_context(|| {
        format!("Failed to read the builds included by {}", project_dir.display())
    })?;
    let status = BuildStatus::collect(&tree);

    if json {
        println!("{}", serde_json::to_string_pretty(&status)?);
    } else {
        print!("{}", display::format_status_tree(&status));
    }
    Ok(())
}
