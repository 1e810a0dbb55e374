//! Capabilities consumed from the host build tool

use crate::build::BuildNode;
use crate::config::testing_from_env;
use crate::discovery::{DiscoveryScope, discover_included_builds, find_settings_file};
use crate::error::{Error, Result};
use crate::params::{
    DependencyVerification, DistributionType, NetworkTimeout, ShowStacktrace, StartParameters,
    TESTING_PROPERTY, WrapperTaskConfig,
};
use crate::wrapper::{GradleVersion, WrapperProperties, properties_path};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// What the propagation needs to know about the build it runs in
pub trait BuildHost {
    fn project_dir(&self) -> &Path;

    /// Whether this project belongs to an enclosing build
    fn has_parent(&self) -> bool;

    /// Direct includes known to this build
    fn included_builds(&self) -> Result<Vec<BuildNode>>;

    /// Whether a task path such as `:wrapper` is part of the current execution plan
    fn is_task_requested(&self, task_path: &str) -> bool;

    /// Wrapper task properties, including command-line overrides
    fn wrapper_task(&self) -> Result<WrapperTaskConfig>;

    fn show_stacktrace(&self) -> ShowStacktrace;

    fn system_property(&self, key: &str) -> Option<String>;

    /// Explicit `--dependency-verification` mode of the current invocation
    fn dependency_verification(&self) -> Option<DependencyVerification> {
        None
    }

    fn start_parameters(&self) -> StartParameters {
        StartParameters {
            show_stacktrace: self.show_stacktrace(),
            dependency_verification: self.dependency_verification(),
            testing: self.system_property(TESTING_PROPERTY).is_some(),
        }
    }
}

/// Wrapper task overrides given on the command line
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WrapperOptions {
    pub gradle_version: Option<String>,
    pub distribution_type: Option<DistributionType>,
    pub distribution_url: Option<String>,
    pub distribution_sha256_sum: Option<String>,
    pub network_timeout: Option<u32>,
}

/// One requested run against a local build
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Invocation {
    pub tasks: Vec<String>,
    pub wrapper: WrapperOptions,
    pub show_stacktrace: ShowStacktrace,
    pub dependency_verification: Option<DependencyVerification>,
    pub system_properties: BTreeMap<String, String>,
}

impl Invocation {
    pub fn new(tasks: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            tasks: tasks.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    /// Parse a `key[=value]` system property as given to `-D`
    pub fn with_system_property(mut self, definition: &str) -> Self {
        let (key, value) = definition.split_once('=').unwrap_or((definition, ""));
        self.system_properties
            .insert(key.to_string(), value.to_string());
        self
    }
}

/// A build directory on the local filesystem
#[derive(Debug, Clone)]
pub struct LocalBuild {
    project_dir: PathBuf,
    parent: Option<PathBuf>,
    included: bool,
    invocation: Invocation,
}

impl LocalBuild {
    pub fn open(project_dir: &Path, invocation: Invocation) -> Result<Self> {
        if !project_dir.is_dir() {
            return Err(Error::ConfigError(format!(
                "Project directory {} does not exist",
                project_dir.display()
            )));
        }
        let project_dir = std::path::absolute(project_dir)?;

        // Without its own settings script a directory belongs to the nearest build above it
        let parent = if find_settings_file(&project_dir).is_some() {
            None
        } else {
            project_dir
                .ancestors()
                .skip(1)
                .find(|dir| find_settings_file(dir).is_some())
                .map(Path::to_path_buf)
        };
        if let Some(parent) = &parent {
            debug!(
                "{} is a subproject of {}",
                project_dir.display(),
                parent.display()
            );
        }

        Ok(Self {
            project_dir,
            parent,
            included: false,
            invocation,
        })
    }

    /// Mark this build as included by another one, as when it runs through the
    /// init script. Such builds do not see `pluginManagement` includes.
    pub fn as_included(mut self) -> Self {
        self.included = true;
        self
    }

    pub fn invocation(&self) -> &Invocation {
        &self.invocation
    }

    pub fn parent_dir(&self) -> Option<&Path> {
        self.parent.as_deref()
    }

    /// Version the build currently runs with, according to its wrapper
    pub fn current_gradle_version(&self) -> Option<GradleVersion> {
        let path = properties_path(&self.project_dir);
        match WrapperProperties::load(&path) {
            Ok(properties) => properties.distribution().map(|(version, _)| version),
            Err(e) => {
                debug!("No readable wrapper properties at {}: {}", path.display(), e);
                None
            }
        }
    }
}

impl BuildHost for LocalBuild {
    fn project_dir(&self) -> &Path {
        &self.project_dir
    }

    fn has_parent(&self) -> bool {
        self.parent.is_some()
    }

    fn included_builds(&self) -> Result<Vec<BuildNode>> {
        let scope = if self.included || self.has_parent() {
            DiscoveryScope::Nested
        } else {
            DiscoveryScope::Root
        };
        discover_included_builds(&self.project_dir, scope)
    }

    fn is_task_requested(&self, task_path: &str) -> bool {
        let name = task_path.trim_start_matches(':');
        self.invocation
            .tasks
            .iter()
            .any(|task| task == task_path || task == name)
    }

    fn wrapper_task(&self) -> Result<WrapperTaskConfig> {
        let options = &self.invocation.wrapper;
        let current = self.current_gradle_version();

        let gradle_version = options
            .gradle_version
            .clone()
            .or_else(|| current.as_ref().map(|v| v.as_str().to_string()));
        if options.distribution_url.is_none() && gradle_version.is_none() {
            return Err(Error::ConfigError(format!(
                "Cannot tell which Gradle version {} uses, pass --gradle-version or --gradle-distribution-url",
                self.project_dir.display()
            )));
        }

        let network_timeout = match &current {
            Some(version) if !version.supports_network_timeout() => {
                if options.network_timeout.is_some() {
                    warn!("Gradle {} has no network timeout setting, ignoring it", version);
                }
                NetworkTimeout::Unsupported
            }
            _ => NetworkTimeout::Supported(options.network_timeout),
        };

        Ok(WrapperTaskConfig {
            distribution_url: options.distribution_url.clone(),
            gradle_version,
            distribution_type: options.distribution_type.unwrap_or_default(),
            distribution_sha256_sum: options.distribution_sha256_sum.clone(),
            network_timeout,
        })
    }

    fn show_stacktrace(&self) -> ShowStacktrace {
        self.invocation.show_stacktrace
    }

    fn dependency_verification(&self) -> Option<DependencyVerification> {
        self.invocation.dependency_verification
    }

    fn system_property(&self, key: &str) -> Option<String> {
        if let Some(value) = self.invocation.system_properties.get(key) {
            return Some(value.clone());
        }
        if key == TESTING_PROPERTY && testing_from_env() {
            return Some(String::new());
        }
        None
    }
}
