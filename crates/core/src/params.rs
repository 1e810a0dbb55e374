//! Wrapper task settings and the parameter list forwarded to included builds

use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// System property that marks test runs. Forwarded to every child so that the
/// generated init script skips resolving the published plugin.
pub const TESTING_PROPERTY: &str = "recursive-wrapper.testing";

/// Wrapper distribution flavour
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistributionType {
    #[default]
    Bin,
    All,
}

impl DistributionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DistributionType::Bin => "bin",
            DistributionType::All => "all",
        }
    }
}

impl fmt::Display for DistributionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DistributionType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "bin" => Ok(DistributionType::Bin),
            "all" => Ok(DistributionType::All),
            other => Err(Error::ConfigError(format!(
                "Unknown distribution type '{other}', expected 'bin' or 'all'"
            ))),
        }
    }
}

/// Stacktrace visibility requested for the current invocation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ShowStacktrace {
    #[default]
    InternalExceptions,
    Always,
    AlwaysFull,
}

/// Dependency verification mode, as given to `--dependency-verification`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DependencyVerification {
    Strict,
    Lenient,
    Off,
}

impl DependencyVerification {
    pub fn as_str(&self) -> &'static str {
        match self {
            DependencyVerification::Strict => "strict",
            DependencyVerification::Lenient => "lenient",
            DependencyVerification::Off => "off",
        }
    }
}

impl fmt::Display for DependencyVerification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DependencyVerification {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "strict" => Ok(DependencyVerification::Strict),
            "lenient" => Ok(DependencyVerification::Lenient),
            "off" => Ok(DependencyVerification::Off),
            other => Err(Error::ConfigError(format!(
                "Unknown dependency verification mode '{other}', expected 'strict', 'lenient' or 'off'"
            ))),
        }
    }
}

/// Network timeout of the wrapper task. Older hosts do not have the property at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkTimeout {
    Unsupported,
    Supported(Option<u32>),
}

impl NetworkTimeout {
    /// Configured value, or `None` when unset or not available on this host
    pub fn probe(&self) -> Option<u32> {
        match self {
            NetworkTimeout::Unsupported => None,
            NetworkTimeout::Supported(value) => *value,
        }
    }
}

impl Default for NetworkTimeout {
    fn default() -> Self {
        NetworkTimeout::Supported(None)
    }
}

/// Property bag of the configured wrapper task
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WrapperTaskConfig {
    pub distribution_url: Option<String>,
    pub gradle_version: Option<String>,
    pub distribution_type: DistributionType,
    pub distribution_sha256_sum: Option<String>,
    pub network_timeout: NetworkTimeout,
}

/// Settings of the root invocation that children inherit
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StartParameters {
    pub show_stacktrace: ShowStacktrace,
    /// Explicit `--dependency-verification` mode, forwarded to every build
    pub dependency_verification: Option<DependencyVerification>,
    pub testing: bool,
}

/// Ordered command-line parameters shared by every included build invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrapperParameterSet {
    args: Vec<String>,
}

impl WrapperParameterSet {
    /// Build the list forwarded to included builds. The order is fixed so that
    /// logged commands are reproducible.
    pub fn synthesize(
        task: &WrapperTaskConfig,
        start: &StartParameters,
        init_script: &Path,
    ) -> crate::Result<Self> {
        let mut args = Vec::new();
        push_distribution(&mut args, task)?;
        args.push("--no-daemon".to_string());
        args.push(format!("--init-script={}", init_script.display()));
        push_inherited(&mut args, start);
        Ok(Self { args })
    }

    /// Parameters for the root build's own update, which needs no init script
    pub fn for_root(task: &WrapperTaskConfig, start: &StartParameters) -> crate::Result<Self> {
        let mut args = Vec::new();
        push_distribution(&mut args, task)?;
        push_inherited(&mut args, start);
        Ok(Self { args })
    }

    pub fn as_slice(&self) -> &[String] {
        &self.args
    }

    pub fn contains(&self, arg: &str) -> bool {
        self.args.iter().any(|a| a == arg)
    }

    /// Value of a `--name=value` parameter
    pub fn value_of(&self, name: &str) -> Option<&str> {
        let prefix = format!("{name}=");
        self.args.iter().find_map(|arg| arg.strip_prefix(&prefix))
    }
}

fn push_distribution(args: &mut Vec<String>, task: &WrapperTaskConfig) -> crate::Result<()> {
    if let Some(url) = &task.distribution_url {
        args.push(format!("--gradle-distribution-url={url}"));
    } else if let Some(version) = &task.gradle_version {
        args.push(format!("--gradle-version={version}"));
        args.push(format!("--distribution-type={}", task.distribution_type));
    } else {
        return Err(Error::ConfigError(
            "The wrapper task has neither a distribution URL nor a Gradle version".to_string(),
        ));
    }

    if let Some(sum) = &task.distribution_sha256_sum {
        args.push(format!("--gradle-distribution-sha256-sum={sum}"));
    }

    if let Some(timeout) = task.network_timeout.probe() {
        args.push(format!("--network-timeout={timeout}"));
    }
    Ok(())
}

fn push_inherited(args: &mut Vec<String>, start: &StartParameters) {
    if let Some(mode) = start.dependency_verification {
        args.push(format!("--dependency-verification={mode}"));
    }
    // Full stacktraces stay with the root
    if start.show_stacktrace == ShowStacktrace::Always {
        args.push("--stacktrace".to_string());
    }
    if start.testing {
        args.push(format!("-D{TESTING_PROPERTY}"));
    }
}
