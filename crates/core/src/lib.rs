//! recursive-wrapper - Propagates Gradle wrapper updates through included builds
//!
//! This crate provides functionality to:
//! - Discover the builds a root build includes, directly and transitively
//! - Bootstrap missing wrapper files into included builds
//! - Run the wrapper task in every included build with the root's settings
//! - Generate the init script that carries the propagation into nested builds
pub mod bootstrap;
pub mod build;
pub mod config;
pub mod discovery;
pub mod error;
pub mod host;
pub mod init_script;
pub mod invoker;
pub mod params;
pub mod plugin;
pub mod wrapper;

// Re-export commonly used types and traits
pub use error::{Error, Result};

pub use bootstrap::{BootstrapReport, BootstrapStep, bootstrap_wrapper};
pub use build::BuildNode;
pub use config::{Config, PluginCoordinates};
pub use discovery::{DiscoveryScope, discover_included_builds, walk_tree};
pub use host::{BuildHost, Invocation, LocalBuild, WrapperOptions};
pub use invoker::{Launcher, ProcessExit, ProcessRunner, SystemProcessRunner, WrapperInvocation};
pub use params::{
    DependencyVerification, DistributionType, NetworkTimeout, ShowStacktrace,
    WrapperParameterSet, WrapperTaskConfig,
};
pub use plugin::{Activation, AppliedPlugin, PlanReport, RecursiveWrapper, UpdatePlan};
pub use wrapper::{GradleVersion, WrapperProperties};
