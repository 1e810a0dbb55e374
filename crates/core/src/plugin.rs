//! Activation of recursive wrapper updates on a root build
//!
//! Applying registers one bootstrap step and one wrapper invocation per
//! included build. Once the execution plan is known, the wrapper task settings
//! are read, an init script is written and an [`UpdatePlan`] comes out. Each
//! child loads the init script, which applies the same logic to its own
//! includes, so nested builds are reached without recursing here.

use crate::bootstrap::{BootstrapReport, BootstrapStep};
use crate::build::{BuildNode, ensure_unique_names};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::host::BuildHost;
use crate::init_script::{self, InitScript};
use crate::invoker::{Launcher, ProcessRunner, WrapperInvocation};
use crate::params::WrapperParameterSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use tracing::{debug, info};

pub struct RecursiveWrapper {
    config: Config,
    launcher: Launcher,
}

impl RecursiveWrapper {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            launcher: Launcher::current(),
        }
    }

    /// Use a fixed launcher instead of the one for the running OS
    pub fn with_launcher(mut self, launcher: Launcher) -> Self {
        self.launcher = launcher;
        self
    }

    /// Register per-build tasks on a root build. Spawns nothing.
    pub fn apply<H: BuildHost>(&self, host: &H) -> Result<AppliedPlugin> {
        if host.has_parent() {
            return Err(Error::NotRootProject(host.project_dir().to_path_buf()));
        }

        let included_builds = host.included_builds()?;
        ensure_unique_names(&included_builds)?;

        let root_dir = host.project_dir().to_path_buf();
        let registered = included_builds
            .into_iter()
            .map(|build| {
                let bootstrap = BootstrapStep {
                    task_name: build.bootstrap_task_name(),
                    source_dir: root_dir.clone(),
                    target_dir: build.root_dir.clone(),
                };
                debug!(
                    "Registered {} and {}",
                    bootstrap.task_name,
                    build.wrapper_task_name()
                );
                RegisteredBuild { build, bootstrap }
            })
            .collect();

        Ok(AppliedPlugin {
            config: self.config.clone(),
            launcher: self.launcher,
            root_dir,
            registered,
        })
    }
}

#[derive(Debug, Clone)]
pub struct RegisteredBuild {
    pub build: BuildNode,
    pub bootstrap: BootstrapStep,
}

/// Plugin state between configuration and execution
#[derive(Debug)]
pub struct AppliedPlugin {
    config: Config,
    launcher: Launcher,
    root_dir: PathBuf,
    registered: Vec<RegisteredBuild>,
}

/// Outcome of the task graph check
#[derive(Debug)]
pub enum Activation {
    /// The wrapper task is not requested, nothing to propagate
    Inactive,
    Active(UpdatePlan),
}

impl AppliedPlugin {
    pub fn registered(&self) -> &[RegisteredBuild] {
        &self.registered
    }

    /// Read the final wrapper settings and build the plan, if the wrapper task runs at all.
    /// Must be called after command-line overrides are known.
    pub fn when_ready<H: BuildHost>(self, host: &H) -> Result<Activation> {
        let task_path = self.config.task_path();
        if !host.is_task_requested(&task_path) {
            debug!("{} is not requested, skipping propagation", task_path);
            return Ok(Activation::Inactive);
        }

        let task = host.wrapper_task()?;
        let start = host.start_parameters();

        let script = init_script::render(&self.config.plugin, start.testing);
        let init_script = InitScript::create(&script)?;
        let parameters = Arc::new(WrapperParameterSet::synthesize(
            &task,
            &start,
            init_script.path(),
        )?);
        let root_parameters = Arc::new(WrapperParameterSet::for_root(&task, &start)?);

        let mut bootstraps = Vec::with_capacity(self.registered.len());
        let mut invocations = Vec::with_capacity(self.registered.len());
        for RegisteredBuild { build, bootstrap } in self.registered {
            bootstraps.push(bootstrap);
            invocations.push(WrapperInvocation {
                build: build.name,
                working_dir: build.root_dir,
                launcher: self.launcher,
                task_path: task_path.clone(),
                parameters: Arc::clone(&parameters),
            });
        }

        let root = BuildNode::new(&self.root_dir);
        let root_update = WrapperInvocation {
            build: root.name,
            working_dir: self.root_dir,
            launcher: self.launcher,
            task_path,
            parameters: root_parameters,
        };

        Ok(Activation::Active(UpdatePlan {
            bootstraps,
            invocations,
            root_update,
            parallel: self.config.parallel,
            init_script,
        }))
    }
}

/// Ordered work of one wrapper update: all bootstraps, then every included
/// build, then the root itself. Owns the init script until it is dropped.
#[derive(Debug)]
pub struct UpdatePlan {
    pub bootstraps: Vec<BootstrapStep>,
    pub invocations: Vec<WrapperInvocation>,
    pub root_update: WrapperInvocation,
    pub parallel: bool,
    init_script: InitScript,
}

/// What an executed plan did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlanReport {
    pub bootstrapped: Vec<BootstrapReport>,
    pub updated: Vec<String>,
}

impl UpdatePlan {
    pub fn init_script_path(&self) -> &std::path::Path {
        self.init_script.path()
    }

    pub fn parameters(&self) -> Option<&WrapperParameterSet> {
        self.invocations.first().map(|i| i.parameters.as_ref())
    }

    /// Human-readable steps, in execution order
    pub fn describe(&self) -> Vec<String> {
        let mut steps = Vec::new();
        for bootstrap in &self.bootstraps {
            steps.push(format!(
                "{}: copy missing wrapper files from {} to {}",
                bootstrap.task_name,
                bootstrap.source_dir.display(),
                bootstrap.target_dir.display()
            ));
        }
        let invocations = self.invocations.iter().chain(std::iter::once(&self.root_update));
        for invocation in invocations {
            steps.push(format!(
                "(cd {} && {})",
                invocation.working_dir.display(),
                invocation.to_shell_command()
            ));
        }
        steps
    }

    /// Run the plan. Any failure aborts the rest; a failed bootstrap means no
    /// child is ever spawned.
    pub fn execute(self, runner: &dyn ProcessRunner) -> Result<PlanReport> {
        let mut report = PlanReport::default();

        for bootstrap in &self.bootstraps {
            report.bootstrapped.push(bootstrap.run()?);
        }

        if self.parallel && self.invocations.len() > 1 {
            info!(
                "Updating {} included builds concurrently",
                self.invocations.len()
            );
            let results: Vec<Result<()>> = thread::scope(|scope| {
                let handles: Vec<_> = self
                    .invocations
                    .iter()
                    .map(|invocation| scope.spawn(move || invocation.execute(runner)))
                    .collect();
                handles
                    .into_iter()
                    .map(|handle| {
                        handle
                            .join()
                            .unwrap_or_else(|panic| std::panic::resume_unwind(panic))
                    })
                    .collect()
            });
            for result in results {
                result?;
            }
        } else {
            for invocation in &self.invocations {
                invocation.execute(runner)?;
            }
        }
        report
            .updated
            .extend(self.invocations.iter().map(|i| i.build.clone()));

        self.root_update.execute(runner)?;
        report.updated.push(self.root_update.build.clone());

        debug!(
            "Wrapper update finished, removing {}",
            self.init_script.path().display()
        );
        Ok(report)
    }
}
