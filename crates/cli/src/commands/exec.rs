use anyhow::{Context, Result};
use recursive_wrapper_core::{
    Activation, BuildHost, Config, Error, Launcher, LocalBuild, ProcessRunner, RecursiveWrapper,
    ShowStacktrace, SystemProcessRunner, UpdatePlan,
};
use std::path::Path;
use tracing::{debug, info};

use crate::cli::WrapperArgs;
use crate::display;
use crate::utils::resolve_project_dir;

/// Exit code after SIGINT, as shells report it
const INTERRUPTED_EXIT_CODE: i32 = 130;

pub fn exec_command(tasks: &[String], args: &WrapperArgs) -> Result<()> {
    let (project_dir, config) = load_config(args)?;
    run_tasks(&project_dir, config, tasks, args)
}

/// Root directory plus its config, with command-line overrides applied
pub(crate) fn load_config(args: &WrapperArgs) -> Result<(std::path::PathBuf, Config)> {
    let project_dir = resolve_project_dir(args.project_dir.as_deref())?;
    let mut config = Config::load_for_build(&project_dir)
        .with_context(|| format!("Failed to load configuration in {}", project_dir.display()))?;
    if args.parallel {
        config.parallel = true;
    }
    Ok((project_dir, config))
}

pub(crate) fn run_tasks(
    project_dir: &Path,
    config: Config,
    tasks: &[String],
    args: &WrapperArgs,
) -> Result<()> {
    let build = LocalBuild::open(project_dir, args.to_invocation(tasks))
        .with_context(|| format!("Failed to open build at {}", project_dir.display()))?;

    let task_name = config.task.clone();
    let applied = RecursiveWrapper::new(config).apply(&build)?;
    debug!(
        "Registered wrapper tasks for {} included builds",
        applied.registered().len()
    );

    match applied.when_ready(&build)? {
        Activation::Inactive => run_on_root(&build, tasks, args.dry_run),
        Activation::Active(plan) => {
            run_plan(plan, args.dry_run)?;
            let remaining: Vec<String> = tasks
                .iter()
                .filter(|task| task.trim_start_matches(':') != task_name)
                .cloned()
                .collect();
            if remaining.is_empty() {
                Ok(())
            } else {
                run_on_root(&build, &remaining, args.dry_run)
            }
        }
    }
}

fn run_plan(plan: UpdatePlan, dry_run: bool) -> Result<()> {
    if dry_run {
        display::print_plan(&plan);
        return Ok(());
    }

    // Signals skip destructors, so the plan guard never runs on Ctrl-C
    let script = plan.init_script_path().to_path_buf();
    ctrlc::set_handler(move || {
        if let Err(e) = std::fs::remove_file(&script) {
            debug!("Could not remove {}: {}", script.display(), e);
        }
        std::process::exit(INTERRUPTED_EXIT_CODE);
    })
    .context("Failed to install the interrupt handler")?;

    println!(
        "🔄 Updating wrapper of {} included build(s), then the root build",
        plan.invocations.len()
    );
    match plan.execute(&SystemProcessRunner) {
        Ok(report) => {
            display::print_report(&report);
            Ok(())
        }
        Err(Error::ChildFailed { build, dir, code }) => {
            eprintln!(
                "❌ Wrapper update of '{}' failed in {}",
                build,
                dir.display()
            );
            std::process::exit(code.unwrap_or(1));
        }
        Err(e) => Err(e).context("Wrapper update failed"),
    }
}

/// Run tasks with the root launcher alone, without any propagation
fn run_on_root(build: &LocalBuild, tasks: &[String], dry_run: bool) -> Result<()> {
    let launcher = Launcher::current();
    let args = root_task_args(build, tasks);
    let shell_cmd = format!("{} {}", launcher.relative_command(), args.join(" "));

    if dry_run {
        println!("{}", shell_cmd);
        println!("Working directory: {}", build.project_dir().display());
        return Ok(());
    }

    info!("Running: {}", shell_cmd);
    let program = build.project_dir().join(launcher.file_name());
    let exit = SystemProcessRunner
        .run(build.project_dir(), &program, &args)
        .with_context(|| format!("Failed to execute: {}", shell_cmd))?;

    if !exit.success() {
        std::process::exit(exit.code.unwrap_or(1));
    }
    Ok(())
}

fn root_task_args(build: &LocalBuild, tasks: &[String]) -> Vec<String> {
    let mut args = tasks.to_vec();
    if let Some(mode) = build.dependency_verification() {
        args.push(format!("--dependency-verification={mode}"));
    }
    match build.show_stacktrace() {
        ShowStacktrace::InternalExceptions => {}
        ShowStacktrace::Always => args.push("--stacktrace".to_string()),
        ShowStacktrace::AlwaysFull => args.push("--full-stacktrace".to_string()),
    }
    for (key, value) in &build.invocation().system_properties {
        if value.is_empty() {
            args.push(format!("-D{key}"));
        } else {
            args.push(format!("-D{key}={value}"));
        }
    }
    args
}

#[cfg(test)]
mod tests {
    use super::*;
    use recursive_wrapper_core::{DependencyVerification, Invocation};
    use tempfile::TempDir;

    #[test]
    fn test_root_task_args_forward_start_parameters() {
        let temp_dir = TempDir::new().unwrap();
        let mut invocation = Invocation::new(["help"])
            .with_system_property("recursive-wrapper.testing")
            .with_system_property("a=b");
        invocation.show_stacktrace = ShowStacktrace::AlwaysFull;
        invocation.dependency_verification = Some(DependencyVerification::Off);
        let build = LocalBuild::open(temp_dir.path(), invocation).unwrap();

        let args = root_task_args(&build, &["help".to_string(), "tasks".to_string()]);
        assert_eq!(
            args,
            vec![
                "help",
                "tasks",
                "--dependency-verification=off",
                "--full-stacktrace",
                "-Da=b",
                "-Drecursive-wrapper.testing"
            ]
        );
    }
}
