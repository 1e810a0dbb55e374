use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use recursive_wrapper_core::{
    DependencyVerification, DistributionType, Invocation, ShowStacktrace, WrapperOptions,
};
use std::path::PathBuf;

use crate::commands::{bootstrap_command, exec_command, status_command, update_command};

#[derive(Parser, Debug)]
#[command(name = "recursive-wrapper")]
#[command(version, about, long_about = None)]
#[command(after_help = "ENVIRONMENT:\n    RUST_LOG=debug                 Enable debug logging\n    RECURSIVE_WRAPPER_TESTING=1    Same as -Drecursive-wrapper.testing")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Options shared by every command that runs the wrapper task
#[derive(Args, Debug, Clone, Default)]
pub struct WrapperArgs {
    /// Root build directory (defaults to the current directory)
    #[arg(short, long)]
    pub project_dir: Option<PathBuf>,

    /// Gradle version to update to
    #[arg(long)]
    pub gradle_version: Option<String>,

    /// Distribution flavour, `bin` or `all`
    #[arg(long)]
    pub distribution_type: Option<DistributionType>,

    /// Full distribution URL, takes precedence over the version
    #[arg(long)]
    pub gradle_distribution_url: Option<String>,

    /// Expected SHA-256 of the distribution
    #[arg(long)]
    pub gradle_distribution_sha256_sum: Option<String>,

    /// Network timeout in milliseconds (Gradle 7.6 and later)
    #[arg(long)]
    pub network_timeout: Option<u32>,

    /// Print stacktraces for user exceptions
    #[arg(short = 's', long)]
    pub stacktrace: bool,

    /// Print full stacktraces for all exceptions
    #[arg(short = 'S', long, conflicts_with = "stacktrace")]
    pub full_stacktrace: bool,

    /// Dependency verification mode for every build, `strict`, `lenient` or `off`
    #[arg(short = 'F', long, value_name = "MODE")]
    pub dependency_verification: Option<DependencyVerification>,

    /// System property forwarded to the build, e.g. -Drecursive-wrapper.testing
    #[arg(short = 'D', value_name = "KEY[=VALUE]")]
    pub system_property: Vec<String>,

    /// Update sibling included builds concurrently
    #[arg(long)]
    pub parallel: bool,

    /// Print the steps without executing them
    #[arg(short, long)]
    pub dry_run: bool,
}

impl WrapperArgs {
    pub fn show_stacktrace(&self) -> ShowStacktrace {
        if self.full_stacktrace {
            ShowStacktrace::AlwaysFull
        } else if self.stacktrace {
            ShowStacktrace::Always
        } else {
            ShowStacktrace::InternalExceptions
        }
    }

    /// Host invocation requesting `tasks` with these options
    pub fn to_invocation(&self, tasks: &[String]) -> Invocation {
        let mut invocation = Invocation::new(tasks.iter().cloned());
        invocation.wrapper = WrapperOptions {
            gradle_version: self.gradle_version.clone(),
            distribution_type: self.distribution_type,
            distribution_url: self.gradle_distribution_url.clone(),
            distribution_sha256_sum: self.gradle_distribution_sha256_sum.clone(),
            network_timeout: self.network_timeout,
        };
        invocation.show_stacktrace = self.show_stacktrace();
        invocation.dependency_verification = self.dependency_verification;
        self.system_property
            .iter()
            .fold(invocation, |invocation, definition| {
                invocation.with_system_property(definition)
            })
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Update the wrapper of the root build and every included build
    #[command(visible_alias = "u")]
    Update {
        #[command(flatten)]
        args: WrapperArgs,
    },
    /// Run tasks on the root build, propagating when the wrapper task is among them
    Exec {
        /// Tasks to run, e.g. `wrapper` or `:wrapper`
        #[arg(required = true)]
        tasks: Vec<String>,

        #[command(flatten)]
        args: WrapperArgs,
    },
    /// Copy missing wrapper files from the root build into another build
    Bootstrap {
        /// Build directory receiving the wrapper files
        target: PathBuf,

        /// Root build directory (defaults to the current directory)
        #[arg(short, long)]
        project_dir: Option<PathBuf>,
    },
    /// Show the inclusion tree and the wrapper distribution of each build
    #[command(visible_alias = "s")]
    Status {
        /// Root build directory (defaults to the current directory)
        #[arg(short, long)]
        project_dir: Option<PathBuf>,

        /// Print the tree as JSON
        #[arg(long)]
        json: bool,
    },
}

impl Commands {
    /// Execute the command
    pub fn execute(self) -> Result<()> {
        match self {
            Commands::Update { args } => update_command(&args),
            Commands::Exec { tasks, args } => exec_command(&tasks, &args),
            Commands::Bootstrap {
                target,
                project_dir,
            } => bootstrap_command(&target, project_dir.as_deref()),
            Commands::Status { project_dir, json } => status_command(project_dir.as_deref(), json),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_update_flags_map_to_invocation() {
        let cli = Cli::try_parse_from([
            "recursive-wrapper",
            "update",
            "--gradle-version",
            "8.0.2",
            "--distribution-type",
            "all",
            "--gradle-distribution-sha256-sum",
            "abc",
            "-S",
            "--dependency-verification",
            "lenient",
            "-Drecursive-wrapper.testing",
            "-Dorg.gradle.jvmargs=-Xmx1g",
        ])
        .unwrap();

        let Commands::Update { args } = cli.command else {
            panic!("expected update");
        };
        let invocation = args.to_invocation(&["wrapper".to_string()]);
        assert_eq!(invocation.tasks, vec!["wrapper"]);
        assert_eq!(invocation.wrapper.gradle_version.as_deref(), Some("8.0.2"));
        assert_eq!(invocation.wrapper.distribution_type, Some(DistributionType::All));
        assert_eq!(
            invocation.wrapper.distribution_sha256_sum.as_deref(),
            Some("abc")
        );
        assert_eq!(invocation.show_stacktrace, ShowStacktrace::AlwaysFull);
        assert_eq!(
            invocation.dependency_verification,
            Some(DependencyVerification::Lenient)
        );
        assert_eq!(
            invocation.system_properties.get("recursive-wrapper.testing"),
            Some(&String::new())
        );
        assert_eq!(
            invocation.system_properties.get("org.gradle.jvmargs").map(String::as_str),
            Some("-Xmx1g")
        );
    }

    #[test]
    fn test_unknown_distribution_type_is_rejected() {
        let result = Cli::try_parse_from([
            "recursive-wrapper",
            "update",
            "--distribution-type",
            "src",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_exec_requires_tasks() {
        assert!(Cli::try_parse_from(["recursive-wrapper", "exec"]).is_err());
        let cli = Cli::try_parse_from(["recursive-wrapper", "exec", "help", "wrapper"]).unwrap();
        assert!(matches!(cli.command, Commands::Exec { ref tasks, .. } if tasks.len() == 2));
    }
}
