//! Wrapper invocations of included builds as child processes

use crate::error::{Error, Result};
use crate::params::WrapperParameterSet;
use crate::wrapper::{POSIX_LAUNCHER, WINDOWS_LAUNCHER};
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Arc;
use tracing::info;

/// Launcher script flavour, chosen from the operating system at invocation time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Launcher {
    Posix,
    Windows,
}

impl Launcher {
    pub fn for_os(os_name: &str) -> Self {
        if os_name.to_ascii_lowercase().starts_with("win") {
            Launcher::Windows
        } else {
            Launcher::Posix
        }
    }

    pub fn current() -> Self {
        Self::for_os(std::env::consts::OS)
    }

    pub fn file_name(&self) -> &'static str {
        match self {
            Launcher::Posix => POSIX_LAUNCHER,
            Launcher::Windows => WINDOWS_LAUNCHER,
        }
    }

    /// How the launcher is spelled relative to its build directory
    pub fn relative_command(&self) -> String {
        match self {
            Launcher::Posix => format!("./{POSIX_LAUNCHER}"),
            Launcher::Windows => format!(".\\{WINDOWS_LAUNCHER}"),
        }
    }
}

/// Exit of a finished child process
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessExit {
    pub code: Option<i32>,
}

impl ProcessExit {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Spawns a process, waits for it and reports how it exited
pub trait ProcessRunner: Send + Sync {
    fn run(&self, working_dir: &Path, program: &Path, args: &[String]) -> Result<ProcessExit>;
}

/// Runs processes for real, with inherited stdio so their output reaches the user
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemProcessRunner;

impl ProcessRunner for SystemProcessRunner {
    fn run(&self, working_dir: &Path, program: &Path, args: &[String]) -> Result<ProcessExit> {
        let status = Command::new(program)
            .args(args)
            .current_dir(working_dir)
            .status()
            .map_err(|source| Error::Spawn {
                program: program.display().to_string(),
                source,
            })?;
        Ok(ProcessExit {
            code: status.code(),
        })
    }
}

/// One run of the wrapper task inside a build directory
#[derive(Debug, Clone)]
pub struct WrapperInvocation {
    pub build: String,
    pub working_dir: PathBuf,
    pub launcher: Launcher,
    pub task_path: String,
    pub parameters: Arc<WrapperParameterSet>,
}

impl WrapperInvocation {
    /// Task path followed by the shared parameters
    pub fn args(&self) -> Vec<String> {
        std::iter::once(self.task_path.clone())
            .chain(self.parameters.as_slice().iter().cloned())
            .collect()
    }

    /// Absolute launcher path; a bare relative path would resolve against our own directory
    pub fn program(&self) -> PathBuf {
        self.working_dir.join(self.launcher.file_name())
    }

    pub fn to_shell_command(&self) -> String {
        let mut cmd = self.launcher.relative_command();
        for arg in self.args() {
            cmd.push(' ');
            if arg.contains(' ') {
                cmd.push_str(&format!("'{arg}'"));
            } else {
                cmd.push_str(&arg);
            }
        }
        cmd
    }

    pub fn execute(&self, runner: &dyn ProcessRunner) -> Result<()> {
        info!(
            "Updating wrapper of {} in {}: {}",
            self.build,
            self.working_dir.display(),
            self.to_shell_command()
        );
        let exit = runner.run(&self.working_dir, &self.program(), &self.args())?;
        if exit.success() {
            Ok(())
        } else {
            Err(Error::ChildFailed {
                build: self.build.clone(),
                dir: self.working_dir.clone(),
                code: exit.code,
            })
        }
    }
}
