use std::io;
use std::path::PathBuf;

/// Errors that can occur while propagating a wrapper update
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Recursive wrapper propagation can only be applied on the root project, not {}", .0.display())]
    NotRootProject(PathBuf),

    #[error(
        "Included build {} has name '{name}' which is the same as included build {}",
        .second.display(),
        .first.display()
    )]
    AmbiguousBuildName {
        name: String,
        first: PathBuf,
        second: PathBuf,
    },

    #[error("Wrapper file {} is missing, nothing to bootstrap from", .0.display())]
    MissingWrapperFile(PathBuf),

    #[error("Unable to bootstrap {}: {source}", .path.display())]
    Bootstrap {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Unable to write the init script: {0}")]
    InitScript(#[source] io::Error),

    #[error("Wrapper update of build '{build}' ({}) failed with {}", .dir.display(), describe_exit(.code))]
    ChildFailed {
        build: String,
        dir: PathBuf,
        code: Option<i32>,
    },

    #[error("Unable to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {code}"),
        None => "no exit code (terminated by signal)".to_string(),
    }
}

/// Result type alias for wrapper propagation
pub type Result<T> = std::result::Result<T, Error>;
