use anyhow::{Context, Result};
use std::env;
use std::path::{Path, PathBuf};

/// Root build directory from `--project-dir`, or the current directory
pub fn resolve_project_dir(project_dir: Option<&Path>) -> Result<PathBuf> {
    let dir = match project_dir {
        Some(dir) => dir.to_path_buf(),
        None => env::current_dir().context("Failed to get current directory")?,
    };
    std::path::absolute(&dir)
        .with_context(|| format!("Failed to resolve project directory {}", dir.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_dirs_become_absolute() {
        let dir = resolve_project_dir(Some(Path::new("some/build"))).unwrap();
        assert!(dir.is_absolute());
        assert!(dir.ends_with("some/build"));
    }

    #[test]
    fn test_defaults_to_current_dir() {
        let dir = resolve_project_dir(None).unwrap();
        assert_eq!(dir, env::current_dir().unwrap());
    }
}
