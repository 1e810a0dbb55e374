//! The files a build needs in order to run through its wrapper

mod properties;
mod version;

pub use properties::WrapperProperties;
pub use version::GradleVersion;

use std::path::{Path, PathBuf};

/// POSIX launcher script, at the build root
pub const POSIX_LAUNCHER: &str = "gradlew";

/// Windows launcher script, at the build root
pub const WINDOWS_LAUNCHER: &str = "gradlew.bat";

/// Directory holding the loader jar and the properties file
pub const WRAPPER_DIR: &str = "gradle/wrapper";

pub const WRAPPER_JAR: &str = "gradle/wrapper/gradle-wrapper.jar";

pub const WRAPPER_PROPERTIES: &str = "gradle/wrapper/gradle-wrapper.properties";

/// Minimum file set, relative to a build root
pub const WRAPPER_FILES: [&str; 4] = [
    POSIX_LAUNCHER,
    WINDOWS_LAUNCHER,
    WRAPPER_JAR,
    WRAPPER_PROPERTIES,
];

/// Location of the wrapper properties file of a build
pub fn properties_path(build_dir: &Path) -> PathBuf {
    build_dir.join(WRAPPER_PROPERTIES)
}

/// Wrapper files missing from a build directory
pub fn missing_files(build_dir: &Path) -> Vec<&'static str> {
    WRAPPER_FILES
        .iter()
        .copied()
        .filter(|file| !build_dir.join(file).exists())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_missing_files_in_empty_dir() {
        let temp_dir = TempDir::new().unwrap();
        assert_eq!(missing_files(temp_dir.path()), WRAPPER_FILES.to_vec());
    }

    #[test]
    fn test_missing_files_partial() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join(POSIX_LAUNCHER), "#!/bin/sh").unwrap();
        fs::create_dir_all(temp_dir.path().join(WRAPPER_DIR)).unwrap();
        fs::write(temp_dir.path().join(WRAPPER_JAR), [0u8; 4]).unwrap();

        assert_eq!(
            missing_files(temp_dir.path()),
            vec![WINDOWS_LAUNCHER, WRAPPER_PROPERTIES]
        );
    }
}
