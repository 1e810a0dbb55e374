//! Init script that re-applies the propagation plugin inside included builds

use crate::config::PluginCoordinates;
use crate::error::{Error, Result};
use std::io::Write;
use std::path::Path;
use tempfile::TempPath;
use tracing::debug;

/// Render the Kotlin init script. The classpath dependency is left out in test
/// runs, where the plugin is already on the classpath and the network is off limits.
pub fn render(plugin: &PluginCoordinates, testing: bool) -> String {
    let dependency = if testing {
        String::new()
    } else {
        format!(
            "            buildscript.dependencies.add(\"classpath\", \"{}\")\n",
            plugin.notation()
        )
    };

    format!(
        "apply<PropagateWrapperInitPlugin>()

class PropagateWrapperInitPlugin : Plugin<Gradle> {{
    override fun apply(gradle: Gradle) {{
        gradle.rootProject {{
{dependency}            buildscript.repositories.gradlePluginPortal()

            afterEvaluate {{
                apply(plugin = \"{id}\")
            }}
        }}
    }}
}}
",
        id = plugin.id
    )
}

/// Temporary init script file, removed when dropped
#[derive(Debug)]
pub struct InitScript {
    path: TempPath,
}

impl InitScript {
    /// Write the script to a fresh file in the system temp directory
    pub fn create(contents: &str) -> Result<Self> {
        Self::create_in(&std::env::temp_dir(), contents)
    }

    pub fn create_in(dir: &Path, contents: &str) -> Result<Self> {
        let mut file = tempfile::Builder::new()
            .prefix("init-recursive-wrapper-")
            .suffix(".gradle.kts")
            .tempfile_in(dir)
            .map_err(Error::InitScript)?;
        file.write_all(contents.as_bytes())
            .and_then(|()| file.flush())
            .map_err(Error::InitScript)?;

        let path = file.into_temp_path();
        debug!("Wrote init script to {}", path.display());
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
