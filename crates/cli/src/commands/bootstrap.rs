use anyhow::{Context, Result};
use recursive_wrapper_core::bootstrap_wrapper;
use std::path::Path;

use crate::utils::resolve_project_dir;

pub fn bootstrap_command(target: &Path, project_dir: Option<&Path>) -> Result<()> {
    let source = resolve_project_dir(project_dir)?;
    let report = bootstrap_wrapper(&source, target).with_context(|| {
        format!(
            "Failed to bootstrap wrapper from {} into {}",
            source.display(),
            target.display()
        )
    })?;

    if report.is_noop() {
        println!("✅ {} already has every wrapper file", target.display());
        return Ok(());
    }

    for file in &report.copied {
        println!("📄 Copied {}", file.display());
    }
    println!(
        "✅ Bootstrapped {} wrapper file(s) into {}",
        report.copied.len(),
        target.display()
    );
    Ok(())
}
