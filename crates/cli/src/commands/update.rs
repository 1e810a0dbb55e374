use anyhow::Result;
use tracing::debug;

use crate::cli::WrapperArgs;
use crate::commands::exec::{load_config, run_tasks};

/// Request the wrapper task on the root build and propagate it
pub fn update_command(args: &WrapperArgs) -> Result<()> {
    let (project_dir, config) = load_config(args)?;
    let tasks = vec![config.task.clone()];
    debug!("Updating wrappers from {}", project_dir.display());
    run_tasks(&project_dir, config, &tasks, args)
}
