//! Command implementations

pub mod build;
pub mod completions;
pub mod generate;
pub mod run;
pub mod targets;

use std::future::Future;
use std::path::PathBuf;

use anyhow::{Context, Result};

use cmake_pilot::core::loader::BUILD_FILE;
use cmake_pilot::core::target::Configuration;
use cmake_pilot::ops::Pilot;
use cmake_pilot::util::config::{global_config_path, load_config, project_config_path};
use cmake_pilot::util::fs::find_outermost;

use crate::cli::GlobalArgs;

/// Locate the project root, read configuration and load the model.
///
/// Command-line flags override configuration files.
pub fn open(global: &GlobalArgs) -> Result<Pilot> {
    let root = project_root(global)?;

    let config = load_config(global_config_path().as_deref(), &project_config_path(&root));
    let mut pilot = Pilot::from_config(&root, &config);

    if global.release {
        pilot.select_config(Configuration::Release);
    }
    if let Some(arch) = global.arch {
        pilot.select_arch(arch);
    }

    tracing::debug!(
        "project at {} with {} targets",
        root.display(),
        pilot.model().targets().len()
    );

    Ok(pilot)
}

fn project_root(global: &GlobalArgs) -> Result<PathBuf> {
    if let Some(root) = &global.root {
        if !root.join(BUILD_FILE).is_file() {
            anyhow::bail!("no {} in {}", BUILD_FILE, root.display());
        }
        return Ok(root.clone());
    }

    let cwd = std::env::current_dir().context("failed to get current directory")?;
    find_outermost(&cwd, BUILD_FILE).ok_or_else(|| {
        anyhow::anyhow!(
            "could not find {} in {} or any parent directory",
            BUILD_FILE,
            cwd.display()
        )
    })
}

/// Drive an async operation to completion on a fresh runtime.
pub fn block_on<F: Future>(future: F) -> Result<F::Output> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;
    Ok(runtime.block_on(future))
}
