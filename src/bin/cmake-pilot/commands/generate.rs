//! `cmake-pilot generate` command

use anyhow::Result;

use cmake_pilot::util::shell::Status;
use cmake_pilot::util::Shell;

use crate::cli::GlobalArgs;

pub fn execute(global: &GlobalArgs, shell: &Shell) -> Result<()> {
    let pilot = super::open(global)?;
    let selection = pilot.selection();

    let timer = shell.timed(
        Status::Generating,
        format!(
            "{} ({}, {})",
            pilot.model().build_dir().display(),
            selection.config,
            selection.arch
        ),
    );
    super::block_on(pilot.generate())??;
    timer.finish("generate");

    Ok(())
}
