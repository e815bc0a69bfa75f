//! `cmake-pilot build` command

use anyhow::Result;

use cmake_pilot::core::target::TargetKey;
use cmake_pilot::util::shell::Status;
use cmake_pilot::util::Shell;

use crate::cli::{BuildArgs, GlobalArgs};

pub fn execute(global: &GlobalArgs, shell: &Shell, args: BuildArgs) -> Result<()> {
    let mut pilot = super::open(global)?;
    pilot.select_target(TargetKey::build(&args.target))?;

    let timer = shell.timed(
        Status::Building,
        format!("{} ({})", args.target, pilot.selection().config),
    );
    super::block_on(pilot.build())??;
    timer.finish(format!("`{}`", args.target));

    Ok(())
}
