//! `cmake-pilot run` command
//!
//! Release runs the program through the shell session. Debug prints the
//! launch descriptor so a debug adapter can start it instead.

use anyhow::Result;

use cmake_pilot::core::target::TargetKey;
use cmake_pilot::util::shell::Status;
use cmake_pilot::util::Shell;

use crate::cli::{GlobalArgs, RunArgs};

pub fn execute(global: &GlobalArgs, shell: &Shell, args: RunArgs) -> Result<()> {
    let pilot = super::open(global)?;
    let mut pilot = match args.debugger {
        Some(debugger) => pilot.with_debugger(debugger),
        None => pilot,
    };
    pilot.select_target(TargetKey::run(&args.target))?;

    let program = pilot.artifact_path()?;
    shell.status(Status::Running, program.display());

    match super::block_on(pilot.run())?? {
        Some(descriptor) => {
            println!("{}", serde_json::to_string_pretty(&descriptor)?);
        }
        None => shell.status(Status::Finished, format!("`{}`", args.target)),
    }

    Ok(())
}
