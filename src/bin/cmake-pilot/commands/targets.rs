//! `cmake-pilot targets` command

use anyhow::Result;

use cmake_pilot::util::Shell;

use crate::cli::{GlobalArgs, TargetsArgs};

pub fn execute(global: &GlobalArgs, shell: &Shell, args: TargetsArgs) -> Result<()> {
    let pilot = super::open(global)?;

    for target in pilot.model().targets() {
        if args.run && !target.is_run() {
            continue;
        }

        if shell.is_json() {
            shell.json_event(&serde_json::json!({
                "reason": "target",
                "name": target.name(),
                "kind": target.kind().to_string(),
            }));
        } else {
            println!("{}", target);
        }
    }

    Ok(())
}
