//! cmake-pilot CLI - generate, build and run CMake targets from the terminal

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use cmake_pilot::util::Shell;

mod cli;
mod commands;

use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();
    let shell = Shell::from_flags(cli.global.quiet, cli.global.color, cli.global.json);

    if let Err(e) = run(cli, &shell) {
        shell.error(format!("{:#}", e));
        std::process::exit(1);
    }
}

fn run(cli: Cli, shell: &Shell) -> Result<()> {
    let filter = if cli.global.verbose {
        EnvFilter::new("cmake_pilot=debug")
    } else {
        EnvFilter::new("cmake_pilot=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    match cli.command {
        Commands::Targets(args) => commands::targets::execute(&cli.global, shell, args),
        Commands::Generate => commands::generate::execute(&cli.global, shell),
        Commands::Build(args) => commands::build::execute(&cli.global, shell, args),
        Commands::Run(args) => commands::run::execute(&cli.global, shell, args),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}
