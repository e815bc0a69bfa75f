//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell as CompletionShell;

use cmake_pilot::core::target::Architecture;
use cmake_pilot::util::shell::ColorChoice;

/// cmake-pilot - generate, build and run CMake targets through one shell session
#[derive(Parser)]
#[command(name = "cmake-pilot")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Options accepted by every command.
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only print errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Project root (defaults to the outermost directory with a CMakeLists.txt)
    #[arg(long, global = true, env = "CMAKE_PILOT_ROOT")]
    pub root: Option<PathBuf>,

    /// Use the Release configuration
    #[arg(long, global = true)]
    pub release: bool,

    /// Target architecture (x86, x64)
    #[arg(long, global = true)]
    pub arch: Option<Architecture>,

    /// Coloring: auto, always, never
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Print machine-readable JSON
    #[arg(long, global = true)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the targets declared by the project
    Targets(TargetsArgs),

    /// Regenerate the build directory
    Generate,

    /// Build a target
    Build(BuildArgs),

    /// Run an executable target
    Run(RunArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args)]
pub struct TargetsArgs {
    /// Only list run targets
    #[arg(long)]
    pub run: bool,
}

#[derive(Args)]
pub struct BuildArgs {
    /// Target to build
    #[arg(long, short, default_value = "all")]
    pub target: String,
}

#[derive(Args)]
pub struct RunArgs {
    /// Executable target to run
    #[arg(long, short)]
    pub target: String,

    /// Debug adapter flavor for the launch descriptor
    #[arg(long)]
    pub debugger: Option<String>,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: CompletionShell,
}
