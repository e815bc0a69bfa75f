//! Core data structures for cmake-pilot.
//!
//! This module contains the project model and everything it is built from:
//! - Statement scanning and classification of `CMakeLists.txt` lines
//! - Targets, configurations and architectures
//! - Platform conventions (multi-config generators, target aliases)
//! - Recursive loading of a project tree

pub mod loader;
pub mod platform;
pub mod project;
pub mod statement;
pub mod target;

pub use loader::{ProjectLoader, BUILD_FILE};
pub use platform::Platform;
pub use project::{ArtifactError, Launch, LaunchDescriptor, ProjectModel};
pub use statement::{Command, Statement, TargetProperty};
pub use target::{Architecture, Configuration, Target, TargetKey, TargetKind};
