//! cmake-pilot - drive CMake projects through a single shell session
//!
//! This crate provides the core library functionality for cmake-pilot:
//! loading a target model from `CMakeLists.txt` files, rendering the
//! generate/build/run commands for it, and executing them one at a time in a
//! reusable shell session that reports completion and exit codes.

pub mod core;
pub mod ops;
pub mod session;
pub mod util;

/// Test utilities and mocks for cmake-pilot unit tests.
///
/// This module is only available when compiling with `--cfg test` or
/// running tests. It provides a scripted terminal host and on-disk
/// project fixtures.
#[cfg(test)]
pub mod test_support;

pub use core::{
    platform::Platform, project::ProjectModel, target::Target, target::TargetKey,
};

pub use ops::Pilot;
pub use session::{ExecError, ShellSession};
pub use util::config::Config;
