//! The project model and the commands derived from it.
//!
//! A [`ProjectModel`] is rebuilt from disk on every reload. Callers keep
//! [`TargetKey`]s, never references, across reloads.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::Serialize;
use thiserror::Error;

use crate::core::loader::ProjectLoader;
use crate::core::platform::Platform;
use crate::core::target::{Architecture, Configuration, Target, TargetKey};
use crate::util::fs::remove_dir_all_if_exists;
use crate::util::process::CommandLine;

/// Placeholder users write in property values for the source tree.
pub const SOURCE_DIR_PLACEHOLDER: &str = "${CMAKE_SOURCE_DIR}";

/// Why a target cannot be launched.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ArtifactError {
    #[error("no target selected")]
    NoTargetSelected,

    #[error("no output file for target `{target}` in {config} configuration")]
    NoOutputFile {
        target: String,
        config: Configuration,
    },
}

/// Everything a debug adapter needs to start the program.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LaunchDescriptor {
    pub program: PathBuf,
    pub working_directory: PathBuf,
    pub debugger_kind: String,
}

/// How to start a run target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Launch {
    /// Hand off to an external debugger.
    Debug(LaunchDescriptor),
    /// Type into the shell session.
    Shell(String),
}

/// In-memory model of a CMake project.
#[derive(Debug, Clone)]
pub struct ProjectModel {
    root_dir: PathBuf,
    source_dir: PathBuf,
    build_dir: PathBuf,
    platform: Platform,
    cmake: String,
    pub(crate) files: BTreeSet<PathBuf>,
    pub(crate) targets: Vec<Target>,
}

impl ProjectModel {
    /// An empty model holding only the implicit targets.
    pub fn new(root_dir: impl AsRef<Path>, build_dir: impl AsRef<Path>, platform: Platform) -> Self {
        let root_dir = absolute(root_dir.as_ref());
        let build_dir = absolute(build_dir.as_ref());
        ProjectModel {
            source_dir: root_dir.clone(),
            root_dir,
            build_dir,
            platform,
            cmake: "cmake".to_string(),
            files: BTreeSet::new(),
            targets: vec![Target::build("all"), Target::build("clean")],
        }
    }

    /// Load the tree rooted at `root_dir`.
    pub fn load(root_dir: impl AsRef<Path>, build_dir: impl AsRef<Path>, platform: Platform) -> Self {
        ProjectLoader::new().load(None, ProjectModel::new(root_dir, build_dir, platform))
    }

    /// Set the CMake program used in rendered commands.
    pub fn with_cmake(mut self, program: impl Into<String>) -> Self {
        self.cmake = program.into();
        self
    }

    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    pub fn source_dir(&self) -> &Path {
        &self.source_dir
    }

    pub fn build_dir(&self) -> &Path {
        &self.build_dir
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    pub fn cmake(&self) -> &str {
        &self.cmake
    }

    /// Build-description files read while loading.
    pub fn files(&self) -> &BTreeSet<PathBuf> {
        &self.files
    }

    /// Whether a change to `path` invalidates this model.
    pub fn watches(&self, path: &Path) -> bool {
        self.files.contains(path)
    }

    pub fn targets(&self) -> &[Target] {
        &self.targets
    }

    /// Find a target by its logical key.
    pub fn find(&self, key: &TargetKey) -> Option<&Target> {
        self.targets.iter().find(|t| t.matches(key))
    }

    /// Append a target unless one with the same key exists.
    pub(crate) fn add_target(&mut self, target: Target) {
        if self.targets.contains(&target) {
            tracing::debug!("target {} already declared", target);
            return;
        }
        self.targets.push(target);
    }

    /// Whether the build directory has been generated.
    pub fn is_generated(&self) -> bool {
        self.build_dir.is_dir()
    }

    /// Remove any stale build tree and render the configure command.
    pub fn generate(&self, config: Configuration, arch: Architecture) -> Result<String> {
        remove_dir_all_if_exists(&self.build_dir)?;

        let mut cmd = CommandLine::new(&self.cmake)
            .arg("-S")
            .arg(&self.source_dir)
            .arg("-B")
            .arg(&self.build_dir)
            .arg(format!("-DCMAKE_BUILD_TYPE={}", config));

        if let Some(platform) = self.platform.generator_platform(arch) {
            cmd = cmd.arg("-A").arg(platform);
        }

        Ok(cmd.render())
    }

    /// Render the commands that build `target`, generating first when the
    /// build directory does not exist yet.
    pub fn build(
        &self,
        target: &Target,
        config: Configuration,
        arch: Architecture,
    ) -> Result<Vec<String>> {
        let mut commands = Vec::with_capacity(2);
        if !self.is_generated() {
            tracing::info!("build directory missing, generating first");
            commands.push(self.generate(config, arch)?);
        }

        let cmd = CommandLine::new(&self.cmake)
            .arg("--build")
            .arg(&self.build_dir)
            .arg("--target")
            .arg(self.platform.target_alias(target.name()))
            .arg("--config")
            .arg(config.as_str());
        commands.push(cmd.render());

        Ok(commands)
    }

    /// Resolve how to start `target`.
    pub fn run(
        &self,
        target: &Target,
        config: Configuration,
        debugger: &str,
    ) -> std::result::Result<Launch, ArtifactError> {
        let program = self.artifact_path(target, config)?;

        Ok(match config {
            Configuration::Debug => Launch::Debug(LaunchDescriptor {
                program,
                working_directory: self.build_dir.clone(),
                debugger_kind: debugger.to_string(),
            }),
            Configuration::Release => Launch::Shell(CommandLine::new(&program).render()),
        })
    }

    /// Absolute path of the executable `target` produces under `config`.
    pub fn artifact_path(
        &self,
        target: &Target,
        config: Configuration,
    ) -> std::result::Result<PathBuf, ArtifactError> {
        let missing = || ArtifactError::NoOutputFile {
            target: target.name().to_string(),
            config,
        };
        let dir = target.output_dir(config).ok_or_else(missing)?;
        let name = target.output_name().ok_or_else(missing)?;

        let source = self.source_dir.to_string_lossy();
        let dir = PathBuf::from(dir.replace(SOURCE_DIR_PLACEHOLDER, &source));
        // Relative directories are relative to the declaring file's binary dir.
        let dir = if dir.is_absolute() {
            dir
        } else if target.subdir().as_os_str().is_empty() {
            self.build_dir.join(dir)
        } else {
            self.build_dir.join(target.subdir()).join(dir)
        };

        Ok(dir.join(format!("{}{}", name, self.platform.exe_suffix())))
    }
}

fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}
