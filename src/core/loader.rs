//! Recursive loading of `CMakeLists.txt` trees into a [`ProjectModel`].
//!
//! Loading is best effort: unknown statements are skipped, missing
//! subdirectory files end that branch, and an unreadable file is logged and
//! treated as missing. A partial model is always returned.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::core::project::ProjectModel;
use crate::core::statement::{scan, Command, TargetProperty};
use crate::core::target::{Target, TargetKind};
use crate::util::fs::{normalize_path, read_to_string};

/// Name of the build-description file in every directory.
pub const BUILD_FILE: &str = "CMakeLists.txt";

/// Walks build-description files and populates a model.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProjectLoader;

impl ProjectLoader {
    pub fn new() -> Self {
        ProjectLoader
    }

    /// Load the file in `subdir` (relative to the model root), recursing
    /// into referenced subdirectories depth-first. A file is read at most
    /// once, so `add_subdirectory` cycles end where they close.
    pub fn load(&self, subdir: Option<&Path>, mut model: ProjectModel) -> ProjectModel {
        let mut visited = HashSet::new();
        self.load_into(subdir, &mut model, &mut visited);
        model
    }

    fn load_into(
        &self,
        subdir: Option<&Path>,
        model: &mut ProjectModel,
        visited: &mut HashSet<PathBuf>,
    ) {
        let dir = match subdir {
            Some(subdir) => model.root_dir().join(subdir),
            None => model.root_dir().to_path_buf(),
        };
        let path = normalize_path(&dir.join(BUILD_FILE));

        if !path.is_file() {
            tracing::debug!("no build file at {}", path.display());
            return;
        }

        // Symlinked directories can reach the same file under another name.
        let identity = std::fs::canonicalize(&path).unwrap_or_else(|_| path.clone());
        if !visited.insert(identity) {
            tracing::debug!("{} already loaded, skipping", path.display());
            return;
        }

        let text = match read_to_string(&path) {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!("skipping unreadable build file: {:#}", e);
                return;
            }
        };

        tracing::debug!("loading {}", path.display());
        model.files.insert(path);

        let declared_in = subdir.map(Path::to_path_buf).unwrap_or_default();
        for statement in scan(&text) {
            match statement.classify() {
                Command::AddExecutable { name } => {
                    let output_dir = binary_dir(model, &declared_in);
                    model.add_target(Target::build(name.clone()).declared_in(&declared_in));
                    model.add_target(
                        Target::run(name, output_dir.to_string_lossy()).declared_in(&declared_in),
                    );
                }
                Command::AddLibrary { name } | Command::AddCustomTarget { name } => {
                    model.add_target(Target::build(name).declared_in(&declared_in));
                }
                Command::EnableTesting => {
                    model.add_target(Target::build("test").declared_in(&declared_in));
                }
                Command::AddSubdirectory { dir } => {
                    let next = normalize_path(&declared_in.join(&dir));
                    self.load_into(Some(&next), model, visited);
                }
                Command::SetTargetProperties {
                    targets,
                    properties,
                } => apply_properties(model, &targets, &properties),
                Command::Unrecognized => {
                    tracing::trace!("skipping `{}`", statement.name);
                }
            }
        }
    }
}

/// Build-tree counterpart of a source subdirectory.
fn binary_dir(model: &ProjectModel, subdir: &Path) -> PathBuf {
    if subdir.as_os_str().is_empty() {
        model.build_dir().to_path_buf()
    } else {
        model.build_dir().join(subdir)
    }
}

fn apply_properties(model: &mut ProjectModel, names: &[String], properties: &[TargetProperty]) {
    for target in model
        .targets
        .iter_mut()
        .filter(|t| names.iter().any(|name| name == t.name()))
    {
        for property in properties {
            match property {
                TargetProperty::RuntimeOutputDirectory(config, dir) => {
                    if target.kind() == TargetKind::Run {
                        target.set_output_dir(*config, dir.clone());
                    }
                }
                TargetProperty::LibraryOutputDirectory(config, dir) => {
                    if target.kind() == TargetKind::Build {
                        target.set_output_dir(*config, dir.clone());
                    }
                }
                TargetProperty::OutputName(name) => target.set_output_name(name.clone()),
            }
        }
    }
}
