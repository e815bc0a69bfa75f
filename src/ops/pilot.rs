//! User actions bound to a project model and its shell session.

use std::path::{Path, PathBuf};

use anyhow::{bail, Result};

use crate::core::platform::Platform;
use crate::core::project::{ArtifactError, Launch, LaunchDescriptor, ProjectModel};
use crate::core::target::{Architecture, Configuration, Target, TargetKey};
use crate::session::{ProcessHost, ShellSession};
use crate::util::config::Config;
use crate::util::process::cmake_program;

/// The user's current choices.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub config: Configuration,
    pub arch: Architecture,
    pub target: Option<TargetKey>,
}

/// Drives generate, build and run for one project root.
pub struct Pilot {
    model: ProjectModel,
    selection: Selection,
    debugger: String,
    session: ShellSession,
}

impl Pilot {
    pub fn new(model: ProjectModel, session: ShellSession) -> Self {
        Pilot {
            model,
            selection: Selection::default(),
            debugger: crate::util::config::DEFAULT_DEBUGGER.to_string(),
            session,
        }
    }

    /// Load the project at `root` using `config` for paths, defaults and the
    /// session's shell.
    pub fn from_config(root: &Path, config: &Config) -> Self {
        let cmake = cmake_program(config.build.cmake.as_deref());
        let model = ProjectModel::load(root, config.build_dir(root), Platform::current())
            .with_cmake(cmake);
        let session = ShellSession::new(
            config.session_name(),
            ProcessHost::new(config.shell_program()),
        );

        let mut pilot = Pilot::new(model, session).with_debugger(config.debugger());
        if let Some(cfg) = config.configuration() {
            pilot.select_config(cfg);
        }
        if let Some(arch) = config.arch() {
            pilot.select_arch(arch);
        }
        pilot
    }

    pub fn with_debugger(mut self, debugger: impl Into<String>) -> Self {
        self.debugger = debugger.into();
        self
    }

    pub fn model(&self) -> &ProjectModel {
        &self.model
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn session(&self) -> &ShellSession {
        &self.session
    }

    /// Rebuild the model from disk. The selected target is looked up again
    /// by key and cleared if it no longer exists.
    pub fn reload(&mut self) {
        let model = ProjectModel::load(
            self.model.root_dir(),
            self.model.build_dir(),
            self.model.platform(),
        )
        .with_cmake(self.model.cmake());
        self.model = model;

        if let Some(key) = &self.selection.target {
            if self.model.find(key).is_none() {
                tracing::warn!("selected target {} no longer exists", key);
                self.selection.target = None;
            }
        }
        tracing::info!(
            "loaded {} targets from {} files",
            self.model.targets().len(),
            self.model.files().len()
        );
    }

    /// Whether a change to `path` should trigger [`Pilot::reload`].
    pub fn needs_reload(&self, path: &Path) -> bool {
        self.model.watches(path)
    }

    pub fn select_config(&mut self, config: Configuration) {
        self.selection.config = config;
    }

    pub fn select_arch(&mut self, arch: Architecture) {
        self.selection.arch = arch;
    }

    /// Select a target by key. Fails if the model has no such target.
    pub fn select_target(&mut self, key: TargetKey) -> Result<()> {
        if self.model.find(&key).is_none() {
            let available: Vec<String> = self.model.targets().iter().map(|t| t.to_string()).collect();
            bail!(
                "unknown target `{}`\navailable targets: {}",
                key,
                available.join(", ")
            );
        }
        self.selection.target = Some(key);
        Ok(())
    }

    pub fn selected_target(&self) -> Option<&Target> {
        self.selection
            .target
            .as_ref()
            .and_then(|key| self.model.find(key))
    }

    /// Regenerate the build directory.
    pub async fn generate(&self) -> Result<()> {
        let command = self
            .model
            .generate(self.selection.config, self.selection.arch)?;
        self.session.exec(&command).await?;
        Ok(())
    }

    /// Build the selected target, or `all` when nothing is selected.
    pub async fn build(&self) -> Result<()> {
        let all = Target::build("all");
        let target = self.selected_target().unwrap_or(&all);

        let commands = self
            .model
            .build(target, self.selection.config, self.selection.arch)?;
        for command in commands {
            self.session.exec(&command).await?;
        }
        Ok(())
    }

    /// Start the selected target.
    ///
    /// Debug returns the descriptor for a debug adapter; Release runs the
    /// program in the session and returns `None`.
    pub async fn run(&self) -> Result<Option<LaunchDescriptor>> {
        let target = self
            .selected_target()
            .ok_or(ArtifactError::NoTargetSelected)?;

        match self
            .model
            .run(target, self.selection.config, &self.debugger)?
        {
            Launch::Debug(descriptor) => Ok(Some(descriptor)),
            Launch::Shell(command) => {
                self.session.exec(&command).await?;
                Ok(None)
            }
        }
    }

    /// Path of the selected target's executable, for display.
    pub fn artifact_path(&self) -> Result<PathBuf> {
        let target = self
            .selected_target()
            .ok_or(ArtifactError::NoTargetSelected)?;
        Ok(self.model.artifact_path(target, self.selection.config)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::loader::BUILD_FILE;
    use crate::session::ExecError;
    use crate::test_support::{MockHost, ProjectFixture};
    use std::fs;
    use tempfile::TempDir;

    fn pilot(tmp: &TempDir, host: &MockHost) -> Pilot {
        ProjectFixture::app_with_library().write_to(tmp.path()).unwrap();
        let model = ProjectModel::load(tmp.path(), tmp.path().join("build"), Platform::Unix);
        Pilot::new(model, ShellSession::new("test", host.clone()))
    }

    #[test]
    fn test_select_unknown_target_fails() {
        let tmp = TempDir::new().unwrap();
        let mut pilot = pilot(&tmp, &MockHost::ready());

        let err = pilot.select_target(TargetKey::run("core")).unwrap_err();
        assert!(err.to_string().contains("unknown target `core (run)`"));
        assert!(pilot.selection().target.is_none());

        pilot.select_target(TargetKey::build("core")).unwrap();
        assert_eq!(pilot.selected_target().unwrap().name(), "core");
    }

    #[test]
    fn test_reload_keeps_selection_by_key() {
        let tmp = TempDir::new().unwrap();
        let mut pilot = pilot(&tmp, &MockHost::ready());
        pilot.select_target(TargetKey::run("app")).unwrap();

        fs::write(
            tmp.path().join(BUILD_FILE),
            "add_subdirectory(core)\nadd_executable(app main.c)\n",
        )
        .unwrap();
        pilot.reload();

        let target = pilot.selected_target().unwrap();
        assert!(target.is_run());
        assert_eq!(target.output_name(), Some("app"));
    }

    #[test]
    fn test_reload_drops_vanished_selection() {
        let tmp = TempDir::new().unwrap();
        let mut pilot = pilot(&tmp, &MockHost::ready());
        pilot.select_target(TargetKey::build("core")).unwrap();

        fs::write(tmp.path().join(BUILD_FILE), "add_executable(app main.c)\n").unwrap();
        pilot.reload();

        assert!(pilot.selection().target.is_none());
        assert!(pilot.model().find(&TargetKey::build("core")).is_none());
    }

    #[test]
    fn test_needs_reload_for_loaded_files_only() {
        let tmp = TempDir::new().unwrap();
        let pilot = pilot(&tmp, &MockHost::ready());
        let root = std::path::absolute(tmp.path()).unwrap();

        assert!(pilot.needs_reload(&root.join(BUILD_FILE)));
        assert!(pilot.needs_reload(&root.join("core").join(BUILD_FILE)));
        assert!(!pilot.needs_reload(&root.join("main.c")));
    }

    #[tokio::test]
    async fn test_build_without_selection_generates_then_builds_all() {
        let tmp = TempDir::new().unwrap();
        let host = MockHost::ready();
        host.reply(&[Some(0), Some(0)]);
        let pilot = pilot(&tmp, &host);

        pilot.build().await.unwrap();

        let sent = host.terminal(0).sent();
        assert_eq!(sent.len(), 2);
        assert!(sent[0].contains(" -S "));
        assert!(sent[0].contains("-DCMAKE_BUILD_TYPE=Debug"));
        assert!(sent[1].contains("--target all --config Debug"));
        assert_eq!(host.created(), 1);
    }

    #[tokio::test]
    async fn test_build_stops_on_failed_generate() {
        let tmp = TempDir::new().unwrap();
        let host = MockHost::ready();
        host.reply(&[Some(1)]);
        let pilot = pilot(&tmp, &host);

        let err = pilot.build().await.unwrap_err();
        assert_eq!(
            err.downcast_ref::<ExecError>(),
            Some(&ExecError::CommandFailed { code: 1 })
        );
        assert_eq!(host.terminal(0).sent().len(), 1);
    }

    #[tokio::test]
    async fn test_build_existing_tree_skips_generate() {
        let tmp = TempDir::new().unwrap();
        let host = MockHost::ready();
        host.reply(&[Some(0)]);
        let mut pilot = pilot(&tmp, &host);
        fs::create_dir_all(tmp.path().join("build")).unwrap();
        pilot.select_target(TargetKey::build("core")).unwrap();
        pilot.select_config(Configuration::Release);

        pilot.build().await.unwrap();

        assert_eq!(
            host.terminal(0).sent(),
            vec![format!(
                "cmake --build {} --target core --config Release",
                pilot.model().build_dir().display()
            )]
        );
    }

    #[tokio::test]
    async fn test_run_requires_selection() {
        let tmp = TempDir::new().unwrap();
        let host = MockHost::ready();
        let pilot = pilot(&tmp, &host);

        let err = pilot.run().await.unwrap_err();
        assert_eq!(
            err.downcast_ref::<ArtifactError>(),
            Some(&ArtifactError::NoTargetSelected)
        );
        assert_eq!(host.created(), 0);
    }

    #[tokio::test]
    async fn test_debug_run_returns_descriptor() {
        let tmp = TempDir::new().unwrap();
        let host = MockHost::ready();
        let mut pilot = pilot(&tmp, &host).with_debugger("lldb");
        pilot.select_target(TargetKey::run("app")).unwrap();

        let descriptor = pilot.run().await.unwrap().unwrap();
        assert_eq!(descriptor.program, pilot.model().build_dir().join("demo"));
        assert_eq!(descriptor.working_directory, pilot.model().build_dir());
        assert_eq!(descriptor.debugger_kind, "lldb");
        assert_eq!(host.created(), 0);
    }

    #[tokio::test]
    async fn test_release_run_executes_in_session() {
        let tmp = TempDir::new().unwrap();
        let host = MockHost::ready();
        host.reply(&[Some(0)]);
        let mut pilot = pilot(&tmp, &host);
        pilot.select_target(TargetKey::run("app")).unwrap();
        pilot.select_config(Configuration::Release);

        assert_eq!(pilot.run().await.unwrap(), None);

        let expected = pilot.artifact_path().unwrap();
        assert_eq!(
            host.terminal(0).sent(),
            vec![expected.display().to_string()]
        );
    }

    #[tokio::test]
    async fn test_run_library_has_no_output_file() {
        let tmp = TempDir::new().unwrap();
        let mut pilot = pilot(&tmp, &MockHost::ready());
        pilot.select_target(TargetKey::build("core")).unwrap();

        let err = pilot.run().await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "no output file for target `core` in Debug configuration"
        );
    }
}
