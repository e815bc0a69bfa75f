//! Target definitions - what a build description declares.
//!
//! A target is either a build-only unit (libraries, custom targets, the
//! implicit `all`/`clean`/`test`) or a run target that additionally produces
//! a launchable executable. Executables are declared as both.

use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A build profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Configuration {
    #[default]
    Debug,
    Release,
}

impl Configuration {
    /// Every configuration, in declaration order.
    pub const ALL: [Configuration; 2] = [Configuration::Debug, Configuration::Release];

    /// The name CMake uses for this configuration.
    pub fn as_str(&self) -> &'static str {
        match self {
            Configuration::Debug => "Debug",
            Configuration::Release => "Release",
        }
    }
}

impl fmt::Display for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Configuration {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "debug" => Ok(Configuration::Debug),
            "release" => Ok(Configuration::Release),
            _ => Err(format!(
                "invalid configuration '{}'; expected 'debug' or 'release'",
                s
            )),
        }
    }
}

/// Target architecture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Architecture {
    X86,
    #[default]
    X64,
}

impl fmt::Display for Architecture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Architecture::X86 => f.write_str("x86"),
            Architecture::X64 => f.write_str("x64"),
        }
    }
}

impl FromStr for Architecture {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "x86" | "win32" | "i686" => Ok(Architecture::X86),
            "x64" | "x86_64" | "amd64" => Ok(Architecture::X64),
            _ => Err(format!(
                "invalid architecture '{}'; expected 'x86' or 'x64'",
                s
            )),
        }
    }
}

/// The variant of a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetKind {
    /// Compiles only.
    Build,
    /// Produces an executable that can be launched.
    Run,
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetKind::Build => f.write_str("build"),
            TargetKind::Run => f.write_str("run"),
        }
    }
}

/// Logical identity of a target across model generations.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TargetKey {
    pub name: String,
    pub kind: TargetKind,
}

impl TargetKey {
    pub fn new(name: impl Into<String>, kind: TargetKind) -> Self {
        TargetKey {
            name: name.into(),
            kind,
        }
    }

    pub fn build(name: impl Into<String>) -> Self {
        TargetKey::new(name, TargetKind::Build)
    }

    pub fn run(name: impl Into<String>) -> Self {
        TargetKey::new(name, TargetKind::Run)
    }
}

impl fmt::Display for TargetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.kind)
    }
}

/// A target declared by the build description.
///
/// Equality and hashing only look at the [`TargetKey`]: the output settings
/// are configuration of the target, not part of its identity.
#[derive(Debug, Clone)]
pub struct Target {
    name: String,
    kind: TargetKind,
    /// Output directory per configuration, as written in the build description
    output_dirs: BTreeMap<Configuration, String>,
    /// Artifact base name
    output_name: Option<String>,
    /// Directory of the declaring build file, relative to the source root
    subdir: PathBuf,
}

impl Target {
    /// A build-only target.
    pub fn build(name: impl Into<String>) -> Self {
        Target {
            name: name.into(),
            kind: TargetKind::Build,
            output_dirs: BTreeMap::new(),
            output_name: None,
            subdir: PathBuf::new(),
        }
    }

    /// A run target whose artifact lands in `output_dir` for every configuration.
    pub fn run(name: impl Into<String>, output_dir: impl Into<String>) -> Self {
        let name = name.into();
        let output_dir = output_dir.into();
        Target {
            output_dirs: Configuration::ALL
                .iter()
                .map(|config| (*config, output_dir.clone()))
                .collect(),
            output_name: Some(name.clone()),
            subdir: PathBuf::new(),
            name,
            kind: TargetKind::Run,
        }
    }

    /// Record the directory (relative to the source root) that declared
    /// this target.
    pub fn declared_in(mut self, subdir: impl Into<PathBuf>) -> Self {
        self.subdir = subdir.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> TargetKind {
        self.kind
    }

    pub fn is_run(&self) -> bool {
        self.kind == TargetKind::Run
    }

    pub fn key(&self) -> TargetKey {
        TargetKey::new(self.name.clone(), self.kind)
    }

    /// Check whether this target has the given identity.
    pub fn matches(&self, key: &TargetKey) -> bool {
        self.kind == key.kind && self.name == key.name
    }

    pub fn output_dir(&self, config: Configuration) -> Option<&str> {
        self.output_dirs.get(&config).map(String::as_str)
    }

    pub fn output_name(&self) -> Option<&str> {
        self.output_name.as_deref()
    }

    /// Relative directory of the declaring build file. Empty for the root.
    pub fn subdir(&self) -> &Path {
        &self.subdir
    }

    pub fn set_output_dir(&mut self, config: Configuration, dir: impl Into<String>) {
        self.output_dirs.insert(config, dir.into());
    }

    pub fn set_output_name(&mut self, name: impl Into<String>) {
        self.output_name = Some(name.into());
    }
}

impl PartialEq for Target {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.name == other.name
    }
}

impl Eq for Target {}

impl Hash for Target {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.kind.hash(state);
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.kind)
    }
}
