//! Host platform differences that leak into generated commands.

use crate::core::target::Architecture;

/// Platform family the CMake generator runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    /// Visual Studio generator: multi-config, takes an `-A` platform.
    Windows,
    /// Makefile/Ninja generators: single-config.
    Unix,
}

impl Platform {
    /// The platform this process is running on.
    pub fn current() -> Self {
        if cfg!(windows) {
            Platform::Windows
        } else {
            Platform::Unix
        }
    }

    /// Whether the default generator holds every configuration in one tree.
    pub fn is_multi_config(&self) -> bool {
        matches!(self, Platform::Windows)
    }

    /// The `-A` value for a multi-config generator.
    pub fn generator_platform(&self, arch: Architecture) -> Option<&'static str> {
        if !self.is_multi_config() {
            return None;
        }
        Some(match arch {
            Architecture::X86 => "Win32",
            Architecture::X64 => "x64",
        })
    }

    /// Translate a logical target name to the generator's spelling.
    pub fn target_alias<'a>(&self, name: &'a str) -> &'a str {
        match (self, name) {
            (Platform::Windows, "all") => "ALL_BUILD",
            (Platform::Windows, "test") => "RUN_TESTS",
            _ => name,
        }
    }

    /// Suffix appended to executable names.
    pub fn exe_suffix(&self) -> &'static str {
        match self {
            Platform::Windows => ".exe",
            Platform::Unix => "",
        }
    }
}

impl Default for Platform {
    fn default() -> Self {
        Platform::current()
    }
}
