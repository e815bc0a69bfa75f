//! Rendering of command lines sent to the shell session.

use std::borrow::Cow;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

/// Builder for a single shell command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    program: String,
    args: Vec<String>,
}

impl CommandLine {
    /// Create a new command line for the given program.
    pub fn new(program: impl AsRef<OsStr>) -> Self {
        CommandLine {
            program: program.as_ref().to_string_lossy().into_owned(),
            args: Vec::new(),
        }
    }

    /// Add a single argument.
    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_string_lossy().into_owned());
        self
    }

    /// Render the text typed into the session.
    pub fn render(&self) -> String {
        let mut parts = vec![quote(&self.program)];
        parts.extend(self.args.iter().map(|arg| quote(arg)));
        parts.join(" ")
    }
}

/// Double-quote a word that contains whitespace or is empty.
pub fn quote(word: &str) -> Cow<'_, str> {
    if word.is_empty() || word.chars().any(char::is_whitespace) {
        Cow::Owned(format!("\"{}\"", word.replace('"', "\\\"")))
    } else {
        Cow::Borrowed(word)
    }
}

/// Find an executable in PATH.
pub fn find_executable(name: &str) -> Option<PathBuf> {
    which::which(name).ok()
}

/// Find CMake.
pub fn find_cmake() -> Option<PathBuf> {
    find_executable("cmake")
}

/// Resolve the CMake program: an explicit override, PATH, or the bare name.
pub fn cmake_program(configured: Option<&Path>) -> String {
    match configured {
        Some(path) => path.to_string_lossy().into_owned(),
        None => find_cmake()
            .map(|p| p.to_string_lossy().into_owned())
            .unwrap_or_else(|| "cmake".to_string()),
    }
}
