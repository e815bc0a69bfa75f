//! Line-oriented scanning of `CMakeLists.txt` files.
//!
//! Only single-line statements of the form `name(arg arg ...)` are
//! recognized. Statements spanning several lines are skipped, as are
//! comments and anything else that does not fit the shape.

use std::sync::LazyLock;

use regex::Regex;

use crate::core::target::Configuration;

static STATEMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*([A-Za-z_][A-Za-z0-9_]*)\s*\(([^()]*)\)\s*(?:#.*)?$")
        .expect("statement pattern is valid")
});

/// Marker separating target names from key/value pairs.
const PROPERTIES_MARKER: &str = "PROPERTIES";

/// A raw `name(args...)` statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    pub name: String,
    pub args: Vec<String>,
}

impl Statement {
    /// Parse a single physical line.
    pub fn parse_line(line: &str) -> Option<Statement> {
        let caps = STATEMENT.captures(line)?;
        Some(Statement {
            name: caps[1].to_string(),
            args: caps[2].split_whitespace().map(str::to_string).collect(),
        })
    }

    /// Classify this statement into one of the recognized commands.
    pub fn classify(&self) -> Command {
        let first = self.args.first().cloned();
        match (self.name.to_ascii_lowercase().as_str(), first) {
            ("add_executable", Some(name)) => Command::AddExecutable { name },
            ("add_library", Some(name)) => Command::AddLibrary { name },
            ("add_custom_target", Some(name)) => Command::AddCustomTarget { name },
            ("enable_testing", _) => Command::EnableTesting,
            ("add_subdirectory", Some(dir)) => Command::AddSubdirectory { dir },
            ("set_target_properties", _) => parse_target_properties(&self.args),
            _ => Command::Unrecognized,
        }
    }
}

/// Lazy iterator over the statements of a file.
///
/// A clone continues from the same line; call [`scan`] again for a fresh pass.
#[derive(Debug, Clone)]
pub struct Statements<'a> {
    lines: std::str::Lines<'a>,
}

impl Iterator for Statements<'_> {
    type Item = Statement;

    fn next(&mut self) -> Option<Self::Item> {
        for line in self.lines.by_ref() {
            if let Some(statement) = Statement::parse_line(line) {
                return Some(statement);
            }
        }
        None
    }
}

/// Scan file text into statements.
pub fn scan(text: &str) -> Statements<'_> {
    Statements {
        lines: text.lines(),
    }
}

/// A property assignment understood by `set_target_properties`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetProperty {
    /// `RUNTIME_OUTPUT_DIRECTORY_<CONFIG>`, applies to run targets
    RuntimeOutputDirectory(Configuration, String),
    /// `LIBRARY_OUTPUT_DIRECTORY_<CONFIG>`, applies to build targets
    LibraryOutputDirectory(Configuration, String),
    /// `OUTPUT_NAME`, applies to every matched target
    OutputName(String),
}

impl TargetProperty {
    fn from_pair(key: &str, value: &str) -> Option<TargetProperty> {
        let value = value.to_string();
        let property = match key {
            "RUNTIME_OUTPUT_DIRECTORY_DEBUG" => {
                TargetProperty::RuntimeOutputDirectory(Configuration::Debug, value)
            }
            "RUNTIME_OUTPUT_DIRECTORY_RELEASE" => {
                TargetProperty::RuntimeOutputDirectory(Configuration::Release, value)
            }
            "LIBRARY_OUTPUT_DIRECTORY_DEBUG" => {
                TargetProperty::LibraryOutputDirectory(Configuration::Debug, value)
            }
            "LIBRARY_OUTPUT_DIRECTORY_RELEASE" => {
                TargetProperty::LibraryOutputDirectory(Configuration::Release, value)
            }
            "OUTPUT_NAME" => TargetProperty::OutputName(value),
            _ => return None,
        };
        Some(property)
    }
}

/// A classified statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    AddExecutable { name: String },
    AddLibrary { name: String },
    AddCustomTarget { name: String },
    EnableTesting,
    AddSubdirectory { dir: String },
    SetTargetProperties {
        targets: Vec<String>,
        properties: Vec<TargetProperty>,
    },
    Unrecognized,
}

fn parse_target_properties(args: &[String]) -> Command {
    let Some(marker) = args.iter().position(|arg| arg == PROPERTIES_MARKER) else {
        return Command::Unrecognized;
    };

    let targets = args[..marker].to_vec();
    let properties = args[marker + 1..]
        .chunks_exact(2)
        .filter_map(|pair| {
            let property = TargetProperty::from_pair(&pair[0], &pair[1]);
            if property.is_none() {
                tracing::debug!("ignoring target property `{}`", pair[0]);
            }
            property
        })
        .collect();

    Command::SetTargetProperties {
        targets,
        properties,
    }
}
