//! Console status output for the CLI.
//!
//! Every human-facing line goes through [`Shell::status`] so alignment and
//! coloring stay consistent. In JSON mode human lines are dropped and only
//! [`Shell::json_event`] prints, one object per line on stdout.

use std::fmt::Display;
use std::io::{self, IsTerminal, Write};
use std::time::{Duration, Instant};

/// Output mode. Human and Json are mutually exclusive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellMode {
    Human { quiet: bool, color: ColorChoice },
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorChoice {
    /// Color when stderr is a terminal.
    #[default]
    Auto,
    Always,
    Never,
}

impl std::str::FromStr for ColorChoice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "auto" => Ok(ColorChoice::Auto),
            "always" => Ok(ColorChoice::Always),
            "never" => Ok(ColorChoice::Never),
            _ => Err(format!(
                "invalid color choice '{}'; expected 'auto', 'always', or 'never'",
                s
            )),
        }
    }
}

/// What a status line reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Generating,
    Building,
    Running,
    Finished,
}

impl Status {
    fn as_str(&self) -> &'static str {
        match self {
            Status::Generating => "Generating",
            Status::Building => "Building",
            Status::Running => "Running",
            Status::Finished => "Finished",
        }
    }

    fn color_code(&self) -> &'static str {
        match self {
            Status::Finished => "\x1b[1;32m",
            Status::Generating | Status::Building | Status::Running => "\x1b[1;36m",
        }
    }
}

/// Status column width.
const STATUS_WIDTH: usize = 12;

const ERROR_COLOR: &str = "\x1b[1;31m";

/// Central console for CLI output.
#[derive(Debug)]
pub struct Shell {
    mode: ShellMode,
    use_color: bool,
}

impl Shell {
    pub fn new(mode: ShellMode) -> Self {
        let use_color = match &mode {
            ShellMode::Json => false,
            ShellMode::Human { color, .. } => match color {
                ColorChoice::Auto => io::stderr().is_terminal(),
                ColorChoice::Always => true,
                ColorChoice::Never => false,
            },
        };

        Shell { mode, use_color }
    }

    /// Build a shell from CLI flags. JSON wins over quiet.
    pub fn from_flags(quiet: bool, color: ColorChoice, json: bool) -> Self {
        if json {
            Shell::new(ShellMode::Json)
        } else {
            Shell::new(ShellMode::Human { quiet, color })
        }
    }

    pub fn is_quiet(&self) -> bool {
        matches!(self.mode, ShellMode::Human { quiet: true, .. })
    }

    pub fn is_json(&self) -> bool {
        matches!(self.mode, ShellMode::Json)
    }

    /// Print `{status:>12} {message}` to stderr.
    ///
    /// Nothing is printed in quiet or JSON mode.
    pub fn status(&self, status: Status, msg: impl Display) {
        if self.is_json() || self.is_quiet() {
            return;
        }
        eprintln!("{} {}", self.format_status(status), msg);
    }

    /// Report a fatal error: `error: {msg}` on stderr, or an `error` event
    /// in JSON mode. Printed even when quiet.
    pub fn error(&self, msg: impl Display) {
        if self.is_json() {
            self.json_event(&serde_json::json!({
                "reason": "error",
                "message": msg.to_string(),
            }));
        } else {
            eprintln!("{}: {}", self.paint(ERROR_COLOR, "error"), msg);
        }
    }

    /// Print a JSON object on stdout. Ignored in human mode.
    pub fn json_event(&self, event: &serde_json::Value) {
        if !self.is_json() {
            return;
        }
        println!("{}", serde_json::to_string(event).unwrap_or_default());
        let _ = io::stdout().flush();
    }

    /// Print `status` now and a `Finished` line with the elapsed time when
    /// the returned guard is finished.
    pub fn timed(&self, status: Status, msg: impl Display) -> Timed<'_> {
        self.status(status, msg);
        Timed {
            shell: self,
            start: Instant::now(),
        }
    }

    fn format_status(&self, status: Status) -> String {
        let text = format!("{:>width$}", status.as_str(), width = STATUS_WIDTH);
        self.paint(status.color_code(), &text)
    }

    fn paint(&self, color: &str, text: &str) -> String {
        if self.use_color {
            format!("{}{}\x1b[0m", color, text)
        } else {
            text.to_string()
        }
    }
}

/// Elapsed-time reporter returned by [`Shell::timed`].
pub struct Timed<'a> {
    shell: &'a Shell,
    start: Instant,
}

impl Timed<'_> {
    pub fn finish(self, msg: impl Display) {
        let elapsed = format_duration(self.start.elapsed());
        self.shell
            .status(Status::Finished, format!("{} in {}", msg, elapsed));
    }
}

fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs_f64();
    if secs < 60.0 {
        format!("{:.2}s", secs)
    } else {
        format!("{:.1}m", secs / 60.0)
    }
}
