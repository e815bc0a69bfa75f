//! The seam between [`ShellSession`](super::ShellSession) and whatever
//! actually hosts the interactive shell.
//!
//! A host creates terminals on demand. Each terminal reports what happens to
//! it through the event channel it was created with: integration readiness,
//! the end of an execution, and its own closure.

use std::fmt;
use std::sync::Arc;

use anyhow::Result;
use tokio::sync::mpsc;

/// Identifies a terminal for the lifetime of the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TerminalId(pub u64);

impl fmt::Display for TerminalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifies one command sent to a terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExecutionId(pub u64);

impl fmt::Display for ExecutionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Something that happened to a terminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TerminalEvent {
    /// The terminal can now report command completion.
    IntegrationReady,
    /// An execution finished. No exit code means the command opened a
    /// nested interactive layer and the execution is still running.
    ExecutionEnded {
        execution: ExecutionId,
        exit_code: Option<i32>,
    },
    /// The terminal is gone.
    Closed,
}

/// Where a terminal reports its events.
pub type EventSender = mpsc::UnboundedSender<TerminalEvent>;

/// A live interactive terminal.
pub trait Terminal: Send + Sync {
    fn id(&self) -> TerminalId;

    /// Whether this terminal is the one currently in the foreground.
    fn is_active(&self) -> bool;

    /// Bring the terminal to the foreground.
    fn show(&self);

    /// Send `command` as input, tagged with `execution` for completion.
    fn execute(&self, execution: ExecutionId, command: &str) -> Result<()>;
}

/// Creates terminals.
pub trait TerminalHost: Send + Sync {
    fn create(&self, name: &str, events: EventSender) -> Result<Arc<dyn Terminal>>;
}
