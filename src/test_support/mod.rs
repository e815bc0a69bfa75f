//! Test utilities and mocks for unit tests.
//!
//! [`MockHost`] stands in for a real terminal host: it records what the
//! session sends and lets tests drive integration, completion and closure by
//! hand, or reply automatically from a script.
//!
//! # Example
//!
//! ```rust,ignore
//! let host = MockHost::ready();
//! host.reply(&[None, Some(0)]); // subshell, then success
//! let session = ShellSession::new("test", host.clone());
//! session.exec("nix develop").await?;
//! ```

pub mod fixtures;

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::{bail, Result};

use crate::session::{EventSender, ExecutionId, Terminal, TerminalEvent, TerminalHost, TerminalId};

pub use fixtures::*;

#[derive(Default)]
struct HostState {
    terminals: Vec<Arc<MockTerminal>>,
    replies: VecDeque<Option<i32>>,
    create_error: Option<String>,
}

/// Scripted terminal host.
#[derive(Clone)]
pub struct MockHost {
    auto_integrate: bool,
    state: Arc<Mutex<HostState>>,
}

impl MockHost {
    /// Terminals report integration readiness as soon as they exist.
    pub fn ready() -> Self {
        MockHost {
            auto_integrate: true,
            state: Arc::default(),
        }
    }

    /// Terminals wait for [`MockTerminal::integrate`].
    pub fn manual() -> Self {
        MockHost {
            auto_integrate: false,
            state: Arc::default(),
        }
    }

    /// Queue exit codes reported for the next executions, one per command.
    /// `None` entries stay with the same command (a subshell), so
    /// `[None, Some(0)]` completes a single command.
    pub fn reply(&self, codes: &[Option<i32>]) {
        self.state.lock().unwrap().replies.extend(codes.iter().copied());
    }

    /// Make the next `create` fail.
    pub fn fail_create(&self, message: &str) {
        self.state.lock().unwrap().create_error = Some(message.to_string());
    }

    /// Number of terminals created so far.
    pub fn created(&self) -> usize {
        self.state.lock().unwrap().terminals.len()
    }

    /// The `index`th terminal created.
    pub fn terminal(&self, index: usize) -> Arc<MockTerminal> {
        Arc::clone(&self.state.lock().unwrap().terminals[index])
    }
}

impl TerminalHost for MockHost {
    fn create(&self, _name: &str, events: EventSender) -> Result<Arc<dyn Terminal>> {
        let mut state = self.state.lock().unwrap();
        if let Some(message) = state.create_error.take() {
            bail!("{}", message);
        }

        let terminal = Arc::new(MockTerminal {
            id: TerminalId(state.terminals.len() as u64 + 1),
            events,
            host: Arc::clone(&self.state),
            active: AtomicBool::new(false),
            closed: AtomicBool::new(false),
            shows: AtomicUsize::new(0),
            sent: Mutex::new(Vec::new()),
        });
        if self.auto_integrate {
            terminal.integrate();
        }
        state.terminals.push(Arc::clone(&terminal));
        Ok(terminal)
    }
}

/// A terminal that records input and emits events on request.
pub struct MockTerminal {
    id: TerminalId,
    events: EventSender,
    host: Arc<Mutex<HostState>>,
    active: AtomicBool,
    closed: AtomicBool,
    shows: AtomicUsize,
    sent: Mutex<Vec<(ExecutionId, String)>>,
}

impl MockTerminal {
    /// Report integration readiness.
    pub fn integrate(&self) {
        let _ = self.events.send(TerminalEvent::IntegrationReady);
    }

    /// Report the end of `execution`.
    pub fn finish(&self, execution: ExecutionId, exit_code: Option<i32>) {
        let _ = self.events.send(TerminalEvent::ExecutionEnded {
            execution,
            exit_code,
        });
    }

    /// Simulate the user closing the terminal.
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
        let _ = self.events.send(TerminalEvent::Closed);
    }

    /// Simulate another terminal taking the foreground.
    pub fn deactivate(&self) {
        self.active.store(false, Ordering::SeqCst);
    }

    pub fn show_count(&self) -> usize {
        self.shows.load(Ordering::SeqCst)
    }

    /// Commands received, in order.
    pub fn sent(&self) -> Vec<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .map(|(_, command)| command.clone())
            .collect()
    }

    pub fn last_execution(&self) -> Option<ExecutionId> {
        self.sent.lock().unwrap().last().map(|(execution, _)| *execution)
    }
}

impl Terminal for MockTerminal {
    fn id(&self) -> TerminalId {
        self.id
    }

    fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    fn show(&self) {
        self.active.store(true, Ordering::SeqCst);
        self.shows.fetch_add(1, Ordering::SeqCst);
    }

    fn execute(&self, execution: ExecutionId, command: &str) -> Result<()> {
        if self.closed.load(Ordering::SeqCst) {
            bail!("terminal {} is closed", self.id);
        }
        self.sent
            .lock()
            .unwrap()
            .push((execution, command.to_string()));

        let mut host = self.host.lock().unwrap();
        while let Some(code) = host.replies.pop_front() {
            self.finish(execution, code);
            if code.is_some() {
                break;
            }
        }
        Ok(())
    }
}

/// Yield to other tasks until `condition` holds.
pub async fn eventually(condition: impl Fn() -> bool) {
    for _ in 0..1000 {
        if condition() {
            return;
        }
        tokio::task::yield_now().await;
    }
    panic!("condition not reached");
}
