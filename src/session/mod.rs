//! A single reusable shell session.
//!
//! [`ShellSession`] owns at most one terminal at a time, creating it lazily
//! and again after it is closed. Every [`exec`](ShellSession::exec) waits for
//! the terminal to finish integrating, sends its command, and resolves once
//! the terminal reports an exit code for that execution.
//!
//! # Lifecycle
//!
//! ```text
//! Absent -> Created -> AwaitingIntegration -> Ready -> Executing -> Ready
//!                                                          |  ^
//!                                                          v  |
//!                                                 AwaitingSubshellExit
//! ```
//!
//! Closing the terminal from any state returns the session to `Absent` and
//! fails outstanding executions with [`ExecError::SessionLost`].
//!
//! Calls to `exec` are serialized: a second call waits until the first one
//! completes instead of typing into the same input stream.

pub mod process;
pub mod terminal;

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use thiserror::Error;
use tokio::sync::{mpsc, oneshot, watch};

pub use process::ProcessHost;
pub use terminal::{EventSender, ExecutionId, Terminal, TerminalEvent, TerminalHost, TerminalId};

/// Where the session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Absent,
    Created,
    AwaitingIntegration,
    Ready,
    Executing,
    AwaitingSubshellExit,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            SessionState::Absent => "absent",
            SessionState::Created => "created",
            SessionState::AwaitingIntegration => "awaiting integration",
            SessionState::Ready => "ready",
            SessionState::Executing => "executing",
            SessionState::AwaitingSubshellExit => "awaiting subshell exit",
        };
        f.write_str(text)
    }
}

/// Why an execution did not succeed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ExecError {
    #[error("command exited with code {code}")]
    CommandFailed { code: i32 },

    #[error("shell session was closed before the command finished")]
    SessionLost,

    #[error("failed to start shell session: {0}")]
    Start(String),

    #[error("failed to send command: {0}")]
    Send(String),
}

type Completion = oneshot::Sender<Result<(), ExecError>>;

#[derive(Clone)]
struct Attached {
    terminal: Arc<dyn Terminal>,
    ready: watch::Receiver<bool>,
}

struct Shared {
    state: SessionState,
    attached: Option<Attached>,
    pending: HashMap<ExecutionId, Completion>,
}

impl Shared {
    fn is_attached(&self, terminal: TerminalId) -> bool {
        self.attached
            .as_ref()
            .is_some_and(|a| a.terminal.id() == terminal)
    }

    fn transition(&mut self, state: SessionState) {
        if self.state != state {
            tracing::debug!("session {} -> {}", self.state, state);
            self.state = state;
        }
    }
}

/// One logical shell session, reused across commands.
pub struct ShellSession {
    name: String,
    host: Arc<dyn TerminalHost>,
    turn: tokio::sync::Mutex<()>,
    shared: Arc<Mutex<Shared>>,
    next_execution: AtomicU64,
}

impl ShellSession {
    /// Create a session whose terminals come from `host`.
    pub fn new(name: impl Into<String>, host: impl TerminalHost + 'static) -> Self {
        ShellSession {
            name: name.into(),
            host: Arc::new(host),
            turn: tokio::sync::Mutex::new(()),
            shared: Arc::new(Mutex::new(Shared {
                state: SessionState::Absent,
                attached: None,
                pending: HashMap::new(),
            })),
            next_execution: AtomicU64::new(1),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> SessionState {
        lock(&self.shared).state
    }

    /// Run `command` in the session and wait for it to exit with code 0.
    pub async fn exec(&self, command: &str) -> Result<(), ExecError> {
        let _turn = self.turn.lock().await;

        let attached = self.attach()?;
        let terminal = attached.terminal.id();

        let mut ready = attached.ready.clone();
        let integrated = *ready.borrow();
        if !integrated {
            lock(&self.shared).transition(SessionState::AwaitingIntegration);
            if ready.wait_for(|ready| *ready).await.is_err() {
                return Err(ExecError::SessionLost);
            }
        }

        let execution = ExecutionId(self.next_execution.fetch_add(1, Ordering::Relaxed));
        let (tx, rx) = oneshot::channel();
        {
            let mut shared = lock(&self.shared);
            if !shared.is_attached(terminal) {
                return Err(ExecError::SessionLost);
            }
            shared.pending.insert(execution, tx);
            shared.transition(SessionState::Executing);
        }

        tracing::info!("[{}] $ {}", self.name, command);
        if let Err(e) = attached.terminal.execute(execution, command) {
            let mut shared = lock(&self.shared);
            shared.pending.remove(&execution);
            if shared.is_attached(terminal) {
                shared.transition(SessionState::Ready);
            }
            return Err(ExecError::Send(format!("{:#}", e)));
        }

        rx.await.unwrap_or(Err(ExecError::SessionLost))
    }

    /// Return the current terminal, creating one if needed and bringing it
    /// to the foreground.
    fn attach(&self) -> Result<Attached, ExecError> {
        let mut shared = lock(&self.shared);

        if let Some(attached) = &shared.attached {
            if !attached.terminal.is_active() {
                tracing::debug!("showing terminal {}", attached.terminal.id());
                attached.terminal.show();
            }
            return Ok(attached.clone());
        }

        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let terminal = self
            .host
            .create(&self.name, events_tx)
            .map_err(|e| ExecError::Start(format!("{:#}", e)))?;
        terminal.show();
        tracing::debug!("created terminal {} for `{}`", terminal.id(), self.name);

        let (ready_tx, ready_rx) = watch::channel(false);
        let attached = Attached {
            terminal: Arc::clone(&terminal),
            ready: ready_rx,
        };
        shared.attached = Some(attached.clone());
        shared.transition(SessionState::Created);

        tokio::spawn(dispatch(
            Arc::clone(&self.shared),
            terminal.id(),
            ready_tx,
            events_rx,
        ));

        Ok(attached)
    }
}

/// Route a terminal's events to the executions waiting on them.
async fn dispatch(
    shared: Arc<Mutex<Shared>>,
    terminal: TerminalId,
    ready: watch::Sender<bool>,
    mut events: mpsc::UnboundedReceiver<TerminalEvent>,
) {
    while let Some(event) = events.recv().await {
        match event {
            TerminalEvent::IntegrationReady => {
                ready.send_replace(true);
                let mut shared = lock(&shared);
                if matches!(
                    shared.state,
                    SessionState::Created | SessionState::AwaitingIntegration
                ) {
                    shared.transition(SessionState::Ready);
                }
            }
            TerminalEvent::ExecutionEnded {
                execution,
                exit_code: None,
            } => {
                let mut shared = lock(&shared);
                if shared.pending.contains_key(&execution) {
                    tracing::debug!("execution {} entered a subshell", execution);
                    shared.transition(SessionState::AwaitingSubshellExit);
                }
            }
            TerminalEvent::ExecutionEnded {
                execution,
                exit_code: Some(code),
            } => {
                let mut shared = lock(&shared);
                let Some(completion) = shared.pending.remove(&execution) else {
                    tracing::debug!("ignoring end of unknown execution {}", execution);
                    continue;
                };
                shared.transition(SessionState::Ready);
                let outcome = if code == 0 {
                    Ok(())
                } else {
                    Err(ExecError::CommandFailed { code })
                };
                let _ = completion.send(outcome);
            }
            TerminalEvent::Closed => break,
        }
    }

    let mut shared = lock(&shared);
    if shared.is_attached(terminal) {
        shared.attached = None;
        shared.transition(SessionState::Absent);
    }
    if !shared.pending.is_empty() {
        tracing::warn!("terminal {} closed with commands outstanding", terminal);
    }
    for (_, completion) in shared.pending.drain() {
        let _ = completion.send(Err(ExecError::SessionLost));
    }
}

fn lock(shared: &Mutex<Shared>) -> MutexGuard<'_, Shared> {
    shared.lock().unwrap_or_else(PoisonError::into_inner)
}
