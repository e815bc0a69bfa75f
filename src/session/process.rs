//! A terminal host backed by a POSIX shell child process.
//!
//! The shell reads commands from a pipe. After every command we ask it to
//! print an OSC 633 style marker carrying the execution id and `$?`; the
//! output reader turns those markers into [`TerminalEvent`]s and forwards
//! everything else to our stdout. A probe marker sent at startup signals
//! integration readiness.

use std::process::Stdio;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio::sync::mpsc;

use super::terminal::{EventSender, ExecutionId, Terminal, TerminalEvent, TerminalHost, TerminalId};

/// Start of every marker the shell prints.
const MARKER_PREFIX: &str = "\x1b]633;";
/// End of a marker.
const MARKER_END: char = '\x07';

/// Spawns one shell process per terminal.
#[derive(Debug)]
pub struct ProcessHost {
    program: String,
    next_id: AtomicU64,
}

impl ProcessHost {
    /// Use `program` (for example `sh` or `bash`) as the shell.
    pub fn new(program: impl Into<String>) -> Self {
        ProcessHost {
            program: program.into(),
            next_id: AtomicU64::new(1),
        }
    }
}

impl Default for ProcessHost {
    fn default() -> Self {
        ProcessHost::new("sh")
    }
}

impl TerminalHost for ProcessHost {
    fn create(&self, name: &str, events: EventSender) -> Result<Arc<dyn Terminal>> {
        let mut child = Command::new(&self.program)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("failed to spawn shell `{}`", self.program))?;

        let stdin = child.stdin.take().context("shell stdin is not piped")?;
        let stdout = child.stdout.take().context("shell stdout is not piped")?;

        let id = TerminalId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let (input, input_rx) = mpsc::unbounded_channel();
        tokio::spawn(write_input(stdin, input_rx));
        tokio::spawn(read_output(child, stdout, events));

        input
            .send("printf '\\033]633;A\\007\\n'\n".to_string())
            .map_err(|_| anyhow!("shell `{}` exited immediately", self.program))?;

        tracing::debug!("spawned `{}` as terminal {} for `{}`", self.program, id, name);
        Ok(Arc::new(ProcessTerminal { id, input }))
    }
}

struct ProcessTerminal {
    id: TerminalId,
    input: mpsc::UnboundedSender<String>,
}

impl Terminal for ProcessTerminal {
    fn id(&self) -> TerminalId {
        self.id
    }

    // A child process has no pane to focus.
    fn is_active(&self) -> bool {
        true
    }

    fn show(&self) {}

    // The command reads from /dev/null so it cannot consume the marker line
    // queued behind it on the shell's input.
    fn execute(&self, execution: ExecutionId, command: &str) -> Result<()> {
        let text = format!(
            "{{ {}\n}} </dev/null\nprintf '\\033]633;D;{};%s\\007\\n' \"$?\"\n",
            command, execution
        );
        self.input
            .send(text)
            .map_err(|_| anyhow!("shell process has exited"))
    }
}

async fn write_input(mut stdin: ChildStdin, mut input: mpsc::UnboundedReceiver<String>) {
    while let Some(text) = input.recv().await {
        let written = match stdin.write_all(text.as_bytes()).await {
            Ok(()) => stdin.flush().await,
            Err(e) => Err(e),
        };
        if let Err(e) = written {
            tracing::warn!("failed to write to shell: {}", e);
            break;
        }
    }
}

async fn read_output(mut child: Child, stdout: ChildStdout, events: EventSender) {
    let mut lines = BufReader::new(stdout).split(b'\n');
    loop {
        match lines.next_segment().await {
            Ok(Some(bytes)) => {
                let line = String::from_utf8_lossy(&bytes);
                let (text, event) = split_marker(line.trim_end_matches('\r'));
                if let Some(text) = text {
                    println!("{}", text);
                }
                if let Some(event) = event {
                    if events.send(event).is_err() {
                        break;
                    }
                }
            }
            Ok(None) => break,
            Err(e) => {
                tracing::warn!("failed to read shell output: {}", e);
                break;
            }
        }
    }

    match child.wait().await {
        Ok(status) => tracing::debug!("shell exited with {}", status),
        Err(e) => tracing::warn!("failed to reap shell: {}", e),
    }
    let _ = events.send(TerminalEvent::Closed);
}

/// Split an output line into user-visible text and an optional marker event.
fn split_marker(line: &str) -> (Option<&str>, Option<TerminalEvent>) {
    let Some(start) = line.find(MARKER_PREFIX) else {
        return (Some(line), None);
    };

    let text = Some(&line[..start]).filter(|t| !t.is_empty());
    let body = &line[start + MARKER_PREFIX.len()..];
    let body = body.split(MARKER_END).next().unwrap_or(body);
    (text, parse_marker(body))
}

fn parse_marker(body: &str) -> Option<TerminalEvent> {
    let mut fields = body.split(';');
    match fields.next()? {
        "A" => Some(TerminalEvent::IntegrationReady),
        "D" => {
            let execution = ExecutionId(fields.next()?.parse().ok()?);
            let exit_code = fields.next().and_then(|code| code.trim().parse().ok());
            Some(TerminalEvent::ExecutionEnded {
                execution,
                exit_code,
            })
        }
        _ => None,
    }
}
