//! Execution probe for candidate scripts.
//!
//! Runs a candidate in an environment capable of rendering a TUI and reports
//! whether it failed and with what diagnostic text. Ordinary program
//! failures are data, never errors: the probe returns a candidate carrying
//! the captured stderr and only raises for its own infrastructure failures
//! (missing interpreter, staging IO, spawn problems).

use std::io::Write;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::error::ProbeError;
use crate::script::Script;

/// Default interpreter used to execute candidates.
const DEFAULT_INTERPRETER: &str = "python3";

/// Default wall-clock window a candidate gets to prove it launches.
const DEFAULT_WINDOW: Duration = Duration::from_secs(5);

/// Executes a candidate and reports success or a diagnostic.
#[async_trait]
pub trait ExecutionProbe: Send + Sync {
    /// Runs `script` and returns it with `stderr` populated on failure or
    /// cleared on success.
    ///
    /// Probing an already-successful candidate again yields no diagnostic:
    /// success is stable for a given script and environment.
    async fn execute(&self, script: &Script) -> Result<Script, ProbeError>;
}

/// Probe that runs candidates as an interpreter subprocess.
///
/// The candidate is staged to a temp file and executed with a wall-clock
/// window. Interactive TUI programs do not exit on their own, so a process
/// still running with no captured stderr when the window closes counts as a
/// successful launch; a process that exited non-zero or wrote to stderr
/// yields that text as the diagnostic.
#[derive(Debug, Clone)]
pub struct SubprocessProbe {
    interpreter: String,
    window: Duration,
}

impl SubprocessProbe {
    /// Creates a probe using the default Python interpreter.
    pub fn new() -> Self {
        Self {
            interpreter: DEFAULT_INTERPRETER.to_string(),
            window: DEFAULT_WINDOW,
        }
    }

    /// Overrides the interpreter binary.
    pub fn with_interpreter(mut self, interpreter: impl Into<String>) -> Self {
        self.interpreter = interpreter.into();
        self
    }

    /// Overrides the execution window.
    pub fn with_window(mut self, window: Duration) -> Self {
        self.window = window;
        self
    }
}

impl Default for SubprocessProbe {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ExecutionProbe for SubprocessProbe {
    async fn execute(&self, script: &Script) -> Result<Script, ProbeError> {
        let mut staged = tempfile::Builder::new()
            .prefix("tuiforge-candidate-")
            .suffix(".py")
            .tempfile()
            .map_err(|e| ProbeError::Staging(e.to_string()))?;
        staged
            .write_all(script.code.as_bytes())
            .map_err(|e| ProbeError::Staging(e.to_string()))?;
        staged
            .flush()
            .map_err(|e| ProbeError::Staging(e.to_string()))?;

        debug!(
            path = %staged.path().display(),
            interpreter = %self.interpreter,
            "Probing candidate"
        );

        let mut child = Command::new(&self.interpreter)
            .arg(staged.path())
            .env("TERM", "xterm-256color")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    ProbeError::InterpreterNotFound(self.interpreter.clone())
                } else {
                    ProbeError::Spawn(e.to_string())
                }
            })?;

        let stderr_pipe = child
            .stderr
            .take()
            .ok_or_else(|| ProbeError::Spawn("stderr pipe unavailable".to_string()))?;
        let capture = tokio::spawn(async move {
            use tokio::io::AsyncReadExt;
            let mut buf = String::new();
            let mut reader = tokio::io::BufReader::new(stderr_pipe);
            let _ = reader.read_to_string(&mut buf).await;
            buf
        });

        let outcome = tokio::time::timeout(self.window, child.wait()).await;

        let diagnostic = match outcome {
            Ok(Ok(status)) => {
                let captured = capture.await.unwrap_or_default();
                let captured = captured.trim().to_string();
                if status.success() && captured.is_empty() {
                    None
                } else if captured.is_empty() {
                    Some(format!("process exited with {status}"))
                } else {
                    Some(captured)
                }
            }
            Ok(Err(e)) => return Err(ProbeError::Spawn(e.to_string())),
            Err(_) => {
                // Still running at window close: the TUI launched. Tear it
                // down and treat any stderr it managed to emit as a failure.
                let _ = child.kill().await;
                let _ = child.wait().await;
                let captured = capture.await.unwrap_or_default();
                let captured = captured.trim().to_string();
                (!captured.is_empty()).then_some(captured)
            }
        };

        match &diagnostic {
            None => debug!(id = %script.id, "Candidate executed cleanly"),
            Some(text) => warn!(
                id = %script.id,
                diagnostic_len = text.len(),
                "Candidate failed execution"
            ),
        }

        Ok(match diagnostic {
            Some(text) => script.with_diagnostic(text),
            None => script.clean(),
        })
    }
}
