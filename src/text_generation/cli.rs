//! Command line based text generation
//!
//! This module provides an implementation of the TextGenerator trait that
//! pipes prompts into a locally installed AI command line tool, such as the
//! Claude Code CLI or the Gemini CLI.

use super::{TextGenerationError, TextGenerator};
use std::io::{self, Read, Write};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};
use tracing::debug;

/// Interval between checks whether the child process has exited
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Text generator backed by an AI command line tool
///
/// The prompt is written to the tool's stdin and its stdout is returned as
/// the reply. The process is killed if it does not finish within the timeout.
#[derive(Debug, Clone)]
pub struct CliGenerator {
    /// Executable name or path
    program: String,
    /// Arguments passed before the prompt is piped in
    args: Vec<String>,
    /// Upper bound for a single invocation
    timeout: Duration,
}

impl CliGenerator {
    /// Creates a generator for an arbitrary command
    pub fn new(program: impl Into<String>, args: Vec<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            args,
            timeout,
        }
    }

    /// Creates a generator using the Claude Code CLI in print mode
    pub fn claude(timeout: Duration) -> Self {
        Self::new(
            "claude",
            vec![
                "-p".to_string(),
                "--output-format".to_string(),
                "text".to_string(),
            ],
            timeout,
        )
    }

    /// Creates a generator using the Gemini CLI
    pub fn gemini(timeout: Duration) -> Self {
        Self::new("gemini", Vec::new(), timeout)
    }

    /// Checks if the CLI is installed and answers `--version` within the timeout
    fn is_installed(&self) -> bool {
        let Ok(mut child) = Command::new(&self.program)
            .arg("--version")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
        else {
            return false;
        };

        matches!(
            wait_until(&mut child, self.timeout),
            Ok(Some(status)) if status.success()
        )
    }

    /// Waits for the child to exit, killing it once the timeout has passed
    fn wait_with_timeout(&self, child: &mut Child) -> Result<ExitStatus, TextGenerationError> {
        match wait_until(child, self.timeout) {
            Ok(Some(status)) => Ok(status),
            Ok(None) => Err(TextGenerationError::ServiceError(format!(
                "{} CLI timed out after {}s",
                self.program,
                self.timeout.as_secs()
            ))),
            Err(e) => Err(TextGenerationError::ServiceError(format!(
                "Failed to wait for {} CLI: {}",
                self.program, e
            ))),
        }
    }
}

/// Polls the child until it exits or `timeout` passes
///
/// Returns `Ok(None)` on timeout, after the child has been killed and reaped.
fn wait_until(child: &mut Child, timeout: Duration) -> io::Result<Option<ExitStatus>> {
    let deadline = Instant::now() + timeout;

    loop {
        match child.try_wait() {
            Ok(Some(status)) => return Ok(Some(status)),
            Ok(None) if Instant::now() >= deadline => {
                kill_and_reap(child);
                return Ok(None);
            }
            Ok(None) => thread::sleep(POLL_INTERVAL),
            Err(e) => {
                kill_and_reap(child);
                return Err(e);
            }
        }
    }
}

fn kill_and_reap(child: &mut Child) {
    let _ = child.kill();
    let _ = child.wait();
}

/// Drains a child pipe on a background thread so the child never blocks on a full pipe
fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> thread::JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let mut buffer = Vec::new();
        if let Some(mut pipe) = pipe {
            let _ = pipe.read_to_end(&mut buffer);
        }
        buffer
    })
}

impl TextGenerator for CliGenerator {
    fn generate(&self, prompt: &str) -> Result<String, TextGenerationError> {
        if !self.is_installed() {
            return Err(TextGenerationError::ServiceError(format!(
                "{} CLI not found. Please install it first.",
                self.program
            )));
        }

        // Spawn the process with piped stdio
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                TextGenerationError::ServiceError(format!(
                    "Failed to spawn {} CLI: {}",
                    self.program, e
                ))
            })?;

        let stdout = drain(child.stdout.take());
        let stderr = drain(child.stderr.take());

        // Write prompt to stdin, closing it afterwards
        if let Some(mut stdin) = child.stdin.take() {
            if let Err(e) = stdin.write_all(prompt.as_bytes()) {
                drop(stdin);
                kill_and_reap(&mut child);
                let _ = stdout.join();
                let _ = stderr.join();
                return Err(TextGenerationError::ServiceError(format!(
                    "Failed to write to {} stdin: {}",
                    self.program, e
                )));
            }
        }

        let status = self.wait_with_timeout(&mut child)?;
        let stdout = stdout.join().unwrap_or_default();
        let stderr = stderr.join().unwrap_or_default();

        // Check exit code
        if !status.success() {
            return Err(TextGenerationError::ServiceError(format!(
                "{} CLI failed with exit code {:?}: {}",
                self.program,
                status.code(),
                String::from_utf8_lossy(&stderr)
            )));
        }

        debug!(program = %self.program, bytes = stdout.len(), "CLI reply received");

        String::from_utf8(stdout).map_err(|e| {
            TextGenerationError::UnexpectedResponse(format!(
                "Invalid UTF-8 in {} response: {}",
                self.program, e
            ))
        })
    }
}
