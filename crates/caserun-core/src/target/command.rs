use super::TargetModel;
use crate::model::Assignment;
use crate::watchdog::{self, WatchdogError};
use anyhow::{bail, Context};
use serde_json::Value;
use std::io::{Read, Write};
use std::process::{Child, Command, Stdio};
use std::thread;
use std::time::Duration;

/// Cap on captured stderr; a misbehaving child must not balloon the
/// failure annotation.
const STDERR_CAP: usize = 4096;

/// How long to wait for a killed child to be reaped before declaring it
/// unkillable.
const REAP_TIMEOUT: Duration = Duration::from_secs(2);

/// External-process target: one subprocess per case.
///
/// `run` writes `{"id": ..., "inputs": {...}}` as JSON on the child's
/// stdin, waits up to the configured timeout, and treats non-zero exit or
/// timeout as execution failure. `read_outputs` parses the child's stdout
/// as a JSON object of named outputs, reported sorted by name.
pub struct CommandModel {
    program: String,
    args: Vec<String>,
    timeout: Duration,
    staged: Vec<Assignment>,
    stdout: Option<String>,
}

impl CommandModel {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            timeout: Duration::from_secs(30),
            staged: Vec::new(),
            stdout: None,
        }
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Wall-clock limit per execution.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn stdin_payload(&self, case_id: &str) -> Value {
        let mut inputs = serde_json::Map::new();
        for a in &self.staged {
            inputs.insert(a.name.clone(), a.value.clone());
        }
        serde_json::json!({ "id": case_id, "inputs": inputs })
    }
}

impl TargetModel for CommandModel {
    fn apply_inputs(&mut self, inputs: &[Assignment]) -> anyhow::Result<()> {
        if let Some(a) = inputs.iter().find(|a| a.name.is_empty()) {
            bail!("input with empty name (value {})", a.value);
        }
        self.staged = inputs.to_vec();
        self.stdout = None;
        Ok(())
    }

    fn run(&mut self, case_id: &str) -> anyhow::Result<()> {
        let payload = self.stdin_payload(case_id);
        tracing::debug!(case_id, program = %self.program, "spawning command target");

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .with_context(|| format!("failed to spawn '{}'", self.program))?;

        // Drain both pipes on helper threads while waiting: a child whose
        // output exceeds the OS pipe buffer would otherwise block on write
        // and never exit.
        let stdout_reader = spawn_reader(child.stdout.take(), usize::MAX);
        let stderr_reader = spawn_reader(child.stderr.take(), STDERR_CAP);

        // The child is free to exit without reading its stdin; a broken
        // pipe here is not a failure.
        if let Some(mut stdin) = child.stdin.take() {
            let _ = stdin.write_all(payload.to_string().as_bytes());
        }

        match child.wait_timeout(self.timeout) {
            Ok(Some(status)) => {
                let stdout = stdout_reader.join().unwrap_or_default();
                let stderr = stderr_reader.join().unwrap_or_default();
                if !status.success() {
                    if stderr.trim().is_empty() {
                        bail!("'{}' exited with {}", self.program, status);
                    }
                    bail!("'{}' exited with {}: {}", self.program, status, stderr.trim());
                }
                self.stdout = Some(stdout);
                Ok(())
            }
            Ok(None) => {
                let _ = child.kill();
                let timeout = self.timeout;
                match watchdog::join_timeout("reap timed-out command", REAP_TIMEOUT, move || {
                    let _ = child.wait();
                }) {
                    Ok(()) => bail!("'{}' timed out after {:?}", self.program, timeout),
                    Err(WatchdogError::Hung { .. }) => bail!(
                        "'{}' timed out after {:?} and survived kill",
                        self.program,
                        timeout
                    ),
                    Err(e) => bail!(
                        "'{}' timed out after {:?}; reaping it failed: {}",
                        self.program,
                        timeout,
                        e
                    ),
                }
            }
            Err(e) => {
                let _ = child.kill();
                let _ = child.wait();
                Err(e).with_context(|| format!("failed waiting for '{}'", self.program))
            }
        }
    }

    fn read_outputs(&mut self) -> anyhow::Result<Vec<Assignment>> {
        let Some(text) = self.stdout.take() else {
            bail!("no command output to read");
        };
        let value: Value = serde_json::from_str(text.trim())
            .with_context(|| format!("'{}' stdout is not valid JSON", self.program))?;
        let Value::Object(map) = value else {
            bail!("'{}' stdout must be a JSON object of named outputs", self.program);
        };
        let mut outputs: Vec<Assignment> = map
            .into_iter()
            .map(|(name, value)| Assignment::new(name, value))
            .collect();
        // JSON object key order carries no meaning; sort for stable dumps.
        outputs.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(outputs)
    }
}

// The reader outlives a timed-out child on purpose: once the child is
// killed its pipe closes and the thread finishes on its own.
fn spawn_reader<R: Read + Send + 'static>(
    pipe: Option<R>,
    cap: usize,
) -> thread::JoinHandle<String> {
    thread::spawn(move || read_pipe(pipe, cap))
}

fn read_pipe<R: Read>(pipe: Option<R>, cap: usize) -> String {
    let mut buf = String::new();
    if let Some(mut r) = pipe {
        let _ = r.read_to_string(&mut buf);
    }
    if buf.len() > cap {
        // Keep the truncation on a char boundary.
        let mut end = cap;
        while !buf.is_char_boundary(end) {
            end -= 1;
        }
        buf.truncate(end);
    }
    buf
}

trait ChildExt {
    fn wait_timeout(
        &mut self,
        timeout: Duration,
    ) -> std::io::Result<Option<std::process::ExitStatus>>;
}

impl ChildExt for Child {
    fn wait_timeout(
        &mut self,
        timeout: Duration,
    ) -> std::io::Result<Option<std::process::ExitStatus>> {
        let start = std::time::Instant::now();
        let poll_interval = Duration::from_millis(50);

        loop {
            match self.try_wait()? {
                Some(status) => return Ok(Some(status)),
                None => {
                    if start.elapsed() >= timeout {
                        return Ok(None);
                    }
                    std::thread::sleep(poll_interval);
                }
            }
        }
    }
}
