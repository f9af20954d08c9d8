//! FFmpeg execution adapter
//!
//! Runs the compiled argument vector against an ffmpeg binary and reports
//! the run through [`EngineCallbacks`].

use std::collections::VecDeque;
use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::process::{Child, ChildStderr, Command};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::domain::errors::*;
use crate::ports::*;

/// Number of trailing stderr lines kept for failure diagnostics
const DIAGNOSTIC_TAIL: usize = 12;

/// FFmpeg-based execution adapter
pub struct FFmpegAdapter {
    program: PathBuf,
}

impl FFmpegAdapter {
    /// Create new FFmpeg adapter for the given binary
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for FFmpegAdapter {
    fn default() -> Self {
        Self::new("ffmpeg")
    }
}

#[async_trait]
impl EnginePort for FFmpegAdapter {
    async fn submit(
        &self,
        args: &[String],
        callbacks: Arc<dyn EngineCallbacks>,
        cancel: CancellationToken,
    ) -> Result<(), DomainError> {
        debug!(program = %self.program.display(), ?args, "Spawning engine");

        let mut child = Command::new(&self.program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                DomainError::EngineInvocationFailure(format!(
                    "failed to spawn {}: {}",
                    self.program.display(),
                    e
                ))
            })?;

        let stderr = child.stderr.take().ok_or_else(|| {
            DomainError::EngineInvocationFailure("engine stderr was not captured".to_string())
        })?;

        tokio::spawn(run_to_completion(child, stderr, callbacks, cancel));
        Ok(())
    }

    fn name(&self) -> &str {
        "ffmpeg"
    }
}

/// Drive one child process and fire its callbacks in order
async fn run_to_completion(
    mut child: Child,
    stderr: ChildStderr,
    callbacks: Arc<dyn EngineCallbacks>,
    cancel: CancellationToken,
) {
    callbacks.on_start();

    let outcome = tokio::select! {
        result = relay_and_wait(&mut child, stderr, callbacks.as_ref()) => Some(result),
        _ = cancel.cancelled() => None,
    };

    match outcome {
        Some(Ok((status, _))) if status.success() => {
            callbacks.on_success(&format!("engine exited with {}", status));
        }
        Some(Ok((status, tail))) => {
            callbacks.on_failure(&failure_message(&status.to_string(), &tail));
        }
        Some(Err(e)) => {
            callbacks.on_failure(&format!("failed to wait for engine: {}", e));
        }
        None => {
            if let Err(e) = child.kill().await {
                warn!("Failed to kill cancelled engine process: {}", e);
            }
            callbacks.on_failure("engine execution cancelled");
        }
    }

    callbacks.on_finish();
}

/// Forward stderr as progress, then wait for the exit status
async fn relay_and_wait(
    child: &mut Child,
    stderr: ChildStderr,
    callbacks: &dyn EngineCallbacks,
) -> std::io::Result<(ExitStatus, Vec<String>)> {
    let mut reader = BufReader::new(stderr);
    let mut segment = Vec::new();
    let mut tail: VecDeque<String> = VecDeque::with_capacity(DIAGNOSTIC_TAIL);

    while read_segment(&mut reader, &mut segment).await? {
        let line = String::from_utf8_lossy(&segment);
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        callbacks.on_progress(line);
        if tail.len() == DIAGNOSTIC_TAIL {
            tail.pop_front();
        }
        tail.push_back(line.to_string());
    }

    let status = child.wait().await?;
    Ok((status, tail.into_iter().collect()))
}

/// Read up to the next `\n` or `\r`; ffmpeg rewrites its stats line with `\r`.
///
/// Returns `false` at end of stream with nothing buffered.
pub async fn read_segment<R>(reader: &mut R, buf: &mut Vec<u8>) -> std::io::Result<bool>
where
    R: AsyncBufRead + Unpin,
{
    buf.clear();
    loop {
        let available = reader.fill_buf().await?;
        if available.is_empty() {
            return Ok(!buf.is_empty());
        }
        if let Some(pos) = available.iter().position(|b| *b == b'\n' || *b == b'\r') {
            buf.extend_from_slice(&available[..pos]);
            reader.consume(pos + 1);
            return Ok(true);
        }
        let len = available.len();
        buf.extend_from_slice(available);
        reader.consume(len);
    }
}

fn failure_message(status: &str, tail: &[String]) -> String {
    if tail.is_empty() {
        format!("engine exited with {}", status)
    } else {
        format!("engine exited with {}: {}", status, tail.join("\n"))
    }
}
