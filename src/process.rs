//! Bounded subprocess capture.
//!
//! Both `git diff` and the local Claude CLI can produce arbitrarily large
//! output. Every stream is read through a hard byte ceiling; a process that
//! exceeds it is killed and reported instead of buffered.

use std::io;
use std::process::{ExitStatus, Stdio};

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::process::Command;

/// Output ceiling for any captured stream (10 MiB).
pub const OUTPUT_LIMIT: usize = 10 * 1024 * 1024;

/// Captured result of a finished process.
#[derive(Debug)]
pub struct CapturedOutput {
    pub status: ExitStatus,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl CapturedOutput {
    pub fn stdout_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stdout).to_string()
    }

    pub fn stderr_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stderr).to_string()
    }

    /// Exit code, or -1 when the process was killed by a signal.
    pub fn code(&self) -> i32 {
        self.status.code().unwrap_or(-1)
    }
}

/// Failure modes of [`run_capped`].
#[derive(Debug)]
pub enum CaptureError {
    Spawn(io::Error),
    Io(io::Error),
    TooLarge { limit: usize },
}

/// Run `command`, optionally feeding `input` to its stdin, and capture stdout
/// and stderr up to `limit` bytes each.
///
/// Stdin is written concurrently with reading the output pipes so a child
/// that streams output before consuming all of its input cannot deadlock.
pub async fn run_capped(
    mut command: Command,
    input: Option<&[u8]>,
    limit: usize,
) -> Result<CapturedOutput, CaptureError> {
    command
        .stdin(if input.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        })
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let mut child = command.spawn().map_err(CaptureError::Spawn)?;

    let stdin = child.stdin.take();
    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| CaptureError::Io(io::Error::other("stdout was not captured")))?;
    let stderr = child
        .stderr
        .take()
        .ok_or_else(|| CaptureError::Io(io::Error::other("stderr was not captured")))?;

    let write_input = async move {
        if let (Some(mut pipe), Some(bytes)) = (stdin, input) {
            match pipe.write_all(bytes).await {
                // The child may exit without reading everything.
                Err(e) if e.kind() == io::ErrorKind::BrokenPipe => return Ok(()),
                other => other?,
            }
            pipe.shutdown().await?;
        }
        Ok::<(), io::Error>(())
    };

    let (written, out, err) = tokio::join!(
        write_input,
        read_capped(stdout, limit),
        read_capped(stderr, limit)
    );

    let (stdout, stdout_overflow) = out.map_err(CaptureError::Io)?;
    let (stderr, stderr_overflow) = err.map_err(CaptureError::Io)?;

    if stdout_overflow || stderr_overflow {
        let _ = child.kill().await;
        return Err(CaptureError::TooLarge { limit });
    }

    written.map_err(CaptureError::Io)?;

    let status = child.wait().await.map_err(CaptureError::Io)?;

    Ok(CapturedOutput {
        status,
        stdout,
        stderr,
    })
}

/// Read at most `limit` bytes. The flag reports whether more data was pending.
async fn read_capped<R: AsyncRead + Unpin>(reader: R, limit: usize) -> io::Result<(Vec<u8>, bool)> {
    let mut buf = Vec::new();
    reader.take(limit as u64 + 1).read_to_end(&mut buf).await?;
    let overflow = buf.len() > limit;
    buf.truncate(limit);
    Ok((buf, overflow))
}
