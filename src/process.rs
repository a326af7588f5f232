//! Subprocess execution with a hard timeout.
//!
//! The child is polled with `try_wait` and a short sleep; stdout and stderr
//! are drained on helper threads so a child that writes a lot cannot block
//! on a full pipe. On Unix the child leads its own process group, and the
//! whole group is killed once the deadline passes, so anything the renderer
//! started (a browser, a backgrounded helper) goes with it.

use std::io::Read;
use std::path::PathBuf;
use std::process::{Child, Command, ExitStatus};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

#[cfg(unix)]
use std::os::unix::process::CommandExt;

use crate::error::CourierError;

const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// What a finished child left behind.
#[derive(Debug)]
pub struct ProcessOutput {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

/// Spawn `command` and wait for it, killing it once `timeout` has elapsed.
///
/// The deadline also covers the output pipes: if a descendant keeps them
/// open after the child exits, the process group is killed and the run
/// counts as timed out.
///
/// `command` must have piped stdout/stderr (see
/// [`RenderCommand::to_command`](crate::command::RenderCommand::to_command)).
pub fn run(mut command: Command, timeout: Option<Duration>) -> Result<ProcessOutput, CourierError> {
    #[cfg(unix)]
    command.process_group(0);

    let program = PathBuf::from(command.get_program());
    let mut child = command
        .spawn()
        .map_err(|source| CourierError::Spawn { program, source })?;

    let stdout = drain(child.stdout.take());
    let stderr = drain(child.stderr.take());
    let deadline = timeout.map(|limit| Instant::now() + limit);
    let limit = timeout.unwrap_or_default();

    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) => {
                if deadline.is_some_and(|at| Instant::now() >= at) {
                    log::warn!("Renderer exceeded {}s, killing pid {}", limit.as_secs(), child.id());
                    terminate(&mut child);
                    // Readers are left detached: processes outside the group may still hold the pipes.
                    return Err(CourierError::Timeout(limit));
                }
                thread::sleep(POLL_INTERVAL);
            }
            Err(e) => {
                terminate(&mut child);
                return Err(CourierError::Renderer(format!("failed to wait for renderer: {e}")));
            }
        }
    };

    match (collect(stdout, deadline), collect(stderr, deadline)) {
        (Some(stdout), Some(stderr)) => Ok(ProcessOutput {
            status,
            stdout,
            stderr,
        }),
        _ => {
            log::warn!(
                "Renderer pid {} exited but its output is still open after {}s",
                child.id(),
                limit.as_secs()
            );
            kill_group(&mut child);
            Err(CourierError::Timeout(limit))
        }
    }
}

/// Kill the child's process group and reap the child.
fn terminate(child: &mut Child) {
    kill_group(child);
    let _ = child.wait();
}

#[cfg(unix)]
fn kill_group(child: &mut Child) {
    match libc::pid_t::try_from(child.id()) {
        // SAFETY: killpg has no memory-safety preconditions; the group id is
        // the child's pid because it was spawned with process_group(0).
        Ok(pgid) => unsafe {
            libc::killpg(pgid, libc::SIGKILL);
        },
        Err(_) => {
            let _ = child.kill();
        }
    }
}

#[cfg(not(unix))]
fn kill_group(child: &mut Child) {
    let _ = child.kill();
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> Option<Receiver<Vec<u8>>> {
    pipe.map(|mut pipe| {
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let mut buf = Vec::new();
            let _ = pipe.read_to_end(&mut buf);
            let _ = tx.send(buf);
        });
        rx
    })
}

/// Wait for a reader to finish. `None` means the deadline passed first.
fn collect(reader: Option<Receiver<Vec<u8>>>, deadline: Option<Instant>) -> Option<String> {
    let Some(reader) = reader else {
        return Some(String::new());
    };
    let bytes = match deadline {
        Some(at) => match reader.recv_timeout(at.saturating_duration_since(Instant::now())) {
            Ok(bytes) => bytes,
            Err(RecvTimeoutError::Timeout) => return None,
            Err(RecvTimeoutError::Disconnected) => Vec::new(),
        },
        None => reader.recv().unwrap_or_default(),
    };
    Some(String::from_utf8_lossy(&bytes).into_owned())
}
