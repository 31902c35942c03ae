//! Forked pressure children for the sampler.
//!
//! A child allocates its own buffer after the fork and cycles it on a long
//! cadence, so its pages stay resident between touches. There is no
//! channel back to the parent; the parent owns the whole lifecycle and
//! ends it with SIGKILL plus a blocking reap of that exact pid.

use std::process;
use std::thread;
use std::time::Duration;

use log::debug;
use nix::sys::signal::{kill, Signal};
use nix::sys::wait::waitpid;
use nix::unistd::{fork, ForkResult, Pid};

use crate::error::{ProbeError, Result};
use crate::pressure::PressureBuf;

/// Pause between pressure cycles inside a sampler child. Deliberately far
/// longer than a sampler run: the buffer is filled once and then just
/// sits resident while the rounds watch it age.
pub const CHILD_CYCLE_SLEEP: Duration = Duration::from_secs(1000);

/// Handle to a running pressure child. `stop` consumes the handle, so a
/// spawned pid is killed and reaped at most once.
#[derive(Debug)]
pub struct PressureChild {
    pid: Pid,
}

impl PressureChild {
    /// Fork a child that allocates `bytes` of its own address space and
    /// cycles it forever. The tools are single-threaded, so allocating
    /// after the fork is safe.
    pub fn spawn(bytes: usize) -> Result<Self> {
        match unsafe { fork() }.map_err(ProbeError::Fork)? {
            ForkResult::Parent { child } => {
                debug!("pressure child forked (pid {}, {} bytes)", child, bytes);
                Ok(Self { pid: child })
            }
            ForkResult::Child => child_loop(bytes),
        }
    }

    pub fn pid(&self) -> Pid {
        self.pid
    }

    /// SIGKILL the child and block until it is reaped. Reaping a pid other
    /// than the one spawned is reported as an error.
    pub fn stop(self) -> Result<()> {
        kill(self.pid, Signal::SIGKILL).map_err(ProbeError::Kill)?;
        let status = waitpid(self.pid, None).map_err(ProbeError::Wait)?;
        match status.pid() {
            Some(reaped) if reaped == self.pid => {
                debug!("pressure child reaped (pid {})", reaped);
                Ok(())
            }
            other => Err(ProbeError::ChildMismatch {
                expected: self.pid.as_raw(),
                reaped: other.map_or(-1, Pid::as_raw),
            }),
        }
    }

    #[cfg(test)]
    fn from_raw(pid: i32) -> Self {
        Self {
            pid: Pid::from_raw(pid),
        }
    }
}

/// Body of a pressure child. Writes nothing to stdout; the sampler's
/// output stays one line per round. An allocation failure kills only the
/// child, which exits non-zero after reporting to stderr.
fn child_loop(bytes: usize) -> ! {
    let mut buf = match PressureBuf::alloc(bytes) {
        Ok(buf) => buf,
        Err(e) => {
            eprintln!("{}", e);
            process::exit(1);
        }
    };
    loop {
        let fill: u8 = rand::random();
        let _ = buf.cycle(fill);
        thread::sleep(CHILD_CYCLE_SLEEP);
    }
}
