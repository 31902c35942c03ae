//! Error types for the pagewatch tools.
//!
//! Every tool follows the same policy: the first failing syscall or
//! allocation ends the run. Errors render perror-style, naming the
//! operation and the kernel file it hit, and the binaries print them to
//! stderr before exiting non-zero. There is no retry or partial-result
//! path anywhere in the suite.

use std::fmt;
use std::io;

use nix::errno::Errno;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ProbeError>;

/// A fatal error from one of the kernel interfaces or from child
/// process management.
#[derive(Debug)]
pub enum ProbeError {
    /// open(2) on a kernel interface file failed.
    Open {
        path: &'static str,
        source: io::Error,
    },
    /// read(2) from a kernel interface file failed.
    Read {
        path: &'static str,
        source: io::Error,
    },
    /// write(2) to a kernel interface file or stream failed.
    Write {
        path: &'static str,
        source: io::Error,
    },
    /// sysconf(_SC_PAGESIZE) failed.
    PageSize(io::Error),
    /// The pressure buffer reservation failed.
    Alloc { bytes: usize },
    /// fork(2) failed.
    Fork(Errno),
    /// kill(2) on a pressure child failed.
    Kill(Errno),
    /// waitpid(2) on a pressure child failed.
    Wait(Errno),
    /// waitpid(2) reaped a pid other than the one requested.
    ChildMismatch { expected: i32, reaped: i32 },
}

impl ProbeError {
    pub fn open(path: &'static str, source: io::Error) -> Self {
        Self::Open { path, source }
    }

    pub fn read(path: &'static str, source: io::Error) -> Self {
        Self::Read { path, source }
    }

    pub fn write(path: &'static str, source: io::Error) -> Self {
        Self::Write { path, source }
    }
}

impl fmt::Display for ProbeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open { path, source } => write!(f, "open {}: {}", path, source),
            Self::Read { path, source } => write!(f, "read {}: {}", path, source),
            Self::Write { path, source } => write!(f, "write {}: {}", path, source),
            Self::PageSize(source) => write!(f, "sysconf(_SC_PAGESIZE): {}", source),
            Self::Alloc { bytes } => write!(f, "cannot allocate {} bytes", bytes),
            Self::Fork(errno) => write!(f, "fork: {}", errno.desc()),
            Self::Kill(errno) => write!(f, "kill: {}", errno.desc()),
            Self::Wait(errno) => write!(f, "waitpid: {}", errno.desc()),
            Self::ChildMismatch { expected, reaped } => {
                write!(f, "waitpid: reaped pid {}, expected {}", reaped, expected)
            }
        }
    }
}

impl std::error::Error for ProbeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Open { source, .. } | Self::Read { source, .. } | Self::Write { source, .. } => {
                Some(source)
            }
            Self::PageSize(source) => Some(source),
            _ => None,
        }
    }
}
