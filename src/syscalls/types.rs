/*!
 * Syscall Types
 * Error numbers and results handed back to user level
 */

use crate::core::errors::PidError;
use crate::core::types::{ExitStatus, Pid};
use crate::process::ForkError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Kernel error numbers
/// [POSIX-COMPAT] values match Linux
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(i32)]
pub enum Errno {
    #[error("ESRCH: no such process")]
    ESRCH = 3,
    #[error("ECHILD: not a child of the caller")]
    ECHILD = 10,
    #[error("EAGAIN: process table full")]
    EAGAIN = 11,
    #[error("ENOMEM: out of memory")]
    ENOMEM = 12,
    #[error("EINVAL: invalid argument")]
    EINVAL = 22,
    #[error("EDEADLK: would deadlock")]
    EDEADLK = 35,
}

impl Errno {
    #[inline]
    pub const fn code(self) -> i32 {
        self as i32
    }
}

impl From<&PidError> for Errno {
    fn from(err: &PidError) -> Self {
        match err {
            PidError::ResourceExhausted { .. } => Errno::EAGAIN,
            PidError::OutOfMemory(_) => Errno::ENOMEM,
            PidError::InvalidArgument { .. } => Errno::EINVAL,
            PidError::NotFound(_) => Errno::ESRCH,
            PidError::NotOwner { .. } => Errno::ECHILD,
            PidError::Deadlock(_) => Errno::EDEADLK,
        }
    }
}

impl From<PidError> for Errno {
    fn from(err: PidError) -> Self {
        Errno::from(&err)
    }
}

impl From<ForkError> for Errno {
    fn from(err: ForkError) -> Self {
        match err {
            ForkError::Pid(e) => e.into(),
            ForkError::Spawn { .. } => Errno::EAGAIN,
        }
    }
}

/// Syscall result
pub type SyscallResult<T> = Result<T, Errno>;

/// waitpid outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaitStatus {
    /// The child exited and has been reaped
    Exited { pid: Pid, status: ExitStatus },
    /// WNOHANG and the child is still running
    StillRunning,
}

impl WaitStatus {
    /// The value waitpid returns: the reaped pid, or 0
    #[inline]
    pub fn pid(&self) -> Pid {
        match self {
            WaitStatus::Exited { pid, .. } => *pid,
            WaitStatus::StillRunning => 0,
        }
    }
}
