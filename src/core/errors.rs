/*!
 * Error Types
 * Centralized error handling with thiserror, miette, and serde support
 */

use super::types::Pid;
use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

// Re-export MemoryError from memory module
pub use crate::memory::MemoryError;

// Re-export table configuration and fork errors from process module
pub use crate::process::{ConfigError, ForkError};

// Re-export Errno from syscalls module
pub use crate::syscalls::Errno;

/// Why an identifier was rejected as an argument
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvalidReason {
    /// The "no process" sentinel
    Sentinel,
    /// The boot thread, which can never be joined or detached
    Bootstrap,
    /// Outside the allocatable identifier range
    OutOfRange,
    /// The record has already lost its parent
    AlreadyDetached,
}

impl fmt::Display for InvalidReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            InvalidReason::Sentinel => "sentinel identifier",
            InvalidReason::Bootstrap => "bootstrap identifier",
            InvalidReason::OutOfRange => "identifier out of range",
            InvalidReason::AlreadyDetached => "already detached",
        };
        f.write_str(text)
    }
}

/// Recoverable pid table errors with serialization support
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum PidError {
    #[error("Process table full: {live}/{capacity} slots in use")]
    #[diagnostic(
        code(pid::resource_exhausted),
        help("Every slot is taken. Join or detach exited children to free slots.")
    )]
    ResourceExhausted { live: usize, capacity: usize },

    #[error("Out of memory allocating process record: {0}")]
    #[diagnostic(
        code(pid::out_of_memory),
        help("The kernel heap could not hold another record. Nothing was allocated.")
    )]
    OutOfMemory(String),

    #[error("Invalid process id {pid}: {reason}")]
    #[diagnostic(
        code(pid::invalid_argument),
        help("Reserved identifiers and detached records cannot be used here.")
    )]
    InvalidArgument { pid: Pid, reason: InvalidReason },

    #[error("Process {0} not found")]
    #[diagnostic(
        code(pid::not_found),
        help("The process may have been reaped already or never existed.")
    )]
    NotFound(Pid),

    #[error("Process {caller} is not the parent of {pid}")]
    #[diagnostic(
        code(pid::not_owner),
        help("Only the recorded parent may join or detach a process.")
    )]
    NotOwner { pid: Pid, caller: Pid },

    #[error("Process {0} cannot join itself")]
    #[diagnostic(
        code(pid::deadlock),
        help("A thread waiting for its own exit would never wake.")
    )]
    Deadlock(Pid),
}

impl PidError {
    #[inline]
    pub(crate) fn invalid(pid: Pid, reason: InvalidReason) -> Self {
        PidError::InvalidArgument { pid, reason }
    }
}

impl From<MemoryError> for PidError {
    fn from(err: MemoryError) -> Self {
        PidError::OutOfMemory(err.to_string())
    }
}

/// Unified kernel error type with miette diagnostics
#[derive(Error, Debug, Diagnostic)]
pub enum KernelError {
    #[error("Pid error: {0}")]
    #[diagnostic(transparent)]
    Pid(#[from] PidError),

    #[error("Configuration error: {0}")]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    #[error("Fork error: {0}")]
    #[diagnostic(transparent)]
    Fork(#[from] ForkError),

    #[error("Syscall error: {0}")]
    #[diagnostic(
        code(kernel::syscall_error),
        help("The syscall layer rejected the request with this errno.")
    )]
    Syscall(#[from] Errno),

    #[error("Serialization error: {0}")]
    #[diagnostic(code(kernel::serialization_error))]
    Serialization(String),
}

impl From<serde_json::Error> for KernelError {
    fn from(err: serde_json::Error) -> Self {
        KernelError::Serialization(err.to_string())
    }
}
