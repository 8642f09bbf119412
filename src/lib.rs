/*!
 * Pid Kernel Library
 * Process identifiers, lifecycle records and the exit/join/detach protocol
 */

pub mod core;
pub mod memory;
pub mod monitoring;
pub mod process;
pub mod syscalls;

// Re-exports
pub use crate::core::errors::{InvalidReason, KernelError, PidError};
pub use crate::core::types::{ExitStatus, Pid, PidResult, SignalNumber};
pub use memory::{KernelHeap, MemoryError, MemoryStats};
pub use monitoring::{init_tracing, report_stats};
pub use process::{
    bootstrap, current_pid, pid_table, thread_fork, ConfigError, ForkError, JoinOutcome,
    KernelThread, PidRecordView, PidStats, PidTable, PidTableConfig, RecordState, WaitMode,
};
pub use syscalls::{Errno, SyscallExecutor, WaitStatus};
