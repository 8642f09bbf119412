/*!
 * Syscalls Module
 * Process system calls over the pid table
 */

mod executor;
mod process;
mod types;

// Re-export public API
pub use executor::SyscallExecutor;
pub use types::{Errno, SyscallResult, WaitStatus};
