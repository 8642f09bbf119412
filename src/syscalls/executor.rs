/*!
 * Syscall Executor
 * Entry point for process syscalls, run on behalf of the calling thread
 */

use crate::process::PidTable;
use std::sync::Arc;
use tracing::info;

/// System call executor
#[derive(Clone)]
pub struct SyscallExecutor {
    pub(super) pids: Arc<PidTable>,
}

impl SyscallExecutor {
    pub fn new(pids: Arc<PidTable>) -> Self {
        info!("Syscall executor initialized");
        Self { pids }
    }

    /// The table this executor operates on
    #[inline]
    pub fn pid_table(&self) -> &Arc<PidTable> {
        &self.pids
    }
}
