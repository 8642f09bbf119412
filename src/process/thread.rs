/*!
 * Kernel Threads
 *
 * Host threads that carry a process identifier. `thread_fork` allocates the
 * child's identifier before the thread can run, and the thread exits its
 * record (detaching its own children) when its entry function returns or
 * panics.
 */

use super::config::ConfigError;
use super::table::PidTable;
use crate::core::errors::PidError;
use crate::core::limits::{BOOTUP_PID, INVALID_PID, PANIC_EXIT_STATUS};
use crate::core::types::{ExitStatus, Pid};
use log::{debug, error};
use miette::Diagnostic;
use std::cell::Cell;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use thiserror::Error;

thread_local! {
    static CURRENT_PID: Cell<Pid> = const { Cell::new(INVALID_PID) };
}

/// Fork errors
#[derive(Error, Debug, Clone, PartialEq, Eq, Diagnostic)]
pub enum ForkError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Pid(#[from] PidError),

    #[error("Failed to spawn kernel thread {name}: {reason}")]
    #[diagnostic(
        code(fork::spawn_failed),
        help("The host refused to create another thread. The pid was released.")
    )]
    Spawn { name: String, reason: String },
}

/// Identifier of the calling thread, `INVALID_PID` if it has none
#[inline]
pub fn current_pid() -> Pid {
    CURRENT_PID.with(Cell::get)
}

/// Give the calling thread the boot identity of `table`
///
/// Each table has exactly one boot thread; a second claim fails with
/// `ConfigError::BootThreadBound` and leaves the caller unbound.
pub fn bind_boot_thread(table: &PidTable) -> Result<(), ConfigError> {
    if !table.claim_boot_thread() {
        return Err(ConfigError::BootThreadBound);
    }
    bind(BOOTUP_PID);
    Ok(())
}

fn bind(pid: Pid) {
    CURRENT_PID.with(|current| current.set(pid));
}

/// A forked kernel thread
#[derive(Debug)]
pub struct KernelThread {
    pid: Pid,
    handle: JoinHandle<()>,
}

impl KernelThread {
    #[inline]
    pub fn pid(&self) -> Pid {
        self.pid
    }

    /// Wait for the host thread to finish running
    ///
    /// This does not reap the pid; the parent still joins or detaches it.
    pub fn join_host(self) -> thread::Result<()> {
        self.handle.join()
    }
}

/// Fork a kernel thread that runs `entry` as a child of the calling thread
pub fn thread_fork<F>(table: &Arc<PidTable>, name: &str, entry: F) -> Result<KernelThread, ForkError>
where
    F: FnOnce() -> ExitStatus + Send + 'static,
{
    let parent = current_pid();
    let pid = table.allocate(parent)?;

    let child_table = Arc::clone(table);
    let spawned = thread::Builder::new()
        .name(name.to_string())
        .spawn(move || {
            bind(pid);
            match panic::catch_unwind(AssertUnwindSafe(entry)) {
                Ok(status) => child_table.exit(pid, status, true),
                Err(payload) => {
                    error!("Pid {} panicked, exiting with status {}", pid, PANIC_EXIT_STATUS);
                    child_table.exit(pid, PANIC_EXIT_STATUS, true);
                    panic::resume_unwind(payload);
                }
            }
        });

    match spawned {
        Ok(handle) => {
            debug!("Forked {} as pid {} (parent {})", name, pid, parent);
            Ok(KernelThread { pid, handle })
        }
        Err(e) => {
            error!("Failed to spawn {} for pid {}: {}", name, pid, e);
            table.rollback(parent, pid);
            Err(ForkError::Spawn {
                name: name.to_string(),
                reason: e.to_string(),
            })
        }
    }
}
