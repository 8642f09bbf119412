/*!
 * Process Syscalls
 * fork, getpid, waitpid, detach and kill for the calling thread
 */

use crate::core::limits::{INVALID_PID, NSIG, UNSET_EXIT_STATUS, WNOHANG};
use crate::core::types::{ExitStatus, Pid, SignalNumber};
use crate::process::{current_pid, thread_fork, JoinOutcome, KernelThread, WaitMode};
use tracing::{debug, instrument, warn};

use super::executor::SyscallExecutor;
use super::types::{Errno, SyscallResult, WaitStatus};

impl SyscallExecutor {
    /// Identifier of the calling thread
    pub fn getpid(&self) -> Pid {
        current_pid()
    }

    /// Start `entry` in a new kernel thread that is a child of the caller
    #[instrument(level = "debug", skip(self, entry))]
    pub fn fork<F>(&self, name: &str, entry: F) -> SyscallResult<KernelThread>
    where
        F: FnOnce() -> ExitStatus + Send + 'static,
    {
        thread_fork(&self.pids, name, entry).map_err(|e| {
            warn!(error = %e, "fork failed");
            Errno::from(e)
        })
    }

    /// Wait for child `pid` and collect its exit status
    ///
    /// `options` is 0 or `WNOHANG`.
    #[instrument(level = "debug", skip(self))]
    pub fn waitpid(&self, pid: Pid, options: i32) -> SyscallResult<WaitStatus> {
        let mode = match options {
            0 => WaitMode::Block,
            WNOHANG => WaitMode::NoHang,
            _ => {
                debug!(options = options, "waitpid invalid option");
                return Err(Errno::EINVAL);
            }
        };

        if pid == INVALID_PID {
            return Err(Errno::ESRCH);
        }

        let outcome = self.pids.join(current_pid(), pid, true, mode)?;
        Ok(match outcome {
            JoinOutcome::Joined { pid, status } => WaitStatus::Exited {
                pid,
                status: status.unwrap_or(UNSET_EXIT_STATUS),
            },
            JoinOutcome::NoResultYet => WaitStatus::StillRunning,
        })
    }

    /// Stop caring about child `pid`'s exit status
    #[instrument(level = "debug", skip(self))]
    pub fn detach(&self, pid: Pid) -> SyscallResult<()> {
        self.pids.detach(current_pid(), pid)?;
        Ok(())
    }

    /// Record `signal` against `pid`; 0 clears the request
    #[instrument(level = "debug", skip(self))]
    pub fn kill(&self, pid: Pid, signal: SignalNumber) -> SyscallResult<()> {
        if !(0..NSIG).contains(&signal) {
            return Err(Errno::EINVAL);
        }
        self.pids.set_flag(pid, signal)?;
        Ok(())
    }

    /// Signal last requested for `pid`
    pub fn pending_signal(&self, pid: Pid) -> SyscallResult<SignalNumber> {
        Ok(self.pids.get_flag(pid)?)
    }
}
