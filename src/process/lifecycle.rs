/*!
 * Exit / Join / Detach Protocol
 *
 * Record states:
 *
 * - **Active**: not exited
 * - **Exited-Attached**: exited, parent may still join
 * - **Exited-Orphaned**: exited with no parent; reclaimed before the lock
 *   is released, so never observable from outside
 *
 * Whichever operation makes a record exited and parentless removes it.
 * A joiner sleeps on the record's own wait signal and is woken (all
 * waiters) by the exit. Every woken joiner re-checks the record; one that
 * finds it already reaped or detached by another waiter gets `NotFound`.
 */

use super::table::{PidTable, TableState};
use crate::core::errors::{InvalidReason, PidError};
use crate::core::limits::{BOOTUP_PID, INVALID_PID};
use crate::core::types::{ExitStatus, Pid, PidResult};
use log::debug;
use serde::{Deserialize, Serialize};

/// Whether a join may sleep
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaitMode {
    /// Sleep until the target exits
    #[default]
    Block,
    /// Return `NoResultYet` if the target is still running
    NoHang,
}

/// Successful join outcomes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JoinOutcome {
    /// The target was reaped; `status` is present if it was requested
    Joined {
        pid: Pid,
        status: Option<ExitStatus>,
    },
    /// Non-blocking join on a target that has not exited
    NoResultYet,
}

impl PidTable {
    /// Exit the calling thread's own record
    ///
    /// Wakes every joiner. With `detach_children`, every child of `caller`
    /// is detached first (and reclaimed if it already exited). The record
    /// itself is reclaimed at once if it was already detached.
    pub fn exit(&self, caller: Pid, status: ExitStatus, detach_children: bool) {
        assert_ne!(caller, BOOTUP_PID, "boot thread cannot exit");
        assert_ne!(caller, INVALID_PID, "exit from a thread without a pid");

        let mut state = self.lock();
        let Some(info) = state.store.get_mut(caller) else {
            panic!("exit of unknown pid {}", caller);
        };

        info.mark_exited(status);
        let woken = info.wake_waiters();
        state.counters.exited += 1;

        debug!(
            "Pid {} exited with status {} ({} waiters woken)",
            caller, status, woken
        );

        if detach_children {
            for child in state.store.children_of(caller) {
                state.detach_child(child);
            }
        }

        let orphaned = state
            .store
            .get(caller)
            .is_some_and(|info| info.is_orphaned());
        if orphaned {
            state.reclaim(caller);
        }
    }

    /// Give up interest in `pid`'s exit status
    ///
    /// Only the recorded parent may detach, and only once. A child that has
    /// already exited is reclaimed immediately.
    pub fn detach(&self, caller: Pid, pid: Pid) -> PidResult<()> {
        if !self.config().contains(pid) {
            return Err(PidError::invalid(pid, reason_for(pid)));
        }

        let mut state = self.lock();
        let info = state.store.get(pid).ok_or(PidError::NotFound(pid))?;

        if info.is_orphaned() {
            return Err(PidError::invalid(pid, InvalidReason::AlreadyDetached));
        }
        if !info.is_child_of(caller) {
            return Err(PidError::NotOwner { pid, caller });
        }

        state.detach_child(pid);
        Ok(())
    }

    /// Collect `pid`'s exit status and reclaim its record
    ///
    /// Only the recorded parent may join. A `WaitMode::NoHang` join on a
    /// running target returns `JoinOutcome::NoResultYet` and changes
    /// nothing; a blocking join sleeps until the target exits.
    pub fn join(
        &self,
        caller: Pid,
        pid: Pid,
        take_status: bool,
        mode: WaitMode,
    ) -> PidResult<JoinOutcome> {
        if pid == INVALID_PID || pid == BOOTUP_PID {
            return Err(PidError::invalid(pid, reason_for(pid)));
        }
        if pid == caller {
            return Err(PidError::Deadlock(pid));
        }

        let mut state = self.lock();
        let info = state.store.get(pid).ok_or(PidError::NotFound(pid))?;
        if !info.is_child_of(caller) {
            return Err(PidError::NotOwner { pid, caller });
        }

        if !info.is_exited() {
            if mode == WaitMode::NoHang {
                return Ok(JoinOutcome::NoResultYet);
            }

            let signal = info.wait_signal();
            debug!("Pid {} waiting for {}", caller, pid);
            loop {
                signal.wait(&mut state);

                // Another waiter with the same identity may have reaped or
                // detached the record, and its pid may since be reissued
                let current = state
                    .store
                    .get(pid)
                    .filter(|info| info.has_wait_signal(&signal) && info.is_child_of(caller));
                match current {
                    None => {
                        debug!("Pid {} lost {} while waiting", caller, pid);
                        return Err(PidError::NotFound(pid));
                    }
                    Some(info) if info.is_exited() => break,
                    Some(_) => {}
                }
            }
        }

        let status = state.reap(pid);
        debug!("Pid {} joined {} (status {})", caller, pid, status);

        Ok(JoinOutcome::Joined {
            pid,
            status: take_status.then_some(status),
        })
    }
}

impl TableState {
    /// Orphan `pid`, reclaiming it if it already exited
    fn detach_child(&mut self, pid: Pid) {
        let Some(info) = self.store.get_mut(pid) else {
            panic!("detach of unknown pid {}", pid);
        };
        info.orphan();
        let exited = info.is_exited();
        self.counters.detached += 1;

        debug!("Detached pid {}", pid);
        if exited {
            self.reclaim(pid);
        }
    }

    /// Take an exited child's status and reclaim it
    fn reap(&mut self, pid: Pid) -> ExitStatus {
        let Some(info) = self.store.get_mut(pid) else {
            panic!("reap of unknown pid {}", pid);
        };
        let status = info.exit_status();
        info.orphan();
        self.counters.joined += 1;
        self.reclaim(pid);
        status
    }
}

fn reason_for(pid: Pid) -> InvalidReason {
    match pid {
        INVALID_PID => InvalidReason::Sentinel,
        BOOTUP_PID => InvalidReason::Bootstrap,
        _ => InvalidReason::OutOfRange,
    }
}
