/*!
 * Lifecycle Record
 *
 * Per-identifier bookkeeping. A record is reclaimable once it has exited
 * and has no parent left to join it; the store refuses to remove anything
 * else.
 */

use crate::core::limits::{NO_SIGNAL, UNSET_EXIT_STATUS};
use crate::core::types::{ExitStatus, Pid, SignalNumber};
use crate::memory::HeapBlock;
use parking_lot::Condvar;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Heap bytes charged for one record
pub const RECORD_FOOTPRINT: usize =
    std::mem::size_of::<PidInfo>() + std::mem::size_of::<Condvar>();

/// Observable lifecycle state of a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordState {
    /// Still running
    Active,
    /// Exited, waiting for its parent to join or detach
    ExitedAttached,
    /// Exited with no parent; only seen while the table lock is held
    ExitedOrphaned,
}

pub(crate) struct PidInfo {
    pid: Pid,
    /// `None` once detached or orphaned, never set back
    ppid: Option<Pid>,
    exited: bool,
    exit_status: ExitStatus,
    cv: Arc<Condvar>,
    kill_flag: SignalNumber,
    _block: HeapBlock,
}

impl PidInfo {
    pub(crate) fn new(pid: Pid, ppid: Option<Pid>, block: HeapBlock) -> Self {
        Self {
            pid,
            ppid,
            exited: false,
            exit_status: UNSET_EXIT_STATUS,
            cv: Arc::new(Condvar::new()),
            kill_flag: NO_SIGNAL,
            _block: block,
        }
    }

    #[inline]
    pub(crate) fn pid(&self) -> Pid {
        self.pid
    }

    #[inline]
    pub(crate) fn ppid(&self) -> Option<Pid> {
        self.ppid
    }

    #[inline]
    pub(crate) fn is_child_of(&self, pid: Pid) -> bool {
        self.ppid == Some(pid)
    }

    #[inline]
    pub(crate) fn is_orphaned(&self) -> bool {
        self.ppid.is_none()
    }

    #[inline]
    pub(crate) fn is_exited(&self) -> bool {
        self.exited
    }

    #[inline]
    pub(crate) fn exit_status(&self) -> ExitStatus {
        self.exit_status
    }

    /// The destruction precondition
    #[inline]
    pub(crate) fn is_reclaimable(&self) -> bool {
        self.exited && self.ppid.is_none()
    }

    pub(crate) fn state(&self) -> RecordState {
        match (self.exited, self.ppid) {
            (false, _) => RecordState::Active,
            (true, Some(_)) => RecordState::ExitedAttached,
            (true, None) => RecordState::ExitedOrphaned,
        }
    }

    pub(crate) fn mark_exited(&mut self, status: ExitStatus) {
        assert!(!self.exited, "pid {} exited twice", self.pid);
        self.exited = true;
        self.exit_status = status;
    }

    #[inline]
    pub(crate) fn orphan(&mut self) {
        self.ppid = None;
    }

    /// Handle on the wait signal, usable after the table borrow ends
    #[inline]
    pub(crate) fn wait_signal(&self) -> Arc<Condvar> {
        Arc::clone(&self.cv)
    }

    /// Whether `signal` is this record's wait signal
    #[inline]
    pub(crate) fn has_wait_signal(&self, signal: &Arc<Condvar>) -> bool {
        Arc::ptr_eq(&self.cv, signal)
    }

    /// Wake every thread blocked in a join on this record
    #[inline]
    pub(crate) fn wake_waiters(&self) -> usize {
        self.cv.notify_all()
    }

    #[inline]
    pub(crate) fn kill_flag(&self) -> SignalNumber {
        self.kill_flag
    }

    #[inline]
    pub(crate) fn set_kill_flag(&mut self, flag: SignalNumber) {
        self.kill_flag = flag;
    }
}

impl std::fmt::Debug for PidInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PidInfo")
            .field("pid", &self.pid)
            .field("ppid", &self.ppid)
            .field("exited", &self.exited)
            .field("exit_status", &self.exit_status)
            .field("kill_flag", &self.kill_flag)
            .finish()
    }
}
