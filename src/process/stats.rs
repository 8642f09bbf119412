/*!
 * Pid Table Statistics
 * Counters and per-record views for monitoring ("ps"-style listings)
 */

use super::record::{PidInfo, RecordState};
use crate::core::types::{ExitStatus, Pid, SignalNumber};
use serde::{Deserialize, Serialize};

/// Lifetime counters, mutated under the table lock
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct Counters {
    pub allocated: u64,
    pub exited: u64,
    pub joined: u64,
    pub detached: u64,
    pub rolled_back: u64,
    pub reclaimed: u64,
}

/// Point-in-time table statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PidStats {
    pub live: usize,
    pub capacity: usize,
    pub next_candidate: Pid,
    pub allocated: u64,
    pub exited: u64,
    pub joined: u64,
    pub detached: u64,
    pub rolled_back: u64,
    pub reclaimed: u64,
}

impl PidStats {
    pub(crate) fn new(live: usize, capacity: usize, next_candidate: Pid, counters: Counters) -> Self {
        Self {
            live,
            capacity,
            next_candidate,
            allocated: counters.allocated,
            exited: counters.exited,
            joined: counters.joined,
            detached: counters.detached,
            rolled_back: counters.rolled_back,
            reclaimed: counters.reclaimed,
        }
    }

    /// Free slots left for allocation
    #[inline]
    pub fn available(&self) -> usize {
        self.capacity - self.live
    }
}

/// Copy of one record, detached from the table lock
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PidRecordView {
    pub pid: Pid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ppid: Option<Pid>,
    pub state: RecordState,
    /// Only present once the record has exited
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit_status: Option<ExitStatus>,
    pub kill_flag: SignalNumber,
}

impl PidRecordView {
    pub(crate) fn of(info: &PidInfo) -> Self {
        Self {
            pid: info.pid(),
            ppid: info.ppid(),
            state: info.state(),
            exit_status: info.is_exited().then(|| info.exit_status()),
            kill_flag: info.kill_flag(),
        }
    }
}
