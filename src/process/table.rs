/*!
 * Pid Table
 *
 * Process identifier allocation and the shared record table.
 *
 * # Architecture
 *
 * - **One lock**: a single `parking_lot::Mutex` guards the slot store, the
 *   allocation cursor and the live count; every operation holds it for its
 *   whole duration
 * - **Identifier handles only**: callers never hold references into the
 *   table; each call looks its record up again under the lock
 * - **Collision policy**: a candidate whose slot is busy is skipped, never
 *   displaced
 *
 * Exit, join and detach live in `lifecycle.rs`, the kill flag in
 * `flags.rs`.
 */

use super::config::{ConfigError, PidTableConfig};
use super::record::{PidInfo, RECORD_FOOTPRINT};
use super::stats::{Counters, PidRecordView, PidStats};
use super::store::RecordStore;
use crate::core::errors::PidError;
use crate::core::limits::{BOOTUP_PID, INVALID_PID, ROLLBACK_EXIT_STATUS};
use crate::core::types::{Pid, PidResult};
use crate::memory::{KernelHeap, MemoryStats};
use log::{debug, info, warn};
use parking_lot::{Mutex, MutexGuard};
use std::sync::atomic::{AtomicBool, Ordering};

/// Everything the table lock protects
pub(crate) struct TableState {
    pub(crate) store: RecordStore,
    pub(crate) next_pid: Pid,
    pub(crate) counters: Counters,
}

/// Shared process identifier table
pub struct PidTable {
    state: Mutex<TableState>,
    config: PidTableConfig,
    heap: KernelHeap,
    boot_claimed: AtomicBool,
}

impl PidTable {
    /// Bootstrap a table: empty store plus the boot record
    pub fn new(config: PidTableConfig) -> Result<Self, ConfigError> {
        let heap = match config.heap_bytes {
            Some(bytes) => KernelHeap::new(bytes),
            None => KernelHeap::unbounded(),
        };
        Self::with_heap(config, heap)
    }

    /// Bootstrap a table whose records are charged to `heap`
    pub fn with_heap(config: PidTableConfig, heap: KernelHeap) -> Result<Self, ConfigError> {
        config.validate()?;

        let block = heap
            .alloc(RECORD_FOOTPRINT)
            .map_err(ConfigError::BootstrapAllocation)?;

        let mut store = RecordStore::new(config.capacity);
        store.insert(PidInfo::new(BOOTUP_PID, None, block));

        info!(
            "Pid table initialized: {} slots, pids {}..={}",
            config.capacity, config.pid_min, config.pid_max
        );

        Ok(Self {
            state: Mutex::new(TableState {
                store,
                next_pid: config.pid_min,
                counters: Counters::default(),
            }),
            config,
            heap,
            boot_claimed: AtomicBool::new(false),
        })
    }

    #[inline]
    pub fn config(&self) -> &PidTableConfig {
        &self.config
    }

    /// Take the boot identity; true for the first caller only
    #[inline]
    pub(crate) fn claim_boot_thread(&self) -> bool {
        !self.boot_claimed.swap(true, Ordering::AcqRel)
    }

    #[inline]
    pub(crate) fn lock(&self) -> MutexGuard<'_, TableState> {
        self.state.lock()
    }

    /// Allocate an identifier whose parent is `parent`
    ///
    /// The new record is installed before this returns, so the thread it
    /// names can exit or be joined as soon as it runs.
    pub fn allocate(&self, parent: Pid) -> PidResult<Pid> {
        assert_ne!(parent, INVALID_PID, "pid allocated for a thread without a pid");

        let mut state = self.lock();

        if state.store.is_full() {
            let capacity = state.store.capacity();
            warn!("Pid allocation for parent {} failed: table full", parent);
            return Err(PidError::ResourceExhausted {
                live: capacity,
                capacity,
            });
        }

        // The fullness check guarantees a free slot within two passes
        let mut candidate = state.next_pid;
        let mut skipped = 0;
        while !state.store.is_slot_free(candidate) {
            assert!(
                skipped < self.config.scan_limit(),
                "pid scan overran with {} of {} slots live",
                state.store.live(),
                state.store.capacity()
            );
            skipped += 1;
            candidate = self.config.successor(candidate);
        }

        let block = self.heap.alloc(RECORD_FOOTPRINT).map_err(|e| {
            warn!("Pid allocation for parent {} failed: {}", parent, e);
            PidError::from(e)
        })?;

        state.store.insert(PidInfo::new(candidate, Some(parent), block));
        state.next_pid = self.config.successor(candidate);
        state.counters.allocated += 1;

        debug!(
            "Allocated pid {} for parent {} ({} live)",
            candidate,
            parent,
            state.store.live()
        );

        Ok(candidate)
    }

    /// Undo an allocation whose thread never ran
    ///
    /// `caller` must be the recorded parent and the record must not have
    /// exited; anything else is a kernel bug.
    pub fn rollback(&self, caller: Pid, pid: Pid) {
        assert!(
            self.config.contains(pid),
            "rollback of out-of-range pid {}",
            pid
        );

        let mut state = self.lock();
        let Some(info) = state.store.get_mut(pid) else {
            panic!("rollback of unknown pid {}", pid);
        };
        assert!(!info.is_exited(), "rollback of exited pid {}", pid);
        assert!(
            info.is_child_of(caller),
            "rollback of pid {} by non-parent {}",
            pid,
            caller
        );

        info.mark_exited(ROLLBACK_EXIT_STATUS);
        info.orphan();
        state.reclaim(pid);
        state.counters.rolled_back += 1;

        debug!("Rolled back pid {} for parent {}", pid, caller);
    }

    /// Number of live records, the boot record included
    pub fn live_count(&self) -> usize {
        self.lock().store.live()
    }

    /// Whether a record for `pid` exists
    pub fn contains(&self, pid: Pid) -> bool {
        pid != INVALID_PID && self.lock().store.get(pid).is_some()
    }

    /// Copy of the record for `pid`
    pub fn record(&self, pid: Pid) -> Option<PidRecordView> {
        if pid == INVALID_PID {
            return None;
        }
        self.lock().store.get(pid).map(PidRecordView::of)
    }

    /// Copies of every live record, sorted by pid
    pub fn snapshot(&self) -> Vec<PidRecordView> {
        let mut views: Vec<_> = self.lock().store.iter().map(PidRecordView::of).collect();
        views.sort_unstable_by_key(|view| view.pid);
        views
    }

    pub fn stats(&self) -> PidStats {
        let state = self.lock();
        PidStats::new(
            state.store.live(),
            state.store.capacity(),
            state.next_pid,
            state.counters,
        )
    }

    pub fn heap_stats(&self) -> MemoryStats {
        self.heap.stats()
    }
}

impl TableState {
    /// Remove a record that has just become exited and parentless
    pub(crate) fn reclaim(&mut self, pid: Pid) {
        self.store.remove(pid);
        self.counters.reclaimed += 1;
        debug!("Reclaimed pid {} ({} live)", pid, self.store.live());
    }
}

impl std::fmt::Debug for PidTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PidTable")
            .field("config", &self.config)
            .field("stats", &self.stats())
            .finish()
    }
}
