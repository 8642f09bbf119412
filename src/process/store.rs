/*!
 * Record Store
 *
 * Fixed-capacity slot table indexed by `pid % capacity`, one record per slot.
 * An identifier whose slot is busy is simply never issued, so inserting
 * never displaces a live record.
 *
 * Only reachable through the table lock guard, which is what makes every
 * method here "lock held".
 */

use super::record::PidInfo;
use crate::core::limits::INVALID_PID;
use crate::core::types::Pid;

pub(crate) struct RecordStore {
    slots: Box<[Option<PidInfo>]>,
    live: usize,
}

impl RecordStore {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            slots: (0..capacity).map(|_| None).collect(),
            live: 0,
        }
    }

    #[inline(always)]
    fn slot_of(&self, pid: Pid) -> usize {
        pid as usize % self.slots.len()
    }

    #[inline]
    pub(crate) fn capacity(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub(crate) fn live(&self) -> usize {
        self.live
    }

    #[inline]
    pub(crate) fn is_full(&self) -> bool {
        self.live == self.slots.len()
    }

    /// Whether the slot `pid` would occupy is empty
    #[inline]
    pub(crate) fn is_slot_free(&self, pid: Pid) -> bool {
        self.slots[self.slot_of(pid)].is_none()
    }

    pub(crate) fn get(&self, pid: Pid) -> Option<&PidInfo> {
        self.slots[self.slot_of(pid)]
            .as_ref()
            .filter(|info| info.pid() == pid)
    }

    pub(crate) fn get_mut(&mut self, pid: Pid) -> Option<&mut PidInfo> {
        let slot = self.slot_of(pid);
        self.slots[slot]
            .as_mut()
            .filter(|info| info.pid() == pid)
    }

    pub(crate) fn insert(&mut self, info: PidInfo) {
        let pid = info.pid();
        assert_ne!(pid, INVALID_PID, "inserting the invalid pid");

        let slot = self.slot_of(pid);
        assert!(
            self.slots[slot].is_none(),
            "pid {} inserted into occupied slot {}",
            pid,
            slot
        );
        self.slots[slot] = Some(info);
        self.live += 1;
    }

    /// Drop the record for `pid`, which must be exited and parentless
    pub(crate) fn remove(&mut self, pid: Pid) {
        let slot = self.slot_of(pid);
        let info = self.slots[slot].take();
        match info {
            Some(info) if info.pid() == pid => {
                assert!(
                    info.is_reclaimable(),
                    "pid {} removed while {:?}",
                    pid,
                    info.state()
                );
                self.live -= 1;
            }
            Some(other) => panic!("pid {} removed but slot {} holds pid {}", pid, slot, other.pid()),
            None => panic!("pid {} removed from empty slot {}", pid, slot),
        }
    }

    /// Identifiers whose recorded parent is `ppid`
    pub(crate) fn children_of(&self, ppid: Pid) -> Vec<Pid> {
        self.iter()
            .filter(|info| info.is_child_of(ppid))
            .map(PidInfo::pid)
            .collect()
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &PidInfo> {
        self.slots.iter().flatten()
    }
}
