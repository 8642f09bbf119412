/*!
 * Kill Flag Store
 *
 * Stores the last signal number requested for a process. Nothing in the
 * table acts on it.
 */

use super::table::PidTable;
use crate::core::errors::{InvalidReason, PidError};
use crate::core::limits::INVALID_PID;
use crate::core::types::{Pid, PidResult, SignalNumber};
use log::trace;

impl PidTable {
    pub fn get_flag(&self, pid: Pid) -> PidResult<SignalNumber> {
        self.check_flag_target(pid)?;

        let state = self.lock();
        state
            .store
            .get(pid)
            .map(|info| info.kill_flag())
            .ok_or(PidError::NotFound(pid))
    }

    pub fn set_flag(&self, pid: Pid, flag: SignalNumber) -> PidResult<()> {
        self.check_flag_target(pid)?;

        let mut state = self.lock();
        let info = state.store.get_mut(pid).ok_or(PidError::NotFound(pid))?;
        info.set_kill_flag(flag);

        trace!("Set kill flag {} on pid {}", flag, pid);
        Ok(())
    }

    fn check_flag_target(&self, pid: Pid) -> PidResult<()> {
        if pid == INVALID_PID {
            return Err(PidError::invalid(pid, InvalidReason::Sentinel));
        }
        if !self.config().contains(pid) {
            return Err(PidError::invalid(pid, InvalidReason::OutOfRange));
        }
        Ok(())
    }
}
