/*!
 * System Limits and Constants
 *
 * Centralized location for the process identifier space and its
 * reserved values.
 *
 * ## Conventions
 * - Values are grouped by domain
 * - Reserved identifiers are marked with [RESERVED]
 * - POSIX-compatible values are marked with [POSIX-COMPAT]
 */

use super::types::{ExitStatus, Pid, SignalNumber};

// =============================================================================
// PROCESS IDENTIFIERS
// =============================================================================

/// "No process" sentinel, also the parent of orphaned records
/// [RESERVED]
pub const INVALID_PID: Pid = 0;

/// Identifier of the boot thread, created once and never reclaimed
/// [RESERVED]
pub const BOOTUP_PID: Pid = 1;

/// Lowest identifier handed out by the allocator
pub const PID_MIN: Pid = 2;

/// Highest identifier handed out by the allocator, wraps back to PID_MIN
pub const PID_MAX: Pid = 32767;

/// Upper bound accepted for a configured PID_MAX (pid_t is signed)
pub const PID_MAX_LIMIT: Pid = i32::MAX as Pid;

/// Number of slots in the process table
/// At most this many records (boot thread included) are live at once
pub const PROCS_MAX: usize = 128;

/// Extra iterations allowed in the allocation scan beyond two full passes
pub const PID_SCAN_SLACK: usize = 5;

// =============================================================================
// EXIT STATUS
// =============================================================================

/// Status held by a record before it exits (recognizably invalid)
pub const UNSET_EXIT_STATUS: ExitStatus = 0xbaad;

/// Status stamped on a record that was allocated but never ran
pub const ROLLBACK_EXIT_STATUS: ExitStatus = 0xdead;

/// Status a kernel thread exits with when its entry function panics
pub const PANIC_EXIT_STATUS: ExitStatus = -1;

// =============================================================================
// WAIT / KILL
// =============================================================================

/// waitpid option: return immediately if the child has not exited
/// [POSIX-COMPAT]
pub const WNOHANG: i32 = 1;

/// Number of signals; valid kill signals are 0..NSIG
/// [POSIX-COMPAT]
pub const NSIG: SignalNumber = 32;

/// Kill flag value meaning "no signal requested"
pub const NO_SIGNAL: SignalNumber = 0;
