/*!
 * Core Types
 * Common types used across the kernel
 */

/// Process ID type
pub type Pid = u32;

/// Exit status handed from an exiting thread to its joiner
pub type ExitStatus = i32;

/// Signal number recorded by the kill flag (0 means no signal)
pub type SignalNumber = i32;

/// Common result type for pid table operations
pub type PidResult<T> = Result<T, super::errors::PidError>;
