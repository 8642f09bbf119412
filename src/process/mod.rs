/*!
 * Process Module
 * Process identifiers, lifecycle records and kernel threads
 */

mod config;
mod flags;
mod global;
mod lifecycle;
mod record;
mod stats;
mod store;
mod table;
mod thread;

// Re-export for convenience
pub use config::{ConfigError, PidTableConfig};
pub use global::{bootstrap, pid_table};
pub use lifecycle::{JoinOutcome, WaitMode};
pub use record::{RecordState, RECORD_FOOTPRINT};
pub use stats::{PidRecordView, PidStats};
pub use table::PidTable;
pub use thread::{bind_boot_thread, current_pid, thread_fork, ForkError, KernelThread};
