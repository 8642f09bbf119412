/*!
 * Global Pid Table
 * The kernel-wide table, bootstrapped once by the boot thread
 */

use super::config::{ConfigError, PidTableConfig};
use super::table::PidTable;
use super::thread::bind_boot_thread;
use std::sync::{Arc, OnceLock};

static PID_TABLE: OnceLock<Arc<PidTable>> = OnceLock::new();

/// Create the kernel-wide table and make the caller the boot thread
///
/// Must run before any other thread exists; a second call fails with
/// `ConfigError::AlreadyBootstrapped`.
pub fn bootstrap(config: PidTableConfig) -> Result<Arc<PidTable>, ConfigError> {
    if PID_TABLE.get().is_some() {
        return Err(ConfigError::AlreadyBootstrapped);
    }

    let table = Arc::new(PidTable::new(config)?);
    PID_TABLE
        .set(Arc::clone(&table))
        .map_err(|_| ConfigError::AlreadyBootstrapped)?;

    bind_boot_thread(&table)?;
    Ok(table)
}

/// The kernel-wide table, if bootstrapped
#[inline]
pub fn pid_table() -> Option<&'static Arc<PidTable>> {
    PID_TABLE.get()
}
