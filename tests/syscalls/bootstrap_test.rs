/*!
 * Global Bootstrap Tests
 * The kernel-wide table is created once per process
 */

use pid_kernel::core::limits::BOOTUP_PID;
use pid_kernel::{bootstrap, current_pid, pid_table, ConfigError, PidTableConfig};
use pretty_assertions::assert_eq;
use serial_test::serial;
use std::sync::Arc;

#[test]
#[serial]
fn test_bootstrap_once() {
    let table = match bootstrap(PidTableConfig::default()) {
        Ok(table) => {
            assert_eq!(current_pid(), BOOTUP_PID);
            table
        }
        Err(err) => {
            assert_eq!(err, ConfigError::AlreadyBootstrapped);
            Arc::clone(pid_table().unwrap())
        }
    };

    let global = pid_table().unwrap();
    assert!(Arc::ptr_eq(&table, global));
    assert!(global.contains(BOOTUP_PID));
}

#[test]
#[serial]
fn test_second_bootstrap_rejected() {
    let _ = bootstrap(PidTableConfig::default());
    assert_eq!(
        bootstrap(PidTableConfig::default()).err(),
        Some(ConfigError::AlreadyBootstrapped)
    );
}

#[test]
#[serial]
fn test_env_overrides_config() {
    std::env::set_var("KERNEL_PROCS_MAX", "16");
    std::env::set_var("KERNEL_PID_MIN", "100");
    std::env::set_var("KERNEL_PID_MAX", "200");
    let config = PidTableConfig::from_env();
    std::env::set_var("KERNEL_PID_MAX", "not-a-number");
    let invalid = PidTableConfig::from_env();
    for var in ["KERNEL_PROCS_MAX", "KERNEL_PID_MIN", "KERNEL_PID_MAX"] {
        std::env::remove_var(var);
    }

    let config = config.unwrap();
    assert_eq!(config.capacity, 16);
    assert_eq!((config.pid_min, config.pid_max), (100, 200));
    assert!(matches!(invalid, Err(ConfigError::InvalidEnv { var: "KERNEL_PID_MAX", .. })));
}
